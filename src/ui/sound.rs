/// Sound engine: procedural chiptune effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_flip: Arc<Vec<u8>>,
        sfx_match: Arc<Vec<u8>>,
        sfx_mismatch: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_lose: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_flip: Arc::new(make_wav(&gen_flip())),
                sfx_match: Arc::new(make_wav(&gen_match())),
                sfx_mismatch: Arc::new(make_wav(&gen_mismatch())),
                sfx_win: Arc::new(make_wav(&gen_win())),
                sfx_lose: Arc::new(make_wav(&gen_lose())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_flip(&self) { self.play(&self.sfx_flip); }
        pub fn play_match(&self) { self.play(&self.sfx_match); }
        pub fn play_mismatch(&self) { self.play(&self.sfx_mismatch); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_lose(&self) { self.play(&self.sfx_lose); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: mono f32 samples
    // ════════════════════════════════════════════════════════════

    /// Append one note: sine + optional overtone, decaying envelope.
    fn push_note(samples: &mut Vec<f32>, freq: f32, dur: f32, overtone: f32, volume: f32) {
        let n = (SAMPLE_RATE as f32 * dur) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(0.6);
            let wave = (t * freq * TAU).sin() * (1.0 - overtone)
                + (t * freq * 2.0 * TAU).sin() * overtone;
            samples.push(wave * env * volume);
        }
    }

    /// Card flip: very short high tick
    fn gen_flip() -> Vec<f32> {
        let mut s = Vec::new();
        push_note(&mut s, 1400.0, 0.03, 0.2, 0.2);
        s
    }

    /// Pair matched: bright upward third E6→G#6
    fn gen_match() -> Vec<f32> {
        let mut s = Vec::new();
        push_note(&mut s, 1319.0, 0.06, 0.3, 0.25);
        push_note(&mut s, 1661.0, 0.12, 0.3, 0.25);
        s
    }

    /// Mismatch: low falling buzz
    fn gen_mismatch() -> Vec<f32> {
        let duration = 0.18;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = 220.0 - p * 80.0;
                let t = i as f32 / SAMPLE_RATE as f32;
                // Clipped sine reads as a square-ish buzz
                let wave = ((t * freq * TAU).sin() * 3.0).clamp(-1.0, 1.0);
                wave * (1.0 - p) * 0.15
            })
            .collect()
    }

    /// Win: ascending C major arpeggio with held top note
    fn gen_win() -> Vec<f32> {
        let mut s = Vec::new();
        for freq in [523.0_f32, 659.0, 784.0] {
            push_note(&mut s, freq, 0.1, 0.3, 0.3);
        }
        push_note(&mut s, 1047.0, 0.35, 0.3, 0.3);
        s
    }

    /// Lose: slow descending minor line
    fn gen_lose() -> Vec<f32> {
        let mut s = Vec::new();
        for freq in [392.0_f32, 349.0, 311.0, 262.0] {
            push_note(&mut s, freq, 0.16, 0.1, 0.3);
        }
        s
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
        let block_align = channels * bits / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_flip(&self) {}
    pub fn play_match(&self) {}
    pub fn play_mismatch(&self) {}
    pub fn play_win(&self) {}
    pub fn play_lose(&self) {}
}

/// Map game events to sound effects.
pub fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CardRevealed { .. } => sfx.play_flip(),
            GameEvent::PairMatched { .. } => sfx.play_match(),
            GameEvent::Mismatch { .. } => sfx.play_mismatch(),
            GameEvent::OutcomeAnnounced { won: true } => sfx.play_win(),
            GameEvent::OutcomeAnnounced { won: false } => sfx.play_lose(),
            _ => {}
        }
    }
}
