/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    /// Fixed shuffle seed; `None` = fresh entropy each run.
    pub seed: Option<u64>,
    pub sound: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub win_delay_ms: u64,      // all pairs matched → "You Won!"
    pub mismatch_delay_ms: u64, // mismatched pair stays face up this long
    pub loss_delay_ms: u64,     // last mismatch → "You Lost!"
}

impl TimingConfig {
    pub fn frame(&self) -> Duration { Duration::from_millis(self.frame_ms) }
    pub fn win_delay(&self) -> Duration { Duration::from_millis(self.win_delay_ms) }
    pub fn mismatch_delay(&self) -> Duration { Duration::from_millis(self.mismatch_delay_ms) }
    pub fn loss_delay(&self) -> Duration { Duration::from_millis(self.loss_delay_ms) }
}

impl Default for TimingConfig {
    fn default() -> Self {
        resolve_timing(TomlTiming::default())
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub flip: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame")]
    frame_ms: u64,
    #[serde(default = "default_win_delay")]
    win_delay_ms: u64,
    #[serde(default = "default_mismatch_delay")]
    mismatch_delay_ms: u64,
    #[serde(default = "default_loss_delay")]
    loss_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_flip")]
    flip: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_sound")]
    sound: bool,
}

// ── Defaults ──

fn default_frame() -> u64 { 16 }
fn default_win_delay() -> u64 { 500 }
fn default_mismatch_delay() -> u64 { 1200 }
fn default_loss_delay() -> u64 { 1200 }

fn default_flip() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_sound() -> bool { true }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame(),
            win_delay_ms: default_win_delay(),
            mismatch_delay_ms: default_mismatch_delay(),
            loss_delay_ms: default_loss_delay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            flip: default_flip(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { seed: None, sound: default_sound() }
    }
}

// ── Resolution: TOML schema → public config ──

fn resolve_timing(t: TomlTiming) -> TimingConfig {
    TimingConfig {
        frame_ms: t.frame_ms.max(1),
        win_delay_ms: t.win_delay_ms,
        mismatch_delay_ms: t.mismatch_delay_ms,
        loss_delay_ms: t.loss_delay_ms,
    }
}

fn resolve(cfg: TomlConfig) -> GameConfig {
    GameConfig {
        timing: resolve_timing(cfg.timing),
        gamepad: GamepadConfig {
            flip: cfg.gamepad.flip,
            restart: cfg.gamepad.restart,
            quit: cfg.gamepad.quit,
        },
        seed: cfg.general.seed,
        sound: cfg.general.sound,
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/cardmatch, (4) /usr/share/cardmatch.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        match read_first(&candidate_dirs()) {
            Some(text) => Self::from_toml_str(&text),
            None => resolve(TomlConfig::default()),
        }
    }

    /// Parse config text directly. Invalid TOML yields the defaults.
    pub fn from_toml_str(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => resolve(cfg),
            Err(e) => {
                warn!("config.toml parse error, using defaults: {e}");
                resolve(TomlConfig::default())
            }
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (symlinks resolved)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/cardmatch");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/cardmatch");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories. First readable file wins.
fn read_first(search_dirs: &[PathBuf]) -> Option<String> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                info!(path = %path.display(), "loaded config");
                return Some(text);
            }
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
            }
        }
    }
    None
}
