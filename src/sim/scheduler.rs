/// Deadline queue for deferred effects.
///
/// The state machine says "apply E after D"; this turns D into an `Instant`
/// and hands E back once the clock passes it. The clock is always passed in,
/// never read here.

use std::time::Instant;

use super::event::{Deferred, Effect};

#[derive(Debug, Default)]
pub struct Scheduler {
    /// Kept sorted by deadline; insertion order breaks ties.
    pending: Vec<(Instant, Effect)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { pending: Vec::with_capacity(2) }
    }

    pub fn schedule(&mut self, now: Instant, deferred: Deferred) {
        let deadline = now + deferred.delay;
        let pos = self.pending.iter()
            .position(|(t, _)| *t > deadline)
            .unwrap_or(self.pending.len());
        self.pending.insert(pos, (deadline, deferred.effect));
    }

    /// Remove and return every effect whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Effect> {
        let due = self.pending.iter().take_while(|(t, _)| *t <= now).count();
        self.pending.drain(..due).map(|(_, e)| e).collect()
    }

    /// Drop everything pending (used on restart).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|(t, _)| *t)
    }
}
