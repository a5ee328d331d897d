/// Events emitted by a transition, and effects it wants applied later.
/// The presentation layer consumes events for redraws and sound.

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    BoardDealt,
    CardRevealed { index: usize },
    PairMatched { first: usize, second: usize },
    Mismatch { first: usize, second: usize },
    AttemptsChanged { remaining: u32 },
    CardsHidden { first: usize, second: usize },
    OutcomeAnnounced { won: bool },
    OutcomeHidden,
}

/// Work the state machine defers to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Flip the unresolved mismatch back and release the turn-lock.
    HideMismatch,
    AnnounceOutcome { won: bool },
}

/// "Apply `effect` after `delay`."
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deferred {
    pub delay: Duration,
    pub effect: Effect,
}

/// Result of one input transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub events: Vec<GameEvent>,
    pub deferred: Option<Deferred>,
}

impl Step {
    pub fn is_noop(&self) -> bool {
        self.events.is_empty() && self.deferred.is_none()
    }
}
