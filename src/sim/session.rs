/// GameSession: the complete state of a running game.
///
/// Owned by the controller; nothing else mutates it. Transitions live in
/// `sim::turn`, this module only holds data plus read-only queries.
///
/// ## Invariants
///   - `unresolved.len()` is 0, 1 or 2
///   - `unresolved.len() == 2` implies `locked` until resolution completes
///   - `matched_pairs <= TOTAL_PAIRS`
///   - `attempts_remaining` never underflows; hitting 0 means `Phase::Lost`

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::card::Card;
use crate::domain::deck::{self, TOTAL_PAIRS};

pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

pub struct GameSession {
    pub cards: Vec<Card>,
    pub attempts_remaining: u32,
    pub matched_pairs: usize,
    /// Board indices flipped this turn, in selection order.
    pub unresolved: Vec<usize>,
    /// Turn-lock: input is ignored while a resolution is on display.
    pub locked: bool,
    /// Decided at resolution time, before the outcome is shown.
    pub phase: Phase,
    /// Whether the win/lose message is currently on screen.
    pub outcome_visible: bool,
    /// Number of deals since start (1 after the first game is set up).
    pub deals: u32,
    rng: ChaCha8Rng,
}

impl GameSession {
    /// New session with a freshly dealt board.
    /// `seed` makes the sequence of deals reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut session = GameSession {
            cards: Vec::new(),
            attempts_remaining: MAX_ATTEMPTS,
            matched_pairs: 0,
            unresolved: Vec::with_capacity(2),
            locked: false,
            phase: Phase::Playing,
            outcome_visible: false,
            deals: 0,
            rng,
        };
        session.deal();
        session
    }

    /// Board setup: replace every card with a fresh shuffled hidden board.
    pub(crate) fn deal(&mut self) {
        self.cards = deck::deal(&mut self.rng);
        self.deals += 1;
    }

    pub fn total_pairs(&self) -> usize {
        TOTAL_PAIRS
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// The two cards awaiting comparison, if a turn is complete.
    pub fn unresolved_pair(&self) -> Option<(usize, usize)> {
        match self.unresolved.as_slice() {
            &[a, b] => Some((a, b)),
            _ => None,
        }
    }

    /// Would a selection be considered at all right now?
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::Playing && !self.locked && self.unresolved.len() < 2
    }
}
