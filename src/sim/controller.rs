/// GameController: the event-dispatch layer around the state machine.
///
/// Owns the session and the deferred-effect queue. Input commands and clock
/// ticks come in; presenter calls go out. Returned events are for side
/// channels (sound) that don't belong in the presenter.

use std::time::Instant;

use tracing::debug;

use crate::config::TimingConfig;
use crate::ui::presenter::{Command, Presenter};
use super::event::{GameEvent, Step};
use super::scheduler::Scheduler;
use super::session::GameSession;
use super::turn;

pub struct GameController {
    session: GameSession,
    scheduler: Scheduler,
    timing: TimingConfig,
}

impl GameController {
    pub fn new(seed: Option<u64>, timing: TimingConfig) -> Self {
        GameController {
            session: GameSession::new(seed),
            scheduler: Scheduler::new(),
            timing,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Push the initial state to a freshly attached presenter.
    pub fn attach<P: Presenter + ?Sized>(&self, p: &mut P) {
        p.hide_outcome();
        p.set_attempts_display(self.session.attempts_remaining);
        p.render_board(&self.session.cards);
    }

    pub fn handle<P: Presenter + ?Sized>(&mut self, cmd: Command, now: Instant, p: &mut P) -> Vec<GameEvent> {
        let step = match cmd {
            Command::Select(index) => turn::select_card(&mut self.session, index, &self.timing),
            Command::Restart => {
                // Stale hides/announcements must not reach the new board.
                self.scheduler.clear();
                Step { events: turn::reset(&mut self.session), deferred: None }
            }
        };
        if step.is_noop() { return Vec::new(); }
        if let Some(deferred) = step.deferred {
            debug!(effect = ?deferred.effect, delay_ms = deferred.delay.as_millis() as u64, "scheduled");
            self.scheduler.schedule(now, deferred);
        }
        self.present(&step.events, p);
        step.events
    }

    /// Apply every deferred effect that has come due.
    pub fn tick<P: Presenter + ?Sized>(&mut self, now: Instant, p: &mut P) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for effect in self.scheduler.pop_due(now) {
            events.extend(turn::apply_effect(&mut self.session, effect));
        }
        self.present(&events, p);
        events
    }

    /// True while a hide or an announcement is still pending.
    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        !self.scheduler.is_idle()
    }

    fn present<P: Presenter + ?Sized>(&self, events: &[GameEvent], p: &mut P) {
        let mut board_dirty = false;
        for event in events {
            match event {
                GameEvent::BoardDealt
                | GameEvent::CardRevealed { .. }
                | GameEvent::PairMatched { .. }
                | GameEvent::CardsHidden { .. } => board_dirty = true,
                GameEvent::AttemptsChanged { remaining } => p.set_attempts_display(*remaining),
                GameEvent::OutcomeAnnounced { won } => p.announce_outcome(*won),
                GameEvent::OutcomeHidden => p.hide_outcome(),
                GameEvent::Mismatch { .. } => {}
            }
        }
        if board_dirty {
            p.render_board(&self.session.cards);
        }
    }
}
