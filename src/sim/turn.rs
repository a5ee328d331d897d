/// Turn transitions: the whole game state machine.
///
/// Every function here is synchronous and clock-free. Anything that must
/// happen "later" is returned as a `Deferred` for the caller to schedule;
/// the turn-lock keeps input out until the caller applies it.
///
///   select_card ──(2nd card)──▶ resolve_turn ──▶ match    → unlock now, maybe AnnounceOutcome(win)
///                                             └─▶ mismatch → HideMismatch, or AnnounceOutcome(loss)
///   apply_effect: runs a due Deferred
///   reset:        new game, fresh deal

use tracing::{debug, info};

use crate::config::TimingConfig;
use crate::domain::card::CardState;
use super::event::{Deferred, Effect, GameEvent, Step};
use super::session::{GameSession, Phase, MAX_ATTEMPTS};

// ══════════════════════════════════════════════════════════════
// Selection
// ══════════════════════════════════════════════════════════════

/// Flip the card at `index`.
///
/// Silently ignored while locked, when two cards are already up this turn,
/// after the game is decided, or when the card is not hidden (or doesn't exist).
pub fn select_card(s: &mut GameSession, index: usize, timing: &TimingConfig) -> Step {
    if !s.accepts_input() { return Step::default(); }
    match s.card(index) {
        Some(card) if card.is_selectable() => {}
        _ => return Step::default(),
    }

    s.cards[index].state = CardState::Revealed;
    s.unresolved.push(index);
    debug!(index, symbol = ?s.cards[index].symbol(), "card revealed");

    let mut step = Step {
        events: vec![GameEvent::CardRevealed { index }],
        deferred: None,
    };

    if s.unresolved.len() == 2 {
        let resolved = resolve_turn(s, timing);
        step.events.extend(resolved.events);
        step.deferred = resolved.deferred;
    }
    step
}

// ══════════════════════════════════════════════════════════════
// Resolution
// ══════════════════════════════════════════════════════════════

/// Compare the two unresolved cards. No-op unless exactly two are up and
/// the turn has not been resolved yet.
pub fn resolve_turn(s: &mut GameSession, timing: &TimingConfig) -> Step {
    if s.locked || s.phase != Phase::Playing { return Step::default(); }
    let (first, second) = match s.unresolved_pair() {
        Some(pair) => pair,
        None => return Step::default(),
    };
    s.locked = true;

    if s.cards[first].pairs_with(&s.cards[second]) {
        resolve_match(s, first, second, timing)
    } else {
        resolve_mismatch(s, first, second, timing)
    }
}

fn resolve_match(s: &mut GameSession, first: usize, second: usize, timing: &TimingConfig) -> Step {
    s.matched_pairs += 1;
    s.cards[first].state = CardState::Matched;
    s.cards[second].state = CardState::Matched;
    end_turn(s);
    debug!(first, second, matched = s.matched_pairs, "pair matched");

    let mut step = Step {
        events: vec![GameEvent::PairMatched { first, second }],
        deferred: None,
    };

    if s.matched_pairs == s.total_pairs() {
        s.phase = Phase::Won;
        info!(attempts_left = s.attempts_remaining, "all pairs matched");
        step.deferred = Some(Deferred {
            delay: timing.win_delay(),
            effect: Effect::AnnounceOutcome { won: true },
        });
    }
    step
}

fn resolve_mismatch(s: &mut GameSession, first: usize, second: usize, timing: &TimingConfig) -> Step {
    s.attempts_remaining = s.attempts_remaining.saturating_sub(1);
    debug!(first, second, remaining = s.attempts_remaining, "mismatch");

    let events = vec![
        GameEvent::Mismatch { first, second },
        GameEvent::AttemptsChanged { remaining: s.attempts_remaining },
    ];

    // Last attempt: the pair stays face up and the lock is never released.
    let deferred = if s.attempts_remaining == 0 {
        s.phase = Phase::Lost;
        info!(matched = s.matched_pairs, "out of attempts");
        Deferred { delay: timing.loss_delay(), effect: Effect::AnnounceOutcome { won: false } }
    } else {
        Deferred { delay: timing.mismatch_delay(), effect: Effect::HideMismatch }
    };

    Step { events, deferred: Some(deferred) }
}

fn end_turn(s: &mut GameSession) {
    s.unresolved.clear();
    s.locked = false;
}

// ══════════════════════════════════════════════════════════════
// Deferred effects
// ══════════════════════════════════════════════════════════════

pub fn apply_effect(s: &mut GameSession, effect: Effect) -> Vec<GameEvent> {
    match effect {
        Effect::HideMismatch => hide_mismatch(s),
        Effect::AnnounceOutcome { won } => announce(s, won),
    }
}

fn hide_mismatch(s: &mut GameSession) -> Vec<GameEvent> {
    if s.phase != Phase::Playing { return vec![]; }
    let (first, second) = match s.unresolved_pair() {
        Some(pair) => pair,
        None => return vec![],
    };
    for i in [first, second] {
        if s.cards[i].state == CardState::Revealed {
            s.cards[i].state = CardState::Hidden;
        }
    }
    end_turn(s);
    vec![GameEvent::CardsHidden { first, second }]
}

fn announce(s: &mut GameSession, won: bool) -> Vec<GameEvent> {
    let expected = if won { Phase::Won } else { Phase::Lost };
    if s.phase != expected || s.outcome_visible { return vec![]; }
    s.outcome_visible = true;
    vec![GameEvent::OutcomeAnnounced { won }]
}

// ══════════════════════════════════════════════════════════════
// Reset
// ══════════════════════════════════════════════════════════════

/// Start over: full budget, no pairs, no message, reshuffled board.
pub fn reset(s: &mut GameSession) -> Vec<GameEvent> {
    s.attempts_remaining = MAX_ATTEMPTS;
    s.matched_pairs = 0;
    end_turn(s);
    s.phase = Phase::Playing;
    s.outcome_visible = false;
    s.deal();
    info!(deal = s.deals, "new game");

    vec![
        GameEvent::OutcomeHidden,
        GameEvent::AttemptsChanged { remaining: MAX_ATTEMPTS },
        GameEvent::BoardDealt,
    ]
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::Symbol;
    use std::time::Duration;

    fn timing() -> TimingConfig {
        TimingConfig::default()
    }

    fn session() -> GameSession {
        GameSession::new(Some(42))
    }

    /// Indices of the two cards showing `sym`.
    fn pair_of(s: &GameSession, sym: Symbol) -> (usize, usize) {
        let idx: Vec<usize> = s.cards.iter()
            .filter(|c| c.symbol() == sym)
            .map(|c| c.index)
            .collect();
        (idx[0], idx[1])
    }

    /// Two hidden cards with different symbols.
    fn mismatch_of(s: &GameSession) -> (usize, usize) {
        for a in &s.cards {
            for b in &s.cards {
                if a.is_selectable() && b.is_selectable() && a.symbol() != b.symbol() {
                    return (a.index, b.index);
                }
            }
        }
        panic!("no mismatch left on board");
    }

    fn states(s: &GameSession) -> Vec<CardState> {
        s.cards.iter().map(|c| c.state).collect()
    }

    // ── Selection ──

    #[test]
    fn first_selection_reveals_only() {
        let mut s = session();
        let step = select_card(&mut s, 0, &timing());
        assert_eq!(step.events, vec![GameEvent::CardRevealed { index: 0 }]);
        assert!(step.deferred.is_none());
        assert_eq!(s.cards[0].state, CardState::Revealed);
        assert_eq!(s.unresolved, vec![0]);
        assert!(!s.locked);
    }

    #[test]
    fn reselecting_revealed_card_is_noop() {
        let mut s = session();
        select_card(&mut s, 3, &timing());
        let before = states(&s);
        let step = select_card(&mut s, 3, &timing());
        assert!(step.is_noop());
        assert_eq!(states(&s), before);
        assert_eq!(s.unresolved, vec![3]);
    }

    #[test]
    fn out_of_range_is_noop() {
        let mut s = session();
        assert!(select_card(&mut s, 6, &timing()).is_noop());
        assert!(select_card(&mut s, usize::MAX, &timing()).is_noop());
        assert!(s.unresolved.is_empty());
    }

    #[test]
    fn third_card_while_two_pending_is_noop() {
        let mut s = session();
        let (a, b) = mismatch_of(&s);
        select_card(&mut s, a, &timing());
        select_card(&mut s, b, &timing());
        let third = (0..6).find(|&i| i != a && i != b).unwrap();

        let before = states(&s);
        let attempts = s.attempts_remaining;
        let step = select_card(&mut s, third, &timing());
        assert!(step.is_noop());
        assert_eq!(states(&s), before);
        assert_eq!(s.unresolved, vec![a, b]);
        assert_eq!(s.attempts_remaining, attempts);
    }

    #[test]
    fn locked_board_ignores_input() {
        let mut s = session();
        s.locked = true;
        assert!(select_card(&mut s, 0, &timing()).is_noop());
        assert_eq!(s.cards[0].state, CardState::Hidden);
    }

    // ── Match ──

    #[test]
    fn match_scores_without_costing_attempts() {
        let mut s = session();
        let (a, b) = pair_of(&s, Symbol::A);
        select_card(&mut s, a, &timing());
        let step = select_card(&mut s, b, &timing());

        assert_eq!(step.events, vec![
            GameEvent::CardRevealed { index: b },
            GameEvent::PairMatched { first: a, second: b },
        ]);
        assert!(step.deferred.is_none());
        assert_eq!(s.matched_pairs, 1);
        assert_eq!(s.attempts_remaining, MAX_ATTEMPTS);
        assert_eq!(s.cards[a].state, CardState::Matched);
        assert_eq!(s.cards[b].state, CardState::Matched);
        assert!(s.unresolved.is_empty());
        assert!(!s.locked);
    }

    #[test]
    fn matched_cards_never_reenter_play() {
        let mut s = session();
        let (a, b) = pair_of(&s, Symbol::B);
        select_card(&mut s, a, &timing());
        select_card(&mut s, b, &timing());

        assert!(select_card(&mut s, a, &timing()).is_noop());
        assert!(select_card(&mut s, b, &timing()).is_noop());
        assert!(s.unresolved.is_empty());

        // Still no-op mid-turn
        let (c, _) = pair_of(&s, Symbol::C);
        select_card(&mut s, c, &timing());
        assert!(select_card(&mut s, a, &timing()).is_noop());
        assert_eq!(s.unresolved, vec![c]);
        assert_eq!(s.matched_pairs, 1);
    }

    #[test]
    fn last_pair_schedules_win() {
        let mut s = session();
        let mut last = None;
        for sym in [Symbol::A, Symbol::B, Symbol::C] {
            let (a, b) = pair_of(&s, sym);
            select_card(&mut s, a, &timing());
            last = Some(select_card(&mut s, b, &timing()));
        }
        let last = last.unwrap();
        assert_eq!(s.matched_pairs, s.total_pairs());
        assert_eq!(s.phase, Phase::Won);
        assert_eq!(last.deferred, Some(Deferred {
            delay: Duration::from_millis(500),
            effect: Effect::AnnounceOutcome { won: true },
        }));
        assert!(!s.outcome_visible);

        let events = apply_effect(&mut s, Effect::AnnounceOutcome { won: true });
        assert_eq!(events, vec![GameEvent::OutcomeAnnounced { won: true }]);
        assert!(s.outcome_visible);
        // Announcing twice does nothing
        assert!(apply_effect(&mut s, Effect::AnnounceOutcome { won: true }).is_empty());
    }

    // ── Mismatch ──

    #[test]
    fn mismatch_costs_one_attempt_then_hides() {
        let mut s = session();
        let (a, b) = mismatch_of(&s);
        select_card(&mut s, a, &timing());
        let step = select_card(&mut s, b, &timing());

        assert_eq!(s.attempts_remaining, MAX_ATTEMPTS - 1);
        assert!(step.events.contains(&GameEvent::Mismatch { first: a, second: b }));
        assert!(step.events.contains(&GameEvent::AttemptsChanged { remaining: 2 }));
        assert_eq!(step.deferred, Some(Deferred {
            delay: Duration::from_millis(1200),
            effect: Effect::HideMismatch,
        }));
        assert!(s.locked);
        assert_eq!(s.cards[a].state, CardState::Revealed);

        let events = apply_effect(&mut s, Effect::HideMismatch);
        assert_eq!(events, vec![GameEvent::CardsHidden { first: a, second: b }]);
        assert_eq!(s.cards[a].state, CardState::Hidden);
        assert_eq!(s.cards[b].state, CardState::Hidden);
        assert!(s.unresolved.is_empty());
        assert!(!s.locked);
        assert_eq!(s.attempts_remaining, 2);

        // Both selectable again
        assert!(!select_card(&mut s, a, &timing()).is_noop());
    }

    #[test]
    fn mismatch_touches_only_the_two_cards() {
        let mut s = session();
        let (pa, pb) = pair_of(&s, Symbol::A);
        select_card(&mut s, pa, &timing());
        select_card(&mut s, pb, &timing());

        let (a, b) = mismatch_of(&s);
        select_card(&mut s, a, &timing());
        select_card(&mut s, b, &timing());
        apply_effect(&mut s, Effect::HideMismatch);

        assert_eq!(s.cards[pa].state, CardState::Matched);
        assert_eq!(s.cards[pb].state, CardState::Matched);
        let hidden = s.cards.iter().filter(|c| c.state == CardState::Hidden).count();
        assert_eq!(hidden, 4);
    }

    #[test]
    fn third_mismatch_loses_and_freezes_board() {
        let mut s = session();
        let mut last = None;
        for _ in 0..MAX_ATTEMPTS {
            let (a, b) = mismatch_of(&s);
            select_card(&mut s, a, &timing());
            last = Some(select_card(&mut s, b, &timing()));
            if s.phase == Phase::Playing {
                apply_effect(&mut s, Effect::HideMismatch);
            }
        }
        let last = last.unwrap();
        assert_eq!(s.attempts_remaining, 0);
        assert_eq!(s.phase, Phase::Lost);
        assert_eq!(last.deferred, Some(Deferred {
            delay: Duration::from_millis(1200),
            effect: Effect::AnnounceOutcome { won: false },
        }));

        // Final pair stays face up, board stays locked
        let (a, b) = s.unresolved_pair().unwrap();
        assert_eq!(s.cards[a].state, CardState::Revealed);
        assert_eq!(s.cards[b].state, CardState::Revealed);
        assert!(s.locked);

        // A stray hide does not flip them back
        assert!(apply_effect(&mut s, Effect::HideMismatch).is_empty());
        assert_eq!(s.cards[a].state, CardState::Revealed);

        let events = apply_effect(&mut s, Effect::AnnounceOutcome { won: false });
        assert_eq!(events, vec![GameEvent::OutcomeAnnounced { won: false }]);

        let hidden = s.cards.iter().find(|c| c.is_selectable()).unwrap().index;
        assert!(select_card(&mut s, hidden, &timing()).is_noop());
    }

    #[test]
    fn mismatched_outcome_kind_is_ignored() {
        let mut s = session();
        assert!(apply_effect(&mut s, Effect::AnnounceOutcome { won: true }).is_empty());
        assert!(apply_effect(&mut s, Effect::AnnounceOutcome { won: false }).is_empty());
        assert!(!s.outcome_visible);
    }

    #[test]
    fn resolve_without_two_cards_is_noop() {
        let mut s = session();
        assert!(resolve_turn(&mut s, &timing()).is_noop());
        select_card(&mut s, 0, &timing());
        assert!(resolve_turn(&mut s, &timing()).is_noop());
        assert!(!s.locked);
    }

    #[test]
    fn resolve_twice_is_noop() {
        let mut s = session();
        let (a, b) = mismatch_of(&s);
        select_card(&mut s, a, &timing());
        select_card(&mut s, b, &timing());
        assert_eq!(s.attempts_remaining, MAX_ATTEMPTS - 1);

        // Pair still up while the hide is pending
        assert!(resolve_turn(&mut s, &timing()).is_noop());
        assert_eq!(s.attempts_remaining, MAX_ATTEMPTS - 1);
        assert_eq!(s.unresolved_pair(), Some((a, b)));
    }

    #[test]
    fn resolve_after_loss_is_noop() {
        let mut s = session();
        for _ in 0..MAX_ATTEMPTS {
            let (a, b) = mismatch_of(&s);
            select_card(&mut s, a, &timing());
            select_card(&mut s, b, &timing());
            if s.phase == Phase::Playing {
                apply_effect(&mut s, Effect::HideMismatch);
            }
        }
        assert_eq!(s.phase, Phase::Lost);
        assert!(resolve_turn(&mut s, &timing()).is_noop());
        assert_eq!(s.attempts_remaining, 0);
        assert_eq!(s.phase, Phase::Lost);
    }

    #[test]
    fn custom_delays_flow_through() {
        let t = TimingConfig { mismatch_delay_ms: 50, ..TimingConfig::default() };
        let mut s = session();
        let (a, b) = mismatch_of(&s);
        select_card(&mut s, a, &t);
        let step = select_card(&mut s, b, &t);
        assert_eq!(step.deferred.map(|d| d.delay), Some(Duration::from_millis(50)));
    }

    // ── Reset ──

    #[test]
    fn reset_mid_game_restores_everything() {
        let mut s = session();
        let (pa, pb) = pair_of(&s, Symbol::C);
        select_card(&mut s, pa, &timing());
        select_card(&mut s, pb, &timing());
        let (a, b) = mismatch_of(&s);
        select_card(&mut s, a, &timing());
        select_card(&mut s, b, &timing());
        assert!(s.locked);

        let events = reset(&mut s);
        assert_eq!(events, vec![
            GameEvent::OutcomeHidden,
            GameEvent::AttemptsChanged { remaining: MAX_ATTEMPTS },
            GameEvent::BoardDealt,
        ]);
        assert_eq!(s.attempts_remaining, MAX_ATTEMPTS);
        assert_eq!(s.matched_pairs, 0);
        assert!(s.unresolved.is_empty());
        assert!(!s.locked);
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.deals, 2);
        assert!(s.cards.iter().all(|c| c.state == CardState::Hidden));
    }

    #[test]
    fn reset_after_loss_hides_outcome() {
        let mut s = session();
        s.phase = Phase::Lost;
        s.outcome_visible = true;
        s.attempts_remaining = 0;
        reset(&mut s);
        assert!(!s.outcome_visible);
        assert!(s.accepts_input());
    }

    #[test]
    fn resets_keep_the_multiset() {
        let mut s = session();
        for _ in 0..20 {
            reset(&mut s);
            for sym in [Symbol::A, Symbol::B, Symbol::C] {
                assert_eq!(s.cards.iter().filter(|c| c.symbol() == sym).count(), 2);
            }
        }
    }

    #[test]
    fn resets_reshuffle() {
        let mut s = session();
        let first: Vec<Symbol> = s.cards.iter().map(|c| c.symbol()).collect();
        let changed = (0..30).any(|_| {
            reset(&mut s);
            s.cards.iter().map(|c| c.symbol()).collect::<Vec<_>>() != first
        });
        assert!(changed);
    }
}
