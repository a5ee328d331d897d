/// The presentation boundary.
///
/// The controller only ever talks to the screen through `Presenter`, and the
/// screen only ever talks back through `Command`s. Anything implementing the
/// trait (terminal renderer, test recorder) can host the game.

use crate::domain::card::Card;

pub trait Presenter {
    /// (Re)draw the whole board from the given cards.
    fn render_board(&mut self, cards: &[Card]);
    fn set_attempts_display(&mut self, remaining: u32);
    fn announce_outcome(&mut self, did_win: bool);
    fn hide_outcome(&mut self);
}

/// Player intents, produced by keyboard/gamepad handling.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    /// A card was activated (clicked / flipped).
    Select(usize),
    /// The "start over" control was used.
    Restart,
}
