/// Board cursor for keyboard / gamepad play.
///
/// The board is laid out row-major, `BOARD_COLUMNS` wide. Moves clamp at
/// the edges instead of wrapping.

pub const BOARD_COLUMNS: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Nav {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Cursor {
    pub index: usize,
}

impl Cursor {
    pub fn step(&mut self, nav: Nav, card_count: usize) {
        if card_count == 0 { return; }
        let col = self.index % BOARD_COLUMNS;
        let next = match nav {
            Nav::Left if col > 0 => self.index - 1,
            Nav::Right if col + 1 < BOARD_COLUMNS => self.index + 1,
            Nav::Up if self.index >= BOARD_COLUMNS => self.index - BOARD_COLUMNS,
            Nav::Down => self.index + BOARD_COLUMNS,
            _ => self.index,
        };
        if next < card_count {
            self.index = next;
        }
    }
}

/// Number of rows needed for `card_count` cards.
pub fn board_rows(card_count: usize) -> usize {
    card_count.div_ceil(BOARD_COLUMNS)
}
