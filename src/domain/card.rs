/// Cards and their per-card state.
/// Selectability is queried via methods, so card semantics are centralized here.

/// Symbolic face value. Each symbol appears on exactly two cards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Symbol {
    A,
    B,
    C,
}

impl Symbol {
    pub fn glyph(self) -> char {
        match self {
            Symbol::A => 'A',
            Symbol::B => 'B',
            Symbol::C => 'C',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CardState {
    #[default]
    Hidden,
    Revealed,
    Matched, // terminal until the next deal
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Card {
    /// Position on the board (index into the dealt sequence).
    pub index: usize,
    symbol: Symbol,
    pub state: CardState,
}

impl Card {
    pub fn new(index: usize, symbol: Symbol) -> Self {
        Card { index, symbol, state: CardState::Hidden }
    }

    /// The face value. Fixed at deal time; there is no setter.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Can the player flip this card?
    pub fn is_selectable(&self) -> bool {
        self.state == CardState::Hidden
    }

    pub fn is_matched(&self) -> bool {
        self.state == CardState::Matched
    }

    pub fn pairs_with(&self, other: &Card) -> bool {
        self.index != other.index && self.symbol == other.symbol
    }
}
