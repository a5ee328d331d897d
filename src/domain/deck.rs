/// The fixed card multiset and board dealing.
///
/// Every deal starts from `CARD_VALUES` (each symbol twice) and applies a
/// Fisher-Yates shuffle: for i from last to first, swap with j in [0, i].

use rand::Rng;

use super::card::{Card, Symbol};

pub const CARD_VALUES: [Symbol; 6] = [
    Symbol::A, Symbol::B, Symbol::C,
    Symbol::A, Symbol::B, Symbol::C,
];

pub const TOTAL_PAIRS: usize = CARD_VALUES.len() / 2;

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffle the fixed values and lay out one hidden card per position.
pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut values = CARD_VALUES;
    shuffle(&mut values, rng);
    values.iter()
        .enumerate()
        .map(|(i, &sym)| Card::new(i, sym))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::CardState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn count(cards: &[Card], sym: Symbol) -> usize {
        cards.iter().filter(|c| c.symbol() == sym).count()
    }

    #[test]
    fn every_deal_has_each_symbol_twice() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let cards = deal(&mut rng);
            assert_eq!(cards.len(), 6);
            for sym in [Symbol::A, Symbol::B, Symbol::C] {
                assert_eq!(count(&cards, sym), 2);
            }
        }
    }

    #[test]
    fn deal_assigns_positions_and_hides_everything() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cards = deal(&mut rng);
        for (i, c) in cards.iter().enumerate() {
            assert_eq!(c.index, i);
            assert_eq!(c.state, CardState::Hidden);
        }
    }

    #[test]
    fn same_seed_same_order() {
        let a = deal(&mut ChaCha8Rng::seed_from_u64(99));
        let b = deal(&mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn deals_vary() {
        // 6!/(2!^3) = 90 distinct layouts; 50 deals landing on one is not plausible.
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let first: Vec<Symbol> = deal(&mut rng).iter().map(|c| c.symbol()).collect();
        let differs = (0..50).any(|_| {
            let next: Vec<Symbol> = deal(&mut rng).iter().map(|c| c.symbol()).collect();
            next != first
        });
        assert!(differs);
    }

    #[test]
    fn shuffle_covers_every_position() {
        // Each element should land in every slot at least once over many runs.
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = [[false; 4]; 4];
        for _ in 0..500 {
            let mut v = [0usize, 1, 2, 3];
            shuffle(&mut v, &mut rng);
            for (slot, &val) in v.iter().enumerate() {
                seen[val][slot] = true;
            }
        }
        assert!(seen.iter().all(|row| row.iter().all(|&s| s)));
    }

    #[test]
    fn shuffle_empty_and_single() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut empty: [u8; 0] = [];
        shuffle(&mut empty, &mut rng);
        let mut one = [42];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, [42]);
    }
}
