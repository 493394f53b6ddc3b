use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::cards::{full_deck, Card};

/// Returns a seeded permutation of `items`, leaving the input untouched.
///
/// Fisher-Yates walking `n` down from `len - 1` to `1`, drawing the swap
/// partner uniformly from `0..=n`. The same seed and input always yield the
/// same output.
///
/// ```
/// use hanabi_engine::deck::shuffle;
///
/// let items = [1, 2, 3, 4, 5, 6];
/// assert_eq!(shuffle(7, &items), shuffle(7, &items));
/// ```
pub fn shuffle<T: Clone>(seed: u64, items: &[T]) -> Vec<T> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut out = items.to_vec();
    for n in (1..out.len()).rev() {
        let i = rng.random_range(0..=n);
        out.swap(n, i);
    }
    out
}

/// Builds the 50-card deck and shuffles it with `seed`.
pub fn generate_deck(seed: u64) -> Vec<Card> {
    shuffle(seed, &full_deck())
}

/// Draw pile, consumed from the front.
///
/// The order is fixed by the seed at construction and never changes
/// afterwards; dealing only removes cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            cards: generate_deck(seed).into(),
        }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    pub fn peek(&self) -> Option<&Card> {
        self.cards.front()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_handles_empty_and_single() {
        let empty: Vec<u8> = Vec::new();
        assert!(shuffle(1, &empty).is_empty());
        assert_eq!(shuffle(1, &[9]), vec![9]);
    }

    #[test]
    fn shuffle_does_not_mutate_input() {
        let items: Vec<u32> = (0..20).collect();
        let copy = items.clone();
        let _ = shuffle(99, &items);
        assert_eq!(items, copy);
    }

    #[test]
    fn deck_deals_from_the_front() {
        let mut deck = Deck::new_with_seed(5);
        let first = *deck.peek().expect("deck has cards");
        assert_eq!(deck.deal_card(), Some(first));
        assert_eq!(deck.remaining(), 49);
    }

    #[test]
    fn iter_walks_the_draw_order() {
        let deck = Deck::new_with_seed(8);
        let order: Vec<Card> = deck.iter().copied().collect();
        assert_eq!(order, generate_deck(8));
    }

    #[test]
    fn deck_serializes_as_a_plain_list() {
        let deck = Deck::from_cards(vec![Card::new(1, crate::cards::Colour::Red)]);
        let json = serde_json::to_value(&deck).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["colour"], "red");
    }
}
