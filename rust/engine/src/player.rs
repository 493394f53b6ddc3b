use crate::cards::{Card, Colour};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cards each player holds while the deck lasts.
pub const HAND_SIZE: usize = 5;

/// Deck size divided by hand size; more players could not be dealt in.
pub const MAX_PLAYERS: usize = 10;

/// A seated player: their hand and what clues have told them so far.
///
/// Hand order is deal order. Indices into `cards` are how moves address a
/// card, and they shift down whenever a card leaves the hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique name, also the player's id
    pub name: String,
    /// Lobby flag set by the transport; the engine does not gate on it
    pub ready: bool,
    /// Hand in deal order
    pub cards: Vec<Card>,
    /// Colours revealed to this player by clues
    pub known_colours: BTreeSet<Colour>,
    /// Numbers revealed to this player by clues
    pub known_numbers: BTreeSet<u8>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ready: false,
            cards: Vec::with_capacity(HAND_SIZE),
            known_colours: BTreeSet::new(),
            known_numbers: BTreeSet::new(),
        }
    }

    pub fn hand_size(&self) -> usize {
        self.cards.len()
    }

    pub fn card_at(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn give_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Removes and returns the card at `index`; later cards shift down.
    pub fn take_card(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }

    pub fn learn_colour(&mut self, colour: Colour) -> bool {
        self.known_colours.insert(colour)
    }

    pub fn learn_number(&mut self, number: u8) -> bool {
        self.known_numbers.insert(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_card_shifts_later_cards_down() {
        let mut p = Player::new("ann");
        p.give_card(Card::new(1, Colour::Red));
        p.give_card(Card::new(2, Colour::Blue));
        p.give_card(Card::new(3, Colour::Green));

        assert_eq!(p.take_card(1), Some(Card::new(2, Colour::Blue)));
        assert_eq!(p.card_at(1), Some(Card::new(3, Colour::Green)));
        assert_eq!(p.take_card(5), None);
        assert_eq!(p.hand_size(), 2);
    }

    #[test]
    fn knowledge_has_set_semantics() {
        let mut p = Player::new("ann");
        assert!(p.learn_number(3));
        assert!(!p.learn_number(3));
        assert!(p.learn_colour(Colour::White));
        assert!(!p.learn_colour(Colour::White));
        assert_eq!(p.known_numbers.len(), 1);
        assert_eq!(p.known_colours.len(), 1);
    }
}
