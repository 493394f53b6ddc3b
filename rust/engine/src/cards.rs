use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::GameError;

/// Highest number printed on a card. A pile is complete once it reaches it.
pub const MAX_NUMBER: u8 = 5;

/// Number of distinct colours in the deck.
pub const COLOUR_COUNT: usize = 5;

/// Total size of a freshly generated deck (10 cards per colour).
pub const DECK_SIZE: usize = 50;

/// One of the five card colours.
///
/// The declaration order is the canonical iteration order used when the
/// unshuffled deck is built, so it must stay stable for seeded decks to stay
/// reproducible.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    Red,
    Blue,
    Yellow,
    White,
    Green,
}

impl Colour {
    pub fn as_str(&self) -> &'static str {
        match self {
            Colour::Red => "red",
            Colour::Blue => "blue",
            Colour::Yellow => "yellow",
            Colour::White => "white",
            Colour::Green => "green",
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Colour {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_colours()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownColour(s.to_string()))
    }
}

/// A single card: a number from 1 to 5 in one colour.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card {
    /// Face value, 1 through [`MAX_NUMBER`]
    pub number: u8,
    /// Colour of the card, which selects the pile it can be played on
    pub colour: Colour,
}

impl Card {
    pub fn new(number: u8, colour: Colour) -> Self {
        Self { number, colour }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.colour, self.number)
    }
}

pub fn all_colours() -> [Colour; COLOUR_COUNT] {
    [
        Colour::Red,
        Colour::Blue,
        Colour::Yellow,
        Colour::White,
        Colour::Green,
    ]
}

pub fn all_numbers() -> [u8; MAX_NUMBER as usize] {
    [1, 2, 3, 4, 5]
}

/// How many copies of `number` each colour has: three 1s, two each of 2-4
/// and a single 5. Numbers outside 1..=5 have no copies.
pub fn copies_of(number: u8) -> usize {
    match number {
        1 => 3,
        2..=4 => 2,
        5 => 1,
        _ => 0,
    }
}

/// The unshuffled 50-card multiset, colour-major.
pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(DECK_SIZE);
    for &colour in &all_colours() {
        for &number in &all_numbers() {
            for _ in 0..copies_of(number) {
                v.push(Card { number, colour });
            }
        }
    }
    v
}
