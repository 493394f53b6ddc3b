use crate::cards::{copies_of, Card, Colour};
use crate::errors::GameError;
use crate::game::{EndReason, GameState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a clue reveals: the card's number or its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueKind {
    Number,
    #[serde(alias = "color")]
    Colour,
}

impl ClueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClueKind::Number => "number",
            ClueKind::Colour => "colour",
        }
    }
}

impl fmt::Display for ClueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClueKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "number" => Ok(ClueKind::Number),
            "colour" | "color" => Ok(ClueKind::Colour),
            _ => Err(GameError::UnknownClueKind(s.to_string())),
        }
    }
}

/// A move by the player whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Play the card at `card_index` onto its colour's pile
    Play { card_index: usize },
    /// Discard the card at `card_index` to regain an info token
    Discard { card_index: usize },
    /// Tell `target` the number or colour of their card at `card_index`
    Clue {
        kind: ClueKind,
        target: String,
        card_index: usize,
    },
}

/// Information a clue handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revealed {
    Number(u8),
    Colour(Colour),
}

/// What a move did to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum MoveEffect {
    Played { card: Card },
    Misplayed { card: Card, lives_left: u8 },
    Discarded { card: Card, info: u8 },
    Clued { target: String, revealed: Revealed },
}

/// Result of an applied move, returned to the caller and broadcast by
/// transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Player who made the move
    pub player: String,
    #[serde(flatten)]
    pub effect: MoveEffect,
    /// Set when this move ended the game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<EndReason>,
}

/// A card can go on its pile when the pile is empty and the card is a 1, or
/// when it is exactly one above the pile's top.
///
/// ```
/// use hanabi_engine::cards::{Card, Colour};
/// use hanabi_engine::rules::is_valid_play;
///
/// assert!(is_valid_play(Card::new(1, Colour::Red), None));
/// assert!(is_valid_play(Card::new(3, Colour::Red), Some(2)));
/// assert!(!is_valid_play(Card::new(2, Colour::Red), None));
/// assert!(!is_valid_play(Card::new(2, Colour::Red), Some(2)));
/// ```
pub fn is_valid_play(card: Card, top: Option<u8>) -> bool {
    match top {
        None => card.number == 1,
        Some(top) => top + 1 == card.number,
    }
}

/// True when discarding `card` would throw away the last copy its pile
/// still needs, so the pile can never pass `card.number - 1`.
pub fn exhausts_last_copy(state: &GameState, card: Card) -> bool {
    let pile_below = state.top_of_stack(card.colour).unwrap_or(0) < card.number;
    pile_below && state.discarded_copies(card) + 1 >= copies_of(card.number)
}

/// Checks the caller contract for `mv` against `state` without applying it.
///
/// # Errors
///
/// - [`GameError::NotStarted`] before `start`
/// - [`GameError::GameOver`] once the game has ended
/// - [`GameError::CardIndexOutOfRange`] for an index past the relevant hand
/// - [`GameError::PlayerNotFound`], [`GameError::CannotClueSelf`] and
///   [`GameError::NoInfoTokens`] for clues
pub fn validate_move(state: &GameState, mv: &Move) -> Result<(), GameError> {
    let current = state.current_player().ok_or(GameError::NotStarted)?;
    if state.is_game_over() {
        return Err(GameError::GameOver);
    }
    match mv {
        Move::Play { card_index } | Move::Discard { card_index } => {
            state.card_at(current, *card_index)?;
        }
        Move::Clue {
            target, card_index, ..
        } => {
            if !state.has_player(target) {
                return Err(GameError::PlayerNotFound(target.clone()));
            }
            if target == current {
                return Err(GameError::CannotClueSelf);
            }
            if state.info() == 0 {
                return Err(GameError::NoInfoTokens);
            }
            state.card_at(target, *card_index)?;
        }
    }
    Ok(())
}

/// Every move the current player may make right now. Empty before the game
/// starts and after it ends.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let Some(current) = state.current_player() else {
        return Vec::new();
    };
    if state.is_game_over() {
        return Vec::new();
    }
    let own = state.player(current).map_or(0, |p| p.hand_size());
    let mut moves = Vec::new();
    for card_index in 0..own {
        moves.push(Move::Play { card_index });
        moves.push(Move::Discard { card_index });
    }
    if state.info() > 0 {
        for target in state.players().iter().filter(|p| p.name != current) {
            for card_index in 0..target.hand_size() {
                for kind in [ClueKind::Number, ClueKind::Colour] {
                    moves.push(Move::Clue {
                        kind,
                        target: target.name.clone(),
                        card_index,
                    });
                }
            }
        }
    }
    moves
}
