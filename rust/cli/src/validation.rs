//! Parsing of hot-seat commands typed during `hanabi play`.

use hanabi_engine::rules::{ClueKind, Move};

/// Outcome of parsing one input line.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    /// A move for the current player
    Move(Move),
    /// Print the table again
    State,
    /// User entered `q` or `quit`
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parses one line (case-insensitive keywords):
/// - `play I` / `p I`
/// - `discard I` / `d I`
/// - `clue number|colour PLAYER I` / `c ...`
/// - `state` / `s`
/// - `quit` / `q`
///
/// Card indices are zero-based.
///
/// ```rust
/// use hanabi_cli::validation::{parse_play_input, ParseResult};
/// use hanabi_engine::rules::{ClueKind, Move};
///
/// assert_eq!(
///     parse_play_input("clue colour nick2 0"),
///     ParseResult::Move(Move::Clue { kind: ClueKind::Colour, target: "nick2".into(), card_index: 0 })
/// );
/// assert_eq!(parse_play_input("q"), ParseResult::Quit);
/// ```
pub fn parse_play_input(input: &str) -> ParseResult {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some(keyword) = parts.first() else {
        return ParseResult::Invalid("Empty input".to_string());
    };

    match keyword.to_ascii_lowercase().as_str() {
        "q" | "quit" if parts.len() == 1 => ParseResult::Quit,
        "s" | "state" if parts.len() == 1 => ParseResult::State,
        "p" | "play" => match parse_single_index(&parts) {
            Ok(card_index) => ParseResult::Move(Move::Play { card_index }),
            Err(msg) => ParseResult::Invalid(msg),
        },
        "d" | "discard" => match parse_single_index(&parts) {
            Ok(card_index) => ParseResult::Move(Move::Discard { card_index }),
            Err(msg) => ParseResult::Invalid(msg),
        },
        "c" | "clue" => {
            let [_, kind, target, index] = parts.as_slice() else {
                return ParseResult::Invalid(
                    "Usage: clue number|colour PLAYER INDEX".to_string(),
                );
            };
            let kind: ClueKind = match kind.parse() {
                Ok(k) => k,
                Err(e) => return ParseResult::Invalid(e.to_string()),
            };
            match parse_index(index) {
                Ok(card_index) => ParseResult::Move(Move::Clue {
                    kind,
                    target: (*target).to_string(),
                    card_index,
                }),
                Err(msg) => ParseResult::Invalid(msg),
            }
        }
        _ => ParseResult::Invalid(format!(
            "Unrecognised command: {} (expected play, discard, clue, state or quit)",
            input.trim()
        )),
    }
}

fn parse_single_index(parts: &[&str]) -> Result<usize, String> {
    match parts {
        [_, index] => parse_index(index),
        [keyword, ..] => Err(format!("Usage: {} INDEX", keyword)),
        [] => Err("Empty input".to_string()),
    }
}

fn parse_index(text: &str) -> Result<usize, String> {
    text.parse::<usize>()
        .map_err(|_| format!("Card index must be a non-negative number, got '{}'", text))
}
