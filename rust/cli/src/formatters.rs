//! Card, table and move formatters for terminal display.
//!
//! Pure functions; nothing here reads the environment.
//!
//! ```rust
//! use hanabi_engine::cards::{Card, Colour};
//! use hanabi_cli::formatters::{format_card, format_hand};
//!
//! assert_eq!(format_card(&Card::new(3, Colour::Blue)), "B3");
//! assert_eq!(format_hand(&[Card::new(1, Colour::Red)]), "[R1]");
//! ```

use hanabi_engine::cards::{Card, Colour, all_colours};
use hanabi_engine::game::{EndReason, GameState};
use hanabi_engine::player::Player;
use hanabi_engine::rules::{MoveEffect, MoveOutcome, Revealed};

pub fn colour_letter(colour: Colour) -> char {
    match colour {
        Colour::Red => 'R',
        Colour::Blue => 'B',
        Colour::Yellow => 'Y',
        Colour::White => 'W',
        Colour::Green => 'G',
    }
}

pub fn format_card(card: &Card) -> String {
    format!("{}{}", colour_letter(card.colour), card.number)
}

pub fn format_hand(cards: &[Card]) -> String {
    let parts: Vec<String> = cards.iter().map(format_card).collect();
    format!("[{}]", parts.join(" "))
}

/// A hand as its owner sees it: card backs plus what clues revealed.
pub fn format_hidden_hand(player: &Player) -> String {
    let backs = vec!["??"; player.hand_size()].join(" ");
    let numbers: Vec<String> = player.known_numbers.iter().map(u8::to_string).collect();
    let colours: Vec<&str> = player.known_colours.iter().map(Colour::as_str).collect();
    format!(
        "[{}] known numbers: {{{}}} known colours: {{{}}}",
        backs,
        numbers.join(", "),
        colours.join(", ")
    )
}

/// Pile tops in canonical colour order, `-` for an empty pile.
pub fn format_stacks(state: &GameState) -> String {
    all_colours()
        .into_iter()
        .map(|c| match state.top_of_stack(c) {
            Some(top) => format!("{}:{}", c, top),
            None => format!("{}:-", c),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_end_reason(reason: &EndReason) -> String {
    match reason {
        EndReason::UnwinnablePile { card } => {
            format!("the last {} was discarded", card)
        }
        EndReason::OutOfLives => "no lives left".to_string(),
        EndReason::AllPilesComplete => "every pile is complete".to_string(),
        EndReason::DeckExhausted => "the deck ran out".to_string(),
    }
}

pub fn format_outcome(outcome: &MoveOutcome) -> String {
    let who = &outcome.player;
    match &outcome.effect {
        MoveEffect::Played { card } => format!("{} played {}", who, card),
        MoveEffect::Misplayed { card, lives_left } => {
            format!("{} misplayed {} ({} lives left)", who, card, lives_left)
        }
        MoveEffect::Discarded { card, info } => {
            format!("{} discarded {} (info {})", who, card, info)
        }
        MoveEffect::Clued { target, revealed } => match revealed {
            Revealed::Number(n) => format!("{} told {} about their {}s", who, target, n),
            Revealed::Colour(c) => format!("{} told {} about their {} cards", who, target, c),
        },
    }
}

/// One-line token and pile summary.
pub fn format_status(state: &GameState) -> String {
    format!(
        "lives={} info={} deck={} score={} | {}",
        state.lives(),
        state.info(),
        state.deck().remaining(),
        state.score(),
        format_stacks(state)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanabi_engine::engine::Game;

    #[test]
    fn outcome_lines() {
        let played = MoveOutcome {
            player: "nick".into(),
            effect: MoveEffect::Played {
                card: Card::new(1, Colour::White),
            },
            ended: None,
        };
        assert_eq!(format_outcome(&played), "nick played white 1");

        let clued = MoveOutcome {
            player: "nick".into(),
            effect: MoveEffect::Clued {
                target: "nick2".into(),
                revealed: Revealed::Number(3),
            },
            ended: None,
        };
        assert_eq!(format_outcome(&clued), "nick told nick2 about their 3s");
    }

    #[test]
    fn stacks_show_dash_when_empty() {
        let game = Game::new(1);
        assert_eq!(
            format_stacks(game.current()),
            "red:- blue:- yellow:- white:- green:-"
        );
    }

    #[test]
    fn hidden_hand_shows_only_knowledge() {
        let mut p = Player::new("ann");
        p.give_card(Card::new(4, Colour::Red));
        p.learn_number(4);
        assert_eq!(
            format_hidden_hand(&p),
            "[??] known numbers: {4} known colours: {}"
        );
    }
}
