//! Rule-based bot that reads its own hand.
//!
//! The engine keeps every hand in one snapshot, so a bot handed the whole
//! state sees its own cards. This one uses that to play well enough to give
//! the simulator realistic, long games.

use crate::Strategy;
use hanabi_engine::cards::Card;
use hanabi_engine::game::{GameState, MAX_INFO};
use hanabi_engine::rules::{ClueKind, Move, exhausts_last_copy, is_valid_play};

/// Priority order:
/// 1. play a card that fits its pile
/// 2. below the info cap, discard a card whose number is already on its pile
/// 3. with info left, clue the next player about their first card
/// 4. discard the first card that does not doom a pile
/// 5. discard the first card
#[derive(Debug, Clone, Default)]
pub struct OracleStrategy;

impl OracleStrategy {
    pub fn new() -> Self {
        Self
    }

    fn is_dead(state: &GameState, card: Card) -> bool {
        state
            .top_of_stack(card.colour)
            .is_some_and(|top| card.number <= top)
    }
}

impl Strategy for OracleStrategy {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        if state.is_game_over() {
            return None;
        }
        let me = state.current_player()?;
        let hand = &state.player(me)?.cards;

        if let Some(card_index) = hand
            .iter()
            .position(|c| is_valid_play(*c, state.top_of_stack(c.colour)))
        {
            return Some(Move::Play { card_index });
        }

        if state.info() < MAX_INFO {
            if let Some(card_index) = hand.iter().position(|c| Self::is_dead(state, *c)) {
                return Some(Move::Discard { card_index });
            }
        }

        if state.info() > 0 {
            let target = state
                .players()
                .iter()
                .skip_while(|p| p.name != me)
                .skip(1)
                .chain(state.players().iter())
                .find(|p| p.name != me && p.hand_size() > 0);
            if let Some(target) = target {
                return Some(Move::Clue {
                    kind: ClueKind::Number,
                    target: target.name.clone(),
                    card_index: 0,
                });
            }
        }

        if hand.is_empty() {
            return None;
        }
        let card_index = hand
            .iter()
            .position(|c| !exhausts_last_copy(state, *c))
            .unwrap_or(0);
        Some(Move::Discard { card_index })
    }

    fn name(&self) -> &str {
        "oracle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanabi_engine::engine::Game;
    use hanabi_engine::rules::validate_move;

    fn started(seed: u64, players: usize) -> Game {
        let mut game = Game::new(seed);
        for i in 0..players {
            game.add_player(&format!("p{i}")).unwrap();
        }
        game.start().unwrap();
        game
    }

    #[test]
    fn plays_a_playable_card_first() {
        let game = (0..200)
            .map(|s| started(s, 2))
            .find(|g| g.current().player("p0").unwrap().cards.iter().any(|c| c.number == 1))
            .unwrap();
        let mv = OracleStrategy::new().choose_move(game.current()).unwrap();
        let Move::Play { card_index } = mv else {
            panic!("expected a play, got {mv:?}");
        };
        assert_eq!(game.current().card_at("p0", card_index).unwrap().number, 1);
    }

    #[test]
    fn full_games_finish_with_valid_moves() {
        for seed in 0..20 {
            let mut game = started(seed, 2 + (seed as usize % 3));
            let mut bot = OracleStrategy::new();
            while let Some(mv) = bot.choose_move(game.current()) {
                assert!(validate_move(game.current(), &mv).is_ok(), "{mv:?}");
                game.apply(mv).unwrap();
            }
            assert!(game.current().is_game_over());
        }
    }

    #[test]
    fn nothing_to_do_before_start() {
        let game = Game::new(1);
        assert_eq!(OracleStrategy::new().choose_move(game.current()), None);
    }
}
