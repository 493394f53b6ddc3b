use crate::errors::GameError;
use crate::game::{EndReason, GameState};
use crate::player::{Player, HAND_SIZE, MAX_PLAYERS};
use crate::rules::{
    exhausts_last_copy, is_valid_play, validate_move, ClueKind, Move, MoveEffect, MoveOutcome,
    Revealed,
};
use crate::store::GameStore;

/// One game: the state store plus the moves applied since the last reset.
///
/// Every mutation is routed through the store, so a rejected call leaves the
/// table as it was. `Game` is plain owned data; hosts that share it between
/// threads wrap it in a lock and call one method at a time.
///
/// # Examples
///
/// ```
/// use hanabi_engine::engine::Game;
///
/// let mut game = Game::new(123123123);
/// game.add_player("nick").unwrap();
/// game.add_player("nick2").unwrap();
/// game.start().unwrap();
///
/// assert_eq!(game.current().current_player(), Some("nick"));
/// assert_eq!(game.current().deck().remaining(), 40);
///
/// game.discard_card(0).unwrap();
/// assert_eq!(game.current().current_player(), Some("nick2"));
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    store: GameStore,
    history: Vec<Move>,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        Self {
            store: GameStore::new(GameState::new(seed)),
            history: Vec::new(),
        }
    }

    /// Throws the current table away and builds a fresh one from `seed`.
    pub fn reset(&mut self, seed: u64) {
        self.store.replace(GameState::new(seed));
        self.history.clear();
        tracing::debug!(seed, "game reset");
    }

    pub fn current(&self) -> &GameState {
        self.store.current()
    }

    /// Moves applied since the last reset, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.current().has_player(name)
    }

    pub fn score(&self) -> u32 {
        self.current().score()
    }

    pub fn add_player(&mut self, name: &str) -> Result<(), GameError> {
        self.store.update(|state| {
            if state.is_started() {
                return Err(GameError::AlreadyStarted);
            }
            if state.has_player(name) {
                return Err(GameError::PlayerExists(name.to_string()));
            }
            if state.players().len() >= MAX_PLAYERS {
                return Err(GameError::TableFull { max: MAX_PLAYERS });
            }
            state.push_player(Player::new(name));
            Ok(())
        })?;
        tracing::debug!(player = name, "player joined");
        Ok(())
    }

    pub fn remove_player(&mut self, name: &str) -> Result<(), GameError> {
        self.store.update(|state| {
            if state.is_started() {
                return Err(GameError::AlreadyStarted);
            }
            state
                .remove_player(name)
                .map(|_| ())
                .ok_or_else(|| GameError::PlayerNotFound(name.to_string()))
        })?;
        tracing::debug!(player = name, "player left");
        Ok(())
    }

    pub fn set_ready(&mut self, name: &str, ready: bool) -> Result<(), GameError> {
        self.store.update(|state| {
            state.player_mut(name)?.ready = ready;
            Ok(())
        })
    }

    /// Deals five cards to every player, one round at a time in join order,
    /// and hands the turn to the first player.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.store.update(|state| {
            if state.is_started() {
                return Err(GameError::AlreadyStarted);
            }
            let names: Vec<String> = state.players().iter().map(|p| p.name.clone()).collect();
            let first = names.first().cloned().ok_or(GameError::NoPlayers)?;
            for _ in 0..HAND_SIZE {
                for name in &names {
                    state.deal_to(name)?;
                }
            }
            state.set_current_player(Some(first));
            if state.deck().is_empty() {
                state.set_final_turns(Some(names.len()));
            }
            Ok(())
        })?;
        let state = self.current();
        tracing::info!(
            seed = state.seed(),
            players = state.players().len(),
            deck = state.deck().remaining(),
            "game started"
        );
        Ok(())
    }

    pub fn play_card(&mut self, card_index: usize) -> Result<MoveOutcome, GameError> {
        self.apply(Move::Play { card_index })
    }

    pub fn discard_card(&mut self, card_index: usize) -> Result<MoveOutcome, GameError> {
        self.apply(Move::Discard { card_index })
    }

    pub fn give_info(
        &mut self,
        kind: ClueKind,
        target: &str,
        card_index: usize,
    ) -> Result<MoveOutcome, GameError> {
        self.apply(Move::Clue {
            kind,
            target: target.to_string(),
            card_index,
        })
    }

    /// Validates and applies `mv` for the current player.
    ///
    /// # Errors
    ///
    /// Returns the [`GameError`] from [`validate_move`]; the state is
    /// unchanged in that case.
    pub fn apply(&mut self, mv: Move) -> Result<MoveOutcome, GameError> {
        let outcome = self.store.update(|state| {
            validate_move(state, &mv)?;
            let outcome = match &mv {
                Move::Play { card_index } => play(state, *card_index)?,
                Move::Discard { card_index } => discard(state, *card_index)?,
                Move::Clue {
                    kind,
                    target,
                    card_index,
                } => give_clue(state, *kind, target, *card_index)?,
            };
            Ok(finish_move(state, outcome))
        })?;
        self.history.push(mv);

        tracing::debug!(
            player = %outcome.player,
            effect = ?outcome.effect,
            "move applied"
        );
        if let Some(reason) = outcome.ended {
            tracing::info!(reason = ?reason, score = self.score(), "game over");
        }
        Ok(outcome)
    }
}

fn current_name(state: &GameState) -> Result<String, GameError> {
    state
        .current_player()
        .map(str::to_string)
        .ok_or(GameError::NotStarted)
}

fn play(state: &mut GameState, card_index: usize) -> Result<MoveOutcome, GameError> {
    let player = current_name(state)?;
    let card = state.card_at(&player, card_index)?;

    let effect = if is_valid_play(card, state.top_of_stack(card.colour)) {
        state.put_on_stack(card);
        MoveEffect::Played { card }
    } else {
        state.add_to_discard(card);
        state.remove_life();
        MoveEffect::Misplayed {
            card,
            lives_left: state.lives(),
        }
    };

    state.take_card(&player, card_index)?;
    state.deal_to(&player)?;
    state.advance_turn();
    Ok(MoveOutcome {
        player,
        effect,
        ended: None,
    })
}

fn discard(state: &mut GameState, card_index: usize) -> Result<MoveOutcome, GameError> {
    let player = current_name(state)?;
    let card = state.card_at(&player, card_index)?;
    let terminal = exhausts_last_copy(state, card);

    state.add_to_discard(card);
    if terminal {
        state.take_card(&player, card_index)?;
        state.advance_turn();
        state.end_game(EndReason::UnwinnablePile { card });
    } else {
        state.add_info();
        state.take_card(&player, card_index)?;
        state.deal_to(&player)?;
        state.advance_turn();
    }

    Ok(MoveOutcome {
        player,
        effect: MoveEffect::Discarded {
            card,
            info: state.info(),
        },
        ended: None,
    })
}

fn give_clue(
    state: &mut GameState,
    kind: ClueKind,
    target: &str,
    card_index: usize,
) -> Result<MoveOutcome, GameError> {
    let player = current_name(state)?;
    let card = state.card_at(target, card_index)?;

    let revealed = {
        let target = state.player_mut(target)?;
        match kind {
            ClueKind::Number => {
                target.learn_number(card.number);
                Revealed::Number(card.number)
            }
            ClueKind::Colour => {
                target.learn_colour(card.colour);
                Revealed::Colour(card.colour)
            }
        }
    };
    state.remove_info();
    state.advance_turn();

    Ok(MoveOutcome {
        player,
        effect: MoveEffect::Clued {
            target: target.to_string(),
            revealed,
        },
        ended: None,
    })
}

/// End-of-game checks that run after every move: lives exhausted, all piles
/// built, and the final round once the deck is empty.
fn finish_move(state: &mut GameState, mut outcome: MoveOutcome) -> MoveOutcome {
    if !state.is_game_over() {
        if state.lives() == 0 {
            state.end_game(EndReason::OutOfLives);
        } else if state.all_piles_complete() {
            state.end_game(EndReason::AllPilesComplete);
        } else {
            match state.final_turns() {
                Some(left) => {
                    let left = left.saturating_sub(1);
                    state.set_final_turns(Some(left));
                    if left == 0 {
                        state.end_game(EndReason::DeckExhausted);
                    }
                }
                None if state.deck().is_empty() => {
                    state.set_final_turns(Some(state.players().len()));
                }
                None => {}
            }
        }
    }
    outcome.ended = state.end_reason();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(names: &[&str], seed: u64) -> Game {
        let mut game = Game::new(seed);
        for name in names {
            game.add_player(name).unwrap();
        }
        game.start().unwrap();
        game
    }

    #[test]
    fn lobby_rejects_duplicates_and_late_joins() {
        let mut game = Game::new(1);
        game.add_player("nick").unwrap();
        assert_eq!(
            game.add_player("nick"),
            Err(GameError::PlayerExists("nick".into()))
        );
        game.start().unwrap();
        assert_eq!(game.add_player("late"), Err(GameError::AlreadyStarted));
        assert_eq!(game.remove_player("nick"), Err(GameError::AlreadyStarted));
        assert_eq!(game.start(), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn start_without_players_is_rejected() {
        let mut game = Game::new(1);
        assert_eq!(game.start(), Err(GameError::NoPlayers));
        assert!(!game.current().is_started());
    }

    #[test]
    fn table_is_capped_at_ten() {
        let mut game = Game::new(1);
        for i in 0..MAX_PLAYERS {
            game.add_player(&format!("p{i}")).unwrap();
        }
        assert_eq!(
            game.add_player("extra"),
            Err(GameError::TableFull { max: MAX_PLAYERS })
        );
    }

    #[test]
    fn full_table_starts_the_final_round_immediately() {
        let names: Vec<String> = (0..MAX_PLAYERS).map(|i| format!("p{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut game = started(&refs, 4);
        assert!(game.current().deck().is_empty());
        assert_eq!(game.current().final_turns(), Some(MAX_PLAYERS));

        for _ in 0..MAX_PLAYERS {
            if game.current().is_game_over() {
                break;
            }
            let mv = if game.current().info() < 8 {
                Move::Discard { card_index: 0 }
            } else {
                Move::Clue {
                    kind: ClueKind::Number,
                    target: game.current().next_player().unwrap().to_string(),
                    card_index: 0,
                }
            };
            game.apply(mv).unwrap();
        }
        assert!(game.current().is_game_over());
    }

    #[test]
    fn set_ready_flags_player() {
        let mut game = Game::new(1);
        game.add_player("nick").unwrap();
        game.set_ready("nick", true).unwrap();
        assert!(game.current().player("nick").unwrap().ready);
        assert_eq!(
            game.set_ready("ghost", true),
            Err(GameError::PlayerNotFound("ghost".into()))
        );
    }

    #[test]
    fn clue_on_self_and_unknown_target_are_rejected() {
        let mut game = started(&["nick", "nick2"], 9);
        let before = game.current().clone();
        assert_eq!(
            game.give_info(ClueKind::Number, "nick", 0),
            Err(GameError::CannotClueSelf)
        );
        assert_eq!(
            game.give_info(ClueKind::Colour, "bob", 0),
            Err(GameError::PlayerNotFound("bob".into()))
        );
        assert_eq!(game.current(), &before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn clue_reveals_colour_of_target_card() {
        let mut game = started(&["nick", "nick2"], 9);
        let card = game.current().card_at("nick2", 1).unwrap();
        let outcome = game.give_info(ClueKind::Colour, "nick2", 1).unwrap();
        assert_eq!(
            outcome.effect,
            MoveEffect::Clued {
                target: "nick2".into(),
                revealed: Revealed::Colour(card.colour)
            }
        );
        let known = &game.current().player("nick2").unwrap().known_colours;
        assert!(known.contains(&card.colour));
        assert_eq!(known.len(), 1);
    }

    #[test]
    fn completing_every_pile_ends_the_game() {
        let mut state = GameState::new(3);
        state.push_player(Player::new("nick"));
        for colour in crate::cards::all_colours() {
            for number in 1..=crate::cards::MAX_NUMBER {
                state.put_on_stack(crate::cards::Card::new(number, colour));
            }
        }
        let card = crate::cards::Card::new(5, crate::cards::Colour::Green);
        let outcome = finish_move(
            &mut state,
            MoveOutcome {
                player: "nick".into(),
                effect: MoveEffect::Played { card },
                ended: None,
            },
        );
        assert_eq!(outcome.ended, Some(EndReason::AllPilesComplete));
        assert!(state.is_game_over());
        assert_eq!(state.score(), 25);
    }

    #[test]
    fn reset_clears_history_and_players() {
        let mut game = started(&["nick", "nick2"], 9);
        game.discard_card(0).unwrap();
        game.reset(10);
        assert!(game.history().is_empty());
        assert!(game.current().players().is_empty());
        assert_eq!(game.current().seed(), 10);
        assert_eq!(game.current().deck().remaining(), 50);
    }
}
