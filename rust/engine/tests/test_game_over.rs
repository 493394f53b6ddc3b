use hanabi_engine::cards::DECK_SIZE;
use hanabi_engine::engine::Game;
use hanabi_engine::errors::GameError;
use hanabi_engine::game::EndReason;
use hanabi_engine::rules::{exhausts_last_copy, is_valid_play, ClueKind, Move};

fn started(seed: u64) -> Game {
    let mut game = Game::new(seed);
    game.add_player("nick").unwrap();
    game.add_player("nick2").unwrap();
    game.start().unwrap();
    game
}

#[test]
fn discarding_the_only_five_ends_the_game() {
    let (mut game, idx) = (0..500u64)
        .map(started)
        .find_map(|g| {
            let idx = g
                .current()
                .player("nick")
                .unwrap()
                .cards
                .iter()
                .position(|c| c.number == 5)?;
            Some((g, idx))
        })
        .expect("some seed deals nick a five");
    let card = game.current().card_at("nick", idx).unwrap();
    game.give_info(ClueKind::Number, "nick2", 0).unwrap();
    game.give_info(ClueKind::Colour, "nick", 0).unwrap();
    assert_eq!(game.current().info(), 6);
    let deck_before = game.current().deck().remaining();

    let outcome = game.discard_card(idx).unwrap();
    assert_eq!(outcome.ended, Some(EndReason::UnwinnablePile { card }));

    let state = game.current();
    assert!(state.is_game_over());
    assert_eq!(state.discard().front(), Some(&card));
    assert_eq!(state.deck().remaining(), deck_before, "no replacement card");
    assert_eq!(state.player("nick").unwrap().cards.len(), 4);
    assert_eq!(state.info(), 6, "the terminal discard grants no info");

    assert_eq!(game.play_card(0), Err(GameError::GameOver));
    assert_eq!(
        game.give_info(ClueKind::Number, "nick", 0),
        Err(GameError::GameOver)
    );
}

#[test]
fn three_misplays_end_the_game() {
    let game = (0..500u64).map(started).find_map(|mut g| {
        for _ in 0..3 {
            let name = g.current().current_player()?.to_string();
            let idx = g.current().player(&name)?.cards.iter().position(|c| {
                !is_valid_play(*c, g.current().top_of_stack(c.colour))
            })?;
            g.play_card(idx).ok()?;
        }
        Some(g)
    });
    let game = game.expect("some seed allows three misplays in a row");
    let state = game.current();
    assert_eq!(state.lives(), 0);
    assert!(state.is_game_over());
    assert_eq!(state.end_reason(), Some(EndReason::OutOfLives));
    assert_eq!(state.discard().len(), 3);
}

/// Discards whatever is safe, clues otherwise, until the game ends.
fn play_out_by_discarding(game: &mut Game) {
    for _ in 0..200 {
        if game.current().is_game_over() {
            return;
        }
        let state = game.current();
        let name = state.current_player().unwrap().to_string();
        let safe = state
            .player(&name)
            .unwrap()
            .cards
            .iter()
            .position(|c| !exhausts_last_copy(state, *c));
        let mv = match safe {
            Some(card_index) => Move::Discard { card_index },
            None if state.info() > 0 => Move::Clue {
                kind: ClueKind::Number,
                target: state.next_player().unwrap().to_string(),
                card_index: 0,
            },
            None => Move::Play { card_index: 0 },
        };
        game.apply(mv).unwrap();
    }
}

#[test]
fn empty_deck_gives_everyone_one_last_move() {
    let mut game = (0..50u64)
        .map(|seed| {
            let mut g = started(seed);
            play_out_by_discarding(&mut g);
            g
        })
        .find(|g| g.current().end_reason() == Some(EndReason::DeckExhausted))
        .expect("some seed runs the deck out");

    let history = game.history().to_vec();
    let mut replay = started(game.current().seed());
    let mut emptied_at = None;
    for (i, mv) in history.iter().enumerate() {
        replay.apply(mv.clone()).unwrap();
        if emptied_at.is_none() && replay.current().deck().is_empty() {
            emptied_at = Some(i);
            assert_eq!(replay.current().final_turns(), Some(2));
            assert!(!replay.current().is_game_over());
        }
    }
    let emptied_at = emptied_at.unwrap();
    assert_eq!(history.len(), emptied_at + 1 + 2);
    assert_eq!(replay.current().final_turns(), Some(0));
    assert_eq!(replay.current(), game.current());
    assert_eq!(game.current().total_cards(), DECK_SIZE);
    assert_eq!(game.discard_card(0), Err(GameError::GameOver));
}

#[test]
fn discarding_a_copy_of_a_played_number_is_harmless() {
    let found = (0..5000u64).map(started).find_map(|mut g| {
        let nick = g.current().player("nick").unwrap().cards.clone();
        let nick2 = g.current().player("nick2").unwrap().cards.clone();
        let one = nick.iter().position(|c| c.number == 1)?;
        let colour = nick[one].colour;
        let twin = nick2
            .iter()
            .position(|c| c.number == 1 && c.colour == colour)?;
        g.play_card(one).ok()?;
        Some((g, twin))
    });
    let (mut game, twin) = found.expect("some seed deals both players the same one");
    let outcome = game.discard_card(twin).unwrap();
    assert_eq!(outcome.ended, None);
    assert!(!game.current().is_game_over());
}
