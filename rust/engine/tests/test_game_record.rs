use std::fs;
use std::path::PathBuf;

use hanabi_engine::engine::Game;
use hanabi_engine::logger::{GameLogger, GameRecord};
use hanabi_engine::rules::{legal_moves, ClueKind, Move};

fn tmp_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("target");
    p.push(format!("{}_{}.jsonl", name, std::process::id()));
    p
}

fn played_game(seed: u64, moves: usize) -> Game {
    let mut game = Game::new(seed);
    game.add_player("nick").unwrap();
    game.add_player("nick2").unwrap();
    game.add_player("nick3").unwrap();
    game.start().unwrap();
    for turn in 0..moves {
        let options = legal_moves(game.current());
        if options.is_empty() {
            break;
        }
        let mv = options[(turn * 7 + 3) % options.len()].clone();
        game.apply(mv).unwrap();
    }
    game
}

#[test]
fn writes_jsonl_with_lf_only() {
    let path = tmp_path("gamelog");
    let mut logger = GameLogger::create(&path).expect("create logger");
    let game = played_game(11, 6);
    let rec = GameRecord::from_game(logger.next_id(), &game);
    logger.write(&rec).expect("write");
    logger.write(&rec).expect("write again");

    let bytes = fs::read(&path).expect("read file");
    assert!(bytes.ends_with(b"\n"));
    assert!(!bytes.contains(&b'\r'));
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.lines().count(), 2);
    let _ = fs::remove_file(&path);
}

#[test]
fn ts_is_generated_when_missing_and_preserved_when_present() {
    let path = tmp_path("gamelog_ts");
    let mut logger = GameLogger::create(&path).expect("create logger");
    let rec = GameRecord::from_game("20250102-000010", &played_game(3, 0));
    logger.write(&rec).expect("write");
    let line = fs::read_to_string(&path).unwrap();
    let parsed: GameRecord = serde_json::from_str(line.lines().next().unwrap()).unwrap();
    assert!(parsed.ts.is_some(), "ts should be injected");

    let preset = "2030-01-01T00:00:00Z".to_string();
    let rec2 = GameRecord {
        ts: Some(preset.clone()),
        ..rec
    };
    logger.write(&rec2).expect("write2");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(&preset), "preset ts must be kept");
    let _ = fs::remove_file(&path);
}

#[test]
fn record_replays_to_the_same_table() {
    let game = played_game(2024, 25);
    let rec = GameRecord::from_game("20260101-000001", &game);
    assert_eq!(rec.moves.len(), game.history().len());
    assert_eq!(rec.score, game.score());

    let line = serde_json::to_string(&rec).unwrap();
    let back: GameRecord = serde_json::from_str(&line).unwrap();
    let replayed = back.replay().expect("replay");
    assert_eq!(replayed.current(), game.current());
}

#[test]
fn tampered_record_fails_to_replay() {
    let mut rec = GameRecord::from_game("20260101-000002", &played_game(5, 2));
    rec.moves.push(Move::Clue {
        kind: ClueKind::Colour,
        target: "nobody".into(),
        card_index: 0,
    });
    assert!(rec.replay().is_err());
}
