//! Simulation command: bots play whole games.
//!
//! Game `i` uses seed `base + i`, seats players `p1..pN`, and is driven to
//! the end by one strategy instance seeded the same way, so a run is fully
//! reproducible from its base seed. With `--output`, each game is appended
//! to the file as a [`GameRecord`] line that `hanabi replay` can verify.

use crate::config;
use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;
use crate::ui;
use hanabi_ai::create_strategy;
use hanabi_engine::engine::Game;
use hanabi_engine::game::EndReason;
use hanabi_engine::logger::{GameLogger, GameRecord};
use std::collections::BTreeMap;
use std::io::Write;

/// Moves after which a bot game is abandoned; far above any real game.
const MOVE_LIMIT: usize = 1_000;

pub fn handle_sim_command(
    games: u64,
    players: Option<usize>,
    seed: Option<u64>,
    strategy: Option<String>,
    output: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        ui::write_error(err, "games must be >= 1")?;
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }

    let cfg = match config::load() {
        Ok(c) => c,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(e.to_string()));
        }
    };
    let players = players.unwrap_or(cfg.players);
    let strategy = strategy.unwrap_or(cfg.strategy);
    if let Err(e) =
        config::validate_players(players).and_then(|_| config::validate_strategy(&strategy))
    {
        ui::write_error(err, &e.to_string())?;
        return Err(CliError::InvalidInput(e.to_string()));
    }
    let base_seed = seed.or(cfg.seed).unwrap_or_else(rand::random);

    let mut logger = match &output {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            if let Err(e) = ensure_parent_dir(&path) {
                ui::write_error(err, &e)?;
                return Err(CliError::Io(std::io::Error::other(e)));
            }
            Some(GameLogger::create(&path)?)
        }
        None => None,
    };

    let mut total_score = 0u64;
    let mut best = 0u32;
    let mut reasons: BTreeMap<&'static str, u64> = BTreeMap::new();

    for i in 0..games {
        let game_seed = base_seed.wrapping_add(i);
        let game = play_one(game_seed, players, &strategy)?;
        let state = game.current();

        total_score += u64::from(state.score());
        best = best.max(state.score());
        *reasons.entry(reason_key(state.end_reason())).or_default() += 1;

        if let Some(logger) = logger.as_mut() {
            let record = GameRecord::from_game(logger.next_id(), &game);
            logger.write(&record)?;
        }
    }

    writeln!(
        out,
        "sim: games={} players={} strategy={} seed={}",
        games, players, strategy, base_seed
    )?;
    writeln!(out, "Simulated: {} games", games)?;
    writeln!(
        out,
        "Average score: {:.2}",
        total_score as f64 / games as f64
    )?;
    writeln!(out, "Best score: {}", best)?;
    for (reason, count) in &reasons {
        writeln!(out, "  {}: {}", reason, count)?;
    }
    if let Some(path) = &output {
        writeln!(out, "Records written to {}", path)?;
    }
    Ok(())
}

fn play_one(seed: u64, players: usize, strategy: &str) -> Result<Game, CliError> {
    let mut bot = create_strategy(strategy, seed)
        .ok_or_else(|| CliError::InvalidInput(format!("unknown strategy '{}'", strategy)))?;
    let mut game = Game::new(seed);
    for p in 1..=players {
        game.add_player(&format!("p{}", p))?;
    }
    game.start()?;

    for _ in 0..MOVE_LIMIT {
        let Some(mv) = bot.choose_move(game.current()) else {
            break;
        };
        game.apply(mv)?;
    }
    Ok(game)
}

fn reason_key(reason: Option<EndReason>) -> &'static str {
    match reason {
        Some(EndReason::UnwinnablePile { .. }) => "unwinnable_pile",
        Some(EndReason::OutOfLives) => "out_of_lives",
        Some(EndReason::AllPilesComplete) => "all_piles_complete",
        Some(EndReason::DeckExhausted) => "deck_exhausted",
        None => "unfinished",
    }
}
