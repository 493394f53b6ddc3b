//! Deal command: start a game and show every hand.

use crate::config;
use crate::error::CliError;
use crate::formatters::format_hand;
use hanabi_engine::engine::Game;
use std::io::Write;

/// Seats `players` (default 2) named `p1`, `p2`, ..., deals, and prints each
/// hand followed by the deck size. The same seed always prints the same deal.
pub fn handle_deal_command(
    seed: Option<u64>,
    players: Option<usize>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let players = players.unwrap_or(config::MIN_PLAYERS);
    config::validate_players(players).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let seed = seed.unwrap_or_else(rand::random);

    let mut game = Game::new(seed);
    for i in 1..=players {
        game.add_player(&format!("p{}", i))?;
    }
    game.start()?;

    let state = game.current();
    writeln!(out, "Seed: {}", seed)?;
    for player in state.players() {
        writeln!(out, "{}: {}", player.name, format_hand(&player.cards))?;
    }
    writeln!(out, "Deck: {} cards", state.deck().remaining())?;
    Ok(())
}
