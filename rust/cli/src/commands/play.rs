//! # Play Command
//!
//! Hot-seat game on one terminal. Each turn shows the other players' hands
//! and what the current player knows about their own, then reads one command
//! from stdin (see [`parse_play_input`]).
//!
//! Rejected moves are reported and the same player is asked again. EOF or
//! `quit` ends the session early; both are a normal exit.

use crate::error::CliError;
use crate::formatters::{
    format_end_reason, format_hand, format_hidden_hand, format_outcome, format_status,
};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{ParseResult, parse_play_input};
use hanabi_engine::engine::Game;
use std::io::{BufRead, Write};

pub fn handle_play_command(
    players: Vec<String>,
    seed: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let players: Vec<String> = players.iter().map(|p| p.trim().to_string()).collect();
    if players.is_empty() {
        ui::write_error(err, "at least one player is required (--players a,b)")?;
        return Err(CliError::InvalidInput(
            "at least one player is required".to_string(),
        ));
    }
    if players.iter().any(String::is_empty) {
        ui::write_error(err, "player names must not be empty")?;
        return Err(CliError::InvalidInput(
            "player names must not be empty".to_string(),
        ));
    }
    let seed = seed.unwrap_or_else(rand::random);

    let mut game = Game::new(seed);
    for name in &players {
        if let Err(e) = game.add_player(name) {
            ui::write_error(err, &e.to_string())?;
            return Err(e.into());
        }
    }
    game.start()?;
    writeln!(out, "play: players={} seed={}", players.join(","), seed)?;

    let mut show_table = true;
    while !game.current().is_game_over() {
        let state = game.current();
        let Some(me) = state.current_player().map(str::to_string) else {
            break;
        };
        if show_table {
            write_table(game.current(), &me, out)?;
        }
        ui::prompt(out, &me)?;

        let Some(input) = read_stdin_line(stdin) else {
            writeln!(out)?;
            writeln!(out, "Session ended at score {}", game.score())?;
            return Ok(());
        };
        match parse_play_input(&input) {
            ParseResult::Move(mv) => match game.apply(mv) {
                Ok(outcome) => {
                    writeln!(out, "{}", format_outcome(&outcome))?;
                    show_table = true;
                }
                Err(e) => {
                    ui::write_error(err, &format!("Move rejected: {}", e))?;
                    show_table = false;
                }
            },
            ParseResult::State => show_table = true,
            ParseResult::Quit => {
                writeln!(out, "Session ended at score {}", game.score())?;
                return Ok(());
            }
            ParseResult::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                show_table = false;
            }
        }
    }

    let state = game.current();
    let reason = state
        .end_reason()
        .map(|r| format_end_reason(&r))
        .unwrap_or_default();
    writeln!(out, "Game over: {}", reason)?;
    writeln!(out, "Final score: {}", state.score())?;
    Ok(())
}

fn write_table(
    state: &hanabi_engine::game::GameState,
    me: &str,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    writeln!(out, "{}", format_status(state))?;
    if let Some(top) = state.discard().front() {
        writeln!(
            out,
            "discard: {} cards, latest {}",
            state.discard().len(),
            top
        )?;
    }
    for player in state.players() {
        if player.name == me {
            writeln!(out, "  {} (you): {}", player.name, format_hidden_hand(player))?;
        } else {
            writeln!(out, "  {}: {}", player.name, format_hand(&player.cards))?;
        }
    }
    Ok(())
}
