//! # Hanabi CLI Library
//!
//! Command-line front end for the hanabi rules engine: deal a game, play one
//! hot-seat on a terminal, run bot simulations to JSONL, replay recorded games
//! and show configuration.
//!
//! ## Main Entry Point
//!
//! [`run`] parses arguments, dispatches to the subcommand and returns the
//! process exit code.
//!
//! ```
//! use std::io;
//! let args = vec!["hanabi", "deal", "--seed", "42"];
//! let code = hanabi_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `deal`: Deal a game and print every hand
//! - `play`: Hot-seat game reading commands from stdin
//! - `sim`: Bot games with a score summary and optional JSONL records
//! - `replay`: Re-run recorded games and verify they reproduce
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;
#[macro_use]
mod macros;
pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod ui;
pub mod validation;

use cli::{Commands, HanabiCli};
use commands::{
    handle_cfg_command, handle_deal_command, handle_play_command, handle_replay_command,
    handle_sim_command,
};

pub use error::CliError;

const COMMANDS: &[&str] = &["deal", "play", "sim", "replay", "cfg"];

/// Parses `args` and runs the subcommand.
///
/// Returns `0` on success and `2` on any error. Help and version go to
/// `out` with exit code `0`.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match HanabiCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    write_or_exit!(err, "{}", e);
                    write_or_exit!(err, "Hanabi CLI");
                    write_or_exit!(err, "Usage: hanabi <command> [options]\n");
                    write_or_exit!(err, "Commands:");
                    for c in COMMANDS {
                        write_or_exit!(err, "  {}", c);
                    }
                    write_or_exit!(err, "\nFor full help, run: hanabi --help");
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Deal { seed, players } => handle_deal_command(seed, players, out),
        Commands::Play { players, seed } => {
            let stdin = std::io::stdin();
            let mut stdin_lock = stdin.lock();
            handle_play_command(players, seed, out, err, &mut stdin_lock)
        }
        Commands::Sim {
            games,
            players,
            seed,
            strategy,
            output,
        } => handle_sim_command(games, players, seed, strategy, output, out, err),
        Commands::Replay { input } => handle_replay_command(input, out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}
