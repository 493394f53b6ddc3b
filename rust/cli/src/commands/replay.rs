//! Replay command: re-run recorded games and check they reproduce.
//!
//! Each line of the input is a [`GameRecord`]. The record's seed, players and
//! moves are fed through a fresh engine; the resulting score and end reason
//! must match what was recorded.

use crate::error::CliError;
use crate::formatters::format_end_reason;
use crate::io_utils::read_text;
use crate::ui;
use hanabi_engine::game::EndReason;
use hanabi_engine::logger::GameRecord;
use std::io::Write;

pub fn handle_replay_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = match read_text(&input) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!("Failed to read {}: {}", input, e);
            ui::write_error(err, &msg)?;
            return Err(CliError::Io(std::io::Error::other(msg)));
        }
    };

    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        writeln!(out, "No games found in file.")?;
        return Ok(());
    }

    let mut verified = 0usize;
    let mut failed = 0usize;
    for (n, line) in lines.iter().enumerate() {
        let record: GameRecord = parse_json_or_continue!(line, err, format!("game {}", n + 1));

        let game = match record.replay() {
            Ok(g) => g,
            Err(e) => {
                failed += 1;
                ui::write_error(err, &format!("Game {}: {}", record.game_id, e))?;
                continue;
            }
        };
        let state = game.current();
        let mismatch = if state.score() != record.score {
            Some(format!(
                "recorded score {} but replay scored {}",
                record.score,
                state.score()
            ))
        } else if state.end_reason() != record.end_reason {
            Some(format!(
                "recorded end {} but replay ended {}",
                describe_end(record.end_reason.as_ref()),
                describe_end(state.end_reason().as_ref())
            ))
        } else {
            None
        };
        if let Some(detail) = mismatch {
            failed += 1;
            ui::write_error(err, &format!("Game {}: {}", record.game_id, detail))?;
            continue;
        }

        verified += 1;
        if !state.is_game_over() {
            ui::display_warning(
                err,
                &format!("Game {} was recorded before it ended", record.game_id),
            )?;
        }
        let ending = describe_end(state.end_reason().as_ref());
        writeln!(
            out,
            "Game {} (seed {}, {} players, {} moves): score {}, {}",
            record.game_id,
            record.seed,
            record.players.len(),
            record.moves.len(),
            state.score(),
            ending
        )?;
    }

    let skipped = lines.len() - verified - failed;
    writeln!(out, "Verified: {}/{}", verified, lines.len())?;
    if failed > 0 || skipped > 0 {
        return Err(CliError::Replay(format!(
            "{} mismatched, {} unreadable",
            failed, skipped
        )));
    }
    Ok(())
}

fn describe_end(reason: Option<&EndReason>) -> String {
    reason
        .map(format_end_reason)
        .unwrap_or_else(|| "unfinished".to_string())
}
