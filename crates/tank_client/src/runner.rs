//! JSON-lines match runner.
//!
//! Reads one server message per input line and writes one command per
//! output line. Logs go to stderr through `tracing`; the output stream
//! carries protocol only.

use std::io::{self, BufRead, Write};

use crate::commander::Commander;
use crate::protocol::{self, GameMessage};

/// What happened over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// `GAME_START` messages seen.
    pub games_started: u32,
    /// `GAME_END` messages seen.
    pub games_ended: u32,
    /// Game states turned into commands.
    pub states_processed: u64,
    /// Commands written.
    pub commands_sent: u64,
    /// Lines that could not be decoded.
    pub skipped_lines: u64,
    /// True when the run stopped on `MatchEnd` rather than end of input.
    pub match_ended: bool,
}

/// Drives a [`Commander`] from a message stream.
#[derive(Debug)]
pub struct Runner {
    commander: Commander,
    summary: RunSummary,
}

impl Runner {
    /// Create a runner around a commander.
    #[must_use]
    pub fn new(commander: Commander) -> Self {
        Self {
            commander,
            summary: RunSummary::default(),
        }
    }

    /// The wrapped commander.
    #[must_use]
    pub fn commander(&self) -> &Commander {
        &self.commander
    }

    /// Process messages until `MatchEnd` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading input or writing output fails.
    /// Undecodable lines are logged and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<RunSummary> {
        tracing::info!(team = %self.commander.team(), "Waiting for server messages");

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !self.handle_line(line, &mut output)? {
                break;
            }
        }

        tracing::info!(
            games = self.summary.games_started,
            states = self.summary.states_processed,
            commands = self.summary.commands_sent,
            skipped = self.summary.skipped_lines,
            match_ended = self.summary.match_ended,
            "Runner finished"
        );
        Ok(self.summary)
    }

    /// Handle one line. Returns `false` once the match is over.
    fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> io::Result<bool> {
        let message = match protocol::parse_message(line) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(%err, "Skipping undecodable line");
                self.summary.skipped_lines += 1;
                return Ok(true);
            }
        };

        match message {
            GameMessage::GameStart(start) => {
                self.summary.games_started += 1;
                tracing::info!(
                    game = start.game_name.as_deref().unwrap_or("unnamed"),
                    number = ?start.game_num,
                    of = ?start.game_count,
                    "Game started"
                );
                self.commander.reset();
            }
            GameMessage::GameEnd => {
                self.summary.games_ended += 1;
                tracing::info!("Game ended");
                self.commander.reset();
            }
            GameMessage::MatchEnd => {
                tracing::info!("Match ended");
                self.summary.match_ended = true;
                return Ok(false);
            }
            GameMessage::GameState(state) => {
                let snapshot = match state.into_snapshot() {
                    Ok(snapshot) => snapshot,
                    Err(err) => {
                        tracing::warn!(%err, "Skipping game state");
                        self.summary.skipped_lines += 1;
                        return Ok(true);
                    }
                };
                self.summary.states_processed += 1;
                tracing::debug!(time_remaining = snapshot.time_remaining, "Game state");

                for command in self.commander.commands(&snapshot) {
                    let json = command
                        .to_json()
                        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
                    writeln!(output, "{json}")?;
                    self.summary.commands_sent += 1;
                }
                output.flush()?;
            }
        }
        Ok(true)
    }
}
