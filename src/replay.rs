// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-run the turn engine on the logged snapshots
// 3. Compare logged vs replayed moves
// 4. Print a summary report

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

use crate::config::Config;
use crate::engine::{compute_move, DecisionReason};
use crate::growth::GrowthTracker;
use crate::types::{Battlesnake, Board, Coord, Direction, Game, Snapshot};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to open log file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("turn {0} not found in log")]
    TurnNotFound(i32),
    #[error("invalid direction '{0}'")]
    InvalidDirection(String),
    #[error("turn {turn}: expected one of {expected:?}, but got {actual}")]
    UnexpectedMove {
        turn: i32,
        expected: Vec<Direction>,
        actual: Direction,
    },
}

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    #[serde(default)]
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Battlesnake,
    pub chosen_move: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub target: Option<Coord>,
    #[serde(default)]
    pub timestamp: String,
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub reason: DecisionReason,
    pub target: Option<Coord>,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
    pub fallback_turns: usize,
}

/// Replay engine for analyzing debug logs.
///
/// Owns its own growth tracker, so entries should be fed in turn order.
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
    growth: GrowthTracker,
}

impl ReplayEngine {
    pub fn new(config: Config, verbose: bool) -> Self {
        let growth = GrowthTracker::new(config.strategy.history_turns);
        ReplayEngine {
            config,
            verbose,
            growth,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, ReplayError> {
        let file = File::open(log_path.as_ref()).map_err(|source| ReplayError::Open {
            path: log_path.as_ref().display().to_string(),
            source,
        })?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| ReplayError::Read {
                line: line_num + 1,
                source,
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
                line: line_num + 1,
                source,
            })?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, ReplayError> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let original_move = Self::parse_direction(&entry.chosen_move)?;

        let start_time = Instant::now();
        let snapshot = Snapshot::new(&entry.game, entry.turn, &entry.board, &entry.you);
        let decision = compute_move(snapshot, &self.growth, &self.config);
        let computation_time = start_time.elapsed().as_millis();

        let matches = original_move == decision.direction;
        let result = ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move: decision.direction,
            matches,
            reason: decision.reason,
            target: decision.target,
            computation_time_ms: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} ({}, time: {}ms)",
                    entry.turn,
                    decision.direction,
                    decision.reason.as_str(),
                    computation_time
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} ({}, time: {}ms)",
                    entry.turn,
                    original_move,
                    decision.direction,
                    decision.reason.as_str(),
                    computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in order; entries that fail are skipped with a warning
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                }
            }
        }

        results
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, ReplayError> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or(ReplayError::TurnNotFound(*turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };
        let fallback_turns = results
            .iter()
            .filter(|r| r.reason == DecisionReason::Fallback)
            .count();

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
            fallback_turns,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("Fallback moves: {}", stats.fallback_turns);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                let target = result
                    .target
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string());
                println!(
                    "Turn {}: {} → {} ({}, target: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.reason.as_str(),
                    target,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Checks the logged move of each listed turn against its acceptable moves
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(i32, Vec<Direction>)],
    ) -> Result<(), ReplayError> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or(ReplayError::TurnNotFound(*turn))?;

            let actual = Self::parse_direction(&entry.chosen_move)?;

            if !acceptable.contains(&actual) {
                return Err(ReplayError::UnexpectedMove {
                    turn: *turn,
                    expected: acceptable.clone(),
                    actual,
                });
            }
        }

        Ok(())
    }

    pub fn parse_direction(s: &str) -> Result<Direction, ReplayError> {
        s.parse::<Direction>()
            .map_err(|_| ReplayError::InvalidDirection(s.to_string()))
    }
}
