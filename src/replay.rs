// Replay module for re-checking logged autoplay decisions
//
// This module provides functionality to:
// 1. Parse JSONL decision logs
// 2. Re-run the search on each logged grid
// 3. Compare logged vs replayed moves
// 4. Generate a summary report

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::LogEntry;
use crate::search::SearchEngine;
use crate::types::Direction;

/// Result of replaying a single logged move
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub move_number: u64,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub original_value: Option<f64>,
    pub replayed_value: Option<f64>,
    pub nodes: u64,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_moves: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    engine: SearchEngine,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            engine: SearchEngine::from_config(&config),
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> ReplayResult {
        let start_time = Instant::now();
        let result = self.engine.search(&entry.grid);
        let computation_time = start_time.elapsed().as_millis();

        let matches = result.direction == entry.chosen_move;
        let replay = ReplayResult {
            move_number: entry.move_number,
            original_move: entry.chosen_move,
            replayed_move: result.direction,
            matches,
            original_value: entry.expected_value,
            replayed_value: result.value,
            nodes: result.stats.nodes,
            computation_time_ms: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Move {}: MATCH - {} (value: {:?}, nodes: {}, time: {}ms)",
                    entry.move_number, replay.replayed_move, replay.replayed_value, replay.nodes,
                    computation_time
                );
            } else {
                warn!(
                    "Move {}: MISMATCH - Original: {}, Replayed: {} (value: {:?}, nodes: {}, time: {}ms)",
                    entry.move_number,
                    replay.original_move,
                    replay.replayed_move,
                    replay.replayed_value,
                    replay.nodes,
                    computation_time
                );
            }
        }

        replay
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        entries.iter().map(|entry| self.replay_entry(entry)).collect()
    }

    /// Replays specific moves from a log file
    pub fn replay_moves(
        &self,
        entries: &[LogEntry],
        move_numbers: &[u64],
    ) -> Result<Vec<ReplayResult>, String> {
        move_numbers
            .iter()
            .map(|number| {
                entries
                    .iter()
                    .find(|e| e.move_number == *number)
                    .map(|entry| self.replay_entry(entry))
                    .ok_or_else(|| format!("Move {} not found in log file", number))
            })
            .collect()
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_moves = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_moves - matches;
        let match_rate = if total_moves > 0 {
            (matches as f64 / total_moves as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_moves,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Moves:    {}", stats.total_moves);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            let avg_nodes: f64 =
                results.iter().map(|r| r.nodes as f64).sum::<f64>() / results.len() as f64;

            println!("Average Nodes Searched:     {:.1}", avg_nodes);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Move {}: {} → {} (value: {:?}, time: {}ms)",
                    result.move_number,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_value,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(u64, Vec<Direction>)], // (move number, acceptable moves)
    ) -> Result<(), String> {
        for (number, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.move_number == *number)
                .ok_or_else(|| format!("Move {} not found in log", number))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Move {}: Expected one of {:?}, but got {}",
                    number,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    entry.chosen_move
                ));
            }
        }

        Ok(())
    }
}

/// Parses `move:dir|dir,move:dir` into (move number, acceptable directions) pairs
pub fn parse_expected_moves(s: &str) -> Result<Vec<(u64, Vec<Direction>)>, String> {
    s.split(',')
        .map(|pair| {
            let parts: Vec<&str> = pair.trim().split(':').collect();
            if parts.len() != 2 {
                return Err(format!("Invalid format '{}'. Expected 'move:direction'", pair));
            }

            let number = parts[0]
                .parse::<u64>()
                .map_err(|e| format!("Invalid move number '{}': {}", parts[0], e))?;

            let moves = parts[1]
                .split('|')
                .map(|m| m.parse::<Direction>())
                .collect::<Result<Vec<_>, _>>()?;

            Ok((number, moves))
        })
        .collect()
}
