// Tests for the replay module and the JSONL decision log
//
// Covers:
// - Loading JSONL log files (including blank lines and malformed input)
// - Replaying logged grids against the search
// - Validating expected moves
// - Writing entries through the async debug logger

use autoplay_2048::bot::Bot;
use autoplay_2048::config::Config;
use autoplay_2048::debug_logger::{DebugLogger, LogEntry};
use autoplay_2048::game::Game;
use autoplay_2048::replay::ReplayEngine;
use autoplay_2048::types::{Direction, Grid};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

/// Per-test scratch file under the system temp directory
fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("autoplay_2048_{}_{}.jsonl", name, std::process::id()))
}

#[test]
fn test_load_log_file_short_game() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);

    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .expect("Failed to load short_game.jsonl");

    assert_eq!(entries.len(), 3, "Blank lines are skipped");
    assert_eq!(entries[0].move_number, 1);
    assert_eq!(entries[0].chosen_move, Direction::Left);
    assert_eq!(
        entries[0].grid,
        Grid::from_rows([[0, 0, 0, 0], [0, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 2]])
    );
    assert_eq!(entries[2].score, 4);
    assert_eq!(entries[2].expected_value, None);
}

#[test]
fn test_load_missing_file_is_error() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let result = engine.load_log_file(fixture_path("does_not_exist.jsonl"));
    assert!(result.is_err());
}

#[test]
fn test_load_malformed_line_reports_line_number() {
    let path = scratch_path("malformed");
    fs::write(&path, "{\"move_number\": 1}\n").expect("write scratch file");

    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let err = engine.load_log_file(&path).unwrap_err();
    assert!(err.contains("line 1"), "unexpected error: {}", err);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_validate_expected_moves() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .expect("Failed to load short_game.jsonl");

    assert!(engine
        .validate_expected_moves(&entries, &[(1, vec![Direction::Left]), (2, vec![Direction::Up])])
        .is_ok());
    assert!(engine
        .validate_expected_moves(&entries, &[(3, vec![Direction::Left, Direction::Right])])
        .is_ok());
    assert!(engine
        .validate_expected_moves(&entries, &[(3, vec![Direction::Down])])
        .is_err());
    assert!(engine
        .validate_expected_moves(&entries, &[(99, vec![Direction::Up])])
        .is_err());
}

#[test]
fn test_replay_of_recorded_decisions_matches() {
    let config = Config::default_hardcoded();
    let bot = Bot::new(config.clone());
    let mut rng = StdRng::seed_from_u64(12);
    let mut game = Game::new(&mut rng);

    let mut entries = Vec::new();
    while !game.is_over() && entries.len() < 20 {
        let result = bot.choose_move(game.grid());
        entries.push(LogEntry {
            move_number: game.moves() + 1,
            chosen_move: result.direction,
            grid: *game.grid(),
            score: game.score(),
            expected_value: result.value,
            timestamp: "2026-10-19T00:00:00+00:00".to_string(),
        });
        game.apply_move(result.direction, &mut rng);
    }

    let path = scratch_path("recorded");
    let lines: Vec<String> = entries
        .iter()
        .map(|e| serde_json::to_string(e).expect("serialize entry"))
        .collect();
    fs::write(&path, lines.join("\n")).expect("write scratch file");

    let engine = ReplayEngine::new(config, false);
    let loaded = engine.load_log_file(&path).expect("load recorded log");
    assert_eq!(loaded.len(), entries.len());
    for (read, written) in loaded.iter().zip(&entries) {
        assert_eq!(read.move_number, written.move_number);
        assert_eq!(read.chosen_move, written.chosen_move);
        assert_eq!(read.grid, written.grid);
    }

    let results = engine.replay_all(&loaded);
    let stats = engine.generate_stats(&results);
    assert_eq!(stats.total_moves, entries.len());
    assert_eq!(stats.mismatches, 0);
    assert_eq!(stats.match_rate, 100.0);

    let subset = engine.replay_moves(&loaded, &[1, 3]).expect("moves exist");
    assert_eq!(subset.len(), 2);
    assert!(engine.replay_moves(&loaded, &[500]).is_err());

    let _ = fs::remove_file(&path);
}

#[test]
fn test_replay_detects_mismatch() {
    let config = Config::default_hardcoded();
    let engine = ReplayEngine::new(config, false);
    let stuck = Grid::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);

    // A stuck grid always replays as "up"
    let entry = LogEntry {
        move_number: 1,
        chosen_move: Direction::Left,
        grid: stuck,
        score: 0,
        expected_value: None,
        timestamp: String::new(),
    };
    let result = engine.replay_entry(&entry);
    assert!(!result.matches);
    assert_eq!(result.replayed_move, Direction::Up);
}

#[tokio::test]
async fn test_debug_logger_writes_jsonl() {
    let path = scratch_path("debug_logger");
    let path_str = path.to_string_lossy().to_string();
    let logger = DebugLogger::new(true, &path_str).await;
    assert!(logger.is_enabled());

    let grid = Grid::from_rows([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    logger.log_move(1, grid, 0, Direction::Left, Some(1234.5));
    logger.flush().await;

    let contents = fs::read_to_string(&path).expect("log file written");
    assert_eq!(contents.lines().count(), 1);
    let entry: LogEntry =
        serde_json::from_str(contents.lines().next().expect("one line")).expect("valid entry");
    assert_eq!(entry.move_number, 1);
    assert_eq!(entry.chosen_move, Direction::Left);
    assert_eq!(entry.grid, grid);
    assert_eq!(entry.expected_value, Some(1234.5));
    assert!(!entry.timestamp.is_empty());

    let _ = fs::remove_file(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_flush_waits_for_every_entry_in_order() {
    let path = scratch_path("debug_logger_order");
    let logger = DebugLogger::new(true, &path.to_string_lossy()).await;

    let count = 200u64;
    for move_number in 1..=count {
        logger.log_move(move_number, Grid::default(), move_number * 4, Direction::Up, None);
    }
    logger.flush().await;

    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let entries = engine.load_log_file(&path).expect("log loads");
    let numbers: Vec<u64> = entries.iter().map(|entry| entry.move_number).collect();
    let expected: Vec<u64> = (1..=count).collect();
    assert_eq!(numbers, expected, "every entry written, in logging order");

    let _ = fs::remove_file(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_drains_queue_and_drops_later_entries() {
    let path = scratch_path("debug_logger_shutdown");
    let logger = DebugLogger::new(true, &path.to_string_lossy()).await;

    for move_number in 1..=25 {
        logger.log_move(move_number, Grid::default(), 0, Direction::Right, Some(1.0));
    }
    logger.shutdown().await;
    logger.log_move(26, Grid::default(), 0, Direction::Right, None);
    logger.flush().await;

    let contents = fs::read_to_string(&path).expect("log file written");
    assert_eq!(contents.lines().count(), 25);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn test_disabled_logger_writes_nothing() {
    let path = scratch_path("disabled_logger");
    let logger = DebugLogger::new(false, &path.to_string_lossy()).await;
    assert!(!logger.is_enabled());

    logger.log_move(1, Grid::default(), 0, Direction::Up, None);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!path.exists());
}
