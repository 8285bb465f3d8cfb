// Standalone replay tool for re-checking autoplay decision logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all moves
//   --moves <m1,m2>        Replay specific moves (comma-separated)
//   --validate             Check logged moves against expected moves
//   --verbose              Show detailed output for each move
//   --config <path>        Path to Autoplay.toml (default: Autoplay.toml)

use std::env;
use std::process;

use autoplay_2048::config::Config;
use autoplay_2048::replay::{parse_expected_moves, ReplayEngine};

fn print_usage() {
    eprintln!("2048 Autoplay Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all moves in the log");
    eprintln!("  --moves <M1,M2,...>     Replay specific moves (comma-separated)");
    eprintln!("  --validate <M:D,...>    Validate expected moves (format: move:direction,...)");
    eprintln!("  --verbose               Show detailed output for each move");
    eprintln!("  --config <path>         Path to Autoplay.toml (default: Autoplay.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay autoplay_debug.jsonl --all");
    eprintln!("  replay autoplay_debug.jsonl --moves 5,10,15");
    eprintln!("  replay autoplay_debug.jsonl --validate 5:up,10:left|down");
}

fn parse_moves(s: &str) -> Result<Vec<u64>, String> {
    s.split(',')
        .map(|m| {
            m.trim()
                .parse::<u64>()
                .map_err(|e| format!("Invalid move number '{}': {}", m, e))
        })
        .collect()
}

enum Mode {
    All,
    Moves(String),
    Validate(String),
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(if args.iter().any(|a| a == "--help") { 0 } else { 1 });
    }

    let log_file = &args[1];
    let mut config_path = "Autoplay.toml".to_string();
    let mut verbose = false;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => mode = Some(Mode::All),
            "--moves" | "--validate" | "--config" => {
                let value = args
                    .get(i + 1)
                    .cloned()
                    .unwrap_or_else(|| fail(&format!("{} requires an argument", args[i])));
                match args[i].as_str() {
                    "--moves" => mode = Some(Mode::Moves(value)),
                    "--validate" => mode = Some(Mode::Validate(value)),
                    _ => config_path = value,
                }
                i += 1;
            }
            "--verbose" => verbose = true,
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mode = mode.unwrap_or_else(|| fail("Must specify --all, --moves, or --validate"));

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let engine = ReplayEngine::new(config, verbose);

    let entries = engine
        .load_log_file(log_file)
        .unwrap_or_else(|e| fail(&format!("loading log file: {}", e)));

    if entries.is_empty() {
        fail("Log file is empty");
    }

    println!("Loaded {} log entries\n", entries.len());

    match mode {
        Mode::All => {
            println!("Replaying all {} moves...\n", entries.len());
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Moves(arg) => {
            let moves = parse_moves(&arg).unwrap_or_else(|e| fail(&e));
            println!("Replaying {} specific move(s)...\n", moves.len());
            match engine.replay_moves(&entries, &moves) {
                Ok(results) => engine.print_report(&results),
                Err(e) => fail(&format!("during replay: {}", e)),
            }
        }
        Mode::Validate(arg) => {
            let expected = parse_expected_moves(&arg).unwrap_or_else(|e| fail(&e));
            match engine.validate_expected_moves(&entries, &expected) {
                Ok(()) => println!("✓ All {} expected moves validated", expected.len()),
                Err(e) => fail(&format!("Validation failed: {}", e)),
            }
        }
    }
}
