//! Plays a batch of seeded games in parallel and reports how the autoplayer scores
//!
//! Usage: benchmark [games] [first_seed] [config_path]

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::env;
use std::process;
use std::time::Instant;

use autoplay_2048::bot::{Bot, GameSummary};
use autoplay_2048::config::Config;

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    match args.get(index) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("Error: could not parse argument '{}'", raw);
            process::exit(1);
        }),
        None => default,
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let games: u64 = parse_arg(&args, 1, 20);
    let first_seed: u64 = parse_arg(&args, 2, 0);
    let config = match args.get(3) {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    };

    println!("\n═══════════════════════════════════════════════════════════");
    println!("                 AUTOPLAY BENCHMARK");
    println!("═══════════════════════════════════════════════════════════");
    println!("Games:          {}", games);
    println!("Seeds:          {}..{}", first_seed, first_seed + games);
    println!("Search depth:   {}", config.search.depth);
    println!("Threads:        {}", rayon::current_num_threads());
    println!("═══════════════════════════════════════════════════════════\n");

    let bot = Bot::new(config);
    let start = Instant::now();

    let summaries: Vec<GameSummary> = (first_seed..first_seed + games)
        .into_par_iter()
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let summary = bot.play_to_completion(&mut rng);
            log::info!(
                "Seed {}: score {}, {} moves, max tile {}",
                seed,
                summary.score,
                summary.moves,
                summary.max_tile
            );
            summary
        })
        .collect();

    if summaries.is_empty() {
        println!("No games played");
        return;
    }

    let count = summaries.len() as f64;
    let mean_score = summaries.iter().map(|s| s.score as f64).sum::<f64>() / count;
    let mean_moves = summaries.iter().map(|s| s.moves as f64).sum::<f64>() / count;
    let best_score = summaries.iter().map(|s| s.score).max().unwrap_or(0);

    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for summary in &summaries {
        *histogram.entry(summary.max_tile).or_insert(0) += 1;
    }

    println!("Mean score:     {:.1}", mean_score);
    println!("Best score:     {}", best_score);
    println!("Mean moves:     {:.1}", mean_moves);
    println!("Elapsed:        {:.2}s\n", start.elapsed().as_secs_f64());

    println!("Max tile reached:");
    for (tile, hits) in histogram.iter().rev() {
        println!(
            "  {:>6}: {:>4} ({:.1}%)",
            tile,
            hits,
            *hits as f64 / count * 100.0
        );
    }
}
