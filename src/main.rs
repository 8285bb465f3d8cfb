use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use autoplay_2048::bot::Bot;
use autoplay_2048::config::Config;
use autoplay_2048::debug_logger::DebugLogger;
use autoplay_2048::game::Game;

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting 2048 autoplay...");

    let config = Config::load_or_default();

    // AUTOPLAY_SEED overrides the configured seed; without either the game is unseeded
    let seed = env::var("AUTOPLAY_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .or(config.autoplay.seed);
    let mut rng = match seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let bot = Bot::new(config.clone());
    let mut game = Game::with_probability(config.spawn.two_probability, &mut rng);
    let stop = Arc::new(AtomicBool::new(false));

    // Ctrl-C ends the game after the current tick instead of killing the process
    let stop_on_signal = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current move");
            stop_on_signal.store(true, Ordering::Release);
        }
    });

    println!("{}", game.grid());
    let summary = bot.autoplay(&mut game, &mut rng, &logger, &stop).await;
    logger.shutdown().await;

    println!("{}", summary.final_grid);
    println!(
        "Score: {}, Moves: {}, Max tile: {}, Status: {:?}",
        summary.score, summary.moves, summary.max_tile, summary.status
    );
    if summary.cancelled_searches > 0 {
        println!("Searches cut short by budget: {}", summary.cancelled_searches);
    }
}
