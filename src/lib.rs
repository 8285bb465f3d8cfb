// Library exports for the 2048 autoplayer
// The grid engine and search are pure; the bot, logger and replay tool build on them

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod evaluator;
pub mod game;
pub mod replay;
pub mod search;
pub mod spawner;
pub mod types;

pub use engine::{apply_move, create_empty_grid, is_terminal};
pub use search::get_ai_move;
pub use spawner::add_random_tile;
pub use types::{Direction, Grid, MoveOutcome, SearchResult};
