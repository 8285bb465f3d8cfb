// Autoplay driver
//
// Runs the expectimax search off the async executor and applies its choice once per tick.
// Search, move and spawn for one tick form a single unit of work: the next tick never starts
// before the previous search has been joined, so no search ever runs against a stale grid.

use log::{debug, error, info, warn};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::game::{Game, GameStatus, MoveResult};
use crate::search::{fallback_move, SearchEngine};
use crate::types::{Grid, SearchResult, SearchStats};

/// A move chosen for one tick
#[derive(Debug, Clone)]
pub struct MoveDecision {
    pub result: SearchResult,
    /// True when the search ran out of budget and was cut short
    pub cancelled: bool,
    pub elapsed_ms: u128,
}

/// Final state of an autoplayed game
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub score: u64,
    pub moves: u64,
    pub max_tile: u32,
    pub final_grid: Grid,
    pub status: GameStatus,
    pub cancelled_searches: u64,
}

impl GameSummary {
    fn from_game(game: &Game, cancelled_searches: u64) -> Self {
        GameSummary {
            score: game.score(),
            moves: game.moves(),
            max_tile: game.grid().max_tile(),
            final_grid: *game.grid(),
            status: game.status(),
            cancelled_searches,
        }
    }
}

/// Autoplayer bound to a static configuration
pub struct Bot {
    config: Config,
    engine: Arc<SearchEngine>,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        let engine = Arc::new(SearchEngine::from_config(&config));
        Bot { config, engine }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Searches synchronously on the calling thread, without a time budget
    pub fn choose_move(&self, grid: &Grid) -> SearchResult {
        self.engine.search(grid)
    }

    /// Computes the next move within the configured search budget
    ///
    /// The search runs on the blocking pool. Once the budget elapses it is cancelled and
    /// joined; the best root move finished so far is used, or the first legal move when
    /// none finished.
    pub async fn get_move(&self, grid: &Grid) -> MoveDecision {
        let start_time = Instant::now();
        let cancel = Arc::new(AtomicBool::new(false));

        let worker_cancel = cancel.clone();
        let engine = self.engine.clone();
        let grid = *grid;
        let mut handle =
            tokio::task::spawn_blocking(move || engine.search_cancellable(&grid, &worker_cancel));

        let budget = Duration::from_millis(self.config.autoplay.search_budget_ms);
        let joined = match tokio::time::timeout(budget, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    "Search exceeded budget of {}ms, cancelling",
                    self.config.autoplay.search_budget_ms
                );
                cancel.store(true, Ordering::Release);
                handle.await
            }
        };
        let cancelled = cancel.load(Ordering::Acquire);

        let result = match joined {
            Ok(Some(result)) => result,
            Ok(None) => Self::fallback_result(&grid),
            Err(e) => {
                error!("Search task failed: {}", e);
                Self::fallback_result(&grid)
            }
        };

        MoveDecision {
            result,
            cancelled,
            elapsed_ms: start_time.elapsed().as_millis(),
        }
    }

    /// Plays `game` on a fixed tick until it ends, `max_moves` is reached, or `stop` is raised
    pub async fn autoplay<R: Rng + ?Sized>(
        &self,
        game: &mut Game,
        rng: &mut R,
        logger: &DebugLogger,
        stop: &AtomicBool,
    ) -> GameSummary {
        let period = Duration::from_millis(self.config.autoplay.polling_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cancelled_searches = 0;
        info!("Autoplay started (depth {})", self.engine.depth());

        while !game.is_over() {
            if stop.load(Ordering::Acquire) {
                info!("Autoplay stopped after {} moves", game.moves());
                break;
            }
            if self.reached_move_limit(game) {
                info!("Autoplay reached move limit ({})", game.moves());
                break;
            }

            ticker.tick().await;

            let decision = self.get_move(game.grid()).await;
            if decision.cancelled {
                cancelled_searches += 1;
            }
            if !self.apply_decision(game, &decision.result, rng, Some(logger)) {
                break;
            }
            debug!(
                "Move {}: {} (value: {:?}, nodes: {}, time: {}ms)",
                game.moves(),
                decision.result.direction,
                decision.result.value,
                decision.result.stats.nodes,
                decision.elapsed_ms
            );
        }

        let summary = GameSummary::from_game(game, cancelled_searches);
        info!(
            "Autoplay finished: score {}, {} moves, max tile {}",
            summary.score, summary.moves, summary.max_tile
        );
        summary
    }

    /// Plays a fresh game to the end on the calling thread
    pub fn play_to_completion<R: Rng + ?Sized>(&self, rng: &mut R) -> GameSummary {
        let mut game = Game::with_probability(self.config.spawn.two_probability, rng);

        while !game.is_over() && !self.reached_move_limit(&game) {
            let result = self.choose_move(game.grid());
            if !self.apply_decision(&mut game, &result, rng, None) {
                break;
            }
        }

        GameSummary::from_game(&game, 0)
    }

    /// Applies a chosen move; returns false when the game cannot continue
    fn apply_decision<R: Rng + ?Sized>(
        &self,
        game: &mut Game,
        result: &SearchResult,
        rng: &mut R,
        logger: Option<&DebugLogger>,
    ) -> bool {
        let before = *game.grid();
        let score_before = game.score();

        match game.apply_move(result.direction, rng) {
            MoveResult::Accepted { .. } => {
                if let Some(logger) = logger {
                    logger.log_move(
                        game.moves(),
                        before,
                        score_before,
                        result.direction,
                        result.value,
                    );
                }
                true
            }
            MoveResult::NoOp => {
                // Only a terminal grid has no legal move, and that ends the game first
                warn!("Chosen move {} did not change the grid", result.direction);
                false
            }
            MoveResult::Rejected => false,
        }
    }

    fn reached_move_limit(&self, game: &Game) -> bool {
        self.config
            .autoplay
            .max_moves
            .map(|limit| game.moves() >= limit)
            .unwrap_or(false)
    }

    fn fallback_result(grid: &Grid) -> SearchResult {
        SearchResult {
            direction: fallback_move(grid),
            value: None,
            branches: Vec::new(),
            stats: SearchStats::default(),
        }
    }
}
