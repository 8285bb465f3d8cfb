// Expectimax move selection
//
// Max nodes are the player's turn: every direction that changes the grid is expanded and the
// best child wins. Chance nodes are the spawner's turn: every empty cell receives a 2 or a 4,
// weighted by the spawn probability, and the per-cell results are averaged. Leaves are scored
// by the static evaluator.

use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{Config, SearchConfig};
use crate::engine::{apply_move, is_terminal};
use crate::evaluator::Evaluator;
use crate::types::{BranchEval, Direction, Grid, SearchResult, SearchStats};

/// Whose turn a search node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Player picks a direction
    Max,
    /// Spawner places a tile
    Chance,
}

/// How the root moves are distributed over threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionStrategy {
    Sequential,
    /// One rayon task per root direction
    ParallelRoot,
}

type CacheKey = (Grid, u8, NodeKind);

/// Stateless expectimax searcher; every call starts from scratch
#[derive(Debug, Clone)]
pub struct SearchEngine {
    evaluator: Evaluator,
    config: SearchConfig,
    two_probability: f64,
}

impl SearchEngine {
    pub fn new(evaluator: Evaluator, config: SearchConfig, two_probability: f64) -> Self {
        SearchEngine {
            evaluator,
            config,
            two_probability,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Evaluator::new(config.evaluator.clone()),
            config.search.clone(),
            config.spawn.two_probability,
        )
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn depth(&self) -> u8 {
        self.config.depth
    }

    /// Returns the direction with the greatest expected value
    pub fn best_move(&self, grid: &Grid) -> Direction {
        self.search(grid).direction
    }

    /// Evaluates every root move and picks the best one
    pub fn search(&self, grid: &Grid) -> SearchResult {
        let strategy = self.determine_strategy(rayon::current_num_threads());
        debug!(
            "Searching depth {} with {:?} strategy",
            self.config.depth, strategy
        );

        let mut stats = SearchStats::default();
        let branches: Vec<BranchEval> = match strategy {
            ExecutionStrategy::Sequential => {
                let mut ctx = SearchContext::new(self, None);
                let branches: Vec<BranchEval> = Direction::search_order()
                    .iter()
                    .map(|&direction| ctx.root_branch(grid, direction))
                    .collect();
                stats = ctx.stats;
                branches
            }
            ExecutionStrategy::ParallelRoot => {
                let order = Direction::search_order();
                let evaluated: Vec<(BranchEval, SearchStats)> = order[..]
                    .par_iter()
                    .map(|&direction| {
                        let mut ctx = SearchContext::new(self, None);
                        let branch = ctx.root_branch(grid, direction);
                        (branch, ctx.stats)
                    })
                    .collect();
                evaluated
                    .into_iter()
                    .map(|(branch, branch_stats)| {
                        stats.merge(&branch_stats);
                        branch
                    })
                    .collect()
            }
        };

        Self::select(branches, stats)
    }

    /// Sequential search that gives up as soon as `cancel` is raised
    ///
    /// Root moves finished before cancellation are kept and the best of them is returned.
    /// Returns None when cancellation arrived before any legal root move was finished.
    pub fn search_cancellable(&self, grid: &Grid, cancel: &AtomicBool) -> Option<SearchResult> {
        let mut ctx = SearchContext::new(self, Some(cancel));
        let mut branches = Vec::with_capacity(4);

        for direction in Direction::search_order() {
            let branch = ctx.root_branch(grid, direction);
            if ctx.cancelled() {
                debug!("Search cancelled while evaluating {}", direction);
                break;
            }
            branches.push(branch);
        }

        let complete = branches.len() == 4;
        if !complete && !branches.iter().any(|b| b.legal) {
            return None;
        }
        Some(Self::select(branches, ctx.stats))
    }

    /// Expected value of `grid` as a node of the given kind with `depth` plies remaining
    pub fn expectimax(&self, grid: &Grid, depth: u8, kind: NodeKind) -> f64 {
        SearchContext::new(self, None).expectimax(grid, depth, kind)
    }

    fn determine_strategy(&self, num_cpus: usize) -> ExecutionStrategy {
        if self.config.depth >= self.config.parallel_min_depth
            && num_cpus >= self.config.min_cpus_for_parallel
        {
            ExecutionStrategy::ParallelRoot
        } else {
            ExecutionStrategy::Sequential
        }
    }

    /// Strictly greater wins, so ties keep the earliest direction in search order
    fn select(branches: Vec<BranchEval>, stats: SearchStats) -> SearchResult {
        let mut best_direction = Direction::Up;
        let mut best_value = f64::NEG_INFINITY;

        for branch in branches.iter().filter(|b| b.legal) {
            if branch.value > best_value {
                best_value = branch.value;
                best_direction = branch.direction;
            }
        }

        SearchResult {
            direction: best_direction,
            value: if best_value > f64::NEG_INFINITY {
                Some(best_value)
            } else {
                None
            },
            branches,
            stats,
        }
    }
}

/// First direction in search order that changes the grid, or Up when none does
pub fn fallback_move(grid: &Grid) -> Direction {
    Direction::search_order()
        .into_iter()
        .find(|&direction| apply_move(grid, direction).changed(grid))
        .unwrap_or(Direction::Up)
}

/// Picks a move for `grid` with the default evaluator and a depth-2 search
pub fn get_ai_move(grid: &Grid) -> Direction {
    SearchEngine::from_config(&Config::default_hardcoded()).best_move(grid)
}

/// Mutable state scoped to a single search call
struct SearchContext<'a> {
    engine: &'a SearchEngine,
    cancel: Option<&'a AtomicBool>,
    cache: Option<HashMap<CacheKey, f64>>,
    stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    fn new(engine: &'a SearchEngine, cancel: Option<&'a AtomicBool>) -> Self {
        SearchContext {
            engine,
            cancel,
            cache: if engine.config.cache_enabled {
                Some(HashMap::new())
            } else {
                None
            },
            stats: SearchStats::default(),
        }
    }

    #[inline]
    fn cancelled(&self) -> bool {
        self.cancel
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    fn root_branch(&mut self, grid: &Grid, direction: Direction) -> BranchEval {
        let outcome = apply_move(grid, direction);
        if !outcome.changed(grid) {
            return BranchEval {
                direction,
                value: f64::NEG_INFINITY,
                legal: false,
            };
        }

        BranchEval {
            direction,
            value: self.expectimax(&outcome.grid, self.engine.config.depth, NodeKind::Chance),
            legal: true,
        }
    }

    fn expectimax(&mut self, grid: &Grid, depth: u8, kind: NodeKind) -> f64 {
        self.stats.nodes += 1;
        if self.cancelled() {
            return 0.0;
        }

        if depth == 0 || is_terminal(grid) {
            self.stats.evaluations += 1;
            return self.engine.evaluator.evaluate(grid);
        }

        let key = (*grid, depth, kind);
        if let Some(&value) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            self.stats.cache_hits += 1;
            return value;
        }

        let value = match kind {
            NodeKind::Max => self.max_node(grid, depth),
            NodeKind::Chance => self.chance_node(grid, depth),
        };

        // A cancelled subtree holds placeholder values and must not be reused
        if !self.cancelled() {
            if let Some(cache) = self.cache.as_mut() {
                cache.insert(key, value);
            }
        }
        value
    }

    fn max_node(&mut self, grid: &Grid, depth: u8) -> f64 {
        let mut best = f64::NEG_INFINITY;
        for direction in Direction::search_order() {
            let outcome = apply_move(grid, direction);
            if !outcome.changed(grid) {
                continue;
            }
            let value = self.expectimax(&outcome.grid, depth - 1, NodeKind::Chance);
            if value > best {
                best = value;
            }
        }
        best
    }

    fn chance_node(&mut self, grid: &Grid, depth: u8) -> f64 {
        let empty = grid.empty_cells();
        if empty.is_empty() {
            return 0.0;
        }

        let two_probability = self.engine.two_probability;
        let mut total = 0.0;
        for &(row, col) in &empty {
            let with_two = self.expectimax(&grid.with_tile(row, col, 2), depth - 1, NodeKind::Max);
            let with_four = self.expectimax(&grid.with_tile(row, col, 4), depth - 1, NodeKind::Max);
            total += two_probability * with_two + (1.0 - two_probability) * with_four;
        }
        total / empty.len() as f64
    }
}
