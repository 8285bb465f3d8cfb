// Static evaluation of a grid position
//
// Five weighted signals, each computed over the 16 cells or the 24 neighbour pairs:
// emptiness, smoothness, monotonicity, merge potential and positional weighting.

use crate::config::EvaluatorConfig;
use crate::types::{Grid, GRID_SIZE};

/// Per-term contributions to an evaluation, already weighted and signed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvaluationBreakdown {
    pub emptiness: f64,
    pub smoothness: f64,
    pub monotonicity: f64,
    pub merge_potential: f64,
    pub position: f64,
}

impl EvaluationBreakdown {
    pub fn total(&self) -> f64 {
        self.emptiness + self.smoothness + self.monotonicity + self.merge_potential + self.position
    }
}

/// Heuristic scorer; higher is better
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Evaluator { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Scores a grid without search
    #[inline]
    pub fn evaluate(&self, grid: &Grid) -> f64 {
        self.breakdown(grid).total()
    }

    /// Scores a grid and reports each term separately
    pub fn breakdown(&self, grid: &Grid) -> EvaluationBreakdown {
        let cfg = &self.config;
        let mut empty = 0u32;
        let mut abs_diff = 0.0;
        let mut decreasing = 0u32;
        let mut equal = 0u32;
        let mut position = 0.0;

        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                let value = grid.get(r, c);
                if value == 0 {
                    empty += 1;
                }
                position += f64::from(value) * cfg.position_weights[r][c];

                let mut neighbours = [None, None];
                if c + 1 < GRID_SIZE {
                    neighbours[0] = Some(grid.get(r, c + 1));
                }
                if r + 1 < GRID_SIZE {
                    neighbours[1] = Some(grid.get(r + 1, c));
                }
                for next in neighbours.iter().flatten().copied() {
                    abs_diff += f64::from(value.abs_diff(next));
                    if value > next {
                        decreasing += 1;
                    }
                    if value == next {
                        equal += 1;
                    }
                }
            }
        }

        EvaluationBreakdown {
            emptiness: cfg.empty_cell_weight * f64::from(empty),
            smoothness: -cfg.smoothness_weight * abs_diff,
            monotonicity: -cfg.monotonicity_penalty * f64::from(decreasing),
            merge_potential: cfg.merge_bonus * f64::from(equal),
            position,
        }
    }
}
