// Tile spawner: the only stochastic step of the game
//
// The random source is always supplied by the caller so that spawn sequences, and with
// them whole games, can be reproduced from a seed.

use rand::Rng;

use crate::types::Grid;

/// Probability that a spawned tile is a 2 rather than a 4
pub const TWO_PROBABILITY: f64 = 0.9;

/// Places a 2 (90%) or a 4 (10%) on a uniformly chosen empty cell
///
/// Returns the grid unchanged when there is no empty cell.
pub fn spawn<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Grid {
    spawn_with_probability(grid, TWO_PROBABILITY, rng)
}

/// Like `spawn`, with an explicit probability for the 2 tile
pub fn spawn_with_probability<R: Rng + ?Sized>(
    grid: &Grid,
    two_probability: f64,
    rng: &mut R,
) -> Grid {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return *grid;
    }

    // NaN would make random_bool panic
    let two_probability = if two_probability.is_nan() {
        TWO_PROBABILITY
    } else {
        two_probability.clamp(0.0, 1.0)
    };
    let (row, col) = empty[rng.random_range(0..empty.len())];
    let value = if rng.random_bool(two_probability) {
        2
    } else {
        4
    };
    grid.with_tile(row, col, value)
}

/// Convenience over the thread-local generator. Prefer `spawn` when determinism matters.
pub fn add_random_tile(grid: &Grid) -> Grid {
    let mut rng = rand::rng();
    spawn(grid, &mut rng)
}
