// Driver-level game state machine
//
// Owns the current grid across turns. A move is accepted only if it changes the grid; an
// accepted move adds its merge score, spawns one tile, and ends the game when the resulting
// grid is terminal.

use log::info;
use rand::Rng;

use crate::engine::{apply_move, create_empty_grid, is_terminal};
use crate::spawner::{spawn_with_probability, TWO_PROBABILITY};
use crate::types::{Direction, Grid};

/// Lifecycle of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// What happened to a requested move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The grid changed; carries the merge score of the move
    Accepted { score: u32 },
    /// The move left the grid unchanged; nothing was spawned
    NoOp,
    /// The game is already over
    Rejected,
}

/// A game in progress
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    score: u64,
    moves: u64,
    status: GameStatus,
    two_probability: f64,
}

impl Game {
    /// Starts a game with two spawned tiles
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_probability(TWO_PROBABILITY, rng)
    }

    /// Starts a game whose spawns use `two_probability` for the 2 tile
    pub fn with_probability<R: Rng + ?Sized>(two_probability: f64, rng: &mut R) -> Self {
        let mut game = Game {
            grid: create_empty_grid(),
            score: 0,
            moves: 0,
            status: GameStatus::Playing,
            two_probability,
        };
        game.reset(rng);
        game
    }

    /// Resumes from an existing grid; the status follows from the grid
    pub fn from_grid(grid: Grid, score: u64) -> Self {
        Game {
            grid,
            score,
            moves: 0,
            status: if is_terminal(&grid) {
                GameStatus::GameOver
            } else {
                GameStatus::Playing
            },
            two_probability: TWO_PROBABILITY,
        }
    }

    /// Re-seeds a fresh grid and returns to Playing
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let seeded = spawn_with_probability(&create_empty_grid(), self.two_probability, rng);
        self.grid = spawn_with_probability(&seeded, self.two_probability, rng);
        self.score = 0;
        self.moves = 0;
        self.status = GameStatus::Playing;
    }

    /// Applies `direction`, then spawns a tile if the grid changed
    pub fn apply_move<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> MoveResult {
        if self.status == GameStatus::GameOver {
            return MoveResult::Rejected;
        }

        let outcome = apply_move(&self.grid, direction);
        if !outcome.changed(&self.grid) {
            return MoveResult::NoOp;
        }

        self.grid = spawn_with_probability(&outcome.grid, self.two_probability, rng);
        self.score += u64::from(outcome.score);
        self.moves += 1;

        if is_terminal(&self.grid) {
            self.status = GameStatus::GameOver;
            info!(
                "Game over after {} moves (score: {}, max tile: {})",
                self.moves,
                self.score,
                self.grid.max_tile()
            );
        }

        MoveResult::Accepted {
            score: outcome.score,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_game_has_two_tiles() {
        let mut rng = StdRng::seed_from_u64(1);
        let game = Game::new(&mut rng);
        assert_eq!(game.grid().count_empty(), 14);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_noop_move_spawns_nothing() {
        let grid = Grid::from_rows([[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut game = Game::from_grid(grid, 0);
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(game.apply_move(Direction::Left, &mut rng), MoveResult::NoOp);
        assert_eq!(*game.grid(), grid);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn test_accepted_move_scores_and_spawns() {
        let grid = Grid::from_rows([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut game = Game::from_grid(grid, 10);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            game.apply_move(Direction::Left, &mut rng),
            MoveResult::Accepted { score: 4 }
        );
        assert_eq!(game.score(), 14);
        assert_eq!(game.grid().get(0, 0), 4);
        assert_eq!(game.grid().count_empty(), 14);
    }

    #[test]
    fn test_terminal_grid_rejects_moves_until_reset() {
        let stuck = Grid::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let mut game = Game::from_grid(stuck, 100);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(game.is_over());
        assert_eq!(game.apply_move(Direction::Up, &mut rng), MoveResult::Rejected);

        game.reset(&mut rng);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.grid().count_empty(), 14);
    }
}
