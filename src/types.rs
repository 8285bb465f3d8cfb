// Core value types shared by the grid engine, the search and the autoplay driver

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side length of the square grid
pub const GRID_SIZE: usize = 4;

/// A 4x4 board of tile values. 0 is an empty cell, anything else is a power of two >= 2.
///
/// Grids are plain values: every engine operation returns a new grid, and two grids are
/// equal exactly when every cell holds the same value.
#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Grid([[u32; GRID_SIZE]; GRID_SIZE]);

impl Grid {
    /// Builds a grid from its rows, top to bottom
    pub const fn from_rows(rows: [[u32; GRID_SIZE]; GRID_SIZE]) -> Self {
        Grid(rows)
    }

    /// Returns the rows of the grid, top to bottom
    pub fn rows(&self) -> &[[u32; GRID_SIZE]; GRID_SIZE] {
        &self.0
    }

    /// Returns the value at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.0[row][col]
    }

    /// Returns a copy of this grid with (row, col) set to `value`
    #[inline]
    pub fn with_tile(mut self, row: usize, col: usize, value: u32) -> Self {
        self.0[row][col] = value;
        self
    }

    /// Coordinates of every empty cell in row-major order
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for (r, row) in self.0.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value == 0 {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    /// Number of empty cells
    pub fn count_empty(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// Highest tile on the grid (0 for an empty grid)
    pub fn max_tile(&self) -> u32 {
        self.0.iter().flatten().copied().max().unwrap_or(0)
    }
}

impl From<[[u32; GRID_SIZE]; GRID_SIZE]> for Grid {
    fn from(rows: [[u32; GRID_SIZE]; GRID_SIZE]) -> Self {
        Grid(rows)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({:?})", self.0)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 {
                writeln!(f, "-----------------------------")?;
            }
            let cells: Vec<String> = row
                .iter()
                .map(|&v| {
                    if v == 0 {
                        format!("{:^6}", ".")
                    } else {
                        format!("{:^6}", v)
                    }
                })
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

/// Represents the four possible slide directions
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Order in which the search evaluates moves; ties keep the earliest entry
    pub fn search_order() -> [Direction; 4] {
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left]
    }

    /// Converts direction to its lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// Result of sliding a grid in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub grid: Grid,
    /// Sum of the values of all tiles created by merges during the move
    pub score: u32,
}

impl MoveOutcome {
    /// True if the move altered at least one cell of `before`
    pub fn changed(&self, before: &Grid) -> bool {
        self.grid != *before
    }
}

/// Expected value of one root move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub direction: Direction,
    pub value: f64,
    /// False when the move leaves the grid unchanged; `value` is then negative infinity
    pub legal: bool,
}

/// Node counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub evaluations: u64,
    pub cache_hits: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.evaluations += other.evaluations;
        self.cache_hits += other.cache_hits;
    }
}

/// Chosen move plus the evidence behind it
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub direction: Direction,
    /// Expected heuristic value of `direction`; None when no move changes the grid
    pub value: Option<f64>,
    pub branches: Vec<BranchEval>,
    pub stats: SearchStats,
}
