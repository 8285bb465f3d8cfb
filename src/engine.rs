// Grid transition engine
//
// Pure transformations over the 4x4 grid: rotation, line merging, directional moves and
// terminal-state detection. Every direction is reduced to "merge each row toward the left
// edge" by rotating first and rotating back afterwards.

use crate::types::{Direction, Grid, MoveOutcome, GRID_SIZE};

/// Returns a grid with every cell empty
pub fn create_empty_grid() -> Grid {
    Grid::default()
}

/// Rotates the grid 90 degrees clockwise, `times` times (taken modulo 4)
pub fn rotate(grid: &Grid, times: usize) -> Grid {
    let mut current = *grid.rows();
    for _ in 0..(times % 4) {
        let mut rotated = [[0u32; GRID_SIZE]; GRID_SIZE];
        for (i, row) in current.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                rotated[j][GRID_SIZE - 1 - i] = value;
            }
        }
        current = rotated;
    }
    Grid::from_rows(current)
}

/// Slides one line toward index 0, merging each equal adjacent pair at most once
///
/// Returns the new line and the sum of the merged tile values.
pub fn merge_line(line: [u32; GRID_SIZE]) -> ([u32; GRID_SIZE], u32) {
    let mut merged = [0u32; GRID_SIZE];
    let mut score = 0;
    let mut out = 0;
    let mut pending: Option<u32> = None;

    for value in line.iter().copied().filter(|&v| v != 0) {
        match pending {
            Some(prev) if prev == value => {
                merged[out] = prev * 2;
                score += prev * 2;
                out += 1;
                pending = None;
            }
            Some(prev) => {
                merged[out] = prev;
                out += 1;
                pending = Some(value);
            }
            None => pending = Some(value),
        }
    }
    if let Some(prev) = pending {
        merged[out] = prev;
    }

    (merged, score)
}

/// Clockwise rotations that bring `direction` onto the left edge
fn rotations_for(direction: Direction) -> usize {
    match direction {
        Direction::Up => 3,
        Direction::Right => 2,
        Direction::Down => 1,
        Direction::Left => 0,
    }
}

/// Slides and merges every line of the grid toward `direction`
///
/// No tile is spawned. A move that changes nothing yields a grid equal to the input;
/// callers detect that with `MoveOutcome::changed`.
pub fn apply_move(grid: &Grid, direction: Direction) -> MoveOutcome {
    let rotations = rotations_for(direction);
    let rotated = rotate(grid, rotations);

    let mut rows = *rotated.rows();
    let mut score = 0;
    for row in rows.iter_mut() {
        let (line, line_score) = merge_line(*row);
        *row = line;
        score += line_score;
    }

    MoveOutcome {
        grid: rotate(&Grid::from_rows(rows), (4 - rotations) % 4),
        score,
    }
}

/// True when the grid is full and no two 4-connected neighbours hold equal values
pub fn is_terminal(grid: &Grid) -> bool {
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            let value = grid.get(r, c);
            if value == 0 {
                return false;
            }
            // Right and down neighbours cover every adjacent pair once
            if c + 1 < GRID_SIZE && grid.get(r, c + 1) == value {
                return false;
            }
            if r + 1 < GRID_SIZE && grid.get(r + 1, c) == value {
                return false;
            }
        }
    }
    true
}
