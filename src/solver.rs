//! Exhaustive rectangle-sum search: hints, deadlock detection, shuffle
//! validation all run through `find_match`.

use crate::grid::{Coord, Grid};

/// The magic number. A selection matches when its surviving values sum to
/// exactly this.
pub const TARGET_SUM: u32 = 10;

/// First axis-aligned rectangle, in (top-left, then bottom-right) scan
/// order, whose surviving tiles sum to exactly [`TARGET_SUM`]. Returns the
/// surviving cells inside it, or None when the board is dead.
///
/// Rectangles whose corner tiles are removed still count; only the live
/// cells inside contribute to the sum. An all-removed board returns None,
/// but callers must treat that as "board cleared", not deadlock, and check
/// it first.
pub fn find_match(grid: &Grid) -> Option<Vec<Coord>> {
    let (rows, cols) = (grid.rows(), grid.cols());
    for r1 in 0..rows {
        for c1 in 0..cols {
            for r2 in r1..rows {
                for c2 in c1..cols {
                    let mut sum = 0u32;
                    let mut cells = Vec::new();
                    'rect: for r in r1..=r2 {
                        for c in c1..=c2 {
                            if let Some(t) = grid.tile(r, c) {
                                if !t.removed {
                                    sum += u32::from(t.value);
                                    if sum > TARGET_SUM {
                                        break 'rect;
                                    }
                                    cells.push(Coord::new(r, c));
                                }
                            }
                        }
                    }
                    if sum == TARGET_SUM && !cells.is_empty() {
                        return Some(cells);
                    }
                }
            }
        }
    }
    None
}

/// Brute-force existence check used by tests and by nothing else hot.
#[cfg(test)]
fn has_match(grid: &Grid) -> bool {
    find_match(grid).is_some()
}
