//! Column compaction and refill after removals, with fall-in offset
//! bookkeeping for the renderer.

use crate::bag::Bag;
use crate::grid::{Grid, Tile};
use rand::Rng;

/// Compact every column: survivors sink to the bottom preserving their
/// relative order, removed slots bubble to the top. When `refill`, the top
/// slots are dealt fresh from the bag; otherwise they stay as holes (the
/// combo-deferral placeholder state).
///
/// Every tile that moves gets `fall_offset` = previous visual position −
/// new resting position, so a survivor that drops two rows animates from
/// two rows up; survivors that stay put keep offset 0. Fresh tiles enter
/// stacked above the board edge, offset −holes.
pub fn compact_and_drop<R: Rng>(grid: &mut Grid, bag: &mut Bag<R>, refill: bool) {
    let (rows, cols) = (grid.rows(), grid.cols());
    for col in 0..cols {
        let mut survivors: Vec<(usize, Tile)> = Vec::new();
        let mut holes: Vec<Tile> = Vec::new();
        for row in 0..rows {
            if let Some(t) = grid.tile(row, col) {
                if t.removed {
                    holes.push(t.clone());
                } else {
                    survivors.push((row, t.clone()));
                }
            }
        }
        let hole_count = holes.len();

        // Top of the column: fresh deals or the parked removed slots.
        for (row, stale) in holes.into_iter().enumerate() {
            let tile = if refill {
                let mut t = Tile::new(bag.next());
                t.fall_offset = -(hole_count as f32);
                t
            } else {
                let mut t = stale;
                t.fall_offset = 0.0;
                t
            };
            if let Some(slot) = grid.tile_mut(row, col) {
                *slot = tile;
            }
        }

        // Survivors settle bottom-aligned in their original order.
        for (i, (old_row, mut tile)) in survivors.into_iter().enumerate() {
            let new_row = hole_count + i;
            let visual = old_row as f32 + tile.fall_offset;
            tile.fall_offset = (visual - new_row as f32).min(0.0);
            if let Some(slot) = grid.tile_mut(new_row, col) {
                *slot = tile;
            }
        }
    }
}

/// Refill every removed slot in place. The j-th hole of a column (top to
/// bottom) enters with offset −(j+1), staggering same-column arrivals.
pub fn bulk_refill<R: Rng>(grid: &mut Grid, bag: &mut Bag<R>) {
    let (rows, cols) = (grid.rows(), grid.cols());
    for col in 0..cols {
        let mut filled = 0usize;
        for row in 0..rows {
            let needs_fill = grid.tile(row, col).is_some_and(|t| t.removed);
            if needs_fill {
                let mut t = Tile::new(bag.next());
                t.fall_offset = -((filled + 1) as f32);
                filled += 1;
                if let Some(slot) = grid.tile_mut(row, col) {
                    *slot = t;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::BagPolicy;
    use crate::grid::Coord;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bag() -> Bag<StdRng> {
        Bag::with_rng(BagPolicy::Uniform, StdRng::seed_from_u64(42))
    }

    fn column_live_values(g: &Grid, col: usize) -> Vec<u8> {
        (0..g.rows())
            .filter_map(|r| g.tile(r, col))
            .filter(|t| !t.removed)
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_compact_preserves_survivor_order_and_fills_top() {
        // Column: 1 / 2(removed) / 3 / 4(removed); survivors 1,3 keep order.
        let mut g = Grid::from_values(4, 1, &[1, 2, 3, 4]);
        g.mark_removed(&[Coord::new(1, 0), Coord::new(3, 0)]);
        let mut b = bag();
        compact_and_drop(&mut g, &mut b, true);

        assert_eq!(g.tile(2, 0).unwrap().value, 1);
        assert_eq!(g.tile(3, 0).unwrap().value, 3);
        assert!(!g.tile(0, 0).unwrap().removed);
        assert!(!g.tile(1, 0).unwrap().removed);
        // Fresh tiles fall in from above the edge.
        assert_eq!(g.tile(0, 0).unwrap().fall_offset, -2.0);
        assert_eq!(g.tile(1, 0).unwrap().fall_offset, -2.0);
        // Moved survivors animate from their old rows.
        assert_eq!(g.tile(2, 0).unwrap().fall_offset, -2.0);
        assert_eq!(g.tile(3, 0).unwrap().fall_offset, -1.0);
    }

    #[test]
    fn test_compact_without_refill_leaves_holes_on_top() {
        let mut g = Grid::from_values(4, 1, &[1, 2, 3, 4]);
        g.mark_removed(&[Coord::new(0, 0), Coord::new(2, 0)]);
        let mut b = bag();
        compact_and_drop(&mut g, &mut b, false);

        assert!(g.tile(0, 0).unwrap().removed);
        assert!(g.tile(1, 0).unwrap().removed);
        assert_eq!(g.tile(2, 0).unwrap().value, 2);
        assert_eq!(g.tile(3, 0).unwrap().value, 4);
        assert_eq!(g.live_count(), 2);
    }

    #[test]
    fn test_conservation_per_column() {
        let mut g = Grid::from_values(3, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        g.mark_removed(&[Coord::new(0, 1), Coord::new(2, 2)]);
        let before: Vec<Vec<u8>> = (0..3).map(|c| column_live_values(&g, c)).collect();
        let mut b = bag();
        compact_and_drop(&mut g, &mut b, false);
        for c in 0..3 {
            assert_eq!(column_live_values(&g, c), before[c]);
            // Column height is structurally ROWS; every slot still exists.
            assert_eq!((0..3).filter(|&r| g.tile(r, c).is_some()).count(), 3);
        }
    }

    #[test]
    fn test_unmoved_survivors_keep_zero_offset() {
        let mut g = Grid::from_values(3, 1, &[1, 2, 3]);
        g.mark_removed(&[Coord::new(0, 0)]);
        let mut b = bag();
        compact_and_drop(&mut g, &mut b, false);
        // 2 and 3 were already bottom-aligned below the removed top slot.
        assert_eq!(g.tile(1, 0).unwrap().fall_offset, 0.0);
        assert_eq!(g.tile(2, 0).unwrap().fall_offset, 0.0);
    }

    #[test]
    fn test_bulk_refill_fills_in_place_with_stagger() {
        let mut g = Grid::from_values(4, 1, &[1, 2, 3, 4]);
        g.mark_removed(&[Coord::new(0, 0), Coord::new(2, 0)]);
        let mut b = bag();
        bulk_refill(&mut g, &mut b);

        assert_eq!(g.live_count(), 4);
        // Survivors stayed where they were.
        assert_eq!(g.tile(1, 0).unwrap().value, 2);
        assert_eq!(g.tile(3, 0).unwrap().value, 4);
        // Staggered entry offsets, top to bottom.
        assert_eq!(g.tile(0, 0).unwrap().fall_offset, -1.0);
        assert_eq!(g.tile(2, 0).unwrap().fall_offset, -2.0);
    }

    #[test]
    fn test_bulk_refill_of_cleared_board_redeals_everything() {
        let mut g = Grid::from_values(2, 2, &[3, 7, 7, 3]);
        let all: Vec<_> = g.coords().collect();
        g.mark_removed(&all);
        let mut b = bag();
        bulk_refill(&mut g, &mut b);
        assert_eq!(g.live_count(), 4);
        assert!(g.tiles().all(|(_, t)| (1..=9).contains(&t.value)));
    }
}
