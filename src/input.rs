//! Input interpretation: key bindings, and the pure geometry that turns a
//! pointer drag into a grid selection. No side effects live here; the app
//! feeds results into the session.

use crate::grid::{Coord, Grid};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Terminal cells per tile, horizontally and vertically.
pub const CELL_W: u16 = 4;
pub const CELL_H: u16 = 2;

/// Action from a key press during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Hint,
    Shuffle,
    Bomb,
    Wipe,
    Freeze,
    Confirm,
    Left,
    Right,
    Up,
    Down,
    Quit,
    None,
}

/// Map a key event to a game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('h') => Action::Hint,
        KeyCode::Char('s') => Action::Shuffle,
        KeyCode::Char('d') => Action::Bomb,
        KeyCode::Char('w') => Action::Wipe,
        KeyCode::Char('f') => Action::Freeze,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        _ => Action::None,
    }
}

/// Where the board sits on screen. Computed by the layout each frame and
/// handed to the interpreter so pointer math stays independent of drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    pub x: u16,
    pub y: u16,
    pub rows: usize,
    pub cols: usize,
}

impl BoardGeometry {
    pub fn width(&self) -> u16 {
        self.cols as u16 * CELL_W
    }

    pub fn height(&self) -> u16 {
        self.rows as u16 * CELL_H
    }

    /// Inclusive screen-cell rectangle of a tile.
    pub fn cell_rect(&self, coord: Coord) -> (u16, u16, u16, u16) {
        let x1 = self.x + coord.col as u16 * CELL_W;
        let y1 = self.y + coord.row as u16 * CELL_H;
        (x1, y1, x1 + CELL_W - 1, y1 + CELL_H - 1)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.x + self.width() && y >= self.y && y < self.y + self.height()
    }

    /// Tile under a single point (targeted bomb mode).
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Coord> {
        if !self.contains(x, y) {
            return None;
        }
        let col = usize::from((x - self.x) / CELL_W);
        let row = usize::from((y - self.y) / CELL_H);
        Some(Coord::new(row, col))
    }
}

/// Selection membership for a drag from `start` to `current`: every settled,
/// surviving tile whose cell rectangle intersects the drag's bounding box.
pub fn selection_under_drag(
    geom: &BoardGeometry,
    grid: &Grid,
    start: (u16, u16),
    current: (u16, u16),
) -> Vec<Coord> {
    let bx1 = start.0.min(current.0);
    let bx2 = start.0.max(current.0);
    let by1 = start.1.min(current.1);
    let by2 = start.1.max(current.1);

    grid.tiles()
        .filter(|(_, t)| t.selectable())
        .map(|(c, _)| c)
        .filter(|&c| {
            let (tx1, ty1, tx2, ty2) = geom.cell_rect(c);
            !(tx2 < bx1 || tx1 > bx2 || ty2 < by1 || ty1 > by2)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom() -> BoardGeometry {
        BoardGeometry {
            x: 10,
            y: 5,
            rows: 2,
            cols: 2,
        }
    }

    #[test]
    fn test_cell_at_maps_corners() {
        let g = geom();
        assert_eq!(g.cell_at(10, 5), Some(Coord::new(0, 0)));
        assert_eq!(g.cell_at(13, 6), Some(Coord::new(0, 0)));
        assert_eq!(g.cell_at(14, 5), Some(Coord::new(0, 1)));
        assert_eq!(g.cell_at(10, 7), Some(Coord::new(1, 0)));
        // One past the right/bottom edge is outside.
        assert_eq!(g.cell_at(18, 5), None);
        assert_eq!(g.cell_at(10, 9), None);
        assert_eq!(g.cell_at(9, 5), None);
    }

    #[test]
    fn test_drag_bbox_selects_intersected_tiles() {
        let g = geom();
        let grid = Grid::from_values(2, 2, &[3, 7, 7, 3]);
        // A one-cell "click" inside the top-left tile.
        let sel = selection_under_drag(&g, &grid, (11, 5), (11, 5));
        assert_eq!(sel, vec![Coord::new(0, 0)]);
        // Drag across the top row: partial overlap counts.
        let sel = selection_under_drag(&g, &grid, (11, 5), (15, 6));
        assert_eq!(sel, vec![Coord::new(0, 0), Coord::new(0, 1)]);
        // Reversed drag normalizes the same box.
        let rev = selection_under_drag(&g, &grid, (15, 6), (11, 5));
        assert_eq!(rev, sel);
    }

    #[test]
    fn test_drag_skips_removed_and_falling_tiles() {
        let g = geom();
        let mut grid = Grid::from_values(2, 2, &[3, 7, 7, 3]);
        grid.mark_removed(&[Coord::new(0, 0)]);
        grid.tile_mut(0, 1).unwrap().fall_offset = -0.5;
        let sel = selection_under_drag(&g, &grid, (10, 5), (17, 8));
        assert_eq!(sel, vec![Coord::new(1, 0), Coord::new(1, 1)]);
    }

    #[test]
    fn test_quit_keys() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(key_to_action(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(key_to_action(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(press(KeyCode::Char('h'))), Action::Hint);
        assert_eq!(key_to_action(press(KeyCode::Char('x'))), Action::None);
    }
}
