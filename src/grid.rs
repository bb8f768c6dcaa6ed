//! Grid model: the ROWS×COLS tile matrix and per-tile lifecycle flags.

/// Hard cap on either grid dimension; the solver is O(R²C²·RC) and stays
/// comfortably fast up to here.
pub const MAX_DIM: usize = 16;

/// Rows a falling tile covers per second while its offset decays to rest.
pub const FALL_ROWS_PER_SEC: f32 = 14.0;

/// Cell address, row-major. Row 0 is the top of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One numbered cell. `removed` is a soft delete: the slot stays in the
/// matrix and gravity recycles it. `fall_offset` is rows above the resting
/// position (always ≤ 0) and is purely an animation quantity; a tile is
/// interactive only once it has settled back to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub value: u8,
    pub removed: bool,
    pub selected: bool,
    pub hinted: bool,
    pub fall_offset: f32,
}

impl Tile {
    pub fn new(value: u8) -> Self {
        Self {
            value,
            removed: false,
            selected: false,
            hinted: false,
            fall_offset: 0.0,
        }
    }

    #[inline]
    pub fn settled(&self) -> bool {
        self.fall_offset == 0.0
    }

    /// Settled, not removed: the tile can take part in a selection.
    #[inline]
    pub fn selectable(&self) -> bool {
        !self.removed && self.settled()
    }
}

/// Fixed-size board. Total tile count never changes after construction;
/// removal is soft and gravity/refill reuse the slots.
///
/// Mutation contract: `mark_removed` is open to ability and match handling,
/// `replace_all` belongs to construction and the gravity engine, and
/// `assign_values` exists for the shuffle operation alone (it reorders
/// values among surviving tiles and touches nothing else).
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build a board from `rows * cols` dealt values. Dimensions are clamped
    /// to 1..=MAX_DIM by the caller (config validation); a short deal is
    /// padded with 1s rather than panicking.
    pub fn from_values(rows: usize, cols: usize, values: &[u8]) -> Self {
        let tiles = (0..rows * cols)
            .map(|i| Tile::new(values.get(i).copied().unwrap_or(1)))
            .collect();
        Self { rows, cols, tiles }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        if row < self.rows && col < self.cols {
            self.tiles.get(self.idx(row, col))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.tile(coord.row, coord.col)
    }

    pub(crate) fn tile_mut(&mut self, row: usize, col: usize) -> Option<&mut Tile> {
        if row < self.rows && col < self.cols {
            let i = self.idx(row, col);
            self.tiles.get_mut(i)
        } else {
            None
        }
    }

    /// All coordinates in scan order (row-major).
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Coord::new(i / cols, i % cols))
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Coord, &Tile)> + '_ {
        self.coords().zip(self.tiles.iter())
    }

    pub fn live_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.removed).count()
    }

    /// True when every slot is removed: the "board cleared" terminal
    /// condition, checked before any deadlock logic runs.
    pub fn is_cleared(&self) -> bool {
        self.tiles.iter().all(|t| t.removed)
    }

    /// Soft-delete the given cells. Idempotent: re-removing is a no-op, since
    /// drag resolution, the bomb and the wipe all funnel through here.
    pub fn mark_removed(&mut self, coords: &[Coord]) {
        for &c in coords {
            if let Some(t) = self.tile_mut(c.row, c.col) {
                t.removed = true;
                t.selected = false;
                t.hinted = false;
            }
        }
    }

    /// Replace the whole board with freshly dealt values, resetting all
    /// flags and offsets. Construction and the gravity engine only.
    pub fn replace_all(&mut self, values: &[u8]) {
        for (i, t) in self.tiles.iter_mut().enumerate() {
            *t = Tile::new(values.get(i).copied().unwrap_or(1));
        }
    }

    /// Write a permutation of the surviving values back onto the surviving
    /// tiles in scan order. Shuffle only; removed tiles keep their identity.
    pub fn assign_values(&mut self, values: &[u8]) {
        let mut it = values.iter();
        for t in self.tiles.iter_mut().filter(|t| !t.removed) {
            if let Some(&v) = it.next() {
                t.value = v;
            }
        }
    }

    /// Surviving values in scan order (the shuffle's input).
    pub fn live_values(&self) -> Vec<u8> {
        self.tiles
            .iter()
            .filter(|t| !t.removed)
            .map(|t| t.value)
            .collect()
    }

    /// Advance every fall offset toward 0. Runs during Countdown, Active and
    /// Paused alike; it is animation, not game time.
    pub fn settle(&mut self, dt_secs: f32) {
        let step = FALL_ROWS_PER_SEC * dt_secs;
        for t in &mut self.tiles {
            if t.fall_offset < 0.0 {
                t.fall_offset = (t.fall_offset + step).min(0.0);
            }
        }
    }

    /// Force every offset to rest (no-animation mode).
    pub fn settle_all(&mut self) {
        for t in &mut self.tiles {
            t.fall_offset = 0.0;
        }
    }

    pub fn clear_selection(&mut self) {
        for t in &mut self.tiles {
            t.selected = false;
        }
    }

    pub fn clear_hints(&mut self) {
        for t in &mut self.tiles {
            t.hinted = false;
        }
    }

    /// Replace the selection with `coords`, skipping anything not selectable.
    pub fn select_only(&mut self, coords: &[Coord]) {
        self.clear_selection();
        for &c in coords {
            if let Some(t) = self.tile_mut(c.row, c.col) {
                if t.selectable() {
                    t.selected = true;
                }
            }
        }
    }

    pub fn set_hinted(&mut self, coords: &[Coord]) {
        for &c in coords {
            if let Some(t) = self.tile_mut(c.row, c.col) {
                if !t.removed {
                    t.hinted = true;
                }
            }
        }
    }

    /// Currently selected, surviving, settled cells with their values.
    pub fn selection(&self) -> Vec<(Coord, u8)> {
        self.tiles()
            .filter(|(_, t)| t.selected && t.selectable())
            .map(|(c, t)| (c, t.value))
            .collect()
    }
}
