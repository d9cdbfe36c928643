//! Grid cells, grid dimensions, placed tiles and the occupancy map.
//!
//! The occupancy map is the authoritative record of which cell holds which
//! tile.  It enforces the two placement invariants (in-bounds, at most one
//! tile per cell) and nothing else — selection bookkeeping belongs to the
//! caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default grid dimensions.
pub const DEFAULT_GRID_ROWS: u32 = 20;
pub const DEFAULT_GRID_COLUMNS: u32 = 20;

/// User-adjustable dimension range.
pub const MIN_GRID_DIM: u32 = 1;
pub const MAX_GRID_DIM: u32 = 100;

/// One addressable (column, row) slot in the placement grid, 0-indexed.
///
/// Coordinates are signed because the coordinate transform can resolve a
/// pointer position to a cell left of / above the grid; bounds are checked
/// by [`GridConfig::contains`], not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sort key for deterministic traversal: row first, then column.
    pub const fn row_major_key(self) -> (i32, i32) {
        (self.y, self.x)
    }
}

// Ordered by (row, column) so BTreeMap iteration is row-major.
impl Ord for GridCell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row_major_key().cmp(&other.row_major_key())
    }
}

impl PartialOrd for GridCell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Current grid dimensions (rows × columns).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub rows: u32,
    pub columns: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            columns: DEFAULT_GRID_COLUMNS,
        }
    }
}

impl GridConfig {
    /// Build a config with both dimensions clamped to the supported range.
    pub fn new(rows: u32, columns: u32) -> Self {
        Self {
            rows: rows.clamp(MIN_GRID_DIM, MAX_GRID_DIM),
            columns: columns.clamp(MIN_GRID_DIM, MAX_GRID_DIM),
        }
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as u32) < self.columns
            && (cell.y as u32) < self.rows
    }
}

/// One image occupying exactly one grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedTile {
    /// Path to the image content.
    pub image_ref: PathBuf,
    /// Bank index the tile was drawn from, used to restore insertion order
    /// if the tile is returned to the bank.  `None` for tiles that never
    /// came from the bank (e.g. loaded from an old project).
    pub origin_bank_index: Option<usize>,
    pub selected: bool,
}

impl PlacedTile {
    pub fn new(image_ref: PathBuf, origin_bank_index: Option<usize>) -> Self {
        Self {
            image_ref,
            origin_bank_index,
            selected: false,
        }
    }
}

/// Why a placement was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceError {
    /// Target cell outside the current grid dimensions.
    OutOfBounds,
    /// Target cell already holds a tile.
    CellOccupied,
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceError::OutOfBounds => write!(f, "cell is outside the grid"),
            PlaceError::CellOccupied => write!(f, "cell is already occupied"),
        }
    }
}

/// Sparse cell → tile mapping plus the grid dimensions it is bounded by.
///
/// Keys iterate in row-major order because [`GridCell`]'s `Ord` sorts by
/// `(row, column)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OccupancyMap {
    config: GridConfig,
    tiles: BTreeMap<GridCell, PlacedTile>,
}

impl OccupancyMap {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            tiles: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.tiles.contains_key(&cell)
    }

    pub fn get(&self, cell: GridCell) -> Option<&PlacedTile> {
        self.tiles.get(&cell)
    }

    pub fn get_mut(&mut self, cell: GridCell) -> Option<&mut PlacedTile> {
        self.tiles.get_mut(&cell)
    }

    /// Insert a tile at `cell`, rejecting out-of-bounds and occupied targets.
    pub fn place(&mut self, cell: GridCell, tile: PlacedTile) -> Result<(), PlaceError> {
        if !self.config.contains(cell) {
            return Err(PlaceError::OutOfBounds);
        }
        if self.tiles.contains_key(&cell) {
            return Err(PlaceError::CellOccupied);
        }
        self.tiles.insert(cell, tile);
        Ok(())
    }

    /// Remove and return the tile at `cell`, if any.  The caller is
    /// responsible for the matching grid-selection update.
    pub fn remove(&mut self, cell: GridCell) -> Option<PlacedTile> {
        self.tiles.remove(&cell)
    }

    /// Change the grid dimensions, evicting every tile whose cell falls
    /// outside the new bounds.  Evicted tiles are returned in row-major
    /// order so the caller can update selection and bank state.
    pub fn resize(&mut self, rows: u32, columns: u32) -> Vec<(GridCell, PlacedTile)> {
        self.config = GridConfig::new(rows, columns);
        let config = self.config;
        let evicted_cells: Vec<GridCell> = self
            .tiles
            .keys()
            .copied()
            .filter(|cell| !config.contains(*cell))
            .collect();
        evicted_cells
            .into_iter()
            .filter_map(|cell| self.tiles.remove(&cell).map(|tile| (cell, tile)))
            .collect()
    }

    /// Remove every tile referencing `path`.  Returns the removed entries.
    pub fn remove_by_path(&mut self, path: &Path) -> Vec<(GridCell, PlacedTile)> {
        let cells: Vec<GridCell> = self
            .tiles
            .iter()
            .filter(|(_, tile)| tile.image_ref == path)
            .map(|(cell, _)| *cell)
            .collect();
        cells
            .into_iter()
            .filter_map(|cell| self.tiles.remove(&cell).map(|tile| (cell, tile)))
            .collect()
    }

    /// Remove every tile.  Returns the removed entries in row-major order.
    pub fn clear_all(&mut self) -> Vec<(GridCell, PlacedTile)> {
        std::mem::take(&mut self.tiles).into_iter().collect()
    }

    /// True if any placed tile references `path`.
    pub fn contains_path(&self, path: &Path) -> bool {
        self.tiles.values().any(|tile| tile.image_ref == path)
    }

    /// All occupied cells ordered by `(row, column)`.  This is the ordering
    /// used for range selection and multi-drag payload construction.
    pub fn positions_row_major(&self) -> Vec<GridCell> {
        self.tiles.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCell, &PlacedTile)> {
        self.tiles.iter().map(|(cell, tile)| (*cell, tile))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GridCell, &mut PlacedTile)> {
        self.tiles.iter_mut().map(|(cell, tile)| (*cell, tile))
    }
}
