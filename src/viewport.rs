//! Pan/zoom viewport and the screen ↔ grid coordinate transform.
//!
//! Everything in here is pure arithmetic: the functions take a
//! [`ViewportState`] and return values, they never touch the occupancy map
//! or any widget state.  Bounds checking is deliberately *not* done here —
//! `screen_to_grid` happily returns negative or out-of-range cells and the
//! caller decides what in-bounds means.

use egui::{Pos2, Vec2};

use crate::grid::GridCell;

/// Logical edge length of one grid cell, in unzoomed screen units.
pub const CELL_SIZE: f32 = 60.0;

/// Zoom clamp range.
pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 3.0;

/// Pan offset + zoom scale defining how grid space maps to screen space.
///
/// Saved and restored as a unit with the grid dimensions; never persisted
/// partially.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub zoom_scale: f32,
    /// Screen-space pixel offset of the grid origin.
    pub pan_offset: Vec2,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom_scale: 1.0,
            pan_offset: Vec2::ZERO,
        }
    }
}

impl ViewportState {
    pub fn new(zoom_scale: f32, pan_offset: Vec2) -> Self {
        Self {
            zoom_scale: zoom_scale.clamp(MIN_ZOOM, MAX_ZOOM),
            pan_offset,
        }
    }

    /// Translate the viewport by a screen-space delta (middle-drag panning).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_offset += delta;
    }
}

/// Map a screen-space point to the grid cell under it.
pub fn screen_to_grid(screen: Pos2, viewport: &ViewportState) -> GridCell {
    let x = (screen.x - viewport.pan_offset.x) / viewport.zoom_scale / CELL_SIZE;
    let y = (screen.y - viewport.pan_offset.y) / viewport.zoom_scale / CELL_SIZE;
    GridCell::new(x.floor() as i32, y.floor() as i32)
}

/// Map a grid cell to the screen-space position of its top-left corner.
pub fn grid_to_screen(cell: GridCell, viewport: &ViewportState) -> Pos2 {
    Pos2::new(
        cell.x as f32 * CELL_SIZE * viewport.zoom_scale + viewport.pan_offset.x,
        cell.y as f32 * CELL_SIZE * viewport.zoom_scale + viewport.pan_offset.y,
    )
}

/// On-screen edge length of one cell at the current zoom.
pub fn cell_screen_size(viewport: &ViewportState) -> f32 {
    CELL_SIZE * viewport.zoom_scale
}

/// Zoom toward a screen-space anchor point.
///
/// The new pan offset is chosen so the anchor maps to the same grid
/// location before and after the zoom change: the cell under the cursor
/// does not jump when the user scrolls the wheel.
pub fn zoom_at(anchor: Pos2, factor: f32, viewport: &ViewportState) -> ViewportState {
    let old_zoom = viewport.zoom_scale;
    let new_zoom = (old_zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    let ratio = new_zoom / old_zoom;
    let pan = viewport.pan_offset;
    let new_pan = Vec2::new(
        anchor.x - (anchor.x - pan.x) * ratio,
        anchor.y - (anchor.y - pan.y) * ratio,
    );
    ViewportState {
        zoom_scale: new_zoom,
        pan_offset: new_pan,
    }
}
