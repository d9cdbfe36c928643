//! The grid canvas view: draws grid lines, placed tiles, the drop-target
//! highlight and the marquee, and translates pointer input over the grid
//! into board calls.
//!
//! All placement logic lives in [`crate::board`]; this view only decides
//! *which* board method a given egui event maps to.

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use crate::board::BoardState;
use crate::components::thumbnails::ThumbnailStore;
use crate::viewport::{self, CELL_SIZE};

const GRID_LINE_COLOR: Color32 = Color32::from_rgb(220, 220, 220);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(74, 144, 226);
const HIGHLIGHT_FILL: Color32 = Color32::from_rgba_premultiplied(9, 17, 27, 30);
const TILE_SELECTION_COLOR: Color32 = Color32::from_rgb(46, 123, 214);
const MARQUEE_COLOR: Color32 = Color32::from_rgb(74, 144, 226);
const TILE_THUMB_EDGE: u32 = CELL_SIZE as u32;

#[derive(Default)]
pub struct GridView {
    /// Anchor of an in-progress rubber-band selection.
    marquee_start: Option<Pos2>,
}

impl GridView {
    /// Render the grid and feed its pointer events to the board.
    /// Returns the screen rect the view occupied this frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        board: &mut BoardState,
        thumbs: &mut ThumbnailStore,
    ) -> Rect {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let view_rect = response.rect;
        let painter = painter.with_clip_rect(view_rect);

        // -- navigation ---------------------------------------------------
        if response.dragged_by(egui::PointerButton::Middle) {
            board.pan_by(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll.abs() > 0.1
                && let Some(pos) = ui.input(|i| i.pointer.hover_pos())
            {
                let factor = if scroll > 0.0 { 1.1 } else { 1.0 / 1.1 };
                board.zoom_at(pos, factor);
            }
        }

        // -- press: arm a tile drag or start a marquee --------------------
        let shift = ui.input(|i| i.modifiers.shift);
        if response.hovered()
            && ui.input(|i| i.pointer.primary_pressed())
            && let Some(pos) = ui.input(|i| i.pointer.hover_pos())
        {
            let cell = viewport::screen_to_grid(pos, &board.viewport);
            if board.occupancy.is_occupied(cell) {
                board.press_grid(cell, pos);
            } else if !board.is_dragging() {
                self.marquee_start = Some(pos);
            }
        }

        // -- marquee completion -------------------------------------------
        if ui.input(|i| i.pointer.primary_released())
            && let Some(start) = self.marquee_start.take()
            && let Some(pos) = ui.input(|i| i.pointer.hover_pos())
        {
            let rect = Rect::from_two_pos(start, pos);
            board.marquee_grid(rect, shift);
        }
        if board.is_dragging() && !response.hovered() {
            board.clear_candidate();
        }

        self.paint(&painter, view_rect, board, thumbs, ui.ctx());
        view_rect
    }

    fn paint(
        &self,
        painter: &egui::Painter,
        view_rect: Rect,
        board: &mut BoardState,
        thumbs: &mut ThumbnailStore,
        ctx: &egui::Context,
    ) {
        let config = board.occupancy.config();
        let cell_px = viewport::cell_screen_size(&board.viewport);
        let origin = viewport::grid_to_screen(crate::grid::GridCell::new(0, 0), &board.viewport);
        let grid_w = config.columns as f32 * cell_px;
        let grid_h = config.rows as f32 * cell_px;

        painter.rect_filled(
            Rect::from_min_size(origin, Vec2::new(grid_w, grid_h)),
            0.0,
            Color32::WHITE,
        );

        // Grid lines over the configured bounds.
        let stroke = Stroke::new(1.0, GRID_LINE_COLOR);
        for col in 0..=config.columns {
            let x = origin.x + col as f32 * cell_px;
            painter.line_segment(
                [Pos2::new(x, origin.y), Pos2::new(x, origin.y + grid_h)],
                stroke,
            );
        }
        for row in 0..=config.rows {
            let y = origin.y + row as f32 * cell_px;
            painter.line_segment(
                [Pos2::new(origin.x, y), Pos2::new(origin.x + grid_w, y)],
                stroke,
            );
        }

        // Placed tiles.
        let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
        let tiles: Vec<(crate::grid::GridCell, std::path::PathBuf, bool)> = board
            .occupancy
            .iter()
            .map(|(cell, tile)| (cell, tile.image_ref.clone(), tile.selected))
            .collect();
        for (cell, path, selected) in tiles {
            let min = viewport::grid_to_screen(cell, &board.viewport);
            let rect = Rect::from_min_size(min, Vec2::splat(cell_px));
            if !rect.intersects(view_rect) {
                continue;
            }
            match thumbs.get(ctx, &path, TILE_THUMB_EDGE) {
                Some(texture) => painter.image(texture.id(), rect, uv, Color32::WHITE),
                None => {
                    painter.rect_filled(rect, 0.0, Color32::from_gray(200));
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        name,
                        FontId::proportional(9.0),
                        Color32::DARK_GRAY,
                    );
                }
            }
            if selected {
                painter.rect_stroke(rect, 0.0, Stroke::new(3.0, TILE_SELECTION_COLOR));
            }
        }

        // Drop-target highlight (empty when the target is invalid).
        for cell in board.highlight_cells() {
            let min = viewport::grid_to_screen(cell, &board.viewport);
            let rect = Rect::from_min_size(min, Vec2::splat(cell_px));
            painter.rect_filled(rect, 0.0, HIGHLIGHT_FILL);
            painter.rect_stroke(rect, 0.0, Stroke::new(3.0, HIGHLIGHT_COLOR));
        }

        // Rubber band.
        if let Some(start) = self.marquee_start
            && let Some(pos) = ctx.input(|i| i.pointer.hover_pos())
        {
            let rect = Rect::from_two_pos(start, pos);
            painter.rect_stroke(rect, 0.0, Stroke::new(1.0, MARQUEE_COLOR));
        }
    }
}
