//! The bank panel: wrapped thumbnail strip of images not yet placed on
//! the grid.  Doubles as the drop target for tiles dragged off the grid.

use std::path::PathBuf;

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use crate::board::BoardState;
use crate::components::large_view::LargeView;
use crate::components::thumbnails::ThumbnailStore;

/// Thumbnail edge in the bank strip.
pub const THUMBNAIL_WIDTH: f32 = 85.0;
const SELECTION_BORDER_COLOR: Color32 = Color32::from_rgb(74, 144, 226);
const MARQUEE_COLOR: Color32 = Color32::from_rgb(74, 144, 226);

#[derive(Default)]
pub struct BankPanel {
    marquee_start: Option<Pos2>,
}

impl BankPanel {
    /// Render the bank strip and feed its pointer events to the board.
    /// Right-clicking a thumbnail opens the large preview.
    /// Returns the screen rect the panel occupied this frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        board: &mut BoardState,
        thumbs: &mut ThumbnailStore,
        large_view: &mut LargeView,
    ) -> Rect {
        let panel_rect = ui.max_rect();
        let pressed = ui.input(|i| i.pointer.primary_pressed());
        let preview_clicked = ui.input(|i| i.pointer.secondary_clicked());
        let pointer = ui.input(|i| i.pointer.hover_pos());
        let mut pressed_on_thumb = false;
        let mut candidates: Vec<(PathBuf, Rect)> = Vec::new();

        egui::ScrollArea::vertical()
            .id_source("bank_scroll")
            .show(ui, |ui| {
                ui.set_min_size(ui.available_size());
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::splat(5.0);
                    let paths: Vec<PathBuf> = board.bank.iter().cloned().collect();
                    for path in paths {
                        let (rect, response) = ui.allocate_exact_size(
                            Vec2::splat(THUMBNAIL_WIDTH),
                            Sense::hover(),
                        );
                        candidates.push((path.clone(), rect));
                        self.paint_thumb(ui, board, thumbs, &path, rect);
                        if pressed
                            && response.hovered()
                            && let Some(pos) = pointer
                        {
                            board.press_bank(&path, pos);
                            pressed_on_thumb = true;
                        }
                        if preview_clicked && response.hovered() {
                            large_view.open(path.clone());
                        }
                    }
                });
            });

        // Marquee on empty panel space.
        if pressed
            && !pressed_on_thumb
            && !board.is_dragging()
            && let Some(pos) = pointer
            && panel_rect.contains(pos)
        {
            self.marquee_start = Some(pos);
        }
        if ui.input(|i| i.pointer.primary_released())
            && let Some(start) = self.marquee_start.take()
            && let Some(pos) = pointer
        {
            let rect = Rect::from_two_pos(start, pos);
            let additive = ui.input(|i| i.modifiers.shift);
            board.marquee_bank(rect, &candidates, additive);
        }
        if let Some(start) = self.marquee_start
            && let Some(pos) = pointer
        {
            ui.painter().rect_stroke(
                Rect::from_two_pos(start, pos),
                0.0,
                Stroke::new(1.0, MARQUEE_COLOR),
            );
        }

        panel_rect
    }

    fn paint_thumb(
        &self,
        ui: &egui::Ui,
        board: &BoardState,
        thumbs: &mut ThumbnailStore,
        path: &std::path::Path,
        rect: Rect,
    ) {
        let painter = ui.painter();
        let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
        match thumbs.get(ui.ctx(), path, THUMBNAIL_WIDTH as u32) {
            Some(texture) => painter.image(texture.id(), rect, uv, Color32::WHITE),
            None => {
                painter.rect_filled(rect, 0.0, Color32::from_gray(60));
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    name,
                    FontId::proportional(9.0),
                    Color32::LIGHT_GRAY,
                );
            }
        }
        if board.bank_selection.contains(&path.to_path_buf()) {
            painter.rect_stroke(rect, 0.0, Stroke::new(3.0, SELECTION_BORDER_COLOR));
        }
    }
}
