//! Application shell: owns the board, the two views and the file handler,
//! and routes frame-level input (pointer releases, keys) to the board.

use std::path::PathBuf;

use eframe::egui;
use egui::{Align2, Color32, FontId, Rect, Stroke, Vec2};

use crate::board::{BoardState, DropOutcome};
use crate::components::bank_panel::BankPanel;
use crate::components::grid_view::GridView;
use crate::components::large_view::LargeView;
use crate::components::thumbnails::ThumbnailStore;
use crate::io::FileHandler;
use crate::{log_err, log_info, logger, project};

const BANK_PANEL_HEIGHT: f32 = 110.0;

pub struct TilerApp {
    board: BoardState,
    grid_view: GridView,
    bank_panel: BankPanel,
    large_view: LargeView,
    thumbnails: ThumbnailStore,
    file_handler: FileHandler,

    /// Pending grid dimensions edited in the toolbar; applied on "Apply".
    pending_rows: u32,
    pending_columns: u32,

    /// One-line feedback shown in the toolbar (save errors, load warnings).
    status: Option<String>,

    // Screen rects of the two drop regions, refreshed every frame so the
    // release router knows where the pointer let go.
    grid_rect: Rect,
    bank_rect: Rect,

    /// Pan to the grid area origin once the first layout is known.
    initial_pan_done: bool,
}

impl TilerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let board = BoardState::new();
        let config = board.occupancy.config();
        let (pending_rows, pending_columns) = (config.rows, config.columns);
        Self {
            board,
            grid_view: GridView::default(),
            bank_panel: BankPanel::default(),
            large_view: LargeView::default(),
            thumbnails: ThumbnailStore::new(),
            file_handler: FileHandler::new(),
            pending_rows,
            pending_columns,
            status: None,
            grid_rect: Rect::NOTHING,
            bank_rect: Rect::NOTHING,
            initial_pan_done: false,
        }
    }

    // ---- file actions -------------------------------------------------------

    fn handle_import(&mut self) {
        let paths = self.file_handler.pick_import_images();
        if paths.is_empty() {
            return;
        }
        let added = self.board.import_images(paths);
        self.status = Some(format!("Imported {} image(s)", added));
    }

    fn handle_save(&mut self) {
        let target = match self.file_handler.current_path.clone() {
            Some(path) => path,
            None => match self.file_handler.pick_save_path() {
                Some(path) => path,
                None => return,
            },
        };
        match project::save_project(&self.board, &target) {
            Ok(saved) => {
                self.status = Some(format!("Saved {}", saved.display()));
                self.file_handler.current_path = Some(saved);
            }
            Err(e) => {
                log_err!("save failed: {}", e);
                self.status = Some(format!("Save failed: {}{}", e, log_hint()));
            }
        }
    }

    fn handle_open(&mut self) {
        let Some(path) = self.file_handler.pick_open_path() else {
            return;
        };
        match project::load_project(&path) {
            Ok(loaded) => {
                self.board = loaded.board;
                let config = self.board.occupancy.config();
                self.pending_rows = config.rows;
                self.pending_columns = config.columns;
                self.file_handler.current_path = Some(path.clone());
                self.prune_thumbnails();
                self.status = if loaded.missing.is_empty() {
                    Some(format!("Opened {}", path.display()))
                } else {
                    Some(format!(
                        "Opened {} ({} missing image(s) skipped)",
                        path.display(),
                        loaded.missing.len()
                    ))
                };
                log_info!("opened project {}", path.display());
            }
            Err(e) => {
                log_err!("open failed: {}", e);
                self.status = Some(format!("Open failed: {}{}", e, log_hint()));
            }
        }
    }

    /// Drop cached thumbnails for paths no longer banked or placed.
    fn prune_thumbnails(&mut self) {
        let bank: Vec<PathBuf> = self.board.bank.iter().cloned().collect();
        let placed: Vec<PathBuf> = self
            .board
            .occupancy
            .iter()
            .map(|(_, tile)| tile.image_ref.clone())
            .collect();
        self.thumbnails
            .retain_paths(|p| bank.iter().any(|b| b == p) || placed.iter().any(|t| t == p));
    }

    // ---- frame-level input --------------------------------------------------

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.board.release_outside();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.board.delete_selected_grid();
        }
    }

    /// Route the primary-button release to whichever region the pointer is
    /// over.  The views themselves only handle presses and marquees.
    fn route_release(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.pointer.primary_down())
            && let Some(pos) = ctx.input(|i| i.pointer.hover_pos())
        {
            self.board.pointer_moved(pos);
        }
        if !ctx.input(|i| i.pointer.primary_released()) {
            return;
        }
        let shift = ctx.input(|i| i.modifiers.shift);
        let pos = ctx.input(|i| i.pointer.hover_pos());
        let outcome = match pos {
            // In-flight drops over the grid travel through the encoded
            // payload channel; an armed press falls through as a click.
            Some(p) if self.grid_rect.contains(p) => match self.board.drag_payload_text() {
                Some(text) => self.board.drop_text_on_grid(&text, p),
                None => self.board.release_on_grid(p, shift),
            },
            Some(p) if self.bank_rect.contains(p) => self.board.release_on_bank(shift),
            _ => self.board.release_outside(),
        };
        if outcome == DropOutcome::Committed {
            self.prune_thumbnails();
        }
    }

    /// Small ghost following the pointer while a drag is in flight.
    fn paint_drag_ghost(&self, ctx: &egui::Context) {
        let Some(session) = self.board.drag_session() else {
            return;
        };
        let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) else {
            return;
        };
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Tooltip,
            egui::Id::new("drag_ghost"),
        ));
        let rect = Rect::from_min_size(pos + Vec2::new(12.0, 12.0), Vec2::new(46.0, 20.0));
        painter.rect_filled(rect, 3.0, Color32::from_rgb(74, 144, 226));
        painter.rect_stroke(rect, 3.0, Stroke::new(1.0, Color32::WHITE));
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            format!("{}", session.items.len()),
            FontId::proportional(12.0),
            Color32::WHITE,
        );
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Import Images").clicked() {
                    self.handle_import();
                }
                if ui.button("Save Project").clicked() {
                    self.handle_save();
                }
                if ui.button("Load Project").clicked() {
                    self.handle_open();
                }
                ui.separator();
                if ui.button("Clear Grid").clicked() {
                    self.board.clear_grid();
                }
                ui.separator();
                ui.label("Rows:");
                ui.add(egui::DragValue::new(&mut self.pending_rows).clamp_range(1..=100));
                ui.label("Cols:");
                ui.add(egui::DragValue::new(&mut self.pending_columns).clamp_range(1..=100));
                if ui.button("Apply").clicked() {
                    let evicted = self
                        .board
                        .set_grid_dimensions(self.pending_rows, self.pending_columns);
                    if evicted > 0 {
                        self.status = Some(format!("Resize removed {} tile(s)", evicted));
                    }
                }
                ui.separator();
                let select_label = if self.board.all_bank_selected() {
                    "Deselect All"
                } else {
                    "Select All"
                };
                if ui.button(select_label).clicked() {
                    self.board.toggle_select_all_bank();
                }
                if !self.board.bank_selection.is_empty()
                    && ui.button("Delete Selected").clicked()
                {
                    self.board.delete_selected_bank();
                    self.prune_thumbnails();
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status.clone());
                }
            });
        });
    }
}

impl eframe::App for TilerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Tiles retired during the previous pass are dropped first thing.
        self.board.run_deferred_cleanup();

        let title = match &self.file_handler.current_path {
            Some(path) => format!(
                "Tiler - {}",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ),
            None => "Tiler".to_string(),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));

        self.handle_keys(ctx);
        self.show_toolbar(ctx);

        egui::TopBottomPanel::bottom("bank")
            .exact_height(BANK_PANEL_HEIGHT)
            .show(ctx, |ui| {
                self.bank_rect = self.bank_panel.show(
                    ui,
                    &mut self.board,
                    &mut self.thumbnails,
                    &mut self.large_view,
                );
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.grid_rect = self
                .grid_view
                .show(ui, &mut self.board, &mut self.thumbnails);
        });

        if !self.initial_pan_done && self.grid_rect.is_positive() {
            // Put cell (0,0) at the top-left of the grid area, inset a bit.
            self.board.viewport.pan_offset =
                self.grid_rect.min.to_vec2() + Vec2::splat(10.0);
            self.initial_pan_done = true;
        }

        self.route_release(ctx);
        self.paint_drag_ghost(ctx);
        self.large_view.show(ctx, &mut self.thumbnails);

        if self.board.is_dragging() || self.board.has_deferred_cleanup() {
            ctx.request_repaint();
        }
    }
}

/// Points the user at the session log when an operation fails.
fn log_hint() -> String {
    match logger::log_path() {
        Some(path) => format!("; details in {}", path.display()),
        None => String::new(),
    }
}
