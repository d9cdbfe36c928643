//! Enlarged preview of a single bank image, opened by right-clicking its
//! thumbnail in the bank strip.

use std::path::PathBuf;

use eframe::egui;

use crate::components::thumbnails::ThumbnailStore;

/// Longest edge of the enlarged preview, in pixels.
pub const LARGE_VIEW_WIDTH: u32 = 800;

#[derive(Default)]
pub struct LargeView {
    path: Option<PathBuf>,
}

impl LargeView {
    /// Open (or retarget) the preview window on `path`.
    pub fn open(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn close(&mut self) {
        self.path = None;
    }

    pub fn is_open(&self) -> bool {
        self.path.is_some()
    }

    /// Render the preview window if one is open.  A decode failure shows a
    /// text placeholder instead of an image; the window still works.
    pub fn show(&mut self, ctx: &egui::Context, thumbs: &mut ThumbnailStore) {
        let Some(path) = self.path.clone() else {
            return;
        };
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Preview".to_string());
        let mut open = true;
        egui::Window::new(title)
            .id(egui::Id::new("large_view"))
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| match thumbs.get(ctx, &path, LARGE_VIEW_WIDTH) {
                Some(texture) => {
                    ui.image((texture.id(), texture.size_vec2()));
                }
                None => {
                    ui.label(format!("Could not load {}", path.display()));
                }
            });
        if !open {
            self.path = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_show_close() {
        let mut view = LargeView::default();
        assert!(!view.is_open());
        view.open(PathBuf::from("missing.png"));
        assert!(view.is_open());

        let ctx = egui::Context::default();
        let mut thumbs = ThumbnailStore::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| view.show(ctx, &mut thumbs));
        // Still open after a frame; the decode failure only swaps the
        // image for a placeholder label.
        assert!(view.is_open());

        view.close();
        assert!(!view.is_open());
        let _ = ctx.run(egui::RawInput::default(), |ctx| view.show(ctx, &mut thumbs));
        assert!(!view.is_open());
    }

    #[test]
    fn reopening_retargets_the_window() {
        let mut view = LargeView::default();
        view.open(PathBuf::from("a.png"));
        view.open(PathBuf::from("b.png"));
        assert!(view.is_open());
    }
}
