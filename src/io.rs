//! Filesystem collaborators: native file dialogs and thumbnail loading.
//!
//! The core never aborts on a bad image — a thumbnail that fails to decode
//! yields `None` and the view draws a placeholder instead.

use std::path::{Path, PathBuf};

use egui::ColorImage;
use rfd::FileDialog;

use crate::log_warn;
use crate::project::PROJECT_EXTENSION;

/// Image extensions offered by the import dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Native dialog wrapper.  Remembers the current project path so "Save"
/// can skip the dialog after the first "Save As".
#[derive(Default)]
pub struct FileHandler {
    /// Current project path (None if never saved).
    pub current_path: Option<PathBuf>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_current_path(&self) -> bool {
        self.current_path.is_some()
    }

    /// Multi-select image picker, starting at the Desktop.
    pub fn pick_import_images(&self) -> Vec<PathBuf> {
        let mut dialog = FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(desktop) = desktop_dir() {
            dialog = dialog.set_directory(desktop);
        }
        dialog.pick_files().unwrap_or_default()
    }

    /// Pick a path to save the project to.
    pub fn pick_save_path(&self) -> Option<PathBuf> {
        FileDialog::new()
            .add_filter("Tiler Project", &[PROJECT_EXTENSION])
            .set_file_name("untitled.tiler")
            .save_file()
    }

    /// Pick an existing project file to open.
    pub fn pick_open_path(&self) -> Option<PathBuf> {
        FileDialog::new()
            .add_filter("Tiler Project", &[PROJECT_EXTENSION])
            .pick_file()
    }
}

fn desktop_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join("Desktop"))
}

/// Load an image and scale it down to at most `target_edge` pixels on its
/// longest side, as an egui-ready `ColorImage`.
///
/// Returns `None` on any decode failure; the caller keeps working with a
/// placeholder.
pub fn load_thumbnail(path: &Path, target_edge: u32) -> Option<ColorImage> {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            log_warn!("failed to load {}: {}", path.display(), e);
            return None;
        }
    };
    let thumb = img.thumbnail(target_edge, target_edge).into_rgba8();
    let size = [thumb.width() as usize, thumb.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, thumb.as_raw()))
}
