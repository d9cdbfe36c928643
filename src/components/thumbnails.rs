//! Lazy thumbnail texture cache, keyed by image path and target size so
//! the bank strip, the grid tiles and the large preview each get a texture
//! scaled for their own use.
//!
//! Decode failures are cached as `None` so a broken file is attempted
//! once and then rendered as a placeholder forever after.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eframe::egui;
use egui::{TextureHandle, TextureOptions};

use crate::io;

#[derive(Default)]
pub struct ThumbnailStore {
    textures: HashMap<(PathBuf, u32), Option<TextureHandle>>,
}

impl ThumbnailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (or decode and cache) the thumbnail texture for `path` at
    /// `target_edge` pixels on its longest side.
    pub fn get(
        &mut self,
        ctx: &egui::Context,
        path: &Path,
        target_edge: u32,
    ) -> Option<TextureHandle> {
        let key = (path.to_path_buf(), target_edge);
        if !self.textures.contains_key(&key) {
            let texture = io::load_thumbnail(path, target_edge).map(|img| {
                ctx.load_texture(
                    format!("{}@{}", path.display(), target_edge),
                    img,
                    TextureOptions::LINEAR,
                )
            });
            self.textures.insert(key.clone(), texture);
        }
        self.textures.get(&key).and_then(|t| t.clone())
    }

    /// Drop cached entries for paths that no longer appear anywhere.
    pub fn retain_paths(&mut self, keep: impl Fn(&Path) -> bool) {
        self.textures.retain(|(path, _), _| keep(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cache_is_keyed_by_target_edge() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img.png");
        image::RgbaImage::new(32, 32).save(&path).unwrap();

        let ctx = egui::Context::default();
        let mut store = ThumbnailStore::new();
        let small = store.get(&ctx, &path, 8).unwrap();
        let large = store.get(&ctx, &path, 16).unwrap();
        assert_eq!(small.size(), [8, 8]);
        assert_eq!(large.size(), [16, 16]);
        // Asking again returns the cached texture for that size.
        assert_eq!(store.get(&ctx, &path, 8).unwrap().id(), small.id());
    }

    #[test]
    fn decode_failure_is_cached_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let ctx = egui::Context::default();
        let mut store = ThumbnailStore::new();
        assert!(store.get(&ctx, &path, 8).is_none());
        assert!(store.get(&ctx, &path, 8).is_none());
    }
}
