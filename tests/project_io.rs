//! End-to-end project persistence: build a board, save it to a real file,
//! load it back and compare.  Image references point at real files in a
//! temp directory so the existence check during load is exercised for both
//! the present and the missing case.

use std::fs;
use std::path::{Path, PathBuf};

use egui::Pos2;
use tempfile::TempDir;
use tiler::board::BoardState;
use tiler::grid::GridCell;
use tiler::project;

/// Create an empty file standing in for an image.  Loads only check
/// existence; decoding is deferred to the renderer.
fn touch_image(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"").unwrap();
    path
}

fn cell_center(cell: GridCell) -> Pos2 {
    Pos2::new(cell.x as f32 * 60.0 + 30.0, cell.y as f32 * 60.0 + 30.0)
}

fn place(board: &mut BoardState, path: &Path, cell: GridCell) {
    board.press_bank(path, Pos2::new(0.0, 900.0));
    board.pointer_moved(cell_center(cell));
    board.release_on_grid(cell_center(cell), false);
}

#[test]
fn save_and_load_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let a = touch_image(&dir, "a.png");
    let b = touch_image(&dir, "b.png");
    let c = touch_image(&dir, "c.png");

    let mut board = BoardState::new();
    board.import_images(vec![a.clone(), b.clone(), c.clone()]);
    place(&mut board, &a, GridCell::new(3, 4));
    place(&mut board, &b, GridCell::new(7, 1));
    board.click_grid(GridCell::new(3, 4), false);
    board.zoom_at(Pos2::new(120.0, 80.0), 1.4);
    board.pan_by(egui::Vec2::new(-25.0, 13.0));

    // No extension on the requested path; save appends it.
    let requested = dir.path().join("layout");
    let saved = project::save_project(&board, &requested).unwrap();
    assert_eq!(saved, dir.path().join("layout.tiler"));
    assert!(saved.exists());

    let loaded = project::load_project(&saved).unwrap();
    assert!(loaded.missing.is_empty());

    let restored = loaded.board;
    assert_eq!(restored.occupancy.len(), 2);
    assert_eq!(restored.occupancy.get(GridCell::new(3, 4)).unwrap().image_ref, a);
    assert_eq!(restored.occupancy.get(GridCell::new(7, 1)).unwrap().image_ref, b);
    assert_eq!(restored.bank.paths(), &[c.clone()]);
    assert!(restored.grid_selection.contains(&GridCell::new(3, 4)));
    assert_eq!(restored.grid_selection.len(), 1);
    assert!(restored.occupancy.get(GridCell::new(3, 4)).unwrap().selected);
    assert_eq!(restored.viewport, board.viewport);

    // No temp file left behind.
    assert!(!dir.path().join("layout.tiler.tmp").exists());
}

#[test]
fn load_skips_images_deleted_since_save() {
    let dir = TempDir::new().unwrap();
    let a = touch_image(&dir, "a.png");
    let b = touch_image(&dir, "b.png");

    let mut board = BoardState::new();
    board.import_images(vec![a.clone(), b.clone()]);
    place(&mut board, &a, GridCell::new(0, 0));

    let saved = project::save_project(&board, &dir.path().join("layout.tiler")).unwrap();
    fs::remove_file(&a).unwrap();

    let loaded = project::load_project(&saved).unwrap();
    assert_eq!(loaded.missing, vec![a]);
    assert!(loaded.board.occupancy.is_empty());
    assert_eq!(loaded.board.bank.paths(), &[b]);
}

#[test]
fn load_rejects_foreign_version_and_junk() {
    let dir = TempDir::new().unwrap();

    let versioned = dir.path().join("future.tiler");
    fs::write(
        &versioned,
        r#"{"version": 9, "grid": {}, "tiles": [], "bank": {"image_paths": []}}"#,
    )
    .unwrap();
    assert!(matches!(
        project::load_project(&versioned),
        Err(project::ProjectError::UnsupportedVersion(9))
    ));

    let junk = dir.path().join("junk.tiler");
    fs::write(&junk, "definitely not json").unwrap();
    assert!(matches!(
        project::load_project(&junk),
        Err(project::ProjectError::Malformed(_))
    ));

    assert!(matches!(
        project::load_project(&dir.path().join("nope.tiler")),
        Err(project::ProjectError::Io(_))
    ));
}
