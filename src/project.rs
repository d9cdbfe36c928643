//! Project persistence: a versioned JSON document holding the grid config,
//! viewport, placed tiles, bank order and both selections.
//!
//! Saving is a pure function of board state.  Loading validates the
//! version and required sections, then filters out references to image
//! files that no longer exist — a missing image is a warning, not a load
//! failure.  Writes go to a temp file first and are renamed into place so
//! a failed save never leaves a half-written file that parses.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bank::BankCollection;
use crate::board::BoardState;
use crate::grid::{GridCell, GridConfig, OccupancyMap, PlacedTile};
use crate::selection::SelectionSet;
use crate::viewport::ViewportState;
use crate::log_warn;

/// The single supported document version.  Anything else is rejected
/// wholesale; there is no migration.
pub const PROJECT_VERSION: u32 = 1;

/// File extension appended on save when missing.
pub const PROJECT_EXTENSION: &str = "tiler";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub version: u32,
    pub grid: GridSection,
    pub tiles: Vec<TileEntry>,
    pub bank: BankSection,
    #[serde(default)]
    pub ui_state: UiStateSection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    pub rows: u32,
    pub columns: u32,
    pub zoom_scale: f32,
    pub pan_offset_x: f32,
    pub pan_offset_y: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileEntry {
    pub grid_x: i32,
    pub grid_y: i32,
    pub file_path: String,
    pub original_bank_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankSection {
    pub image_paths: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UiStateSection {
    pub selected_grid_positions: Vec<(i32, i32)>,
    pub selected_bank_paths: Vec<String>,
}

/// Error type for project file operations.
#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    /// The `version` tag is not [`PROJECT_VERSION`].
    UnsupportedVersion(i64),
    /// A required key is absent or the JSON does not parse.
    Malformed(String),
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Io(e) => write!(f, "I/O error: {}", e),
            ProjectError::UnsupportedVersion(v) => {
                write!(f, "unsupported project version: {}", v)
            }
            ProjectError::Malformed(e) => write!(f, "malformed project file: {}", e),
        }
    }
}

impl From<std::io::Error> for ProjectError {
    fn from(e: std::io::Error) -> Self {
        ProjectError::Io(e)
    }
}

/// Result of a successful load: the rebuilt board plus the references that
/// were dropped because their image files are gone.
pub struct LoadedProject {
    pub board: BoardState,
    pub missing: Vec<PathBuf>,
}

/// Snapshot the board into a document.  Pure: no ambient time or random
/// data, so identical states serialize identically.
pub fn build_document(board: &BoardState) -> ProjectDocument {
    let config = board.occupancy.config();
    let tiles = board
        .occupancy
        .iter()
        .map(|(cell, tile)| TileEntry {
            grid_x: cell.x,
            grid_y: cell.y,
            file_path: tile.image_ref.to_string_lossy().into_owned(),
            original_bank_index: tile.origin_bank_index,
        })
        .collect();
    let mut selected_grid_positions: Vec<(i32, i32)> = board
        .grid_selection
        .iter()
        .map(|cell| (cell.x, cell.y))
        .collect();
    selected_grid_positions.sort_by_key(|&(x, y)| (y, x));
    let mut selected_bank_paths: Vec<String> = board
        .bank_selection
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    selected_bank_paths.sort();

    ProjectDocument {
        version: PROJECT_VERSION,
        grid: GridSection {
            rows: config.rows,
            columns: config.columns,
            zoom_scale: board.viewport.zoom_scale,
            pan_offset_x: board.viewport.pan_offset.x,
            pan_offset_y: board.viewport.pan_offset.y,
        },
        tiles,
        bank: BankSection {
            image_paths: board
                .bank
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        },
        ui_state: UiStateSection {
            selected_grid_positions,
            selected_bank_paths,
        },
    }
}

/// Parse a document from JSON text, checking version and required keys
/// before the typed decode.
pub fn parse_document(text: &str) -> Result<ProjectDocument, ProjectError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| ProjectError::Malformed(e.to_string()))?;

    let version = value
        .get("version")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ProjectError::Malformed("missing required field: version".into()))?;
    if version != PROJECT_VERSION as i64 {
        return Err(ProjectError::UnsupportedVersion(version));
    }
    for field in ["grid", "tiles", "bank"] {
        if value.get(field).is_none() {
            return Err(ProjectError::Malformed(format!(
                "missing required field: {}",
                field
            )));
        }
    }

    serde_json::from_value(value).map_err(|e| ProjectError::Malformed(e.to_string()))
}

/// Rebuild a board from a document.
///
/// `exists` is the filesystem collaborator used to validate image
/// references; tiles and bank entries whose image cannot be located are
/// dropped (collected into `missing`).  Tiles that collide — which only
/// happens with hand-edited save data — are dropped silently with the
/// first write winning.  Selections are restored only for identities that
/// survive the filtering.
pub fn restore_board(
    doc: ProjectDocument,
    exists: impl Fn(&Path) -> bool,
) -> LoadedProject {
    let mut missing = Vec::new();

    let config = GridConfig::new(doc.grid.rows, doc.grid.columns);
    let viewport = ViewportState::new(
        doc.grid.zoom_scale,
        egui::Vec2::new(doc.grid.pan_offset_x, doc.grid.pan_offset_y),
    );

    let mut occupancy = OccupancyMap::new(config);
    for entry in doc.tiles {
        let path = PathBuf::from(&entry.file_path);
        if !exists(&path) {
            missing.push(path);
            continue;
        }
        let cell = GridCell::new(entry.grid_x, entry.grid_y);
        let tile = PlacedTile::new(path, entry.original_bank_index);
        if let Err(e) = occupancy.place(cell, tile) {
            log_warn!("dropping tile at {:?} on load: {}", cell, e);
        }
    }

    let mut bank = BankCollection::new();
    for path_text in doc.bank.image_paths {
        let path = PathBuf::from(&path_text);
        if !exists(&path) {
            missing.push(path);
            continue;
        }
        if occupancy.contains_path(&path) {
            // Either banked or placed, never both; the tile wins.
            log_warn!("dropping banked duplicate of placed image {}", path_text);
            continue;
        }
        bank.push(path);
    }

    let mut grid_selection = SelectionSet::new();
    grid_selection.set_members(
        doc.ui_state
            .selected_grid_positions
            .into_iter()
            .map(|(x, y)| GridCell::new(x, y))
            .filter(|cell| occupancy.is_occupied(*cell)),
    );
    let mut bank_selection = SelectionSet::new();
    bank_selection.set_members(
        doc.ui_state
            .selected_bank_paths
            .into_iter()
            .map(PathBuf::from)
            .filter(|path| bank.contains(path)),
    );

    LoadedProject {
        board: BoardState::from_parts(occupancy, bank, viewport, grid_selection, bank_selection),
        missing,
    }
}

/// Resolve the on-disk path for a save target, appending the `.tiler`
/// extension when absent.
pub fn resolve_save_path(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext == PROJECT_EXTENSION => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(PROJECT_EXTENSION);
            PathBuf::from(name)
        }
    }
}

/// Serialize the board and write it to `path` (extension enforced).
/// Writes to a sibling temp file first, then renames, so an interrupted
/// save cannot leave a valid-looking partial file.  Returns the final
/// path.
pub fn save_project(board: &BoardState, path: &Path) -> Result<PathBuf, ProjectError> {
    let target = resolve_save_path(path);
    let doc = build_document(board);
    let text = serde_json::to_string_pretty(&doc)
        .map_err(|e| ProjectError::Malformed(e.to_string()))?;

    let tmp = target.with_extension("tiler.tmp");
    std::fs::write(&tmp, text)?;
    if let Err(e) = std::fs::rename(&tmp, &target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(target)
}

/// Read, parse and restore a project from disk, validating each image
/// reference against the filesystem.
pub fn load_project(path: &Path) -> Result<LoadedProject, ProjectError> {
    let text = std::fs::read_to_string(path)?;
    let doc = parse_document(&text)?;
    Ok(restore_board(doc, |p| p.exists()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    fn sample_board() -> BoardState {
        let mut board = BoardState::new();
        board.import_images(vec![
            PathBuf::from("a.png"),
            PathBuf::from("b.png"),
            PathBuf::from("c.png"),
        ]);
        // Place a.png at (3,4) via the drag protocol.
        board.press_bank(Path::new("a.png"), Pos2::new(0.0, 900.0));
        board.pointer_moved(Pos2::new(3.0 * 60.0 + 30.0, 4.0 * 60.0 + 30.0));
        board.release_on_grid(Pos2::new(3.0 * 60.0 + 30.0, 4.0 * 60.0 + 30.0), false);
        board.click_grid(GridCell::new(3, 4), false);
        board.click_bank(Path::new("b.png"), false);
        board.zoom_at(Pos2::new(100.0, 100.0), 1.5);
        board
    }

    fn boards_equal(a: &BoardState, b: &BoardState) -> bool {
        a.occupancy == b.occupancy
            && a.bank == b.bank
            && a.viewport == b.viewport
            && a.grid_selection.len() == b.grid_selection.len()
            && a.grid_selection.iter().all(|c| b.grid_selection.contains(c))
            && a.bank_selection.len() == b.bank_selection.len()
            && a.bank_selection.iter().all(|p| b.bank_selection.contains(p))
    }

    #[test]
    fn document_round_trip_preserves_state() {
        let board = sample_board();
        let doc = build_document(&board);
        let text = serde_json::to_string_pretty(&doc).unwrap();
        let reparsed = parse_document(&text).unwrap();
        assert_eq!(doc, reparsed);

        let loaded = restore_board(reparsed, |_| true);
        assert!(loaded.missing.is_empty());
        assert!(boards_equal(&board, &loaded.board));
    }

    #[test]
    fn build_document_is_deterministic() {
        let board = sample_board();
        assert_eq!(build_document(&board), build_document(&board));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let board = sample_board();
        let mut doc = build_document(&board);
        doc.version = 2;
        let text = serde_json::to_string(&doc).unwrap();
        match parse_document(&text) {
            Err(ProjectError::UnsupportedVersion(2)) => {}
            other => panic!("expected UnsupportedVersion, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_sections_are_malformed() {
        assert!(matches!(
            parse_document(r#"{"version": 1, "tiles": [], "bank": {"image_paths": []}}"#),
            Err(ProjectError::Malformed(_))
        ));
        assert!(matches!(
            parse_document("not json"),
            Err(ProjectError::Malformed(_))
        ));
        assert!(matches!(
            parse_document(r#"{"grid": {}}"#),
            Err(ProjectError::Malformed(_))
        ));
    }

    #[test]
    fn missing_images_are_filtered_not_fatal() {
        let board = sample_board();
        let doc = build_document(&board);
        // a.png is placed; b.png and c.png are banked.  Pretend b.png and
        // a.png vanished.
        let gone = [PathBuf::from("a.png"), PathBuf::from("b.png")];
        let loaded = restore_board(doc, |p| !gone.contains(&p.to_path_buf()));
        assert_eq!(loaded.missing.len(), 2);
        assert!(loaded.board.occupancy.is_empty());
        assert_eq!(loaded.board.bank.paths(), &[PathBuf::from("c.png")]);
        // Selections referencing dropped identities are gone too.
        assert!(loaded.board.grid_selection.is_empty());
        assert!(loaded.board.bank_selection.is_empty());
    }

    #[test]
    fn bank_keeps_relative_order_after_filtering() {
        let doc = ProjectDocument {
            version: 1,
            grid: GridSection {
                rows: 20,
                columns: 20,
                zoom_scale: 1.0,
                pan_offset_x: 0.0,
                pan_offset_y: 0.0,
            },
            tiles: vec![],
            bank: BankSection {
                image_paths: ["1", "2", "3", "4", "5"]
                    .iter()
                    .map(|s| format!("{s}.png"))
                    .collect(),
            },
            ui_state: UiStateSection::default(),
        };
        let gone = [PathBuf::from("2.png"), PathBuf::from("4.png")];
        let loaded = restore_board(doc, |p| !gone.contains(&p.to_path_buf()));
        assert_eq!(loaded.missing.len(), 2);
        assert_eq!(
            loaded.board.bank.paths(),
            &[
                PathBuf::from("1.png"),
                PathBuf::from("3.png"),
                PathBuf::from("5.png")
            ]
        );
    }

    #[test]
    fn colliding_tiles_drop_with_first_write_winning() {
        let mut doc = build_document(&sample_board());
        doc.tiles = vec![
            TileEntry {
                grid_x: 0,
                grid_y: 0,
                file_path: "a.png".into(),
                original_bank_index: None,
            },
            TileEntry {
                grid_x: 0,
                grid_y: 0,
                file_path: "b.png".into(),
                original_bank_index: None,
            },
        ];
        doc.ui_state = UiStateSection::default();
        let loaded = restore_board(doc, |_| true);
        assert_eq!(loaded.board.occupancy.len(), 1);
        assert_eq!(
            loaded.board.occupancy.get(GridCell::new(0, 0)).unwrap().image_ref,
            PathBuf::from("a.png")
        );
    }

    #[test]
    fn save_path_gets_extension() {
        assert_eq!(
            resolve_save_path(Path::new("/tmp/puzzle")),
            PathBuf::from("/tmp/puzzle.tiler")
        );
        assert_eq!(
            resolve_save_path(Path::new("/tmp/puzzle.tiler")),
            PathBuf::from("/tmp/puzzle.tiler")
        );
    }
}
