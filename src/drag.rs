//! Drag payload encoding and the drag-session types.
//!
//! The payload format simulates a cross-widget mime channel as a plain
//! string.  Bank-origin drags carry bare JSON; grid-origin drags are marked
//! with a `TILE:` prefix so the drop handler knows whether a bank entry has
//! to be removed on commit.  A legacy grid form (`TILE:` followed by a bare
//! path) is still accepted.
//!
//! The state machine itself (arm, threshold, vacate, commit, rollback)
//! lives in [`crate::board`], which owns the collections it mutates; this
//! module only defines the data that travels with a gesture.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::grid::{GridCell, PlacedTile};

/// Pointer travel (in screen pixels) required before an armed press turns
/// into a drag.  Below this, releasing is a plain click.
pub const DRAG_START_THRESHOLD: f32 = 4.0;

/// Marker prefix for drags that originate from the grid.
pub const GRID_ORIGIN_PREFIX: &str = "TILE:";

/// One dragged image: its path plus the bank index it was drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragItem {
    pub path: PathBuf,
    pub bank_index: Option<usize>,
}

/// Where the dragged items came from.
#[derive(Clone, Debug, PartialEq)]
pub enum DragSource {
    /// Items still sit in the bank; nothing is removed until commit.
    Bank,
    /// Grid-origin drag: the source cells were vacated at drag start and
    /// their tiles are held here, hidden, until commit or rollback.
    Grid(Vec<(GridCell, PlacedTile)>),
}

impl DragSource {
    pub fn is_grid(&self) -> bool {
        matches!(self, DragSource::Grid(_))
    }
}

/// Ephemeral state of one in-flight drag gesture.  Created when the
/// movement threshold is exceeded, destroyed at pointer release.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    /// Payload entries in placement order (bank order for bank drags,
    /// row-major source order for grid drags).
    pub items: Vec<DragItem>,
    pub source: DragSource,
    /// Current highlighted target, `None` when the pointer is over an
    /// invalid or out-of-viewport target.
    pub candidate: Option<GridCell>,
}

impl DragSession {
    /// Target cells for the current candidate: `len` consecutive cells
    /// extending along increasing column from `start`.
    pub fn candidate_cells(start: GridCell, len: usize) -> impl Iterator<Item = GridCell> {
        (0..len as i32).map(move |offset| GridCell::new(start.x + offset, start.y))
    }
}

/// Unparseable or unrecognized drag payload.  Recovered by ignoring the
/// drop entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadError(pub String);

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed drag payload: {}", self.0)
    }
}

/// A decoded drag payload: the items plus their origin side.
#[derive(Clone, Debug, PartialEq)]
pub struct MimePayload {
    pub items: Vec<DragItem>,
    pub from_grid: bool,
}

#[derive(Serialize, Deserialize)]
struct MultiWire {
    multi: Vec<DragItem>,
}

/// Encode a payload for the in-process drag channel.
pub fn encode_payload(payload: &MimePayload) -> String {
    let body = if payload.items.len() == 1 {
        serde_json::to_string(&payload.items[0])
    } else {
        serde_json::to_string(&MultiWire {
            multi: payload.items.clone(),
        })
    }
    .unwrap_or_default();
    if payload.from_grid {
        format!("{GRID_ORIGIN_PREFIX}{body}")
    } else {
        body
    }
}

/// Decode a drag payload string.
///
/// Accepted forms:
/// - `{"path": ..., "bank_index": ...}` — single item from the bank
/// - `{"multi": [ ... ]}` — multiple items from the bank
/// - `TILE:` + either of the above — same, originating from the grid
/// - `TILE:` + bare path — legacy single grid tile
pub fn decode_payload(text: &str) -> Result<MimePayload, PayloadError> {
    let (body, from_grid) = match text.strip_prefix(GRID_ORIGIN_PREFIX) {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    if body.is_empty() {
        return Err(PayloadError("empty payload".into()));
    }

    if let Ok(wire) = serde_json::from_str::<MultiWire>(body) {
        if wire.multi.is_empty() {
            return Err(PayloadError("empty multi payload".into()));
        }
        return Ok(MimePayload {
            items: wire.multi,
            from_grid,
        });
    }
    if let Ok(item) = serde_json::from_str::<DragItem>(body) {
        return Ok(MimePayload {
            items: vec![item],
            from_grid,
        });
    }

    // Legacy form: a bare path, only ever produced for grid tiles.
    if from_grid && !body.trim().is_empty() && !body.trim_start().starts_with('{') {
        return Ok(MimePayload {
            items: vec![DragItem {
                path: PathBuf::from(body),
                bank_index: None,
            }],
            from_grid: true,
        });
    }

    Err(PayloadError(format!("unrecognized payload: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_round_trip() {
        let payload = MimePayload {
            items: vec![DragItem {
                path: PathBuf::from("/tmp/a.png"),
                bank_index: Some(2),
            }],
            from_grid: false,
        };
        let text = encode_payload(&payload);
        assert!(!text.starts_with(GRID_ORIGIN_PREFIX));
        assert_eq!(decode_payload(&text).unwrap(), payload);
    }

    #[test]
    fn multi_round_trip_with_grid_prefix() {
        let payload = MimePayload {
            items: vec![
                DragItem {
                    path: PathBuf::from("a.png"),
                    bank_index: Some(0),
                },
                DragItem {
                    path: PathBuf::from("b.png"),
                    bank_index: None,
                },
            ],
            from_grid: true,
        };
        let text = encode_payload(&payload);
        assert!(text.starts_with(GRID_ORIGIN_PREFIX));
        assert_eq!(decode_payload(&text).unwrap(), payload);
    }

    #[test]
    fn legacy_bare_path_is_grid_single() {
        let decoded = decode_payload("TILE:/home/user/cat.png").unwrap();
        assert!(decoded.from_grid);
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].path, PathBuf::from("/home/user/cat.png"));
        assert_eq!(decoded.items[0].bank_index, None);
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(decode_payload("").is_err());
        assert!(decode_payload("TILE:").is_err());
        assert!(decode_payload("{\"nope\": 1}").is_err());
        assert!(decode_payload("{\"multi\": []}").is_err());
        // A bare path without the grid prefix is not a recognized form.
        assert!(decode_payload("/home/user/cat.png").is_err());
    }

    #[test]
    fn candidate_cells_extend_along_row() {
        let cells: Vec<GridCell> =
            DragSession::candidate_cells(GridCell::new(5, 5), 3).collect();
        assert_eq!(
            cells,
            vec![
                GridCell::new(5, 5),
                GridCell::new(6, 5),
                GridCell::new(7, 5)
            ]
        );
    }
}
