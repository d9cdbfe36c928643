//! The board controller: single owner of the occupancy map, bank, both
//! selection trackers and the viewport.
//!
//! Every pointer gesture the UI observes is funneled through here as a
//! plain method call (press, move, release), and every state transition of
//! the drag protocol happens synchronously inside one of those calls.  The
//! view layer reads the resulting state back each frame; it never mutates
//! anything itself.
//!
//! Drag gesture lifecycle:
//!
//! ```text
//! Idle -> Armed (press on a draggable item)
//!      -> Dragging (movement exceeds DRAG_START_THRESHOLD)
//!      -> Committed | Cancelled -> Idle
//! ```
//!
//! A release while still `Armed` is a plain click and goes to the
//! selection trackers instead.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use egui::{Pos2, Rect, Vec2};

use crate::bank::BankCollection;
use crate::drag::{
    DRAG_START_THRESHOLD, DragItem, DragSession, DragSource, MimePayload, decode_payload,
    encode_payload,
};
use crate::grid::{GridCell, GridConfig, OccupancyMap, PlacedTile};
use crate::selection::SelectionSet;
use crate::viewport::{self, ViewportState};
use crate::{log_info, log_warn};

/// What a press was armed on.
#[derive(Clone, Debug, PartialEq)]
enum PressOrigin {
    Bank(PathBuf),
    Grid(GridCell),
}

/// Gesture phase.  `Armed` is a press that has not yet travelled far
/// enough to count as a drag.
#[derive(Clone, Debug, PartialEq, Default)]
enum DragPhase {
    #[default]
    Idle,
    Armed {
        start: Pos2,
        origin: PressOrigin,
    },
    Dragging(DragSession),
}

/// Terminal result of a pointer release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Drag landed on a valid target and state was mutated.
    Committed,
    /// Drag ended with no valid target; sources were restored.
    Cancelled,
    /// The press never became a drag; selection handled it as a click.
    Click,
    /// Nothing was in flight, or the payload was not applicable.
    Ignored,
}

#[derive(Debug, Default)]
pub struct BoardState {
    pub occupancy: OccupancyMap,
    pub bank: BankCollection,
    pub viewport: ViewportState,
    pub grid_selection: SelectionSet<GridCell>,
    pub bank_selection: SelectionSet<PathBuf>,
    phase: DragPhase,
    /// Tiles retired during the current event pass.  Dropped on the next
    /// tick (see [`Self::run_deferred_cleanup`]), never mid-handler, so a
    /// reciprocal drop handler can still be iterating its collections.
    deferred_cleanup: VecDeque<PlacedTile>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board from restored parts (project load).
    pub fn from_parts(
        occupancy: OccupancyMap,
        bank: BankCollection,
        viewport: ViewportState,
        grid_selection: SelectionSet<GridCell>,
        bank_selection: SelectionSet<PathBuf>,
    ) -> Self {
        let mut board = Self {
            occupancy,
            bank,
            viewport,
            grid_selection,
            bank_selection,
            phase: DragPhase::Idle,
            deferred_cleanup: VecDeque::new(),
        };
        board.sync_tile_selection_flags();
        board
    }

    // ---- bank management ----------------------------------------------------

    /// Add imported images to the bank.  Paths already banked or placed on
    /// the grid are skipped (an image is either banked or placed, never
    /// both, never duplicated).  Returns the number actually added.
    pub fn import_images(&mut self, paths: Vec<PathBuf>) -> usize {
        let mut added = 0;
        for path in paths {
            if self.occupancy.contains_path(&path) {
                continue;
            }
            if self.bank.push(path) {
                added += 1;
            }
        }
        if added > 0 {
            log_info!("imported {} image(s) into the bank", added);
        }
        added
    }

    /// Delete the selected bank images: removes them from the bank and
    /// destroys every placed tile referencing them.
    pub fn delete_selected_bank(&mut self) {
        let paths: Vec<PathBuf> = self.bank_selection.iter().cloned().collect();
        for path in &paths {
            self.bank.remove(path);
            for (cell, tile) in self.occupancy.remove_by_path(path) {
                self.grid_selection.remove(&cell);
                self.deferred_cleanup.push_back(tile);
            }
        }
        self.bank_selection.clear();
        if !paths.is_empty() {
            log_info!("deleted {} bank image(s)", paths.len());
        }
    }

    /// Select every bank image, or deselect all when everything is
    /// already selected.
    pub fn toggle_select_all_bank(&mut self) {
        if !self.bank.is_empty() && self.bank_selection.len() == self.bank.len() {
            self.bank_selection.clear();
        } else {
            self.bank_selection.set_members(self.bank.iter().cloned());
        }
    }

    pub fn all_bank_selected(&self) -> bool {
        !self.bank.is_empty() && self.bank_selection.len() == self.bank.len()
    }

    // ---- grid management ----------------------------------------------------

    /// Remove every placed tile.  Tiles are destroyed, not banked.
    pub fn clear_grid(&mut self) {
        for (_, tile) in self.occupancy.clear_all() {
            self.deferred_cleanup.push_back(tile);
        }
        self.grid_selection.clear();
    }

    /// Delete the tiles under the selected grid cells.
    pub fn delete_selected_grid(&mut self) {
        let cells: Vec<GridCell> = self.grid_selection.iter().copied().collect();
        for cell in cells {
            if let Some(tile) = self.occupancy.remove(cell) {
                self.deferred_cleanup.push_back(tile);
            }
            self.grid_selection.remove(&cell);
        }
    }

    /// Change the grid dimensions.  Tiles outside the new bounds are
    /// evicted and destroyed; their selection entries are removed too.
    /// Returns the eviction count.
    pub fn set_grid_dimensions(&mut self, rows: u32, columns: u32) -> usize {
        let evicted = self.occupancy.resize(rows, columns);
        let count = evicted.len();
        for (cell, tile) in evicted {
            self.grid_selection.remove(&cell);
            self.deferred_cleanup.push_back(tile);
        }
        if count > 0 {
            log_info!("grid resize evicted {} tile(s)", count);
        }
        count
    }

    // ---- viewport -----------------------------------------------------------

    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        self.viewport = viewport::zoom_at(anchor, factor, &self.viewport);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
    }

    // ---- click selection ----------------------------------------------------

    /// Plain click toggles; shift-click range-selects from the anchor.
    pub fn click_grid(&mut self, cell: GridCell, range: bool) {
        if !self.occupancy.is_occupied(cell) {
            return;
        }
        if range {
            let domain = self.occupancy.positions_row_major();
            self.grid_selection.select_range(cell, &domain);
        } else {
            self.grid_selection.toggle(cell);
        }
        self.sync_tile_selection_flags();
    }

    pub fn click_bank(&mut self, path: &Path, range: bool) {
        if !self.bank.contains(path) {
            return;
        }
        if range {
            let domain = self.bank.paths().to_vec();
            self.bank_selection.select_range(path.to_path_buf(), &domain);
        } else {
            self.bank_selection.toggle(path.to_path_buf());
        }
    }

    /// Marquee over the grid: candidates are the occupied cells' on-screen
    /// rectangles under the current viewport.
    pub fn marquee_grid(&mut self, rect: Rect, additive: bool) {
        let size = viewport::cell_screen_size(&self.viewport);
        let candidates: Vec<(GridCell, Rect)> = self
            .occupancy
            .iter()
            .map(|(cell, _)| {
                let min = viewport::grid_to_screen(cell, &self.viewport);
                (cell, Rect::from_min_size(min, Vec2::splat(size)))
            })
            .collect();
        self.grid_selection.marquee_select(rect, &candidates, additive);
        self.sync_tile_selection_flags();
    }

    /// Marquee over the bank panel.  Thumbnail layout rectangles come from
    /// the view, which is the only thing that knows them.
    pub fn marquee_bank(&mut self, rect: Rect, candidates: &[(PathBuf, Rect)], additive: bool) {
        self.bank_selection.marquee_select(rect, candidates, additive);
    }

    // ---- drag protocol ------------------------------------------------------

    /// Press on a placed tile.  Arms a potential drag.
    pub fn press_grid(&mut self, cell: GridCell, pos: Pos2) {
        if self.occupancy.is_occupied(cell) {
            self.phase = DragPhase::Armed {
                start: pos,
                origin: PressOrigin::Grid(cell),
            };
        }
    }

    /// Press on a bank thumbnail.  Arms a potential drag.
    pub fn press_bank(&mut self, path: &Path, pos: Pos2) {
        if self.bank.contains(path) {
            self.phase = DragPhase::Armed {
                start: pos,
                origin: PressOrigin::Bank(path.to_path_buf()),
            };
        }
    }

    /// Pointer movement.  Promotes `Armed` to `Dragging` once the travel
    /// threshold is exceeded and keeps the candidate target up to date.
    pub fn pointer_moved(&mut self, pos: Pos2) {
        match &self.phase {
            DragPhase::Armed { start, origin } => {
                if (pos - *start).length() >= DRAG_START_THRESHOLD {
                    let origin = origin.clone();
                    self.begin_drag(origin);
                    self.update_candidate(pos);
                }
            }
            DragPhase::Dragging(_) => self.update_candidate(pos),
            DragPhase::Idle => {}
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// The in-flight session, for highlight rendering.
    pub fn drag_session(&self) -> Option<&DragSession> {
        match &self.phase {
            DragPhase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Encoded mime text for the in-flight drag (drag preview channel).
    pub fn drag_payload_text(&self) -> Option<String> {
        self.drag_session().map(|session| {
            encode_payload(&MimePayload {
                items: session.items.clone(),
                from_grid: session.source.is_grid(),
            })
        })
    }

    /// The cells currently highlighted as the drop target, empty when the
    /// target is invalid.
    pub fn highlight_cells(&self) -> Vec<GridCell> {
        match self.drag_session() {
            Some(session) => match session.candidate {
                Some(start) => DragSession::candidate_cells(start, session.items.len()).collect(),
                None => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// Clear the target highlight (pointer left the grid).
    pub fn clear_candidate(&mut self) {
        if let DragPhase::Dragging(session) = &mut self.phase {
            session.candidate = None;
        }
    }

    /// Release over the grid: commits onto a valid target, rolls back
    /// otherwise.  An armed press that never moved becomes a click.
    pub fn release_on_grid(&mut self, pos: Pos2, range_modifier: bool) -> DropOutcome {
        match std::mem::take(&mut self.phase) {
            DragPhase::Idle => DropOutcome::Ignored,
            DragPhase::Armed { origin, .. } => {
                if let PressOrigin::Grid(cell) = origin {
                    self.click_grid(cell, range_modifier);
                }
                DropOutcome::Click
            }
            DragPhase::Dragging(session) => {
                let start = viewport::screen_to_grid(pos, &self.viewport);
                if self.target_is_valid(start, session.items.len()) {
                    self.commit_to_grid(session, start);
                    DropOutcome::Committed
                } else {
                    self.rollback(session);
                    DropOutcome::Cancelled
                }
            }
        }
    }

    /// Release over the bank panel.  Grid-origin drags are returned to the
    /// bank (the reciprocal drop handler); bank-origin drags are a no-op
    /// cancel since bank items were never provisionally removed.
    pub fn release_on_bank(&mut self, range_modifier: bool) -> DropOutcome {
        match std::mem::take(&mut self.phase) {
            DragPhase::Idle => DropOutcome::Ignored,
            DragPhase::Armed { origin, .. } => match origin {
                PressOrigin::Bank(path) => {
                    self.click_bank(&path, range_modifier);
                    DropOutcome::Click
                }
                PressOrigin::Grid(_) => DropOutcome::Ignored,
            },
            DragPhase::Dragging(session) => match session.source {
                DragSource::Grid(_) => {
                    self.return_to_bank(session);
                    DropOutcome::Committed
                }
                DragSource::Bank => DropOutcome::Cancelled,
            },
        }
    }

    /// Release anywhere else (or an explicit cancel such as Escape):
    /// restore every hidden source tile.
    pub fn release_outside(&mut self) -> DropOutcome {
        match std::mem::take(&mut self.phase) {
            DragPhase::Idle => DropOutcome::Ignored,
            DragPhase::Armed { .. } => DropOutcome::Ignored,
            DragPhase::Dragging(session) => {
                self.rollback(session);
                DropOutcome::Cancelled
            }
        }
    }

    /// Drop arriving purely as encoded payload text (the cross-widget mime
    /// channel).  Malformed payloads leave all state unchanged.  Bank-form
    /// payloads remove their entries from the bank on success.
    pub fn drop_text_on_grid(&mut self, text: &str, pos: Pos2) -> DropOutcome {
        let payload = match decode_payload(text) {
            Ok(payload) => payload,
            Err(e) => {
                log_warn!("ignoring drop: {}", e);
                return DropOutcome::Ignored;
            }
        };
        // A live session is authoritative for its own payload.
        if self.is_dragging() {
            return self.release_on_grid(pos, false);
        }
        // A detached payload (replayed, or synthesized outside this
        // process) must not duplicate an image: each path at most once,
        // nothing already placed, and bank-form entries must still be
        // banked.  Checked in full before any state is touched.
        let mut seen: HashSet<&Path> = HashSet::new();
        for item in &payload.items {
            if !seen.insert(item.path.as_path()) || self.occupancy.contains_path(&item.path) {
                log_warn!("ignoring drop: duplicate image {}", item.path.display());
                return DropOutcome::Ignored;
            }
            if payload.from_grid == self.bank.contains(&item.path) {
                log_warn!("ignoring drop: {} has no valid source", item.path.display());
                return DropOutcome::Ignored;
            }
        }
        let start = viewport::screen_to_grid(pos, &self.viewport);
        if !self.target_is_valid(start, payload.items.len()) {
            return DropOutcome::Cancelled;
        }
        for (offset, item) in payload.items.iter().enumerate() {
            let target = GridCell::new(start.x + offset as i32, start.y);
            if !payload.from_grid {
                self.bank.remove(&item.path);
                self.bank_selection.remove(&item.path);
            }
            let tile = PlacedTile::new(item.path.clone(), item.bank_index);
            if let Err(e) = self.occupancy.place(target, tile) {
                // Validated above; only reachable via a racing mutation.
                log_warn!("payload drop at {:?} rejected: {}", target, e);
            }
        }
        DropOutcome::Committed
    }

    /// True iff `len` consecutive cells starting at `start` (along
    /// increasing column) are all in-bounds and unoccupied.  Vacated
    /// source cells of an in-flight grid drag count as free because their
    /// tiles were already removed from the map.
    fn target_is_valid(&self, start: GridCell, len: usize) -> bool {
        len > 0
            && DragSession::candidate_cells(start, len)
                .all(|cell| self.occupancy.config().contains(cell) && !self.occupancy.is_occupied(cell))
    }

    /// Build the session and vacate grid sources.  A press on a selected
    /// tile with a multi-member grid selection drags the whole selection,
    /// ordered row-major; otherwise only the pressed tile moves.
    fn begin_drag(&mut self, origin: PressOrigin) {
        let session = match origin {
            PressOrigin::Grid(cell) => {
                let multi =
                    self.grid_selection.contains(&cell) && self.grid_selection.len() > 1;
                let source_cells: Vec<GridCell> = if multi {
                    let mut cells: Vec<GridCell> =
                        self.grid_selection.iter().copied().collect();
                    cells.sort_by_key(|c| c.row_major_key());
                    cells
                } else {
                    vec![cell]
                };
                let mut items = Vec::with_capacity(source_cells.len());
                let mut hidden = Vec::with_capacity(source_cells.len());
                for source in source_cells {
                    if let Some(tile) = self.occupancy.remove(source) {
                        items.push(DragItem {
                            path: tile.image_ref.clone(),
                            bank_index: tile.origin_bank_index,
                        });
                        hidden.push((source, tile));
                    }
                }
                DragSession {
                    items,
                    source: DragSource::Grid(hidden),
                    candidate: None,
                }
            }
            PressOrigin::Bank(path) => {
                let multi =
                    self.bank_selection.contains(&path) && self.bank_selection.len() > 1;
                let items: Vec<DragItem> = if multi {
                    self.bank
                        .iter()
                        .enumerate()
                        .filter(|&(_, p)| self.bank_selection.contains(p))
                        .map(|(index, p)| DragItem {
                            path: p.clone(),
                            bank_index: Some(index),
                        })
                        .collect()
                } else {
                    let index = self.bank.index_of(&path);
                    vec![DragItem {
                        path,
                        bank_index: index,
                    }]
                };
                DragSession {
                    items,
                    source: DragSource::Bank,
                    candidate: None,
                }
            }
        };
        log_info!(
            "drag started: {} item(s) from {}",
            session.items.len(),
            if session.source.is_grid() { "grid" } else { "bank" }
        );
        self.phase = DragPhase::Dragging(session);
    }

    /// Recompute the candidate target under the pointer.
    fn update_candidate(&mut self, pos: Pos2) {
        let start = viewport::screen_to_grid(pos, &self.viewport);
        let DragPhase::Dragging(session) = &self.phase else {
            return;
        };
        let valid = self.target_is_valid(start, session.items.len());
        if let DragPhase::Dragging(session) = &mut self.phase {
            session.candidate = valid.then_some(start);
        }
    }

    /// Commit: place every payload entry left-to-right at consecutive
    /// target cells.  Grid-origin tiles are reused (selection flag reset);
    /// bank-origin entries leave the bank now and become fresh tiles.
    /// Grid selection is always cleared on a successful commit.
    fn commit_to_grid(&mut self, session: DragSession, start: GridCell) {
        match session.source {
            DragSource::Grid(hidden) => {
                for (offset, (_, mut tile)) in hidden.into_iter().enumerate() {
                    tile.selected = false;
                    let target = GridCell::new(start.x + offset as i32, start.y);
                    if let Err(e) = self.occupancy.place(target, tile.clone()) {
                        // Target was validated; keep the tile for deferred
                        // destruction rather than losing it silently.
                        log_warn!("commit at {:?} rejected: {}", target, e);
                        self.deferred_cleanup.push_back(tile);
                    }
                }
                self.grid_selection.clear();
            }
            DragSource::Bank => {
                for (offset, item) in session.items.into_iter().enumerate() {
                    let target = GridCell::new(start.x + offset as i32, start.y);
                    self.bank.remove(&item.path);
                    self.bank_selection.remove(&item.path);
                    let tile = PlacedTile::new(item.path, item.bank_index);
                    if let Err(e) = self.occupancy.place(target, tile) {
                        log_warn!("commit at {:?} rejected: {}", target, e);
                    }
                }
            }
        }
        self.sync_tile_selection_flags();
    }

    /// Cancel: restore every hidden source tile to its original cell.
    /// Grid selection is deliberately *not* cleared — the drag failed, so
    /// the selection persists (this differs from the commit path).
    fn rollback(&mut self, session: DragSession) {
        if let DragSource::Grid(hidden) = session.source {
            for (cell, tile) in hidden {
                if let Err(e) = self.occupancy.place(cell, tile.clone()) {
                    log_warn!("restore to {:?} failed: {}", cell, e);
                    self.deferred_cleanup.push_back(tile);
                }
            }
        }
        self.sync_tile_selection_flags();
    }

    /// Reciprocal drop handler: a grid-origin drag released over the bank
    /// panel.  Each tile goes back into the bank at its origin index when
    /// that still fits, otherwise it is appended.  The placed-tile objects
    /// are retired on the next tick.
    fn return_to_bank(&mut self, session: DragSession) {
        if let DragSource::Grid(hidden) = session.source {
            for (cell, tile) in hidden {
                self.grid_selection.remove(&cell);
                self.bank
                    .restore(tile.image_ref.clone(), tile.origin_bank_index);
                self.deferred_cleanup.push_back(tile);
            }
        }
        self.sync_tile_selection_flags();
    }

    // ---- deferred cleanup ---------------------------------------------------

    pub fn has_deferred_cleanup(&self) -> bool {
        !self.deferred_cleanup.is_empty()
    }

    /// Drop tiles retired during the previous event pass, FIFO.  Runs at
    /// the start of the next frame; a no-op when nothing is pending, so a
    /// teardown race simply skips it.
    pub fn run_deferred_cleanup(&mut self) -> usize {
        let count = self.deferred_cleanup.len();
        while let Some(tile) = self.deferred_cleanup.pop_front() {
            drop(tile);
        }
        if count > 0 {
            log_info!("retired {} tile object(s)", count);
        }
        count
    }

    // ---- internal -----------------------------------------------------------

    /// Mirror the grid selection set onto the tiles' `selected` flags so
    /// the renderer can read them without consulting the tracker.
    fn sync_tile_selection_flags(&mut self) {
        let selection = &self.grid_selection;
        for (cell, tile) in self.occupancy.iter_mut() {
            tile.selected = selection.contains(&cell);
        }
    }
}
