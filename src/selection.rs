//! Selection tracking, generic over the identity type.
//!
//! Two independent instances exist at runtime: one over bank paths and one
//! over grid cells.  The set holds the selected identities plus the
//! "last selected" anchor that range selection pivots on.
//!
//! `select_range` intentionally leaves the anchor where it was — repeated
//! shift-clicks keep extending from the same pivot until a plain click or
//! toggle moves it.

use std::collections::HashSet;
use std::hash::Hash;

use egui::Rect;

#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSet<I: Clone + Eq + Hash> {
    members: HashSet<I>,
    last_anchor: Option<I>,
}

impl<I: Clone + Eq + Hash> Default for SelectionSet<I> {
    fn default() -> Self {
        Self {
            members: HashSet::new(),
            last_anchor: None,
        }
    }
}

impl<I: Clone + Eq + Hash> SelectionSet<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &I) -> bool {
        self.members.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.members.iter()
    }

    pub fn anchor(&self) -> Option<&I> {
        self.last_anchor.as_ref()
    }

    /// Flip the membership of `id` and move the anchor to it.
    /// Returns true if `id` is selected afterwards.
    pub fn toggle(&mut self, id: I) -> bool {
        let now_selected = if self.members.contains(&id) {
            self.members.remove(&id);
            false
        } else {
            self.members.insert(id.clone());
            true
        };
        self.last_anchor = Some(id);
        now_selected
    }

    /// Clear everything, then select only `id` and anchor on it.
    pub fn select_single(&mut self, id: I) {
        self.members.clear();
        self.members.insert(id.clone());
        self.last_anchor = Some(id);
    }

    /// Select the inclusive range between the anchor and `id` within the
    /// ordered `domain` (bank insertion order, or grid row-major order).
    /// The range is symmetric; existing selection outside it is kept.
    /// Falls back to `select_single` when there is no usable anchor.
    /// The anchor itself is left unchanged.
    pub fn select_range(&mut self, id: I, domain: &[I]) {
        let anchor_index = self
            .last_anchor
            .as_ref()
            .and_then(|anchor| domain.iter().position(|d| d == anchor));
        let target_index = domain.iter().position(|d| d == &id);
        let (Some(anchor_index), Some(target_index)) = (anchor_index, target_index) else {
            self.select_single(id);
            return;
        };
        let start = anchor_index.min(target_index);
        let end = anchor_index.max(target_index);
        for member in &domain[start..=end] {
            self.members.insert(member.clone());
        }
    }

    /// Deselect every member and forget the anchor.
    pub fn clear(&mut self) {
        self.members.clear();
        self.last_anchor = None;
    }

    /// Remove a single identity (e.g. its tile was deleted).  Clears the
    /// anchor too if it pointed at the removed identity.
    pub fn remove(&mut self, id: &I) {
        self.members.remove(id);
        if self.last_anchor.as_ref() == Some(id) {
            self.last_anchor = None;
        }
    }

    /// Keep only members for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&I) -> bool) {
        self.members.retain(|id| keep(id));
        if let Some(anchor) = &self.last_anchor
            && !keep(anchor)
        {
            self.last_anchor = None;
        }
    }

    /// Rubber-band selection: every candidate whose on-screen bounds
    /// intersect `rect` is added to the set.  Non-additive marquees clear
    /// the existing selection first; additive ones never toggle anything
    /// off.
    pub fn marquee_select(&mut self, rect: Rect, candidates: &[(I, Rect)], additive: bool) {
        if !additive {
            self.clear();
        }
        for (id, bounds) in candidates {
            if rect.intersects(*bounds) {
                self.members.insert(id.clone());
            }
        }
    }

    /// Replace the selection wholesale (select-all and project restore).
    pub fn set_members(&mut self, members: impl IntoIterator<Item = I>) {
        self.members = members.into_iter().collect();
        self.last_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn domain(n: usize) -> Vec<u32> {
        (0..n as u32).collect()
    }

    #[test]
    fn toggle_flips_and_moves_anchor() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(3u32));
        assert!(sel.contains(&3));
        assert_eq!(sel.anchor(), Some(&3));
        assert!(!sel.toggle(3));
        assert!(sel.is_empty());
        // Anchor still points at the last-touched identity.
        assert_eq!(sel.anchor(), Some(&3));
    }

    #[test]
    fn select_single_replaces() {
        let mut sel = SelectionSet::new();
        sel.toggle(1u32);
        sel.toggle(2);
        sel.select_single(5);
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(&5));
        assert_eq!(sel.anchor(), Some(&5));
    }

    #[test]
    fn range_is_symmetric_and_keeps_anchor() {
        let d = domain(10);
        let mut sel = SelectionSet::new();
        sel.select_single(6u32);
        sel.select_range(2, &d);
        assert_eq!(sel.len(), 5); // 2,3,4,5,6
        for i in 2..=6 {
            assert!(sel.contains(&i));
        }
        assert_eq!(sel.anchor(), Some(&6));
        // Extending again pivots on the same anchor.
        sel.select_range(8, &d);
        assert!(sel.contains(&7) && sel.contains(&8));
        assert_eq!(sel.anchor(), Some(&6));
    }

    #[test]
    fn range_without_anchor_is_single_select() {
        let d = domain(10);
        let mut sel = SelectionSet::new();
        sel.select_range(4u32, &d);
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(&4));
        assert_eq!(sel.anchor(), Some(&4));
    }

    #[test]
    fn range_adds_without_clearing() {
        let d = domain(10);
        let mut sel = SelectionSet::new();
        sel.toggle(0u32);
        sel.toggle(7);
        sel.select_range(9, &d);
        // 0 survives even though it is outside the 7..=9 range.
        assert!(sel.contains(&0));
        assert!(sel.contains(&8) && sel.contains(&9));
    }

    #[test]
    fn clear_resets_anchor() {
        let mut sel = SelectionSet::new();
        sel.select_single(1u32);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.anchor(), None);
    }

    #[test]
    fn marquee_additive_and_replace() {
        let candidates: Vec<(u32, Rect)> = (0..4)
            .map(|i| {
                let x = i as f32 * 10.0;
                (i, Rect::from_min_max(pos2(x, 0.0), pos2(x + 8.0, 8.0)))
            })
            .collect();
        let mut sel = SelectionSet::new();
        sel.toggle(3u32);

        // Replace: only what the rect covers survives.
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(15.0, 8.0));
        sel.marquee_select(rect, &candidates, false);
        assert!(sel.contains(&0) && sel.contains(&1));
        assert!(!sel.contains(&3));

        // Additive: previous members stay, covered ones stay selected.
        let rect = Rect::from_min_max(pos2(28.0, 0.0), pos2(40.0, 8.0));
        sel.marquee_select(rect, &candidates, true);
        assert!(sel.contains(&0) && sel.contains(&1) && sel.contains(&3));
    }

    #[test]
    fn remove_clears_matching_anchor() {
        let mut sel = SelectionSet::new();
        sel.select_single(2u32);
        sel.remove(&2);
        assert!(sel.is_empty());
        assert_eq!(sel.anchor(), None);
    }
}
