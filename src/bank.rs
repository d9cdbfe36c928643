//! The image bank: an ordered pool of imported images not currently placed
//! on the grid.
//!
//! Order is meaningful — it is both the thumbnail layout order and the
//! restore order for tiles dragged back off the grid.  A path appears at
//! most once; the board controller additionally guarantees a path is never
//! in the bank and on the grid at the same time.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BankCollection {
    paths: Vec<PathBuf>,
}

impl BankCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.paths.iter().position(|p| p == path)
    }

    pub fn get(&self, index: usize) -> Option<&PathBuf> {
        self.paths.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Append a path, ignoring duplicates.  Returns true if it was added.
    pub fn push(&mut self, path: PathBuf) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Re-insert a path returned from the grid.  Inserts at `origin_index`
    /// when that index still fits the current length, otherwise appends.
    /// Duplicates are ignored.
    pub fn restore(&mut self, path: PathBuf, origin_index: Option<usize>) {
        if self.contains(&path) {
            return;
        }
        match origin_index {
            Some(index) if index <= self.paths.len() => self.paths.insert(index, path),
            _ => self.paths.push(path),
        }
    }

    /// Remove a path, returning the index it occupied.
    pub fn remove(&mut self, path: &Path) -> Option<usize> {
        let index = self.index_of(path)?;
        self.paths.remove(index);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_ignores_duplicates() {
        let mut bank = BankCollection::new();
        assert!(bank.push(PathBuf::from("a.png")));
        assert!(!bank.push(PathBuf::from("a.png")));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn restore_at_origin_index() {
        let mut bank = BankCollection::new();
        bank.push(PathBuf::from("a.png"));
        bank.push(PathBuf::from("c.png"));
        bank.restore(PathBuf::from("b.png"), Some(1));
        assert_eq!(
            bank.paths(),
            &[
                PathBuf::from("a.png"),
                PathBuf::from("b.png"),
                PathBuf::from("c.png")
            ]
        );
    }

    #[test]
    fn restore_appends_when_index_stale() {
        let mut bank = BankCollection::new();
        bank.push(PathBuf::from("a.png"));
        bank.restore(PathBuf::from("z.png"), Some(9));
        assert_eq!(bank.index_of(Path::new("z.png")), Some(1));
        bank.restore(PathBuf::from("y.png"), None);
        assert_eq!(bank.index_of(Path::new("y.png")), Some(2));
    }

    #[test]
    fn remove_returns_index() {
        let mut bank = BankCollection::new();
        bank.push(PathBuf::from("a.png"));
        bank.push(PathBuf::from("b.png"));
        assert_eq!(bank.remove(Path::new("b.png")), Some(1));
        assert_eq!(bank.remove(Path::new("b.png")), None);
    }
}
