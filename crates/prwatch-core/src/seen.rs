//! Previously seen links, persisted one per line between runs.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::storage;

/// Flat text file of links already handled by the watcher.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the set. A missing file is an empty set (first run); lines are
    /// trimmed and blanks ignored.
    pub fn load(&self) -> Result<BTreeSet<String>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("read seen links: {}", self.path.display()))
            }
        };
        Ok(data
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Replace the file with `links`, sorted, one per line.
    pub fn save(&self, links: &BTreeSet<String>) -> Result<()> {
        let mut out = String::new();
        for link in links {
            out.push_str(link);
            out.push('\n');
        }
        storage::write_atomic(&self.path, out.as_bytes())
            .with_context(|| format!("write seen links: {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), count = links.len(), "saved seen links");
        Ok(())
    }
}

/// Links in `current` that are not in `previous`.
pub fn new_links(current: &BTreeSet<String>, previous: &BTreeSet<String>) -> BTreeSet<String> {
    current.difference(previous).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::open(dir.path().join("pdf_links.txt"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_is_sorted_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::open(dir.path().join("state").join("pdf_links.txt"));
        let links = set(&["https://b.example/2.pdf", "https://a.example/1.pdf"]);
        store.save(&links).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "https://a.example/1.pdf\nhttps://b.example/2.pdf\n");
        assert_eq!(store.load().unwrap(), links);
    }

    #[test]
    fn load_trims_and_skips_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf_links.txt");
        std::fs::write(&path, "  https://a.example/1.pdf  \r\n\n\nhttps://b.example/2.pdf").unwrap();
        let loaded = SeenStore::open(&path).load().unwrap();
        assert_eq!(loaded, set(&["https://a.example/1.pdf", "https://b.example/2.pdf"]));
    }

    #[test]
    fn new_links_is_set_difference() {
        let previous = set(&["a", "b"]);
        let current = set(&["b", "c", "d"]);
        assert_eq!(new_links(&current, &previous), set(&["c", "d"]));
        assert!(new_links(&previous, &previous).is_empty());
    }

    #[test]
    fn diffing_after_merge_is_idempotent() {
        let previous = set(&["a"]);
        let current = set(&["a", "b"]);
        let fresh = new_links(&current, &previous);
        let merged: BTreeSet<String> = previous.union(&fresh).cloned().collect();
        assert!(new_links(&current, &merged).is_empty());
        assert_eq!(new_links(&current, &merged), new_links(&current, &merged));
    }
}
