//! Deduplicated index of reference positions in a forest.

use std::collections::BTreeMap;

use gyr_tree::{for_each_string, Document, NodePath};

use crate::registry::BackendRegistry;

/// Every resolvable reference in a forest, grouped by value.
///
/// A string scalar is indexed when its trimmed value starts with a
/// registered prefix; the trimmed value is the grouping key, so `"ref"` and
/// `"  ref  "` share one entry and resolve once. Entries iterate in
/// lexicographic key order, which makes fan-out and write-back order
/// deterministic for a given forest.
///
/// The index borrows nothing: it holds owned reference strings and
/// [`NodePath`]s, and stays valid as long as the forest's shape does.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    entries: BTreeMap<String, Vec<NodePath>>,
}

impl ReferenceIndex {
    /// Walk `forest` and index every reference some backend claims.
    ///
    /// Pure tree work, no I/O. A forest without matches yields an empty
    /// index, which resolves as a no-op.
    pub fn scan(forest: &[Document], registry: &BackendRegistry) -> Self {
        let mut entries: BTreeMap<String, Vec<NodePath>> = BTreeMap::new();
        for_each_string(forest, |path, value| {
            let reference = value.trim();
            if registry.is_resolvable(reference) {
                entries.entry(reference.to_string()).or_default().push(path);
            }
        });
        Self { entries }
    }

    /// Number of distinct references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of indexed positions across all references.
    pub fn position_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Distinct reference strings in index order.
    pub fn references(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Positions carrying `reference`, in traversal order.
    pub fn positions(&self, reference: &str) -> &[NodePath] {
        self.entries
            .get(reference)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(reference, positions)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NodePath])> + '_ {
        self.entries
            .iter()
            .map(|(reference, positions)| (reference.as_str(), positions.as_slice()))
    }
}
