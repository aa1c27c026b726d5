use tracing::debug;

use crate::search::filter;

/// Labels a fresh store starts with
pub const SEED_LABELS: &[&str] = &["Norwegian Kroner", "Swedish Kronor"];

/// An ordered, in-memory list of labels (e.g. currency names).
///
/// Entries are addressed by label, never by index: a filtered view has
/// different indices than the store, so removal looks the label up again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelStore {
    items: Vec<String>,
}

impl LabelStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a store holding [`SEED_LABELS`]
    pub fn with_seed() -> Self {
        let mut store = Self::new();
        for label in SEED_LABELS {
            store.add(label);
        }
        store
    }

    /// Appends `value` after trimming it. Blank input is ignored and
    /// reported as `false`. Duplicates are kept.
    pub fn add(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        debug!("Adding label {:?}", value);
        self.items.push(value.to_string());
        true
    }

    /// Removes the first entry equal to `label` ignoring case.
    pub fn remove(&mut self, label: &str) -> bool {
        let wanted = label.to_lowercase();
        match self.items.iter().position(|x| x.to_lowercase() == wanted) {
            Some(index) => {
                let removed = self.items.remove(index);
                debug!("Removed label {:?}", removed);
                true
            }
            None => false,
        }
    }

    /// Entries whose label contains the trimmed `query`; all of them for a
    /// blank query.
    pub fn search(&self, query: &str) -> Vec<String> {
        filter(&self.items, query.trim())
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
