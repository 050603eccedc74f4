//! Watched titles collection.

use std::collections::HashMap;

use crate::model::{UserRating, WatchedEntry, WatchedSummary};

/// Insertion-ordered watched entries, unique by id, with an id index.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct WatchedCollection {
    /// Entries in insertion order.
    entries: Vec<WatchedEntry>,
    /// Position of each id in `entries`.
    index: HashMap<String, usize>,
}

impl WatchedCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry`, or replaces the entry with the same id in place.
    ///
    /// Returns `true` if the entry was new.
    pub fn add(&mut self, entry: WatchedEntry) -> bool {
        if let Some(slot) = self
            .index
            .get(&entry.id)
            .and_then(|&pos| self.entries.get_mut(pos))
        {
            *slot = entry;
            return false;
        }

        self.index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Removes the entry with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<WatchedEntry> {
        let pos = self.index.remove(id)?;
        if pos >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(pos);

        for (new_pos, entry) in self.entries.iter().enumerate().skip(pos) {
            if let Some(slot) = self.index.get_mut(&entry.id) {
                *slot = new_pos;
            }
        }
        Some(removed)
    }

    /// Returns `true` if `id` is watched.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the user's rating for `id`, if watched.
    #[must_use]
    pub fn rating_for(&self, id: &str) -> Option<UserRating> {
        self.get(id).map(|entry| entry.user_rating)
    }

    /// Returns the entry for `id`, if watched.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.index.get(id).and_then(|&pos| self.entries.get(pos))
    }

    /// Returns the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Computes the aggregate view. Means of an empty collection are 0.
    #[must_use]
    pub fn summary(&self) -> WatchedSummary {
        WatchedSummary {
            count: self.entries.len(),
            mean_catalog_rating: mean(self.entries.iter().map(|e| e.catalog_rating)),
            mean_user_rating: mean(
                self.entries
                    .iter()
                    .map(|e| f64::from(e.user_rating.get())),
            ),
            mean_runtime_minutes: mean(self.entries.iter().map(|e| f64::from(e.runtime_minutes))),
        }
    }
}

/// Arithmetic mean, 0 for no values.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), value| {
        (sum + value, count.saturating_add(1))
    });
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}
