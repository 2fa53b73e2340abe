//! Version histogram
//!
//! Counts are unsigned and a version is dropped as soon as its count reaches
//! zero, so every stored entry has a count of at least one.

use rpc_core::BlockVersion;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionHistogram {
    counts: BTreeMap<BlockVersion, u64>,
}

impl VersionHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, version: BlockVersion) {
        *self.counts.entry(version).or_insert(0) += 1;
    }

    /// Remove one block of `version`. Returns false, leaving the histogram
    /// untouched, if no block of that version is counted.
    #[must_use]
    pub fn decrement(&mut self, version: BlockVersion) -> bool {
        match self.counts.get_mut(&version) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(&version);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, version: BlockVersion) -> u64 {
        self.counts.get(&version).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct versions.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockVersion, u64)> + '_ {
        self.counts.iter().map(|(version, count)| (*version, *count))
    }
}

impl FromIterator<BlockVersion> for VersionHistogram {
    fn from_iter<I: IntoIterator<Item = BlockVersion>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for version in iter {
            histogram.increment(version);
        }
        histogram
    }
}
