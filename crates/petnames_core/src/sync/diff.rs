//! Entry grouping between two snapshots.
//!
//! Identity is the normalized address alone. Two entries for one address on
//! different chains count as the same identity here even though both stores
//! key records by chain and address. This mirrors the wallet's existing sync
//! behaviour and is kept until a product decision says otherwise.

use crate::model::entry::Entry;

/// Result of comparing an old entry list with a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryGroups {
    /// In `new`, address absent from `old`.
    pub added: Vec<Entry>,
    /// In `new`, address present in `old` under a different name.
    pub updated: Vec<Entry>,
    /// In `old`, address absent from `new`.
    pub deleted: Vec<Entry>,
}

impl EntryGroups {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Added entries followed by updated ones, the order writes are applied in.
    pub fn upserts(&self) -> impl Iterator<Item = &Entry> {
        self.added.iter().chain(self.updated.iter())
    }
}

/// Groups `new_entries` against `old_entries`.
///
/// Quadratic in the list sizes; address books and petname lists stay small.
pub fn group_entries(old_entries: &[Entry], new_entries: &[Entry]) -> EntryGroups {
    let added = new_entries
        .iter()
        .filter(|new| !old_entries.iter().any(|old| old.address == new.address))
        .cloned()
        .collect();

    let updated = new_entries
        .iter()
        .filter(|new| {
            old_entries
                .iter()
                .any(|old| old.address == new.address && old.name != new.name)
        })
        .cloned()
        .collect();

    let deleted = old_entries
        .iter()
        .filter(|old| !new_entries.iter().any(|new| new.address == old.address))
        .cloned()
        .collect();

    EntryGroups {
        added,
        updated,
        deleted,
    }
}
