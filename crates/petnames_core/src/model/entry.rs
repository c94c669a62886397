//! Normalized reconciliation entry.
//!
//! # Invariants
//! - `address` and `chain_id` are lowercase.
//! - `name` is non-empty.

use std::fmt::{Display, Formatter};

/// One name binding for an address on a chain, in the form both stores are
/// reduced to before diffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub address: String,
    pub name: String,
    pub chain_id: String,
    /// True when the name came from ENS resolution.
    pub is_ens: bool,
}

impl Entry {
    /// Builds an entry, normalizing both identifiers.
    ///
    /// Returns `None` when `name` is empty, since such entries stand for
    /// absence in both stores.
    pub fn normalized(address: &str, name: &str, chain_id: &str, is_ens: bool) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        Some(Self {
            address: normalize_identifier(address),
            name: name.to_string(),
            chain_id: normalize_identifier(chain_id),
            is_ens,
        })
    }
}

/// Metadata-only rendering used in diagnostics. Names are user data and are
/// left out.
impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "address={} chain_id={} is_ens={}",
            self.address, self.chain_id, self.is_ens
        )
    }
}

/// Lowercases an address or chain identifier.
pub fn normalize_identifier(value: &str) -> String {
    value.to_lowercase()
}
