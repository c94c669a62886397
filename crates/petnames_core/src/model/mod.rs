//! Domain model shared by the stores and the reconciliation bridge.
//!
//! # Responsibility
//! - Define the typed state shapes exposed by the address-book and name stores.
//! - Define the normalized `Entry` used as common currency for diffing.
//!
//! # Invariants
//! - Identifiers inside an `Entry` are always lowercase.
//! - Entries with an empty name are never materialized.

pub mod entry;
pub mod state;
