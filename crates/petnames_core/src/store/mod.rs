//! Store contracts consumed by the reconciliation bridge, plus in-memory
//! implementations.
//!
//! # Responsibility
//! - Define the address-book and name store boundaries the bridge writes to.
//! - Provide a shared store error type that passes through the bridge unchanged.
//!
//! # Invariants
//! - Subscribers receive the full state after every change, synchronously, on
//!   the writing thread.
//! - Store locks are never held while subscribers run.

use crate::model::state::{AddressBookState, NameState, SetNameRequest};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

pub mod address_book;
pub mod name_store;

/// Handle returned by every subscribe call, used to unsubscribe.
pub type SubscriptionId = Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Callback invoked with the full address-book state after each change.
pub type AddressBookListener = Arc<dyn Fn(&AddressBookState) -> StoreResult<()> + Send + Sync>;

/// Errors raised by store writes and by subscribers running inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused the write.
    WriteRejected(String),
    /// The request is malformed (empty identifiers and similar).
    InvalidRequest(String),
    /// A subscriber failed while handling a change notification.
    Listener(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteRejected(message) => write!(f, "store write rejected: {message}"),
            Self::InvalidRequest(message) => write!(f, "invalid store request: {message}"),
            Self::Listener(message) => write!(f, "store listener failed: {message}"),
        }
    }
}

impl Error for StoreError {}

/// Address-book store boundary.
pub trait AddressBookStore: Send + Sync {
    /// Returns a snapshot of the current state.
    fn state(&self) -> AddressBookState;

    fn subscribe(&self, listener: AddressBookListener) -> SubscriptionId;

    /// Returns whether a subscription was removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Inserts or replaces the record for `(chain_id, address)`.
    fn set(&self, chain_id: &str, address: &str, name: &str, is_ens: bool) -> StoreResult<()>;

    /// Removes the record for `(chain_id, address)`.
    ///
    /// Returns whether a record was removed.
    fn delete(&self, chain_id: &str, address: &str) -> StoreResult<bool>;
}

/// Name store boundary. Change notifications travel through the messenger.
pub trait NameStore: Send + Sync {
    /// Returns a snapshot of the current state.
    fn state(&self) -> NameState;

    /// Upserts a name, or deletes it when `request.name` is `None`.
    fn set_name(&self, request: SetNameRequest) -> StoreResult<()>;
}
