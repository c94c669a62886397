//! Reconciliation between the address book and the name store.
//!
//! # Responsibility
//! - Flatten both store states into normalized entries.
//! - Diff them and apply adds, updates and deletes to the opposite store.
//! - Keep the two change handlers from interleaving or feeding back.
//!
//! # Invariants
//! - At most one reconciliation pass runs at a time.
//! - Store write errors reach the caller unchanged; applied writes are not
//!   rolled back.

use crate::config::ConfigError;
use crate::messaging::messenger::MessengerError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bridge;
pub mod diff;
pub mod extract;
pub mod gate;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    Store(StoreError),
    Messenger(MessengerError),
    Config(ConfigError),
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Messenger(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Messenger(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<StoreError> for BridgeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<MessengerError> for BridgeError {
    fn from(value: MessengerError) -> Self {
        Self::Messenger(value)
    }
}

impl From<ConfigError> for BridgeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Lets store subscribers hand bridge failures back to the writing store.
impl From<BridgeError> for StoreError {
    fn from(value: BridgeError) -> Self {
        match value {
            BridgeError::Store(err) => err,
            other => StoreError::Listener(other.to_string()),
        }
    }
}
