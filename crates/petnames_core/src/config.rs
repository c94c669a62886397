//! Bridge configuration.
//!
//! # Invariants
//! - Every field is non-empty after `validate()` succeeds.

use crate::messaging::messenger::NAME_STATE_CHANGE_EVENT;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Source id the name store uses for ENS-resolved names.
pub const ENS_SOURCE_ID: &str = "ens";

/// Tunables for `AddressBookPetnamesBridge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Name `source_id` treated as ENS provenance in both directions.
    pub ens_source_id: String,
    /// Messenger event carrying name store state changes. The name store must
    /// publish under the same event (see `InMemoryNameStore::publishing_on`).
    pub name_state_event: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ens_source_id: ENS_SOURCE_ID.to_string(),
            name_state_event: NAME_STATE_CHANGE_EVENT.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ens_source_id.trim().is_empty() {
            return Err(ConfigError::EmptyField("ens_source_id"));
        }
        if self.name_state_event.trim().is_empty() {
            return Err(ConfigError::EmptyField("name_state_event"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyField(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "bridge config field `{field}` cannot be empty"),
        }
    }
}

impl Error for ConfigError {}
