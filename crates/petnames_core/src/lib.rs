//! Address book <-> petnames reconciliation core.
//!
//! Keeps a wallet's address book and its petname store in agreement: a change
//! in either store is diffed against the bridge's last view of the other one
//! and replayed there.

pub mod config;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod store;
pub mod sync;

pub use config::{BridgeConfig, ConfigError, ENS_SOURCE_ID};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use messaging::messenger::{
    ControllerMessenger, EventHandler, MessengerError, RestrictedMessenger,
    NAME_STATE_CHANGE_EVENT,
};
pub use model::entry::{normalize_identifier, Entry};
pub use model::state::{
    AddressBookEntry, AddressBookState, NameEntry, NameState, NameType, SetNameRequest,
};
pub use store::address_book::InMemoryAddressBook;
pub use store::name_store::InMemoryNameStore;
pub use store::{
    AddressBookListener, AddressBookStore, NameStore, StoreError, StoreResult, SubscriptionId,
};
pub use sync::bridge::{AddressBookPetnamesBridge, BridgeStats, SyncOutcome, BRIDGE_MESSENGER_NAME};
pub use sync::diff::{group_entries, EntryGroups};
pub use sync::extract::{address_book_entries, petname_entries};
pub use sync::{BridgeError, BridgeResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
