//! Typed state shapes published by the two stores.
//!
//! Both stores hand out full snapshots on every change. The shapes mirror the
//! JSON layout used by the wallet so snapshots can be loaded from disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain id -> address -> entry.
pub type ChainBook = BTreeMap<String, BTreeMap<String, AddressBookEntry>>;

/// Address -> chain-id variation -> entry.
pub type NameBook = BTreeMap<String, BTreeMap<String, NameEntry>>;

/// One address-book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBookEntry {
    pub address: String,
    pub name: String,
    pub chain_id: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub is_ens: bool,
}

/// Full address-book store state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBookState {
    #[serde(default)]
    pub address_book: ChainBook,
}

impl AddressBookState {
    /// Returns the record stored for `(chain_id, address)`, matching exactly.
    pub fn get(&self, chain_id: &str, address: &str) -> Option<&AddressBookEntry> {
        self.address_book.get(chain_id)?.get(address)
    }

    /// Total number of records across all chains.
    pub fn len(&self) -> usize {
        self.address_book.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kind of value a name is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameType {
    EthereumAddress,
}

/// One petname record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameEntry {
    /// `None` or empty means no name is assigned.
    #[serde(default)]
    pub name: Option<String>,
    /// Where the name came from, e.g. `ens`.
    #[serde(default)]
    pub source_id: Option<String>,
}

/// Full name store state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameState {
    #[serde(default)]
    pub ethereum_address: NameBook,
}

impl NameState {
    /// Returns the record stored for `(address, variation)`, matching exactly.
    pub fn get(&self, address: &str, variation: &str) -> Option<&NameEntry> {
        self.ethereum_address.get(address)?.get(variation)
    }

    /// Returns the assigned name for `(address, variation)`, if non-empty.
    pub fn name_of(&self, address: &str, variation: &str) -> Option<&str> {
        self.get(address, variation)?
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

/// Upsert/delete request accepted by the name store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetNameRequest {
    pub value: String,
    pub name_type: NameType,
    /// `None` deletes the name.
    pub name: Option<String>,
    pub source_id: Option<String>,
    pub variation: String,
}

#[cfg(test)]
mod tests {
    use super::{AddressBookState, NameState};

    #[test]
    fn address_book_state_reads_camel_case_json() {
        let state: AddressBookState = serde_json::from_str(
            r#"{"addressBook":{"1":{"0xabc":{"address":"0xabc","name":"Alice","chainId":"1","isEns":true}}}}"#,
        )
        .expect("address book json");

        let entry = state.get("1", "0xabc").expect("entry");
        assert_eq!(entry.name, "Alice");
        assert!(entry.is_ens);
        assert_eq!(entry.memo, "");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn name_state_treats_null_and_empty_names_as_absent() {
        let state: NameState = serde_json::from_str(
            r#"{"ethereumAddress":{"0xabc":{"1":{"name":null},"5":{"name":""},"10":{"name":"Bob","sourceId":"ens"}}}}"#,
        )
        .expect("name json");

        assert_eq!(state.name_of("0xabc", "1"), None);
        assert_eq!(state.name_of("0xabc", "5"), None);
        assert_eq!(state.name_of("0xabc", "10"), Some("Bob"));
        assert_eq!(
            state.get("0xabc", "10").and_then(|e| e.source_id.as_deref()),
            Some("ens")
        );
    }
}
