//! Flattening of store states into normalized entries.

use crate::model::entry::Entry;
use crate::model::state::{AddressBookState, NameState};

/// Flattens name store state: address, then chain-id variation.
///
/// Entries without a non-empty name are skipped. `is_ens` is set when the
/// entry's source id equals `ens_source_id`.
pub fn petname_entries(state: &NameState, ens_source_id: &str) -> Vec<Entry> {
    let mut entries = Vec::new();

    for (address, variations) in &state.ethereum_address {
        for (chain_id, record) in variations {
            let Some(name) = record.name.as_deref() else {
                continue;
            };
            let is_ens = record.source_id.as_deref() == Some(ens_source_id);
            if let Some(entry) = Entry::normalized(address, name, chain_id, is_ens) {
                entries.push(entry);
            }
        }
    }

    entries
}

/// Flattens address-book state: chain id, then address.
///
/// Entries with an empty name or address are skipped. The stored `is_ens`
/// flag is carried through.
pub fn address_book_entries(state: &AddressBookState) -> Vec<Entry> {
    let mut entries = Vec::new();

    for (chain_id, records) in &state.address_book {
        for (address, record) in records {
            if address.is_empty() {
                continue;
            }
            if let Some(entry) = Entry::normalized(address, &record.name, chain_id, record.is_ens)
            {
                entries.push(entry);
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::{address_book_entries, petname_entries};
    use crate::model::state::{AddressBookEntry, AddressBookState, NameEntry, NameState};

    fn name_state(records: &[(&str, &str, Option<&str>, Option<&str>)]) -> NameState {
        let mut state = NameState::default();
        for (address, chain_id, name, source_id) in records {
            state
                .ethereum_address
                .entry(address.to_string())
                .or_default()
                .insert(
                    chain_id.to_string(),
                    NameEntry {
                        name: name.map(str::to_string),
                        source_id: source_id.map(str::to_string),
                    },
                );
        }
        state
    }

    #[test]
    fn petname_entries_normalize_and_flag_ens() {
        let state = name_state(&[
            ("0xABC", "0xA", Some("Alice"), Some("ens")),
            ("0xDEF", "1", Some("Bob"), Some("lens")),
        ]);

        let entries = petname_entries(&state, "ens");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].address, "0xabc");
        assert_eq!(entries[0].chain_id, "0xa");
        assert!(entries[0].is_ens);
        assert!(!entries[1].is_ens);
    }

    #[test]
    fn petname_entries_skip_missing_and_empty_names() {
        let state = name_state(&[
            ("0xabc", "1", None, None),
            ("0xabc", "5", Some(""), None),
        ]);
        assert!(petname_entries(&state, "ens").is_empty());
    }

    #[test]
    fn petname_entries_keep_empty_address_keys() {
        let state = name_state(&[("", "1", Some("Nobody"), None)]);

        let entries = petname_entries(&state, "ens");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, "");
        assert_eq!(entries[0].name, "Nobody");
    }

    #[test]
    fn address_book_entries_skip_empty_name_or_address() {
        let mut state = AddressBookState::default();
        let chain = state.address_book.entry("1".to_string()).or_default();
        for (address, name, is_ens) in [("0xABC", "Alice", true), ("0xdef", "", false), ("", "Ghost", false)]
        {
            chain.insert(
                address.to_string(),
                AddressBookEntry {
                    address: address.to_string(),
                    name: name.to_string(),
                    chain_id: "1".to_string(),
                    memo: String::new(),
                    is_ens,
                },
            );
        }

        let entries = address_book_entries(&state);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, "0xabc");
        assert_eq!(entries[0].name, "Alice");
        assert!(entries[0].is_ens);
    }
}
