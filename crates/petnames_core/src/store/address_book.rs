//! In-memory address-book store.

use crate::model::entry::normalize_identifier;
use crate::model::state::{AddressBookEntry, AddressBookState};
use crate::store::{AddressBookListener, AddressBookStore, StoreError, StoreResult, SubscriptionId};
use parking_lot::Mutex;
use uuid::Uuid;

/// Address book held in process memory.
///
/// Chain ids and addresses are stored lowercase, so writes and deletes match
/// regardless of the caller's letter case.
#[derive(Default)]
pub struct InMemoryAddressBook {
    state: Mutex<AddressBookState>,
    listeners: Mutex<Vec<(SubscriptionId, AddressBookListener)>>,
}

impl InMemoryAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `state`, canonicalizing its keys.
    pub fn with_state(state: AddressBookState) -> Self {
        let mut canonical = AddressBookState::default();
        for (chain_id, entries) in state.address_book {
            let chain_id = normalize_identifier(&chain_id);
            let chain = canonical.address_book.entry(chain_id.clone()).or_default();
            for (address, mut entry) in entries {
                let address = normalize_identifier(&address);
                entry.address = address.clone();
                entry.chain_id = chain_id.clone();
                chain.insert(address, entry);
            }
        }

        Self {
            state: Mutex::new(canonical),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn notify(&self) -> StoreResult<()> {
        let snapshot = self.state.lock().clone();
        let listeners: Vec<AddressBookListener> = self.listeners.lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(&snapshot)?;
        }
        Ok(())
    }
}

impl AddressBookStore for InMemoryAddressBook {
    fn state(&self) -> AddressBookState {
        self.state.lock().clone()
    }

    fn subscribe(&self, listener: AddressBookListener) -> SubscriptionId {
        let id = Uuid::new_v4();
        self.listeners.lock().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn set(&self, chain_id: &str, address: &str, name: &str, is_ens: bool) -> StoreResult<()> {
        let chain_id = normalize_identifier(chain_id.trim());
        let address = normalize_identifier(address.trim());
        if chain_id.is_empty() || address.is_empty() {
            return Err(StoreError::InvalidRequest(
                "address book entries need a chain id and an address".to_string(),
            ));
        }

        {
            let mut state = self.state.lock();
            let chain = state.address_book.entry(chain_id.clone()).or_default();
            let memo = chain
                .get(&address)
                .map(|existing| existing.memo.clone())
                .unwrap_or_default();
            chain.insert(
                address.clone(),
                AddressBookEntry {
                    address,
                    name: name.to_string(),
                    chain_id,
                    memo,
                    is_ens,
                },
            );
        }

        self.notify()
    }

    fn delete(&self, chain_id: &str, address: &str) -> StoreResult<bool> {
        let chain_id = normalize_identifier(chain_id.trim());
        let address = normalize_identifier(address.trim());

        let removed = {
            let mut state = self.state.lock();
            let Some(chain) = state.address_book.get_mut(&chain_id) else {
                return Ok(false);
            };
            let removed = chain.remove(&address).is_some();
            if chain.is_empty() {
                state.address_book.remove(&chain_id);
            }
            removed
        };

        if removed {
            self.notify()?;
        }
        Ok(removed)
    }
}
