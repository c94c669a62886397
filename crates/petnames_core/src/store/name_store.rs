//! In-memory name (petname) store.

use crate::messaging::messenger::{ControllerMessenger, NAME_STATE_CHANGE_EVENT};
use crate::model::entry::normalize_identifier;
use crate::model::state::{NameEntry, NameState, SetNameRequest};
use crate::store::{NameStore, StoreError, StoreResult};
use parking_lot::Mutex;

/// Name store held in process memory.
///
/// Publishes the full state on the shared messenger after every change that
/// actually alters it, under `NAME_STATE_CHANGE_EVENT` unless told otherwise.
pub struct InMemoryNameStore {
    state: Mutex<NameState>,
    messenger: ControllerMessenger<NameState>,
    event_type: String,
}

impl InMemoryNameStore {
    pub fn new(messenger: ControllerMessenger<NameState>) -> Self {
        Self::with_state(NameState::default(), messenger)
    }

    /// Creates a store seeded with `state`, canonicalizing its keys.
    pub fn with_state(state: NameState, messenger: ControllerMessenger<NameState>) -> Self {
        let mut canonical = NameState::default();
        for (address, variations) in state.ethereum_address {
            let target = canonical
                .ethereum_address
                .entry(normalize_identifier(&address))
                .or_default();
            for (variation, entry) in variations {
                target.insert(normalize_identifier(&variation), entry);
            }
        }

        Self {
            state: Mutex::new(canonical),
            messenger,
            event_type: NAME_STATE_CHANGE_EVENT.to_string(),
        }
    }

    /// Publishes change notifications under `event_type` instead.
    ///
    /// Must match `BridgeConfig::name_state_event` of any bridge observing
    /// this store.
    pub fn publishing_on(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

impl NameStore for InMemoryNameStore {
    fn state(&self) -> NameState {
        self.state.lock().clone()
    }

    fn set_name(&self, request: SetNameRequest) -> StoreResult<()> {
        let value = normalize_identifier(request.value.trim());
        let variation = normalize_identifier(request.variation.trim());
        if value.is_empty() {
            return Err(StoreError::InvalidRequest(
                "name requests need a value".to_string(),
            ));
        }
        if variation.is_empty() {
            return Err(StoreError::InvalidRequest(
                "name requests need a variation".to_string(),
            ));
        }

        let snapshot = {
            let mut state = self.state.lock();
            let before = state.clone();
            match request.name.filter(|name| !name.is_empty()) {
                Some(name) => {
                    state
                        .ethereum_address
                        .entry(value)
                        .or_default()
                        .insert(
                            variation,
                            NameEntry {
                                name: Some(name),
                                source_id: request.source_id,
                            },
                        );
                }
                None => {
                    if let Some(variations) = state.ethereum_address.get_mut(&value) {
                        variations.remove(&variation);
                        if variations.is_empty() {
                            state.ethereum_address.remove(&value);
                        }
                    }
                }
            }
            if *state == before {
                return Ok(());
            }
            state.clone()
        };

        self.messenger.publish(&self.event_type, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryNameStore;
    use crate::messaging::messenger::{ControllerMessenger, NAME_STATE_CHANGE_EVENT};
    use crate::model::state::{NameState, NameType, SetNameRequest};
    use crate::store::{NameStore, StoreError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request(value: &str, variation: &str, name: Option<&str>) -> SetNameRequest {
        SetNameRequest {
            value: value.to_string(),
            name_type: NameType::EthereumAddress,
            name: name.map(str::to_string),
            source_id: None,
            variation: variation.to_string(),
        }
    }

    fn counting_store() -> (InMemoryNameStore, Arc<AtomicUsize>) {
        let bus: ControllerMessenger<NameState> = ControllerMessenger::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        bus.subscribe(NAME_STATE_CHANGE_EVENT, move |_: &NameState| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (InMemoryNameStore::new(bus), calls)
    }

    #[test]
    fn set_name_canonicalizes_and_publishes() {
        let (store, calls) = counting_store();
        store
            .set_name(request("0xABC", "0x1", Some("Alice")))
            .expect("set name");

        assert_eq!(store.state().name_of("0xabc", "0x1"), Some("Alice"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn null_name_removes_variation_and_empty_address() {
        let (store, calls) = counting_store();
        store
            .set_name(request("0xabc", "1", Some("Alice")))
            .expect("set name");
        store
            .set_name(request("0xabc", "1", None))
            .expect("delete name");

        assert!(store.state().ethereum_address.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unchanged_state_is_not_published() {
        let (store, calls) = counting_store();
        store
            .set_name(request("0xabc", "1", None))
            .expect("delete missing name");
        store
            .set_name(request("0xabc", "1", Some("Alice")))
            .expect("set name");
        store
            .set_name(request("0xabc", "1", Some("Alice")))
            .expect("set same name");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publishes_on_configured_event() {
        let bus: ControllerMessenger<NameState> = ControllerMessenger::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        bus.subscribe("Names:changed", move |_: &NameState| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let store = InMemoryNameStore::new(bus.clone()).publishing_on("Names:changed");

        store
            .set_name(request("0xabc", "1", Some("Alice")))
            .expect("set name");

        assert_eq!(store.event_type(), "Names:changed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.handler_count(NAME_STATE_CHANGE_EVENT), 0);
    }

    #[test]
    fn rejects_empty_value_or_variation() {
        let (store, _) = counting_store();
        let err = store
            .set_name(request(" ", "1", Some("Alice")))
            .expect_err("empty value");
        assert!(matches!(err, StoreError::InvalidRequest(_)));
        let err = store
            .set_name(request("0xabc", "", Some("Alice")))
            .expect_err("empty variation");
        assert!(matches!(err, StoreError::InvalidRequest(_)));
    }
}
