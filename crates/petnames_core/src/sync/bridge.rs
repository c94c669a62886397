//! Address book <-> petnames reconciliation bridge.
//!
//! # Responsibility
//! - Observe change notifications from both stores.
//! - Propagate adds, updates and deletes into the opposite store.
//!
//! # Invariants
//! - Both handlers share one `SyncGate`; a write made by one handler never
//!   re-runs the other handler's body.
//! - Cached snapshots are replaced wholesale, never edited in place.
//! - A failed write aborts the pass; earlier writes stay applied.

use crate::config::BridgeConfig;
use crate::messaging::messenger::RestrictedMessenger;
use crate::model::entry::Entry;
use crate::model::state::{AddressBookState, NameState, NameType, SetNameRequest};
use crate::store::{AddressBookStore, NameStore, StoreError, StoreResult, SubscriptionId};
use crate::sync::diff::{group_entries, EntryGroups};
use crate::sync::extract::{address_book_entries, petname_entries};
use crate::sync::gate::SyncGate;
use crate::sync::BridgeResult;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use std::sync::Arc;

/// Messenger name the bridge registers under.
pub const BRIDGE_MESSENGER_NAME: &str = "AddressBookPetnamesBridge";

/// What a handler invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another pass held the gate on this thread; nothing ran.
    Suppressed,
    /// The pass ran and applied these groups.
    Applied(EntryGroups),
}

impl SyncOutcome {
    pub fn groups(&self) -> Option<&EntryGroups> {
        match self {
            Self::Suppressed => None,
            Self::Applied(groups) => Some(groups),
        }
    }
}

/// Counters for handler bodies that ran or were suppressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub petname_passes: u64,
    pub address_book_passes: u64,
    pub suppressed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    PetnamesToAddressBook,
    AddressBookToPetnames,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::PetnamesToAddressBook => "petnames_to_address_book",
            Self::AddressBookToPetnames => "address_book_to_petnames",
        }
    }
}

struct Snapshots {
    address_book: AddressBookState,
    names: NameState,
}

#[derive(Default)]
struct Subscriptions {
    address_book: Option<SubscriptionId>,
    names: Option<SubscriptionId>,
}

#[derive(Default)]
struct Counters {
    petname_passes: AtomicU64,
    address_book_passes: AtomicU64,
    suppressed: AtomicU64,
}

/// Keeps the address book and the name store in agreement.
pub struct AddressBookPetnamesBridge {
    address_book: Arc<dyn AddressBookStore>,
    name_store: Arc<dyn NameStore>,
    messenger: RestrictedMessenger<NameState>,
    config: BridgeConfig,
    snapshots: Mutex<Snapshots>,
    gate: SyncGate,
    counters: Counters,
    subscriptions: Mutex<Subscriptions>,
}

impl AddressBookPetnamesBridge {
    /// Captures both stores' current state as the initial snapshots.
    ///
    /// # Errors
    /// - Returns `BridgeError::Config` when `config` does not validate.
    pub fn new(
        address_book: Arc<dyn AddressBookStore>,
        name_store: Arc<dyn NameStore>,
        messenger: RestrictedMessenger<NameState>,
        config: BridgeConfig,
    ) -> BridgeResult<Self> {
        config.validate()?;
        let snapshots = Snapshots {
            address_book: address_book.state(),
            names: name_store.state(),
        };

        Ok(Self {
            address_book,
            name_store,
            messenger,
            config,
            snapshots: Mutex::new(snapshots),
            gate: SyncGate::new(),
            counters: Counters::default(),
            subscriptions: Mutex::new(Subscriptions::default()),
        })
    }

    /// Subscribes to both stores. Calling it again is a no-op.
    ///
    /// Subscriptions hold a weak reference, so dropping the last `Arc` of the
    /// bridge silences it even without `detach`.
    ///
    /// # Errors
    /// - Returns `BridgeError::Messenger` when the messenger does not allow the
    ///   configured name state event. No subscription is left behind.
    pub fn init(self: &Arc<Self>) -> BridgeResult<()> {
        let mut subscriptions = self.subscriptions.lock();
        if subscriptions.address_book.is_some() {
            return Ok(());
        }

        let weak = Arc::downgrade(self);
        let address_book_id =
            self.address_book
                .subscribe(Arc::new(move |state: &AddressBookState| -> StoreResult<()> {
                    match weak.upgrade() {
                        Some(bridge) => bridge
                            .on_address_book_state_change(state)
                            .map(|_| ())
                            .map_err(StoreError::from),
                        None => Ok(()),
                    }
                }));

        let weak = Arc::downgrade(self);
        let names_id = match self.messenger.subscribe(
            &self.config.name_state_event,
            move |state: &NameState| -> StoreResult<()> {
                match weak.upgrade() {
                    Some(bridge) => bridge
                        .on_petname_state_change(state)
                        .map(|_| ())
                        .map_err(StoreError::from),
                    None => Ok(()),
                }
            },
        ) {
            Ok(id) => id,
            Err(err) => {
                self.address_book.unsubscribe(address_book_id);
                warn!(
                    "event=bridge_init module=bridge status=error messenger={} error={}",
                    self.messenger.name(),
                    err
                );
                return Err(err.into());
            }
        };

        subscriptions.address_book = Some(address_book_id);
        subscriptions.names = Some(names_id);
        info!(
            "event=bridge_init module=bridge status=ok messenger={} name_event={}",
            self.messenger.name(),
            self.config.name_state_event
        );
        Ok(())
    }

    /// Removes both subscriptions. Returns whether the bridge was attached.
    pub fn detach(&self) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let mut attached = false;
        if let Some(id) = subscriptions.address_book.take() {
            attached |= self.address_book.unsubscribe(id);
        }
        if let Some(id) = subscriptions.names.take() {
            attached |= self.messenger.unsubscribe(id);
        }
        if attached {
            info!("event=bridge_detach module=bridge status=ok");
        }
        attached
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.lock().address_book.is_some()
    }

    /// Propagates a name store change into the address book.
    ///
    /// The new petnames are diffed against the cached address-book snapshot.
    /// When the pass had to wait for another thread's pass, the live name
    /// store state replaces `new_state`, which predates that pass's writes.
    pub fn on_petname_state_change(&self, new_state: &NameState) -> BridgeResult<SyncOutcome> {
        let Some(guard) = self.gate.enter() else {
            return Ok(self.suppress(Direction::PetnamesToAddressBook));
        };
        self.counters.petname_passes.fetch_add(1, Ordering::Relaxed);

        let live = guard.waited().then(|| self.name_store.state());
        if live.is_some() {
            log_stale_payload(Direction::PetnamesToAddressBook);
        }
        let new_state = live.as_ref().unwrap_or(new_state);

        let baseline = self.snapshots.lock().address_book.clone();
        let new_entries = petname_entries(new_state, &self.config.ens_source_id);
        let old_entries = address_book_entries(&baseline);
        let groups = group_entries(&old_entries, &new_entries);

        for entry in groups.upserts() {
            self.address_book
                .set(&entry.chain_id, &entry.address, &entry.name, entry.is_ens)
                .inspect_err(|err| log_write_failure(Direction::PetnamesToAddressBook, entry, err))?;
            debug!(
                "event=address_book_upsert module=bridge status=ok {}",
                entry
            );
        }

        for entry in &groups.deleted {
            self.address_book
                .delete(&entry.chain_id, &entry.address)
                .inspect_err(|err| log_write_failure(Direction::PetnamesToAddressBook, entry, err))?;
            debug!(
                "event=address_book_delete module=bridge status=ok {}",
                entry
            );
        }

        {
            let mut snapshots = self.snapshots.lock();
            snapshots.names = new_state.clone();
            if !groups.is_empty() {
                snapshots.address_book = self.address_book.state();
            }
        }

        log_pass(Direction::PetnamesToAddressBook, &groups);
        Ok(SyncOutcome::Applied(groups))
    }

    /// Propagates an address-book change into the name store.
    ///
    /// The new address-book entries are diffed against the cached name
    /// snapshot. A pass that waited for another thread diffs the live
    /// address-book state instead of `new_state`.
    pub fn on_address_book_state_change(
        &self,
        new_state: &AddressBookState,
    ) -> BridgeResult<SyncOutcome> {
        let Some(guard) = self.gate.enter() else {
            return Ok(self.suppress(Direction::AddressBookToPetnames));
        };
        self.counters
            .address_book_passes
            .fetch_add(1, Ordering::Relaxed);

        let live = guard.waited().then(|| self.address_book.state());
        if live.is_some() {
            log_stale_payload(Direction::AddressBookToPetnames);
        }
        let new_state = live.as_ref().unwrap_or(new_state);

        let baseline = self.snapshots.lock().names.clone();
        let new_entries = address_book_entries(new_state);
        let old_entries = petname_entries(&baseline, &self.config.ens_source_id);
        let groups = group_entries(&old_entries, &new_entries);

        for entry in groups.upserts() {
            let source_id = entry.is_ens.then(|| self.config.ens_source_id.clone());
            self.name_store
                .set_name(name_request(entry, Some(entry.name.clone()), source_id))
                .inspect_err(|err| log_write_failure(Direction::AddressBookToPetnames, entry, err))?;
            debug!("event=petname_upsert module=bridge status=ok {}", entry);
        }

        for entry in &groups.deleted {
            self.name_store
                .set_name(name_request(entry, None, None))
                .inspect_err(|err| log_write_failure(Direction::AddressBookToPetnames, entry, err))?;
            debug!("event=petname_delete module=bridge status=ok {}", entry);
        }

        {
            let mut snapshots = self.snapshots.lock();
            snapshots.address_book = new_state.clone();
            if !groups.is_empty() {
                snapshots.names = self.name_store.state();
            }
        }

        log_pass(Direction::AddressBookToPetnames, &groups);
        Ok(SyncOutcome::Applied(groups))
    }

    pub fn last_known_address_book_state(&self) -> AddressBookState {
        self.snapshots.lock().address_book.clone()
    }

    pub fn last_known_name_state(&self) -> NameState {
        self.snapshots.lock().names.clone()
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            petname_passes: self.counters.petname_passes.load(Ordering::Relaxed),
            address_book_passes: self.counters.address_book_passes.load(Ordering::Relaxed),
            suppressed: self.counters.suppressed.load(Ordering::Relaxed),
        }
    }

    fn suppress(&self, direction: Direction) -> SyncOutcome {
        self.counters.suppressed.fetch_add(1, Ordering::Relaxed);
        debug!(
            "event=sync_suppressed module=bridge direction={}",
            direction.as_str()
        );
        SyncOutcome::Suppressed
    }
}

fn name_request(entry: &Entry, name: Option<String>, source_id: Option<String>) -> SetNameRequest {
    SetNameRequest {
        value: entry.address.clone(),
        name_type: NameType::EthereumAddress,
        name,
        source_id,
        variation: entry.chain_id.clone(),
    }
}

fn log_write_failure(direction: Direction, entry: &Entry, err: &StoreError) {
    warn!(
        "event=sync_write module=bridge status=error direction={} {} error={}",
        direction.as_str(),
        entry,
        err
    );
}

fn log_stale_payload(direction: Direction) {
    debug!(
        "event=sync_payload_refreshed module=bridge direction={}",
        direction.as_str()
    );
}

fn log_pass(direction: Direction, groups: &EntryGroups) {
    debug!(
        "event=sync_pass module=bridge status=ok direction={} added={} updated={} deleted={}",
        direction.as_str(),
        groups.added.len(),
        groups.updated.len(),
        groups.deleted.len()
    );
}
