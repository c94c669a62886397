//! In-process controller messenger and its restricted views.

use crate::store::{StoreResult, SubscriptionId};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Event type published by the name store after every change.
pub const NAME_STATE_CHANGE_EVENT: &str = "NameController:stateChange";

/// Callback invoked with the event payload.
pub type EventHandler<P> = Arc<dyn Fn(&P) -> StoreResult<()> + Send + Sync>;

/// Messenger usage errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessengerError {
    EventNotAllowed { messenger: String, event: String },
}

impl Display for MessengerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotAllowed { messenger, event } => {
                write!(f, "event `{event}` is not allowed for messenger `{messenger}`")
            }
        }
    }
}

impl Error for MessengerError {}

struct Subscription<P> {
    id: SubscriptionId,
    event_type: String,
    handler: EventHandler<P>,
}

/// Shared event bus. Clones share one subscription table.
pub struct ControllerMessenger<P> {
    subscriptions: Arc<Mutex<Vec<Subscription<P>>>>,
}

impl<P> Clone for ControllerMessenger<P> {
    fn clone(&self) -> Self {
        Self {
            subscriptions: self.subscriptions.clone(),
        }
    }
}

impl<P> Default for ControllerMessenger<P> {
    fn default() -> Self {
        Self {
            subscriptions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<P> ControllerMessenger<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type`.
    pub fn subscribe<F>(&self, event_type: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&P) -> StoreResult<()> + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.subscriptions.lock().push(Subscription {
            id,
            event_type: event_type.to_string(),
            handler: Arc::new(handler),
        });
        id
    }

    /// Returns whether a subscription was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        subscriptions.len() != before
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.subscriptions.lock()
            .iter()
            .filter(|subscription| subscription.event_type == event_type)
            .count()
    }

    /// Delivers `payload` to every handler of `event_type`.
    ///
    /// Stops at and returns the first handler error.
    pub fn publish(&self, event_type: &str, payload: &P) -> StoreResult<()> {
        let handlers: Vec<EventHandler<P>> = self.subscriptions.lock()
            .iter()
            .filter(|subscription| subscription.event_type == event_type)
            .map(|subscription| subscription.handler.clone())
            .collect();

        for handler in handlers {
            handler(payload)?;
        }
        Ok(())
    }

    /// Returns a view that may only subscribe to `allowed_events`.
    pub fn restricted(&self, name: &str, allowed_events: &[&str]) -> RestrictedMessenger<P> {
        RestrictedMessenger {
            name: name.to_string(),
            allowed_events: allowed_events
                .iter()
                .map(|event| event.to_string())
                .collect(),
            bus: self.clone(),
        }
    }
}

/// Named view over a `ControllerMessenger` limited to declared events.
pub struct RestrictedMessenger<P> {
    name: String,
    allowed_events: BTreeSet<String>,
    bus: ControllerMessenger<P>,
}

impl<P> RestrictedMessenger<P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_allowed(&self, event_type: &str) -> bool {
        self.allowed_events.contains(event_type)
    }

    pub fn subscribe<F>(&self, event_type: &str, handler: F) -> Result<SubscriptionId, MessengerError>
    where
        F: Fn(&P) -> StoreResult<()> + Send + Sync + 'static,
    {
        if !self.is_allowed(event_type) {
            return Err(MessengerError::EventNotAllowed {
                messenger: self.name.clone(),
                event: event_type.to_string(),
            });
        }
        Ok(self.bus.subscribe(event_type, handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ControllerMessenger, MessengerError};
    use crate::store::StoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn publish_reaches_only_matching_handlers() {
        let bus: ControllerMessenger<u32> = ControllerMessenger::new();
        let total = Arc::new(AtomicUsize::new(0));

        let seen = total.clone();
        bus.subscribe("a", move |value: &u32| {
            seen.fetch_add(*value as usize, Ordering::SeqCst);
            Ok(())
        });
        bus.subscribe("b", |_: &u32| Err(StoreError::Listener("wrong".to_string())));

        bus.publish("a", &7).expect("publish");
        assert_eq!(total.load(Ordering::SeqCst), 7);
        assert_eq!(bus.handler_count("a"), 1);
    }

    #[test]
    fn publish_returns_first_handler_error() {
        let bus: ControllerMessenger<()> = ControllerMessenger::new();
        let after = Arc::new(AtomicUsize::new(0));
        bus.subscribe("a", |_: &()| Err(StoreError::Listener("first".to_string())));
        let seen = after.clone();
        bus.subscribe("a", move |_: &()| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let err = bus.publish("a", &()).expect_err("handler error");
        assert_eq!(err, StoreError::Listener("first".to_string()));
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_may_subscribe_while_publishing() {
        let bus: ControllerMessenger<()> = ControllerMessenger::new();
        let inner = bus.clone();
        bus.subscribe("a", move |_: &()| {
            inner.subscribe("b", |_: &()| Ok(()));
            Ok(())
        });

        bus.publish("a", &()).expect("publish");
        assert_eq!(bus.handler_count("b"), 1);
    }

    #[test]
    fn restricted_messenger_rejects_undeclared_events() {
        let bus: ControllerMessenger<()> = ControllerMessenger::new();
        let restricted = bus.restricted("Bridge", &["allowed"]);

        let err = restricted
            .subscribe("other", |_: &()| Ok(()))
            .expect_err("undeclared event must fail");
        assert!(matches!(err, MessengerError::EventNotAllowed { ref event, .. } if event == "other"));

        let id = restricted
            .subscribe("allowed", |_: &()| Ok(()))
            .expect("declared event");
        assert_eq!(bus.handler_count("allowed"), 1);
        assert!(restricted.unsubscribe(id));
        assert_eq!(bus.handler_count("allowed"), 0);
    }
}
