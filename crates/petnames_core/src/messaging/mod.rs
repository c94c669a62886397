//! Event messaging between stores and their observers.
//!
//! # Responsibility
//! - Deliver store change events to subscribers keyed by event type.
//! - Restrict each consumer to the event types it declared up front.
//!
//! # Invariants
//! - Handlers run synchronously in registration order.
//! - Handlers never run while the subscription table is locked.

pub mod messenger;
