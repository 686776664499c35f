//! Ordered, type-hierarchy-aware publish/subscribe for single-threaded frame
//! loops.
//!
//! The model is built around three ideas:
//!
//! - An _event_ is a plain value type implementing [`Event`]. Beyond its own
//!   type, an event may declare supertypes it also satisfies, such as a
//!   concrete mouse event declaring that it is a pointer event, which is an
//!   input event. Declarations are static tables ([`Event::parents`]), not
//!   runtime reflection, and may form diamonds.
//! - An [`EventBus`] is an explicit instance, not a global. Cloning a bus is
//!   shallow, the clones share one registry, so the owner of a bus can hand
//!   handles to every component that publishes or subscribes. Tests construct
//!   throwaway instances.
//! - Dispatch is synchronous and runs listeners in registration order
//!   against a snapshot taken when the dispatch starts. Connects and
//!   disconnects performed by a running listener affect the next dispatch,
//!   never the one in flight, so listeners can freely subscribe, unsubscribe,
//!   and publish while handling an event.
//!
//! Subscriptions are owned: callers allocate a subscriber identity via
//! [`EventBus::subscriber`] and get back a [`SubscriberGuard`] whose drop
//! disconnects everything registered under that identity. Ownerless
//! subscriptions ([`EventBus::connect_static`]) live as long as the bus.

#[macro_use]
extern crate tracing;

mod event;
mod bus;

pub use crate::{
    event::{
        Event,
        EventTypeId,
        Lineage,
        lineage_of,
        type_closure,
    },
    bus::{
        EventBus,
        SubscriberId,
        SubscriberGuard,
        DispatchError,
    },
};
