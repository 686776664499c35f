//! The bus itself: subscription slots, owners, snapshot dispatch.

use crate::event::{
    Event,
    EventTypeId,
    type_closure,
};
use std::{
    any::{TypeId, type_name},
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::{Rc, Weak},
};
use anyhow::Result;
use thiserror::Error;


/// Owner identity for subscriptions, allocated by [`EventBus::subscriber`].
///
/// Plain copyable token. The RAII side lives in [`SubscriberGuard`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Summary of a dispatch pass in which one or more listeners returned an
/// error. Every listener in the pass still ran.
#[derive(Debug, Error)]
#[error("{} of {total} listeners failed handling {event}", .errors.len())]
pub struct DispatchError {
    /// Name of the dispatched event type.
    pub event: &'static str,
    /// Number of listeners invoked in the pass.
    pub total: usize,
    /// The individual listener errors, in invocation order.
    pub errors: Vec<anyhow::Error>,
}

type Callback = Box<dyn FnMut(&dyn Event) -> Result<()>>;

struct Slot {
    seq: u64,
    owner: Option<SubscriberId>,
    callback: RefCell<Callback>,
}

#[derive(Default)]
struct BusState {
    next_owner: u64,
    next_seq: u64,
    live_owners: HashSet<SubscriberId>,
    slots: HashMap<EventTypeId, Vec<Rc<Slot>>>,
    lineages: HashMap<TypeId, Rc<Vec<EventTypeId>>>,
}

impl BusState {
    fn remove_owner(&mut self, owner: SubscriberId) -> bool {
        if !self.live_owners.remove(&owner) {
            return false;
        }
        for slots in self.slots.values_mut() {
            slots.retain(|slot| slot.owner != Some(owner));
        }
        self.slots.retain(|_, slots| !slots.is_empty());
        true
    }
}


/// Publish/subscribe registry over [`Event`] types.
///
/// An instance is explicit state, there is no global bus. Cloning is
/// shallow, clones share one registry. Single-threaded: dispatch is
/// synchronous, runs listeners in registration order, and is safe to
/// re-enter from inside a listener.
#[derive(Clone, Default)]
pub struct EventBus(Rc<RefCell<BusState>>);

impl EventBus {
    /// Construct a new empty bus, fully isolated from any other instance.
    pub fn new() -> Self {
        Default::default()
    }

    /// Allocate a subscriber identity on this bus.
    ///
    /// Dropping the returned guard disconnects everything registered under
    /// the identity.
    pub fn subscriber(&self) -> SubscriberGuard {
        let mut state = self.0.borrow_mut();
        let id = SubscriberId(state.next_owner);
        state.next_owner += 1;
        state.live_owners.insert(id);
        SubscriberGuard {
            bus: Rc::downgrade(&self.0),
            id,
        }
    }

    /// Register a callback for events of concrete type `E`, owned by
    /// `owner`.
    ///
    /// Registration under an identity this bus does not currently consider
    /// live is rejected with a logged warning rather than an error.
    pub fn connect<E, F>(&self, owner: SubscriberId, callback: F)
    where
        E: Event,
        F: FnMut(&E) -> Result<()> + 'static,
    {
        self.connect_inner(EventTypeId::of::<E>(), Some(owner), typed::<E, F>(callback));
    }

    /// Like [`connect`](Self::connect), but with no owning subscriber. The
    /// registration lives as long as the bus.
    pub fn connect_static<E, F>(&self, callback: F)
    where
        E: Event,
        F: FnMut(&E) -> Result<()> + 'static,
    {
        self.connect_inner(EventTypeId::of::<E>(), None, typed::<E, F>(callback));
    }

    /// Register a callback for events of type `W` or any event type
    /// declaring `W` among its supertypes, directly or transitively.
    ///
    /// The callback receives the concrete event in erased form and can
    /// [`downcast_ref`](Event::downcast_ref) for payload access.
    pub fn connect_wide<W, F>(&self, owner: SubscriberId, callback: F)
    where
        W: Event,
        F: FnMut(&dyn Event) -> Result<()> + 'static,
    {
        self.connect_inner(EventTypeId::of::<W>(), Some(owner), Box::new(callback));
    }

    /// Like [`connect_wide`](Self::connect_wide), but with no owning
    /// subscriber.
    pub fn connect_wide_static<W, F>(&self, callback: F)
    where
        W: Event,
        F: FnMut(&dyn Event) -> Result<()> + 'static,
    {
        self.connect_inner(EventTypeId::of::<W>(), None, Box::new(callback));
    }

    fn connect_inner(
        &self,
        event_type: EventTypeId,
        owner: Option<SubscriberId>,
        callback: Callback,
    ) {
        let mut state = self.0.borrow_mut();
        if let Some(owner) = owner {
            if !state.live_owners.contains(&owner) {
                warn!(
                    ?owner,
                    ?event_type,
                    "connect under dead or foreign subscriber, ignoring",
                );
                return;
            }
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.slots
            .entry(event_type)
            .or_default()
            .push(Rc::new(Slot {
                seq,
                owner,
                callback: RefCell::new(callback),
            }));
    }

    /// Remove every callback registered under `owner`, across all event
    /// types.
    ///
    /// Takes effect for dispatches that start after this call. A dispatch
    /// already in flight still delivers its snapshot.
    pub fn disconnect(&self, owner: SubscriberId) {
        if !self.0.borrow_mut().remove_owner(owner) {
            warn!(?owner, "disconnect of dead or foreign subscriber, ignoring");
        }
    }

    /// Dispatch an event to every listener registered under its type or any
    /// of its declared supertypes, in registration order.
    ///
    /// The listener list is snapshotted before the first callback runs, so
    /// listeners can connect, disconnect, and dispatch freely, with changes
    /// visible starting from the next dispatch. Every snapshotted listener
    /// runs even if an earlier one fails, failures come back aggregated in
    /// the `Err` case. Dispatching with zero listeners is a no-op.
    pub fn dispatch<E: Event>(&self, event: &E) -> Result<(), DispatchError> {
        let snapshot = {
            let mut state = self.0.borrow_mut();
            let lineage = Rc::clone(state.lineages
                .entry(TypeId::of::<E>())
                .or_insert_with(|| Rc::new(type_closure::<E>())));
            let mut snapshot = Vec::new();
            for id in lineage.iter() {
                if let Some(slots) = state.slots.get(id) {
                    snapshot.extend(slots.iter().map(Rc::clone));
                }
            }
            snapshot.sort_by_key(|slot| slot.seq);
            snapshot
        };

        let total = snapshot.len();
        let mut errors = Vec::new();
        for slot in snapshot {
            // a slot that is already running further down the stack cannot
            // be re-entered, its callback state is mutably borrowed
            match slot.callback.try_borrow_mut() {
                Ok(mut callback) => if let Err(e) = callback(event) {
                    errors.push(e);
                },
                Err(_) => warn!(
                    event = type_name::<E>(),
                    "listener reentrantly dispatched an event it listens to, \
                    skipping nested delivery to it",
                ),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                event: type_name::<E>(),
                total,
                errors,
            })
        }
    }
}


/// Wrapper around a subscriber identity which disconnects it when dropped.
#[must_use]
pub struct SubscriberGuard {
    bus: Weak<RefCell<BusState>>,
    id: SubscriberId,
}

impl SubscriberGuard {
    /// The identity this guard owns, for passing to connect calls.
    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        match self.bus.upgrade() {
            // quiet if already explicitly disconnected
            Some(state) => { state.borrow_mut().remove_owner(self.id); }
            None => trace!(id = ?self.id, "bus dropped before subscriber guard"),
        }
    }
}


fn typed<E, F>(mut callback: F) -> Callback
where
    E: Event,
    F: FnMut(&E) -> Result<()> + 'static,
{
    Box::new(move |event: &dyn Event| match event.downcast_ref::<E>() {
        Some(event) => callback(event),
        None => {
            // reachable by typed-connecting to a supertype marker, which
            // matches subtypes it cannot hand to a typed callback
            warn!(
                listener = type_name::<E>(),
                received = ?event,
                "typed listener matched through supertype declaration, \
                skipping, use connect_wide to listen to a family of events",
            );
            Ok(())
        }
    })
}


#[cfg(test)]
use crate::event::{Lineage, lineage_of};
#[cfg(test)]
use std::any::Any;

#[test]
fn test_exact_delivery() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping(u32);
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    let seen = Rc::new(Cell::new(0));
    let seen2 = Rc::clone(&seen);
    bus.connect::<Ping, _>(sub.id(), move |ping| {
        seen2.set(seen2.get() + ping.0);
        Ok(())
    });

    bus.dispatch(&Ping(7)).unwrap();
    bus.dispatch(&Ping(1)).unwrap();
    assert_eq!(seen.get(), 8);
}

#[test]
fn test_supertype_delivery_exactly_once() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Root;
    impl Event for Root {
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Left;
    impl Event for Left {
        fn parents() -> Vec<Lineage> { vec![lineage_of::<Root>()] }
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Right;
    impl Event for Right {
        fn parents() -> Vec<Lineage> { vec![lineage_of::<Root>()] }
        fn as_any(&self) -> &dyn Any { self }
    }

    // declares Root twice over, through both Left and Right
    #[derive(Debug)]
    struct Bottom;
    impl Event for Bottom {
        fn parents() -> Vec<Lineage> {
            vec![lineage_of::<Left>(), lineage_of::<Right>()]
        }
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    let hits = Rc::new(Cell::new(0));
    let hits2 = Rc::clone(&hits);
    bus.connect_wide::<Root, _>(sub.id(), move |event| {
        assert!(event.is::<Bottom>());
        hits2.set(hits2.get() + 1);
        Ok(())
    });

    bus.dispatch(&Bottom).unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_registration_order_across_types() {
    #[derive(Debug)]
    struct Sup;
    impl Event for Sup {
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Ev;
    impl Event for Ev {
        fn parents() -> Vec<Lineage> { vec![lineage_of::<Sup>()] }
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    let order = Rc::new(RefCell::new(Vec::new()));

    let o = Rc::clone(&order);
    bus.connect::<Ev, _>(sub.id(), move |_| { o.borrow_mut().push(1); Ok(()) });
    let o = Rc::clone(&order);
    bus.connect_wide::<Sup, _>(sub.id(), move |_| { o.borrow_mut().push(2); Ok(()) });
    let o = Rc::clone(&order);
    bus.connect::<Ev, _>(sub.id(), move |_| { o.borrow_mut().push(3); Ok(()) });

    bus.dispatch(&Ev).unwrap();
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
}

#[test]
fn test_disconnect_stops_delivery() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    let seen = Rc::new(Cell::new(0));
    let seen2 = Rc::clone(&seen);
    bus.connect::<Ping, _>(sub.id(), move |_| {
        seen2.set(seen2.get() + 1);
        Ok(())
    });

    bus.dispatch(&Ping).unwrap();
    bus.disconnect(sub.id());
    bus.dispatch(&Ping).unwrap();
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_guard_drop_disconnects() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let seen = Rc::new(Cell::new(0));
    {
        let sub = bus.subscriber();
        let seen2 = Rc::clone(&seen);
        bus.connect::<Ping, _>(sub.id(), move |_| {
            seen2.set(seen2.get() + 1);
            Ok(())
        });
        bus.dispatch(&Ping).unwrap();
    }
    bus.dispatch(&Ping).unwrap();
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_connect_under_dead_owner_ignored() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let stale = {
        let sub = bus.subscriber();
        sub.id()
    };
    let seen = Rc::new(Cell::new(0));
    let seen2 = Rc::clone(&seen);
    bus.connect::<Ping, _>(stale, move |_| {
        seen2.set(seen2.get() + 1);
        Ok(())
    });

    bus.dispatch(&Ping).unwrap();
    assert_eq!(seen.get(), 0);
}

#[test]
fn test_disconnect_during_dispatch_spares_snapshot() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let first = bus.subscriber();
    let second = bus.subscriber();
    let second_id = second.id();

    let bus2 = bus.clone();
    bus.connect::<Ping, _>(first.id(), move |_| {
        bus2.disconnect(second_id);
        Ok(())
    });
    let seen = Rc::new(Cell::new(0));
    let seen2 = Rc::clone(&seen);
    bus.connect::<Ping, _>(second_id, move |_| {
        seen2.set(seen2.get() + 1);
        Ok(())
    });

    // snapshot was taken before the first listener ran, so the second still
    // fires this pass, then never again
    bus.dispatch(&Ping).unwrap();
    assert_eq!(seen.get(), 1);
    bus.dispatch(&Ping).unwrap();
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_zero_subscribers_is_noop() {
    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    bus.dispatch(&Ping).unwrap();
}

#[test]
fn test_listener_error_does_not_starve_later_listeners() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    bus.connect::<Ping, _>(sub.id(), |_| anyhow::bail!("listener one is broken"));
    let seen = Rc::new(Cell::new(0));
    let seen2 = Rc::clone(&seen);
    bus.connect::<Ping, _>(sub.id(), move |_| {
        seen2.set(seen2.get() + 1);
        Ok(())
    });

    let err = bus.dispatch(&Ping).unwrap_err();
    assert_eq!(err.total, 2);
    assert_eq!(err.errors.len(), 1);
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_reentrant_dispatch_of_other_event() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Outer;
    impl Event for Outer {
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Inner;
    impl Event for Inner {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    let seen = Rc::new(Cell::new(0));
    let seen2 = Rc::clone(&seen);
    bus.connect::<Inner, _>(sub.id(), move |_| {
        seen2.set(seen2.get() + 1);
        Ok(())
    });
    let bus2 = bus.clone();
    bus.connect::<Outer, _>(sub.id(), move |_| {
        bus2.dispatch(&Inner).map_err(Into::into)
    });

    bus.dispatch(&Outer).unwrap();
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_reentrant_dispatch_skips_running_slot() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    let entries = Rc::new(Cell::new(0));
    let entries2 = Rc::clone(&entries);
    let bus2 = bus.clone();
    bus.connect::<Ping, _>(sub.id(), move |_| {
        entries2.set(entries2.get() + 1);
        if entries2.get() == 1 {
            // nested dispatch must not re-enter this very slot
            bus2.dispatch(&Ping).unwrap();
        }
        Ok(())
    });

    bus.dispatch(&Ping).unwrap();
    assert_eq!(entries.get(), 1);
}

#[test]
fn test_connect_during_dispatch_affects_next_dispatch() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn as_any(&self) -> &dyn Any { self }
    }

    let bus = EventBus::new();
    let sub = bus.subscriber();
    let sub_id = sub.id();
    let late = Rc::new(Cell::new(0));
    let hooked = Rc::new(Cell::new(false));

    let bus2 = bus.clone();
    let late2 = Rc::clone(&late);
    let hooked2 = Rc::clone(&hooked);
    bus.connect::<Ping, _>(sub_id, move |_| {
        if !hooked2.get() {
            hooked2.set(true);
            let late3 = Rc::clone(&late2);
            bus2.connect::<Ping, _>(sub_id, move |_| {
                late3.set(late3.get() + 1);
                Ok(())
            });
        }
        Ok(())
    });

    bus.dispatch(&Ping).unwrap();
    assert_eq!(late.get(), 0);
    bus.dispatch(&Ping).unwrap();
    assert_eq!(late.get(), 1);
}
