//! Event type identity and supertype declaration.

use std::{
    any::{
        Any,
        TypeId,
        type_name,
    },
    collections::VecDeque,
    fmt::{self, Debug, Formatter},
};


/// Something that happened, dispatchable on an [`EventBus`](crate::EventBus).
///
/// An event is a plain value type. Beyond its own type it may declare direct
/// supertypes via [`parents`](Self::parents), making it deliverable to
/// listeners registered on those types as well, see
/// [`EventBus::connect_wide`](crate::EventBus::connect_wide).
pub trait Event: Any + Debug {
    /// Direct supertypes this event type declares.
    ///
    /// The bus takes the transitive closure, so declaring only direct
    /// parents is enough, and re-reaching a grandparent through two paths is
    /// harmless.
    fn parents() -> Vec<Lineage>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Upcast for downcasting. Implementations return `self`.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Event {
    /// Whether the concrete type of this event is `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// Downcast to the concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}


/// Identity of an event type. Cheap to copy, hashable, carries the type name
/// for logging.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EventTypeId {
    type_id: TypeId,
    name: &'static str,
}

impl EventTypeId {
    /// Identity of event type `E`.
    pub fn of<E: Event>() -> Self {
        EventTypeId {
            type_id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified name of the event type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Debug for EventTypeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name)
    }
}


/// One link in a supertype declaration, naming an event type and how to
/// reach that type's own parents.
#[derive(Copy, Clone)]
pub struct Lineage {
    id: EventTypeId,
    parents: fn() -> Vec<Lineage>,
}

impl Lineage {
    pub fn id(&self) -> EventTypeId {
        self.id
    }
}

impl Debug for Lineage {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Lineage").field(&self.id).finish()
    }
}

/// Lineage link for event type `E`, for use in [`Event::parents`]
/// declarations.
pub fn lineage_of<E: Event>() -> Lineage {
    Lineage {
        id: EventTypeId::of::<E>(),
        parents: E::parents,
    }
}

/// Every type identity an event of concrete type `E` satisfies: own type
/// first, then declared supertypes breadth-first in declaration order, each
/// exactly once even when declarations form a diamond.
pub fn type_closure<E: Event>() -> Vec<EventTypeId> {
    let mut closure = Vec::<EventTypeId>::new();
    let mut queue = VecDeque::new();
    queue.push_back(lineage_of::<E>());
    while let Some(link) = queue.pop_front() {
        if closure.contains(&link.id) {
            continue;
        }
        closure.push(link.id);
        for parent in (link.parents)() {
            queue.push_back(parent);
        }
    }
    closure
}


#[test]
fn test_closure_own_type_first() {
    #[derive(Debug)]
    struct Base;
    impl Event for Base {
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Leaf;
    impl Event for Leaf {
        fn parents() -> Vec<Lineage> {
            vec![lineage_of::<Base>()]
        }
        fn as_any(&self) -> &dyn Any { self }
    }

    let closure = type_closure::<Leaf>();
    assert_eq!(closure.len(), 2);
    assert_eq!(closure[0], EventTypeId::of::<Leaf>());
    assert_eq!(closure[1], EventTypeId::of::<Base>());
}

#[test]
fn test_closure_diamond_dedup() {
    #[derive(Debug)]
    struct Root;
    impl Event for Root {
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Left;
    impl Event for Left {
        fn parents() -> Vec<Lineage> {
            vec![lineage_of::<Root>()]
        }
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Right;
    impl Event for Right {
        fn parents() -> Vec<Lineage> {
            vec![lineage_of::<Root>()]
        }
        fn as_any(&self) -> &dyn Any { self }
    }

    #[derive(Debug)]
    struct Bottom;
    impl Event for Bottom {
        fn parents() -> Vec<Lineage> {
            vec![lineage_of::<Left>(), lineage_of::<Right>()]
        }
        fn as_any(&self) -> &dyn Any { self }
    }

    let closure = type_closure::<Bottom>();
    assert_eq!(closure.len(), 4);
    assert_eq!(closure[0], EventTypeId::of::<Bottom>());
    let roots = closure.iter()
        .filter(|&&id| id == EventTypeId::of::<Root>())
        .count();
    assert_eq!(roots, 1);
}

#[test]
fn test_no_parents_closure_is_self() {
    #[derive(Debug)]
    struct Lone;
    impl Event for Lone {
        fn as_any(&self) -> &dyn Any { self }
    }

    assert_eq!(type_closure::<Lone>(), vec![EventTypeId::of::<Lone>()]);
}
