//! The event vocabulary published on the bus.
//!
//! Concrete input events declare marker supertypes, so a listener can watch
//! one exact event type ([`EventBus::connect`](event_bus::EventBus::connect))
//! or a whole family ([`connect_wide`](event_bus::EventBus::connect_wide)
//! on [`InputEvent`] or [`PointerEvent`]).

use crate::tree::NodeId;
use event_bus::{Event, Lineage, lineage_of};
use std::any::Any;
use vek::*;


/// Marker supertype of everything originating from user input.
#[derive(Debug)]
pub struct InputEvent;

impl Event for InputEvent {
    fn as_any(&self) -> &dyn Any { self }
}

/// Marker supertype of input events carrying a cursor position.
#[derive(Debug)]
pub struct PointerEvent;

impl Event for PointerEvent {
    fn parents() -> Vec<Lineage> {
        vec![lineage_of::<InputEvent>()]
    }
    fn as_any(&self) -> &dyn Any { self }
}

/// Marker supertype of events published by widgets about themselves.
#[derive(Debug)]
pub struct WidgetEvent;

impl Event for WidgetEvent {
    fn as_any(&self) -> &dyn Any { self }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Press,
    Release,
}

/// Keyboard key, already translated out of whatever the native layer uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Char(char),
    Other(u32),
}

/// Modifier keys held during an input event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub logo: bool,
}

/// An amount scrolled, which the input source reports in either unit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScrolledAmount {
    Pixels(Vec2<f32>),
    Lines(Vec2<f32>),
}

impl ScrolledAmount {
    /// Convert to pixels, interpreting line units at the given line height.
    pub fn to_pixels(self, line_height: f32) -> Vec2<f32> {
        match self {
            ScrolledAmount::Pixels(pixels) => pixels,
            ScrolledAmount::Lines(lines) => lines * line_height,
        }
    }
}


/// A mouse button went down or up. `pos` is in virtual coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub action: ButtonAction,
    pub mods: Modifiers,
    pub pos: Vec2<f32>,
}

impl Event for MouseButtonEvent {
    fn parents() -> Vec<Lineage> {
        vec![lineage_of::<PointerEvent>()]
    }
    fn as_any(&self) -> &dyn Any { self }
}

/// The cursor moved to a new virtual position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseMoveEvent {
    pub pos: Vec2<f32>,
}

impl Event for MouseMoveEvent {
    fn parents() -> Vec<Lineage> {
        vec![lineage_of::<PointerEvent>()]
    }
    fn as_any(&self) -> &dyn Any { self }
}

/// The scroll wheel or trackpad scrolled with the cursor at `pos`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseScrollEvent {
    pub amount: ScrolledAmount,
    pub pos: Vec2<f32>,
}

impl Event for MouseScrollEvent {
    fn parents() -> Vec<Lineage> {
        vec![lineage_of::<PointerEvent>()]
    }
    fn as_any(&self) -> &dyn Any { self }
}

/// A key went down or up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: ButtonAction,
    pub mods: Modifiers,
}

impl Event for KeyEvent {
    fn parents() -> Vec<Lineage> {
        vec![lineage_of::<InputEvent>()]
    }
    fn as_any(&self) -> &dyn Any { self }
}

/// Text input resolved to a character, distinct from the raw key events.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CharEvent {
    pub c: char,
}

impl Event for CharEvent {
    fn parents() -> Vec<Lineage> {
        vec![lineage_of::<InputEvent>()]
    }
    fn as_any(&self) -> &dyn Any { self }
}

/// The window's virtual size changed. Published by the scene's resize entry
/// point after the root container has been resized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowResizedEvent {
    pub size: Extent2<f32>,
}

impl Event for WindowResizedEvent {
    fn as_any(&self) -> &dyn Any { self }
}

/// A widget with a notion of selection (dropdown, tab strip) picked a new
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChangedEvent {
    /// Node of the widget that changed.
    pub node: NodeId,
    /// Index of the selected entry within the widget.
    pub index: usize,
    /// The selected entry itself.
    pub value: String,
}

impl Event for SelectionChangedEvent {
    fn parents() -> Vec<Lineage> {
        vec![lineage_of::<WidgetEvent>()]
    }
    fn as_any(&self) -> &dyn Any { self }
}


#[test]
fn test_pointer_events_reach_input_listeners_transitively() {
    use event_bus::{EventTypeId, type_closure};

    let closure = type_closure::<MouseButtonEvent>();
    assert_eq!(closure[0], EventTypeId::of::<MouseButtonEvent>());
    assert!(closure.contains(&EventTypeId::of::<PointerEvent>()));
    assert!(closure.contains(&EventTypeId::of::<InputEvent>()));
}

#[test]
fn test_key_events_are_not_pointer_events() {
    use event_bus::{EventTypeId, type_closure};

    let closure = type_closure::<KeyEvent>();
    assert!(closure.contains(&EventTypeId::of::<InputEvent>()));
    assert!(!closure.contains(&EventTypeId::of::<PointerEvent>()));
}

#[test]
fn test_scrolled_amount_to_pixels() {
    let lines = ScrolledAmount::Lines(Vec2::new(0.0, 3.0));
    assert_eq!(lines.to_pixels(16.0), Vec2::new(0.0, 48.0));
    let pixels = ScrolledAmount::Pixels(Vec2::new(5.0, -2.0));
    assert_eq!(pixels.to_pixels(16.0), Vec2::new(5.0, -2.0));
}
