//! Retained-mode widget layer.
//!
//! A [`Scene`] holds a tree of nodes. Each node is placed relative to its
//! parent through an anchor/pivot/offset formula, optionally carries a
//! container layout for its children, and delegates behavior to a
//! [`Widget`]. Input enters through the scene's `handle_*` methods, gets
//! hit-tested down the tree, and is then republished on an [`EventBus`]
//! for decoupled listeners. Drawing emits a [`Frame`] of primitives for an
//! external renderer, recomputing dirty layouts first.

#[macro_use]
extern crate tracing;

pub mod rect;
pub mod frame;
pub mod window;
pub mod input;
pub mod node;
pub mod tree;
pub mod layout;
pub mod widget;
pub mod widgets;
pub mod scene;
pub mod theme;
pub mod logging;

pub use crate::{
    frame::{Frame, Renderer, TextureHandle},
    node::{Backdrop, NodeConfig},
    rect::Rect,
    scene::{Effect, EffectQueue, Scene},
    tree::NodeId,
    widget::{AttachCtx, UiCtx, Widget},
    window::{StaticWindow, UiWindow},
};
pub use event_bus::EventBus;
