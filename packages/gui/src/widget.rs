//! The widget behavior trait and the contexts its hooks receive.

use crate::{
    frame::{Frame, TextureHandle},
    input::{MouseButtonEvent, ScrolledAmount},
    rect::Rect,
    scene::EffectQueue,
    tree::NodeId,
};
use event_bus::{EventBus, SubscriberId};
use std::any::Any;
use vek::*;


/// Context handed to widget callbacks during dispatch and drawing.
///
/// The tree itself is mutably borrowed while a callback runs, so structural
/// changes go through `effects`, which the scene drains after the dispatch
/// finishes.
pub struct UiCtx<'a> {
    pub bus: &'a EventBus,
    pub effects: &'a EffectQueue,
    /// The node this widget sits on.
    pub node: NodeId,
    /// The node's current absolute rectangle.
    pub rect: Rect,
}

/// Context handed to [`Widget::attach`] when its node enters a scene.
pub struct AttachCtx<'a> {
    pub bus: &'a EventBus,
    pub effects: &'a EffectQueue,
    pub node: NodeId,
    /// Subscriber identity for bus registrations. The scene drops the
    /// owning guard when the node is removed, disconnecting them all.
    pub owner: SubscriberId,
}

/// Behavior attached to a node. All hooks default to no-ops, a widget
/// implements the ones it cares about.
pub trait Widget {
    /// Called once per frame to emit the widget's own draw commands.
    /// Backdrop and children are the scene's responsibility.
    #[allow(unused_variables)]
    fn draw(&mut self, rect: Rect, frame: &mut Frame) {}

    /// Called upon the widget's node being inserted into a scene.
    #[allow(unused_variables)]
    fn attach(&mut self, ctx: &AttachCtx) {}

    /// Called upon a mouse press landing on this widget through
    /// hit-testing. Runs before the event reaches bus listeners.
    #[allow(unused_variables)]
    fn on_click(&mut self, ctx: &UiCtx, event: &MouseButtonEvent) {}

    /// Called upon the cursor entering this widget.
    #[allow(unused_variables)]
    fn on_hover_enter(&mut self, ctx: &UiCtx) {}

    /// Called upon the cursor leaving this widget, including by the widget
    /// being hidden or removed mid-hover.
    #[allow(unused_variables)]
    fn on_hover_exit(&mut self, ctx: &UiCtx) {}

    /// Called upon the cursor moving while already over this widget.
    #[allow(unused_variables)]
    fn on_hover_move(&mut self, ctx: &UiCtx, pos: Vec2<f32>) {}

    /// Called upon a scroll with the cursor over this widget.
    #[allow(unused_variables)]
    fn on_scroll(&mut self, ctx: &UiCtx, amount: ScrolledAmount) {}

    /// Called once per frame with the elapsed time in seconds.
    #[allow(unused_variables)]
    fn update(&mut self, ctx: &UiCtx, elapsed: f32) {}

    /// The region this widget responds to in hit-testing. Defaults to the
    /// node's own rectangle. A widget with transient geometry outside its
    /// rectangle, such as a popped-out menu, widens this.
    fn interactive_bounds(&self, rect: Rect) -> Rect {
        rect
    }

    /// Called upon removal from the tree. Renderer-owned resources go onto
    /// `released` for the caller to free. Must be idempotent.
    #[allow(unused_variables)]
    fn cleanup(&mut self, released: &mut Vec<TextureHandle>) {}

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
