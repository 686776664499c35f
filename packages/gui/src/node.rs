//! The base element of the scene tree.

use crate::{
    frame::Border,
    layout::{Container, Layout},
    tree::NodeId,
    widget::Widget,
    widgets::Pane,
};
use event_bus::SubscriberGuard;
use vek::*;


/// Visual styling drawn behind a node's widget content.
#[derive(Debug, Copy, Clone, Default)]
pub struct Backdrop {
    pub fill: Option<Rgba<f32>>,
    pub border: Option<Border>,
    pub corner_radius: f32,
}

impl Backdrop {
    pub fn solid(color: Rgba<f32>) -> Self {
        Backdrop {
            fill: Some(color),
            ..Default::default()
        }
    }
}


/// Everything needed to insert a node, in one struct literal. Unspecified
/// fields come from `Default`, which is an inert zero-sized leaf.
pub struct NodeConfig {
    /// Fraction of the parent rectangle the node hangs from, (0,0) top-left
    /// through (1,1) bottom-right.
    pub anchor: Vec2<f32>,
    /// Fraction of the node's own rectangle placed at the anchor point.
    pub pivot: Vec2<f32>,
    /// Offset in virtual pixels applied after anchor and pivot.
    pub offset: Vec2<f32>,
    pub size: Extent2<f32>,
    /// Higher draws in front of siblings and wins hit-testing.
    pub draw_order: i32,
    pub hidden: bool,
    pub backdrop: Option<Backdrop>,
    pub widget: Box<dyn Widget>,
    /// `Some` makes the node a container able to hold children.
    pub layout: Option<Layout>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            anchor: Vec2::new(0.0, 0.0),
            pivot: Vec2::new(0.0, 0.0),
            offset: Vec2::new(0.0, 0.0),
            size: Extent2::new(0.0, 0.0),
            draw_order: 0,
            hidden: false,
            backdrop: None,
            widget: Box::new(Pane),
            layout: None,
        }
    }
}


/// One element of the scene tree: placement relative to the parent, a
/// widget for behavior, and optionally a container of children.
///
/// A node's absolute rectangle is always derived, never stored:
///
/// ```text
/// origin = parent.origin + anchor * parent.size - pivot * own.size + offset
/// ```
///
/// so resizing or moving a parent relocates all descendants with no
/// propagation step.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) anchor: Vec2<f32>,
    pub(crate) pivot: Vec2<f32>,
    pub(crate) offset: Vec2<f32>,
    pub(crate) size: Extent2<f32>,
    pub(crate) draw_order: i32,
    pub(crate) hidden: bool,
    pub(crate) backdrop: Option<Backdrop>,
    pub(crate) widget: Box<dyn Widget>,
    pub(crate) container: Option<Container>,
    pub(crate) subscription: Option<SubscriberGuard>,
}

impl Node {
    pub(crate) fn new(config: NodeConfig, parent: Option<NodeId>) -> Self {
        Node {
            parent,
            anchor: config.anchor,
            pivot: config.pivot,
            offset: config.offset,
            size: config.size,
            draw_order: config.draw_order,
            hidden: config.hidden,
            backdrop: config.backdrop,
            widget: config.widget,
            container: config.layout.map(Container::new),
            subscription: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn anchor(&self) -> Vec2<f32> {
        self.anchor
    }

    pub fn pivot(&self) -> Vec2<f32> {
        self.pivot
    }

    pub fn offset(&self) -> Vec2<f32> {
        self.offset
    }

    pub fn size(&self) -> Extent2<f32> {
        self.size
    }

    pub fn draw_order(&self) -> i32 {
        self.draw_order
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn backdrop(&self) -> Option<Backdrop> {
        self.backdrop
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn widget(&self) -> &dyn Widget {
        self.widget.as_ref()
    }
}
