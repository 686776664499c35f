//! Arena storage for the scene tree.

use crate::{
    frame::TextureHandle,
    layout::Layout,
    node::{Node, NodeConfig},
    rect::Rect,
};
use slab::Slab;
use vek::*;


/// Stable handle to a node. Stays valid until that node is removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// The scene tree itself: a slab of nodes plus the root's key.
///
/// The root is created with the tree and cannot be removed. All structural
/// mutation goes through `add` and `remove` so parent child links and
/// layout dirtiness stay consistent.
pub struct Tree {
    nodes: Slab<Node>,
    root: NodeId,
}

impl Tree {
    pub fn new(root_config: NodeConfig) -> Self {
        let mut nodes = Slab::new();
        let root = NodeId(nodes.insert(Node::new(root_config, None)));
        Tree { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Insert a child under `parent`, last in its sibling order.
    ///
    /// Panics if `parent` is not a container.
    pub fn add(&mut self, parent: NodeId, config: NodeConfig) -> NodeId {
        assert!(
            self.node(parent).container.is_some(),
            "cannot add child to non-container node",
        );
        let id = NodeId(self.nodes.insert(Node::new(config, Some(parent))));
        let container = self.node_mut(parent).container.as_mut().unwrap();
        container.children.push(id);
        container.dirty = true;
        id
    }

    /// Remove `id` and its whole subtree, pushing texture handles freed by
    /// widget cleanup onto `released`.
    ///
    /// Panics if `id` is the root.
    pub fn remove(&mut self, id: NodeId, released: &mut Vec<TextureHandle>) {
        assert!(id != self.root, "cannot remove the root node");
        if let Some(parent) = self.node(id).parent {
            let container = self.node_mut(parent).container.as_mut().unwrap();
            container.children.retain(|&child| child != id);
            container.dirty = true;
            if let Layout::Grid(ref mut grid) = container.layout {
                grid.forget(id);
            }
        }
        self.remove_subtree(id, released);
    }

    /// Remove every node including the root. Used when the scene is torn
    /// down whole.
    pub(crate) fn teardown(&mut self, released: &mut Vec<TextureHandle>) {
        let root = self.root;
        self.remove_subtree(root, released);
    }

    fn remove_subtree(&mut self, id: NodeId, released: &mut Vec<TextureHandle>) {
        let children = self.node(id).container
            .as_ref()
            .map(|container| container.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child, released);
        }
        let mut node = self.nodes.remove(id.0);
        node.widget.cleanup(released);
        // dropping the node drops its subscription guard, disconnecting
        // any bus listeners the widget attached
    }

    /// The node's rectangle in virtual coordinates, derived by walking to
    /// the root.
    pub fn absolute_rect(&self, id: NodeId) -> Rect {
        let node = self.node(id);
        let size = node.size;
        let pos = match node.parent {
            None => Vec2::new(
                node.offset.x - node.pivot.x * size.w,
                node.offset.y - node.pivot.y * size.h,
            ),
            Some(parent) => {
                let parent_rect = self.absolute_rect(parent);
                Vec2::new(
                    parent_rect.pos.x
                        + node.anchor.x * parent_rect.size.w
                        - node.pivot.x * size.w
                        + node.offset.x,
                    parent_rect.pos.y
                        + node.anchor.y * parent_rect.size.h
                        - node.pivot.y * size.h
                        + node.offset.y,
                )
            }
        };
        Rect { pos, size }
    }

    /// Children of `id` in insertion order. Empty for leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).container
            .as_ref()
            .map(|container| container.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `ancestor` is `node` or appears on `node`'s path to the root.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut curr = Some(node);
        while let Some(id) = curr {
            if id == ancestor {
                return true;
            }
            curr = self.node(id).parent;
        }
        false
    }

    pub(crate) fn mark_parent_dirty(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            if let Some(container) = self.node_mut(parent).container.as_mut() {
                container.dirty = true;
            }
        }
    }
}


#[test]
fn test_add_remove() {
    let mut tree = Tree::new(NodeConfig {
        size: Extent2::new(100.0, 100.0),
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig {
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let b = tree.add(a, NodeConfig::default());
    assert!(tree.contains(a));
    assert!(tree.contains(b));

    let mut released = Vec::new();
    tree.remove(a, &mut released);
    assert!(!tree.contains(a));
    assert!(!tree.contains(b));
    assert!(tree.contains(root));
    assert_eq!(tree.children(root), &[]);
}

#[test]
fn test_absolute_rect_placement() {
    let mut tree = Tree::new(NodeConfig {
        size: Extent2::new(200.0, 100.0),
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let root = tree.root();
    // centered via anchor and pivot
    let centered = tree.add(root, NodeConfig {
        anchor: Vec2::new(0.5, 0.5),
        pivot: Vec2::new(0.5, 0.5),
        size: Extent2::new(40.0, 20.0),
        ..Default::default()
    });
    let rect = tree.absolute_rect(centered);
    assert_eq!(rect.pos, Vec2::new(80.0, 40.0));

    // bottom-right corner pinned with an inward offset
    let corner = tree.add(root, NodeConfig {
        anchor: Vec2::new(1.0, 1.0),
        pivot: Vec2::new(1.0, 1.0),
        offset: Vec2::new(-10.0, -10.0),
        size: Extent2::new(30.0, 30.0),
        ..Default::default()
    });
    let rect = tree.absolute_rect(corner);
    assert_eq!(rect.pos, Vec2::new(160.0, 60.0));

    // repositioning follows parent resize with no explicit propagation
    tree.node_mut(root).size = Extent2::new(400.0, 300.0);
    let rect = tree.absolute_rect(centered);
    assert_eq!(rect.pos, Vec2::new(180.0, 140.0));
}

#[test]
fn test_children_insertion_order() {
    let mut tree = Tree::new(NodeConfig {
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig::default());
    let b = tree.add(root, NodeConfig::default());
    let c = tree.add(root, NodeConfig::default());
    assert_eq!(tree.children(root), &[a, b, c]);

    let mut released = Vec::new();
    tree.remove(b, &mut released);
    assert_eq!(tree.children(root), &[a, c]);
}

#[test]
fn test_is_ancestor_or_self() {
    let mut tree = Tree::new(NodeConfig {
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig {
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let b = tree.add(a, NodeConfig::default());
    let c = tree.add(root, NodeConfig::default());

    assert!(tree.is_ancestor_or_self(root, b));
    assert!(tree.is_ancestor_or_self(a, b));
    assert!(tree.is_ancestor_or_self(b, b));
    assert!(!tree.is_ancestor_or_self(a, c));
    assert!(!tree.is_ancestor_or_self(b, a));
}
