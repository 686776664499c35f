//! Layout engines for containers.
//!
//! Each container tracks a clean/dirty flag. Structural mutation marks it
//! dirty, and the recompute happens lazily at the start of the next draw or
//! hit-test pass, so many mutations in one frame cost one recompute.

use crate::tree::{NodeId, Tree};
use vek::*;


/// Child storage and layout state carried by container nodes.
pub struct Container {
    pub(crate) children: Vec<NodeId>,
    pub(crate) layout: Layout,
    pub(crate) dirty: bool,
}

impl Container {
    pub(crate) fn new(layout: Layout) -> Self {
        Container {
            children: Vec::new(),
            layout,
            dirty: true,
        }
    }
}

/// How a container positions its children.
#[derive(Debug, Clone)]
pub enum Layout {
    /// Children keep whatever anchor/pivot/offset/size they were given.
    Manual,
    /// Grid with per-child cell assignments remembered across recomputes.
    Grid(GridLayout),
    /// Grid that always derives cells from insertion order.
    StatelessGrid(GridParams),
    /// Top-to-bottom stack that discovers its own height.
    VerticalFlow(FlowParams),
}

/// Grid parameters shared by the stateful and stateless variants.
#[derive(Debug, Copy, Clone)]
pub struct GridParams {
    pub columns: u32,
    /// 0 derives the row count from the highest occupied row.
    pub rows: u32,
    /// A non-positive extent on an axis divides the container's size on
    /// that axis evenly among cells instead of using a fixed size.
    pub cell_size: Extent2<f32>,
    pub spacing: f32,
    pub padding: f32,
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            columns: 1,
            rows: 0,
            cell_size: Extent2::new(0.0, 0.0),
            spacing: 0.0,
            padding: 0.0,
        }
    }
}

/// Grid layout with explicit `(column, row)` assignments. Children without
/// an assignment fall back to insertion-order placement.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub params: GridParams,
    cells: Vec<(NodeId, (u32, u32))>,
}

impl GridLayout {
    pub fn new(params: GridParams) -> Self {
        GridLayout {
            params,
            cells: Vec::new(),
        }
    }

    pub fn set_cell(&mut self, child: NodeId, cell: (u32, u32)) {
        for entry in &mut self.cells {
            if entry.0 == child {
                entry.1 = cell;
                return;
            }
        }
        self.cells.push((child, cell));
    }

    pub fn cell_of(&self, child: NodeId) -> Option<(u32, u32)> {
        self.cells.iter()
            .find(|&&(id, _)| id == child)
            .map(|&(_, cell)| cell)
    }

    pub(crate) fn forget(&mut self, child: NodeId) {
        self.cells.retain(|&(id, _)| id != child);
    }
}

/// Vertical flow parameters.
#[derive(Debug, Copy, Clone, Default)]
pub struct FlowParams {
    /// A positive value forces every child to this height. Non-positive
    /// keeps each child's natural height.
    pub cell_height: f32,
    pub spacing: f32,
    pub padding: f32,
}


/// Recompute dirty layouts in the subtree rooted at `id`, top-down.
pub(crate) fn refresh(tree: &mut Tree, id: NodeId) {
    let (children, dirty) = match tree.node(id).container.as_ref() {
        Some(container) => (container.children.clone(), container.dirty),
        None => return,
    };
    if dirty {
        let layout = tree.node(id).container.as_ref().unwrap().layout.clone();
        match layout {
            Layout::Manual => (),
            Layout::Grid(ref grid) => compute_grid(tree, id, &grid.params, Some(grid)),
            Layout::StatelessGrid(ref params) => compute_grid(tree, id, params, None),
            Layout::VerticalFlow(ref params) => compute_flow(tree, id, params),
        }
        tree.node_mut(id).container.as_mut().unwrap().dirty = false;
    }
    for child in children {
        refresh(tree, child);
    }
}

fn compute_grid(tree: &mut Tree, id: NodeId, params: &GridParams, grid: Option<&GridLayout>) {
    let children = tree.node(id).container.as_ref().unwrap().children.clone();
    let columns = params.columns.max(1);
    let spacing = params.spacing.max(0.0);
    let padding = params.padding.max(0.0);
    let container_size = tree.node(id).size;

    if children.is_empty() {
        // empty grid has zero content, just the padding ring
        let mut size = container_size;
        if params.cell_size.w > 0.0 {
            size.w = 2.0 * padding;
        }
        if params.cell_size.h > 0.0 {
            size.h = 2.0 * padding;
        }
        if size != container_size {
            tree.node_mut(id).size = size;
            tree.mark_parent_dirty(id);
        }
        return;
    }

    let placed = children.iter().enumerate()
        .map(|(index, &child)| {
            let cell = grid
                .and_then(|grid| grid.cell_of(child))
                .unwrap_or((index as u32 % columns, index as u32 / columns));
            (child, cell)
        })
        .collect::<Vec<_>>();
    let rows = if params.rows > 0 {
        params.rows
    } else {
        placed.iter()
            .map(|&(_, (_, row))| row + 1)
            .max()
            .unwrap_or(1)
    };

    let cell_w = if params.cell_size.w > 0.0 {
        params.cell_size.w
    } else {
        container_size.w / columns as f32
    };
    let cell_h = if params.cell_size.h > 0.0 {
        params.cell_size.h
    } else {
        container_size.h / rows.max(1) as f32
    };

    for &(child, (col, row)) in &placed {
        let node = tree.node_mut(child);
        node.anchor = Vec2::new(0.0, 0.0);
        node.pivot = Vec2::new(0.0, 0.0);
        node.offset = Vec2::new(
            padding + col as f32 * (cell_w + spacing),
            padding + row as f32 * (cell_h + spacing),
        );
        node.size = Extent2::new(cell_w, cell_h);
        if let Some(container) = node.container.as_mut() {
            container.dirty = true;
        }
    }

    // the container reports its content size on axes with a fixed cell
    // size, so parents and scrollers can query a stable extent. Auto axes
    // are derived from the container size and must not feed back into it.
    let mut size = container_size;
    if params.cell_size.w > 0.0 {
        size.w = columns as f32 * cell_w
            + columns.saturating_sub(1) as f32 * spacing
            + 2.0 * padding;
    }
    if params.cell_size.h > 0.0 {
        size.h = rows as f32 * cell_h
            + rows.saturating_sub(1) as f32 * spacing
            + 2.0 * padding;
    }
    if size != container_size {
        tree.node_mut(id).size = size;
        tree.mark_parent_dirty(id);
    }
}

fn compute_flow(tree: &mut Tree, id: NodeId, params: &FlowParams) {
    let children = tree.node(id).container.as_ref().unwrap().children.clone();
    let spacing = params.spacing.max(0.0);
    let padding = params.padding.max(0.0);

    // single top-to-bottom pass positions children and discovers the
    // container's own height
    let mut y = padding;
    let mut max_width = 0.0_f32;
    for (index, &child) in children.iter().enumerate() {
        if index > 0 {
            y += spacing;
        }
        let node = tree.node_mut(child);
        node.anchor = Vec2::new(0.0, 0.0);
        node.pivot = Vec2::new(0.0, 0.0);
        node.offset = Vec2::new(padding, y);
        if params.cell_height > 0.0 && node.size.h != params.cell_height {
            node.size.h = params.cell_height;
            if let Some(container) = node.container.as_mut() {
                container.dirty = true;
            }
        }
        y += node.size.h;
        max_width = max_width.max(node.size.w);
    }

    for &child in &children {
        let node = tree.node_mut(child);
        if node.size.w != max_width {
            node.size.w = max_width;
            if let Some(container) = node.container.as_mut() {
                container.dirty = true;
            }
        }
    }

    let height = y + padding;
    if tree.node(id).size.h != height {
        tree.node_mut(id).size.h = height;
        tree.mark_parent_dirty(id);
    }
}


#[cfg(test)]
use crate::node::NodeConfig;

#[test]
fn test_grid_placement_and_content_size() {
    let mut tree = Tree::new(NodeConfig {
        size: Extent2::new(500.0, 500.0),
        layout: Some(Layout::StatelessGrid(GridParams {
            columns: 3,
            cell_size: Extent2::new(50.0, 50.0),
            spacing: 10.0,
            padding: 5.0,
            ..Default::default()
        })),
        ..Default::default()
    });
    let root = tree.root();
    let children = (0..4)
        .map(|_| tree.add(root, NodeConfig::default()))
        .collect::<Vec<_>>();
    refresh(&mut tree, root);

    assert_eq!(tree.node(children[0]).offset, Vec2::new(5.0, 5.0));
    assert_eq!(tree.node(children[1]).offset, Vec2::new(65.0, 5.0));
    assert_eq!(tree.node(children[3]).offset, Vec2::new(5.0, 65.0));
    assert_eq!(tree.node(children[0]).size, Extent2::new(50.0, 50.0));
    assert_eq!(tree.node(root).size, Extent2::new(180.0, 120.0));
}

#[test]
fn test_grid_explicit_cells() {
    let mut grid = GridLayout::new(GridParams {
        columns: 2,
        cell_size: Extent2::new(40.0, 20.0),
        ..Default::default()
    });
    let mut tree = Tree::new(NodeConfig {
        layout: Some(Layout::Grid(grid.clone())),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig::default());
    let b = tree.add(root, NodeConfig::default());

    // b jumps to column 1 row 2, a stays on insertion-order placement
    grid.set_cell(b, (1, 2));
    tree.node_mut(root).container.as_mut().unwrap().layout = Layout::Grid(grid);
    refresh(&mut tree, root);

    assert_eq!(tree.node(a).offset, Vec2::new(0.0, 0.0));
    assert_eq!(tree.node(b).offset, Vec2::new(40.0, 40.0));
    // derived row count covers the explicit placement
    assert_eq!(tree.node(root).size, Extent2::new(80.0, 60.0));
}

#[test]
fn test_grid_auto_cell_size() {
    let mut tree = Tree::new(NodeConfig {
        size: Extent2::new(200.0, 100.0),
        layout: Some(Layout::StatelessGrid(GridParams {
            columns: 2,
            rows: 1,
            ..Default::default()
        })),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig::default());
    let b = tree.add(root, NodeConfig::default());
    refresh(&mut tree, root);

    assert_eq!(tree.node(a).size, Extent2::new(100.0, 100.0));
    assert_eq!(tree.node(b).offset, Vec2::new(100.0, 0.0));
    // auto axes never rewrite the container's own size
    assert_eq!(tree.node(root).size, Extent2::new(200.0, 100.0));
}

#[test]
fn test_vertical_flow_stacks_and_stretches() {
    let mut tree = Tree::new(NodeConfig {
        size: Extent2::new(100.0, 0.0),
        layout: Some(Layout::VerticalFlow(FlowParams {
            spacing: 5.0,
            ..Default::default()
        })),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig {
        size: Extent2::new(30.0, 20.0),
        ..Default::default()
    });
    let b = tree.add(root, NodeConfig {
        size: Extent2::new(70.0, 40.0),
        ..Default::default()
    });
    refresh(&mut tree, root);

    assert_eq!(tree.node(a).offset, Vec2::new(0.0, 0.0));
    assert_eq!(tree.node(b).offset, Vec2::new(0.0, 25.0));
    assert_eq!(tree.node(root).size.h, 65.0);
    // both children stretch to the widest
    assert_eq!(tree.node(a).size.w, 70.0);
    assert_eq!(tree.node(b).size.w, 70.0);
}

#[test]
fn test_vertical_flow_fixed_cell_height() {
    let mut tree = Tree::new(NodeConfig {
        layout: Some(Layout::VerticalFlow(FlowParams {
            cell_height: 30.0,
            padding: 10.0,
            ..Default::default()
        })),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig {
        size: Extent2::new(50.0, 999.0),
        ..Default::default()
    });
    let b = tree.add(root, NodeConfig {
        size: Extent2::new(50.0, 1.0),
        ..Default::default()
    });
    refresh(&mut tree, root);

    assert_eq!(tree.node(a).size.h, 30.0);
    assert_eq!(tree.node(b).size.h, 30.0);
    assert_eq!(tree.node(a).offset, Vec2::new(10.0, 10.0));
    assert_eq!(tree.node(b).offset, Vec2::new(10.0, 40.0));
    assert_eq!(tree.node(root).size.h, 80.0);
}

#[test]
fn test_lazy_recompute() {
    let mut tree = Tree::new(NodeConfig {
        layout: Some(Layout::StatelessGrid(GridParams {
            cell_size: Extent2::new(10.0, 10.0),
            ..Default::default()
        })),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig::default());
    refresh(&mut tree, root);
    assert!(!tree.node(root).container.as_ref().unwrap().dirty);

    // a clean container leaves manual tweaks alone
    tree.node_mut(a).offset = Vec2::new(99.0, 99.0);
    refresh(&mut tree, root);
    assert_eq!(tree.node(a).offset, Vec2::new(99.0, 99.0));

    // adding a child dirties it again and recomputes everything
    tree.add(root, NodeConfig::default());
    refresh(&mut tree, root);
    assert_eq!(tree.node(a).offset, Vec2::new(0.0, 0.0));
}

#[test]
fn test_empty_grid_zero_content() {
    let mut tree = Tree::new(NodeConfig {
        size: Extent2::new(300.0, 300.0),
        layout: Some(Layout::StatelessGrid(GridParams {
            columns: 4,
            cell_size: Extent2::new(50.0, 50.0),
            padding: 5.0,
            ..Default::default()
        })),
        ..Default::default()
    });
    let root = tree.root();
    refresh(&mut tree, root);
    assert_eq!(tree.node(root).size, Extent2::new(10.0, 10.0));
}

#[test]
fn test_negative_spacing_padding_ignored() {
    let mut tree = Tree::new(NodeConfig {
        layout: Some(Layout::StatelessGrid(GridParams {
            columns: 2,
            cell_size: Extent2::new(20.0, 20.0),
            spacing: -5.0,
            padding: -3.0,
            ..Default::default()
        })),
        ..Default::default()
    });
    let root = tree.root();
    let a = tree.add(root, NodeConfig::default());
    let b = tree.add(root, NodeConfig::default());
    refresh(&mut tree, root);

    assert_eq!(tree.node(a).offset, Vec2::new(0.0, 0.0));
    assert_eq!(tree.node(b).offset, Vec2::new(20.0, 0.0));
    assert_eq!(tree.node(root).size, Extent2::new(40.0, 20.0));
}
