//! The scene: one tree of nodes wired to one event bus, with hit-testing
//! dispatch and the per-frame update/draw pump.

use crate::{
    frame::{DrawCommand, DrawRect, Frame, TextureHandle},
    input::{
        ButtonAction,
        CharEvent,
        Key,
        KeyEvent,
        Modifiers,
        MouseButton,
        MouseButtonEvent,
        MouseMoveEvent,
        MouseScrollEvent,
        ScrolledAmount,
        WindowResizedEvent,
    },
    layout::{self, FlowParams, GridParams, Layout},
    node::{Node, NodeConfig},
    rect::Rect,
    tree::{NodeId, Tree},
    widget::{AttachCtx, UiCtx, Widget},
    window::UiWindow,
};
use event_bus::{Event, EventBus};
use std::{
    cell::RefCell,
    collections::VecDeque,
    mem,
    rc::Rc,
};
use vek::*;


/// Structural mutation requested from inside a widget callback, applied by
/// the scene once the current dispatch or traversal finishes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Effect {
    SetSize(NodeId, Extent2<f32>),
    SetHidden(NodeId, bool),
    SetDrawOrder(NodeId, i32),
    Remove(NodeId),
}

/// Shared handle to the scene's deferred effect queue.
///
/// Widget callbacks run while the tree is mutably borrowed, so they cannot
/// restructure it directly. They push effects here instead.
#[derive(Clone, Default)]
pub struct EffectQueue(Rc<RefCell<VecDeque<Effect>>>);

impl EffectQueue {
    pub fn push(&self, effect: Effect) {
        self.0.borrow_mut().push_back(effect);
    }

    fn pop(&self) -> Option<Effect> {
        self.0.borrow_mut().pop_front()
    }
}


/// A tree of widget nodes plus the machinery to route input into it.
///
/// Everything runs on one thread, frame by frame: input handlers mutate
/// state and publish to the bus, `update` ticks widgets, `draw` recomputes
/// dirty layouts and emits a [`Frame`]. The scene owns no renderer; texture
/// handles freed by removed widgets accumulate until [`take_released`]
/// hands them to whoever does.
///
/// [`take_released`]: Self::take_released
pub struct Scene {
    tree: Tree,
    bus: EventBus,
    effects: EffectQueue,
    hovered: Option<NodeId>,
    pending_release: Vec<TextureHandle>,
}

impl Scene {
    /// Construct a scene whose root is a manual-layout container filling
    /// the given virtual size.
    pub fn new(bus: &EventBus, size: Extent2<f32>) -> Self {
        Scene {
            tree: Tree::new(NodeConfig {
                size,
                layout: Some(Layout::Manual),
                ..Default::default()
            }),
            bus: bus.clone(),
            effects: EffectQueue::default(),
            hovered: None,
            pending_release: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.contains(id)
    }

    /// Panics if `id` is stale.
    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    /// The node currently under the cursor, if any.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Downcast access to the widget on `id`.
    pub fn widget_mut<W: Widget + 'static>(&mut self, id: NodeId) -> Option<&mut W> {
        self.tree.node_mut(id).widget.as_any_mut().downcast_mut::<W>()
    }

    /// The node's absolute rectangle with layouts brought up to date first.
    pub fn node_rect(&mut self, id: NodeId) -> Rect {
        self.refresh_layouts();
        self.tree.absolute_rect(id)
    }

    /// Insert a node and attach its widget, giving it a bus subscriber
    /// identity that lives as long as the node.
    pub fn add_node(&mut self, parent: NodeId, config: NodeConfig) -> NodeId {
        let id = self.tree.add(parent, config);
        let guard = self.bus.subscriber();
        let ctx = AttachCtx {
            bus: &self.bus,
            effects: &self.effects,
            node: id,
            owner: guard.id(),
        };
        self.tree.node_mut(id).widget.attach(&ctx);
        self.tree.node_mut(id).subscription = Some(guard);
        id
    }

    /// Remove a node and its subtree. A hovered descendant receives its
    /// hover-exit first, then widget cleanup runs and bus subscriptions
    /// drop.
    ///
    /// Panics if `id` is stale.
    pub fn remove_node(&mut self, id: NodeId) {
        self.hover_exit_if_within(id);
        self.tree.remove(id, &mut self.pending_release);
    }

    /// Hiding a subtree removes it from hit-testing and drawing. A hovered
    /// descendant receives its hover-exit at that moment.
    ///
    /// Panics if `id` is stale.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if hidden {
            self.hover_exit_if_within(id);
        }
        self.tree.node_mut(id).hidden = hidden;
    }

    /// Panics if `id` is stale.
    pub fn set_size(&mut self, id: NodeId, size: Extent2<f32>) {
        let node = self.tree.node_mut(id);
        node.size = size;
        if let Some(container) = node.container.as_mut() {
            container.dirty = true;
        }
        self.tree.mark_parent_dirty(id);
    }

    /// Panics if `id` is stale.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Vec2<f32>) {
        self.tree.node_mut(id).anchor = anchor;
    }

    /// Panics if `id` is stale.
    pub fn set_pivot(&mut self, id: NodeId, pivot: Vec2<f32>) {
        self.tree.node_mut(id).pivot = pivot;
    }

    /// Panics if `id` is stale.
    pub fn set_offset(&mut self, id: NodeId, offset: Vec2<f32>) {
        self.tree.node_mut(id).offset = offset;
    }

    /// Panics if `id` is stale.
    pub fn set_draw_order(&mut self, id: NodeId, draw_order: i32) {
        self.tree.node_mut(id).draw_order = draw_order;
    }

    /// Replace a container's layout wholesale.
    ///
    /// Panics if `id` is not a container.
    pub fn set_layout(&mut self, id: NodeId, layout: Layout) {
        match self.tree.node_mut(id).container.as_mut() {
            Some(container) => {
                container.layout = layout;
                container.dirty = true;
            }
            None => panic!("set_layout on non-container node"),
        }
    }

    /// Panics if `id` is not a container using a grid layout.
    pub fn set_grid_params(&mut self, id: NodeId, params: GridParams) {
        match self.tree.node_mut(id).container.as_mut() {
            Some(container) => match container.layout {
                Layout::Grid(ref mut grid) => {
                    grid.params = params;
                    container.dirty = true;
                }
                Layout::StatelessGrid(ref mut p) => {
                    *p = params;
                    container.dirty = true;
                }
                _ => panic!("set_grid_params on a non-grid layout"),
            },
            None => panic!("set_grid_params on non-container node"),
        }
    }

    /// Panics if `id` is not a container using a vertical flow layout.
    pub fn set_flow_params(&mut self, id: NodeId, params: FlowParams) {
        match self.tree.node_mut(id).container.as_mut() {
            Some(container) => match container.layout {
                Layout::VerticalFlow(ref mut p) => {
                    *p = params;
                    container.dirty = true;
                }
                _ => panic!("set_flow_params on a non-flow layout"),
            },
            None => panic!("set_flow_params on non-container node"),
        }
    }

    /// Pin `id` to an explicit grid cell in its parent.
    ///
    /// Panics if the parent does not use the stateful grid layout.
    pub fn set_grid_cell(&mut self, id: NodeId, cell: (u32, u32)) {
        let parent = match self.tree.node(id).parent() {
            Some(parent) => parent,
            None => panic!("set_grid_cell on the root node"),
        };
        let container = self.tree.node_mut(parent).container.as_mut().unwrap();
        match container.layout {
            Layout::Grid(ref mut grid) => {
                grid.set_cell(id, cell);
                container.dirty = true;
            }
            _ => panic!("set_grid_cell requires the parent to use a stateful grid layout"),
        }
    }

    /// The explicit grid cell of `id` in its parent, if one was assigned.
    pub fn grid_cell(&self, id: NodeId) -> Option<(u32, u32)> {
        let parent = self.tree.get(id)?.parent()?;
        match self.tree.get(parent)?.container {
            Some(ref container) => match container.layout {
                Layout::Grid(ref grid) => grid.cell_of(id),
                _ => None,
            },
            None => None,
        }
    }

    /// Route a mouse button change. Clicks are delivered to the hit-tested
    /// widget on press, then the event goes to bus listeners either way.
    pub fn handle_mouse_button(
        &mut self,
        window: &dyn UiWindow,
        button: MouseButton,
        action: ButtonAction,
        mods: Modifiers,
        pos: Vec2<f32>,
    ) {
        let pos = window.to_virtual(pos);
        let event = MouseButtonEvent { button, action, mods, pos };
        if action == ButtonAction::Press {
            self.refresh_layouts();
            if let Some(target) = self.hit_test(pos) {
                self.with_widget(target, |widget, ctx| widget.on_click(ctx, &event));
            }
        }
        self.publish(&event);
        self.apply_effects();
    }

    /// Route a cursor move, re-evaluating which node is hovered. Entering
    /// a node fires its hover-enter, leaving one fires its hover-exit.
    /// The hovered node then receives a hover-move carrying the position,
    /// on entry as on any other move, so widgets that track the cursor
    /// are current from the first event.
    pub fn handle_mouse_move(&mut self, window: &dyn UiWindow, pos: Vec2<f32>) {
        let pos = window.to_virtual(pos);
        self.refresh_layouts();
        let target = self.hit_test(pos);
        if target != self.hovered {
            if let Some(prev) = self.hovered.take() {
                if self.tree.contains(prev) {
                    self.with_widget(prev, |widget, ctx| widget.on_hover_exit(ctx));
                }
            }
            self.hovered = target;
            if let Some(target) = target {
                self.with_widget(target, |widget, ctx| widget.on_hover_enter(ctx));
            }
        }
        if let Some(target) = target {
            self.with_widget(target, |widget, ctx| widget.on_hover_move(ctx, pos));
        }
        self.publish(&MouseMoveEvent { pos });
        self.apply_effects();
    }

    /// The cursor left the window entirely.
    pub fn handle_mouse_leave(&mut self) {
        if let Some(prev) = self.hovered.take() {
            if self.tree.contains(prev) {
                self.with_widget(prev, |widget, ctx| widget.on_hover_exit(ctx));
            }
        }
        self.apply_effects();
    }

    pub fn handle_mouse_scroll(
        &mut self,
        window: &dyn UiWindow,
        amount: ScrolledAmount,
        pos: Vec2<f32>,
    ) {
        let pos = window.to_virtual(pos);
        self.refresh_layouts();
        if let Some(target) = self.hit_test(pos) {
            self.with_widget(target, |widget, ctx| widget.on_scroll(ctx, amount));
        }
        self.publish(&MouseScrollEvent { amount, pos });
        self.apply_effects();
    }

    /// Keyboard input goes to bus listeners only, there is no focus chain.
    pub fn handle_key(&mut self, key: Key, action: ButtonAction, mods: Modifiers) {
        self.publish(&KeyEvent { key, action, mods });
        self.apply_effects();
    }

    pub fn handle_char(&mut self, c: char) {
        self.publish(&CharEvent { c });
        self.apply_effects();
    }

    /// Resize the root to the window's new virtual size and notify
    /// listeners such as full-window backgrounds.
    pub fn handle_resize(&mut self, size: Extent2<f32>) {
        let root = self.tree.root();
        self.set_size(root, size);
        self.publish(&WindowResizedEvent { size });
        self.apply_effects();
    }

    /// Per-frame tick. Hidden subtrees are skipped.
    pub fn update(&mut self, elapsed: f32) {
        self.apply_effects();
        self.refresh_layouts();
        let root = self.tree.root();
        self.update_node(root, elapsed);
        self.apply_effects();
    }

    /// Emit this frame's draw commands, recomputing dirty layouts first.
    /// Children draw over their parent, ordered by draw order then
    /// insertion order.
    pub fn draw(&mut self, frame: &mut Frame) {
        self.apply_effects();
        self.refresh_layouts();
        let root = self.tree.root();
        self.draw_node(root, frame);
    }

    /// Texture handles freed since the last call, for the renderer.
    pub fn take_released(&mut self) -> Vec<TextureHandle> {
        mem::take(&mut self.pending_release)
    }

    /// Tear the whole scene down, returning every texture handle its
    /// widgets still held.
    pub fn destroy(mut self) -> Vec<TextureHandle> {
        let mut released = mem::take(&mut self.pending_release);
        self.tree.teardown(&mut released);
        released
    }

    fn refresh_layouts(&mut self) {
        let root = self.tree.root();
        layout::refresh(&mut self.tree, root);
    }

    fn publish<E: Event>(&self, event: &E) {
        if let Err(e) = self.bus.dispatch(event) {
            error!(%e, "event listeners failed");
            for cause in &e.errors {
                error!(%cause, "listener failure");
            }
        }
    }

    fn hit_test(&self, pos: Vec2<f32>) -> Option<NodeId> {
        self.hit_node(self.tree.root(), pos)
    }

    /// Hit-test the subtree at `id`. Hidden subtrees are skipped. Among
    /// children claiming the point the highest draw order wins, ties going
    /// to the most recently added. A container whose children all miss is
    /// itself the hit if the point is within its own bounds.
    fn hit_node(&self, id: NodeId, pos: Vec2<f32>) -> Option<NodeId> {
        let node = self.tree.node(id);
        if node.hidden {
            return None;
        }
        let mut best: Option<(i32, usize, NodeId)> = None;
        for (index, &child) in self.tree.children(id).iter().enumerate() {
            let child_node = self.tree.node(child);
            if child_node.hidden {
                continue;
            }
            let bounds = child_node.widget
                .interactive_bounds(self.tree.absolute_rect(child));
            if !bounds.contains(pos) {
                continue;
            }
            if best.map(|(order, idx, _)| (child_node.draw_order, index) >= (order, idx))
                .unwrap_or(true)
            {
                best = Some((child_node.draw_order, index, child));
            }
        }
        if let Some((_, _, child)) = best {
            if let Some(hit) = self.hit_node(child, pos) {
                return Some(hit);
            }
        }
        let bounds = node.widget.interactive_bounds(self.tree.absolute_rect(id));
        if bounds.contains(pos) {
            Some(id)
        } else {
            None
        }
    }

    /// Run a widget callback with a context borrowing the scene's bus and
    /// effect queue. The tree stays mutably borrowed for the duration, all
    /// structural change from inside goes through the effects.
    fn with_widget<F>(&mut self, id: NodeId, f: F)
    where
        F: FnOnce(&mut dyn Widget, &UiCtx),
    {
        let rect = self.tree.absolute_rect(id);
        let ctx = UiCtx {
            bus: &self.bus,
            effects: &self.effects,
            node: id,
            rect,
        };
        f(self.tree.node_mut(id).widget.as_mut(), &ctx);
    }

    fn hover_exit_if_within(&mut self, ancestor: NodeId) {
        if let Some(hovered) = self.hovered {
            if self.tree.contains(hovered)
                && self.tree.is_ancestor_or_self(ancestor, hovered)
            {
                self.hovered = None;
                self.with_widget(hovered, |widget, ctx| widget.on_hover_exit(ctx));
            }
        }
    }

    fn update_node(&mut self, id: NodeId, elapsed: f32) {
        if self.tree.node(id).hidden {
            return;
        }
        self.with_widget(id, |widget, ctx| widget.update(ctx, elapsed));
        let children = self.tree.children(id).to_vec();
        for child in children {
            self.update_node(child, elapsed);
        }
    }

    fn draw_node(&mut self, id: NodeId, frame: &mut Frame) {
        if self.tree.node(id).hidden {
            return;
        }
        let rect = self.tree.absolute_rect(id);
        if let Some(backdrop) = self.tree.node(id).backdrop {
            if backdrop.fill.is_some() || backdrop.border.is_some() {
                frame.push(DrawCommand::Rect(DrawRect {
                    rect,
                    fill: backdrop.fill,
                    border: backdrop.border,
                    corner_radius: backdrop.corner_radius,
                }));
            }
        }
        self.tree.node_mut(id).widget.draw(rect, frame);
        let mut children = self.tree.children(id).iter()
            .enumerate()
            .map(|(index, &child)| (self.tree.node(child).draw_order, index, child))
            .collect::<Vec<_>>();
        children.sort_by_key(|&(order, index, _)| (order, index));
        for (_, _, child) in children {
            self.draw_node(child, frame);
        }
    }

    /// Drain the effect queue. Effects against nodes removed by an earlier
    /// effect in the same drain are dropped.
    fn apply_effects(&mut self) {
        while let Some(effect) = self.effects.pop() {
            match effect {
                Effect::SetSize(id, size) => if self.tree.contains(id) {
                    self.set_size(id, size);
                },
                Effect::SetHidden(id, hidden) => if self.tree.contains(id) {
                    self.set_hidden(id, hidden);
                },
                Effect::SetDrawOrder(id, draw_order) => if self.tree.contains(id) {
                    self.set_draw_order(id, draw_order);
                },
                Effect::Remove(id) => if self.tree.contains(id) && id != self.tree.root() {
                    self.remove_node(id);
                },
            }
        }
    }
}


#[cfg(test)]
use crate::{
    widgets::{Image, Label},
    window::StaticWindow,
};
#[cfg(test)]
use std::any::Any;

#[cfg(test)]
struct Probe {
    log: Rc<RefCell<Vec<(&'static str, NodeId)>>>,
}

#[cfg(test)]
impl Probe {
    fn new(log: &Rc<RefCell<Vec<(&'static str, NodeId)>>>) -> Box<Self> {
        Box::new(Probe { log: Rc::clone(log) })
    }
}

#[cfg(test)]
impl Widget for Probe {
    fn on_click(&mut self, ctx: &UiCtx, _event: &MouseButtonEvent) {
        self.log.borrow_mut().push(("click", ctx.node));
    }

    fn on_hover_enter(&mut self, ctx: &UiCtx) {
        self.log.borrow_mut().push(("enter", ctx.node));
    }

    fn on_hover_exit(&mut self, ctx: &UiCtx) {
        self.log.borrow_mut().push(("exit", ctx.node));
    }

    fn on_hover_move(&mut self, ctx: &UiCtx, _pos: Vec2<f32>) {
        self.log.borrow_mut().push(("move", ctx.node));
    }

    fn on_scroll(&mut self, ctx: &UiCtx, _amount: ScrolledAmount) {
        self.log.borrow_mut().push(("scroll", ctx.node));
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
fn press(scene: &mut Scene, window: &StaticWindow, pos: Vec2<f32>) {
    scene.handle_mouse_button(
        window,
        MouseButton::Left,
        ButtonAction::Press,
        Modifiers::default(),
        pos,
    );
}

#[test]
fn test_click_hits_topmost_draw_order() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let _under = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        draw_order: 5,
        widget: Probe::new(&log),
        ..Default::default()
    });
    let over = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        draw_order: 9,
        widget: Probe::new(&log),
        ..Default::default()
    });

    press(&mut scene, &window, Vec2::new(50.0, 50.0));
    assert_eq!(*log.borrow(), vec![("click", over)]);
}

#[test]
fn test_click_tie_goes_to_most_recently_added() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let _first = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Probe::new(&log),
        ..Default::default()
    });
    let second = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Probe::new(&log),
        ..Default::default()
    });

    press(&mut scene, &window, Vec2::new(50.0, 50.0));
    assert_eq!(*log.borrow(), vec![("click", second)]);
}

#[test]
fn test_hidden_subtree_not_hit() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let under = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Probe::new(&log),
        ..Default::default()
    });
    let panel = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        draw_order: 9,
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let _inner = scene.add_node(panel, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Probe::new(&log),
        ..Default::default()
    });

    // hiding the panel removes its whole subtree from hit-testing
    scene.set_hidden(panel, true);
    press(&mut scene, &window, Vec2::new(50.0, 50.0));
    assert_eq!(*log.borrow(), vec![("click", under)]);
}

#[test]
fn test_container_is_fallback_hit() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let panel = scene.add_node(root, NodeConfig {
        size: Extent2::new(150.0, 150.0),
        widget: Probe::new(&log),
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let child = scene.add_node(panel, NodeConfig {
        size: Extent2::new(20.0, 20.0),
        widget: Probe::new(&log),
        ..Default::default()
    });

    // inside the child
    press(&mut scene, &window, Vec2::new(10.0, 10.0));
    // inside the panel, outside the child
    press(&mut scene, &window, Vec2::new(100.0, 100.0));
    assert_eq!(*log.borrow(), vec![("click", child), ("click", panel)]);
}

#[test]
fn test_press_only_click_release_still_published() {
    use std::cell::Cell;

    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let _target = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Probe::new(&log),
        ..Default::default()
    });
    let released = Rc::new(Cell::new(0));
    let released2 = Rc::clone(&released);
    bus.connect_static::<MouseButtonEvent, _>(move |event| {
        if event.action == ButtonAction::Release {
            released2.set(released2.get() + 1);
        }
        Ok(())
    });

    scene.handle_mouse_button(
        &window,
        MouseButton::Left,
        ButtonAction::Release,
        Modifiers::default(),
        Vec2::new(50.0, 50.0),
    );
    assert!(log.borrow().is_empty());
    assert_eq!(released.get(), 1);
}

#[test]
fn test_tree_click_delivered_before_bus_listeners() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let target = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Probe::new(&log),
        ..Default::default()
    });
    let sentinel = NodeId(usize::MAX);
    let log2 = Rc::clone(&log);
    bus.connect_static::<MouseButtonEvent, _>(move |_| {
        log2.borrow_mut().push(("bus", sentinel));
        Ok(())
    });

    press(&mut scene, &window, Vec2::new(50.0, 50.0));
    assert_eq!(*log.borrow(), vec![("click", target), ("bus", sentinel)]);
}

#[test]
fn test_hover_enter_exit_exactly_once() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let a = scene.add_node(root, NodeConfig {
        size: Extent2::new(50.0, 50.0),
        widget: Probe::new(&log),
        ..Default::default()
    });
    let b = scene.add_node(root, NodeConfig {
        offset: Vec2::new(100.0, 0.0),
        size: Extent2::new(50.0, 50.0),
        widget: Probe::new(&log),
        ..Default::default()
    });

    scene.handle_mouse_move(&window, Vec2::new(25.0, 25.0));
    scene.handle_mouse_move(&window, Vec2::new(30.0, 25.0));
    scene.handle_mouse_move(&window, Vec2::new(125.0, 25.0));
    assert_eq!(
        *log.borrow(),
        vec![
            ("enter", a),
            ("move", a),
            ("move", a),
            ("exit", a),
            ("enter", b),
            ("move", b),
        ],
    );
    assert_eq!(scene.hovered(), Some(b));
}

#[test]
fn test_hover_exit_on_hide() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let a = scene.add_node(root, NodeConfig {
        size: Extent2::new(50.0, 50.0),
        widget: Probe::new(&log),
        ..Default::default()
    });
    scene.handle_mouse_move(&window, Vec2::new(25.0, 25.0));
    scene.set_hidden(a, true);
    scene.set_hidden(a, false);

    assert_eq!(*log.borrow(), vec![("enter", a), ("move", a), ("exit", a)]);
    assert_eq!(scene.hovered(), None);
}

#[test]
fn test_hover_exit_on_ancestor_removal() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let panel = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    let inner = scene.add_node(panel, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Probe::new(&log),
        ..Default::default()
    });

    scene.handle_mouse_move(&window, Vec2::new(50.0, 50.0));
    scene.remove_node(panel);
    assert_eq!(
        *log.borrow(),
        vec![("enter", inner), ("move", inner), ("exit", inner)],
    );
    assert_eq!(scene.hovered(), None);
    assert!(!scene.contains(panel));
    assert!(!scene.contains(inner));
}

#[test]
fn test_scroll_routed_to_hovered_point() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = scene.root();

    let a = scene.add_node(root, NodeConfig {
        size: Extent2::new(50.0, 50.0),
        widget: Probe::new(&log),
        ..Default::default()
    });
    scene.handle_mouse_scroll(
        &window,
        ScrolledAmount::Lines(Vec2::new(0.0, -3.0)),
        Vec2::new(25.0, 25.0),
    );
    assert_eq!(*log.borrow(), vec![("scroll", a)]);
}

#[test]
fn test_resize_updates_root_and_publishes() {
    use std::cell::Cell;

    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));

    let seen = Rc::new(Cell::new(Extent2::new(0.0, 0.0)));
    let seen2 = Rc::clone(&seen);
    bus.connect_static::<WindowResizedEvent, _>(move |event| {
        seen2.set(event.size);
        Ok(())
    });

    scene.handle_resize(Extent2::new(300.0, 120.0));
    assert_eq!(scene.node(scene.root()).size(), Extent2::new(300.0, 120.0));
    assert_eq!(seen.get(), Extent2::new(300.0, 120.0));
}

#[test]
fn test_effects_deferred_until_after_dispatch() {
    struct HideOnClick;

    impl Widget for HideOnClick {
        fn on_click(&mut self, ctx: &UiCtx, _event: &MouseButtonEvent) {
            ctx.effects.push(Effect::SetHidden(ctx.node, true));
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let a = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Box::new(HideOnClick),
        ..Default::default()
    });

    assert!(!scene.node(a).hidden());
    press(&mut scene, &window, Vec2::new(50.0, 50.0));
    assert!(scene.node(a).hidden());
}

#[test]
fn test_removed_image_hands_back_texture() {
    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let image = scene.add_node(root, NodeConfig {
        size: Extent2::new(64.0, 64.0),
        widget: Box::new(Image::new(TextureHandle(7))),
        ..Default::default()
    });

    scene.remove_node(image);
    assert_eq!(scene.take_released(), vec![TextureHandle(7)]);
    assert!(scene.take_released().is_empty());
}

#[test]
#[should_panic]
fn test_mutating_a_removed_node_panics() {
    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let a = scene.add_node(root, NodeConfig::default());

    scene.remove_node(a);
    scene.set_size(a, Extent2::new(10.0, 10.0));
}

#[test]
fn test_destroy_releases_remaining_textures() {
    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    scene.add_node(root, NodeConfig {
        widget: Box::new(Image::new(TextureHandle(3))),
        ..Default::default()
    });
    scene.add_node(root, NodeConfig {
        widget: Box::new(Image::new(TextureHandle(4))),
        ..Default::default()
    });

    let mut released = scene.destroy();
    released.sort_by_key(|handle| handle.0);
    assert_eq!(released, vec![TextureHandle(3), TextureHandle(4)]);
}

#[test]
fn test_widget_mut_downcast() {
    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let label = scene.add_node(root, NodeConfig {
        widget: Box::new(Label::new("before")),
        ..Default::default()
    });

    scene.widget_mut::<Label>(label).unwrap().text = "after".to_owned();
    assert_eq!(scene.widget_mut::<Label>(label).unwrap().text, "after");
    assert!(scene.widget_mut::<Image>(label).is_none());
}

#[test]
fn test_grid_cell_assignment_and_lookup() {
    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let grid = scene.add_node(root, NodeConfig {
        layout: Some(Layout::Grid(crate::layout::GridLayout::new(GridParams {
            columns: 3,
            cell_size: Extent2::new(20.0, 20.0),
            ..Default::default()
        }))),
        ..Default::default()
    });
    let a = scene.add_node(grid, NodeConfig::default());
    let b = scene.add_node(grid, NodeConfig::default());

    scene.set_grid_cell(b, (2, 1));
    assert_eq!(scene.grid_cell(b), Some((2, 1)));
    assert_eq!(scene.grid_cell(a), None);
    assert_eq!(scene.node_rect(b).pos, Vec2::new(40.0, 20.0));
}
