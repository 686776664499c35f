use crate::{
    frame::{DrawCommand, DrawRect, DrawText, Frame, TextStyle},
    input::{ButtonAction, MouseButtonEvent, SelectionChangedEvent},
    rect::Rect,
    scene::Effect,
    widget::{AttachCtx, UiCtx, Widget},
};
use std::{
    any::Any,
    cell::Cell,
    rc::Rc,
};
use vek::*;


/// Visual and behavioral configuration for [`Dropdown`].
#[derive(Debug, Clone)]
pub struct DropdownConfig {
    pub items: Vec<String>,
    pub style: TextStyle,
    pub fill: Rgba<f32>,
    pub popup_fill: Rgba<f32>,
    pub highlight_fill: Rgba<f32>,
    pub row_height: f32,
    /// Draw order the node takes while the popup is open, so the popup
    /// renders and hit-tests in front of siblings.
    pub open_draw_order: i32,
    pub closed_draw_order: i32,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        DropdownConfig {
            items: Vec::new(),
            style: TextStyle::default(),
            fill: Rgba::new(0.2, 0.2, 0.2, 1.0),
            popup_fill: Rgba::new(0.15, 0.15, 0.15, 1.0),
            highlight_fill: Rgba::new(0.3, 0.3, 0.45, 1.0),
            row_height: 24.0,
            open_draw_order: 100,
            closed_draw_order: 0,
        }
    }
}

/// State shared with the bus listener that closes the popup on a press
/// landing anywhere else.
struct Shared {
    open: Cell<bool>,
    base: Cell<Rect>,
    popup: Cell<Rect>,
}

/// Selector that pops a menu of rows out below its base rectangle.
///
/// While open, the popup region counts as part of the widget for
/// hit-testing even though it lies outside the node's own rectangle.
/// Containment is still checked level by level, so place dropdowns in
/// containers large enough to cover where the popup unfolds.
///
/// Closing on an outside click goes through the bus, not the tree: the
/// press may land on and be consumed by any sibling, and the dropdown
/// still has to notice it.
pub struct Dropdown {
    config: DropdownConfig,
    selected: usize,
    hover_item: Option<usize>,
    shared: Rc<Shared>,
}

impl Dropdown {
    pub fn new(config: DropdownConfig) -> Self {
        Dropdown {
            config,
            selected: 0,
            hover_item: None,
            shared: Rc::new(Shared {
                open: Cell::new(false),
                base: Cell::new(Rect::default()),
                popup: Cell::new(Rect::default()),
            }),
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.open.get()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.config.items.get(self.selected).map(String::as_str)
    }

    /// Change the selection without opening the popup or notifying
    /// listeners.
    ///
    /// Panics if `index` is out of range.
    pub fn set_selected(&mut self, index: usize) {
        assert!(
            index < self.config.items.len(),
            "dropdown selection {} out of range",
            index,
        );
        self.selected = index;
    }

    fn row_height(&self) -> f32 {
        self.config.row_height.max(1.0)
    }

    fn close(&self, ctx: &UiCtx) {
        self.shared.open.set(false);
        ctx.effects.push(Effect::SetDrawOrder(ctx.node, self.config.closed_draw_order));
    }

    fn select(&mut self, index: usize, ctx: &UiCtx) {
        self.selected = index;
        let event = SelectionChangedEvent {
            node: ctx.node,
            index,
            value: self.config.items[index].clone(),
        };
        if let Err(e) = ctx.bus.dispatch(&event) {
            error!(%e, "selection listeners failed");
        }
    }
}

impl Widget for Dropdown {
    fn attach(&mut self, ctx: &AttachCtx) {
        let shared = Rc::clone(&self.shared);
        let effects = ctx.effects.clone();
        let node = ctx.node;
        let closed_order = self.config.closed_draw_order;
        ctx.bus.connect::<MouseButtonEvent, _>(ctx.owner, move |event| {
            // a press that landed anywhere outside closes the popup, even
            // when a sibling consumed the click in the tree
            if event.action == ButtonAction::Press
                && shared.open.get()
                && !shared.base.get().contains(event.pos)
                && !shared.popup.get().contains(event.pos)
            {
                shared.open.set(false);
                effects.push(Effect::SetDrawOrder(node, closed_order));
            }
            Ok(())
        });
    }

    fn draw(&mut self, rect: Rect, frame: &mut Frame) {
        self.shared.base.set(rect);
        self.shared.popup.set(popup_rect(rect, &self.config));

        frame.push(DrawCommand::Rect(DrawRect {
            rect,
            fill: Some(self.config.fill),
            border: None,
            corner_radius: 0.0,
        }));
        if let Some(value) = self.selected_value() {
            frame.push(DrawCommand::Text(DrawText {
                rect,
                text: value.to_owned(),
                style: self.config.style,
            }));
        }

        if self.shared.open.get() && !self.config.items.is_empty() {
            let popup = self.shared.popup.get();
            frame.push(DrawCommand::Rect(DrawRect {
                rect: popup,
                fill: Some(self.config.popup_fill),
                border: None,
                corner_radius: 0.0,
            }));
            for (index, item) in self.config.items.iter().enumerate() {
                let row = Rect {
                    pos: Vec2::new(
                        popup.pos.x,
                        popup.pos.y + index as f32 * self.row_height(),
                    ),
                    size: Extent2::new(popup.size.w, self.row_height()),
                };
                if self.hover_item == Some(index) {
                    frame.push(DrawCommand::Rect(DrawRect {
                        rect: row,
                        fill: Some(self.config.highlight_fill),
                        border: None,
                        corner_radius: 0.0,
                    }));
                }
                frame.push(DrawCommand::Text(DrawText {
                    rect: row,
                    text: item.clone(),
                    style: self.config.style,
                }));
            }
        }
    }

    fn on_click(&mut self, ctx: &UiCtx, event: &MouseButtonEvent) {
        self.shared.base.set(ctx.rect);
        self.shared.popup.set(popup_rect(ctx.rect, &self.config));

        if ctx.rect.contains(event.pos) {
            if self.shared.open.get() {
                self.close(ctx);
            } else {
                self.shared.open.set(true);
                ctx.effects.push(Effect::SetDrawOrder(
                    ctx.node,
                    self.config.open_draw_order,
                ));
            }
        } else if self.shared.open.get() {
            let popup = self.shared.popup.get();
            if popup.contains(event.pos) {
                let row = ((event.pos.y - popup.pos.y) / self.row_height()) as usize;
                if row < self.config.items.len() {
                    self.select(row, ctx);
                }
                self.close(ctx);
            }
        }
    }

    fn on_hover_move(&mut self, _ctx: &UiCtx, pos: Vec2<f32>) {
        if !self.shared.open.get() {
            self.hover_item = None;
            return;
        }
        let popup = self.shared.popup.get();
        self.hover_item = if popup.contains(pos) {
            let row = ((pos.y - popup.pos.y) / self.row_height()) as usize;
            if row < self.config.items.len() {
                Some(row)
            } else {
                None
            }
        } else {
            None
        };
    }

    fn on_hover_exit(&mut self, _ctx: &UiCtx) {
        self.hover_item = None;
    }

    fn interactive_bounds(&self, rect: Rect) -> Rect {
        if self.shared.open.get() && !self.config.items.is_empty() {
            rect.union(popup_rect(rect, &self.config))
        } else {
            rect
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn popup_rect(base: Rect, config: &DropdownConfig) -> Rect {
    Rect {
        pos: Vec2::new(base.pos.x, base.y2()),
        size: Extent2::new(
            base.size.w,
            config.items.len() as f32 * config.row_height.max(1.0),
        ),
    }
}


#[cfg(test)]
use crate::{
    input::{Modifiers, MouseButton},
    node::NodeConfig,
    scene::Scene,
    window::StaticWindow,
};
#[cfg(test)]
use event_bus::EventBus;
#[cfg(test)]
use std::cell::RefCell;

#[cfg(test)]
fn items() -> Vec<String> {
    vec!["one".to_owned(), "two".to_owned(), "three".to_owned()]
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
fn test_dropdown_open_select_close() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let dropdown = scene.add_node(root, NodeConfig {
        offset: Vec2::new(20.0, 20.0),
        size: Extent2::new(100.0, 24.0),
        widget: Box::new(Dropdown::new(DropdownConfig {
            items: items(),
            ..Default::default()
        })),
        ..Default::default()
    });

    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen2 = Rc::clone(&seen);
    bus.connect_static::<SelectionChangedEvent, _>(move |event| {
        seen2.borrow_mut().push((event.index, event.value.clone()));
        Ok(())
    });

    // press on the base opens the popup
    press(&mut scene, &window, Vec2::new(50.0, 30.0));
    assert!(scene.widget_mut::<Dropdown>(dropdown).unwrap().is_open());

    // the popup unfolds below the base, row 1 spans y 68..92
    press(&mut scene, &window, Vec2::new(50.0, 80.0));
    let widget = scene.widget_mut::<Dropdown>(dropdown).unwrap();
    assert!(!widget.is_open());
    assert_eq!(widget.selected(), 1);
    assert_eq!(widget.selected_value(), Some("two"));
    assert_eq!(*seen.borrow(), vec![(1, "two".to_owned())]);
}

#[test]
fn test_dropdown_click_outside_closes() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let dropdown = scene.add_node(root, NodeConfig {
        offset: Vec2::new(20.0, 20.0),
        size: Extent2::new(100.0, 24.0),
        widget: Box::new(Dropdown::new(DropdownConfig {
            items: items(),
            ..Default::default()
        })),
        ..Default::default()
    });
    // an unrelated sibling that will consume the outside click
    let sibling = scene.add_node(root, NodeConfig {
        offset: Vec2::new(150.0, 150.0),
        size: Extent2::new(40.0, 40.0),
        ..Default::default()
    });

    press(&mut scene, &window, Vec2::new(50.0, 30.0));
    assert!(scene.widget_mut::<Dropdown>(dropdown).unwrap().is_open());

    // lands on the sibling, the dropdown hears about it through the bus
    press(&mut scene, &window, Vec2::new(160.0, 160.0));
    let widget = scene.widget_mut::<Dropdown>(dropdown).unwrap();
    assert!(!widget.is_open());
    assert_eq!(widget.selected(), 0);
    assert!(scene.contains(sibling));
}

#[test]
fn test_open_popup_wins_over_later_siblings() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let dropdown = scene.add_node(root, NodeConfig {
        offset: Vec2::new(20.0, 20.0),
        size: Extent2::new(100.0, 24.0),
        widget: Box::new(Dropdown::new(DropdownConfig {
            items: items(),
            ..Default::default()
        })),
        ..Default::default()
    });
    // added later and overlapping the popup region, so it would win the
    // tie if the open dropdown did not raise its draw order
    scene.add_node(root, NodeConfig {
        offset: Vec2::new(20.0, 44.0),
        size: Extent2::new(100.0, 80.0),
        ..Default::default()
    });

    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen2 = Rc::clone(&seen);
    bus.connect_static::<SelectionChangedEvent, _>(move |event| {
        seen2.borrow_mut().push(event.index);
        Ok(())
    });

    press(&mut scene, &window, Vec2::new(50.0, 30.0));
    press(&mut scene, &window, Vec2::new(50.0, 50.0));
    // the popup took the press, so row 0 was selected
    assert_eq!(*seen.borrow(), vec![0]);
    assert!(!scene.widget_mut::<Dropdown>(dropdown).unwrap().is_open());
}

#[test]
fn test_dropdown_hover_highlights_row() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    let dropdown = scene.add_node(root, NodeConfig {
        offset: Vec2::new(20.0, 20.0),
        size: Extent2::new(100.0, 24.0),
        widget: Box::new(Dropdown::new(DropdownConfig {
            items: items(),
            ..Default::default()
        })),
        ..Default::default()
    });
    let highlight = DropdownConfig::default().highlight_fill;

    press(&mut scene, &window, Vec2::new(50.0, 30.0));
    // first move hovers the widget, second move slides within it
    scene.handle_mouse_move(&window, Vec2::new(50.0, 50.0));
    scene.handle_mouse_move(&window, Vec2::new(50.0, 80.0));

    let mut frame = Frame::new();
    scene.draw(&mut frame);
    let highlighted = frame.0.iter()
        .filter_map(|command| match command {
            DrawCommand::Rect(rect) if rect.fill == Some(highlight) => Some(rect.rect),
            _ => None,
        })
        .collect::<Vec<_>>();
    // row 1 spans y 68..92
    assert_eq!(highlighted.len(), 1);
    assert_eq!(highlighted[0].pos, Vec2::new(20.0, 68.0));
    assert!(scene.widget_mut::<Dropdown>(dropdown).unwrap().is_open());
}

#[test]
fn test_first_move_into_popup_highlights_immediately() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    scene.add_node(root, NodeConfig {
        offset: Vec2::new(20.0, 20.0),
        size: Extent2::new(100.0, 24.0),
        widget: Box::new(Dropdown::new(DropdownConfig {
            items: items(),
            ..Default::default()
        })),
        ..Default::default()
    });
    let highlight = DropdownConfig::default().highlight_fill;

    press(&mut scene, &window, Vec2::new(50.0, 30.0));
    // nothing was hovered yet, so this one move both enters the widget
    // and lands on row 1
    scene.handle_mouse_move(&window, Vec2::new(50.0, 80.0));

    let mut frame = Frame::new();
    scene.draw(&mut frame);
    let highlighted = frame.0.iter()
        .filter_map(|command| match command {
            DrawCommand::Rect(rect) if rect.fill == Some(highlight) => Some(rect.rect),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(highlighted.len(), 1);
    assert_eq!(highlighted[0].pos, Vec2::new(20.0, 68.0));
}
