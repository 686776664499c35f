use crate::{
    frame::{DrawCommand, DrawRect, DrawText, Frame, TextStyle},
    input::{MouseButtonEvent, SelectionChangedEvent},
    rect::Rect,
    scene::{Effect, EffectQueue},
    tree::NodeId,
    widget::{AttachCtx, UiCtx, Widget},
};
use std::any::Any;
use vek::*;


/// One tab: a stable id for lookups, a title for the strip, and the node
/// whose subtree it shows.
#[derive(Debug, Clone)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub content: NodeId,
}

/// Visual configuration for [`TabPanel`].
#[derive(Debug, Clone)]
pub struct TabPanelConfig {
    pub strip_height: f32,
    pub tab_width: f32,
    pub style: TextStyle,
    pub tab_fill: Rgba<f32>,
    pub active_fill: Rgba<f32>,
}

impl Default for TabPanelConfig {
    fn default() -> Self {
        TabPanelConfig {
            strip_height: 28.0,
            tab_width: 96.0,
            style: TextStyle::default(),
            tab_fill: Rgba::new(0.2, 0.2, 0.2, 1.0),
            active_fill: Rgba::new(0.35, 0.35, 0.35, 1.0),
        }
    }
}

/// A horizontal strip of tabs, each controlling the visibility of a
/// content node registered with it. The content nodes live wherever the
/// caller put them in the tree, the panel only toggles their hidden flag.
pub struct TabPanel {
    config: TabPanelConfig,
    tabs: Vec<Tab>,
    active: usize,
    effects: Option<EffectQueue>,
}

impl TabPanel {
    pub fn new(config: TabPanelConfig) -> Self {
        TabPanel {
            config,
            tabs: Vec::new(),
            active: 0,
            effects: None,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Register a tab controlling `content`. Content of every tab but the
    /// active one is hidden.
    pub fn add_tab<I, T>(&mut self, id: I, title: T, content: NodeId)
    where
        I: Into<String>,
        T: Into<String>,
    {
        self.tabs.push(Tab {
            id: id.into(),
            title: title.into(),
            content,
        });
        self.sync_visibility();
    }

    /// Switch to the tab with the given id.
    ///
    /// Panics if no tab has that id, a missing tab target is a wiring
    /// mistake rather than a runtime condition.
    pub fn select(&mut self, id: &str) {
        match self.tabs.iter().position(|tab| tab.id == id) {
            Some(index) => self.select_index(index, None),
            None => panic!("no tab with id {:?}", id),
        }
    }

    fn select_index(&mut self, index: usize, ctx: Option<&UiCtx>) {
        self.active = index;
        self.sync_visibility();
        if let Some(ctx) = ctx {
            let tab = &self.tabs[index];
            let event = SelectionChangedEvent {
                node: ctx.node,
                index,
                value: tab.id.clone(),
            };
            if let Err(e) = ctx.bus.dispatch(&event) {
                error!(%e, "selection listeners failed");
            }
        }
    }

    fn sync_visibility(&self) {
        if let Some(effects) = self.effects.as_ref() {
            for (index, tab) in self.tabs.iter().enumerate() {
                effects.push(Effect::SetHidden(tab.content, index != self.active));
            }
        }
    }
}

impl Widget for TabPanel {
    fn attach(&mut self, ctx: &AttachCtx) {
        self.effects = Some(ctx.effects.clone());
        self.sync_visibility();
    }

    fn draw(&mut self, rect: Rect, frame: &mut Frame) {
        for (index, tab) in self.tabs.iter().enumerate() {
            let tab_rect = Rect {
                pos: Vec2::new(
                    rect.pos.x + index as f32 * self.config.tab_width,
                    rect.pos.y,
                ),
                size: Extent2::new(self.config.tab_width, self.config.strip_height),
            };
            let fill = if index == self.active {
                self.config.active_fill
            } else {
                self.config.tab_fill
            };
            frame.push(DrawCommand::Rect(DrawRect {
                rect: tab_rect,
                fill: Some(fill),
                border: None,
                corner_radius: 0.0,
            }));
            frame.push(DrawCommand::Text(DrawText {
                rect: tab_rect,
                text: tab.title.clone(),
                style: self.config.style,
            }));
        }
    }

    fn on_click(&mut self, ctx: &UiCtx, event: &MouseButtonEvent) {
        let local = event.pos - ctx.rect.pos;
        if local.y >= self.config.strip_height {
            return;
        }
        let index = (local.x / self.config.tab_width.max(1.0)) as usize;
        if index < self.tabs.len() && index != self.active {
            self.select_index(index, Some(ctx));
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}


#[cfg(test)]
use crate::{
    input::{ButtonAction, Modifiers, MouseButton},
    node::NodeConfig,
    scene::Scene,
    window::StaticWindow,
};
#[cfg(test)]
use event_bus::EventBus;
#[cfg(test)]
use std::{cell::RefCell, rc::Rc};

#[test]
fn test_select_by_id_standalone() {
    let mut panel = TabPanel::new(TabPanelConfig::default());
    panel.add_tab("general", "General", NodeId(11));
    panel.add_tab("audio", "Audio", NodeId(12));

    assert_eq!(panel.active().unwrap().id, "general");
    panel.select("audio");
    assert_eq!(panel.active().unwrap().id, "audio");
    assert_eq!(panel.active_index(), 1);
}

#[test]
#[should_panic(expected = "no tab with id")]
fn test_select_unknown_tab_panics() {
    let mut panel = TabPanel::new(TabPanelConfig::default());
    panel.add_tab("general", "General", NodeId(11));
    panel.select("nope");
}

#[test]
fn test_tab_click_switches_content_visibility() {
    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(400.0, 300.0));
    let mut scene = Scene::new(&bus, Extent2::new(400.0, 300.0));
    let root = scene.root();

    let panel = scene.add_node(root, NodeConfig {
        size: Extent2::new(400.0, 300.0),
        widget: Box::new(TabPanel::new(TabPanelConfig::default())),
        ..Default::default()
    });
    let first = scene.add_node(root, NodeConfig {
        offset: Vec2::new(0.0, 28.0),
        size: Extent2::new(400.0, 272.0),
        ..Default::default()
    });
    let second = scene.add_node(root, NodeConfig {
        offset: Vec2::new(0.0, 28.0),
        size: Extent2::new(400.0, 272.0),
        ..Default::default()
    });
    {
        let widget = scene.widget_mut::<TabPanel>(panel).unwrap();
        widget.add_tab("first", "First", first);
        widget.add_tab("second", "Second", second);
    }
    // drain the visibility effects the registrations queued
    scene.update(0.0);
    assert!(!scene.node(first).hidden());
    assert!(scene.node(second).hidden());

    let selections = Rc::new(RefCell::new(Vec::new()));
    let selections2 = Rc::clone(&selections);
    bus.connect_static::<SelectionChangedEvent, _>(move |event| {
        selections2.borrow_mut().push(event.value.clone());
        Ok(())
    });

    // second tab occupies x 96..192 of the strip
    scene.handle_mouse_button(
        &window,
        MouseButton::Left,
        ButtonAction::Press,
        Modifiers::default(),
        Vec2::new(120.0, 10.0),
    );
    assert!(scene.node(first).hidden());
    assert!(!scene.node(second).hidden());
    assert_eq!(*selections.borrow(), vec!["second".to_owned()]);

    // clicking the already active tab is not a selection change
    scene.handle_mouse_button(
        &window,
        MouseButton::Left,
        ButtonAction::Press,
        Modifiers::default(),
        Vec2::new(120.0, 10.0),
    );
    assert_eq!(selections.borrow().len(), 1);
}
