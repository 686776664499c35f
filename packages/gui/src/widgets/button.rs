use crate::{
    frame::{Border, DrawCommand, DrawRect, DrawText, Frame, TextStyle},
    input::MouseButtonEvent,
    rect::Rect,
    widget::{UiCtx, Widget},
};
use std::any::Any;
use vek::*;


/// Visual configuration for [`Button`].
#[derive(Debug, Clone)]
pub struct ButtonConfig {
    pub text: String,
    pub style: TextStyle,
    pub fill: Rgba<f32>,
    pub hover_fill: Rgba<f32>,
    pub border: Option<Border>,
    pub corner_radius: f32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        ButtonConfig {
            text: String::new(),
            style: TextStyle::default(),
            fill: Rgba::new(0.25, 0.25, 0.25, 1.0),
            hover_fill: Rgba::new(0.38, 0.38, 0.38, 1.0),
            border: None,
            corner_radius: 0.0,
        }
    }
}

/// Push button. Swaps its fill while hovered and runs a callback when
/// clicked.
pub struct Button {
    config: ButtonConfig,
    on_press: Option<Box<dyn FnMut(&UiCtx)>>,
    hovered: bool,
}

impl Button {
    pub fn new<F>(config: ButtonConfig, on_press: F) -> Self
    where
        F: FnMut(&UiCtx) + 'static,
    {
        Button {
            config,
            on_press: Some(Box::new(on_press)),
            hovered: false,
        }
    }

    /// A button that only paints. Useful when the press is observed
    /// through bus listeners instead.
    pub fn inert(config: ButtonConfig) -> Self {
        Button {
            config,
            on_press: None,
            hovered: false,
        }
    }

    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.config.text = text.into();
    }
}

impl Widget for Button {
    fn draw(&mut self, rect: Rect, frame: &mut Frame) {
        let fill = if self.hovered {
            self.config.hover_fill
        } else {
            self.config.fill
        };
        frame.push(DrawCommand::Rect(DrawRect {
            rect,
            fill: Some(fill),
            border: self.config.border,
            corner_radius: self.config.corner_radius,
        }));
        if !self.config.text.is_empty() {
            frame.push(DrawCommand::Text(DrawText {
                rect,
                text: self.config.text.clone(),
                style: self.config.style,
            }));
        }
    }

    fn on_click(&mut self, ctx: &UiCtx, _event: &MouseButtonEvent) {
        if let Some(on_press) = self.on_press.as_mut() {
            on_press(ctx);
        }
    }

    fn on_hover_enter(&mut self, _ctx: &UiCtx) {
        self.hovered = true;
    }

    fn on_hover_exit(&mut self, _ctx: &UiCtx) {
        self.hovered = false;
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

#[test]
fn test_button_runs_callback_on_press() {
    use std::{cell::Cell, rc::Rc};

    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();

    let presses = Rc::new(Cell::new(0));
    let presses2 = Rc::clone(&presses);
    scene.add_node(root, NodeConfig {
        size: Extent2::new(80.0, 30.0),
        widget: Box::new(Button::new(ButtonConfig::default(), move |_| {
            presses2.set(presses2.get() + 1);
        })),
        ..Default::default()
    });

    scene.handle_mouse_button(
        &window,
        MouseButton::Left,
        ButtonAction::Press,
        Modifiers::default(),
        Vec2::new(40.0, 15.0),
    );
    assert_eq!(presses.get(), 1);

    // a press elsewhere leaves it alone
    scene.handle_mouse_button(
        &window,
        MouseButton::Left,
        ButtonAction::Press,
        Modifiers::default(),
        Vec2::new(150.0, 150.0),
    );
    assert_eq!(presses.get(), 1);
}

#[test]
fn test_button_hover_swaps_fill() {
    let config = ButtonConfig::default();
    let normal = config.fill;
    let hovered = config.hover_fill;

    let bus = EventBus::new();
    let window = StaticWindow::new(Extent2::new(200.0, 200.0));
    let mut scene = Scene::new(&bus, Extent2::new(200.0, 200.0));
    let root = scene.root();
    scene.add_node(root, NodeConfig {
        size: Extent2::new(80.0, 30.0),
        widget: Box::new(Button::inert(config)),
        ..Default::default()
    });

    let first_fill = |frame: &Frame| match frame.0.first() {
        Some(DrawCommand::Rect(rect)) => rect.fill,
        other => panic!("unexpected command {:?}", other),
    };

    let mut frame = Frame::new();
    scene.draw(&mut frame);
    assert_eq!(first_fill(&frame), Some(normal));

    scene.handle_mouse_move(&window, Vec2::new(40.0, 15.0));
    let mut frame = Frame::new();
    scene.draw(&mut frame);
    assert_eq!(first_fill(&frame), Some(hovered));

    scene.handle_mouse_move(&window, Vec2::new(150.0, 150.0));
    let mut frame = Frame::new();
    scene.draw(&mut frame);
    assert_eq!(first_fill(&frame), Some(normal));
}
