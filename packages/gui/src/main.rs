
#[macro_use]
extern crate tracing;

use gui::{
    logging::init_logging,
    theme::{Theme, THEME_FILE_NAME},
    frame::{Frame, Renderer, TextStyle, TextureHandle},
    input::{
        ButtonAction,
        InputEvent,
        Key,
        KeyEvent,
        Modifiers,
        MouseButton,
        ScrolledAmount,
        SelectionChangedEvent,
    },
    layout::{FlowParams, Layout},
    node::{Backdrop, NodeConfig},
    scene::Scene,
    widgets::{
        Background,
        Button,
        ButtonConfig,
        Dropdown,
        DropdownConfig,
        Image,
        Label,
        TabPanel,
        TabPanelConfig,
    },
    window::{StaticWindow, UiWindow},
    EventBus,
};
use vek::*;


/// Renderer stand-in that logs what it is handed.
struct LogRenderer {
    frames: u64,
}

impl Renderer for LogRenderer {
    fn submit(&mut self, frame: &Frame) {
        self.frames += 1;
        debug!(frame = self.frames, commands = frame.len(), "submitted frame");
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        debug!(?texture, "released texture");
    }
}

fn main() {
    init_logging();
    info!("starting widget gallery");

    let theme = Theme::read(THEME_FILE_NAME);
    let bus = EventBus::new();
    let mut window = StaticWindow::new(Extent2::new(800.0, 600.0));
    let mut scene = Scene::new(&bus, window.virtual_size());
    let mut renderer = LogRenderer { frames: 0 };

    build_ui(&mut scene, &theme);
    wire_listeners(&bus);

    // scripted input below, standing in for a native event loop feeding us
    pump(&mut scene, &mut renderer, 0.016);

    window.size = Extent2::new(1024.0, 768.0);
    scene.handle_resize(window.size);
    pump(&mut scene, &mut renderer, 0.016);

    // hover and press the apply button
    scene.handle_mouse_move(&window, Vec2::new(130.0, 118.0));
    pump(&mut scene, &mut renderer, 0.016);
    press(&mut scene, &window, 130.0, 118.0);
    pump(&mut scene, &mut renderer, 0.016);

    // pick "high" in the quality dropdown
    press(&mut scene, &window, 880.0, 114.0);
    pump(&mut scene, &mut renderer, 0.016);
    press(&mut scene, &window, 880.0, 188.0);
    pump(&mut scene, &mut renderer, 0.016);

    // reopen it, then dismiss it by clicking somewhere else entirely
    press(&mut scene, &window, 880.0, 114.0);
    pump(&mut scene, &mut renderer, 0.016);
    press(&mut scene, &window, 200.0, 500.0);
    pump(&mut scene, &mut renderer, 0.016);

    // switch to the about tab
    press(&mut scene, &window, 146.0, 290.0);
    pump(&mut scene, &mut renderer, 0.016);

    // scroll over the panel, hit escape, type a character
    scene.handle_mouse_scroll(
        &window,
        ScrolledAmount::Lines(Vec2::new(0.0, -3.0)),
        Vec2::new(300.0, 400.0),
    );
    scene.handle_key(Key::Escape, ButtonAction::Press, Modifiers::default());
    scene.handle_char('q');
    pump(&mut scene, &mut renderer, 0.016);

    info!("tearing down");
    for texture in scene.destroy() {
        renderer.release_texture(texture);
    }
    info!("done");
}

// one frame: tick widgets, draw, hand over the frame and any freed textures
fn pump(scene: &mut Scene, renderer: &mut LogRenderer, dt: f32) {
    scene.update(dt);
    let mut frame = Frame::new();
    scene.draw(&mut frame);
    renderer.submit(&frame);
    for texture in scene.take_released() {
        renderer.release_texture(texture);
    }
}

// full press-release pair at one position
fn press(scene: &mut Scene, window: &StaticWindow, x: f32, y: f32) {
    scene.handle_mouse_button(
        window,
        MouseButton::Left,
        ButtonAction::Press,
        Modifiers::default(),
        Vec2::new(x, y),
    );
    scene.handle_mouse_button(
        window,
        MouseButton::Left,
        ButtonAction::Release,
        Modifiers::default(),
        Vec2::new(x, y),
    );
}

// decoupled observers, the way application code would watch the ui
fn wire_listeners(bus: &EventBus) {
    bus.connect_static::<SelectionChangedEvent, _>(|event| {
        info!(
            node = ?event.node,
            index = event.index,
            value = %event.value,
            "selection changed",
        );
        Ok(())
    });
    bus.connect_static::<KeyEvent, _>(|event| {
        if event.key == Key::Escape && event.action == ButtonAction::Press {
            info!("escape pressed");
        }
        Ok(())
    });
    bus.connect_wide_static::<InputEvent, _>(|event| {
        trace!(?event, "input event");
        Ok(())
    });
}

fn build_ui(scene: &mut Scene, theme: &Theme) {
    let root = scene.root();
    let size = scene.node(root).size();
    let text_style = TextStyle {
        font_size: theme.font_size,
        color: Theme::color(theme.text),
        ..Default::default()
    };

    // full-window backdrop that follows resizes
    scene.add_node(root, NodeConfig {
        size,
        draw_order: -1,
        backdrop: Some(Backdrop::solid(Theme::color(theme.background))),
        widget: Box::new(Background),
        ..Default::default()
    });

    scene.add_node(root, NodeConfig {
        anchor: Vec2::new(0.5, 0.0),
        pivot: Vec2::new(0.5, 0.0),
        offset: Vec2::new(0.0, 16.0),
        size: Extent2::new(320.0, 32.0),
        widget: Box::new(Label::styled("widget gallery", TextStyle {
            font_size: theme.font_size * 1.5,
            ..text_style
        })),
        ..Default::default()
    });

    // a column of buttons laid out by the vertical flow
    let column = scene.add_node(root, NodeConfig {
        offset: Vec2::new(40.0, 100.0),
        size: Extent2::new(180.0, 0.0),
        layout: Some(Layout::VerticalFlow(FlowParams {
            cell_height: 36.0,
            spacing: 8.0,
            ..Default::default()
        })),
        ..Default::default()
    });
    for name in ["apply", "revert", "defaults"] {
        let pressed = name;
        scene.add_node(column, NodeConfig {
            size: Extent2::new(180.0, 36.0),
            widget: Box::new(Button::new(
                ButtonConfig {
                    text: name.to_owned(),
                    style: text_style,
                    fill: Theme::color(theme.button),
                    hover_fill: Theme::color(theme.button_hover),
                    corner_radius: theme.corner_radius,
                    ..Default::default()
                },
                move |_| info!(button = pressed, "button pressed"),
            )),
            ..Default::default()
        });
    }

    // quality selector pinned to the top right corner
    scene.add_node(root, NodeConfig {
        anchor: Vec2::new(1.0, 0.0),
        pivot: Vec2::new(1.0, 0.0),
        offset: Vec2::new(-40.0, 100.0),
        size: Extent2::new(200.0, 28.0),
        widget: Box::new(Dropdown::new(DropdownConfig {
            items: ["low", "medium", "high", "ultra"].into_iter()
                .map(str::to_owned)
                .collect(),
            style: text_style,
            fill: Theme::color(theme.button),
            popup_fill: Theme::color(theme.popup),
            highlight_fill: Theme::color(theme.highlight),
            ..Default::default()
        })),
        ..Default::default()
    });

    // tabbed area: the strip widget plus one content pane per tab
    let panel = scene.add_node(root, NodeConfig {
        offset: Vec2::new(40.0, 280.0),
        size: Extent2::new(520.0, 280.0),
        widget: Box::new(TabPanel::new(TabPanelConfig {
            style: text_style,
            tab_fill: Theme::color(theme.button),
            active_fill: Theme::color(theme.button_hover),
            ..Default::default()
        })),
        ..Default::default()
    });
    let general = scene.add_node(root, NodeConfig {
        offset: Vec2::new(40.0, 308.0),
        size: Extent2::new(520.0, 252.0),
        backdrop: Some(Backdrop {
            fill: Some(Theme::color(theme.panel)),
            corner_radius: theme.corner_radius,
            ..Default::default()
        }),
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    scene.add_node(general, NodeConfig {
        offset: Vec2::new(16.0, 16.0),
        size: Extent2::new(240.0, 24.0),
        widget: Box::new(Label::styled("general settings", text_style)),
        ..Default::default()
    });
    let about = scene.add_node(root, NodeConfig {
        offset: Vec2::new(40.0, 308.0),
        size: Extent2::new(520.0, 252.0),
        backdrop: Some(Backdrop {
            fill: Some(Theme::color(theme.panel)),
            corner_radius: theme.corner_radius,
            ..Default::default()
        }),
        layout: Some(Layout::Manual),
        ..Default::default()
    });
    scene.add_node(about, NodeConfig {
        offset: Vec2::new(16.0, 16.0),
        size: Extent2::new(64.0, 64.0),
        // stands in for a texture the renderer uploaded at startup
        widget: Box::new(Image::new(TextureHandle(1))),
        ..Default::default()
    });
    scene.add_node(about, NodeConfig {
        offset: Vec2::new(96.0, 36.0),
        size: Extent2::new(240.0, 24.0),
        widget: Box::new(Label::styled("about this gallery", text_style)),
        ..Default::default()
    });
    let tabs = scene.widget_mut::<TabPanel>(panel).expect("tab panel widget");
    tabs.add_tab("general", "General", general);
    tabs.add_tab("about", "About", about);
}
