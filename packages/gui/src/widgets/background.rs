use crate::{
    input::WindowResizedEvent,
    scene::Effect,
    widget::{AttachCtx, Widget},
};
use std::any::Any;


/// Keeps its node sized to the window by listening for resize events on
/// the bus. Pair it with a [`Backdrop`](crate::node::Backdrop) fill or an
/// [`Image`](super::Image), layered below everything else.
#[derive(Debug, Default)]
pub struct Background;

impl Widget for Background {
    fn attach(&mut self, ctx: &AttachCtx) {
        let node = ctx.node;
        let effects = ctx.effects.clone();
        ctx.bus.connect::<WindowResizedEvent, _>(ctx.owner, move |event| {
            effects.push(Effect::SetSize(node, event.size));
            Ok(())
        });
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}


#[test]
fn test_background_follows_window_resizes() {
    use crate::{node::NodeConfig, scene::Scene};
    use event_bus::EventBus;
    use vek::*;

    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(100.0, 100.0));
    let root = scene.root();
    let background = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Box::new(Background),
        ..Default::default()
    });

    scene.handle_resize(Extent2::new(640.0, 480.0));
    assert_eq!(scene.node(background).size(), Extent2::new(640.0, 480.0));
}

#[test]
fn test_background_stops_listening_once_removed() {
    use crate::{node::NodeConfig, scene::Scene};
    use event_bus::EventBus;
    use vek::*;

    let bus = EventBus::new();
    let mut scene = Scene::new(&bus, Extent2::new(100.0, 100.0));
    let root = scene.root();
    let background = scene.add_node(root, NodeConfig {
        size: Extent2::new(100.0, 100.0),
        widget: Box::new(Background),
        ..Default::default()
    });

    scene.remove_node(background);
    // the node's subscription died with it, resizing must not resurrect it
    scene.handle_resize(Extent2::new(640.0, 480.0));
    assert!(!scene.contains(background));
}
