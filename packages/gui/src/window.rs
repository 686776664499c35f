//! The window collaborator contract.

use vek::*;


/// What the widget layer needs to know about the window it lives in: the
/// size of the virtual coordinate space and how raw window positions map
/// into it. The embedding implements this over its actual window and passes
/// it into the scene's input entry points.
pub trait UiWindow {
    /// Current size of the virtual coordinate space.
    fn virtual_size(&self) -> Extent2<f32>;

    /// Map a raw window-space position to virtual coordinates.
    fn to_virtual(&self, raw: Vec2<f32>) -> Vec2<f32>;
}

/// Fixed-size window with a uniform scale factor. Enough for tests and
/// headless demos.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StaticWindow {
    pub size: Extent2<f32>,
    pub scale: f32,
}

impl StaticWindow {
    pub fn new(size: Extent2<f32>) -> Self {
        StaticWindow { size, scale: 1.0 }
    }
}

impl UiWindow for StaticWindow {
    fn virtual_size(&self) -> Extent2<f32> {
        self.size
    }

    fn to_virtual(&self, raw: Vec2<f32>) -> Vec2<f32> {
        raw / self.scale
    }
}


#[test]
fn test_static_window_scales_positions() {
    let window = StaticWindow {
        size: Extent2::new(400.0, 300.0),
        scale: 2.0,
    };
    assert_eq!(window.to_virtual(Vec2::new(100.0, 50.0)), Vec2::new(50.0, 25.0));
    assert_eq!(window.virtual_size(), Extent2::new(400.0, 300.0));
}
