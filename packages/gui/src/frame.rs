//! Per-frame draw list and the renderer collaborator contract.
//!
//! The scene walks its tree once per frame and appends primitives to a
//! [`Frame`]. The embedding then submits the whole list to its [`Renderer`]
//! fire-and-forget. Rasterization, font shaping, and texture upload all live
//! on the far side of that trait.

use crate::rect::Rect;
use vek::*;


/// Opaque handle to a texture owned by the embedding's renderer. Widgets
/// that hold one must give it back through their cleanup path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Key of a font known to the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FontId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// How a text block is rendered inside its rectangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub font: FontId,
    pub font_size: f32,
    pub color: Rgba<f32>,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font: FontId::default(),
            font_size: 16.0,
            color: Rgba::white(),
            h_align: HAlign::Center,
            v_align: VAlign::Center,
        }
    }
}

/// Border stroke of a rectangle, drawn inside its edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Border {
    pub color: Rgba<f32>,
    pub thickness: f32,
}

/// Filled and/or stroked rectangle, optionally rounded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawRect {
    pub rect: Rect,
    pub fill: Option<Rgba<f32>>,
    pub border: Option<Border>,
    pub corner_radius: f32,
}

/// Textured rectangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawImage {
    pub rect: Rect,
    pub texture: TextureHandle,
    pub tint: Rgba<f32>,
}

/// Text block. Shaping and line layout are the renderer's problem, the
/// style says how to align the shaped result within the rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawText {
    pub rect: Rect,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect(DrawRect),
    Image(DrawImage),
    Text(DrawText),
}


/// One frame's worth of draw commands, in back-to-front order.
#[derive(Debug, Clone, Default)]
pub struct Frame(pub Vec<DrawCommand>);

impl Frame {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.0.push(command);
    }

    /// Reset for reuse, keeping the allocation.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}


/// The rendering collaborator. The widget layer never rasterizes, it hands
/// a finished [`Frame`] to this trait once per frame and reports texture
/// handles it no longer needs.
pub trait Renderer {
    /// Consume one frame's draw list.
    fn submit(&mut self, frame: &Frame);

    /// Free a texture the widget layer has finished with. Handles come out
    /// of [`Scene::take_released`](crate::scene::Scene::take_released) and
    /// scene teardown.
    fn release_texture(&mut self, texture: TextureHandle);
}
