use crate::{
    frame::{DrawCommand, DrawImage, Frame, TextureHandle},
    rect::Rect,
    widget::Widget,
};
use std::any::Any;
use vek::*;


/// Draws a renderer-owned texture over the node's rectangle and hands the
/// handle back for release when the node goes away.
#[derive(Debug)]
pub struct Image {
    texture: Option<TextureHandle>,
    pub tint: Rgba<f32>,
}

impl Image {
    pub fn new(texture: TextureHandle) -> Self {
        Image {
            texture: Some(texture),
            tint: Rgba::white(),
        }
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Swap the displayed texture. The caller owns releasing the returned
    /// old handle.
    pub fn replace(&mut self, texture: TextureHandle) -> Option<TextureHandle> {
        self.texture.replace(texture)
    }
}

impl Widget for Image {
    fn draw(&mut self, rect: Rect, frame: &mut Frame) {
        if let Some(texture) = self.texture {
            frame.push(DrawCommand::Image(DrawImage {
                rect,
                texture,
                tint: self.tint,
            }));
        }
    }

    fn cleanup(&mut self, released: &mut Vec<TextureHandle>) {
        if let Some(texture) = self.texture.take() {
            released.push(texture);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}


#[test]
fn test_image_cleanup_is_idempotent() {
    let mut image = Image::new(TextureHandle(42));
    let mut released = Vec::new();
    image.cleanup(&mut released);
    image.cleanup(&mut released);

    assert_eq!(released, vec![TextureHandle(42)]);
    assert_eq!(image.texture(), None);
}

#[test]
fn test_image_stops_drawing_after_cleanup() {
    let mut image = Image::new(TextureHandle(1));
    let rect = Rect {
        pos: Vec2::new(0.0, 0.0),
        size: Extent2::new(32.0, 32.0),
    };

    let mut frame = Frame::new();
    image.draw(rect, &mut frame);
    assert_eq!(frame.len(), 1);

    image.cleanup(&mut Vec::new());
    let mut frame = Frame::new();
    image.draw(rect, &mut frame);
    assert!(frame.is_empty());
}
