use crate::{
    frame::{DrawCommand, DrawText, Frame, TextStyle},
    rect::Rect,
    widget::Widget,
};
use std::any::Any;


/// A block of text. Shaping and wrapping are the renderer's job, the label
/// just says what to draw where and in which style.
#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
    pub style: TextStyle,
}

impl Label {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Label {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    pub fn styled<S: Into<String>>(text: S, style: TextStyle) -> Self {
        Label {
            text: text.into(),
            style,
        }
    }
}

impl Widget for Label {
    fn draw(&mut self, rect: Rect, frame: &mut Frame) {
        frame.push(DrawCommand::Text(DrawText {
            rect,
            text: self.text.clone(),
            style: self.style,
        }));
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}


#[test]
fn test_label_draws_its_text() {
    use vek::{Extent2, Vec2};

    let mut label = Label::new("hello");
    let mut frame = Frame::new();
    let rect = Rect {
        pos: Vec2::new(10.0, 10.0),
        size: Extent2::new(100.0, 20.0),
    };
    label.draw(rect, &mut frame);

    assert_eq!(frame.len(), 1);
    match &frame.0[0] {
        DrawCommand::Text(text) => {
            assert_eq!(text.text, "hello");
            assert_eq!(text.rect, rect);
        }
        other => panic!("unexpected command {:?}", other),
    }
}
