use crate::widget::Widget;
use std::any::Any;


/// Widget with no behavior and no visuals of its own. The default for
/// plain containers, spacers, and nodes that only want a backdrop.
#[derive(Debug, Default)]
pub struct Pane;

impl Widget for Pane {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
