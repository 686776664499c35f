//! The widget implementations shipped with the crate.

mod background;
mod button;
mod dropdown;
mod image;
mod label;
mod pane;
mod tabs;

pub use self::{
    background::Background,
    button::{Button, ButtonConfig},
    dropdown::{Dropdown, DropdownConfig},
    image::Image,
    label::Label,
    pane::Pane,
    tabs::{Tab, TabPanel, TabPanelConfig},
};
