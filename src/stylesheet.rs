//! Stylesheet locators: the select-item model and the enclosing rule block.

pub mod section;
pub mod select;

pub use section::{CssProperty, CssSection, get_css_section};
pub use select::select_item_css;
