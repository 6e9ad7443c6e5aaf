//! Markup locators: the tag under a position, open/close tag pairing and
//! the select-item model.

pub mod select;
pub mod tag;

pub use select::select_item_html;
pub use tag::{
    AttributeInfo, TagInfo, TagMatch, find_tag_match, get_tag, get_tag_matches,
    unquoted_value_range,
};
