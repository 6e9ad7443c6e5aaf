//! Token scanners for markup and stylesheet source.
//!
//! Both scanners walk bytes and report UTF-16 offsets. Callbacks return
//! [`ControlFlow`](std::ops::ControlFlow); `Break` ends the scan at once,
//! which is how every locator bounds its work to the position of interest.

pub mod markup;
pub mod stylesheet;

pub use markup::{AttributeToken, ElementType, MarkupToken, ScannerOptions};
pub use stylesheet::{StyleToken, TokenType, split_value};
