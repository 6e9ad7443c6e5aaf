//! Text utilities shared by every scanner and resolver.
//!
//! - `TextRange` and the range helpers used to build selection models
//! - `Source`, mapping between UTF-16 offsets (what callers speak) and byte
//!   offsets (what the scanners walk)

pub mod range;
pub mod source;

pub use range::{SelectItemModel, TextRange, push_range, token_list};
pub use source::{Source, utf16_len};
