//! C++ header reader implementation

pub mod parser;

pub use parser::{TreeSitterHeaderParser, strip_macros};
