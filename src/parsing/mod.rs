pub mod cpp;
pub mod json;
pub mod parser;
pub mod session;

pub use cpp::TreeSitterHeaderParser;
pub use json::JsonHeaderParser;
pub use parser::{HeaderParser, resolve_header_path};
pub use session::ParserSession;
