//! Header parser trait
//!
//! This module defines the interface every header reader implements so that
//! module assembly never depends on how declarations were extracted.

use crate::config::{ParserBackend, ParserSettings};
use crate::error::ParseResult;
use crate::types::HeaderDescriptor;
use std::path::{Path, PathBuf};

/// Common interface for all header readers
pub trait HeaderParser: Send {
    /// Backend this reader implements
    fn backend(&self) -> ParserBackend;

    /// Read one header and extract its declarations
    ///
    /// `path` is resolved against `prefix` when relative. `module` selects
    /// per-module settings such as extra macros to strip.
    fn parse_header(
        &mut self,
        path: &Path,
        prefix: &Path,
        settings: &ParserSettings,
        module: &str,
    ) -> ParseResult<HeaderDescriptor>;
}

pub fn resolve_header_path(path: &Path, prefix: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        prefix.join(path)
    }
}
