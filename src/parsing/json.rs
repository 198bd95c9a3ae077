//! Reader for pre-extracted header descriptors.
//!
//! Each header `<name>` is described by a `<name>.json` file holding a
//! serialized [`HeaderDescriptor`], either next to the header or under
//! `descriptor_dir` when one is configured.

use super::{HeaderParser, resolve_header_path};
use crate::config::{ParserBackend, ParserSettings};
use crate::error::{ParseError, ParseResult};
use crate::types::HeaderDescriptor;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct JsonHeaderParser;

impl JsonHeaderParser {
    pub fn new() -> Self {
        Self
    }

    /// Location of the descriptor for `header`
    pub fn descriptor_path(header: &Path, settings: &ParserSettings) -> PathBuf {
        let file_name = format!(
            "{}.json",
            header
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default()
        );
        match &settings.descriptor_dir {
            Some(dir) => dir.join(file_name),
            None => header.with_file_name(file_name),
        }
    }
}

impl HeaderParser for JsonHeaderParser {
    fn backend(&self) -> ParserBackend {
        ParserBackend::Json
    }

    fn parse_header(
        &mut self,
        path: &Path,
        prefix: &Path,
        settings: &ParserSettings,
        _module: &str,
    ) -> ParseResult<HeaderDescriptor> {
        let header_path = resolve_header_path(path, prefix);
        let descriptor = Self::descriptor_path(&header_path, settings);

        if !descriptor.is_file() {
            return Err(ParseError::MissingDescriptor {
                header: header_path,
                descriptor,
            });
        }

        let content =
            std::fs::read_to_string(&descriptor).map_err(|source| ParseError::FileRead {
                path: descriptor.clone(),
                source,
            })?;
        let mut header: HeaderDescriptor =
            serde_json::from_str(&content).map_err(|source| ParseError::InvalidDescriptor {
                path: descriptor.clone(),
                source,
            })?;

        // Descriptors may omit their own location
        if header.path.as_os_str().is_empty() {
            header.path = header_path.clone();
        }
        if header.short_name.is_empty() {
            header.short_name = HeaderDescriptor::new(&header_path).short_name;
        }

        Ok(header)
    }
}
