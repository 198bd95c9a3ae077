//! Parser sessions.
//!
//! A session owns one header reader for the duration of a run. It is opened
//! from settings before any module is built and closed once every module has
//! been assembled.

use super::{HeaderParser, JsonHeaderParser, TreeSitterHeaderParser};
use crate::config::{ParserBackend, ParserSettings};
use crate::error::ParseResult;
use crate::types::HeaderDescriptor;
use std::path::Path;
use tracing::{debug, info};

pub struct ParserSession {
    parser: Box<dyn HeaderParser>,
    parsed: usize,
}

impl std::fmt::Debug for ParserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserSession")
            .field("backend", &self.parser.backend())
            .field("parsed", &self.parsed)
            .finish()
    }
}

impl ParserSession {
    /// Create the reader selected by `settings.backend`
    pub fn open(settings: &ParserSettings) -> ParseResult<Self> {
        let parser: Box<dyn HeaderParser> = match settings.backend {
            ParserBackend::TreeSitter => Box::new(TreeSitterHeaderParser::new()?),
            ParserBackend::Json => Box::new(JsonHeaderParser::new()),
        };
        info!("Opened {:?} parser session", settings.backend);
        Ok(Self::with_parser(parser))
    }

    /// Wrap an already constructed reader
    pub fn with_parser(parser: Box<dyn HeaderParser>) -> Self {
        Self { parser, parsed: 0 }
    }

    pub fn backend(&self) -> ParserBackend {
        self.parser.backend()
    }

    /// Headers parsed successfully so far
    pub fn parsed(&self) -> usize {
        self.parsed
    }

    pub fn parse_header(
        &mut self,
        path: &Path,
        prefix: &Path,
        settings: &ParserSettings,
        module: &str,
    ) -> ParseResult<HeaderDescriptor> {
        let header = self.parser.parse_header(path, prefix, settings, module)?;
        self.parsed += 1;
        debug!(
            "{}: {} classes, {} templates, {} includes",
            header.short_name,
            header.classes.len(),
            header.class_templates.len(),
            header.dependencies.len()
        );
        Ok(header)
    }

    /// Tear the session down, returning how many headers it parsed
    pub fn close(self) -> usize {
        info!(
            "Closing {:?} parser session after {} headers",
            self.parser.backend(),
            self.parsed
        );
        self.parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use std::path::PathBuf;

    struct FailingParser;

    impl HeaderParser for FailingParser {
        fn backend(&self) -> ParserBackend {
            ParserBackend::Json
        }

        fn parse_header(
            &mut self,
            path: &Path,
            _prefix: &Path,
            _settings: &ParserSettings,
            _module: &str,
        ) -> ParseResult<HeaderDescriptor> {
            Err(ParseError::Aborted {
                path: path.to_path_buf(),
            })
        }
    }

    #[test]
    fn test_open_selects_backend() {
        let settings = ParserSettings {
            backend: ParserBackend::Json,
            ..ParserSettings::default()
        };
        let session = ParserSession::open(&settings).unwrap();
        assert_eq!(session.backend(), ParserBackend::Json);
        assert_eq!(session.close(), 0);

        let session = ParserSession::open(&ParserSettings::default()).unwrap();
        assert_eq!(session.backend(), ParserBackend::TreeSitter);
    }

    #[test]
    fn test_failures_are_not_counted() {
        let mut session = ParserSession::with_parser(Box::new(FailingParser));
        let result = session.parse_header(
            &PathBuf::from("gp_Pnt.hxx"),
            Path::new("/inc"),
            &ParserSettings::default(),
            "gp",
        );

        assert!(matches!(result, Err(ParseError::Aborted { .. })));
        assert_eq!(session.parsed(), 0);
    }
}
