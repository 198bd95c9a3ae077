//! Error types for header parsing and module assembly
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a header parser backend
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize {backend} header parser: {reason}")]
    ParserInit { backend: String, reason: String },

    #[error("Failed to read header '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parser gave up on header '{path}' without producing a syntax tree")]
    Aborted { path: PathBuf },

    #[error("No header descriptor found for '{header}' (looked for '{descriptor}')")]
    MissingDescriptor {
        header: PathBuf,
        descriptor: PathBuf,
    },

    #[error("Invalid header descriptor '{path}': {source}")]
    InvalidDescriptor {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors raised while assembling a module
#[derive(Error, Debug)]
pub enum ModuleError {
    /// Header parse failures are passed through untouched
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Inheritance cycle in module '{module}' between classes: {}", classes.join(", "))]
    Cycle {
        module: String,
        classes: Vec<String>,
    },

    #[error("Duplicate {kind} '{name}' in module '{module}' (redeclared in '{header}')")]
    DuplicateSymbol {
        module: String,
        kind: &'static str,
        name: String,
        header: PathBuf,
    },
}

impl ModuleError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON output
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::Parse(ParseError::ParserInit { .. }) => "PARSER_INIT_ERROR",
            Self::Parse(ParseError::FileRead { .. }) => "FILE_READ_ERROR",
            Self::Parse(ParseError::Aborted { .. }) => "PARSE_ABORTED",
            Self::Parse(ParseError::MissingDescriptor { .. }) => "MISSING_DESCRIPTOR",
            Self::Parse(ParseError::InvalidDescriptor { .. }) => "INVALID_DESCRIPTOR",
            Self::Cycle { .. } => "INHERITANCE_CYCLE",
            Self::DuplicateSymbol { .. } => "DUPLICATE_SYMBOL",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Cycle { .. } => vec![
                "Check the listed classes for base clauses that name each other",
                "CRTP bases are reported by name only; exclude the header or rename the base",
            ],
            Self::DuplicateSymbol { .. } => vec![
                "Remove the duplicate header from the module",
                "Set assembly.collision_policy to \"overwrite\" or \"merge\" to accept redeclarations",
            ],
            Self::Parse(ParseError::MissingDescriptor { .. }) => vec![
                "Generate descriptors with the external parser first",
                "Set parser.descriptor_dir to the directory holding the .json descriptors",
            ],
            Self::Parse(ParseError::FileRead { .. }) => vec![
                "Check that the header exists under the configured prefix",
                "Ensure you have read permissions for the header",
            ],
            _ => vec![],
        }
    }
}

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for module assembly
pub type ModuleResult<T> = Result<T, ModuleError>;
