//! Unified error types for sbom-analyzer.
//!
//! Only three conditions stop processing: a document the parsers cannot read,
//! a dependency record that violates the model's hard invariants, and an
//! invalid configuration. Everything else (dangling edges, duplicate ids,
//! missing fields) degrades into the diagnostic fields of the result objects.

use crate::parsers::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-analyzer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomError {
    /// The document could not be read as any supported SBOM format
    #[error("Failed to parse SBOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseError,
    },

    /// A record violates a hard invariant of the canonical model
    #[error("Structural error in record #{index}: {message}")]
    Structural { index: usize, message: String },

    /// The dependency graph exceeds the configured size cap or deadline
    #[error("Dependency graph too large: {detail}")]
    TooLarge { detail: String },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-analyzer operations
pub type Result<T> = std::result::Result<T, SbomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a structural error for the record at `index`
    pub fn structural(index: usize, message: impl Into<String>) -> Self {
        Self::Structural {
            index,
            message: message.into(),
        }
    }

    /// Create a size-cap error
    pub fn too_large(detail: impl Into<String>) -> Self {
        Self::TooLarge {
            detail: detail.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error came from configuration rather than input data.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<ParseError> for SbomError {
    fn from(err: ParseError) -> Self {
        Self::parse(String::new(), err)
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are chained outermost-first, so a failure deep inside a
/// parser reads as `"loading app.spdx.json: malformed JSON: ..."`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomError, new_ctx: &str) -> SbomError {
    match err {
        SbomError::Parse {
            context: existing,
            source,
        } => SbomError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Structural { index, message } => SbomError::Structural {
            index,
            message: chain_context(new_ctx, &message),
        },
        SbomError::TooLarge { detail } => SbomError::TooLarge {
            detail: chain_context(new_ctx, &detail),
        },
        SbomError::Io {
            path,
            message,
            source,
        } => SbomError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomError::Config(msg) => SbomError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_names_record() {
        let err = SbomError::structural(3, "dependency has neither source nor target");
        let display = err.to_string();
        assert!(display.contains("#3"), "should identify the record: {display}");
        assert!(display.contains("neither source nor target"));
    }

    #[test]
    fn test_io_error_includes_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SbomError::io("/path/to/sbom.json", io_err);
        assert!(err.to_string().contains("/path/to/sbom.json"));
    }

    #[test]
    fn test_context_chaining() {
        let initial: Result<()> = Err(SbomError::parse(
            "initial context",
            ParseError::UnknownFormat("no markers".to_string()),
        ));

        match initial.context("outer context") {
            Err(SbomError::Parse { context, .. }) => {
                assert_eq!(context, "outer context: initial context");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_context_on_empty_context() {
        let raw: std::result::Result<(), ParseError> =
            Err(ParseError::Json("eof".to_string()));
        match raw.with_context(|| "reading bom.json") {
            Err(SbomError::Parse { context, source }) => {
                assert_eq!(context, "reading bom.json");
                assert!(matches!(source, ParseError::Json(_)));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_error_is_config() {
        assert!(SbomError::config("negative threshold").is_config());
        assert!(!SbomError::too_large("too many nodes").is_config());
    }
}
