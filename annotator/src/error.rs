//! Error taxonomy for loading, classifying and updating contexts.
//!
//! Mapping conflicts are not errors: they are reported through
//! [`crate::report::MappingConflict`] and logged as warnings.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnnotateError>;

/// Fatal errors. Any of these aborts the run before output is written.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// The schema.org property table could not be downloaded.
    #[error("could not load the schema.org property table from {url}: {reason}")]
    ResourceFetch {
        /// Location that was requested.
        url: String,
        /// Transport or HTTP status failure.
        reason: String,
    },

    /// A table or JSON document could not be parsed.
    #[error("could not parse {}: {reason}", path.display())]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A table lacks one or more required columns.
    #[error("{table} must have the following column headers: {}", required.join(", "))]
    SchemaValidation {
        /// Which table was checked (e.g. "annotation table").
        table: String,
        /// The full list of required columns.
        required: Vec<String>,
    },

    /// A schema or context file name does not follow the naming convention.
    #[error("cannot derive a {target} name from `{name}`: expected {expected} `{pattern}`, found {found}")]
    Naming {
        /// The name that was transformed.
        name: String,
        /// Kind of name being derived ("context" or "schema").
        target: &'static str,
        /// The substring whose occurrences were counted.
        pattern: &'static str,
        /// How often it must occur.
        expected: usize,
        /// How often it actually occurs.
        found: usize,
    },

    /// Enrichment was requested without a loaded vocabulary.
    #[error("{operation} needs the schema.org property table, but it was not loaded; check your network access or pass a local copy")]
    VocabularyUnavailable {
        /// The operation that required the vocabulary.
        operation: &'static str,
    },

    /// File system failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl AnnotateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
