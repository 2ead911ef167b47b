//! Errors for schema installation, edits and document loading.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while installing a JSON schema.
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    /// The schema text failed to parse.
    Json(#[from] serde_json::Error),

    #[error("schema could not be compiled: {0}")]
    /// The schema parsed but is not a usable JSON schema.
    Compile(String),
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
/// A transport-level failure reported by a [`Fetcher`](crate::Fetcher).
pub struct FetchError {
    /// Description of the failure.
    pub message: String,
}

impl FetchError {
    /// Create a fetch error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
/// Errors produced by `load_from_url` / `load_json_schema`.
///
/// By the time a caller sees one of these, the editor has already surfaced it as a notice.
pub enum LoadError {
    #[error("Could not load {url}: {source}")]
    /// The request did not complete.
    Network {
        /// Requested URL.
        url: String,
        /// Transport failure.
        #[source]
        source: FetchError,
    },

    #[error("Could not load {url}: HTTP {status} {status_text}")]
    /// The server answered with a non-success status.
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        status_text: String,
    },

    #[error("Invalid JSON schema at {url}: {source}")]
    /// The schema document could not be parsed or compiled.
    Schema {
        /// Requested URL.
        url: String,
        /// Underlying schema failure.
        #[source]
        source: SchemaError,
    },
}

/// Edit errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edit range is reversed or extends past the document end.
    #[error("Invalid range: {start}..{end} (document has {len} characters)")]
    InvalidRange {
        /// Inclusive start character offset.
        start: usize,
        /// Exclusive end character offset.
        end: usize,
        /// Document length in characters.
        len: usize,
    },
}
