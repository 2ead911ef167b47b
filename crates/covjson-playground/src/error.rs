//! Configuration, coverage reading and display errors.

use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or has the wrong shape.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration lists no examples, so there is no default document.
    #[error("invalid config: at least one example is required")]
    NoExamples,
}

/// Coverage reading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The document has no `type`.
    #[error("CoverageJSON document has no \"type\"")]
    MissingType,

    /// The document type is not one the reader understands.
    #[error("unsupported CoverageJSON type: {0}")]
    UnsupportedType(String),

    /// A member has the wrong JSON type.
    #[error("invalid \"{member}\": expected {expected}")]
    InvalidMember {
        /// Member name.
        member: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },
}

/// Why a parsed document could not be shown on the map.
///
/// The messages are shown verbatim in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// The coverage reader rejected the document.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// A generic collection without collection-level parameters.
    #[error("Playground: only coverage collections with a \"parameters\" property are supported")]
    CollectionWithoutParameters,

    /// No layer type exists for the domain type.
    #[error("Playground: unsupported or missing domain type")]
    UnsupportedDomainType,

    /// The layer factory failed.
    #[error("{0}")]
    Layer(String),
}
