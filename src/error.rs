//! Custom error types for pubmed-pharma.
//!
//! All library functions return `Result<T, PubmedError>` instead of panicking.
//! Per-record extraction failures have their own [`ExtractionError`] so a
//! batch can report why a record was skipped without aborting.

use thiserror::Error;

/// Main error type for pubmed-pharma operations.
#[derive(Debug, Error)]
pub enum PubmedError {
    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// E-utilities returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// Malformed XML response
    #[error("XML error: {0}")]
    Xml(String),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Why one `<PubmedArticle>` could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The article element has no child elements at all
    #[error("article has no content")]
    EmptyArticle,
}

impl From<quick_xml::Error> for PubmedError {
    fn from(e: quick_xml::Error) -> Self {
        PubmedError::Xml(e.to_string())
    }
}

impl From<toml::de::Error> for PubmedError {
    fn from(e: toml::de::Error) -> Self {
        PubmedError::Config(e.to_string())
    }
}

/// Result type alias using `PubmedError`
pub type Result<T> = std::result::Result<T, PubmedError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with an XML error message
    fn ok_or_xml(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_xml(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| PubmedError::Xml(msg.to_string()))
    }
}
