//! Error types for sfutils

use crate::result::SaveResult;
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Result type alias for sfutils operations
pub type SfResult<T> = Result<T, SfError>;

/// Boxed error carried as the cause of a [`SaveFailure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for record and query operations
#[derive(Debug, Error)]
pub enum SfError {
    /// The caller supplied an argument unsuitable for the requested operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A template referenced an argument that was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(MissingParameter),

    /// A create/update outcome reported non-success
    #[error(transparent)]
    SaveFailure(Box<SaveFailure>),

    /// Failure reported by the transport, propagated unmodified
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The transport returned a payload of the wrong shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// A singular helper received no outcome for its single input
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// The placeholder that could not be resolved while building a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingParameter {
    /// `:name` or `::name`
    Named(String),
    /// `?`, identified by its zero-based position among anonymous placeholders
    Positional(usize),
}

impl fmt::Display for MissingParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "'{name}'"),
            Self::Positional(index) => write!(f, "positional argument #{index}"),
        }
    }
}

/// A failed create or update.
///
/// Holds the outcome reported by the remote store and, when the failure
/// arose from a deeper error, that error as [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("Save failure: {}", reported_id(.result))]
pub struct SaveFailure {
    result: SaveResult,
    #[source]
    source: Option<BoxError>,
}

fn reported_id(result: &SaveResult) -> &str {
    result.id.as_deref().unwrap_or("-")
}

impl SaveFailure {
    pub fn new(result: SaveResult) -> Self {
        Self {
            result,
            source: None,
        }
    }

    /// Attach the originating error.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The failing outcome.
    pub fn result(&self) -> &SaveResult {
        &self.result
    }

    /// The identifier reported by the outcome, if any.
    pub fn id(&self) -> Option<&str> {
        self.result.id.as_deref()
    }

    pub fn into_result(self) -> SaveResult {
        self.result
    }
}

impl SfError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a missing parameter error for a named placeholder
    pub fn missing_named(name: impl Into<String>) -> Self {
        Self::MissingParameter(MissingParameter::Named(name.into()))
    }

    /// Create a missing parameter error for an anonymous placeholder
    pub fn missing_positional(index: usize) -> Self {
        Self::MissingParameter(MissingParameter::Positional(index))
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Wrap a failing outcome
    pub fn save_failure(failure: SaveFailure) -> Self {
        Self::SaveFailure(Box::new(failure))
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a missing parameter error
    pub fn is_missing_parameter(&self) -> bool {
        matches!(self, Self::MissingParameter(_))
    }

    /// Check if this is a save failure
    pub fn is_save_failure(&self) -> bool {
        matches!(self, Self::SaveFailure(_))
    }

    /// Check if this error came from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The failing outcome, if this is a save failure
    pub fn as_save_failure(&self) -> Option<&SaveFailure> {
        match self {
            Self::SaveFailure(failure) => Some(&**failure),
            _ => None,
        }
    }
}

impl From<SaveFailure> for SfError {
    fn from(failure: SaveFailure) -> Self {
        Self::save_failure(failure)
    }
}

impl From<serde_json::Error> for SfError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn save_failure_message_names_the_id() {
        let result = SaveResult {
            id: Some("12345".to_string()),
            success: false,
            errors: Vec::new(),
        };
        let failure = SaveFailure::new(result).with_source(std::io::Error::other("Test"));

        assert_eq!(failure.to_string(), "Save failure: 12345");
        assert_eq!(failure.id(), Some("12345"));
        assert_eq!(failure.source().map(|e| e.to_string()).as_deref(), Some("Test"));
    }

    #[test]
    fn save_failure_without_id_or_source() {
        let failure = SaveFailure::new(SaveResult::failed(Vec::new()));
        assert_eq!(failure.to_string(), "Save failure: -");
        assert!(failure.source().is_none());

        let err = SfError::from(failure);
        assert!(err.is_save_failure());
        assert!(!err.as_save_failure().unwrap().result().success);
    }

    #[test]
    fn missing_parameter_display() {
        assert_eq!(
            SfError::missing_named("param").to_string(),
            "Missing parameter: 'param'"
        );
        assert_eq!(
            SfError::missing_positional(2).to_string(),
            "Missing parameter: positional argument #2"
        );
    }
}
