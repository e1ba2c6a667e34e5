use thiserror::Error;

/// Fatal errors. Business-rule violations in the inputs are never raised
/// through this type; they are reported in a `ValidationFailure`.
#[derive(Debug, Error)]
pub enum PeerValuationError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PeerValuationError {
    fn from(e: serde_json::Error) -> Self {
        PeerValuationError::SerializationError(e.to_string())
    }
}
