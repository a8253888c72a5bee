/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("unknown event type: {0}")]
    UnknownEvent(String),

    #[error("unknown attestation type: {0}")]
    UnknownAttestationType(String),

    #[error("malformed block data for {event}: {reason}")]
    MalformedBlockData { event: String, reason: String },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
