use sigil_core::CoreError;
use sigil_crypto::CryptoError;
use sigil_store::StoreError;

/// Errors returned by identity operations. All are request-local.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("challenge expired")]
    ChallengeExpired,

    #[error("challenge nonce mismatch")]
    ChallengeMismatch,

    #[error("issuer unauthorized: {0}")]
    IssuerUnauthorized(String),

    #[error("integrity mismatch at block {index}: {reason}")]
    IntegrityMismatch { index: u64, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<CryptoError> for IdentityError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::SignatureVerificationFailed => IdentityError::SignatureInvalid,
            other => IdentityError::ValidationError(other.to_string()),
        }
    }
}

impl From<CoreError> for IdentityError {
    fn from(e: CoreError) -> Self {
        IdentityError::ValidationError(e.to_string())
    }
}
