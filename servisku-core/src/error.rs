/// Structured error types for servisku-core.
///
/// Uses `thiserror` for better API surface and error composition.
/// The binary crate (servisku-cli) can still use `anyhow` for convenience,
/// but library consumers get structured, composable errors.
use thiserror::Error;

/// Main error type for servisku-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Token signing or verification failed
    #[error("token error: {source}")]
    Token {
        #[from]
        source: jsonwebtoken::errors::Error,
    },

    /// Password hashing failed
    #[error("password hash error: {source}")]
    PasswordHash {
        #[from]
        source: bcrypt::BcryptError,
    },

    /// Invalid credential material
    #[error("invalid credential: {reason}")]
    InvalidCredential { reason: String },
}

/// Result type alias for servisku-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an invalid credential error
    pub fn invalid_credential(reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            reason: reason.into(),
        }
    }
}
