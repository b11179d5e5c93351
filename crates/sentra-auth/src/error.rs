//! Authentication error types.

use sentra_core::error::SentraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid MFA code")]
    MfaInvalidCode,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for SentraError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MfaInvalidCode
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => SentraError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => SentraError::Crypto(msg),
        }
    }
}
