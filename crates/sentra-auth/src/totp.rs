//! TOTP enrollment and code verification.

use totp_rs::{Algorithm, Secret, TOTP};

use crate::error::AuthError;

/// TOTP time step in seconds (RFC 6238 default).
pub const TOTP_STEP_SECS: i64 = 30;

/// A freshly generated enrollment: base32 secret plus otpauth URI.
///
/// The URI is what authenticator apps consume; rendering it as a QR
/// code is the caller's concern.
#[derive(Debug, Clone)]
pub struct MfaEnrollment {
    pub secret: String,
    pub provisioning_uri: String,
}

fn build_totp(secret_base32: &str, issuer: &str, account: &str) -> Result<TOTP, AuthError> {
    let secret_bytes = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|e| AuthError::Crypto(format!("secret bytes: {e}")))?;

    TOTP::new(
        Algorithm::SHA1, // RFC 6238 default
        6,               // digits
        1,               // skew (±1 step)
        TOTP_STEP_SECS as u64,
        secret_bytes,
        Some(issuer.to_string()),
        account.to_string(),
    )
    .map_err(|e| AuthError::Crypto(format!("TOTP init: {e}")))
}

/// Generate a TOTP enrollment: random secret + otpauth URI.
pub fn generate_enrollment(issuer: &str, account: &str) -> Result<MfaEnrollment, AuthError> {
    let secret = Secret::generate_secret();
    let base32 = secret.to_encoded().to_string();

    let totp = build_totp(&base32, issuer, account)?;

    Ok(MfaEnrollment {
        secret: base32,
        provisioning_uri: totp.get_url(),
    })
}

/// Verify a TOTP code against a stored base32 secret.
pub fn verify_code(
    secret_base32: &str,
    code: &str,
    issuer: &str,
    account: &str,
) -> Result<bool, AuthError> {
    let totp = build_totp(secret_base32, issuer, account)?;

    totp.check_current(code)
        .map_err(|e| AuthError::Crypto(format!("TOTP check: {e}")))
}
