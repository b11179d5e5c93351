//! Authentication configuration.

/// Configuration for token issuance and MFA enrollment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// Bearer token lifetime in seconds (default: 3600 = 1 hour).
    pub token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Issuer name shown in authenticator apps.
    pub totp_issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            token_lifetime_secs: 3600,
            jwt_issuer: "sentra".into(),
            totp_issuer: "SENTRA".into(),
        }
    }
}
