//! Environment-driven server configuration.

use std::env;
use std::fs;

use anyhow::Context;
use sentra_auth::AuthConfig;
use sentra_db::DbConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// `tracing` filter directive (e.g. `info`, `sentra=debug`).
    pub log_level: String,
    pub db: DbConfig,
    /// Path to the PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_path: String,
    /// Path to the PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_path: String,
    pub jwt_issuer: String,
    pub token_lifetime_secs: u64,
    pub totp_issuer: String,
}

impl ServerConfig {
    /// Load configuration from the environment, failing fast on
    /// missing required keys or invalid values.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            port: get_env("PORT", Some("8080"))?
                .parse()
                .context("PORT must be a number")?,
            log_level: get_env("LOG_LEVEL", Some("info"))?,
            db: DbConfig {
                url: get_env("SURREALDB_URL", Some("127.0.0.1:8000"))?,
                namespace: get_env("SURREALDB_NAMESPACE", Some("sentra"))?,
                database: get_env("SURREALDB_DATABASE", Some("main"))?,
                username: get_env("SURREALDB_USERNAME", Some("root"))?,
                password: get_env("SURREALDB_PASSWORD", Some("root"))?,
            },
            jwt_private_key_path: get_env("JWT_PRIVATE_KEY_PATH", None)?,
            jwt_public_key_path: get_env("JWT_PUBLIC_KEY_PATH", None)?,
            jwt_issuer: get_env("JWT_ISSUER", Some("sentra"))?,
            token_lifetime_secs: get_env("TOKEN_LIFETIME_SECS", Some("3600"))?
                .parse()
                .context("TOKEN_LIFETIME_SECS must be a number")?,
            totp_issuer: get_env("TOTP_ISSUER", Some("SENTRA"))?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.port > 0, "PORT must be greater than 0");
        anyhow::ensure!(
            self.token_lifetime_secs > 0,
            "TOKEN_LIFETIME_SECS must be positive"
        );
        Ok(())
    }

    /// Build the auth configuration, reading the JWT key pair from
    /// disk.
    pub fn auth_config(&self) -> anyhow::Result<AuthConfig> {
        let jwt_private_key_pem = fs::read_to_string(&self.jwt_private_key_path)
            .with_context(|| format!("reading {}", self.jwt_private_key_path))?;
        let jwt_public_key_pem = fs::read_to_string(&self.jwt_public_key_path)
            .with_context(|| format!("reading {}", self.jwt_public_key_path))?;

        Ok(AuthConfig {
            jwt_private_key_pem,
            jwt_public_key_pem,
            token_lifetime_secs: self.token_lifetime_secs,
            jwt_issuer: self.jwt_issuer.clone(),
            totp_issuer: self.totp_issuer.clone(),
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> anyhow::Result<String> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => anyhow::bail!("{key} is required but not set"),
        },
    }
}
