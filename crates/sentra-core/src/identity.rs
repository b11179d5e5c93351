//! Identity types produced at the authentication boundary.
//!
//! The OAuth2 handshake itself is an external collaborator; what this
//! system consumes is the raw attribute map a provider returns after a
//! successful login. [`IdentityAssertion::from_attributes`] normalizes
//! that map exactly once — everything downstream receives the assertion
//! as an explicit value and never re-derives identity from request
//! state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SentraError, SentraResult};

/// Supported third-party identity providers.
///
/// Stored and serialized in upper-case form (`"GOOGLE"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentityProvider {
    Google,
    Github,
    Facebook,
}

impl IdentityProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentityProvider::Google => "GOOGLE",
            IdentityProvider::Github => "GITHUB",
            IdentityProvider::Facebook => "FACEBOOK",
        }
    }
}

impl std::fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized identity assertion: provider, subject id, email, and
/// display name extracted from a provider's raw attribute map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityAssertion {
    pub provider: IdentityProvider,
    pub subject_id: String,
    pub email: String,
    pub display_name: String,
}

impl IdentityAssertion {
    /// Normalize a provider attribute map into an assertion.
    ///
    /// Providers disagree on attribute names and on which attributes
    /// they populate at all. A missing subject id is fatal; a missing
    /// email falls back to a deterministic synthetic address derived
    /// from the provider and subject id, so that an account can still
    /// be clustered on subsequent logins.
    pub fn from_attributes(
        provider: IdentityProvider,
        attributes: &Value,
    ) -> SentraResult<Self> {
        let subject_id = extract_subject_id(provider, attributes).ok_or_else(|| {
            SentraError::AuthenticationFailed {
                reason: format!("{provider} assertion is missing a subject id"),
            }
        })?;

        let email = match non_empty_str(attributes.get("email")) {
            Some(email) => email.to_string(),
            None => synthetic_email(provider, attributes, &subject_id),
        };

        let display_name = extract_display_name(provider, attributes)
            .unwrap_or_else(|| email.clone());

        Ok(Self {
            provider,
            subject_id,
            email,
            display_name,
        })
    }
}

fn extract_subject_id(provider: IdentityProvider, attributes: &Value) -> Option<String> {
    match provider {
        IdentityProvider::Google => {
            non_empty_str(attributes.get("sub")).map(str::to_owned)
        }
        // Github returns a numeric id.
        IdentityProvider::Github => match attributes.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        },
        IdentityProvider::Facebook => {
            non_empty_str(attributes.get("id")).map(str::to_owned)
        }
    }
}

fn synthetic_email(
    provider: IdentityProvider,
    attributes: &Value,
    subject_id: &str,
) -> String {
    match provider {
        IdentityProvider::Github => {
            let login = non_empty_str(attributes.get("login")).unwrap_or(subject_id);
            format!("{login}@github.com")
        }
        IdentityProvider::Facebook => format!("{subject_id}@facebook.com"),
        IdentityProvider::Google => format!("{subject_id}@oauth.com"),
    }
}

fn extract_display_name(provider: IdentityProvider, attributes: &Value) -> Option<String> {
    match provider {
        IdentityProvider::Google | IdentityProvider::Facebook => {
            non_empty_str(attributes.get("name")).map(str::to_owned)
        }
        // Github profiles frequently leave "name" unset; fall back to
        // the login handle.
        IdentityProvider::Github => non_empty_str(attributes.get("name"))
            .or_else(|| non_empty_str(attributes.get("login")))
            .map(str::to_owned),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// An identity whose bearer token has been verified — produced only by
/// token validation and passed explicitly through the call chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn google_assertion() {
        let attrs = json!({
            "sub": "108177",
            "email": "alice@example.com",
            "name": "Alice",
        });
        let assertion =
            IdentityAssertion::from_attributes(IdentityProvider::Google, &attrs).unwrap();
        assert_eq!(assertion.subject_id, "108177");
        assert_eq!(assertion.email, "alice@example.com");
        assert_eq!(assertion.display_name, "Alice");
    }

    #[test]
    fn github_numeric_id_and_login_fallbacks() {
        let attrs = json!({
            "id": 583231,
            "login": "octocat",
        });
        let assertion =
            IdentityAssertion::from_attributes(IdentityProvider::Github, &attrs).unwrap();
        assert_eq!(assertion.subject_id, "583231");
        assert_eq!(assertion.email, "octocat@github.com");
        assert_eq!(assertion.display_name, "octocat");
    }

    #[test]
    fn facebook_synthetic_email() {
        let attrs = json!({
            "id": "fb-9001",
            "name": "Bob",
        });
        let assertion =
            IdentityAssertion::from_attributes(IdentityProvider::Facebook, &attrs).unwrap();
        assert_eq!(assertion.email, "fb-9001@facebook.com");
        assert_eq!(assertion.display_name, "Bob");
    }

    #[test]
    fn missing_subject_id_is_rejected() {
        let attrs = json!({ "email": "x@example.com" });
        let err =
            IdentityAssertion::from_attributes(IdentityProvider::Google, &attrs).unwrap_err();
        assert!(matches!(err, SentraError::AuthenticationFailed { .. }));
    }

    #[test]
    fn empty_email_uses_fallback() {
        let attrs = json!({ "sub": "42", "email": "", "name": "N" });
        let assertion =
            IdentityAssertion::from_attributes(IdentityProvider::Google, &attrs).unwrap();
        assert_eq!(assertion.email, "42@oauth.com");
    }
}
