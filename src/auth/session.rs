//! Session data and session-change notifications

use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::types::User;
use crate::error::Error;

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The expiry time in seconds
    #[serde(default)]
    pub expires_in: i64,

    /// The expiry timestamp (unix seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,

    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

impl Session {
    /// Create a new session expiring `expires_in` seconds from now
    pub fn new(access_token: String, refresh_token: String, user: User, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            expires_in,
            expires_at: Some(Utc::now().timestamp() + expires_in),
            user,
        }
    }

    /// Expiry as unix seconds, from `expires_at` or the access token's `exp` claim
    pub fn expiry(&self) -> Option<i64> {
        self.expires_at.or_else(|| token_expiry(&self.access_token).ok().flatten())
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expiry() {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }
}

/// Reads the `exp` claim without verifying the signature; the client holds no signing key.
pub fn token_expiry(token: &str) -> Result<Option<i64>, Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims.exp)
}

/// What caused a session change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    SessionExpired,
}

/// Delivered to every session-change subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct SessionChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn signed_in(session: Session) -> Self {
        Self {
            event: AuthEvent::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            event: AuthEvent::SignedOut,
            session: None,
        }
    }

    pub fn expired() -> Self {
        Self {
            event: AuthEvent::SessionExpired,
            session: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: Some("staff@example.com".to_string()),
            role: Some("authenticated".to_string()),
        }
    }

    fn token_with_exp(exp: i64) -> String {
        encode(
            &Header::default(),
            &json!({ "sub": "user-1", "aud": "authenticated", "exp": exp }),
            &EncodingKey::from_secret(b"project-secret"),
        )
        .unwrap()
    }

    #[test]
    fn new_session_is_not_expired() {
        let session = Session::new("token".into(), "refresh".into(), user(), 3600);
        assert!(!session.is_expired());
    }

    #[test]
    fn explicit_expiry_in_the_past_is_expired() {
        let mut session = Session::new("token".into(), "refresh".into(), user(), 3600);
        session.expires_at = Some(Utc::now().timestamp() - 1);
        assert!(session.is_expired());
    }

    #[test]
    fn falls_back_to_token_exp_claim() {
        let past = Utc::now().timestamp() - 60;
        let mut session = Session::new(token_with_exp(past), "refresh".into(), user(), 0);
        session.expires_at = None;
        assert_eq!(session.expiry(), Some(past));
        assert!(session.is_expired());
    }

    #[test]
    fn opaque_token_without_expiry_never_expires() {
        let mut session = Session::new("not-a-jwt".into(), "refresh".into(), user(), 0);
        session.expires_at = None;
        assert!(!session.is_expired());
    }
}
