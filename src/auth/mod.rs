//! Password authentication against the GoTrue API

mod session;
mod types;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::fetch::Fetch;
use crate::gateway::AuthGateway;

pub use session::*;
pub use types::*;

/// Subscribers that fall further behind than this miss intermediate changes
const SESSION_CHANNEL_CAPACITY: usize = 16;

/// Client for Supabase Authentication
pub struct Auth {
    /// The base URL for the Supabase project
    url: String,

    /// The anonymous API key for the Supabase project
    key: String,

    client: Client,

    client_info: String,

    /// The current session
    session: Arc<RwLock<Option<Session>>>,

    changes: broadcast::Sender<SessionChange>,
}

impl Auth {
    pub(crate) fn new(url: &str, key: &str, client: Client, client_info: &str) -> Self {
        let (changes, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            client_info: client_info.to_string(),
            session: Arc::new(RwLock::new(None)),
            changes,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Access token of the current, unexpired session
    pub async fn access_token(&self) -> Option<String> {
        self.get_session().await.map(|session| session.access_token)
    }

    /// Replace the current session and notify subscribers
    pub async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session.clone());
        self.notify(SessionChange::signed_in(session));
    }

    fn notify(&self, change: SessionChange) {
        debug!(event = ?change.event, "session changed");
        // No receivers is not an error: nobody has mounted a gate yet.
        let _ = self.changes.send(change);
    }

    async fn post_credentials(&self, path: &str, email: &str, password: &str) -> Result<Value, Error> {
        let url = self.get_auth_url(path);
        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .json(&Credentials { email, password })?
            .execute::<Value>()
            .await
            .map_err(into_auth_error)
    }
}

/// Backend rejections on auth endpoints surface as auth errors
fn into_auth_error(error: Error) -> Error {
    match error {
        Error::Database { message, .. } => Error::Auth(message),
        other => other,
    }
}

#[async_trait]
impl AuthGateway for Auth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        let body = self
            .post_credentials("/token?grant_type=password", email, password)
            .await?;
        let session: Session = serde_json::from_value(body)?;
        info!(user_id = %session.user.id, "signed in");
        self.set_session(session.clone()).await;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, Error> {
        let body = self.post_credentials("/signup", email, password).await?;

        // With email confirmation enabled the endpoint returns a bare user.
        if body.get("access_token").is_none() {
            info!("signed up, confirmation pending");
            return Ok(None);
        }

        let session: Session = serde_json::from_value(body)?;
        info!(user_id = %session.user.id, "signed up and signed in");
        self.set_session(session.clone()).await;
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), Error> {
        let token = self.session.read().await.as_ref().map(|s| s.access_token.clone());

        if let Some(token) = token {
            let url = self.get_auth_url("/logout");
            let result = Fetch::post(&self.client, &url)
                .header("apikey", &self.key)
                .header("X-Client-Info", &self.client_info)
                .bearer_auth(&token)
                .execute_empty()
                .await;
            // The local session is dropped even if the backend call fails.
            if let Err(e) = result {
                warn!(error = %e, "logout request failed");
            }
        }

        *self.session.write().await = None;
        self.notify(SessionChange::signed_out());
        Ok(())
    }

    async fn get_session(&self) -> Option<Session> {
        let current = self.session.read().await.clone();
        match current {
            Some(session) if session.is_expired() => {
                *self.session.write().await = None;
                self.notify(SessionChange::expired());
                None
            }
            other => other,
        }
    }

    fn on_session_change(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}
