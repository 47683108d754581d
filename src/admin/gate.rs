//! Session gate deciding between the login screen and the dashboard

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::auth::{Session, SessionChange};
use crate::gateway::DynAuthGateway;

/// Authentication state as seen by the back office
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Resolving,
    Unauthenticated,
    Authenticated(Session),
}

/// Which screen the back office shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Loading,
    Login,
    Dashboard,
}

/// Guards the back office behind a session.
///
/// The gate owns its session-change subscription; dropping the gate
/// unsubscribes.
pub struct SessionGate {
    auth: DynAuthGateway,
    changes: broadcast::Receiver<SessionChange>,
    state: SessionState,
}

impl SessionGate {
    /// Subscribe to session changes and resolve the current session.
    ///
    /// The subscription is taken before the lookup so a sign-in racing the
    /// lookup is still observed.
    pub async fn mount(auth: DynAuthGateway) -> Self {
        let changes = auth.on_session_change();
        let mut gate = Self {
            auth,
            changes,
            state: SessionState::Resolving,
        };
        gate.resolve().await;
        gate
    }

    async fn resolve(&mut self) {
        self.state = match self.auth.get_session().await {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Unauthenticated,
        };
        debug!(view = ?self.view(), "session resolved");
    }

    fn apply(&mut self, change: SessionChange) {
        info!(event = ?change.event, "session change");
        self.state = match change.session {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Unauthenticated,
        };
    }

    /// Wait for the next session change and re-evaluate.
    ///
    /// Returns `None` once the auth gateway is gone.
    pub async fn next_change(&mut self) -> Option<&SessionState> {
        match self.changes.recv().await {
            Ok(change) => self.apply(change),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "missed session changes, re-resolving");
                self.resolve().await;
            }
            Err(RecvError::Closed) => return None,
        }
        Some(&self.state)
    }

    /// Apply every change already delivered, without waiting
    pub async fn sync(&mut self) -> &SessionState {
        loop {
            match self.changes.try_recv() {
                Ok(change) => self.apply(change),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed session changes, re-resolving");
                    self.resolve().await;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        &self.state
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn view(&self) -> AdminView {
        match self.state {
            SessionState::Resolving => AdminView::Loading,
            SessionState::Unauthenticated => AdminView::Login,
            SessionState::Authenticated(_) => AdminView::Dashboard,
        }
    }
}
