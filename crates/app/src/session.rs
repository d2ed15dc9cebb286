//! Shared session handle.
//!
//! [`SessionManager`] is constructed once by the host and shared as
//! `Arc<SessionManager>`. Dependents either read [`SessionManager::identity`]
//! on demand or hold a [`watch::Receiver`] from [`SessionManager::subscribe`]
//! to react when the user signs in or out.

use std::sync::Arc;

use medportal_core::profile::ProfileMetadata;
use medportal_core::types::Identity;
use medportal_gateway::{AuthGateway, Credentials, GatewayError, Session, SignUpOutcome};
use tokio::sync::watch;

use crate::error::AppResult;

/// Result of a completed registration.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// The new user is signed in.
    SignedIn(Identity),
    /// The account exists but its email must be confirmed before the user
    /// can sign in. The current session is left as it was.
    ConfirmationPending(Identity),
}

impl Registration {
    pub fn identity(&self) -> &Identity {
        match self {
            Registration::SignedIn(identity) | Registration::ConfirmationPending(identity) => {
                identity
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Registration::SignedIn(_))
    }

    /// Text shown to the user once registration succeeds.
    pub fn message(&self) -> &'static str {
        match self {
            Registration::SignedIn(_) => "Your account has been created.",
            Registration::ConfirmationPending(_) => {
                "Your account has been created. Check your email to confirm it before signing in."
            }
        }
    }
}

pub struct SessionManager {
    auth: Arc<dyn AuthGateway>,
    state: watch::Sender<Option<Session>>,
}

impl SessionManager {
    /// Create a signed-out manager without asking the gateway.
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        let (state, _) = watch::channel(None);
        Self { auth, state }
    }

    /// Create a manager and resolve the session the gateway already holds.
    ///
    /// A failed lookup is logged and leaves the manager signed out.
    pub async fn init(auth: Arc<dyn AuthGateway>) -> Arc<Self> {
        let manager = Self::new(auth);
        match manager.auth.current_session().await {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.identity.user_id, "Restored session");
                manager.state.send_replace(Some(session));
            }
            Ok(None) => tracing::debug!("No stored session"),
            Err(e) => tracing::warn!(error = %e, "Failed to resolve current session"),
        }
        Arc::new(manager)
    }

    /// The active session, if signed in.
    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().as_ref().map(|s| s.identity.clone())
    }

    /// Receiver notified on every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> AppResult<Identity> {
        let session = self.auth.sign_in(credentials).await.map_err(|e| {
            tracing::warn!(email = %credentials.email, error = %e, "Sign-in failed");
            e
        })?;
        Ok(self.establish(session))
    }

    /// Register a user with profile metadata. The new user is signed in
    /// unless the backend first requires email confirmation.
    pub async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &ProfileMetadata,
    ) -> AppResult<Registration> {
        let metadata = serde_json::to_value(metadata).map_err(GatewayError::from)?;
        let outcome = self
            .auth
            .sign_up(credentials, metadata)
            .await
            .map_err(|e| {
                tracing::warn!(email = %credentials.email, error = %e, "Sign-up failed");
                e
            })?;
        Ok(match outcome {
            SignUpOutcome::SignedIn(session) => Registration::SignedIn(self.establish(session)),
            SignUpOutcome::ConfirmationPending(identity) => {
                tracing::info!(user_id = %identity.user_id, "Registered, awaiting email confirmation");
                Registration::ConfirmationPending(identity)
            }
        })
    }

    /// Sign out. Local state is cleared and dependents are notified even if
    /// the remote call fails; that failure is still returned.
    pub async fn sign_out(&self) -> AppResult<()> {
        let remote = self.auth.sign_out().await;
        if let Some(previous) = self.state.send_replace(None) {
            tracing::info!(user_id = %previous.identity.user_id, "Signed out");
        }
        if let Err(e) = &remote {
            tracing::warn!(error = %e, "Remote sign-out failed; local session cleared");
        }
        Ok(remote?)
    }

    fn establish(&self, session: Session) -> Identity {
        let identity = session.identity.clone();
        tracing::info!(user_id = %identity.user_id, "Signed in");
        self.state.send_replace(Some(session));
        identity
    }
}
