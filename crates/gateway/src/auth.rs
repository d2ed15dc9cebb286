//! Authentication contract of the gateway.

use async_trait::async_trait;
use medportal_core::types::{Identity, Timestamp};
use serde_json::Value;

use crate::error::GatewayResult;

/// Email/password pair. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session as issued by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity: Identity,
    /// Bearer token for data requests made on behalf of this identity.
    pub access_token: String,
    /// Profile metadata attached at sign-up (`user_metadata`).
    pub metadata: Value,
    pub expires_at: Option<Timestamp>,
}

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account is active and a session was issued.
    SignedIn(Session),
    /// The account was created but must be confirmed by email before the
    /// user can sign in. No session is issued.
    ConfirmationPending(Identity),
}

impl SignUpOutcome {
    pub fn identity(&self) -> &Identity {
        match self {
            SignUpOutcome::SignedIn(session) => &session.identity,
            SignUpOutcome::ConfirmationPending(identity) => identity,
        }
    }
}

/// Sign-in, sign-up, sign-out and current-session lookup.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> GatewayResult<Session>;

    /// Register a user. `metadata` is merged into the user's profile.
    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: Value,
    ) -> GatewayResult<SignUpOutcome>;

    async fn sign_out(&self) -> GatewayResult<()>;

    /// The session the gateway currently holds, if any.
    async fn current_session(&self) -> GatewayResult<Option<Session>>;
}
