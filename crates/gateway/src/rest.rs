//! HTTP adapter for a PostgREST/GoTrue style backend.
//!
//! [`RestGateway`] holds the connection configuration for one backend
//! project: its base URL and public (anon) key. Data calls go to
//! `/rest/v1/{table}`, auth calls to `/auth/v1/*`. Requests carry the
//! signed-in session's bearer token, or the anon key when signed out.
//!
//! The realtime websocket protocol is not spoken here. [`subscribe`]
//! instead polls the filtered rows on an interval and signals when their
//! SHA-256 fingerprint changes, which is enough for invalidate-and-refetch
//! consumers.
//!
//! [`subscribe`]: DataGateway::subscribe

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use medportal_core::types::{Identity, UserId};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::auth::{AuthGateway, Credentials, Session, SignUpOutcome};
use crate::changes::{ChangeFilter, EventClass};
use crate::channel::Channel;
use crate::data::DataGateway;
use crate::error::{GatewayError, GatewayResult};
use crate::query::{Direction, Query, Row, Update};

/// Default interval between change polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// HTTP gateway handle. Cheap to clone.
#[derive(Clone)]
pub struct RestGateway {
    inner: Arc<RestInner>,
}

struct RestInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    poll_interval: Duration,
    session: RwLock<Option<Session>>,
}

/// Token/sign-up response body from the auth service.
///
/// A sign-up that still needs email confirmation answers with the bare user
/// object instead, which lands in the flattened `id`/`email` fields.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<AuthUser>,
    id: Option<UserId>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: UserId,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl RestGateway {
    /// Create a gateway for the backend at `base_url` (e.g.
    /// `https://project.example.co`) using its public `anon_key`.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self::with_poll_interval(base_url, anon_key, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(RestInner {
                http: reqwest::Client::new(),
                base_url,
                anon_key: anon_key.into(),
                poll_interval,
                session: RwLock::new(None),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }
}

impl RestInner {
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Build a request with the project key and the current bearer token.
    async fn request(&self, method: Method, url: String) -> RequestBuilder {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn select(&self, query: &Query) -> GatewayResult<Vec<Row>> {
        let response = self
            .request(Method::GET, self.rest_url(&query.table))
            .await
            .query(&query_params(query))
            .send()
            .await?;
        let rows: Vec<Row> = read_json(response).await?;
        tracing::debug!(table = %query.table, rows = rows.len(), "REST select");
        Ok(rows)
    }

    async fn store_session(&self, body: AuthResponse) -> GatewayResult<Session> {
        let (Some(access_token), Some(user)) = (body.access_token, body.user) else {
            return Err(GatewayError::InvalidPayload(
                "auth response carries no session".to_string(),
            ));
        };
        let session = Session {
            identity: Identity::new(user.id, user.email.unwrap_or_default()),
            access_token,
            metadata: user.user_metadata,
            expires_at: body
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        };
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }
}

/// Translate a [`Query`] into PostgREST query parameters.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for (column, value) in &query.filters {
        params.push((column.clone(), format!("eq.{}", value_text(value))));
    }
    if let Some(order) = &query.order {
        let direction = match order.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// Query parameters addressing an [`Update`]'s record within its scope.
pub fn update_params(update: &Update) -> Vec<(String, String)> {
    let (column, value) = &update.scope;
    vec![
        ("id".to_string(), format!("eq.{}", update.id)),
        (column.clone(), format!("eq.{}", value_text(value))),
    ]
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fail on non-success statuses, otherwise decode the JSON body.
async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn check_status(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(GatewayError::Unauthorized(message));
    }
    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
    })
}

fn fingerprint(rows: &[Row]) -> GatewayResult<Vec<u8>> {
    let bytes = serde_json::to_vec(rows)?;
    Ok(Sha256::digest(&bytes).to_vec())
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn select(&self, query: &Query) -> GatewayResult<Vec<Row>> {
        self.inner.select(query).await
    }

    async fn insert(&self, table: &str, row: Row) -> GatewayResult<()> {
        if !row.is_object() {
            return Err(GatewayError::InvalidPayload(
                "row must be a JSON object".to_string(),
            ));
        }
        let response = self
            .inner
            .request(Method::POST, self.inner.rest_url(table))
            .await
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        check_status(response).await?;
        tracing::debug!(table, "REST insert");
        Ok(())
    }

    async fn update(&self, update: &Update) -> GatewayResult<u64> {
        let response = self
            .inner
            .request(Method::PATCH, self.inner.rest_url(&update.table))
            .await
            .query(&update_params(update))
            .header("Prefer", "return=representation")
            .json(&update.patch)
            .send()
            .await?;
        let rows: Vec<Row> = read_json(response).await?;
        tracing::debug!(table = %update.table, id = %update.id, rows = rows.len(), "REST update");
        Ok(rows.len() as u64)
    }

    async fn subscribe(&self, filter: ChangeFilter) -> GatewayResult<Channel> {
        // Polling sees row state, not individual events, so it cannot tell an
        // insert from an update.
        if filter.events != EventClass::Any {
            return Err(GatewayError::InvalidPayload(format!(
                "polling subscriptions on {} only support all event classes",
                filter.table
            )));
        }
        let mut query = Query::from(filter.table.clone());
        if let Some((column, value)) = &filter.predicate {
            query = query.eq(column.clone(), value.clone());
        }

        // The first poll establishes the baseline; only later differences signal.
        let mut last = fingerprint(&self.inner.select(&query).await?)?;
        let (feed, channel) = Channel::pair();
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(inner.poll_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = feed.closed() => break,
                    _ = ticker.tick() => {}
                }
                let current = match inner.select(&query).await.and_then(|rows| fingerprint(&rows)) {
                    Ok(current) => current,
                    Err(e) => {
                        tracing::warn!(table = %query.table, error = %e, "Change poll failed");
                        continue;
                    }
                };
                if current != last {
                    last = current;
                    if !feed.signal() {
                        break;
                    }
                }
            }
            tracing::debug!(table = %query.table, "Change poll ended");
        });

        Ok(channel)
    }
}

#[async_trait]
impl AuthGateway for RestGateway {
    async fn sign_in(&self, credentials: &Credentials) -> GatewayResult<Session> {
        let response = self
            .inner
            .http
            .post(self.inner.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.inner.anon_key)
            .json(&json!({"email": credentials.email, "password": credentials.password}))
            .send()
            .await?;
        let body: AuthResponse = read_json(response).await?;
        let session = self.inner.store_session(body).await?;
        tracing::info!(user_id = %session.identity.user_id, "Signed in");
        Ok(session)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: Value,
    ) -> GatewayResult<SignUpOutcome> {
        let response = self
            .inner
            .http
            .post(self.inner.auth_url("signup"))
            .header("apikey", &self.inner.anon_key)
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password,
                "data": metadata,
            }))
            .send()
            .await?;
        let body: AuthResponse = read_json(response).await?;
        if body.access_token.is_some() {
            let session = self.inner.store_session(body).await?;
            tracing::info!(user_id = %session.identity.user_id, "Signed up");
            return Ok(SignUpOutcome::SignedIn(session));
        }

        let (user_id, email) = match (body.user, body.id) {
            (Some(user), _) => (user.id, user.email),
            (None, Some(id)) => (id, body.email),
            (None, None) => {
                return Err(GatewayError::InvalidPayload(
                    "sign-up response carries no user".to_string(),
                ))
            }
        };
        let email = email.unwrap_or_else(|| credentials.email.clone());
        tracing::info!(%user_id, "Signed up, awaiting email confirmation");
        Ok(SignUpOutcome::ConfirmationPending(Identity::new(user_id, email)))
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        let Some(session) = self.inner.session.write().await.take() else {
            return Ok(());
        };
        let response = self
            .inner
            .http
            .post(self.inner.auth_url("logout"))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn current_session(&self) -> GatewayResult<Option<Session>> {
        Ok(self.inner.session.read().await.clone())
    }
}
