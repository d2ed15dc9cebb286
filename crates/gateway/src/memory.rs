//! In-process gateway.
//!
//! [`MemoryGateway`] implements both [`DataGateway`] and [`AuthGateway`]
//! over `tokio::sync::RwLock` tables. Every applied write is published on a
//! [`ChangeBus`], and each subscription runs a small forwarding task that
//! turns matching events into channel invalidations.
//!
//! It backs offline development and the test suites; it is not a datastore
//! and keeps nothing across process restarts.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medportal_core::types::{Identity, RecordId, UserId};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use crate::auth::{AuthGateway, Credentials, Session, SignUpOutcome};
use crate::changes::{ChangeBus, ChangeEvent, ChangeFilter, ChangeKind};
use crate::channel::Channel;
use crate::data::DataGateway;
use crate::error::{GatewayError, GatewayResult};
use crate::query::{Direction, Query, Row, Update};

/// Lifetime of sessions issued by the in-process auth.
const SESSION_TTL_MINS: i64 = 60;

struct StoredUser {
    user_id: UserId,
    password_digest: String,
    metadata: Value,
    confirmed: bool,
}

/// In-process implementation of the gateway contracts.
#[derive(Default)]
pub struct MemoryGateway {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    bus: ChangeBus,
    channels: RwLock<Vec<CancellationToken>>,
    users: RwLock<HashMap<String, StoredUser>>,
    session: RwLock<Option<Session>>,
    /// New accounts start unconfirmed and sign-up issues no session.
    require_confirmation: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose sign-ups must be confirmed by email (see
    /// [`MemoryGateway::confirm_email`]) before the user can sign in.
    pub fn with_email_confirmation() -> Self {
        Self {
            require_confirmation: true,
            ..Self::default()
        }
    }

    /// Mark an account's email as confirmed. Returns `false` if no account
    /// uses `email`.
    pub async fn confirm_email(&self, email: &str) -> bool {
        match self.users.write().await.get_mut(email) {
            Some(user) => {
                user.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Load rows without publishing change events.
    pub async fn seed(&self, table: &str, rows: impl IntoIterator<Item = Row>) {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Snapshot of every row in `table`, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a row, as an external producer would. Publishes a delete.
    pub async fn delete(&self, table: &str, id: RecordId) -> bool {
        let removed = {
            let mut tables = self.tables.write().await;
            let Some(rows) = tables.get_mut(table) else {
                return false;
            };
            let id = id.to_string();
            let position = rows
                .iter()
                .position(|row| row.get("id").and_then(Value::as_str) == Some(id.as_str()));
            position.map(|i| rows.remove(i))
        };

        match removed {
            Some(row) => {
                self.bus
                    .publish(ChangeEvent::new(table, ChangeKind::Delete, row));
                true
            }
            None => false,
        }
    }

    /// Number of subscriptions whose channel has not been closed yet.
    pub async fn open_channels(&self) -> usize {
        let mut channels = self.channels.write().await;
        channels.retain(|token| !token.is_cancelled());
        channels.len()
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn select(&self, query: &Query) -> GatewayResult<Vec<Row>> {
        let mut rows: Vec<Row> = self
            .tables
            .read()
            .await
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        tracing::debug!(table = %query.table, rows = rows.len(), "Memory select");
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row) -> GatewayResult<()> {
        let Value::Object(mut map) = row else {
            return Err(GatewayError::InvalidPayload(
                "row must be a JSON object".to_string(),
            ));
        };
        map.entry("id")
            .or_insert_with(|| json!(RecordId::new_v4()));
        map.entry("created_at").or_insert_with(|| json!(Utc::now()));
        let row = Value::Object(map);

        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row.clone());

        tracing::debug!(table, "Memory insert");
        self.bus
            .publish(ChangeEvent::new(table, ChangeKind::Insert, row));
        Ok(())
    }

    async fn update(&self, update: &Update) -> GatewayResult<u64> {
        let mut changed = Vec::new();
        {
            let mut tables = self.tables.write().await;
            if let Some(rows) = tables.get_mut(&update.table) {
                for row in rows.iter_mut().filter(|row| update.targets(row)) {
                    if let Value::Object(map) = row {
                        for (column, value) in &update.patch {
                            map.insert(column.clone(), value.clone());
                        }
                    }
                    changed.push(row.clone());
                }
            }
        }

        tracing::debug!(table = %update.table, id = %update.id, rows = changed.len(), "Memory update");
        let count = changed.len() as u64;
        for row in changed {
            self.bus
                .publish(ChangeEvent::new(&update.table, ChangeKind::Update, row));
        }
        Ok(count)
    }

    async fn subscribe(&self, filter: ChangeFilter) -> GatewayResult<Channel> {
        // Subscribe to the bus before returning so no change applied after
        // this call can be missed.
        let mut receiver = self.bus.subscribe();
        let (feed, channel) = Channel::pair();
        {
            let mut channels = self.channels.write().await;
            channels.retain(|token| !token.is_cancelled());
            channels.push(channel.close_token());
        }

        tracing::debug!(table = %filter.table, "Opening change subscription");
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = feed.closed() => break,
                    received = receiver.recv() => match received {
                        Ok(event) => {
                            if filter.matches(&event) && !feed.signal() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                skipped,
                                table = %filter.table,
                                "Change subscription lagged, forcing invalidation"
                            );
                            if !feed.signal() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!(table = %filter.table, "Change subscription ended");
        });

        Ok(channel)
    }
}

#[async_trait]
impl AuthGateway for MemoryGateway {
    async fn sign_in(&self, credentials: &Credentials) -> GatewayResult<Session> {
        let session = {
            let users = self.users.read().await;
            let user = users
                .get(&credentials.email)
                .filter(|user| user.password_digest == digest(&credentials.password))
                .ok_or_else(|| GatewayError::Unauthorized("Invalid login credentials".to_string()))?;
            if !user.confirmed {
                return Err(GatewayError::Rejected {
                    status: 400,
                    message: "Email not confirmed".to_string(),
                });
            }
            issue_session(user.user_id, &credentials.email, user.metadata.clone())
        };

        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: Value,
    ) -> GatewayResult<SignUpOutcome> {
        let session = {
            let mut users = self.users.write().await;
            if users.contains_key(&credentials.email) {
                return Err(GatewayError::Rejected {
                    status: 422,
                    message: "User already registered".to_string(),
                });
            }
            let user_id = UserId::new_v4();
            users.insert(
                credentials.email.clone(),
                StoredUser {
                    user_id,
                    password_digest: digest(&credentials.password),
                    metadata: metadata.clone(),
                    confirmed: !self.require_confirmation,
                },
            );
            if self.require_confirmation {
                tracing::debug!(%user_id, "Sign-up awaiting email confirmation");
                return Ok(SignUpOutcome::ConfirmationPending(Identity::new(
                    user_id,
                    &credentials.email,
                )));
            }
            issue_session(user_id, &credentials.email, metadata)
        };

        *self.session.write().await = Some(session.clone());
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.session.write().await.take();
        Ok(())
    }

    async fn current_session(&self) -> GatewayResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }
}

fn issue_session(user_id: UserId, email: &str, metadata: Value) -> Session {
    Session {
        identity: Identity::new(user_id, email),
        access_token: uuid::Uuid::new_v4().to_string(),
        metadata,
        expires_at: Some(Utc::now() + chrono::Duration::minutes(SESSION_TTL_MINS)),
    }
}

fn digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Order two column values the way the platform does: nulls last when
/// ascending, RFC 3339 strings by instant, other strings lexically.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
