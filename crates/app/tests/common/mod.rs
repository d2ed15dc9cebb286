#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use medportal_app::config::PortalConfig;
use medportal_app::state::PortalState;
use medportal_core::types::{Identity, RecordId, UserId};
use medportal_db::repositories::notification_repo;
use medportal_gateway::{
    AuthGateway, ChangeFilter, Channel, Credentials, DataGateway, GatewayError, GatewayResult,
    MemoryGateway, Query, Row, Session, SignUpOutcome, Update,
};
use serde_json::{json, Value};
use tokio::sync::{oneshot, Mutex};

/// Build a test `PortalConfig` with the default notification window.
pub fn test_config() -> PortalConfig {
    PortalConfig::default()
}

pub fn identity() -> Identity {
    let id = UserId::new_v4();
    Identity::new(id, format!("{id}@example.com"))
}

/// A notification row whose title is `title` and whose `created_at` grows
/// with `minute`, so a higher minute is more recent.
pub fn notification_row(user: UserId, title: &str, minute: i64, read: bool) -> Value {
    let base = Utc
        .with_ymd_and_hms(2026, 10, 1, 8, 0, 0)
        .single()
        .expect("valid base timestamp");
    json!({
        "id": RecordId::new_v4(),
        "user_id": user,
        "titulo": title,
        "mensaje": format!("{title} body"),
        "leida": read,
        "created_at": base + chrono::Duration::minutes(minute),
    })
}

pub fn row_id(row: &Value) -> RecordId {
    serde_json::from_value(row["id"].clone()).expect("row has an id")
}

/// Poll `check` until it holds, failing the test after two seconds.
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if check().await {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met in time: {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Give spawned tasks time to run before asserting that nothing happened.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

// ---------------------------------------------------------------------------
// Instrumented gateway
// ---------------------------------------------------------------------------

/// Pauses one `select` after it has read its rows.
struct Gate {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// Test-side handle for a gated `select`.
pub struct GateHandle {
    entered: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl GateHandle {
    /// Wait until the gated select has captured its rows.
    pub async fn entered(&mut self) {
        (&mut self.entered).await.expect("gated select never ran");
    }

    /// Let the gated select return.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

/// [`MemoryGateway`] wrapper that counts calls, injects failures and can
/// hold a `select` response back.
#[derive(Default)]
pub struct TestGateway {
    pub inner: MemoryGateway,
    pub selects: AtomicUsize,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub subscribes: AtomicUsize,
    pub auth_calls: AtomicUsize,
    pub fail_selects: AtomicBool,
    pub fail_updates: AtomicBool,
    pub fail_sign_out: AtomicBool,
    /// Number of upcoming `subscribe` calls that fail.
    pub fail_subscribes: AtomicUsize,
    fail_insert_tables: Mutex<Vec<String>>,
    gates: Mutex<VecDeque<Gate>>,
}

impl TestGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wrap a preconfigured in-process gateway.
    pub fn wrapping(inner: MemoryGateway) -> Arc<Self> {
        Arc::new(Self {
            inner,
            ..Self::default()
        })
    }

    pub fn data_calls(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
            + self.inserts.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.subscribes.load(Ordering::SeqCst)
    }

    pub async fn fail_inserts_into(&self, table: &str) {
        self.fail_insert_tables.lock().await.push(table.to_string());
    }

    /// Hold back the next `select` until the handle is released.
    pub async fn gate_next_select(&self) -> GateHandle {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.gates.lock().await.push_back(Gate {
            entered: entered_tx,
            release: release_rx,
        });
        GateHandle {
            entered: entered_rx,
            release: release_tx,
        }
    }

    pub async fn seed_notifications(&self, rows: impl IntoIterator<Item = Row>) {
        self.inner.seed(notification_repo::TABLE, rows).await;
    }

    pub async fn portal(self: &Arc<Self>) -> PortalState {
        PortalState::with_gateway(test_config(), Arc::clone(self)).await
    }
}

fn injected(what: &str) -> GatewayError {
    GatewayError::Rejected {
        status: 503,
        message: format!("injected {what} failure"),
    }
}

#[async_trait]
impl DataGateway for TestGateway {
    async fn select(&self, query: &Query) -> GatewayResult<Vec<Row>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_selects.load(Ordering::SeqCst) {
            Err(injected("select"))
        } else {
            self.inner.select(query).await
        };
        let gate = self.gates.lock().await.pop_front();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.await;
        }
        result
    }

    async fn insert(&self, table: &str, row: Row) -> GatewayResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert_tables.lock().await.iter().any(|t| t == table) {
            return Err(injected("insert"));
        }
        self.inner.insert(table, row).await
    }

    async fn update(&self, update: &Update) -> GatewayResult<u64> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(injected("update"));
        }
        self.inner.update(update).await
    }

    async fn subscribe(&self, filter: ChangeFilter) -> GatewayResult<Channel> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .fail_subscribes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(injected("subscribe"));
        }
        self.inner.subscribe(filter).await
    }
}

#[async_trait]
impl AuthGateway for TestGateway {
    async fn sign_in(&self, credentials: &Credentials) -> GatewayResult<Session> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_in(credentials).await
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: Value,
    ) -> GatewayResult<SignUpOutcome> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_up(credentials, metadata).await
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.inner.sign_out().await;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(injected("sign-out"));
        }
        result
    }

    async fn current_session(&self) -> GatewayResult<Option<Session>> {
        self.inner.current_session().await
    }
}
