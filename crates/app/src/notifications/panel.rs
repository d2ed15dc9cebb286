//! Notification cache with live invalidation.
//!
//! A panel is bound to at most one identity at a time. Binding opens one
//! channel on the user's notifications and loads the newest `window`
//! entries; every signal on the channel reloads them. Reloads may overlap:
//! each takes a ticket when it starts, and a completion is applied only if
//! its ticket is newer than the last applied one and the binding it was
//! started under is still current.
//!
//! If the channel cannot be opened the panel still loads, and the channel
//! is retried on the next [`NotificationPanel::refresh`] or rebind to the
//! same identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use medportal_core::types::{Identity, RecordId};
use medportal_db::models::Notification;
use medportal_db::repositories::NotificationRepo;
use medportal_gateway::{Channel, DataGateway};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::session::SessionManager;

/// Owned view of the panel for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelSnapshot {
    /// Most recent first, at most `window` entries.
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub is_bound: bool,
    /// Text of the latest refresh or mark-read failure, cleared by the
    /// next successful refresh.
    pub last_error: Option<String>,
    /// Why the live channel is down, if it is. Cleared once a channel opens.
    pub channel_error: Option<String>,
}

#[derive(Default)]
struct PanelState {
    identity: Option<Identity>,
    /// Bumped on every bind, unbind and teardown.
    epoch: u64,
    applied_ticket: u64,
    notifications: Vec<Notification>,
    unread_count: usize,
    last_error: Option<String>,
    channel_error: Option<String>,
    torn_down: bool,
}

struct Shared {
    state: RwLock<PanelState>,
    tickets: AtomicU64,
    window: usize,
}

/// Live channel plus the task that drains it.
struct Binding {
    identity: Identity,
    cancel: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

pub struct NotificationPanel {
    gateway: Arc<dyn DataGateway>,
    shared: Arc<Shared>,
    /// Serializes bind, unbind and teardown.
    binding: Mutex<Option<Binding>>,
}

impl NotificationPanel {
    /// Create an unbound panel holding at most `window` notifications.
    pub fn new(gateway: Arc<dyn DataGateway>, window: usize) -> Self {
        Self {
            gateway,
            shared: Arc::new(Shared {
                state: RwLock::new(PanelState::default()),
                tickets: AtomicU64::new(0),
                window,
            }),
            binding: Mutex::new(None),
        }
    }

    pub fn window(&self) -> usize {
        self.shared.window
    }

    /// Bind the panel to `identity`, or unbind it with `None`.
    ///
    /// Rebinding to the current identity only reopens a channel that is
    /// down, reloading if that succeeds. Any other change closes the
    /// previous channel first, clears the cache, then opens the new channel
    /// and loads the first page. Has no effect after teardown.
    pub async fn bind(&self, identity: Option<Identity>) {
        let mut binding = self.binding.lock().await;
        if self.shared.state.read().await.torn_down {
            return;
        }

        let current = binding
            .as_mut()
            .filter(|b| identity.as_ref() == Some(&b.identity));
        if let Some(current) = current {
            if self.open_channel(current).await {
                refresh(self.gateway.as_ref(), &self.shared).await;
            }
            return;
        }

        if let Some(old) = binding.take() {
            release(old).await;
        }

        {
            let mut state = self.shared.state.write().await;
            state.epoch += 1;
            state.identity = identity.clone();
            state.notifications.clear();
            state.unread_count = 0;
            state.last_error = None;
            state.channel_error = None;
        }

        let Some(identity) = identity else {
            tracing::debug!("Notification panel unbound");
            return;
        };

        // The channel is opened before the first load so a change landing
        // in between still triggers a reload.
        let mut fresh = Binding {
            identity,
            cancel: CancellationToken::new(),
            listener: None,
        };
        self.open_channel(&mut fresh).await;
        *binding = Some(fresh);

        refresh(self.gateway.as_ref(), &self.shared).await;
    }

    /// Reload the newest notifications for the bound identity, reopening
    /// the live channel first if it is down.
    ///
    /// Failures are logged and recorded in [`PanelSnapshot::last_error`];
    /// the previous cache is kept.
    pub async fn refresh(&self) {
        if let Some(current) = self.binding.lock().await.as_mut() {
            self.open_channel(current).await;
        }
        refresh(self.gateway.as_ref(), &self.shared).await;
    }

    /// Open a channel for `binding` unless its listener is still running.
    /// Returns `true` if a new channel was opened.
    ///
    /// Callers hold the binding lock.
    async fn open_channel(&self, binding: &mut Binding) -> bool {
        if binding.listener.as_ref().is_some_and(|l| !l.is_finished()) {
            return false;
        }
        let user_id = binding.identity.user_id;
        match NotificationRepo::watch(self.gateway.as_ref(), user_id).await {
            Ok(channel) => {
                let cancel = CancellationToken::new();
                binding.listener = Some(tokio::spawn(listen(
                    channel,
                    cancel.clone(),
                    Arc::clone(&self.gateway),
                    Arc::clone(&self.shared),
                )));
                binding.cancel = cancel;
                self.shared.state.write().await.channel_error = None;
                tracing::debug!(%user_id, "Notification channel opened");
                true
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Failed to open notification channel");
                self.shared.state.write().await.channel_error = Some(e.to_string());
                false
            }
        }
    }

    /// Mark one notification read.
    ///
    /// The cached entry flips to read and the unread count drops by one
    /// before the remote write completes. An entry that is already read or
    /// not cached leaves the count alone. A failed write is logged and the
    /// local change is kept.
    pub async fn mark_read(&self, notification_id: RecordId) {
        let (identity, epoch) = {
            let mut guard = self.shared.state.write().await;
            let state = &mut *guard;
            let Some(identity) = state.identity.clone().filter(|_| !state.torn_down) else {
                tracing::debug!(%notification_id, "Mark read ignored; panel not bound");
                return;
            };
            if let Some(entry) = state
                .notifications
                .iter_mut()
                .find(|n| n.id == notification_id)
            {
                if !entry.read {
                    entry.read = true;
                    state.unread_count = state.unread_count.saturating_sub(1);
                }
            }
            (identity, state.epoch)
        };

        let result =
            NotificationRepo::mark_read(self.gateway.as_ref(), notification_id, identity.user_id)
                .await;
        match result {
            Ok(true) => tracing::debug!(%notification_id, "Notification marked read"),
            Ok(false) => tracing::warn!(
                %notification_id,
                user_id = %identity.user_id,
                "Mark read matched no notification"
            ),
            Err(e) => {
                tracing::warn!(%notification_id, error = %e, "Failed to mark notification read");
                let mut state = self.shared.state.write().await;
                if state.epoch == epoch && !state.torn_down {
                    state.last_error = Some(e.to_string());
                }
            }
        }
    }

    pub async fn snapshot(&self) -> PanelSnapshot {
        let state = self.shared.state.read().await;
        PanelSnapshot {
            notifications: state.notifications.clone(),
            unread_count: state.unread_count,
            is_bound: state.identity.is_some() && !state.torn_down,
            last_error: state.last_error.clone(),
            channel_error: state.channel_error.clone(),
        }
    }

    /// Close the channel and freeze the panel. Idempotent; later binds,
    /// signals and responses have no effect.
    pub async fn teardown(&self) {
        let mut binding = self.binding.lock().await;
        {
            let mut state = self.shared.state.write().await;
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.epoch += 1;
        }
        if let Some(old) = binding.take() {
            release(old).await;
        }
        tracing::debug!("Notification panel torn down");
    }

    /// Keep the panel bound to the session's identity.
    ///
    /// The panel is bound to the current identity immediately and rebound on
    /// every sign-in or sign-out until the returned handle is stopped or the
    /// session manager is dropped.
    pub fn follow(self: &Arc<Self>, session: &SessionManager) -> SessionFollower {
        let mut sessions = session.subscribe();
        let panel = Arc::clone(self);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                let identity = sessions
                    .borrow_and_update()
                    .as_ref()
                    .map(|s| s.identity.clone());
                panel.bind(identity).await;

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            tracing::debug!("Session manager dropped; panel stops following");
                            break;
                        }
                    }
                }
            }
        });

        SessionFollower { cancel, handle }
    }
}

impl Drop for NotificationPanel {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.get_mut().take() {
            binding.cancel.cancel();
        }
    }
}

/// Handle returned by [`NotificationPanel::follow`].
pub struct SessionFollower {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SessionFollower {
    /// Stop following. The panel keeps its current binding.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Session follower task failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

async fn refresh(gateway: &dyn DataGateway, shared: &Shared) {
    let (identity, epoch) = {
        let state = shared.state.read().await;
        match (&state.identity, state.torn_down) {
            (Some(identity), false) => (identity.clone(), state.epoch),
            _ => return,
        }
    };
    let ticket = shared.tickets.fetch_add(1, Ordering::SeqCst) + 1;

    let result = NotificationRepo::list_recent(gateway, identity.user_id, shared.window).await;

    let mut state = shared.state.write().await;
    if state.torn_down || state.epoch != epoch || ticket <= state.applied_ticket {
        tracing::debug!(ticket, "Discarding stale notification refresh");
        return;
    }
    match result {
        Ok(notifications) => {
            state.unread_count = notifications.iter().filter(|n| !n.read).count();
            state.notifications = notifications;
            state.applied_ticket = ticket;
            state.last_error = None;
        }
        Err(e) => {
            tracing::warn!(
                user_id = %identity.user_id,
                error = %e,
                "Failed to refresh notifications"
            );
            state.last_error = Some(e.to_string());
        }
    }
}

/// Drain the channel, reloading on every signal, until cancelled or the
/// channel ends. The channel is closed exactly once, here.
async fn listen(
    mut channel: Channel,
    cancel: CancellationToken,
    gateway: Arc<dyn DataGateway>,
    shared: Arc<Shared>,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            signalled = channel.invalidated() => {
                if !signalled {
                    tracing::debug!("Notification channel ended");
                    break;
                }
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = refresh(gateway.as_ref(), &shared) => {}
                }
            }
        }
    }
    if channel.close() {
        tracing::debug!("Notification channel closed");
    }
}

/// Cancel a binding's listener and wait for it to close its channel.
async fn release(binding: Binding) {
    binding.cancel.cancel();
    if let Some(listener) = binding.listener {
        if let Err(e) = listener.await {
            tracing::error!(error = %e, "Notification listener task failed");
        }
    }
}
