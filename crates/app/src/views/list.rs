use std::future::Future;

use medportal_gateway::GatewayResult;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Load state of a list view.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Ready(Vec<T>),
}

impl<T> ListState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }

    /// Items once loaded; empty while loading.
    pub fn items(&self) -> &[T] {
        match self {
            ListState::Loading => &[],
            ListState::Ready(items) => items,
        }
    }
}

/// A list that loads once per mount and ignores responses arriving after
/// it was unmounted.
pub struct ListView<T> {
    name: &'static str,
    state: RwLock<ListState<T>>,
    unmounted: CancellationToken,
}

impl<T: Clone> ListView<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: RwLock::new(ListState::Loading),
            unmounted: CancellationToken::new(),
        }
    }

    /// Run `fetch` and store its items. A failure is logged and shown as an
    /// empty list. If the view is unmounted first, the fetch is dropped and
    /// the state is left untouched.
    pub async fn load<F>(&self, fetch: F)
    where
        F: Future<Output = GatewayResult<Vec<T>>>,
    {
        let result = tokio::select! {
            biased;
            _ = self.unmounted.cancelled() => {
                tracing::debug!(view = self.name, "Load abandoned; view unmounted");
                return;
            }
            result = fetch => result,
        };

        let items = result.unwrap_or_else(|e| {
            tracing::error!(view = self.name, error = %e, "Failed to load list");
            Vec::new()
        });

        let mut state = self.state.write().await;
        if self.unmounted.is_cancelled() {
            return;
        }
        *state = ListState::Ready(items);
    }

    pub fn unmount(&self) {
        self.unmounted.cancel();
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.is_cancelled()
    }

    pub async fn state(&self) -> ListState<T> {
        self.state.read().await.clone()
    }
}
