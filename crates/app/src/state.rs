use std::sync::Arc;

use medportal_gateway::{AuthGateway, DataGateway, MemoryGateway, RestGateway};

use crate::config::{ConfigError, PortalConfig};
use crate::notifications::NotificationPanel;
use crate::session::SessionManager;
use crate::views::{AppointmentsView, DocumentsView};

/// Shared portal state handed to every view.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct PortalState {
    pub config: Arc<PortalConfig>,
    /// Row access for repositories and views.
    pub data: Arc<dyn DataGateway>,
    /// Signed-in identity shared by all views.
    pub session: Arc<SessionManager>,
}

impl PortalState {
    /// Connect to the remote backend named in `config`.
    pub async fn connect(config: PortalConfig) -> Result<Self, ConfigError> {
        let (url, key) = config.remote()?;
        let gateway = Arc::new(RestGateway::with_poll_interval(
            url,
            key,
            config.change_poll_interval,
        ));
        tracing::info!(url = %url, "Using remote gateway");
        Ok(Self::with_gateway(config, gateway).await)
    }

    /// Run against an in-process gateway.
    pub async fn in_memory(config: PortalConfig) -> Self {
        tracing::info!("Using in-memory gateway");
        Self::with_gateway(config, Arc::new(MemoryGateway::new())).await
    }

    /// Build state around any adapter implementing both gateway contracts.
    pub async fn with_gateway<G>(config: PortalConfig, gateway: Arc<G>) -> Self
    where
        G: DataGateway + AuthGateway + 'static,
    {
        let auth: Arc<dyn AuthGateway> = gateway.clone();
        let session = SessionManager::init(auth).await;
        Self {
            config: Arc::new(config),
            data: gateway,
            session,
        }
    }

    /// A new unbound panel sized by the configured window.
    pub fn notification_panel(&self) -> Arc<NotificationPanel> {
        Arc::new(NotificationPanel::new(
            Arc::clone(&self.data),
            self.config.notification_window,
        ))
    }

    pub fn appointments_view(&self) -> AppointmentsView {
        AppointmentsView::new(Arc::clone(&self.data))
    }

    pub fn documents_view(&self) -> DocumentsView {
        DocumentsView::new(Arc::clone(&self.data))
    }
}
