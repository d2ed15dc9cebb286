use std::sync::Arc;

use medportal_core::types::Identity;
use medportal_db::models::MedicalDocument;
use medportal_db::repositories::DocumentRepo;
use medportal_gateway::DataGateway;

use crate::views::list::{ListState, ListView};

/// Documents issued to the user, most recent document date first.
pub struct DocumentsView {
    gateway: Arc<dyn DataGateway>,
    list: ListView<MedicalDocument>,
}

impl DocumentsView {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            list: ListView::new("documents"),
        }
    }

    pub async fn mount(&self, identity: Option<&Identity>) {
        let Some(identity) = identity else {
            return;
        };
        self.list
            .load(DocumentRepo::list_for_user(
                self.gateway.as_ref(),
                identity.user_id,
            ))
            .await;
    }

    pub fn unmount(&self) {
        self.list.unmount();
    }

    pub async fn state(&self) -> ListState<MedicalDocument> {
        self.list.state().await
    }
}
