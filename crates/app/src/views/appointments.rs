use std::sync::Arc;

use medportal_core::types::Identity;
use medportal_db::models::Appointment;
use medportal_db::repositories::AppointmentRepo;
use medportal_gateway::DataGateway;

use crate::views::list::{ListState, ListView};

/// The user's appointments, soonest first.
pub struct AppointmentsView {
    gateway: Arc<dyn DataGateway>,
    list: ListView<Appointment>,
}

impl AppointmentsView {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            list: ListView::new("appointments"),
        }
    }

    /// Load the list for `identity`. Without an identity the view stays in
    /// the loading state.
    pub async fn mount(&self, identity: Option<&Identity>) {
        let Some(identity) = identity else {
            return;
        };
        self.list
            .load(AppointmentRepo::list_for_user(
                self.gateway.as_ref(),
                identity.user_id,
            ))
            .await;
    }

    pub fn unmount(&self) {
        self.list.unmount();
    }

    pub async fn state(&self) -> ListState<Appointment> {
        self.list.state().await
    }
}
