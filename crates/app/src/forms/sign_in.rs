use medportal_core::error::CoreError;
use medportal_core::types::Identity;
use medportal_core::validation::validate_required;
use medportal_gateway::Credentials;

use crate::error::AppResult;
use crate::session::SessionManager;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<Credentials, CoreError> {
        validate_required("Email", &self.email)?;
        validate_required("Password", &self.password)?;
        Ok(Credentials::new(self.email.trim(), self.password.clone()))
    }

    /// Validate and sign in. The password is cleared whatever the outcome.
    pub async fn submit(&mut self, session: &SessionManager) -> AppResult<Identity> {
        let credentials = self.validate()?;
        self.password.clear();
        session.sign_in(&credentials).await
    }
}
