use medportal_core::error::CoreError;
use medportal_gateway::GatewayError;

/// Fallback line shown when the underlying error must not leak.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Application-level error type for the portal's views and session.
///
/// Wraps [`CoreError`] for local validation failures and
/// [`GatewayError`] for remote failures. [`AppError::user_message`] turns
/// any variant into the single line a view shows.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A local validation failure from `medportal_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure reported by the gateway adapter.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// An operation that needs a signed-in identity was attempted without one.
    #[error("No signed-in user")]
    NotSignedIn,
}

/// Convenience type alias for view and session results.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Whether the error was raised locally before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Core(CoreError::Validation(_)))
    }

    /// One line suitable for an inline form error or a toast.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Core(CoreError::Validation(msg)) => msg.clone(),

            // --- Gateway errors ---
            AppError::Gateway(gateway) => match gateway {
                GatewayError::Transport(err) => {
                    tracing::warn!(error = %err, "Gateway unreachable");
                    "Could not reach the server. Check your connection and try again.".to_string()
                }
                GatewayError::Unauthorized(msg) if !msg.trim().is_empty() => first_line(msg),
                GatewayError::Unauthorized(_) => {
                    "Your session has expired. Please sign in again.".to_string()
                }
                GatewayError::Rejected { message, .. } if !message.trim().is_empty() => {
                    first_line(message)
                }
                other => {
                    tracing::error!(error = %other, "Unexpected gateway error");
                    GENERIC_MESSAGE.to_string()
                }
            },

            AppError::NotSignedIn => "Please sign in to continue.".to_string(),
        }
    }
}

fn first_line(msg: &str) -> String {
    msg.lines().next().unwrap_or_default().trim().to_string()
}
