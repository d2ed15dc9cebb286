//! Tracing subscriber setup for hosts embedding the portal core.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "medportal_app=debug,medportal_gateway=info";

/// Install the global `tracing` subscriber (env filter + fmt layer).
///
/// Returns an error if a global subscriber is already installed, so hosts
/// and tests may call it more than once.
pub fn init_tracing() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected_without_panicking() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
