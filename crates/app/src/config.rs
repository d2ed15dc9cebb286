use std::time::Duration;

/// Default number of notifications the panel keeps.
pub const DEFAULT_NOTIFICATION_WINDOW: usize = 10;

/// Default interval between change polls of the HTTP adapter.
pub const DEFAULT_CHANGE_POLL_INTERVAL_SECS: u64 = 15;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Portal configuration loaded from environment variables.
///
/// The gateway URL and key are only needed when connecting to a remote
/// backend; the in-process gateway runs without them.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the backend (`GATEWAY_URL`).
    pub gateway_url: Option<String>,
    /// Public API key sent with every request (`GATEWAY_ANON_KEY`).
    pub gateway_anon_key: Option<String>,
    /// How many recent notifications the panel holds.
    pub notification_window: usize,
    /// How often the HTTP adapter checks subscribed rows for changes.
    pub change_poll_interval: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            gateway_anon_key: None,
            notification_window: DEFAULT_NOTIFICATION_WINDOW,
            change_poll_interval: Duration::from_secs(DEFAULT_CHANGE_POLL_INTERVAL_SECS),
        }
    }
}

impl PortalConfig {
    /// Load `.env` (if present) and then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `GATEWAY_URL`               | unset   |
    /// | `GATEWAY_ANON_KEY`          | unset   |
    /// | `NOTIFICATION_WINDOW`       | `10`    |
    /// | `CHANGE_POLL_INTERVAL_SECS` | `15`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let notification_window = match non_empty("NOTIFICATION_WINDOW") {
            Some(raw) => parse_positive("NOTIFICATION_WINDOW", &raw)? as usize,
            None => DEFAULT_NOTIFICATION_WINDOW,
        };

        let poll_secs = match non_empty("CHANGE_POLL_INTERVAL_SECS") {
            Some(raw) => parse_positive("CHANGE_POLL_INTERVAL_SECS", &raw)?,
            None => DEFAULT_CHANGE_POLL_INTERVAL_SECS,
        };

        Ok(Self {
            gateway_url: non_empty("GATEWAY_URL"),
            gateway_anon_key: non_empty("GATEWAY_ANON_KEY"),
            notification_window,
            change_poll_interval: Duration::from_secs(poll_secs),
        })
    }

    /// The remote endpoint, or an error naming the first missing variable.
    pub fn remote(&self) -> Result<(&str, &str), ConfigError> {
        let url = self
            .gateway_url
            .as_deref()
            .ok_or(ConfigError::Missing { var: "GATEWAY_URL" })?;
        let key = self
            .gateway_anon_key
            .as_deref()
            .ok_or(ConfigError::Missing {
                var: "GATEWAY_ANON_KEY",
            })?;
        Ok((url, key))
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            var,
            expected: "a positive integer",
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = PortalConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.notification_window, 10);
        assert_eq!(config.change_poll_interval, Duration::from_secs(15));
        assert!(config.gateway_url.is_none());
        assert_matches!(
            config.remote(),
            Err(ConfigError::Missing { var: "GATEWAY_URL" })
        );
    }

    #[test]
    fn values_are_read() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("GATEWAY_URL", "https://portal.example.com"),
            ("GATEWAY_ANON_KEY", "anon"),
            ("NOTIFICATION_WINDOW", "25"),
            ("CHANGE_POLL_INTERVAL_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.notification_window, 25);
        assert_eq!(config.change_poll_interval, Duration::from_secs(5));
        assert_eq!(
            config.remote().unwrap(),
            ("https://portal.example.com", "anon")
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("GATEWAY_URL", "  "),
            ("NOTIFICATION_WINDOW", ""),
        ]))
        .unwrap();
        assert!(config.gateway_url.is_none());
        assert_eq!(config.notification_window, 10);
    }

    #[test]
    fn invalid_numbers_are_errors_not_panics() {
        let err = PortalConfig::from_lookup(lookup(&[("NOTIFICATION_WINDOW", "ten")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "NOTIFICATION_WINDOW", .. });

        let err =
            PortalConfig::from_lookup(lookup(&[("CHANGE_POLL_INTERVAL_SECS", "0")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "CHANGE_POLL_INTERVAL_SECS", .. });
    }
}
