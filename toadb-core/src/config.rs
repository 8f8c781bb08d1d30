//! Runtime configuration sourced from the environment.
//!
//! Every knob has a default; unset and empty variables mean "use the
//! default". A set-but-unparsable value is a startup error rather than a
//! silent fallback, so a typo in a unit file does not quietly change the
//! sync cadence.

use std::time::Duration;

use thiserror::Error;

/// Optional `host:port` to connect to before each enumeration pass.
pub const ENV_CONNECT: &str = "ADB_CONNECT";
/// Seconds between probes before the first successful sync.
pub const ENV_DISCOVERY_INTERVAL: &str = "DISCOVERY_INTERVAL";
/// Seconds the discovery phase may run before giving up until next boot.
pub const ENV_STARTUP_WINDOW: &str = "STARTUP_WINDOW";
/// Seconds between probes after the first successful sync.
pub const ENV_REFRESH_INTERVAL: &str = "REFRESH_INTERVAL";
/// Minimum absolute host/device offset, in seconds, that triggers a step.
pub const ENV_DRIFT_THRESHOLD: &str = "DRIFT_THRESHOLD";

pub const DEFAULT_DISCOVERY_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_STARTUP_WINDOW: Duration = Duration::from_secs(900);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);
pub const DEFAULT_DRIFT_THRESHOLD: Duration = Duration::from_secs(1);

/// A set-but-invalid environment variable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a whole number of seconds")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Resolved sync cadence and bridge settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub discovery_interval: Duration,
    pub startup_window: Duration,
    pub refresh_interval: Duration,
    pub drift_threshold: Duration,
    /// `host:port` handed to the bridge before each enumeration, if any.
    pub connect_address: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            discovery_interval: DEFAULT_DISCOVERY_INTERVAL,
            startup_window: DEFAULT_STARTUP_WINDOW,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            connect_address: None,
        }
    }
}

impl SyncConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through an arbitrary lookup function. Tests use
    /// this to avoid touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            discovery_interval: seconds_from(
                &lookup,
                ENV_DISCOVERY_INTERVAL,
                DEFAULT_DISCOVERY_INTERVAL,
            )?,
            startup_window: seconds_from(&lookup, ENV_STARTUP_WINDOW, DEFAULT_STARTUP_WINDOW)?,
            refresh_interval: seconds_from(
                &lookup,
                ENV_REFRESH_INTERVAL,
                DEFAULT_REFRESH_INTERVAL,
            )?,
            drift_threshold: seconds_from(&lookup, ENV_DRIFT_THRESHOLD, DEFAULT_DRIFT_THRESHOLD)?,
            connect_address: lookup(ENV_CONNECT)
                .map(|raw| raw.trim().to_owned())
                .filter(|addr| !addr.is_empty()),
        })
    }
}

fn seconds_from(
    lookup: impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let raw = match lookup(var) {
        Some(raw) => raw,
        None => return Ok(default),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidSeconds {
            var,
            value: raw.clone(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = SyncConfig::from_lookup(|_| None).expect("config");
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.discovery_interval, Duration::from_secs(5));
        assert_eq!(config.startup_window, Duration::from_secs(900));
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.drift_threshold, Duration::from_secs(1));
        assert_eq!(config.connect_address, None);
    }

    #[test]
    fn overrides_apply_per_variable() {
        let lookup = lookup_from(&[
            (ENV_DISCOVERY_INTERVAL, "2"),
            (ENV_STARTUP_WINDOW, "60"),
            (ENV_CONNECT, "192.168.1.7:5555"),
        ]);
        let config = SyncConfig::from_lookup(lookup).expect("config");
        assert_eq!(config.discovery_interval, Duration::from_secs(2));
        assert_eq!(config.startup_window, Duration::from_secs(60));
        assert_eq!(config.refresh_interval, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.connect_address.as_deref(), Some("192.168.1.7:5555"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_values_fall_back_to_defaults(#[case] value: &str) {
        let lookup = lookup_from(&[(ENV_REFRESH_INTERVAL, value), (ENV_CONNECT, value)]);
        let config = SyncConfig::from_lookup(lookup).expect("config");
        assert_eq!(config.refresh_interval, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.connect_address, None);
    }

    #[rstest]
    #[case("abc")]
    #[case("-5")]
    #[case("1.5")]
    fn unparsable_seconds_are_an_error(#[case] value: &str) {
        let lookup = lookup_from(&[(ENV_DRIFT_THRESHOLD, value)]);
        let err = SyncConfig::from_lookup(lookup).expect_err("must reject");
        let ConfigError::InvalidSeconds { var, value: seen } = err;
        assert_eq!(var, ENV_DRIFT_THRESHOLD);
        assert_eq!(seen, value);
    }

    #[test]
    fn connect_address_is_trimmed() {
        let lookup = lookup_from(&[(ENV_CONNECT, "  10.0.0.2:5555 ")]);
        let config = SyncConfig::from_lookup(lookup).expect("config");
        assert_eq!(config.connect_address.as_deref(), Some("10.0.0.2:5555"));
    }

    #[test]
    fn zero_is_a_valid_cadence() {
        let lookup = lookup_from(&[(ENV_STARTUP_WINDOW, "0")]);
        let config = SyncConfig::from_lookup(lookup).expect("config");
        assert_eq!(config.startup_window, Duration::ZERO);
    }
}
