// ABOUTME: Health gate configuration for freshly started slots.
// ABOUTME: Selects the probe kind and its grace, timeout and retry policy.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Wait before the first probe attempt.
    #[serde(with = "humantime_serde")]
    pub grace_period: Duration,

    /// Upper bound for a single probe attempt.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Extra attempts after the first failure.
    pub retries: u32,

    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    pub probe: ProbeConfig,
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            grace_period: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            retries: 0,
            interval: Duration::from_secs(2),
            probe: ProbeConfig::Status,
        }
    }
}

/// Which readiness check to run. `{color}` in a URL or address is replaced
/// with the color being deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeConfig {
    /// Every service of the slot must be listed as running.
    #[default]
    Status,
    /// HTTP GET must answer with a success status.
    Http { url: String },
    /// A TCP connection must be accepted.
    Tcp { address: String },
}
