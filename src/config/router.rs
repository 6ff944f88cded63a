// ABOUTME: Reverse-proxy router configuration.
// ABOUTME: Names the variable carrying the active color and the restart grace period.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Environment variable the router reads at startup.
    pub color_var: String,

    #[serde(with = "humantime_serde")]
    pub grace_period: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            color_var: "ACTIVE_COLOR".to_string(),
            grace_period: Duration::from_secs(3),
        }
    }
}
