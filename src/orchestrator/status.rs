// ABOUTME: Service status listing parsed from `docker compose ps`.
// ABOUTME: Accepts both the JSON-lines and the JSON-array output formats.

use serde::{Deserialize, Serialize};

use crate::types::ServiceName;

/// One container as reported by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceStatus {
    /// Compose service the container belongs to.
    pub service: String,
    /// Container name.
    #[serde(default)]
    pub name: String,
    /// Coarse state, e.g. `running` or `exited`.
    #[serde(default)]
    pub state: String,
    /// Human-readable status, e.g. `Up 5 minutes`.
    #[serde(default)]
    pub status: String,
}

impl ServiceStatus {
    pub fn running(service: &str) -> Self {
        Self {
            service: service.to_string(),
            name: service.to_string(),
            state: "running".to_string(),
            status: "Up".to_string(),
        }
    }

    pub fn exited(service: &str) -> Self {
        Self {
            service: service.to_string(),
            name: service.to_string(),
            state: "exited".to_string(),
            status: "Exited (1)".to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case("running")
    }
}

/// Whether every one of `services` has a running container in `listing`.
pub fn all_running<'a>(
    listing: &[ServiceStatus],
    services: impl IntoIterator<Item = &'a ServiceName>,
) -> bool {
    services.into_iter().all(|service| {
        listing
            .iter()
            .any(|s| s.service == service.as_str() && s.is_running())
    })
}

/// Parse `ps --format json` output from either compose output style.
pub fn parse_ps_output(output: &str) -> Result<Vec<ServiceStatus>, serde_json::Error> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}
