// ABOUTME: Process-state probe backed by the orchestrator's status listing.
// ABOUTME: Passes when every service of the slot is reported as running.

use async_trait::async_trait;

use super::{HealthProbe, ProbeContext, ProbeError};

/// Coarse readiness: the containers exist and are running.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusProbe;

#[async_trait]
impl HealthProbe for StatusProbe {
    fn name(&self) -> &'static str {
        "status"
    }

    async fn check(&self, ctx: &ProbeContext<'_>) -> Result<(), ProbeError> {
        let listing = ctx.orchestrator.list_status().await?;

        let missing: Vec<String> = ctx
            .services
            .iter()
            .filter(|service| {
                !listing
                    .iter()
                    .any(|s| s.service == service.as_str() && s.is_running())
            })
            .map(|service| service.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProbeError::NotRunning(missing))
        }
    }
}
