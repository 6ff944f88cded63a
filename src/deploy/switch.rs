// ABOUTME: Two-phase traffic switch: a planned token and its confirmation.
// ABOUTME: The token pins the state revision it was planned against.

use serde::Serialize;

use crate::orchestrator::ContainerOrchestrator;
use crate::router::TrafficRouter;
use crate::state::{ColorStateStore, StateError, StateLock, StateRecord};
use crate::types::Color;

use super::error::DeployError;

/// A traffic switch that has been planned but not executed.
///
/// Only a health-verified rollout or the rollback path can produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "a planned switch does nothing until confirmed"]
pub struct PendingSwitch {
    target: Color,
    previous: Color,
    base_revision: u64,
}

impl PendingSwitch {
    pub(crate) fn new(target: Color, current: StateRecord) -> Self {
        Self {
            target,
            previous: current.color,
            base_revision: current.revision,
        }
    }

    /// Color that will receive traffic.
    pub fn target(&self) -> Color {
        self.target
    }

    /// Color active when the switch was planned.
    pub fn previous(&self) -> Color {
        self.previous
    }

    /// State revision the switch was planned against.
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    /// Whether the target is already receiving traffic.
    pub fn is_redeploy(&self) -> bool {
        self.target == self.previous
    }
}

/// Persist the token's color, then restart the router with it.
///
/// The state is not reverted when the router fails to come back.
pub(crate) async fn execute<O: ContainerOrchestrator>(
    store: &ColorStateStore,
    lock: &StateLock,
    router: &TrafficRouter,
    orchestrator: &O,
    switch: PendingSwitch,
) -> Result<StateRecord, DeployError> {
    let color = switch.target;
    let record = store
        .compare_and_set(lock, switch.base_revision, color)
        .map_err(|source| match source {
            StateError::Conflict { .. } => DeployError::StaleSwitch { color, source },
            other => DeployError::State(other),
        })?;

    router
        .restart(orchestrator, color)
        .await
        .map_err(|source| DeployError::TrafficSwitchFailed { color, source })?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_records_base_revision() {
        let current = StateRecord {
            color: Color::Blue,
            revision: 4,
        };
        let switch = PendingSwitch::new(Color::Green, current);

        assert_eq!(switch.target(), Color::Green);
        assert_eq!(switch.previous(), Color::Blue);
        assert_eq!(switch.base_revision(), 4);
        assert!(!switch.is_redeploy());
    }

    #[test]
    fn same_color_is_redeploy() {
        let switch = PendingSwitch::new(Color::Blue, StateRecord::default());
        assert!(switch.is_redeploy());
    }
}
