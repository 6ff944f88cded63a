// ABOUTME: Error types for deployment operations.
// ABOUTME: Covers validation, build, startup, health gate, and traffic switch failures.

use crate::health::ProbeError;
use crate::orchestrator::OrchestratorError;
use crate::pointer::PointerError;
use crate::router::RouterError;
use crate::state::StateError;
use crate::types::{Color, DeploymentTarget, TargetError};

use super::Phase;

/// Errors that can occur while driving a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Bad or missing operator input.
    #[error("{0}")]
    Validation(String),

    /// Missing service definition, color, or pointer location.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Image build failed; the live color was not touched.
    #[error("build failed for {target}: {source}")]
    BuildFailed {
        target: DeploymentTarget,
        source: OrchestratorError,
    },

    /// Containers could not be replaced or started.
    #[error("failed to start {target}: {source}")]
    StartupFailed {
        target: DeploymentTarget,
        source: OrchestratorError,
    },

    /// Containers started but did not pass the health gate.
    #[error("{target} failed the {probe} health check: {source}")]
    HealthCheckFailed {
        target: DeploymentTarget,
        probe: &'static str,
        source: ProbeError,
    },

    /// The router did not come back after the state was persisted.
    #[error(
        "traffic switch to {color} failed: {source}; the persisted active color is already \
         {color}, restart the router manually or roll back"
    )]
    TrafficSwitchFailed { color: Color, source: RouterError },

    /// The active color changed after the switch was planned.
    #[error("switch to {color} is stale: {source}")]
    StaleSwitch { color: Color, source: StateError },

    #[error("orchestrator error while {phase}: {source}")]
    Orchestrator {
        phase: Phase,
        source: OrchestratorError,
    },

    #[error(transparent)]
    State(#[from] StateError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Validation,
    Configuration,
    BuildFailure,
    ContainerStartupFailure,
    TrafficSwitchFailure,
    StaleSwitch,
    Lock,
    Orchestrator,
    State,
}

impl DeployError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Validation(_) => DeployErrorKind::Validation,
            DeployError::Configuration(_) => DeployErrorKind::Configuration,
            DeployError::BuildFailed { .. } => DeployErrorKind::BuildFailure,
            DeployError::StartupFailed { .. } | DeployError::HealthCheckFailed { .. } => {
                DeployErrorKind::ContainerStartupFailure
            }
            DeployError::TrafficSwitchFailed { .. } => DeployErrorKind::TrafficSwitchFailure,
            DeployError::StaleSwitch { .. } => DeployErrorKind::StaleSwitch,
            DeployError::Orchestrator { .. } => DeployErrorKind::Orchestrator,
            DeployError::State(StateError::Locked { .. } | StateError::Lock(_)) => {
                DeployErrorKind::Lock
            }
            DeployError::State(_) => DeployErrorKind::State,
        }
    }

    /// The phase the deployment was in when it failed, if it had started.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            DeployError::Validation(_) | DeployError::State(_) => None,
            DeployError::Configuration(_) => Some(Phase::Preparing),
            DeployError::BuildFailed { .. } => Some(Phase::Building),
            DeployError::StartupFailed { .. } => Some(Phase::Deploying),
            DeployError::HealthCheckFailed { .. } => Some(Phase::HealthChecking),
            DeployError::TrafficSwitchFailed { .. } | DeployError::StaleSwitch { .. } => {
                Some(Phase::Switching)
            }
            DeployError::Orchestrator { phase, .. } => Some(*phase),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DeployError::Validation(message.into())
    }
}

impl From<TargetError> for DeployError {
    fn from(err: TargetError) -> Self {
        DeployError::Configuration(err.to_string())
    }
}

impl From<PointerError> for DeployError {
    fn from(err: PointerError) -> Self {
        DeployError::Configuration(err.to_string())
    }
}
