// ABOUTME: State transition methods for rollout orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::collections::HashMap;

use crate::health::{HealthGate, ProbeContext};
use crate::orchestrator::{BuildOptions, ContainerOrchestrator, OrchestratorError};
use crate::pointer::EnvironmentConfigurator;
use crate::state::StateRecord;
use crate::types::ServiceName;

use super::error::DeployError;
use super::state::{Built, Done, Idle, Prepared, Started, Verified};
use super::switch::PendingSwitch;
use super::Rollout;

impl<S> Rollout<S> {
    /// Services addressed by build/stop/start. Staging replaces the whole
    /// project; a colored slot only ever touches its own services.
    fn scope(&self) -> Vec<ServiceName> {
        if self.target.color().is_some() {
            self.services.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }
}

// =============================================================================
// Idle -> Prepared
// =============================================================================

impl Rollout<Idle> {
    /// Point the front-end at the target's backend.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Configuration` if the pointer file cannot be written.
    #[must_use = "rollout state must be used"]
    pub fn prepare(
        self,
        configurator: &EnvironmentConfigurator,
    ) -> Result<Rollout<Prepared>, DeployError> {
        configurator.configure(self.target.environment(), self.target.color())?;
        Ok(self.transition())
    }
}

// =============================================================================
// Prepared -> Built
// =============================================================================

impl Rollout<Prepared> {
    /// Build images for the target. Staging always rebuilds without cache.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::BuildFailed`; nothing has been stopped at this point.
    #[must_use = "rollout state must be used"]
    pub async fn build<O: ContainerOrchestrator>(
        self,
        orchestrator: &O,
    ) -> Result<Rollout<Built>, DeployError> {
        let options = BuildOptions {
            no_cache: self.target.color().is_none() || self.settings.no_cache,
        };

        orchestrator
            .build(&self.scope(), options)
            .await
            .map_err(|source| DeployError::BuildFailed {
                target: self.target,
                source,
            })?;

        Ok(self.transition())
    }
}

// =============================================================================
// Built -> Started
// =============================================================================

impl Rollout<Built> {
    /// Replace the target's containers with fresh ones.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::StartupFailed` if stopping, removing or starting fails.
    #[must_use = "rollout state must be used"]
    pub async fn start<O: ContainerOrchestrator>(
        self,
        orchestrator: &O,
    ) -> Result<Rollout<Started>, DeployError> {
        let scope = self.scope();
        let target = self.target;
        let startup_failed =
            move |source: OrchestratorError| DeployError::StartupFailed { target, source };

        orchestrator.stop(&scope).await.map_err(startup_failed)?;
        if !scope.is_empty() {
            orchestrator.remove(&scope).await.map_err(startup_failed)?;
        }
        orchestrator
            .start(&scope, &HashMap::new())
            .await
            .map_err(startup_failed)?;

        Ok(self.transition())
    }
}

// =============================================================================
// Started -> Verified | Done
// =============================================================================

impl Rollout<Started> {
    /// Run the health gate against the target's services.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::HealthCheckFailed`; the target keeps running and
    /// traffic is unchanged.
    #[must_use = "rollout state must be used"]
    pub async fn verify<O: ContainerOrchestrator>(
        self,
        orchestrator: &O,
        gate: &HealthGate,
    ) -> Result<Rollout<Verified>, DeployError> {
        let ctx = ProbeContext {
            orchestrator,
            services: &self.services,
            color: self.target.color(),
        };

        if let Err(source) = gate.wait_healthy(&ctx).await {
            return Err(DeployError::HealthCheckFailed {
                target: self.target,
                probe: gate.probe_name(),
                source,
            });
        }

        Ok(self.transition())
    }

    /// Give a single-slot deployment time to stabilize.
    #[must_use = "rollout state must be used"]
    pub async fn settle(self) -> Rollout<Done> {
        let delay = self.settings.staging_settle;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.transition()
    }
}

// =============================================================================
// Verified -> PendingSwitch
// =============================================================================

impl Rollout<Verified> {
    /// Plan the switch of traffic to the verified color, against `current`.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Configuration` for a target without a color.
    pub fn plan(self, current: StateRecord) -> Result<PendingSwitch, DeployError> {
        let color = self.target.color().ok_or_else(|| {
            DeployError::Configuration(format!("{} has no color to switch to", self.target))
        })?;
        Ok(PendingSwitch::new(color, current))
    }
}
