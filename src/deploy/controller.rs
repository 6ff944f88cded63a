// ABOUTME: Deployment controller sequencing pointer, build, start, health, and switch.
// ABOUTME: Holds the state lock for every mutating production operation.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::config::Settings;
use crate::diagnostics::Warning;
use crate::health::HealthGate;
use crate::orchestrator::{ContainerOrchestrator, all_running};
use crate::pointer::EnvironmentConfigurator;
use crate::router::TrafficRouter;
use crate::state::{ColorStateStore, StateLock, StateRecord};
use crate::types::{Color, DeploymentTarget, Environment};

use super::confirm::{ConfirmRequest, ConfirmationPolicy};
use super::error::DeployError;
use super::rollout::Rollout;
use super::state::{Phase, Verified};
use super::status::StatusReport;
use super::switch::{self, PendingSwitch};

/// Command that switches traffic to the inactive color later.
pub const MANUAL_SWITCH_COMMAND: &str = "swatch --env prod --rollback";

/// How a production deployment ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductionOutcome {
    /// Traffic now goes to the deployed color.
    Switched { record: StateRecord, previous: Color },
    /// The target is deployed and healthy but traffic was left alone.
    Declined { target: Color, active: Color },
    /// The operator refused to redeploy the active color. Nothing was touched.
    Aborted { target: Color },
}

impl ProductionOutcome {
    /// Command to run when the operator wants to switch later.
    pub fn manual_switch_command(&self) -> Option<&'static str> {
        match self {
            ProductionOutcome::Declined { .. } => Some(MANUAL_SWITCH_COMMAND),
            _ => None,
        }
    }
}

/// Drives deployments of one environment.
pub struct DeploymentController<'a, O: ContainerOrchestrator> {
    settings: Settings,
    orchestrator: &'a O,
    configurator: EnvironmentConfigurator,
    store: ColorStateStore,
    gate: HealthGate,
    router: TrafficRouter,
    force_unlock: bool,
    warnings: RefCell<Vec<Warning>>,
}

impl<'a, O: ContainerOrchestrator> DeploymentController<'a, O> {
    pub fn new(settings: Settings, orchestrator: &'a O) -> Self {
        let configurator =
            EnvironmentConfigurator::new(settings.pointer.clone(), settings.services.clone());
        let store = ColorStateStore::new(&settings.state_file);
        let gate = HealthGate::from_config(&settings.health);
        let router = TrafficRouter::from_settings(&settings);

        Self {
            settings,
            orchestrator,
            configurator,
            store,
            gate,
            router,
            force_unlock: false,
            warnings: RefCell::default(),
        }
    }

    /// Replace the health gate built from configuration.
    pub fn with_health_gate(mut self, gate: HealthGate) -> Self {
        self.gate = gate;
        self
    }

    /// Break an existing state lock instead of failing.
    pub fn force_unlock(mut self, force: bool) -> Self {
        self.force_unlock = force;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &ColorStateStore {
        &self.store
    }

    /// Non-fatal problems raised since the last call, such as a lock file
    /// that could not be removed.
    pub fn take_warnings(&self) -> Vec<Warning> {
        self.warnings.take()
    }

    /// Rebuild and restart the whole staging project, then report its status.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Validation` outside staging, otherwise the
    /// failure of the first step that failed.
    pub async fn deploy_staging(&self) -> Result<StatusReport, DeployError> {
        if self.settings.environment != Environment::Staging {
            return Err(DeployError::validation(format!(
                "staging deployment requested for the {} environment",
                self.settings.environment
            )));
        }

        tracing::info!("Deploying staging");
        Rollout::new(self.settings.clone(), DeploymentTarget::staging())
            .prepare(&self.configurator)?
            .build(self.orchestrator)
            .await?
            .start(self.orchestrator)
            .await?
            .settle()
            .await;

        self.status().await
    }

    /// Deploy `color` (default: the inactive color) and switch traffic to it
    /// once it is healthy and the policy approves.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Validation` for an unknown color or outside
    /// production. Health failures leave the active color unchanged.
    pub async fn deploy_production(
        &self,
        color: Option<&str>,
        policy: &mut dyn ConfirmationPolicy,
    ) -> Result<ProductionOutcome, DeployError> {
        let requested = self.validate_production(color)?;
        let lock = self.lock()?;
        let current = self.store.read();
        let target = requested.unwrap_or_else(|| current.color.complement());

        let Some(switch) = self.plan_locked(target, current, policy).await? else {
            self.release(lock);
            return Ok(ProductionOutcome::Aborted { target });
        };

        if !switch.is_redeploy() {
            let request = ConfirmRequest::SwitchTraffic {
                from: switch.previous(),
                to: switch.target(),
            };
            if !policy.confirm(&request) {
                tracing::info!(
                    "{} left running but inactive; {} still receives traffic",
                    target,
                    current.color
                );
                self.release(lock);
                return Ok(ProductionOutcome::Declined {
                    target,
                    active: current.color,
                });
            }
        }

        let previous = switch.previous();
        let record = self.execute(&lock, switch).await?;
        self.release(lock);
        Ok(ProductionOutcome::Switched { record, previous })
    }

    /// Deploy and verify `color` without switching, returning the switch to
    /// confirm later. `None` means the operator refused to redeploy the
    /// active color.
    ///
    /// # Errors
    ///
    /// Same as [`deploy_production`](Self::deploy_production) up to the
    /// health gate.
    pub async fn plan_production(
        &self,
        color: Option<&str>,
        policy: &mut dyn ConfirmationPolicy,
    ) -> Result<Option<PendingSwitch>, DeployError> {
        let requested = self.validate_production(color)?;
        let lock = self.lock()?;
        let current = self.store.read();
        let target = requested.unwrap_or_else(|| current.color.complement());

        let planned = self.plan_locked(target, current, policy).await?;
        self.release(lock);
        Ok(planned)
    }

    /// Execute a planned switch.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::StaleSwitch` if traffic was switched since the
    /// token was planned.
    pub async fn confirm(&self, switch: PendingSwitch) -> Result<StateRecord, DeployError> {
        self.require_production("confirming a switch")?;
        let lock = self.lock()?;
        let record = self.execute(&lock, switch).await?;
        self.release(lock);
        Ok(record)
    }

    /// Persist `color` as active and restart the router with it.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::TrafficSwitchFailed` when the router does not come
    /// back; the persisted color has changed by then.
    pub async fn switch_traffic(&self, color: Color) -> Result<StateRecord, DeployError> {
        self.require_production("switching traffic")?;
        let lock = self.lock()?;
        let current = self.store.read();
        let record = self
            .execute(&lock, PendingSwitch::new(color, current))
            .await?;
        self.release(lock);
        Ok(record)
    }

    /// Switch traffic back to the inactive color, starting it if needed.
    /// Nothing is rebuilt and no health gate runs.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Validation` outside production.
    pub async fn rollback(&self) -> Result<StateRecord, DeployError> {
        self.require_production("rollback")?;
        let lock = self.lock()?;
        let current = self.store.read();
        let target = DeploymentTarget::production(current.color.complement());
        let services = self.settings.services.slot(&target);

        let listing = self.orchestrator.list_status().await.map_err(|source| {
            DeployError::Orchestrator {
                phase: Phase::Deploying,
                source,
            }
        })?;

        if all_running(&listing, services.iter()) {
            tracing::info!("{} is already running", target);
        } else {
            tracing::info!("Starting {} before switching back", target);
            let scope: Vec<_> = services.into_iter().collect();
            self.orchestrator
                .start(&scope, &HashMap::new())
                .await
                .map_err(|source| DeployError::StartupFailed { target, source })?;
        }

        let record = self
            .execute(&lock, PendingSwitch::new(current.color.complement(), current))
            .await?;
        self.release(lock);
        Ok(record)
    }

    /// Report persisted intent against what is running. Never takes the lock
    /// and never writes.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Orchestrator` when the status listing fails.
    pub async fn status(&self) -> Result<StatusReport, DeployError> {
        let listing = self.orchestrator.list_status().await.map_err(|source| {
            DeployError::Orchestrator {
                phase: Phase::Idle,
                source,
            }
        })?;

        Ok(match self.settings.environment {
            Environment::Staging => StatusReport::staging(&self.settings, &listing),
            Environment::Production => {
                StatusReport::production(&self.settings, self.store.read(), &listing)
            }
        })
    }

    /// Run the rollout of `target` up to the planned switch, asking first when
    /// `target` is already active.
    async fn plan_locked(
        &self,
        target: Color,
        current: StateRecord,
        policy: &mut dyn ConfirmationPolicy,
    ) -> Result<Option<PendingSwitch>, DeployError> {
        if target == current.color
            && !policy.confirm(&ConfirmRequest::RedeployActive { color: target })
        {
            tracing::info!("Redeploy of active color {} aborted", target);
            return Ok(None);
        }

        let verified = self.verified_rollout(target).await?;
        verified.plan(current).map(Some)
    }

    async fn verified_rollout(&self, color: Color) -> Result<Rollout<Verified>, DeployError> {
        let target = DeploymentTarget::production(color);
        tracing::info!("Deploying {}", target);

        Rollout::new(self.settings.clone(), target)
            .prepare(&self.configurator)?
            .build(self.orchestrator)
            .await?
            .start(self.orchestrator)
            .await?
            .verify(self.orchestrator, &self.gate)
            .await
    }

    async fn execute(
        &self,
        lock: &StateLock,
        switch: PendingSwitch,
    ) -> Result<StateRecord, DeployError> {
        tracing::info!(
            "Switching traffic from {} to {}",
            switch.previous(),
            switch.target()
        );
        switch::execute(&self.store, lock, &self.router, self.orchestrator, switch).await
    }

    fn validate_production(&self, color: Option<&str>) -> Result<Option<Color>, DeployError> {
        self.require_production("production deployment")?;
        color
            .map(|value| value.parse::<Color>())
            .transpose()
            .map_err(|e| DeployError::validation(e.to_string()))
    }

    fn require_production(&self, operation: &str) -> Result<(), DeployError> {
        if self.settings.environment.has_colors() {
            Ok(())
        } else {
            Err(DeployError::validation(format!(
                "{} is only available in production",
                operation
            )))
        }
    }

    fn lock(&self) -> Result<StateLock, DeployError> {
        Ok(self
            .store
            .lock(self.settings.environment, self.force_unlock)?)
    }

    fn release(&self, lock: StateLock) {
        let path = lock.path().to_path_buf();
        if let Err(e) = lock.release() {
            self.warnings.borrow_mut().push(Warning::lock_release(format!(
                "failed to release state lock {}: {}; remove it by hand or pass --force",
                path.display(),
                e
            )));
        }
    }
}
