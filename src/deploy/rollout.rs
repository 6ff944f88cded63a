// ABOUTME: Generic rollout struct parameterized by state marker.
// ABOUTME: Holds the resolved settings and the slot being deployed.

use nonempty::NonEmpty;
use std::marker::PhantomData;

use crate::config::Settings;
use crate::types::{DeploymentTarget, ServiceName};

use super::state::{Idle, RolloutState};
use super::Phase;

/// A deployment of one slot in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Rollout<S> {
    pub(crate) settings: Settings,
    pub(crate) target: DeploymentTarget,
    pub(crate) services: NonEmpty<ServiceName>,
    pub(crate) _state: PhantomData<S>,
}

impl Rollout<Idle> {
    /// Start a rollout of `target` using `settings`.
    pub fn new(settings: Settings, target: DeploymentTarget) -> Self {
        let services = settings.services.slot(&target);
        Rollout {
            settings,
            target,
            services,
            _state: PhantomData,
        }
    }
}

impl<S> Rollout<S> {
    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    /// Services of the slot being deployed.
    pub fn services(&self) -> &NonEmpty<ServiceName> {
        &self.services
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn transition<T>(self) -> Rollout<T> {
        Rollout {
            settings: self.settings,
            target: self.target,
            services: self.services,
            _state: PhantomData,
        }
    }
}

impl<S: RolloutState> Rollout<S> {
    pub fn phase(&self) -> Phase {
        S::PHASE
    }
}
