// ABOUTME: Read-only status report for an environment.
// ABOUTME: Combines the persisted active color with the orchestrator's listing.

use serde::Serialize;

use crate::config::Settings;
use crate::orchestrator::ServiceStatus;
use crate::router::TrafficRouter;
use crate::state::StateRecord;
use crate::types::{Color, DeploymentTarget, Environment, ServiceName};

/// Role a slot plays in its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotRole {
    Single,
    Active,
    Inactive,
}

/// State of one expected service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceState {
    pub service: String,
    /// Coarse state from the listing, or `missing` when no container exists.
    pub state: String,
    pub running: bool,
}

impl ServiceState {
    fn from_listing(service: &ServiceName, listing: &[ServiceStatus]) -> Self {
        let entry = listing
            .iter()
            .filter(|s| s.service == service.as_str())
            .max_by_key(|s| s.is_running());
        match entry {
            Some(status) => ServiceState {
                service: service.to_string(),
                state: status.state.clone(),
                running: status.is_running(),
            },
            None => ServiceState {
                service: service.to_string(),
                state: "missing".to_string(),
                running: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub role: SlotRole,
    pub services: Vec<ServiceState>,
}

impl SlotStatus {
    pub fn all_running(&self) -> bool {
        self.services.iter().all(|s| s.running)
    }

    pub fn label(&self) -> String {
        match (self.color, self.role) {
            (Some(color), SlotRole::Active) => format!("{color} (active)"),
            (Some(color), SlotRole::Inactive) => format!("{color} (inactive)"),
            _ => "slot".to_string(),
        }
    }
}

/// Snapshot of an environment. Building one never changes anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateRecord>,
    pub slots: Vec<SlotStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router: Option<ServiceState>,
    /// Mismatches between persisted intent and running containers.
    pub warnings: Vec<String>,
    /// Observations that need no action.
    pub notes: Vec<String>,
}

impl StatusReport {
    pub fn active(&self) -> Option<Color> {
        self.state.map(|s| s.color)
    }

    pub fn inactive(&self) -> Option<Color> {
        self.active().map(Color::complement)
    }

    /// Assemble the staging report.
    pub fn staging(settings: &Settings, listing: &[ServiceStatus]) -> Self {
        let slot = slot_status(settings, DeploymentTarget::staging(), SlotRole::Single, listing);

        let mut warnings = Vec::new();
        if !slot.all_running() {
            warnings.push(format!(
                "staging services not running: {}",
                stopped_names(&slot)
            ));
        }

        StatusReport {
            environment: Environment::Staging,
            state: None,
            slots: vec![slot],
            router: None,
            warnings,
            notes: Vec::new(),
        }
    }

    /// Assemble the production report. Mismatches are reported, not corrected.
    pub fn production(settings: &Settings, record: StateRecord, listing: &[ServiceStatus]) -> Self {
        let active = slot_status(
            settings,
            DeploymentTarget::production(record.color),
            SlotRole::Active,
            listing,
        );
        let inactive = slot_status(
            settings,
            DeploymentTarget::production(record.color.complement()),
            SlotRole::Inactive,
            listing,
        );
        let router = ServiceState::from_listing(TrafficRouter::from_settings(settings).service(), listing);

        let mut warnings = Vec::new();
        if !active.all_running() {
            warnings.push(format!(
                "active color {} has services not running: {}",
                record.color,
                stopped_names(&active)
            ));
        }
        if !router.running {
            warnings.push(format!(
                "router {} is not running; no color is receiving traffic",
                router.service
            ));
        }

        let mut notes = Vec::new();
        if inactive.all_running() {
            notes.push(format!(
                "inactive color {} is fully running and can take traffic via --rollback",
                record.color.complement()
            ));
        }

        StatusReport {
            environment: Environment::Production,
            state: Some(record),
            slots: vec![active, inactive],
            router: Some(router),
            warnings,
            notes,
        }
    }
}

fn slot_status(
    settings: &Settings,
    target: DeploymentTarget,
    role: SlotRole,
    listing: &[ServiceStatus],
) -> SlotStatus {
    SlotStatus {
        color: target.color(),
        role,
        services: settings
            .services
            .slot(&target)
            .iter()
            .map(|service| ServiceState::from_listing(service, listing))
            .collect(),
    }
}

fn stopped_names(slot: &SlotStatus) -> String {
    slot.services
        .iter()
        .filter(|s| !s.running)
        .map(|s| s.service.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
