// ABOUTME: Health gating for freshly started slots.
// ABOUTME: Polymorphic probes run under a grace period, timeout, and retry policy.

mod http;
mod status;
mod tcp;

pub use http::HttpProbe;
pub use status::StatusProbe;
pub use tcp::TcpProbe;

use async_trait::async_trait;
use nonempty::NonEmpty;
use std::time::Duration;

use crate::config::{HealthConfig, ProbeConfig};
use crate::orchestrator::{ContainerOrchestrator, OrchestratorError};
use crate::types::{Color, ServiceName};

/// What a probe is checking.
pub struct ProbeContext<'a> {
    pub orchestrator: &'a dyn ContainerOrchestrator,
    pub services: &'a NonEmpty<ServiceName>,
    pub color: Option<Color>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("services not running: {}", .0.join(", "))]
    NotRunning(Vec<String>),

    #[error("status listing failed: {0}")]
    Listing(#[from] OrchestratorError),

    #[error("HTTP check against {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("TCP connect to {address} failed: {source}")]
    Tcp {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("probe attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// A readiness check for a deployed slot.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: &ProbeContext<'_>) -> Result<(), ProbeError>;
}

/// Build the probe selected in configuration.
pub fn probe_for(config: &ProbeConfig) -> Box<dyn HealthProbe> {
    match config {
        ProbeConfig::Status => Box::new(StatusProbe),
        ProbeConfig::Http { url } => Box::new(HttpProbe::new(url)),
        ProbeConfig::Tcp { address } => Box::new(TcpProbe::new(address)),
    }
}

/// Replace `{color}` placeholders with the color being checked.
pub(crate) fn expand_color(template: &str, color: Option<Color>) -> String {
    match color {
        Some(color) => template.replace("{color}", color.as_str()),
        None => template.to_string(),
    }
}

/// Runs a probe until it passes or the retry budget is spent.
pub struct HealthGate {
    probe: Box<dyn HealthProbe>,
    grace_period: Duration,
    timeout: Duration,
    retries: u32,
    interval: Duration,
}

impl HealthGate {
    pub fn new(probe: Box<dyn HealthProbe>, config: &HealthConfig) -> Self {
        Self {
            probe,
            grace_period: config.grace_period,
            timeout: config.timeout,
            retries: config.retries,
            interval: config.interval,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(probe_for(&config.probe), config)
    }

    pub fn probe_name(&self) -> &'static str {
        self.probe.name()
    }

    /// Wait out the grace period, then probe. Returns the last failure once
    /// `retries + 1` attempts have failed.
    pub async fn wait_healthy(&self, ctx: &ProbeContext<'_>) -> Result<(), ProbeError> {
        if !self.grace_period.is_zero() {
            tracing::debug!("Waiting {:?} before probing", self.grace_period);
            tokio::time::sleep(self.grace_period).await;
        }

        let mut retries_remaining = self.retries;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.probe.check(ctx)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ProbeError::Timeout(self.timeout)),
            };

            match result {
                Ok(()) => {
                    tracing::info!("{} probe passed", self.probe.name());
                    return Ok(());
                }
                Err(e) if retries_remaining == 0 => {
                    tracing::warn!("{} probe failed: {}", self.probe.name(), e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::debug!(
                        "{} probe failed ({} retries left): {}",
                        self.probe.name(),
                        retries_remaining,
                        e
                    );
                    retries_remaining -= 1;
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
