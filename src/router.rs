// ABOUTME: Traffic router control for the reverse-proxy service.
// ABOUTME: Switching colors means a full stop, remove, and start with the new color.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::{RouterConfig, Settings};
use crate::orchestrator::{ContainerOrchestrator, OrchestratorError, all_running};
use crate::types::{Color, ServiceName};

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("failed to {step} router: {source}")]
    Orchestrator {
        step: &'static str,
        source: OrchestratorError,
    },

    #[error("router service {0} is not running after restart")]
    NotRunning(String),
}

/// The reverse proxy that routes traffic to one color.
#[derive(Debug, Clone)]
pub struct TrafficRouter {
    service: ServiceName,
    color_var: String,
    grace_period: Duration,
}

impl TrafficRouter {
    pub fn new(service: ServiceName, config: &RouterConfig) -> Self {
        Self {
            service,
            color_var: config.color_var.clone(),
            grace_period: config.grace_period,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.services.router.clone(), &settings.router)
    }

    pub fn service(&self) -> &ServiceName {
        &self.service
    }

    /// Environment handed to the router at startup.
    pub fn route_env(&self, color: Color) -> HashMap<String, String> {
        HashMap::from([(self.color_var.clone(), color.to_string())])
    }

    /// Restart the router so it routes to `color`, then confirm it is running.
    pub async fn restart<O: ContainerOrchestrator + ?Sized>(
        &self,
        orchestrator: &O,
        color: Color,
    ) -> Result<(), RouterError> {
        let services = std::slice::from_ref(&self.service);

        orchestrator
            .stop(services)
            .await
            .map_err(|source| RouterError::Orchestrator { step: "stop", source })?;
        orchestrator
            .remove(services)
            .await
            .map_err(|source| RouterError::Orchestrator {
                step: "remove",
                source,
            })?;
        orchestrator
            .start(services, &self.route_env(color))
            .await
            .map_err(|source| RouterError::Orchestrator {
                step: "start",
                source,
            })?;

        if !self.grace_period.is_zero() {
            tokio::time::sleep(self.grace_period).await;
        }

        let listing = orchestrator
            .list_status()
            .await
            .map_err(|source| RouterError::Orchestrator {
                step: "inspect",
                source,
            })?;

        if all_running(&listing, [&self.service]) {
            tracing::info!("Router {} now routing to {}", self.service, color);
            Ok(())
        } else {
            Err(RouterError::NotRunning(self.service.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_env_uses_configured_variable() {
        let router = TrafficRouter::new(
            ServiceName::new("router").unwrap(),
            &RouterConfig {
                color_var: "UPSTREAM_COLOR".to_string(),
                grace_period: Duration::ZERO,
            },
        );
        let env = router.route_env(Color::Green);
        assert_eq!(env.get("UPSTREAM_COLOR").map(String::as_str), Some("green"));
    }
}
