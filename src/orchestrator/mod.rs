// ABOUTME: Container orchestration capability driven by the deployment controller.
// ABOUTME: Exports the orchestrator trait, status listing types, and the compose backend.

mod compose;
mod error;
mod status;

pub use compose::Compose;
pub use error::{OrchestratorError, OrchestratorErrorKind};
pub use status::{ServiceStatus, all_running, parse_ps_output};

use crate::types::ServiceName;
use async_trait::async_trait;
use std::collections::HashMap;

/// Options for image builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Ignore the build cache.
    pub no_cache: bool,
}

/// Lifecycle operations on named services of one project.
///
/// An empty service slice addresses every service of the project.
#[async_trait]
pub trait ContainerOrchestrator: Send + Sync {
    /// Build images for the given services.
    async fn build(
        &self,
        services: &[ServiceName],
        options: BuildOptions,
    ) -> Result<(), OrchestratorError>;

    /// Stop running containers of the given services.
    async fn stop(&self, services: &[ServiceName]) -> Result<(), OrchestratorError>;

    /// Remove stopped containers of the given services.
    async fn remove(&self, services: &[ServiceName]) -> Result<(), OrchestratorError>;

    /// Create and start containers, passing `env` to the service definitions.
    async fn start(
        &self,
        services: &[ServiceName],
        env: &HashMap<String, String>,
    ) -> Result<(), OrchestratorError>;

    /// Running state of every container in the project.
    async fn list_status(&self) -> Result<Vec<ServiceStatus>, OrchestratorError>;
}
