// ABOUTME: Writes the pointer file telling the front-end which backend to call.
// ABOUTME: One KEY=address line derived from the environment and color.

use std::path::{Path, PathBuf};

use crate::config::{PointerConfig, ServicesConfig};
use crate::state::write_atomic;
use crate::types::{Color, DeploymentTarget, Environment, TargetError};

#[derive(Debug, thiserror::Error)]
pub enum PointerError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("failed to write pointer file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Maintains the backend pointer file for a project.
#[derive(Debug, Clone)]
pub struct EnvironmentConfigurator {
    pointer: PointerConfig,
    services: ServicesConfig,
}

impl EnvironmentConfigurator {
    pub fn new(pointer: PointerConfig, services: ServicesConfig) -> Self {
        Self { pointer, services }
    }

    pub fn path(&self) -> &Path {
        &self.pointer.path
    }

    /// The line written for `target`.
    pub fn render(&self, target: &DeploymentTarget) -> String {
        format!(
            "{}={}\n",
            self.pointer.key,
            self.services.backend_address(target)
        )
    }

    /// Point the front-end at `environment`'s backend. Production needs a color.
    pub fn configure(
        &self,
        environment: Environment,
        color: Option<Color>,
    ) -> Result<DeploymentTarget, PointerError> {
        let target = DeploymentTarget::new(environment, color)?;
        let line = self.render(&target);

        write_atomic(&self.pointer.path, &line).map_err(|source| PointerError::Write {
            path: self.pointer.path.clone(),
            source,
        })?;

        tracing::info!(
            "Pointed {} at {}",
            self.pointer.path.display(),
            line.trim_end()
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn configurator(dir: &Path) -> EnvironmentConfigurator {
        EnvironmentConfigurator::new(
            PointerConfig {
                path: dir.join("webui").join(".env.backend"),
                key: "BACKEND_URL".to_string(),
            },
            ServicesConfig::default(),
        )
    }

    #[test]
    fn staging_points_at_plain_backend() {
        let dir = tempfile::tempdir().unwrap();
        let configurator = configurator(dir.path());

        configurator.configure(Environment::Staging, None).unwrap();

        let content = fs::read_to_string(configurator.path()).unwrap();
        assert_eq!(content, "BACKEND_URL=backend:5000\n");
    }

    #[test]
    fn production_points_at_colored_backend() {
        let dir = tempfile::tempdir().unwrap();
        let configurator = configurator(dir.path());

        configurator
            .configure(Environment::Production, Some(Color::Green))
            .unwrap();

        let content = fs::read_to_string(configurator.path()).unwrap();
        assert_eq!(content, "BACKEND_URL=backend-green:5000\n");
    }

    #[test]
    fn production_without_color_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let configurator = configurator(dir.path());

        let err = configurator
            .configure(Environment::Production, None)
            .unwrap_err();

        assert!(matches!(
            err,
            PointerError::Target(TargetError::MissingColor(Environment::Production))
        ));
        assert!(!configurator.path().exists());
    }
}
