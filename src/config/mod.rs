// ABOUTME: Configuration types and parsing for swatch.yml.
// ABOUTME: Handles YAML parsing, discovery, and per-environment resolution.

mod health;
mod router;
mod services;

pub use health::{HealthConfig, ProbeConfig};
pub use router::RouterConfig;
pub use services::ServicesConfig;

use crate::error::{Error, Result};
use crate::types::Environment;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "swatch.yml";
pub const CONFIG_FILENAME_ALT: &str = "swatch.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".swatch/config.yml";

/// Environment variable naming the configuration file, relative to the discovery directory.
pub const CONFIG_ENV: &str = "SWATCH_CONFIG";

/// Directory holding state and lock files unless overridden.
pub const STATE_DIR: &str = ".swatch";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Compose project name shared by all environments.
    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub services: ServicesConfig,

    #[serde(default)]
    pub pointer: PointerConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub health: HealthConfig,

    /// How long staging containers get to settle before status is reported.
    #[serde(default = "default_staging_settle", with = "humantime_serde")]
    pub staging_settle: Duration,

    #[serde(default)]
    pub environments: HashMap<String, EnvironmentConfig>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub compose_file: PathBuf,

    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Rebuild colored images without the build cache.
    #[serde(default)]
    pub no_cache: bool,

    #[serde(default)]
    pub health: Option<HealthConfig>,
}

/// Where the front-end learns which backend to call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub path: PathBuf,
    pub key: String,
}

impl Default for PointerConfig {
    fn default() -> Self {
        PointerConfig {
            path: PathBuf::from("webui/.env.backend"),
            key: "BACKEND_URL".to_string(),
        }
    }
}

fn default_staging_settle() -> Duration {
    Duration::from_secs(5)
}

/// Configuration resolved for a single environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub project: Option<String>,
    pub compose_file: PathBuf,
    pub state_file: PathBuf,
    pub no_cache: bool,
    pub services: ServicesConfig,
    pub pointer: PointerConfig,
    pub router: RouterConfig,
    pub health: HealthConfig,
    pub staging_settle: Duration,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = path
            .parent()
            .map(config_root)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(&dir.join(path));
        }

        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Resolve the settings for `environment`, applying its overrides.
    pub fn for_environment(&self, environment: Environment) -> Result<Settings> {
        let env = self
            .environments
            .get(environment.as_str())
            .or_else(|| match environment {
                Environment::Production => self.environments.get("production"),
                Environment::Staging => None,
            })
            .ok_or(Error::UnknownEnvironment(environment))?;

        let state_file = env.state_file.clone().unwrap_or_else(|| {
            PathBuf::from(STATE_DIR).join(format!("{}.color", environment.as_str()))
        });

        Ok(Settings {
            environment,
            project: env.project.clone().or_else(|| self.project.clone()),
            compose_file: self.resolve(&env.compose_file),
            state_file: self.resolve(&state_file),
            no_cache: env.no_cache,
            services: self.services.clone(),
            pointer: PointerConfig {
                path: self.resolve(&self.pointer.path),
                key: self.pointer.key.clone(),
            },
            router: self.router.clone(),
            health: env.health.clone().unwrap_or_else(|| self.health.clone()),
            staging_settle: self.staging_settle,
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// A config inside `.swatch/` belongs to the project directory above it.
fn config_root(dir: &Path) -> PathBuf {
    if dir.file_name().is_some_and(|name| name == STATE_DIR) {
        dir.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        dir.to_path_buf()
    }
}
