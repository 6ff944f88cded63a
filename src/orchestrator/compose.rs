// ABOUTME: Docker Compose backed orchestrator.
// ABOUTME: Runs `docker compose` subcommands as child processes, one at a time.

use async_trait::async_trait;
use snafu::ResultExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Settings;
use crate::types::ServiceName;

use super::error::{CommandFailedSnafu, ParseStatusSnafu, SpawnSnafu};
use super::{
    BuildOptions, ContainerOrchestrator, OrchestratorError, ServiceStatus, parse_ps_output,
};

/// Drives one compose project through the `docker compose` CLI.
#[derive(Debug, Clone)]
pub struct Compose {
    program: PathBuf,
    compose_file: PathBuf,
    project: Option<String>,
    inherit_output: bool,
}

impl Compose {
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("docker"),
            compose_file: compose_file.into(),
            project: None,
            inherit_output: false,
        }
    }

    /// Compose backend for an environment's settings.
    pub fn for_settings(settings: &Settings) -> Self {
        let compose = Self::new(&settings.compose_file);
        match &settings.project {
            Some(project) => compose.project(project),
            None => compose,
        }
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Binary invoked with `compose ...` arguments (defaults to `docker`).
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Show build and start output on the terminal instead of capturing it.
    /// Failures then carry no stderr text; the terminal already showed it.
    pub fn inherit_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    pub fn compose_file(&self) -> &Path {
        &self.compose_file
    }

    /// Full argument list for a compose subcommand.
    pub fn args(&self, subcommand: &[&str], services: &[ServiceName]) -> Vec<String> {
        let mut args = vec![
            "compose".to_string(),
            "-f".to_string(),
            self.compose_file.display().to_string(),
        ];
        if let Some(project) = &self.project {
            args.push("-p".to_string());
            args.push(project.clone());
        }
        args.extend(subcommand.iter().map(|s| s.to_string()));
        args.extend(services.iter().map(|s| s.to_string()));
        args
    }

    async fn run(
        &self,
        args: Vec<String>,
        env: &HashMap<String, String>,
        capture: bool,
    ) -> Result<String, OrchestratorError> {
        let command = format!("{} {}", self.program.display(), args.join(" "));
        tracing::debug!("Running {}", command);

        let mut cmd = Command::new(&self.program);
        cmd.args(&args).envs(env).stdin(Stdio::null());

        let inherit = self.inherit_output && !capture;
        if inherit {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let output = cmd.output().await.context(SpawnSnafu {
            command: command.clone(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::warn!("{} failed with {}", command, output.status);
            return CommandFailedSnafu {
                command,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            }
            .fail();
        }

        if !stderr.trim().is_empty() {
            tracing::debug!("{}", stderr.trim());
        }
        Ok(stdout)
    }
}

#[async_trait]
impl ContainerOrchestrator for Compose {
    async fn build(
        &self,
        services: &[ServiceName],
        options: BuildOptions,
    ) -> Result<(), OrchestratorError> {
        let subcommand: &[&str] = if options.no_cache {
            &["build", "--no-cache"]
        } else {
            &["build"]
        };
        self.run(self.args(subcommand, services), &HashMap::new(), false)
            .await
            .map(|_| ())
    }

    async fn stop(&self, services: &[ServiceName]) -> Result<(), OrchestratorError> {
        self.run(self.args(&["stop"], services), &HashMap::new(), false)
            .await
            .map(|_| ())
    }

    async fn remove(&self, services: &[ServiceName]) -> Result<(), OrchestratorError> {
        self.run(self.args(&["rm", "-f"], services), &HashMap::new(), false)
            .await
            .map(|_| ())
    }

    async fn start(
        &self,
        services: &[ServiceName],
        env: &HashMap<String, String>,
    ) -> Result<(), OrchestratorError> {
        // Colored slots are started on their own so the live color is never recreated.
        let subcommand: &[&str] = if services.is_empty() {
            &["up", "-d"]
        } else {
            &["up", "-d", "--no-deps"]
        };
        self.run(self.args(subcommand, services), env, false)
            .await
            .map(|_| ())
    }

    async fn list_status(&self) -> Result<Vec<ServiceStatus>, OrchestratorError> {
        let output = self
            .run(
                self.args(&["ps", "--all", "--format", "json"], &[]),
                &HashMap::new(),
                true,
            )
            .await?;
        parse_ps_output(&output).context(ParseStatusSnafu)
    }
}
