// ABOUTME: Orchestrator error types with SNAFU pattern.
// ABOUTME: Separates process launch failures, non-zero exits, and unparseable output.

use snafu::Snafu;

/// Failure of an orchestrator command.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OrchestratorError {
    #[snafu(display("failed to run `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` failed ({status}): {stderr}"))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[snafu(display("failed to parse service status: {source}"))]
    ParseStatus { source: serde_json::Error },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorErrorKind {
    /// The orchestrator binary could not be launched.
    Unavailable,
    /// The command ran and reported failure.
    CommandFailed,
    /// The status listing could not be understood.
    InvalidOutput,
}

impl OrchestratorError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> OrchestratorErrorKind {
        match self {
            OrchestratorError::Spawn { .. } => OrchestratorErrorKind::Unavailable,
            OrchestratorError::CommandFailed { .. } => OrchestratorErrorKind::CommandFailed,
            OrchestratorError::ParseStatus { .. } => OrchestratorErrorKind::InvalidOutput,
        }
    }

    /// Convenience constructor for test doubles and wrappers.
    pub fn failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        OrchestratorError::CommandFailed {
            command: command.into(),
            status: "exit status: 1".to_string(),
            stderr: stderr.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_variants() {
        let spawn = OrchestratorError::Spawn {
            command: "docker compose ps".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no docker"),
        };
        assert_eq!(spawn.kind(), OrchestratorErrorKind::Unavailable);
        assert_eq!(
            OrchestratorError::failed("docker compose build", "boom").kind(),
            OrchestratorErrorKind::CommandFailed
        );
    }

    #[test]
    fn command_failure_mentions_command_and_stderr() {
        let err = OrchestratorError::failed("docker compose build backend-green", "no space left");
        let message = err.to_string();
        assert!(message.contains("docker compose build backend-green"));
        assert!(message.contains("no space left"));
    }
}
