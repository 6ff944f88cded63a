// ABOUTME: Deployment environments and their slot layout.
// ABOUTME: Staging runs a single slot, production runs blue and green.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Staging,
    #[serde(rename = "prod")]
    Production,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid environment '{0}' (expected staging or prod)")]
pub struct ParseEnvironmentError(pub String);

impl Environment {
    /// Name used on the command line and as the key in the config file.
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Production => "prod",
        }
    }

    /// Whether this environment has two colored slots.
    pub fn has_colors(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
