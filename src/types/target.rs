// ABOUTME: Deployment target pairing an environment with an optional color.
// ABOUTME: Enforces that production targets always carry a color.

use super::{Color, Environment};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("a color is required for the {0} environment")]
    MissingColor(Environment),

    #[error("colors are not used in the {0} environment")]
    ColorNotApplicable(Environment),
}

/// The service group an operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeploymentTarget {
    environment: Environment,
    color: Option<Color>,
}

impl DeploymentTarget {
    pub fn new(environment: Environment, color: Option<Color>) -> Result<Self, TargetError> {
        match (environment.has_colors(), color) {
            (true, None) => Err(TargetError::MissingColor(environment)),
            (false, Some(_)) => Err(TargetError::ColorNotApplicable(environment)),
            _ => Ok(Self { environment, color }),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            color: None,
        }
    }

    pub fn production(color: Color) -> Self {
        Self {
            environment: Environment::Production,
            color: Some(color),
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => write!(f, "{}/{}", self.environment, color),
            None => write!(f, "{}", self.environment),
        }
    }
}
