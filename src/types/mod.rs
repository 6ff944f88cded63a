// ABOUTME: Validated domain types shared across the orchestrator.
// ABOUTME: Colors, environments, service names and deployment targets.

mod color;
mod environment;
mod service_name;
mod target;

pub use color::{Color, ParseColorError};
pub use environment::{Environment, ParseEnvironmentError};
pub use service_name::{ServiceName, ServiceNameError};
pub use target::{DeploymentTarget, TargetError};
