// ABOUTME: Service naming for the single staging slot and the colored production slots.
// ABOUTME: Derives compose service names and backend addresses from a deployment target.

use crate::types::{DeploymentTarget, ServiceName};
use nonempty::NonEmpty;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub backend: ServiceName,
    pub webui: ServiceName,
    pub router: ServiceName,
    /// Port the backend listens on inside the compose network.
    pub port: u16,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        ServicesConfig {
            backend: ServiceName::from_static("backend"),
            webui: ServiceName::from_static("webui"),
            router: ServiceName::from_static("router"),
            port: 5000,
        }
    }
}

impl ServicesConfig {
    /// Services making up the slot addressed by `target`.
    pub fn slot(&self, target: &DeploymentTarget) -> NonEmpty<ServiceName> {
        match target.color() {
            Some(color) => NonEmpty::from((
                self.backend.with_color(color),
                vec![self.webui.with_color(color)],
            )),
            None => NonEmpty::from((self.backend.clone(), vec![self.webui.clone()])),
        }
    }

    /// Address the front-end should call for `target`'s backend.
    pub fn backend_address(&self, target: &DeploymentTarget) -> String {
        let service = match target.color() {
            Some(color) => self.backend.with_color(color),
            None => self.backend.clone(),
        };
        format!("{}:{}", service, self.port)
    }
}
