// ABOUTME: TCP connect probe.
// ABOUTME: Passes when the configured address accepts a connection.

use async_trait::async_trait;
use tokio::net::TcpStream;

use super::{HealthProbe, ProbeContext, ProbeError, expand_color};

#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
}

impl TcpProbe {
    /// `address` is `host:port`; `{color}` is replaced with the deployed color.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl HealthProbe for TcpProbe {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn check(&self, ctx: &ProbeContext<'_>) -> Result<(), ProbeError> {
        let address = expand_color(&self.address, ctx.color);
        TcpStream::connect(&address)
            .await
            .map(|_| ())
            .map_err(|source| ProbeError::Tcp { address, source })
    }
}
