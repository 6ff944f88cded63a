// ABOUTME: Integration tests for health probes and the health gate.
// ABOUTME: Uses local listeners for TCP/HTTP probes and scripted probes for retry policy.

mod support;

use async_trait::async_trait;
use nonempty::NonEmpty;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use support::FakeOrchestrator;
use swatch::config::{HealthConfig, ProbeConfig};
use swatch::health::{
    HealthGate, HealthProbe, HttpProbe, ProbeContext, ProbeError, StatusProbe, TcpProbe,
};
use swatch::types::{Color, ServiceName};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn green_slot() -> NonEmpty<ServiceName> {
    NonEmpty::from((
        ServiceName::new("backend-green").unwrap(),
        vec![ServiceName::new("webui-green").unwrap()],
    ))
}

fn policy(retries: u32, timeout: Duration) -> HealthConfig {
    HealthConfig {
        grace_period: Duration::ZERO,
        timeout,
        retries,
        interval: Duration::ZERO,
        probe: ProbeConfig::Status,
    }
}

/// Fails a fixed number of times, then passes.
struct Flaky {
    failures: u32,
    attempts: Arc<AtomicU32>,
}

#[async_trait]
impl HealthProbe for Flaky {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn check(&self, _ctx: &ProbeContext<'_>) -> Result<(), ProbeError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            Err(ProbeError::NotRunning(vec!["webui-green".to_string()]))
        } else {
            Ok(())
        }
    }
}

struct Hanging;

#[async_trait]
impl HealthProbe for Hanging {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn check(&self, _ctx: &ProbeContext<'_>) -> Result<(), ProbeError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

/// Serve one HTTP response per connection, returning the request line seen.
async fn serve(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 1024];
        let n = socket.read(&mut buf).await.unwrap();
        let response = format!("{status_line}\r\nContent-Length: 0\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();
        request.lines().next().unwrap_or_default().to_string()
    });
    (address, handle)
}

mod gate {
    use super::*;

    #[tokio::test]
    async fn retries_until_probe_passes() {
        let fake = FakeOrchestrator::new();
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: Some(Color::Green),
        };
        let attempts = Arc::new(AtomicU32::new(0));
        let gate = HealthGate::new(
            Box::new(Flaky {
                failures: 2,
                attempts: attempts.clone(),
            }),
            &policy(2, Duration::from_secs(1)),
        );

        gate.wait_healthy(&ctx).await.unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_failure() {
        let fake = FakeOrchestrator::new();
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: Some(Color::Green),
        };
        let attempts = Arc::new(AtomicU32::new(0));
        let gate = HealthGate::new(
            Box::new(Flaky {
                failures: 5,
                attempts: attempts.clone(),
            }),
            &policy(1, Duration::from_secs(1)),
        );

        let err = gate.wait_healthy(&ctx).await.unwrap_err();
        assert!(matches!(err, ProbeError::NotRunning(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn slow_attempt_times_out() {
        let fake = FakeOrchestrator::new();
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: Some(Color::Green),
        };
        let gate = HealthGate::new(Box::new(Hanging), &policy(0, Duration::from_millis(20)));

        let err = gate.wait_healthy(&ctx).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));
    }
}

mod probes {
    use super::*;

    #[tokio::test]
    async fn status_probe_names_missing_services() {
        let fake = FakeOrchestrator::new().with_running(&["backend-green"]);
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: Some(Color::Green),
        };

        match StatusProbe.check(&ctx).await {
            Err(ProbeError::NotRunning(missing)) => assert_eq!(missing, ["webui-green"]),
            other => panic!("expected NotRunning, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tcp_probe_connects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let fake = FakeOrchestrator::new();
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: Some(Color::Green),
        };

        TcpProbe::new(&address).check(&ctx).await.unwrap();

        drop(listener);
        let err = TcpProbe::new(&address).check(&ctx).await.unwrap_err();
        assert!(matches!(err, ProbeError::Tcp { .. }));
    }

    #[tokio::test]
    async fn http_probe_substitutes_color() {
        let (address, server) = serve("HTTP/1.1 200 OK").await;
        let fake = FakeOrchestrator::new();
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: Some(Color::Green),
        };

        HttpProbe::new(format!("http://{address}/{{color}}/health"))
            .check(&ctx)
            .await
            .unwrap();

        assert_eq!(server.await.unwrap(), "GET /green/health HTTP/1.1");
    }

    #[tokio::test]
    async fn http_probe_rejects_error_status() {
        let (address, _server) = serve("HTTP/1.1 503 Service Unavailable").await;
        let fake = FakeOrchestrator::new();
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: None,
        };

        let err = HttpProbe::new(format!("http://{address}/health"))
            .check(&ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn https_is_not_supported() {
        let fake = FakeOrchestrator::new();
        let services = green_slot();
        let ctx = ProbeContext {
            orchestrator: &fake,
            services: &services,
            color: None,
        };

        let err = HttpProbe::new("https://localhost/health")
            .check(&ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("only http://"));
    }
}
