// ABOUTME: HTTP GET probe over a plain TCP connection.
// ABOUTME: Passes when the endpoint answers with a 2xx status.

use async_trait::async_trait;
use http_body_util::Empty;
use hyper::Uri;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use super::{HealthProbe, ProbeContext, ProbeError, expand_color};

#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: String,
}

impl HttpProbe {
    /// `url` must be `http://`; `{color}` is replaced with the deployed color.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn get(url: &str) -> Result<hyper::StatusCode, String> {
        let uri: Uri = url.parse().map_err(|e| format!("invalid URL: {}", e))?;
        if uri.scheme_str() != Some("http") {
            return Err("only http:// URLs are supported".to_string());
        }
        let host = uri.host().ok_or("URL has no host")?.to_string();
        let port = uri.port_u16().unwrap_or(80);
        let path = uri
            .path_and_query()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| format!("connect failed: {}", e))?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| format!("HTTP handshake failed: {}", e))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("health probe connection error: {}", e);
            }
        });

        let req = hyper::Request::builder()
            .method("GET")
            .uri(&path)
            .header("Host", format!("{}:{}", host, port))
            .body(Empty::<bytes::Bytes>::new())
            .map_err(|e| format!("failed to build request: {}", e))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        Ok(resp.status())
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn check(&self, ctx: &ProbeContext<'_>) -> Result<(), ProbeError> {
        let url = expand_color(&self.url, ctx.color);
        match Self::get(&url).await {
            Ok(status) if status.is_success() => Ok(()),
            Ok(status) => Err(ProbeError::Http {
                url,
                reason: format!("unexpected status {}", status),
            }),
            Err(reason) => Err(ProbeError::Http { url, reason }),
        }
    }
}
