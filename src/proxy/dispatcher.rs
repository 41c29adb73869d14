// ────────────────────────────────
// src/proxy/dispatcher.rs
// Entry point for every inbound request: pick an upstream, relay to it.
// ────────────────────────────────

use super::UpstreamPool;
use hyper::{Body, Request, Response, StatusCode};
use std::net::SocketAddr;
use std::sync::Arc;

pub struct Dispatcher {
    listen_addr: SocketAddr,
    pool: Arc<UpstreamPool>,
}

impl Dispatcher {
    pub fn new(listen_addr: SocketAddr, pool: Arc<UpstreamPool>) -> Self {
        Self { listen_addr, pool }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Forward `req` unchanged to the next upstream in rotation. Failures are
    /// not retried on another upstream.
    pub async fn handle(&self, req: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let upstream = self.pool.select_next().await?;

        tracing::debug!(
            upstream = %upstream.address(),
            method = %req.method(),
            path = %req.uri().path(),
            "forwarding request"
        );

        upstream.forward(req).await.map_err(|e| {
            tracing::warn!(upstream = %upstream.address(), error = %e, "upstream request failed");
            e
        })
    }
}

// Custom error type for proxy operations
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("No available upstream")]
    NoAvailableUpstream,

    #[error("Upstream error: {0}")]
    Upstream(#[from] hyper::Error),

    #[error("Invalid upstream target: {0}")]
    InvalidTarget(#[from] hyper::http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoAvailableUpstream => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Upstream(_) | ProxyError::InvalidTarget(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

// Convert ProxyError to Hyper Response for error handling
impl From<ProxyError> for Response<Body> {
    fn from(err: ProxyError) -> Self {
        let status = err.status();
        let message = match err {
            ProxyError::NoAvailableUpstream => "No available upstream",
            ProxyError::Upstream(_) | ProxyError::InvalidTarget(_) => "Bad gateway",
        };

        let mut response = Response::new(Body::from(message));
        *response.status_mut() = status;
        response
    }
}
