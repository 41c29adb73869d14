// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use crate::proxy::ClientAddr;
use crate::server::listener::bind_tcp;
use anyhow::{Context, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::{Service, ServiceBuilder};

const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Builder pattern so `main.rs` can inject its request handler.
pub struct ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    addr: SocketAddr,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, handler: None }
    }

    /// Inject the request handler (usually a `RequestHandler`).
    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Consume the builder, bind the port and serve until the listener fails.
    pub async fn serve(self) -> Result<()> {
        let listener = bind_tcp(self.addr).await?;
        tracing::info!("HTTP server listening on {}", self.addr);
        self.serve_on(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        let handler = self
            .handler
            .context("handler must be set via with_handler()")?;

        loop {
            let (stream, peer) = accept_with_backoff(|| listener.accept(), ACCEPT_BACKOFF).await;

            let svc = ServiceBuilder::new()
                .map_request(move |mut req: Request<Body>| {
                    req.extensions_mut().insert(ClientAddr(peer));
                    req
                })
                .service(handler.clone());

            // One Tokio task per connection.
            tokio::spawn(async move {
                let http = Http::new();
                if let Err(err) = http.serve_connection(stream, svc).await {
                    tracing::warn!(%peer, %err, "connection error");
                }
            });
        }
    }
}

/// Retry `accept` until it yields a connection, sleeping `backoff` after each
/// failure so a persistent error (e.g. fd exhaustion) cannot spin the loop.
async fn accept_with_backoff<F, Fut, T>(mut accept: F, backoff: Duration) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(conn) => return conn,
            Err(err) => {
                tracing::warn!(%err, ?backoff, "accept failed, backing off");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
