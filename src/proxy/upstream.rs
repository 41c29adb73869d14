// src/proxy/upstream.rs
use super::{Forwarder, ProxyError};
use crate::config::{parse_backend_address, ConfigError};
use hyper::{Body, Request, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// One backend target. The address never changes after construction.
#[derive(Debug)]
pub struct Upstream {
    address: String,
    url: Url,
    alive: AtomicBool,
    forwarder: Forwarder,
}

impl Upstream {
    pub fn new(address: &str, forwarder: Forwarder) -> Result<Self, ConfigError> {
        let url = parse_backend_address(address)?;

        Ok(Self {
            address: address.to_string(),
            url,
            alive: AtomicBool::new(true),
            forwarder,
        })
    }

    /// The address exactly as configured.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Last reported liveness. Nothing in the dispatcher itself flips this;
    /// it starts out true.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn set_alive(&self, alive: bool) {
        let was = self.alive.swap(alive, Ordering::AcqRel);
        if was != alive {
            tracing::info!(upstream = %self.address, alive, "upstream liveness changed");
        }
    }

    /// Relay `req` to this backend and hand back its response as it streams in.
    pub async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, ProxyError> {
        self.forwarder.forward(&self.url, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_configured_address() {
        let up = Upstream::new("https://www.bing.com", Forwarder::new()).unwrap();

        assert_eq!(up.address(), "https://www.bing.com");
        assert_eq!(up.url().host_str(), Some("www.bing.com"));
        assert!(up.is_alive());
    }

    #[test]
    fn test_rejects_malformed_address() {
        let err = Upstream::new("not a url \x00", Forwarder::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { .. }));
    }

    #[test]
    fn test_set_alive_round_trip() {
        let up = Upstream::new("http://a", Forwarder::new()).unwrap();
        up.set_alive(false);
        assert!(!up.is_alive());
        up.set_alive(true);
        assert!(up.is_alive());
    }
}
