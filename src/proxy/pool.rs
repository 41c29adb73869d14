//
// src/proxy/pool.rs
//

use super::{Forwarder, ProxyError, Upstream};
use crate::config::{Config, ConfigError};
use crate::health::{create_health_checker, HealthChecker};
use crate::load_balancer::RoundRobin;
use std::sync::Arc;

/// Fixed, ordered set of upstreams plus the round-robin cursor over them.
pub struct UpstreamPool {
    upstreams: Vec<Arc<Upstream>>,
    balancer: RoundRobin,
    health: Arc<dyn HealthChecker>,
}

impl UpstreamPool {
    pub fn new(
        upstreams: Vec<Upstream>,
        health: Arc<dyn HealthChecker>,
    ) -> Result<Self, ConfigError> {
        if upstreams.is_empty() {
            return Err(ConfigError::EmptyPool);
        }

        Ok(Self {
            upstreams: upstreams.into_iter().map(Arc::new).collect(),
            balancer: RoundRobin::new(),
            health,
        })
    }

    /// Build every configured backend over one shared forwarder.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let forwarder = Forwarder::new();
        let upstreams = config
            .backends
            .iter()
            .map(|address| Upstream::new(address, forwarder.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(upstreams, create_health_checker(config.health.policy))
    }

    pub async fn select_next(&self) -> Result<Arc<Upstream>, ProxyError> {
        self.balancer
            .select(&self.upstreams, self.health.as_ref())
            .await
            .ok_or_else(|| {
                tracing::error!(
                    total = self.upstreams.len(),
                    "no alive upstream in pool"
                );
                ProxyError::NoAvailableUpstream
            })
    }

    pub fn upstreams(&self) -> &[Arc<Upstream>] {
        &self.upstreams
    }

    pub fn health_policy(&self) -> &'static str {
        self.health.name()
    }

    pub fn strategy(&self) -> &'static str {
        self.balancer.name()
    }
}
