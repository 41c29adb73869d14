// src/health/checker.rs
use crate::config::HealthPolicy;
use crate::proxy::Upstream;
use async_trait::async_trait;
use std::sync::Arc;

/// Liveness policy consulted by the pool for every selection candidate.
#[async_trait]
pub trait HealthChecker: Send + Sync {
    async fn is_alive(&self, upstream: &Upstream) -> bool;

    fn name(&self) -> &'static str;
}

/// Treats every upstream as alive. No probing of any kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAlive;

#[async_trait]
impl HealthChecker for AlwaysAlive {
    async fn is_alive(&self, _upstream: &Upstream) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "always_alive"
    }
}

/// Trusts whatever liveness was last reported on the upstream itself
/// through [`Upstream::set_alive`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportedLiveness;

#[async_trait]
impl HealthChecker for ReportedLiveness {
    async fn is_alive(&self, upstream: &Upstream) -> bool {
        upstream.is_alive()
    }

    fn name(&self) -> &'static str {
        "reported_liveness"
    }
}

pub fn create_health_checker(policy: HealthPolicy) -> Arc<dyn HealthChecker> {
    match policy {
        HealthPolicy::AlwaysAlive => Arc::new(AlwaysAlive),
        HealthPolicy::ReportedLiveness => Arc::new(ReportedLiveness),
    }
}
