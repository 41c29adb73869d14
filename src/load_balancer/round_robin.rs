// src/load_balancer/round_robin.rs
use crate::health::HealthChecker;
use crate::proxy::Upstream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Rotating cursor over an ordered upstream list.
///
/// Every candidate examined claims its own slot with a single `fetch_add`, so
/// concurrent callers never observe the same slot and a fully alive pool is
/// visited exactly once per cycle. A dead candidate costs one slot, which makes
/// the next call start right after whatever was returned.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }

    /// Picks the next alive upstream, examining at most `upstreams.len()`
    /// candidates. `None` means nothing in the pool is alive (or it is empty).
    pub async fn select(
        &self,
        upstreams: &[Arc<Upstream>],
        health: &dyn HealthChecker,
    ) -> Option<Arc<Upstream>> {
        let n = upstreams.len();

        for _ in 0..n {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed) % n;
            let upstream = &upstreams[index];

            if health.is_alive(upstream).await {
                return Some(upstream.clone());
            }

            tracing::trace!(upstream = %upstream.address(), "skipping dead upstream");
        }

        None
    }

    /// Raw cursor value, i.e. the number of slots handed out so far.
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        "round_robin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{AlwaysAlive, ReportedLiveness};
    use crate::proxy::Forwarder;

    fn upstreams(addresses: &[&str]) -> Vec<Arc<Upstream>> {
        let forwarder = Forwarder::new();
        addresses
            .iter()
            .map(|a| Arc::new(Upstream::new(a, forwarder.clone()).unwrap()))
            .collect()
    }

    async fn next_address(rr: &RoundRobin, ups: &[Arc<Upstream>], health: &dyn HealthChecker) -> String {
        rr.select(ups, health).await.unwrap().address().to_string()
    }

    #[tokio::test]
    async fn test_visits_each_upstream_once_per_cycle() {
        let ups = upstreams(&["http://a", "http://b", "http://c"]);
        let rr = RoundRobin::new();

        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(next_address(&rr, &ups, &AlwaysAlive).await);
        }

        assert_eq!(
            seen,
            vec!["http://a", "http://b", "http://c", "http://a", "http://b", "http://c"]
        );
        assert_eq!(rr.position(), 6);
    }

    #[tokio::test]
    async fn test_skip_consumes_slot() {
        let ups = upstreams(&["http://a", "http://b", "http://c"]);
        let rr = RoundRobin::new();

        ups[0].set_alive(false);
        assert_eq!(next_address(&rr, &ups, &ReportedLiveness).await, "http://b");
        assert_eq!(rr.position(), 2);
    }

    #[tokio::test]
    async fn test_empty_slice_yields_none() {
        let rr = RoundRobin::new();
        assert!(rr.select(&[], &AlwaysAlive).await.is_none());
        assert_eq!(rr.position(), 0);
    }

    #[tokio::test]
    async fn test_all_dead_is_bounded() {
        let ups = upstreams(&["http://a", "http://b"]);
        for up in &ups {
            up.set_alive(false);
        }
        let rr = RoundRobin::new();

        assert!(rr.select(&ups, &ReportedLiveness).await.is_none());
        assert_eq!(rr.position(), 2);
    }
}
