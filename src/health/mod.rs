// src/health/mod.rs
mod checker;

pub use checker::{create_health_checker, AlwaysAlive, HealthChecker, ReportedLiveness};
