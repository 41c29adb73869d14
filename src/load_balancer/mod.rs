// src/load_balancer/mod.rs
mod round_robin;

pub use round_robin::RoundRobin;
