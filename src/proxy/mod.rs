//
// src/proxy/mod.rs
//
mod dispatcher;
mod forward;
mod pool;
mod upstream;

pub use dispatcher::{Dispatcher, ProxyError};
pub use forward::{ClientAddr, Forwarder};
pub use pool::UpstreamPool;
pub use upstream::Upstream;
