// src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use rr_dispatch::{
    config::{self, Config},
    proxy::{Dispatcher, UpstreamPool},
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rr_dispatch=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration; built-in backends when no file is given
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => {
            info!("No configuration file given, using defaults");
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    let pool = Arc::new(UpstreamPool::from_config(&config)?);
    for upstream in pool.upstreams() {
        info!(address = %upstream.address(), "registered upstream");
    }
    info!(
        upstreams = pool.upstreams().len(),
        strategy = pool.strategy(),
        health = pool.health_policy(),
        "upstream pool ready"
    );

    let dispatcher = Arc::new(Dispatcher::new(config.listen_addr(), pool));
    let handler = RequestHandler::new(dispatcher.clone());

    info!("Serving requests at {}", dispatcher.listen_addr());
    ServerBuilder::new(dispatcher.listen_addr())
        .with_handler(handler)
        .serve()
        .await?;

    Ok(())
}
