//! portico agent entry point.
//!
//! Boots the edge cache agent on the stdio transport: events in on stdin,
//! effects out on stdout. Logging goes to stderr to avoid interfering with
//! the protocol channel.

use anyhow::Result;
use portico_client::fetch::FetchClient;
use portico_core::{AppConfig, CacheStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod bus;
mod config_endpoint;
mod events;
mod host;
mod interceptor;
mod lifecycle;
mod messages;
mod notify;
mod stdio;
mod worker;

#[cfg(test)]
mod testutil;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!(cache = %config.cache_name(), "starting portico agent on stdio transport");

    let store = CacheStore::open(&config.db_path).await?;
    let fetcher = Arc::new(FetchClient::new(&config.user_agent)?);
    let host = stdio::StdioHost::new();

    let worker = worker::Worker::new(&config, store, fetcher, host.clone(), host.clone());

    stdio::serve(&worker, host).await
}
