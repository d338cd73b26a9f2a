//! dranks server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use dranks_client::{
    DrinksClient, DrinksClientCached, ImageAssetOptions, NotionApi, NotionClient, NotionClientCached, spawn_warmup,
};
use dranks_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(environment = ?config.environment, "Starting dranks server on stdio transport");

    let api: Arc<dyn NotionApi> = Arc::new(NotionClient::from_app_config(&config)?);
    let drinks = DrinksClient::new(Arc::clone(&api), config.require_drinks_database_id()?);
    let drinks = Arc::new(DrinksClientCached::new(drinks, config.cache.clone()));
    let notion = NotionClientCached::new(api, config.cache.clone());
    let image_assets = config.image_assets_database_id.as_deref().map(ImageAssetOptions::new);

    if config.environment.is_production() {
        // detached: serving never waits on the warm-up
        drop(spawn_warmup(Arc::clone(&drinks)));
    }

    let handler = handler::DranksServer::new(tools::Catalog { drinks, notion, image_assets });
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
