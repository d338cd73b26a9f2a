//! Startup cache warming.
//!
//! Loads the drink list and then every drink's detail through the cached
//! client, one after another, so the first real requests after start hit
//! warm caches. Best effort: failures are logged and counted.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use dranks_core::Error;

use crate::cached::DrinksClientCached;

/// Outcome of a warm-up pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmReport {
    /// Drinks in the list.
    pub drinks: usize,
    /// Drinks whose detail was loaded.
    pub warmed: usize,
    /// Ids whose detail could not be loaded.
    pub failed: Vec<String>,
}

/// Populate the list cache and the detail cache for every listed drink.
///
/// # Errors
///
/// Fails only if the list itself cannot be loaded.
pub async fn warm_drinks_cache(cached: &DrinksClientCached) -> Result<WarmReport, Error> {
    let catalog = cached.get_drinks_and_metainfo().await?;
    let mut report = WarmReport { drinks: catalog.drinks.len(), ..Default::default() };

    for drink in &catalog.drinks {
        match cached.get_drink_with_body(&drink.id).await {
            Ok(_) => report.warmed += 1,
            Err(e) => {
                tracing::warn!(drink_id = %drink.id, error = %e, "failed to warm drink");
                report.failed.push(drink.id.clone());
            }
        }
    }

    Ok(report)
}

/// Run [`warm_drinks_cache`] in the background.
///
/// Never fails: errors are logged. Nothing on the serving path awaits the
/// returned handle.
pub fn spawn_warmup(cached: Arc<DrinksClientCached>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now();
        tracing::info!("warming drinks cache");

        match warm_drinks_cache(&cached).await {
            Ok(report) => tracing::info!(
                drinks = report.drinks,
                warmed = report.warmed,
                failed = report.failed.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "drinks cache warmed"
            ),
            Err(e) => tracing::error!(error = %e, "failed to warm drinks cache"),
        }
    })
}
