//! Client code for dranks.
//!
//! This crate provides the Notion API client, the drink catalog built on it,
//! cached wrappers around both, and startup cache warming.

pub mod cached;
pub mod drinks;
pub mod notion;
pub mod warm;

#[cfg(test)]
mod fixtures;

pub use cached::{DrinksClientCached, NotionClientCached};
pub use drinks::{Alcohol, Drink, DrinkBody, DrinkWithBody, DrinksAndMetainfo, DrinksClient, DrinksMetainfo};
pub use notion::{ImageAsset, ImageAssetOptions, NotionApi, NotionClient, NotionConfig, NotionError};
pub use warm::{WarmReport, spawn_warmup, warm_drinks_cache};
