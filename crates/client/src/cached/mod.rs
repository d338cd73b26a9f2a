//! Per-source wrappers that put upstream reads behind [`StaleCache`]s.
//!
//! A wrapper only turns each call into a [`CacheKey`] and delegates to the
//! cache of that operation; the fetcher decodes the key back into arguments.
//!
//! [`StaleCache`]: dranks_core::cache::StaleCache
//! [`CacheKey`]: dranks_core::cache::CacheKey

pub mod drinks;
pub mod notion;

pub use drinks::DrinksClientCached;
pub use notion::NotionClientCached;
