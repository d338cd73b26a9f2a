//! Core types and shared functionality for dranks.
//!
//! This crate provides:
//! - Stale-tolerant, single-flight, in-memory LRU cache
//! - Deterministic cache keys for upstream operations
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheEvent, CacheKey, CacheObserver, CacheOptions, EntryState, Fetcher, StaleCache, TracingObserver};
pub use config::{AppConfig, ConfigError, Environment};
pub use error::Error;
