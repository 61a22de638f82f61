//! Cache implementations
//!
//! `MokaCache` is an in-memory cache with per-entry TTL, used to hold
//! upstream responses for a short while.

mod moka_cache;

pub use moka_cache::{MokaCache, MokaCacheConfig};
