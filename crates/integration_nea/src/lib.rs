//! NEA real-time weather integration
//!
//! Client for the data.gov.sg real-time weather API
//! (<https://api-open.data.gov.sg/v2/real-time/api>).
//! Covers the two-hour forecast, station readings, lightning and WBGT endpoints.
//! No API key is required.

pub mod client;
mod models;

pub use client::{NeaClient, NeaConfig, NeaError, NeaHttpClient};
