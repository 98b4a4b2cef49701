//! skystats - ADS-B receiver statistics
//!
//! Collects aircraft sightings from a readsb/ultrafeeder receiver, classifies
//! them by registration country and operating airline, and serves windowed
//! aggregates over HTTP.

pub mod actions;
pub mod aggregation;
pub mod airlines;
pub mod callsign;
pub mod collector;
pub mod config;
pub mod countries;
pub mod db;
pub mod etag;
pub mod logging;
pub mod metrics;
pub mod schema;
pub mod sightings;
pub mod sightings_repo;
pub mod stats;
pub mod stats_cache;
pub mod stats_service;
pub mod time_range;
pub mod web;

pub use countries::{CountryInfo, HexRangeClassifier};
pub use sightings_repo::{InMemorySightingStore, SightingStore, SightingsRepository};
pub use stats_cache::StatsCache;
pub use stats_service::{AggregationError, StatsService};
