//! Geohash-keyed statistics engine.
//!
//! Ties together the statistic registry, a cache store and a spatial source:
//! - [`RegistryHandle`] loads named SQL templates and swaps snapshots on reload
//! - [`StatsService`] serves cells from the cache or computes and stores them
//! - [`StatsConfig`] reads service settings from the environment

pub mod bootstrap;
pub mod config;
pub mod registry;
pub mod service;
pub mod single_flight;

pub use bootstrap::build_service;
pub use config::{CacheBackend, StatsConfig};
pub use registry::{
    clean_query, DefinitionSource, DirectorySource, RawDefinition, RegistryHandle, StaticSource,
    StatsRegistry,
};
pub use service::{CellStatsResponse, ClearReport, ServiceOptions, StatsService};
pub use single_flight::KeyLocks;
