//! Storage abstractions for geostats services.
//!
//! Provides unified interfaces for:
//! - The per-geohash stats cache (PostgreSQL, Redis or in-memory)
//! - The spatial data source statistic queries run against (PostGIS)

pub mod memory_store;
pub mod pg_store;
pub mod redis_store;
pub mod spatial;
pub mod store;

pub use memory_store::MemoryStatsStore;
pub use pg_store::{connect_pool, PgStatsStore, PoolSettings};
pub use redis_store::RedisStatsStore;
pub use spatial::{PostgisSource, PreparedQuery, SpatialSource};
pub use store::StatsStore;
