//! Statistic definition registry.
//!
//! A statistic is a named SQL template. Definitions come from a
//! [`DefinitionSource`] (normally a directory of `*.sql` files, the file stem
//! being the statistic name) and are published as immutable
//! [`StatsRegistry`] snapshots. A reload builds a complete snapshot and then
//! swaps it in, so readers see either the old set or the new one. A reload
//! that cannot read its source publishes nothing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use geostats_common::{GeoStatsError, GeoStatsResult};

/// A definition document as read from its source, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition {
    pub name: String,
    pub content: String,
}

impl RawDefinition {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Where statistic definitions are read from.
pub trait DefinitionSource: Send + Sync {
    fn load(&self) -> GeoStatsResult<Vec<RawDefinition>>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Reads `*.sql` files from a directory. Subdirectories are ignored.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DefinitionSource for DirectorySource {
    fn load(&self) -> GeoStatsResult<Vec<RawDefinition>> {
        if !self.dir.exists() {
            return Err(GeoStatsError::RegistryLoadFailure(format!(
                "Stats directory {} does not exist",
                self.dir.display()
            )));
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            GeoStatsError::RegistryLoadFailure(format!(
                "Failed to read directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut definitions = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| GeoStatsError::RegistryLoadFailure(e.to_string()))?
                .path();

            if !path.is_file() || path.extension().map_or(true, |ext| ext != "sql") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("Skipping stats file with non UTF-8 name: {:?}", path);
                continue;
            };

            let content = std::fs::read_to_string(&path).map_err(|e| {
                GeoStatsError::RegistryLoadFailure(format!("Failed to read {:?}: {}", path, e))
            })?;
            definitions.push(RawDefinition::new(name, content));
        }

        Ok(definitions)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Definitions held in memory. Contents can be replaced between reloads.
#[derive(Debug, Default)]
pub struct StaticSource {
    definitions: std::sync::RwLock<Vec<RawDefinition>>,
}

impl StaticSource {
    pub fn new<N, Q>(definitions: impl IntoIterator<Item = (N, Q)>) -> Self
    where
        N: Into<String>,
        Q: Into<String>,
    {
        let source = Self::default();
        source.replace(definitions);
        source
    }

    /// Replace the definitions returned by the next load.
    pub fn replace<N, Q>(&self, definitions: impl IntoIterator<Item = (N, Q)>)
    where
        N: Into<String>,
        Q: Into<String>,
    {
        let definitions = definitions
            .into_iter()
            .map(|(name, query)| RawDefinition::new(name, query))
            .collect();
        let mut guard = self
            .definitions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = definitions;
    }
}

impl DefinitionSource for StaticSource {
    fn load(&self) -> GeoStatsResult<Vec<RawDefinition>> {
        let guard = self
            .definitions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// Strip `--` comments through end of line and collapse whitespace runs.
///
/// Comment markers inside string literals are not recognised and are
/// stripped like any other.
pub fn clean_query(raw: &str) -> String {
    let mut without_comments = String::with_capacity(raw.len());
    for line in raw.lines() {
        let code = match line.find("--") {
            Some(idx) => &line[..idx],
            None => line,
        };
        without_comments.push_str(code);
        without_comments.push(' ');
    }

    without_comments.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An immutable set of statistic definitions, ordered by name.
#[derive(Debug, Clone)]
pub struct StatsRegistry {
    version: u64,
    loaded_at: DateTime<Utc>,
    definitions: BTreeMap<String, String>,
}

impl StatsRegistry {
    /// A registry with no definitions.
    pub fn empty(version: u64) -> Self {
        Self {
            version,
            loaded_at: Utc::now(),
            definitions: BTreeMap::new(),
        }
    }

    /// Clean every document and keep the non-empty ones.
    pub fn from_definitions(version: u64, raw: impl IntoIterator<Item = RawDefinition>) -> Self {
        let mut registry = Self::empty(version);
        for def in raw {
            if def.content.trim().is_empty() {
                debug!(statistic = %def.name, "Skipping empty definition");
                continue;
            }
            let query = clean_query(&def.content);
            if query.is_empty() {
                debug!(statistic = %def.name, "Skipping definition with only comments");
                continue;
            }
            registry.definitions.insert(def.name, query);
        }
        registry
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(String::as_str)
    }

    /// `(name, query)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.definitions
            .iter()
            .map(|(name, query)| (name.as_str(), query.as_str()))
    }

    pub fn names(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }
}

/// Holds the current registry snapshot and reloads it from its source.
pub struct RegistryHandle {
    source: Arc<dyn DefinitionSource>,
    current: RwLock<Arc<StatsRegistry>>,
    versions: AtomicU64,
}

impl RegistryHandle {
    /// Create a handle with an empty registry. Nothing is read until `reload`.
    pub fn new(source: Arc<dyn DefinitionSource>) -> Self {
        Self {
            source,
            current: RwLock::new(Arc::new(StatsRegistry::empty(0))),
            versions: AtomicU64::new(0),
        }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(DirectorySource::new(dir)))
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<StatsRegistry> {
        Arc::clone(&*self.current.read().await)
    }

    /// Rebuild the registry from its source and publish it.
    ///
    /// When the source is absent or unreadable the current snapshot stays in
    /// place and is returned. Before any successful load that is the empty
    /// registry.
    pub async fn reload(&self) -> Arc<StatsRegistry> {
        let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
        let source = Arc::clone(&self.source);

        let loaded = tokio::task::spawn_blocking(move || source.load())
            .await
            .map_err(|e| GeoStatsError::RegistryLoadFailure(e.to_string()))
            .and_then(|result| result);

        let definitions = match loaded {
            Ok(definitions) => definitions,
            Err(e) => {
                let current = self.snapshot().await;
                warn!(
                    source = %self.source.describe(),
                    error = %e,
                    kept_version = current.version,
                    statistics = current.len(),
                    "Statistic definitions unavailable, keeping current registry"
                );
                return current;
            }
        };

        let registry = Arc::new(StatsRegistry::from_definitions(version, definitions));

        {
            let mut current = self.current.write().await;
            // A slower concurrent reload must not replace a newer snapshot.
            if registry.version > current.version {
                *current = Arc::clone(&registry);
            }
        }

        counter!("geostats_registry_reloads_total").increment(1);
        info!(
            version = registry.version,
            statistics = registry.len(),
            source = %self.source.describe(),
            "Loaded statistic definitions"
        );

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_query_strips_comments_and_whitespace() {
        let raw = "-- header\nSELECT count(*)   -- trailing\n\tFROM  schools\n\nWHERE x = :lat;\n";
        assert_eq!(clean_query(raw), "SELECT count(*) FROM schools WHERE x = :lat;");
    }

    #[test]
    fn test_clean_query_only_comments_is_empty() {
        assert_eq!(clean_query("-- one\n   -- two\n"), "");
    }

    #[test]
    fn test_from_definitions_skips_empty_documents() {
        let registry = StatsRegistry::from_definitions(
            1,
            vec![
                RawDefinition::new("school_count", "SELECT 1"),
                RawDefinition::new("blank", "  \n\t"),
                RawDefinition::new("commented", "-- nothing here"),
            ],
        );
        assert_eq!(registry.names(), vec!["school_count".to_string()]);
        assert_eq!(registry.get("school_count"), Some("SELECT 1"));
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn test_iteration_is_in_name_order() {
        let registry = StatsRegistry::from_definitions(
            1,
            vec![
                RawDefinition::new("zeta", "SELECT 3"),
                RawDefinition::new("alpha", "SELECT 1"),
                RawDefinition::new("mid", "SELECT 2"),
            ],
        );
        let names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_handle_starts_empty_and_reload_swaps() {
        let source = Arc::new(StaticSource::new([("a", "SELECT 1"), ("b", "SELECT 2")]));
        let handle = RegistryHandle::new(source.clone());
        assert!(handle.snapshot().await.is_empty());

        let first = handle.reload().await;
        assert_eq!(first.len(), 2);

        source.replace([("c", "SELECT 3")]);
        let second = handle.reload().await;
        assert_eq!(second.names(), vec!["c".to_string()]);
        assert!(second.version() > first.version());

        // Earlier snapshots are unaffected by the swap.
        assert_eq!(first.len(), 2);
        assert_eq!(handle.snapshot().await.names(), vec!["c".to_string()]);
    }

    /// Succeeds once, then fails every later load.
    struct FlakySource {
        loads: AtomicU64,
    }

    impl DefinitionSource for FlakySource {
        fn load(&self) -> GeoStatsResult<Vec<RawDefinition>> {
            if self.loads.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![RawDefinition::new("school_count", "SELECT 1")])
            } else {
                Err(GeoStatsError::RegistryLoadFailure("volume unmounted".into()))
            }
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_current_snapshot() {
        let handle = RegistryHandle::new(Arc::new(FlakySource {
            loads: AtomicU64::new(0),
        }));

        let loaded = handle.reload().await;
        assert_eq!(loaded.names(), vec!["school_count".to_string()]);

        let after_failure = handle.reload().await;
        assert!(Arc::ptr_eq(&loaded, &after_failure));
        assert_eq!(handle.snapshot().await.version(), loaded.version());
    }

    #[test]
    fn test_missing_directory_is_a_load_failure() {
        let source = DirectorySource::new("/nonexistent/geostats/stats");
        assert!(matches!(
            source.load(),
            Err(GeoStatsError::RegistryLoadFailure(_))
        ));
    }
}
