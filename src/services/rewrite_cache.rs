// Rewrite Cache
// Paragraph text -> accepted rewrite, persisted as a JSON object

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_CACHE_FILE: &str = "humanizer_cache.json";

/// Key-value store of previously accepted rewrites.
///
/// Loading and persisting never fail the caller: a missing or corrupt file
/// yields an empty cache, and a failed write leaves the in-memory entries
/// valid for the rest of the process.
#[derive(Debug, Default)]
pub struct RewriteCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl RewriteCache {
    /// Load the cache backed by `path`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        info!(path = %path.display(), entries = entries.len(), "rewrite_cache.loaded");
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Cache without durable storage; `persist` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-match lookup, no normalization of the key.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or overwrite an entry.
    pub fn store(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Write every entry back to the backing file.
    ///
    /// Returns whether the write went through; failures are only logged.
    pub fn persist(&self) -> bool {
        let Some(path) = self.path.as_deref() else {
            return true;
        };

        match write_entries(path, &self.entries) {
            Ok(()) => {
                debug!(path = %path.display(), entries = self.entries.len(), "rewrite_cache.persisted");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rewrite_cache.persist_failed");
                false
            }
        }
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        debug!(path = %path.display(), "rewrite_cache.missing_file");
        return BTreeMap::new();
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rewrite_cache.read_failed");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rewrite_cache.parse_failed");
            BTreeMap::new()
        }
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create cache dir: {}", e))?;
    }

    let content = serde_json::to_string_pretty(entries)
        .map_err(|e| format!("Failed to serialize cache: {}", e))?;

    fs::write(path, content).map_err(|e| format!("Failed to write cache: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RewriteCache::load(dir.path().join("yok.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ bozuk json").unwrap();
        let cache = RewriteCache::load(&path);
        assert!(cache.is_empty());

        fs::write(&path, r#"["dizi", "değil"]"#).unwrap();
        assert!(RewriteCache::load(&path).is_empty());
    }

    #[test]
    fn test_store_overwrites_and_lookup_is_exact() {
        let mut cache = RewriteCache::in_memory();
        cache.store("Merhaba dünya.", "ilk");
        cache.store("Merhaba dünya.", "ikinci");
        assert_eq!(cache.lookup("Merhaba dünya."), Some("ikinci"));
        assert_eq!(cache.lookup("merhaba dünya."), None);
        assert_eq!(cache.lookup("Merhaba dünya. "), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_persist_then_load_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = RewriteCache::load(&path);
        cache.store("Ürün çok iyi.", "  Ürün gerçekten iyi.");
        assert!(cache.persist());

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Ürün çok iyi."));

        let reloaded = RewriteCache::load(&path);
        assert_eq!(reloaded.lookup("Ürün çok iyi."), Some("  Ürün gerçekten iyi."));
    }

    #[test]
    fn test_persist_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file makes the write fail.
        let path = dir.path().join("cache.json");
        fs::create_dir_all(&path).unwrap();

        let mut cache = RewriteCache::load(&path);
        cache.store("a", "b");
        assert!(!cache.persist());
        assert_eq!(cache.lookup("a"), Some("b"));
    }

    #[test]
    fn test_in_memory_persist_is_noop() {
        let mut cache = RewriteCache::in_memory();
        cache.store("x", "y");
        assert!(cache.persist());
        assert!(cache.path().is_none());
    }
}
