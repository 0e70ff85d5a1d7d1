// Configuration Storage Service
// Handles config file read/write, version backup and environment overrides

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::detection::{DEFAULT_AI_THRESHOLD, DEFAULT_MIN_PARAGRAPH_CHARS};
use super::humanizer::DEFAULT_MAX_INPUT_CHARS;
use super::rewrite_cache::DEFAULT_CACHE_FILE;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const BACKUPS_TO_KEEP: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub humanizer: HumanizerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            provider: ProviderConfig::default(),
            humanizer: HumanizerConfig::default(),
            detection: DetectionConfig::default(),
            api_keys: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizerConfig {
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for HumanizerConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default = "default_ai_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: default_ai_threshold(),
            min_paragraph_chars: default_min_paragraph_chars(),
        }
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5001 }
fn default_cache_path() -> String { DEFAULT_CACHE_FILE.to_string() }
fn default_provider_url() -> String { DEFAULT_PROVIDER_URL.to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_timeout_secs() -> u64 { 80 }
fn default_max_input_chars() -> usize { DEFAULT_MAX_INPUT_CHARS }
fn default_temperature() -> f64 { 0.7 }
fn default_ai_threshold() -> f64 { DEFAULT_AI_THRESHOLD }
fn default_min_paragraph_chars() -> usize { DEFAULT_MIN_PARAGRAPH_CHARS }

impl AppConfig {
    /// Copy safe to print: every API key reduced to its last four characters.
    pub fn redacted(&self) -> AppConfig {
        let mut copy = self.clone();
        for key in copy.api_keys.values_mut() {
            let skip = key.chars().count().saturating_sub(4);
            let tail: String = key.chars().skip(skip).collect();
            *key = format!("****{}", tail);
        }
        copy
    }

    /// Apply `HUMANIZER_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get("HUMANIZER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("HUMANIZER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(path) = get("HUMANIZER_CACHE_FILE") {
            self.cache.path = path;
        }
        if let Some(url) = get("HUMANIZER_PROVIDER_URL") {
            self.provider.base_url = url;
        }
        if let Some(model) = get("HUMANIZER_MODEL") {
            self.provider.model = model;
        }
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("humanizer"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let mut backup_file = backup_dir.join(format!("config_{}.json", timestamp));
        let mut n = 1;
        while backup_file.exists() {
            backup_file = backup_dir.join(format!("config_{}_{}.json", timestamp, n));
            n += 1;
        }

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        self.cleanup_old_backups(&backup_dir, BACKUPS_TO_KEEP)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; the timestamped names break ties on coarse mtimes.
        entries.sort_by_key(|e| {
            (
                e.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                e.file_name(),
            )
        });

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Get provider API key from config file
    pub fn get_api_key(&self, provider: &str) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.api_keys.get(provider).cloned())
    }

    /// Store provider API key in config file
    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), String> {
        let key = key.trim();
        if key.is_empty() {
            return Err("API key must not be empty".to_string());
        }
        let mut config = self.load()?;
        config.api_keys.insert(provider.to_string(), key.to_string());
        self.save(&config)
    }

    /// Delete provider API key from config file
    pub fn delete_api_key(&self, provider: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.remove(provider);
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.cache.path, "humanizer_cache.json");
        assert_eq!(config.humanizer.max_input_chars, DEFAULT_MAX_INPUT_CHARS);
        assert!((config.detection.threshold - 0.65).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"server": {"port": 8080}, "provider": {"model": "gpt-4o-mini"}}"#).unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.provider.model, "gpt-4o-mini");
        assert_eq!(parsed.provider.base_url, DEFAULT_PROVIDER_URL);
        assert_eq!(parsed.detection.min_paragraph_chars, 20);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|name| match name {
            "HUMANIZER_PORT" => Some("9090".to_string()),
            "HUMANIZER_CACHE_FILE" => Some("/tmp/cache.json".to_string()),
            "HUMANIZER_MODEL" => Some("   ".to_string()),
            "HUMANIZER_HOST" => Some("sayı-değil".to_string()),
            _ => None,
        });
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "sayı-değil");
        assert_eq!(config.cache.path, "/tmp/cache.json");
        assert_eq!(config.provider.model, DEFAULT_MODEL);

        config.apply_overrides(|name| (name == "HUMANIZER_PORT").then(|| "abc".to_string()));
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_save_load_and_api_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("humanizer"));

        assert!(store.load().unwrap().api_keys.is_empty());

        store.set_api_key("openai", "sk-test").unwrap();
        assert_eq!(store.get_api_key("openai").unwrap(), Some("sk-test".to_string()));

        store.delete_api_key("openai").unwrap();
        assert_eq!(store.get_api_key("openai").unwrap(), None);

        let backups = fs::read_dir(dir.path().join("humanizer").join("backups")).unwrap().count();
        assert!(backups >= 1);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        fs::write(store.config_file(), "not json").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        assert!(store.set_api_key("openai", "   ").is_err());
        assert!(!store.config_file().exists());

        store.set_api_key("openai", "  sk-pad  ").unwrap();
        assert_eq!(store.get_api_key("openai").unwrap(), Some("sk-pad".to_string()));
    }

    #[test]
    fn test_backups_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        for i in 0..BACKUPS_TO_KEEP + 3 {
            store.set_api_key("openai", &format!("sk-{}", i)).unwrap();
        }
        let backups = fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert_eq!(backups, BACKUPS_TO_KEEP);
        assert_eq!(
            store.get_api_key("openai").unwrap(),
            Some(format!("sk-{}", BACKUPS_TO_KEEP + 2))
        );
    }

    #[test]
    fn test_redacted_hides_keys() {
        let mut config = AppConfig::default();
        config.api_keys.insert("openai".to_string(), "sk-abcdef1234".to_string());
        config.api_keys.insert("kısa".to_string(), "ab".to_string());
        let shown = config.redacted();
        assert_eq!(shown.api_keys["openai"], "****1234");
        assert_eq!(shown.api_keys["kısa"], "****ab");
        assert_eq!(config.api_keys["openai"], "sk-abcdef1234");
    }
}
