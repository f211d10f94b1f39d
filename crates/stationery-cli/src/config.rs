//! Configuration for the `stationery` CLI.
//!
//! Provides the [`StationeryConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `STATIONERY_CONFIG` environment variable
//! 3. XDG default: `~/.config/stationery/config.toml`
//! 4. Built-in defaults
//!
//! Values from the file are then overlaid with `STATIONERY_*` environment
//! variables, e.g. `STATIONERY_SESSION_EMAIL` or `STATIONERY_DATA_PATH`.

use confyg::{Confygery, env};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use stationery_core::traits::ConfigProvider;
use stationery_core::{Error, Result};
use stationery_crm::DEFAULT_DEMO_PASSWORD;

/// Account the CLI acts as when neither `--as` nor the config names one.
pub const DEFAULT_SESSION_EMAIL: &str = "admin@company.com";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationeryConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Base directory for relative data paths.
    pub base_path: Option<String>,

    /// Dataset configuration.
    pub data: DataConfig,

    /// Login defaults.
    pub session: SessionConfig,
}

/// Where the CRM's records come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON dataset file; the bundled demo data is used when unset.
    pub path: Option<String>,
}

/// Login defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Account to act as.
    pub email: String,

    /// Password accepted for accounts without their own.
    pub demo_password: String,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for StationeryConfig {
    fn default() -> Self {
        Self {
            project_name: "stationery".to_string(),
            base_path: None,
            data: DataConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            email: DEFAULT_SESSION_EMAIL.to_string(),
            demo_password: DEFAULT_DEMO_PASSWORD.to_string(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl StationeryConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("STATIONERY");
        env_opts.add_section("data");
        env_opts.add_section("session");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("STATIONERY_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stationery").join("config.toml"))
    }

    /// The configured dataset file, resolved against the base path.
    ///
    /// `None` means the bundled demo data.
    pub fn dataset_path(&self) -> Result<Option<PathBuf>> {
        match self.data.path.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(p) => self.data_path(p).map(Some),
        }
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `STATIONERY_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "STATIONERY", &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for StationeryConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    /// Absolute names are returned as is; relative ones sit under the base path.
    fn data_path(&self, name: &str) -> Result<PathBuf> {
        let path = PathBuf::from(name);
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(self.base_path()?.join(path))
        }
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    /// Serializes tests that touch process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// RAII guard for env var manipulation in tests.
    pub(crate) struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        pub(crate) fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: callers hold `env_lock()`.
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        pub(crate) fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: callers hold `env_lock()`.
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: the guard is dropped while `env_lock()` is still held.
            unsafe {
                match self.prev {
                    Some(ref val) => std::env::set_var(&self.key, val),
                    None => std::env::remove_var(&self.key),
                }
            }
        }
    }

    #[test]
    fn test_stationery_config_default() {
        let config = StationeryConfig::default();
        assert_eq!(config.project_name, "stationery");
        assert!(config.base_path.is_none());
        assert!(config.data.path.is_none());
        assert_eq!(config.session.email, "admin@company.com");
        assert_eq!(config.session.demo_password, "password123");
    }

    #[test]
    fn test_stationery_config_from_toml() {
        let toml_str = r#"
            project_name = "north-branch"
            base_path = "/srv/stationery"

            [data]
            path = "tenants.json"

            [session]
            email = "manager@company.com"
        "#;

        let config: StationeryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_name, "north-branch");
        assert_eq!(config.data.path.as_deref(), Some("tenants.json"));
        assert_eq!(config.session.email, "manager@company.com");
        assert_eq!(config.session.demo_password, "password123");
        assert_eq!(
            config.dataset_path().unwrap(),
            Some(PathBuf::from("/srv/stationery/tenants.json"))
        );
    }

    #[test]
    fn test_stationery_config_to_toml_round_trip() {
        let config = StationeryConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("project_name = \"stationery\""));
        assert!(toml_str.contains("[session]"));

        let parsed: StationeryConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_stationery_config_load_from_file() {
        let _lock = env_lock();
        let _email = EnvGuard::remove("STATIONERY_SESSION_EMAIL");
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "loaded"
                [session]
                email = "user@company.com"
            "#,
        )
        .unwrap();

        let config = StationeryConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.project_name, "loaded");
        assert_eq!(config.session.email, "user@company.com");
    }

    #[test]
    fn test_stationery_config_load_defaults() {
        let _lock = env_lock();
        let _email = EnvGuard::remove("STATIONERY_SESSION_EMAIL");
        let config = StationeryConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.project_name, "stationery");
        assert_eq!(config.session.email, DEFAULT_SESSION_EMAIL);
    }

    #[test]
    fn test_stationery_config_load_env_overlay() {
        let _lock = env_lock();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                [session]
                email = "admin@company.com"
            "#,
        )
        .unwrap();

        let _guard = EnvGuard::new("STATIONERY_SESSION_EMAIL", "manager@company.com");
        let config = StationeryConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.session.email, "manager@company.com");
    }

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = StationeryConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_env() {
        let _lock = env_lock();
        let _guard = EnvGuard::new("STATIONERY_CONFIG", "/env/config.toml");
        let path = StationeryConfig::resolve_config_path(None);
        assert_eq!(path, Some(PathBuf::from("/env/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_default() {
        let _lock = env_lock();
        let _guard = EnvGuard::remove("STATIONERY_CONFIG");
        if let Some(p) = StationeryConfig::resolve_config_path(None) {
            let s = p.to_string_lossy();
            assert!(s.contains("stationery"));
            assert!(s.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_config_provider_paths() {
        let config = StationeryConfig {
            base_path: Some("/project".into()),
            ..Default::default()
        };
        assert_eq!(config.base_path().unwrap(), PathBuf::from("/project"));
        assert_eq!(
            config.data_path("export.json").unwrap(),
            PathBuf::from("/project/export.json")
        );
        assert_eq!(
            config.data_path("/abs/export.json").unwrap(),
            PathBuf::from("/abs/export.json")
        );
    }

    #[test]
    fn test_config_provider_base_path_default() {
        let config = StationeryConfig::default();
        assert_eq!(config.base_path().unwrap(), std::env::current_dir().unwrap());
    }

    #[test]
    fn test_dataset_path_unset_or_blank() {
        let mut config = StationeryConfig::default();
        assert_eq!(config.dataset_path().unwrap(), None);
        config.data.path = Some("  ".into());
        assert_eq!(config.dataset_path().unwrap(), None);
    }

    #[test]
    fn test_stationery_config_to_env_vars() {
        let config = StationeryConfig::default();
        let vars = config.to_env_vars().unwrap();
        let map: HashMap<_, _> = vars.into_iter().collect();
        assert_eq!(map.get("STATIONERY_PROJECT_NAME").unwrap(), "stationery");
        assert_eq!(
            map.get("STATIONERY_SESSION_EMAIL").unwrap(),
            "admin@company.com"
        );
        assert_eq!(
            map.get("STATIONERY_SESSION_DEMO_PASSWORD").unwrap(),
            "password123"
        );
    }

    #[test]
    fn test_stationery_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StationeryConfig>();
    }
}
