//! # Shell Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SATCHEL_*`)
//! 2. Config file (`shell.toml`)
//! 3. Defaults (this file)
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! path = "/data/satchel.db"   # default: platform data directory
//! max_connections = 5
//!
//! [layout]
//! policy = "as_shipped"       # as_shipped | conventional
//!
//! [logging]
//! filter = "info,satchel=debug,sqlx=warn"
//! ```
//!
//! Configuration is read once at startup and never mutated afterwards.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use satchel_core::LayoutPolicy;
use satchel_store::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ShellError, ShellResult};

/// Environment variable pointing at the config file.
pub const CONFIG_PATH_ENV: &str = "SATCHEL_CONFIG";

/// Environment variable overriding the database path.
pub const DB_PATH_ENV: &str = "SATCHEL_DB_PATH";

/// Environment variable overriding the layout policy.
pub const LAYOUT_POLICY_ENV: &str = "SATCHEL_LAYOUT_POLICY";

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "info,satchel=debug,sqlx=warn";

/// Database file name inside the platform data directory.
const DATABASE_FILE: &str = "satchel.db";

/// Config file name inside the platform config directory.
const CONFIG_FILE: &str = "shell.toml";

/// Shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub store: StoreSection,
    pub layout: LayoutSection,
    pub logging: LoggingSection,
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Database file. `None` means the platform data directory.
    pub path: Option<PathBuf>,

    /// Maximum pool connections.
    pub max_connections: u32,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            path: None,
            max_connections: 5,
        }
    }
}

/// `[layout]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub policy: LayoutPolicy,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ShellConfig {
    /// Loads configuration: file (if present), then environment overrides.
    ///
    /// With `path == None` the file is looked up via `SATCHEL_CONFIG`, then
    /// the platform config directory. A missing file means defaults.
    pub fn load(path: Option<&Path>) -> ShellResult<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// [`load`](Self::load) with environment variables taken from `lookup`.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> ShellResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(&lookup),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => {
                info!(path = %p.display(), "Loading shell config");
                let contents = std::fs::read_to_string(p)?;
                Self::from_toml_str(&contents)?
            }
            _ => {
                debug!("No config file found, using defaults");
                ShellConfig::default()
            }
        };

        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml_str(contents: &str) -> ShellResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `SATCHEL_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ShellResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DB_PATH_ENV).filter(|p| !p.is_empty()) {
            self.store.path = Some(PathBuf::from(path));
        }

        if let Some(policy) = lookup(LAYOUT_POLICY_ENV) {
            self.layout.policy = policy.parse()?;
        }

        Ok(())
    }

    /// Rejects settings the store can't run with.
    pub fn validate(&self) -> ShellResult<()> {
        if self.store.max_connections == 0 {
            return Err(ShellError::config("store.max_connections must be at least 1"));
        }
        Ok(())
    }

    /// Resolves the database file path, creating its directory.
    ///
    /// ## Platform-Specific Defaults
    /// - **macOS**: `~/Library/Application Support/app.satchel.shell/satchel.db`
    /// - **Windows**: `%APPDATA%\satchel\shell\data\satchel.db`
    /// - **Linux**: `~/.local/share/shell/satchel.db`
    pub fn database_path(&self) -> ShellResult<PathBuf> {
        let path = match &self.store.path {
            Some(path) => path.clone(),
            None => project_dirs()
                .ok_or_else(|| ShellError::config("Could not determine app data directory"))?
                .data_dir()
                .join(DATABASE_FILE),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Ok(path)
    }

    /// Builds the device store configuration.
    pub fn store_config(&self) -> ShellResult<StoreConfig> {
        Ok(StoreConfig::new(self.database_path()?).max_connections(self.store.max_connections))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "satchel", "shell")
}

fn default_config_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = lookup(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(config.store.path, None);
        assert_eq!(config.layout.policy, LayoutPolicy::AsShipped);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ShellConfig::from_toml_str(
            r#"
            [layout]
            policy = "conventional"
            "#,
        )
        .unwrap();

        assert_eq!(config.layout.policy, LayoutPolicy::Conventional);
        assert_eq!(config.store.max_connections, 5);
    }

    #[test]
    fn test_parse_full_file() {
        let config = ShellConfig::from_toml_str(
            r#"
            [store]
            path = "/data/satchel.db"
            max_connections = 2

            [logging]
            filter = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.path, Some(PathBuf::from("/data/satchel.db")));
        assert_eq!(config.store.max_connections, 2);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_file_accepts_env_spellings() {
        let config = ShellConfig::from_toml_str("[layout]\npolicy = \"As-Shipped\"\n").unwrap();
        assert_eq!(config.layout.policy, LayoutPolicy::AsShipped);
    }

    #[test]
    fn test_bad_policy_in_file() {
        let err = ShellConfig::from_toml_str("[layout]\npolicy = \"sideways\"\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::Config);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ShellConfig::from_toml_str("[store]\npath = \"/from/file.db\"\n").unwrap();
        config
            .apply_overrides(env(&[
                (DB_PATH_ENV, "/from/env.db"),
                (LAYOUT_POLICY_ENV, "conventional"),
            ]))
            .unwrap();

        assert_eq!(config.store.path, Some(PathBuf::from("/from/env.db")));
        assert_eq!(config.layout.policy, LayoutPolicy::Conventional);
    }

    #[test]
    fn test_bad_policy_in_env() {
        let mut config = ShellConfig::default();
        let err = config
            .apply_overrides(env(&[(LAYOUT_POLICY_ENV, "nope")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Config);
    }

    #[test]
    fn test_zero_connections_rejected() {
        let mut config = ShellConfig::default();
        config.store.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let missing = std::env::temp_dir().join("satchel-definitely-missing-config.toml");
        let config = ShellConfig::load_with(Some(&missing), env(&[])).unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_load_reads_file_then_env() {
        let dir = std::env::temp_dir().join(format!("satchel-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join(CONFIG_FILE);
        std::fs::write(&file, "[store]\nmax_connections = 3\n").unwrap();

        let config = ShellConfig::load_with(
            None,
            env(&[
                (CONFIG_PATH_ENV, file.to_str().unwrap()),
                (LAYOUT_POLICY_ENV, "conventional"),
            ]),
        )
        .unwrap();

        assert_eq!(config.store.max_connections, 3);
        assert_eq!(config.layout.policy, LayoutPolicy::Conventional);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_explicit_database_path() {
        let dir = std::env::temp_dir().join(format!("satchel-config-{}", std::process::id()));
        let mut config = ShellConfig::default();
        config.store.path = Some(dir.join("nested").join("satchel.db"));

        let path = config.database_path().unwrap();
        assert!(path.parent().unwrap().is_dir());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
