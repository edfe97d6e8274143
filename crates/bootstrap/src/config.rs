//! Data layer configuration and its environment loader.
use std::env;
use std::path::PathBuf;

use crate::dirs;

/// Which backend holds the local records.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StoreKind {
    Memory,
    #[default]
    File,
}

/// Everything needed to assemble a [`huddle_runtime::Huddle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuddleConfig {
    pub store: StoreKind,
    pub data_dir: PathBuf,
    /// Directory of a file-backed remote mirror. Enables sync when set.
    pub remote_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for HuddleConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            data_dir: dirs::data_dir(),
            remote_dir: None,
            log_dir: None,
            log_level: "info".to_owned(),
        }
    }
}

impl HuddleConfig {
    /// In-memory configuration, handy for tests and demos.
    pub fn in_memory() -> Self {
        Self {
            store: StoreKind::Memory,
            ..Self::default()
        }
    }

    /// Load `.env` if present, then read the process environment.
    pub fn load() -> Self {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `HUDDLE_STORE` - `memory` or `file` (default: file)
    /// - `HUDDLE_DATA_DIR` - Data directory (default: platform-specific)
    /// - `HUDDLE_REMOTE_DIR` - Remote mirror directory (default: none)
    /// - `HUDDLE_LOG_DIR` - Log file directory (default: stderr only)
    /// - `HUDDLE_LOG_LEVEL` - Default log filter (default: info)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(store) = read_var::<StoreKind>(&lookup, "HUDDLE_STORE") {
            config.store = store;
        }

        if let Some(dir) = read_path(&lookup, "HUDDLE_DATA_DIR") {
            config.data_dir = dir;
        }

        config.remote_dir = read_path(&lookup, "HUDDLE_REMOTE_DIR");
        config.log_dir = read_path(&lookup, "HUDDLE_LOG_DIR");

        if let Some(level) = lookup("HUDDLE_LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            config.log_level = level.trim().to_owned();
        }

        config
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unrecognized {}={:?}", key, raw);
            None
        }
    }
}

fn read_path(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<PathBuf> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HuddleConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HuddleConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config(&[]);
        assert_eq!(config.store, StoreKind::File);
        assert_eq!(config.data_dir, dirs::data_dir());
        assert!(config.remote_dir.is_none());
        assert!(config.log_dir.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("HUDDLE_STORE", "Memory"),
            ("HUDDLE_DATA_DIR", "/srv/huddle"),
            ("HUDDLE_REMOTE_DIR", "/mnt/shared/huddle"),
            ("HUDDLE_LOG_DIR", "/var/log/huddle"),
            ("HUDDLE_LOG_LEVEL", "huddle_runtime=debug"),
        ]);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.data_dir, PathBuf::from("/srv/huddle"));
        assert_eq!(config.remote_dir, Some(PathBuf::from("/mnt/shared/huddle")));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/huddle")));
        assert_eq!(config.log_level, "huddle_runtime=debug");
    }

    #[test]
    fn unknown_store_kind_keeps_default() {
        let config = config(&[("HUDDLE_STORE", "postgres"), ("HUDDLE_REMOTE_DIR", " ")]);
        assert_eq!(config.store, StoreKind::File);
        assert!(config.remote_dir.is_none());
    }
}
