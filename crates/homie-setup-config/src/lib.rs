//! Shared configuration for homie-setup.
//!
//! TOML settings with named device profiles, loaded through figment
//! (defaults, file, `HOMIE_SETUP_*` environment), translation to
//! `homie_setup_api::ConnectionOptions`, and the JSON answer store the
//! wizard uses to remember previous input.

mod store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use homie_setup_api::ConnectionOptions;
use homie_setup_api::transport::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

pub use store::AnswerStore;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("answer store is corrupt: {0}")]
    Store(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Device profile used when `--device` is not given.
    pub default_device: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_device: Some("default".into()),
            defaults: Defaults::default(),
            devices: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            output: default_output(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(2000)
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_output() -> String {
    "table".into()
}

/// A named device.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Device address (`192.168.123.1`, `homie.local`, `http://...`).
    pub url: String,

    /// Override request timeout in milliseconds.
    pub timeout_ms: Option<u64>,

    /// Override user agent.
    pub user_agent: Option<String>,

    /// Upstream HTTP proxy.
    pub proxy: Option<String>,
}

// ── Paths ───────────────────────────────────────────────────────────

/// Directory holding `config.toml` and `answers.json`.
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("org", "homie-setup", "homie-setup").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("homie-setup");
            p
        },
        |dirs| dirs.config_dir().to_path_buf(),
    )
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn answers_path() -> PathBuf {
    config_dir().join("answers.json")
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOMIE_SETUP_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable config");
        Config::default()
    })
}

/// Serialize config to TOML at the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Build `ConnectionOptions` from a profile, falling back to `defaults`.
pub fn profile_to_connection_options(
    profile: &DeviceProfile,
    defaults: &Defaults,
) -> Result<ConnectionOptions, ConfigError> {
    let options = ConnectionOptions::new(&profile.url).map_err(|e| ConfigError::Validation {
        field: "url".into(),
        reason: e.to_string(),
    })?;

    let timeout = profile.timeout_ms.unwrap_or(defaults.timeout_ms);
    let user_agent = profile
        .user_agent
        .clone()
        .unwrap_or_else(|| defaults.user_agent.clone());

    let options = options
        .with_timeout(Duration::from_millis(timeout))
        .with_user_agent(user_agent);

    Ok(match profile.proxy {
        Some(ref proxy) => options.with_proxy(proxy.clone()),
        None => options,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(cfg.default_device.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout_ms, 2000);
        assert!(cfg.devices.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.devices.insert(
            "kitchen".into(),
            DeviceProfile {
                url: "192.168.123.1".into(),
                timeout_ms: Some(5000),
                ..DeviceProfile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let kitchen = &loaded.devices["kitchen"];
        assert_eq!(kitchen.url, "192.168.123.1");
        assert_eq!(kitchen.timeout_ms, Some(5000));
        assert_eq!(kitchen.proxy, None);
    }

    #[test]
    fn profile_overrides_defaults() {
        let defaults = Defaults::default();
        let profile = DeviceProfile {
            url: "10.0.0.7".into(),
            timeout_ms: Some(750),
            user_agent: None,
            proxy: Some("http://proxy:3128".into()),
        };

        let options = profile_to_connection_options(&profile, &defaults).unwrap();

        assert_eq!(options.base_url.as_str(), "http://10.0.0.7/");
        assert_eq!(options.timeout, Duration::from_millis(750));
        assert_eq!(options.user_agent, defaults.user_agent);
        assert_eq!(options.proxy.as_deref(), Some("http://proxy:3128"));
    }

    #[test]
    fn tls_profile_is_rejected() {
        let profile = DeviceProfile {
            url: "https://device".into(),
            ..DeviceProfile::default()
        };
        let result = profile_to_connection_options(&profile, &Defaults::default());
        assert!(matches!(result, Err(ConfigError::Validation { ref field, .. }) if field == "url"));
    }
}
