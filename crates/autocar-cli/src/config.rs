//! Configuration vault – reads/writes `~/.autocar/config.toml`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use autocar_middleware::DEFAULT_PORT;
use autocar_types::{AutocarError, SessionEndPolicy, VehicleConfig};
use serde::{Deserialize, Serialize};

/// Persisted operator configuration stored in `~/.autocar/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address the joystick listener binds (all interfaces by default).
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Thresholds and timings for the control loop.
    #[serde(default)]
    pub vehicle: VehicleConfig,
}

fn default_listen_addr() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            vehicle: VehicleConfig::default(),
        }
    }
}

impl Config {
    /// Check every value and resolve the listen address.
    pub fn validate(&self) -> Result<SocketAddr, AutocarError> {
        self.vehicle.validate()?;
        self.listen_addr.parse().map_err(|e| {
            AutocarError::Config(format!("invalid listen_addr '{}': {e}", self.listen_addr))
        })
    }
}

/// Return the path to `~/.autocar/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".autocar").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, AutocarError> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, AutocarError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        AutocarError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| AutocarError::Config(format!("failed to parse config: {e}")))?;
    Ok(Some(cfg))
}

/// Apply `AUTOCAR_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `AUTOCAR_LISTEN_ADDR` | `listen_addr` |
/// | `AUTOCAR_DEADZONE` | `vehicle.deadzone` |
/// | `AUTOCAR_FRONT_THRESHOLD_CM` | `vehicle.front_threshold_cm` |
/// | `AUTOCAR_SESSION_END` | `vehicle.session_end` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("AUTOCAR_LISTEN_ADDR") {
        cfg.listen_addr = v;
    }
    if let Ok(v) = std::env::var("AUTOCAR_DEADZONE")
        && let Ok(deadzone) = v.trim().parse::<i32>()
    {
        cfg.vehicle.deadzone = deadzone;
    }
    if let Ok(v) = std::env::var("AUTOCAR_FRONT_THRESHOLD_CM")
        && let Ok(threshold) = v.trim().parse::<f32>()
    {
        cfg.vehicle.front_threshold_cm = threshold;
    }
    if let Ok(v) = std::env::var("AUTOCAR_SESSION_END")
        && let Ok(policy) = v.parse::<SessionEndPolicy>()
    {
        cfg.vehicle.session_end = policy;
    }
}

/// Save the config to disk, creating `~/.autocar/` if necessary.
pub fn save(cfg: &Config) -> Result<(), AutocarError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), AutocarError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AutocarError::Config(format!("failed to create config directory: {e}"))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| AutocarError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        AutocarError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}
