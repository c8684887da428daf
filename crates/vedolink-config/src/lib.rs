//! Configuration for the vedolink host.
//!
//! TOML file + environment layering, access-code resolution
//! (plaintext, env, keyring), and translation to
//! `vedolink_core::PlatformConfig`. The binary adds `--config` handling
//! on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use vedolink_core::config::DEFAULT_ALARM_PORT;
use vedolink_core::{AreaMapping, ClientOptions, PlatformConfig};

/// Prefix for every environment override.
pub const ENV_PREFIX: &str = "VEDOLINK_";

/// Supplies the access code when the file has none.
pub const ALARM_CODE_ENV: &str = "VEDOLINK_ALARM_CODE";

const KEYRING_SERVICE: &str = "vedolink";
const KEYRING_USER: &str = "alarm-code";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no access code configured (set alarm_code, {ALARM_CODE_ENV}, or the keyring)")]
    NoCode,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// The on-disk configuration for one alarm controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Controller host name or IP.
    pub alarm_address: String,

    pub alarm_port: u16,

    /// Access code (plaintext; prefer the keyring or env var).
    pub alarm_code: Option<String>,

    /// Discover and poll zones as well as areas.
    pub map_sensors: bool,

    /// Poll period in seconds.
    pub update_interval: Option<u64>,

    pub area_mapping: AreaMapping,

    /// Endpoint paths, code form field, HTTP timeout.
    pub advanced: ClientOptions,

    /// Upper bound on one whole poll tick, in seconds.
    pub tick_timeout: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alarm_address: String::new(),
            alarm_port: DEFAULT_ALARM_PORT,
            alarm_code: None,
            map_sensors: false,
            update_interval: None,
            area_mapping: AreaMapping::default(),
            advanced: ClientOptions::default(),
            tick_timeout: None,
        }
    }
}

impl Config {
    /// A copy safe to print: the access code is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            alarm_code: self.alarm_code.as_ref().map(|_| "******".into()),
            ..self.clone()
        }
    }
}

/// Starter file written by `vedolink config init`.
pub const TEMPLATE: &str = r#"# vedolink configuration

# Address of the VEDO web interface (host name or IP).
alarm_address = "192.168.1.50"
alarm_port = 80

# Access code. Leave unset to read VEDOLINK_ALARM_CODE or the system keyring
# (`vedolink config set-code`).
# alarm_code = "1234"

# Also mirror zones (sensors).
map_sensors = true

# Poll period in seconds.
update_interval = 5

# Abandon a poll tick that runs longer than this many seconds.
# tick_timeout = 20

[area_mapping]
away_areas = []
night_areas = []
home_areas = []

# [advanced]
# timeout = 30
# code_param = "code"
# login = "/login.cgi"
"#;

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "vedolink", "vedolink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vedolink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment.
///
/// A missing file is not an error: defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG", "ALARM_CODE"])
                .split("__"),
        )
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(cfg)?;
    write_file(path, &toml_str)
}

/// Write the starter template to `path`, refusing to overwrite.
pub fn write_template(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::Validation {
            field: "path".into(),
            reason: format!("{} already exists", path.display()),
        });
    }
    write_file(path, TEMPLATE)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

// ── Access code ─────────────────────────────────────────────────────

/// Resolve the access code: file, then environment, then keyring.
pub fn resolve_code(cfg: &Config) -> Result<SecretString, ConfigError> {
    resolve_code_with(cfg, std::env::var(ALARM_CODE_ENV).ok())
}

fn resolve_code_with(cfg: &Config, env: Option<String>) -> Result<SecretString, ConfigError> {
    // 1. Plaintext in config
    if let Some(code) = cfg.alarm_code.as_ref().filter(|c| !c.is_empty()) {
        return Ok(SecretString::from(code.clone()));
    }

    // 2. Env var
    if let Some(code) = env.filter(|c| !c.is_empty()) {
        return Ok(SecretString::from(code));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        if let Ok(code) = entry.get_password() {
            return Ok(SecretString::from(code));
        }
    }

    Err(ConfigError::NoCode)
}

/// Store the access code in the system keyring.
pub fn store_code(code: &SecretString) -> Result<(), ConfigError> {
    if code.expose_secret().is_empty() {
        return Err(ConfigError::Validation {
            field: "alarm_code".into(),
            reason: "must not be empty".into(),
        });
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(code.expose_secret())?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `PlatformConfig` from the file config.
///
/// A missing access code is left empty rather than rejected, so the
/// platform can report the configuration as invalid and register nothing.
pub fn to_platform_config(cfg: &Config) -> PlatformConfig {
    let alarm_code = resolve_code(cfg).unwrap_or_else(|_| SecretString::from(String::new()));
    platform_config(cfg, alarm_code)
}

/// Build a `PlatformConfig` around an already-resolved access code.
pub fn platform_config(cfg: &Config, alarm_code: SecretString) -> PlatformConfig {
    PlatformConfig {
        alarm_address: cfg.alarm_address.clone(),
        alarm_port: cfg.alarm_port,
        alarm_code,
        map_sensors: cfg.map_sensors,
        update_interval: cfg.update_interval,
        area_mapping: cfg.area_mapping.clone(),
        advanced: cfg.advanced.clone(),
        tick_timeout: cfg
            .tick_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_code_wins_over_env() {
        let cfg = Config {
            alarm_code: Some("1111".into()),
            ..Config::default()
        };
        let code = resolve_code_with(&cfg, Some("2222".into())).unwrap();
        assert_eq!(code.expose_secret(), "1111");
    }

    #[test]
    fn env_code_used_when_file_has_none() {
        let cfg = Config {
            alarm_code: Some(String::new()),
            ..Config::default()
        };
        let code = resolve_code_with(&cfg, Some("2222".into())).unwrap();
        assert_eq!(code.expose_secret(), "2222");
    }

    #[test]
    fn redaction_masks_code_only() {
        let cfg = Config {
            alarm_address: "10.0.0.5".into(),
            alarm_code: Some("1234".into()),
            ..Config::default()
        };
        let shown = cfg.redacted();
        assert_eq!(shown.alarm_code.as_deref(), Some("******"));
        assert_eq!(shown.alarm_address, "10.0.0.5");
        assert_eq!(Config::default().redacted().alarm_code, None);
    }

    #[test]
    fn translation_carries_every_field() {
        let cfg = Config {
            alarm_address: "alarm.lan".into(),
            alarm_port: 8080,
            alarm_code: Some("1234".into()),
            map_sensors: true,
            update_interval: Some(7),
            area_mapping: AreaMapping {
                night_areas: vec!["Bedrooms".into()],
                ..AreaMapping::default()
            },
            advanced: ClientOptions::default(),
            tick_timeout: Some(12),
        };
        let platform = platform_config(&cfg, SecretString::from("1234".to_string()));

        assert!(platform.has_valid_config());
        assert_eq!(platform.alarm_port, 8080);
        assert_eq!(platform.poll_interval(), Duration::from_secs(7));
        assert_eq!(platform.tick_timeout, Some(Duration::from_secs(12)));
        assert_eq!(platform.area_mapping.night_areas, ["Bedrooms"]);
    }

    #[test]
    fn zero_tick_timeout_means_none() {
        let cfg = Config {
            tick_timeout: Some(0),
            ..Config::default()
        };
        let platform = platform_config(&cfg, SecretString::from(String::new()));
        assert_eq!(platform.tick_timeout, None);
    }

    #[test]
    fn template_parses() {
        let cfg: Config = toml::from_str(TEMPLATE).unwrap();
        assert_eq!(cfg.alarm_address, "192.168.1.50");
        assert!(cfg.map_sensors);
        assert_eq!(cfg.update_interval, Some(5));
    }
}
