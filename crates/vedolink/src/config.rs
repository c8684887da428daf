//! Config loading with `--config` awareness.

use std::path::PathBuf;

use vedolink_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config` / `VEDOLINK_CONFIG`, else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(vedolink_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let cfg = match &global.config {
        Some(path) => vedolink_config::load_config_from(path)?,
        None => vedolink_config::load_config()?,
    };
    Ok(cfg)
}

/// Load the config and require it to be usable for talking to the alarm.
pub fn load_platform(global: &GlobalOpts) -> Result<vedolink_core::PlatformConfig, CliError> {
    let cfg = load(global)?;
    if cfg.alarm_address.trim().is_empty() {
        return Err(CliError::InvalidConfig {
            path: config_path(global).display().to_string(),
        });
    }
    // Surface a missing code as its own diagnostic.
    let code = vedolink_config::resolve_code(&cfg).map_err(|e| match e {
        vedolink_config::ConfigError::NoCode => CliError::NoCode {
            path: config_path(global).display().to_string(),
        },
        other => other.into(),
    })?;
    Ok(vedolink_config::platform_config(&cfg, code))
}
