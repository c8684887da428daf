// ── Runtime platform configuration ──
//
// These types describe *what* to poll and *how often*. They carry the
// access code and tuning knobs, but never touch disk. `vedolink-config`
// builds a `PlatformConfig` from files/env and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use vedolink_api::Endpoints;
use vedolink_api::transport::DEFAULT_TIMEOUT;

use crate::error::CoreError;

/// Poll period used when `update_interval` is unset or zero.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Port used when `alarm_port` is unset.
pub const DEFAULT_ALARM_PORT: u16 = 80;

/// Which VEDO areas count towards each semantic arming mode.
///
/// Entries are area descriptions as shown on the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaMapping {
    pub away_areas: Vec<String>,
    pub night_areas: Vec<String>,
    pub home_areas: Vec<String>,
}

/// Client-specific options passed straight through to the HTTP client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    #[serde(flatten)]
    pub endpoints: Endpoints,
    /// Per-request HTTP timeout in seconds.
    pub timeout: Option<u64>,
}

impl ClientOptions {
    pub fn request_timeout(&self) -> Duration {
        self.timeout
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }
}

/// Configuration for a single alarm controller.
///
/// Built by the host binary, passed to [`Platform`](crate::Platform) --
/// core never reads config files. Validity is checked lazily by
/// [`has_valid_config`](Self::has_valid_config) so that an incomplete
/// configuration degrades to "no entities" instead of a startup failure.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Controller host name or IP (optionally with an `http://` scheme).
    pub alarm_address: String,
    pub alarm_port: u16,
    /// Access code used to log in to the web interface.
    pub alarm_code: SecretString,
    /// Discover and poll zones (sensors) in addition to areas.
    pub map_sensors: bool,
    /// Poll period in seconds. `None` or 0 selects the 5 s default.
    pub update_interval: Option<u64>,
    pub area_mapping: AreaMapping,
    pub advanced: ClientOptions,
    /// Upper bound on one whole tick. `None` leaves only the HTTP timeout.
    pub tick_timeout: Option<Duration>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            alarm_address: String::new(),
            alarm_port: DEFAULT_ALARM_PORT,
            alarm_code: SecretString::from(String::new()),
            map_sensors: false,
            update_interval: None,
            area_mapping: AreaMapping::default(),
            advanced: ClientOptions::default(),
            tick_timeout: None,
        }
    }
}

impl PlatformConfig {
    /// An address and an access code are both present and non-empty.
    pub fn has_valid_config(&self) -> bool {
        !self.alarm_address.trim().is_empty() && !self.alarm_code.expose_secret().is_empty()
    }

    /// Delay between the end of one tick and the start of the next.
    pub fn poll_interval(&self) -> Duration {
        self.update_interval
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_POLL_INTERVAL, |secs| {
                Duration::from_millis(secs.saturating_mul(1000))
            })
    }

    /// Controller root URL, e.g. `http://10.0.0.5:80/`.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        let address = self.alarm_address.trim().trim_end_matches('/');
        let raw = if address.contains("://") {
            address.to_owned()
        } else {
            format!("http://{address}:{}", self.alarm_port)
        };
        raw.parse().map_err(|e| CoreError::Config {
            message: format!("invalid controller address {address:?}: {e}"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> PlatformConfig {
        PlatformConfig {
            alarm_address: "10.0.0.5".into(),
            alarm_code: SecretString::from("1234".to_string()),
            ..PlatformConfig::default()
        }
    }

    #[test]
    fn requires_address_and_code() {
        assert!(valid().has_valid_config());

        let mut cfg = valid();
        cfg.alarm_address = "  ".into();
        assert!(!cfg.has_valid_config());

        let mut cfg = valid();
        cfg.alarm_code = SecretString::from(String::new());
        assert!(!cfg.has_valid_config());

        assert!(!PlatformConfig::default().has_valid_config());
    }

    #[test]
    fn poll_interval_defaults_to_five_seconds() {
        let mut cfg = valid();
        assert_eq!(cfg.poll_interval(), Duration::from_millis(5000));

        cfg.update_interval = Some(0);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(5000));

        cfg.update_interval = Some(2);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn base_url_uses_port_unless_scheme_given() {
        let mut cfg = valid();
        assert_eq!(cfg.base_url().unwrap().as_str(), "http://10.0.0.5/");

        cfg.alarm_port = 8080;
        assert_eq!(cfg.base_url().unwrap().as_str(), "http://10.0.0.5:8080/");

        cfg.alarm_address = "https://vedo.local/".into();
        assert_eq!(cfg.base_url().unwrap().as_str(), "https://vedo.local/");
    }

    #[test]
    fn client_options_flatten_endpoints() {
        let opts: ClientOptions =
            serde_json::from_str(r#"{"login":"/cgi/login","timeout":5}"#).unwrap();
        assert_eq!(opts.endpoints.login, "/cgi/login");
        assert_eq!(opts.endpoints.area_desc, "/user/area_desc.json");
        assert_eq!(opts.request_timeout(), Duration::from_secs(5));
    }
}
