//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vedolink_config::ConfigError;
use vedolink_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the alarm at {url}")]
    #[diagnostic(
        code(vedolink::connection_failed),
        help(
            "Check that the VEDO web interface is reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(vedolink::timeout),
        help("Raise `advanced.timeout` or check the controller's responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(vedolink::auth_failed),
        help("Verify the access code. Store a new one with: vedolink config set-code")
    )]
    AuthFailed { message: String },

    #[error("No access code configured")]
    #[diagnostic(
        code(vedolink::no_code),
        help(
            "Set alarm_code in {path},\n\
             export VEDOLINK_ALARM_CODE, or run: vedolink config set-code"
        )
    )]
    NoCode { path: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration is incomplete")]
    #[diagnostic(
        code(vedolink::invalid_config),
        help(
            "alarm_address and an access code are required.\n\
             Create a config with: vedolink config init\n\
             Expected at: {path}"
        )
    )]
    InvalidConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vedolink::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(vedolink::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {reason}")]
    #[diagnostic(code(vedolink::keyring))]
    Keyring { reason: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Controller error: {message}")]
    #[diagnostic(code(vedolink::api_error))]
    Api { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(vedolink::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(vedolink::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NoCode { .. }
            | Self::InvalidConfig { .. }
            | Self::Validation { .. }
            | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::TickTimeout { timeout_ms } => Self::Timeout {
                seconds: timeout_ms.div_ceil(1000),
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            other => Self::Api {
                message: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCode => Self::NoCode {
                path: vedolink_config::config_path().display().to_string(),
            },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Keyring(e) => Self::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Serialization(e) => Self::Toml(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let cases = [
            (
                CliError::from(CoreError::ConnectionFailed {
                    url: "http://10.0.0.5/".into(),
                    reason: "refused".into(),
                }),
                7,
            ),
            (
                CliError::from(CoreError::AuthenticationFailed {
                    message: "bad code".into(),
                }),
                3,
            ),
            (CliError::from(CoreError::Timeout { timeout_secs: 30 }), 8),
            (CliError::from(CoreError::TickTimeout { timeout_ms: 1500 }), 8),
            (CliError::from(ConfigError::NoCode), 2),
            (CliError::from(CoreError::AlreadyStarted), 1),
        ];
        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn tick_timeout_rounds_up_to_seconds() {
        let err = CliError::from(CoreError::TickTimeout { timeout_ms: 1500 });
        assert!(matches!(err, CliError::Timeout { seconds: 2 }));
    }
}
