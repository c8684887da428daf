// ── Core error types ──
//
// User-facing errors from vedolink-core. These are NOT transport-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<vedolink_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Poll tick exceeded {timeout_ms}ms")]
    TickTimeout { timeout_ms: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Zone '{description}' has no registered entity")]
    ZoneNotRegistered { description: String },

    #[error("API error: {message}")]
    Api { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Entity discovery already ran")]
    AlreadyDiscovered,

    #[error("Polling already started")]
    AlreadyStarted,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vedolink_api::Error> for CoreError {
    fn from(err: vedolink_api::Error) -> Self {
        match err {
            vedolink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            vedolink_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            vedolink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                    }
                }
            }
            vedolink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            vedolink_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            vedolink_api::Error::Api { message } => CoreError::Api { message },
            vedolink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
