// VEDO HTTP client
//
// Wraps `reqwest::Client` with VEDO-specific URL construction, cache
// busting, and session bookkeeping. Endpoint groups (auth, areas, zones)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::SessionInfo;
use crate::transport::{DEFAULT_TIMEOUT, TransportConfig};

/// Endpoint paths and form fields of the VEDO web interface.
///
/// Defaults match current firmware; older panels moved a few of these,
/// so every field can be overridden from the `advanced` config block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub logout: String,
    pub area_desc: String,
    pub area_stat: String,
    pub zone_desc: String,
    pub zone_stat: String,
    /// Form field that carries the access code on login.
    pub code_param: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/login.cgi".into(),
            logout: "/logout.cgi".into(),
            area_desc: "/user/area_desc.json".into(),
            area_stat: "/user/area_stat.json".into(),
            zone_desc: "/user/zone_desc.json".into(),
            zone_stat: "/user/zone_stat.json".into(),
            code_param: "code".into(),
        }
    }
}

/// Raw HTTP client for a single VEDO controller.
///
/// Holds the access code so it can transparently log in again when the
/// controller drops the session. High-level reads (`check_alarm`,
/// `fetch_zones`) log in lazily on first use.
pub struct VedoClient {
    http: reqwest::Client,
    base_url: Url,
    code: SecretString,
    endpoints: Endpoints,
    /// Per-request limit, reported back in [`Error::Timeout`].
    timeout: Duration,
    logged_in: AtomicBool,
}

impl VedoClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the session lives in a cookie). `base_url` is the
    /// controller root, e.g. `http://192.168.1.20:80`.
    pub fn new(
        base_url: Url,
        code: SecretString,
        endpoints: Endpoints,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        let mut client = Self::with_client(http, base_url, code, endpoints);
        client.timeout = config.timeout;
        Ok(client)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for giving it a cookie store if the
    /// controller relies on the session cookie.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        code: SecretString,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            http,
            base_url,
            code,
            endpoints,
            timeout: DEFAULT_TIMEOUT,
            logged_in: AtomicBool::new(false),
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured endpoint paths.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn code(&self) -> &SecretString {
        &self.code
    }

    /// Whether a login has succeeded and no read has reported expiry since.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Acquire)
    }

    pub(crate) fn set_logged_in(&self, value: bool) {
        self.logged_in.store(value, Ordering::Release);
    }

    /// Map a send or body-read failure, turning reqwest timeouts into
    /// [`Error::Timeout`] with the configured limit.
    pub(crate) fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an endpoint path onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Endpoint URL with the `_=<millis>` cache buster the panel's own UI sends.
    fn cache_busted_url(&self, path: &str) -> Result<Url, Error> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .append_pair("_", &chrono::Utc::now().timestamp_millis().to_string());
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode a session-scoped JSON reply.
    ///
    /// Maps `logged: 0` and HTTP 401/403 to [`Error::SessionExpired`].
    pub(crate) async fn get_json<T>(&self, path: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + SessionInfo,
    {
        let url = self.cache_busted_url(path)?;
        debug!(%url, "GET");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            self.set_logged_in(false);
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        let body = resp.text().await.map_err(|e| self.send_error(e))?;
        let parsed: T = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        if !parsed.logged() {
            self.set_logged_in(false);
            return Err(Error::SessionExpired);
        }

        Ok(parsed)
    }

    /// Read an endpoint, logging in first if needed and once more if the
    /// controller reports the session expired mid-flight.
    pub(crate) async fn read<T>(&self, path: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + SessionInfo,
    {
        if !self.is_logged_in() {
            self.login().await?;
        }

        match self.get_json(path).await {
            Err(e) if e.is_auth_expired() => {
                debug!(path, "session expired, logging in again");
                self.login().await?;
                self.get_json(path).await
            }
            other => other,
        }
    }
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}
