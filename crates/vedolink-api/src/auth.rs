// VEDO session authentication
//
// The login form posts the access code; the controller answers by
// setting a session cookie in the client's jar. Subsequent reads use
// that cookie automatically.

use secrecy::ExposeSecret;
use tracing::debug;

use crate::client::VedoClient;
use crate::error::Error;
use crate::models::{LoginResponse, SessionInfo};

impl VedoClient {
    /// Authenticate with the controller using the configured access code.
    ///
    /// `POST {login}` with form body `{code_param}=<code>`. A non-2xx
    /// status, or a JSON reply with `logged != 1`, is an authentication
    /// failure. An empty body counts as success (older firmware).
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.url(&self.endpoints().login)?;
        debug!(%url, "logging in");

        let form = [(
            self.endpoints().code_param.as_str(),
            self.code().expose_secret(),
        )];
        let resp = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            self.set_logged_in(false);
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let body = resp.text().await.map_err(|e| self.send_error(e))?;
        if !body.trim().is_empty() {
            if let Ok(reply) = serde_json::from_str::<LoginResponse>(&body) {
                if !reply.logged() {
                    self.set_logged_in(false);
                    return Err(Error::Authentication {
                        message: "controller rejected the access code".into(),
                    });
                }
            }
        }

        self.set_logged_in(true);
        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// `GET {logout}`. The session flag is cleared even if the request fails.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.url(&self.endpoints().logout)?;
        debug!(%url, "logging out");

        self.set_logged_in(false);
        self.http()
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        debug!("logout complete");
        Ok(())
    }
}
