//! Command handlers.

pub mod config_cmd;
pub mod run;
pub mod status;
pub mod zones;

use vedolink_core::{RemoteStateClient, build_vedo_client};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// Build an HTTP client for a one-shot command.
pub(crate) fn connect(global: &GlobalOpts) -> Result<Box<dyn RemoteStateClient>, CliError> {
    let platform = config::load_platform(global)?;
    Ok(Box::new(build_vedo_client(&platform)?))
}

/// Best-effort logout after a one-shot read.
pub(crate) async fn disconnect(client: &dyn RemoteStateClient) {
    if let Err(e) = client.close().await {
        tracing::debug!(error = %e, "logout failed");
    }
}
