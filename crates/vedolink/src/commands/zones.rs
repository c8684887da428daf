//! `vedolink zones`: one zone read.

use tabled::Tabled;

use vedolink_core::{ZoneState, ZoneStatus};

use crate::cli::{GlobalOpts, ZonesArgs};
use crate::error::CliError;
use crate::output::{self, flag};

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "#")]
    index: u32,
    #[tabled(rename = "Zone")]
    name: String,
    #[tabled(rename = "Area")]
    area: u32,
    #[tabled(rename = "Open")]
    open: &'static str,
    #[tabled(rename = "Status")]
    status: String,
}

fn zone_row(z: &ZoneState) -> ZoneRow {
    ZoneRow {
        index: z.index,
        name: z.description.clone(),
        area: z.area,
        open: flag(z.is_open()),
        status: status_names(z.status),
    }
}

/// `alarm, excluded` style rendering of the status word.
fn status_names(status: ZoneStatus) -> String {
    status
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase().replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn handle(args: &ZonesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = super::connect(global)?;
    let result = client.fetch_zones().await;
    super::disconnect(client.as_ref()).await;

    let zones: Vec<ZoneState> = result?
        .unwrap_or_default()
        .into_iter()
        .filter(|z| args.all || !z.description.is_empty())
        .collect();

    let rendered =
        output::render_list(global.output, &zones, zone_row, |z| z.description.clone())?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
