//! `vedolink status`: one area read and the derived mode.

use std::fmt::Write;

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use vedolink_core::{AlarmMode, AreaFlags, AreaState};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, flag};

#[derive(Debug, Serialize)]
struct StatusView {
    mode: AlarmMode,
    areas: Vec<AreaState>,
}

#[derive(Tabled)]
struct AreaRow {
    #[tabled(rename = "#")]
    index: u32,
    #[tabled(rename = "Area")]
    name: String,
    #[tabled(rename = "Armed")]
    armed: &'static str,
    #[tabled(rename = "Ready")]
    ready: &'static str,
    #[tabled(rename = "Triggered")]
    triggered: &'static str,
    #[tabled(rename = "Memory")]
    alarm_memory: &'static str,
    #[tabled(rename = "Tamper")]
    sabotaged: &'static str,
    #[tabled(rename = "Anomaly")]
    anomaly: &'static str,
}

fn area_row(a: &AreaState) -> AreaRow {
    AreaRow {
        index: a.index,
        name: a.description.clone(),
        armed: flag(a.armed()),
        ready: flag(a.ready()),
        triggered: flag(a.triggered()),
        alarm_memory: flag(a.flags.contains(AreaFlags::ALARM_MEMORY)),
        sabotaged: flag(a.flags.contains(AreaFlags::SABOTAGED)),
        anomaly: flag(a.flags.contains(AreaFlags::ANOMALY)),
    }
}

fn paint_mode(mode: AlarmMode, color: bool) -> String {
    if !color {
        return mode.to_string();
    }
    if mode.is_armed() {
        mode.yellow().to_string()
    } else if mode == AlarmMode::Triggered {
        mode.red().bold().to_string()
    } else {
        mode.green().to_string()
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let mapping = config::load(global)?.area_mapping;
    let client = super::connect(global)?;
    let result = client.check_alarm().await;
    super::disconnect(client.as_ref()).await;

    let areas = result?.unwrap_or_default();
    let view = StatusView {
        mode: AlarmMode::classify(&areas, &mapping),
        areas,
    };

    let color = output::should_color(global.color);
    let rendered = output::render_single(
        global.output,
        &view,
        |v| {
            let mut out = String::new();
            let _ = writeln!(out, "Mode: {}", paint_mode(v.mode, color));
            if v.areas.is_empty() {
                out.push_str("No areas reported.");
            } else {
                let rows: Vec<AreaRow> = v.areas.iter().map(area_row).collect();
                out.push_str(&output::render_table(&rows));
            }
            out
        },
        |v| v.mode.to_string(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
