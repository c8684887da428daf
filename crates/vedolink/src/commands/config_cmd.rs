//! Config subcommand handlers.

use owo_colors::OwoColorize;
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn done(message: &str, global: &GlobalOpts) -> String {
    if output::should_color(global.color) {
        format!("{} {message}", "✓".green())
    } else {
        message.to_owned()
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?.redacted();
            let rendered = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
                OutputFormat::JsonCompact => serde_json::to_string(&cfg)?,
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)?,
            };
            output::print_output(rendered.trim_end(), global.quiet);
        }

        ConfigCommand::Init => {
            let path = config::config_path(global);
            vedolink_config::write_template(&path)?;
            let msg = format!("Wrote {}", path.display());
            output::print_output(&done(&msg, global), global.quiet);
        }

        ConfigCommand::SetCode => {
            let code = rpassword::prompt_password("Access code: ").map_err(prompt_err)?;
            vedolink_config::store_code(&SecretString::from(code))?;
            let msg = done("Access code stored in the keyring", global);
            output::print_output(&msg, global.quiet);
        }
    }
    Ok(())
}
