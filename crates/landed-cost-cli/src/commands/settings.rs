use clap::{Args, Subcommand};
use serde_json::{json, Value};

use landed_cost_core::pricing::settings::{
    self, ResolvedSettings, SettingsRecord, SettingsSource,
};

use crate::input;

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show the effective pricing configuration and where it came from
    Show,
    /// Check a settings record against the save rules
    Validate(ValidateArgs),
}

/// Arguments for settings validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to JSON settings record
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_settings(
    cmd: SettingsCommand,
    settings_path: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    match cmd {
        SettingsCommand::Show => Ok(serde_json::to_value(load_settings(settings_path))?),
        SettingsCommand::Validate(args) => run_validate(args),
    }
}

fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: SettingsRecord = match input::load_document(args.input.as_deref())? {
        Some(data) => serde_json::from_value(data)?,
        None => return Err("--input <file.json> or stdin required for settings validation".into()),
    };
    let configuration = settings::validate_for_save(&record)?;
    tracing::info!("settings record passes save rules");
    Ok(json!({
        "valid": true,
        "configuration": configuration,
    }))
}

/// Resolve the pricing configuration for this invocation.
///
/// No file, an unreadable file, or an incomplete record all fall back to the
/// default configuration.
pub fn load_settings(path: Option<&str>) -> ResolvedSettings {
    let Some(path) = path else {
        tracing::info!("no settings file given, using default pricing configuration");
        return ResolvedSettings::fallback("No settings file provided");
    };

    match input::file::read_json::<SettingsRecord>(path) {
        Ok(record) => {
            let resolved = settings::resolve_settings(Some(record));
            match (&resolved.source, &resolved.fallback_reason) {
                (SettingsSource::Default, Some(reason)) => {
                    tracing::warn!(path, reason = %reason, "settings record unusable, using defaults");
                }
                _ => tracing::info!(path, "loaded pricing settings"),
            }
            resolved
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "failed to read settings, using defaults");
            ResolvedSettings::fallback(e.to_string())
        }
    }
}
