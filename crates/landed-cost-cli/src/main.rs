mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::pricing::{CatalogueArgs, PriceArgs};
use commands::settings::SettingsCommand;

/// Landed-cost retail pricing for imported products
#[derive(Parser)]
#[command(
    name = "lcp",
    version,
    about = "Landed-cost retail pricing for imported products",
    long_about = "Converts a yuan sourcing price and a shipment weight into a rounded \
                  local retail price: exchange rate, freight per kg, customs duty and \
                  margin, rounded up to the next 50. Prices single products or whole \
                  catalogues and checks pricing settings before they are saved."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to a JSON pricing settings record (store column format)
    #[arg(long, env = "LCP_SETTINGS", global = true)]
    settings: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a single product
    Price(PriceArgs),
    /// Reprice a list of products against one configuration
    Catalogue(CatalogueArgs),
    /// Inspect or validate pricing settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing();

    let settings_path = cli.settings.as_deref();
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::pricing::run_price(args, settings_path),
        Commands::Catalogue(args) => commands::pricing::run_catalogue(args, settings_path),
        Commands::Settings(cmd) => commands::settings::run_settings(cmd, settings_path),
        Commands::Version => {
            println!("lcp {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
