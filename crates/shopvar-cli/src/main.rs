mod edits;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopvar_core::AiMode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopvar")]
#[command(about = "Expand product sheets into Shopify variant CSVs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate variants, enrich, apply edits, validate, and export
    Build {
        /// Source CSV with one product per row
        #[arg(long, short)]
        input: PathBuf,
        /// Shopify CSV to write
        #[arg(long, short)]
        output: PathBuf,
        /// Write the issue report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// YAML file of per-variant edits
        #[arg(long)]
        edits: Option<PathBuf>,
        /// Processing settings file (defaults to `SHOPVAR_SETTINGS_PATH`)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Override the enrichment mode from the settings file
        #[arg(long)]
        ai_mode: Option<AiMode>,
    },
    /// Generate and validate without exporting
    Validate {
        /// Source CSV with one product per row
        #[arg(long, short)]
        input: PathBuf,
        /// Write the issue report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Processing settings file (defaults to `SHOPVAR_SETTINGS_PATH`)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Parse and order a size notation, e.g. `shopvar sizes "L-2,S-4,M"`
    Sizes {
        /// Size cells; several arguments are joined with commas
        #[arg(required = true)]
        tokens: Vec<String>,
        /// Processing settings file (defaults to `SHOPVAR_SETTINGS_PATH`)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shopvar_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Build {
            input,
            output,
            report,
            edits,
            settings,
            ai_mode,
        }) => {
            let options = pipeline::BuildOptions {
                input,
                output,
                report,
                edits,
                settings,
                ai_mode,
            };
            pipeline::run_build(&config, &options).await?;
        }
        Some(Commands::Validate {
            input,
            report,
            settings,
        }) => {
            pipeline::run_validate(&config, &input, report.as_deref(), settings.as_deref())?;
        }
        Some(Commands::Sizes { tokens, settings }) => {
            pipeline::run_sizes(&config, &tokens, settings.as_deref())?;
        }
        None => println!("no command given; run `shopvar --help` for usage"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
