use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use zonewright::DnsConfig;
use zonewright::deploy::{Deployer, DirectoryDeployer};
use zonewright::service::render_artifacts;
use zonewright::zone::{MemoryStore, Zone};

/// Render DNS zone files and name server stanzas
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a zone and write its zone file and stanzas
    Render {
        /// DNS configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Zone description (JSON)
        #[arg(short, long)]
        zone: PathBuf,

        /// Root the configured zone and config directories are created under
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match args.command {
        Command::Render { config, zone, out } => {
            let config = DnsConfig::from_file(&config)?;
            let content = std::fs::read_to_string(&zone)?;
            let mut zone: Zone = serde_json::from_str(&content)?;

            let errors = zone.validate(&MemoryStore::new())?;
            if !errors.is_empty() {
                for err in &errors {
                    eprintln!("{}", err);
                }
                return Ok(ExitCode::FAILURE);
            }

            if zone.serial.is_empty() {
                zone.set_new_serial()?;
            }

            let artifacts = render_artifacts(&zone, &config);
            DirectoryDeployer::from_config(&out, &config).deploy(&artifacts)?;

            info!(
                "Rendered {} ({} records, serial {})",
                zone.domain,
                zone.records.len(),
                zone.serial
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
