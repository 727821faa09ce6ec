//! Kiosk Provisioner CLI
//!
//! Publishes a Move package and creates the transfer policy for one of its
//! types on a ledger network.

use clap::{Parser, Subcommand};
use kiosk_provisioner_client::{
    JsonRpcLedgerClient, MoveToolchain, ProvisionSummary, ProvisionerConfig,
};
use kiosk_provisioner_orchestrator::Provisioner;
use kiosk_provisioner_types::{KeyPair, RoyaltyConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kiosk-provisioner")]
#[command(about = "Publish a Move package and create its kiosk transfer policy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the package and create its transfer policy
    Publish {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Package source directory (overrides the config file)
        #[arg(long)]
        package_path: Option<PathBuf>,

        /// Kiosk rules package source directory (overrides the config file)
        #[arg(long)]
        rules_path: Option<PathBuf>,

        /// Royalty rate in basis points (0 to 10000)
        #[arg(long)]
        royalty_bp: Option<u64>,

        /// Minimum royalty in base units
        #[arg(long)]
        min_royalty: Option<u64>,

        /// Full node URL (overrides the configured network)
        #[arg(long)]
        rpc_url: Option<String>,

        /// How long to wait for each transaction to become final (e.g., "30s", "2m")
        #[arg(long)]
        confirmation_timeout: Option<humantime::Duration>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the admin address
    Address {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a fresh admin key
    Keygen,
}

fn load_config(path: Option<PathBuf>) -> Result<ProvisionerConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => ProvisionerConfig::load(&path)?,
        None => ProvisionerConfig::default().with_env_overrides(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Publish {
            config,
            package_path,
            rules_path,
            royalty_bp,
            min_royalty,
            rpc_url,
            confirmation_timeout,
            json,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .with_writer(std::io::stderr)
                .init();

            let mut config = load_config(config)?;
            if let Some(package_path) = package_path {
                config.package_path = package_path;
            }
            if rules_path.is_some() {
                config.rules_path = rules_path;
            }
            if royalty_bp.is_some() || min_royalty.is_some() {
                config.royalty = RoyaltyConfig::new(
                    royalty_bp.unwrap_or(u64::from(config.royalty.basis_points())),
                    min_royalty.unwrap_or(config.royalty.min_amount()),
                )?;
            }
            if rpc_url.is_some() {
                config.rpc_url = rpc_url;
            }
            if let Some(timeout) = confirmation_timeout {
                config = config.with_confirmation_timeout(timeout.into());
            }
            config.validate()?;

            let keypair = config.admin_keypair()?;
            let admin = keypair.address();
            let rpc_url = config.rpc_url();
            info!(%admin, %rpc_url, package = %config.package_path.display(), "Provisioning");

            let ledger = JsonRpcLedgerClient::new(
                rpc_url,
                config.poll_interval(),
                config.confirmation_timeout(),
            )?;
            let provisioner = Provisioner::new(
                Arc::new(ledger),
                Arc::new(keypair),
                Arc::new(MoveToolchain::new()),
                config.provision_request(),
                config.executor_config(),
            );

            let result = provisioner.provision().await?;
            let summary = ProvisionSummary::new(admin, &result);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary);
            }
        }

        Commands::Address { config } => {
            let config = load_config(config)?;
            println!("{}", config.admin_keypair()?.address());
        }

        Commands::Keygen => {
            let keypair = KeyPair::generate_ed25519();
            println!("admin_key = \"{}\"", keypair.to_base64());
            println!("# address {}", keypair.address());
        }
    }

    Ok(())
}
