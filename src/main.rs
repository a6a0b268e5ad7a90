//! GPG Gateway CLI
//!
//! Entry point for the `gpg-gateway` command-line tool. Prints results as
//! JSON on stdout; diagnostics go to stderr through `RUST_LOG`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gpg_gateway::{GatewayConfig, SignatureGateway};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gpg-gateway")]
#[command(about = "OpenPGP key import and detached-signature verification via gpg", version)]
struct Cli {
    /// Path to gateway config file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import public key material into the gateway keyring
    Import {
        /// File holding armored or binary key material
        key: PathBuf,
    },

    /// Verify a detached signature
    Verify {
        /// Signed data
        message: PathBuf,

        /// Detached signature over MESSAGE
        signature: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let config = match cli.config {
        Some(path) => GatewayConfig::load(&path)?,
        None => GatewayConfig::default(),
    };
    let gateway = SignatureGateway::from_config(&config)?;

    let json = match cli.command {
        Commands::Import { key } => {
            let result = gateway.import(&read_input(&key)?)?;
            serde_json::to_string_pretty(&result)?
        }
        Commands::Verify { message, signature } => {
            let result = gateway.verify(&read_input(&message)?, &read_input(&signature)?)?;
            serde_json::to_string_pretty(&result)?
        }
    };
    Ok(json)
}

fn read_input(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}
