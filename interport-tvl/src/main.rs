//! Interport vault TVL exporter CLI.
//!
//! Scans each configured vault's `Transfer` history up to every block of a
//! block list and writes signed per-user balance rows.
//!
//! # Usage
//!
//! ```bash
//! # Export using interport.toml and hourly_blocks.csv in the working directory
//! interport-tvl export
//!
//! # Custom paths, endpoint and format
//! interport-tvl export --blocks blocks.csv --output tvl.parquet --format parquet \
//!     --rpc https://my-rpc.example.com
//!
//! # Show the configured vaults
//! interport-tvl vaults --config interport.toml
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interport_tvl::config::Config;
use interport_tvl::export;
use interport_tvl::output::Format;
use interport_tvl::rpc::RpcSource;

/// Interport vault TVL exporter.
#[derive(Debug, Parser)]
#[command(name = "interport-tvl", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Scan vault transfers at every listed block and write balance rows.
    Export {
        /// CSV with `number` and `timestamp` columns.
        #[arg(long, default_value = "hourly_blocks.csv")]
        blocks: PathBuf,

        /// Destination file, overwritten on success.
        #[arg(long, default_value = "outputData.csv")]
        output: PathBuf,

        /// Configuration file.
        #[arg(long, default_value = "interport.toml")]
        config: PathBuf,

        /// Override the RPC endpoint from the configuration file.
        #[arg(long)]
        rpc: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },

    /// List the configured vaults.
    Vaults {
        /// Configuration file.
        #[arg(long, default_value = "interport.toml")]
        config: PathBuf,

        /// Print as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            blocks,
            output,
            config,
            rpc,
            format,
        } => cmd_export(&config, &blocks, &output, rpc.as_deref(), format).await,
        Command::Vaults { config, json } => cmd_vaults(&config, json),
    }
}

/// Execute the `export` subcommand.
async fn cmd_export(
    config_path: &Path,
    blocks: &Path,
    output: &Path,
    rpc_override: Option<&str>,
    format: Format,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let rpc_url = config.rpc_url(rpc_override)?;
    let source = RpcSource::connect(&rpc_url, config.request_timeout())?;

    tracing::info!(rpc = %rpc_url, chaining = ?config.chaining, "starting export");

    let summary = export::run(&source, &config.scan_config(), blocks, output, format)
        .await
        .context("export failed")?;

    if summary.failed > 0 {
        tracing::warn!(
            failed = summary.failed,
            blocks = summary.blocks,
            "some blocks were skipped, see errors above"
        );
    }
    Ok(())
}

/// Execute the `vaults` subcommand.
#[allow(clippy::print_stdout, reason = "command output")]
fn cmd_vaults(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.vaults)?);
        return Ok(());
    }

    println!("{:<44} Symbol", "Address");
    println!("{}", "-".repeat(56));
    for vault in &config.vaults {
        println!(
            "{:<44} {}",
            vault.address.to_checksum(None),
            vault.token_symbol
        );
    }
    println!();
    println!("search start block: {}", config.search_start_block);
    println!("farm address:       {}", config.farm_address);
    Ok(())
}
