//! Runtime configuration loaded from `interport.toml`.
//!
//! Holds the RPC endpoint and everything the scanner needs: the ordered
//! vault list, the history start block and the farm address whose
//! transfers are protocol-internal.
//!
//! ```toml
//! rpc_url = "https://rpc.linea.build"
//! search_start_block = 1_000_000
//! farm_address = "0x..."
//!
//! [[vaults]]
//! address = "0x..."
//! token_symbol = "iUSDC"
//! ```

use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use interport::{RangeChaining, ScanConfig, VaultConfig};
use serde::Deserialize;

/// Default per-request timeout for `eth_getLogs`.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON-RPC endpoint; may be overridden on the command line.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// First block of every history walk.
    pub search_start_block: u64,
    /// Stablecoin farm address excluded from rows.
    pub farm_address: Address,
    /// Sub-range chaining strategy.
    #[serde(default)]
    pub chaining: RangeChaining,
    /// Tracked vaults, in export order.
    pub vaults: Vec<VaultConfig>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it
    /// lists no vaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config = Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML or an empty vault list.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.vaults.is_empty() {
            bail!("no vaults configured");
        }
        Ok(config)
    }

    /// Resolve the RPC endpoint, preferring `override_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when neither the override nor the file sets one.
    pub fn rpc_url(&self, override_url: Option<&str>) -> Result<String> {
        override_url
            .map(str::to_owned)
            .or_else(|| self.rpc_url.clone())
            .context("no RPC endpoint: set `rpc_url` in the config or pass --rpc")
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The scanner view of this configuration.
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new(
            self.vaults.clone(),
            self.search_start_block,
            self.farm_address,
        )
        .with_chaining(self.chaining)
    }
}
