//! JSON-RPC backed [`TransferSource`].

use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};
use interport::source::check_span;
use interport::{ScanError, Transfer, TransferEvent, TransferSource};

/// Queries vault `Transfer` logs with `eth_getLogs`.
#[derive(Debug, Clone)]
pub struct RpcSource<P> {
    provider: P,
    timeout: Duration,
}

impl<P> RpcSource<P> {
    /// Wrap an existing provider.
    #[must_use]
    pub const fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

impl RpcSource<DynProvider> {
    /// Connect over HTTP to `rpc_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn connect(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let url = rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL: {rpc_url}"))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self::new(provider, timeout))
    }
}

impl<P: Provider> TransferSource for RpcSource<P> {
    async fn transfer_events(
        &self,
        contract: Address,
        from: u64,
        to: u64,
    ) -> interport::Result<Vec<TransferEvent>> {
        check_span(from, to)?;
        let filter = Filter::new()
            .address(contract)
            .event_signature(Transfer::SIGNATURE_HASH)
            .from_block(from)
            .to_block(to);

        let logs = tokio::time::timeout(self.timeout, self.provider.get_logs(&filter))
            .await
            .map_err(|_| ScanError::Rpc {
                from,
                to,
                message: format!("request timed out after {:?}", self.timeout),
            })?
            .map_err(|e| ScanError::Rpc {
                from,
                to,
                message: e.to_string(),
            })?;

        tracing::trace!(%contract, from, to, logs = logs.len(), "eth_getLogs");
        logs.iter().map(TransferEvent::try_from).collect()
    }
}
