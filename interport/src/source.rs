//! Chain-data source abstraction and `Transfer` log decoding.

use std::future::Future;

use alloy::primitives::Address;
use alloy::rpc::types::Log;
use alloy::sol;

use crate::error::{Result, ScanError};
use crate::types::TransferEvent;
use crate::vaults::MAX_BLOCK_SPAN;

sol! {
    /// ERC-20 `Transfer` as emitted by vault share tokens.
    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed from, address indexed to, uint256 amount);
}

/// A backend able to list a contract's `Transfer` events in a block range.
///
/// Implementations return events in chain order (block, then log index)
/// and must not be asked for ranges wider than [`MAX_BLOCK_SPAN`] blocks.
pub trait TransferSource {
    /// All `Transfer` events emitted by `contract` in `[from, to]` inclusive.
    fn transfer_events(
        &self,
        contract: Address,
        from: u64,
        to: u64,
    ) -> impl Future<Output = Result<Vec<TransferEvent>>> + Send;
}

/// Reject a query range the upstream API would refuse.
///
/// # Errors
///
/// Returns [`ScanError::InvertedRange`] when `to < from` and
/// [`ScanError::SpanTooLarge`] when the range covers more than
/// [`MAX_BLOCK_SPAN`] blocks.
pub fn check_span(from: u64, to: u64) -> Result<()> {
    if to < from {
        return Err(ScanError::InvertedRange { from, to });
    }
    if to - from >= MAX_BLOCK_SPAN {
        return Err(ScanError::SpanTooLarge { from, to });
    }
    Ok(())
}

impl TryFrom<&Log> for TransferEvent {
    type Error = ScanError;

    fn try_from(log: &Log) -> Result<Self> {
        let block_number = log
            .block_number
            .ok_or_else(|| ScanError::Decode("log has no block number".to_owned()))?;
        let decoded = log
            .log_decode::<Transfer>()
            .map_err(|e| ScanError::Decode(e.to_string()))?;
        let Transfer { from, to, amount } = decoded.inner.data;
        Ok(Self {
            from,
            to,
            amount,
            block_number,
            token_address: decoded.inner.address,
        })
    }
}
