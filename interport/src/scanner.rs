//! Vault history scanning and row accumulation.
//!
//! For each requested block the scanner:
//! 1. Walks every configured vault, in configuration order.
//! 2. Splits `[search_start_block, block]` into sub-ranges of at most
//!    [`MAX_BLOCK_SPAN`] blocks and queries `Transfer` events per sub-range.
//! 3. Converts each event into balance rows, preserving event order.
//!
//! A failure anywhere in a block discards that block's rows, is logged,
//! and the next block is processed.

use crate::error::{Result, ScanError};
use crate::source::TransferSource;
use crate::transform::transfer_rows;
use crate::types::{BlockRequest, OutputRow, VaultConfig};
use crate::vaults::{MAX_BLOCK_SPAN, RangeChaining, ScanConfig};

/// Iterator over the inclusive `(from, to)` query ranges of a history walk.
///
/// Yields nothing when `target <= start`. Every range spans at most
/// [`MAX_BLOCK_SPAN`] blocks and the last one ends exactly at `target`.
#[derive(Debug, Clone)]
pub struct SubRanges {
    cursor: u64,
    target: u64,
    chaining: RangeChaining,
    done: bool,
}

impl SubRanges {
    /// Plan the walk from `start` up to `target`.
    #[must_use]
    pub const fn new(start: u64, target: u64, chaining: RangeChaining) -> Self {
        Self {
            cursor: start,
            target,
            chaining,
            done: target <= start,
        }
    }
}

impl Iterator for SubRanges {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let from = self.cursor;
        let end = from.saturating_add(MAX_BLOCK_SPAN - 1).min(self.target);
        if end >= self.target {
            self.done = true;
        } else {
            self.cursor = match self.chaining {
                RangeChaining::Exclusive => end + 1,
                RangeChaining::Overlapping => end,
            };
        }
        Some((from, end))
    }
}

impl std::iter::FusedIterator for SubRanges {}

/// Rows derived from one vault's transfers up to `block`.
///
/// # Errors
///
/// Returns the first error reported by `source`.
pub async fn scan_vault<S>(
    source: &S,
    config: &ScanConfig,
    vault: &VaultConfig,
    block: &BlockRequest,
) -> Result<Vec<OutputRow>>
where
    S: TransferSource + Sync,
{
    let mut rows = Vec::new();
    for (from, to) in config.sub_ranges(block.block_number) {
        let events = source.transfer_events(vault.address, from, to).await?;
        tracing::debug!(
            vault = %vault.address,
            from,
            to,
            events = events.len(),
            "fetched transfers"
        );
        for event in &events {
            rows.extend(transfer_rows(
                event,
                &vault.token_symbol,
                block.block_timestamp,
                config,
            ));
        }
    }
    Ok(rows)
}

/// Rows for every configured vault at `block`, in vault order.
///
/// # Errors
///
/// Returns the first vault error; rows already scanned for this block are
/// discarded.
pub async fn scan_block<S>(
    source: &S,
    config: &ScanConfig,
    block: &BlockRequest,
) -> Result<Vec<OutputRow>>
where
    S: TransferSource + Sync,
{
    let mut rows = Vec::new();
    for vault in &config.vaults {
        let vault_rows = scan_vault(source, config, vault, block).await?;
        tracing::debug!(
            block = block.block_number,
            vault = %vault.address,
            symbol = %vault.token_symbol,
            rows = vault_rows.len(),
            "vault scanned"
        );
        rows.extend(vault_rows);
    }
    Ok(rows)
}

/// A requested block whose scan failed.
#[derive(Debug)]
pub struct BlockFailure {
    /// The block that was skipped.
    pub block: BlockRequest,
    /// Why it was skipped.
    pub error: ScanError,
}

/// Output of a full run over a block list.
#[derive(Debug, Default)]
pub struct Collected {
    /// Rows of all successful blocks, in request order.
    pub rows: Vec<OutputRow>,
    /// Blocks skipped because of an error, in request order.
    pub failed: Vec<BlockFailure>,
}

/// Scan every block of `blocks` in order and accumulate the rows.
///
/// Calls are strictly sequential, so the row order is reproducible:
/// block, then vault, then sub-range, then event, then leg. A failing
/// block is logged and recorded in [`Collected::failed`]; later blocks
/// still run.
pub async fn collect<S>(source: &S, config: &ScanConfig, blocks: &[BlockRequest]) -> Collected
where
    S: TransferSource + Sync,
{
    let mut out = Collected::default();
    for block in blocks {
        match scan_block(source, config, block).await {
            Ok(rows) => {
                tracing::info!(
                    block = block.block_number,
                    timestamp = block.block_timestamp,
                    rows = rows.len(),
                    "block scanned"
                );
                out.rows.extend(rows);
            }
            Err(error) => {
                tracing::error!(
                    block = block.block_number,
                    timestamp = block.block_timestamp,
                    error = %error,
                    "block scan failed, skipping"
                );
                out.failed.push(BlockFailure {
                    block: *block,
                    error,
                });
            }
        }
    }
    out
}
