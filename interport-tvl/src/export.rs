//! End-to-end export: block list in, balance rows out.

use std::path::Path;

use anyhow::Result;
use interport::{ScanConfig, TransferSource};

use crate::{blocks, output};

/// Counters reported after an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Valid blocks read from the block list.
    pub blocks: usize,
    /// Blocks skipped because their scan failed.
    pub failed: usize,
    /// Rows written.
    pub rows: usize,
}

/// Read `blocks_path`, scan every block against `source` and write the
/// rows to `output_path`.
///
/// Per-block scan failures are logged and skipped; they do not fail the
/// export.
///
/// # Errors
///
/// Returns an error if the block list cannot be read or the output
/// cannot be written.
pub async fn run<S>(
    source: &S,
    config: &ScanConfig,
    blocks_path: &Path,
    output_path: &Path,
    format: output::Format,
) -> Result<Summary>
where
    S: TransferSource + Sync,
{
    let requests = blocks::read(blocks_path)?;
    tracing::info!(
        blocks = requests.len(),
        vaults = config.vaults.len(),
        start = config.search_start_block,
        path = %blocks_path.display(),
        "block list loaded"
    );

    let collected = interport::collect(source, config, &requests).await;
    output::write(output_path, &collected.rows, format)?;

    let summary = Summary {
        blocks: requests.len(),
        failed: collected.failed.len(),
        rows: collected.rows.len(),
    };
    tracing::info!(
        rows = summary.rows,
        failed = summary.failed,
        path = %output_path.display(),
        "output written"
    );
    Ok(summary)
}
