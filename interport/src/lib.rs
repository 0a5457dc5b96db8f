//! Interport vault balance extraction.
//!
//! Walks the `Transfer` history of each configured vault share token up to
//! a requested block and turns every transfer into signed per-user balance
//! rows (a debit for the sender, a credit for the receiver). Summing the
//! rows of a user yields their vault balance at that block.
//!
//! The chain-data backend is abstracted behind [`TransferSource`], so the
//! scanner runs the same against a JSON-RPC node or an in-memory fixture.

pub mod error;
pub mod scanner;
pub mod source;
pub mod transform;
pub mod types;
pub mod vaults;

pub use error::{Result, ScanError};
pub use scanner::{BlockFailure, Collected, SubRanges, collect, scan_block, scan_vault};
pub use source::{Transfer, TransferSource};
pub use transform::transfer_rows;
pub use types::{BlockRequest, Leg, OutputRow, TokenBalance, TransferEvent, VaultConfig};
pub use vaults::{MAX_BLOCK_SPAN, RangeChaining, ScanConfig};
