//! Interport vault TVL exporter library.
//!
//! Reads a list of block heights, scans each Interport vault's `Transfer`
//! history up to every height through a JSON-RPC node, and writes the
//! resulting per-user balance rows as CSV or Parquet.

pub mod blocks;
pub mod config;
pub mod export;
pub mod output;
pub mod rpc;
