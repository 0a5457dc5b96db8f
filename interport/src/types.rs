//! Core domain types: requested blocks, vaults, decoded transfers and the
//! balance rows derived from them.

use std::fmt;
use std::ops::Neg;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A block height to evaluate, paired with its externally supplied timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRequest {
    /// Block height the vault history is scanned up to (inclusive).
    pub block_number: u64,
    /// Unix timestamp (seconds) stamped on every row produced for this block.
    pub block_timestamp: u64,
}

impl BlockRequest {
    /// Create a new block request.
    #[must_use]
    pub const fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self {
            block_number,
            block_timestamp,
        }
    }
}

/// A vault whose share-token transfers are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault share-token contract address.
    pub address: Address,
    /// Symbol written to every row of this vault.
    pub token_symbol: String,
}

impl VaultConfig {
    /// Create a vault entry.
    #[must_use]
    pub fn new(address: Address, token_symbol: impl Into<String>) -> Self {
        Self {
            address,
            token_symbol: token_symbol.into(),
        }
    }
}

/// A decoded ERC-20 `Transfer` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferEvent {
    /// Sending address (zero for mints).
    pub from: Address,
    /// Receiving address (zero for burns).
    pub to: Address,
    /// Transferred amount in token base units.
    pub amount: U256,
    /// Block that included the log.
    pub block_number: u64,
    /// Contract that emitted the log.
    pub token_address: Address,
}

/// Which side of a transfer a row accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    /// The `from` side: balance decreases.
    Sender,
    /// The `to` side: balance increases.
    Receiver,
}

/// An exact signed token quantity.
///
/// Stored as sign and 256-bit magnitude so that the negation of any
/// `uint256` amount is representable. Zero is never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TokenBalance {
    negative: bool,
    magnitude: U256,
}

impl TokenBalance {
    /// The zero balance.
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: U256::ZERO,
    };

    /// A positive balance change of `amount`.
    #[must_use]
    pub const fn credit(amount: U256) -> Self {
        Self {
            negative: false,
            magnitude: amount,
        }
    }

    /// A negative balance change of `amount`.
    #[must_use]
    pub fn debit(amount: U256) -> Self {
        -Self::credit(amount)
    }

    /// Whether the balance is strictly below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// Absolute value.
    #[must_use]
    pub const fn magnitude(&self) -> U256 {
        self.magnitude
    }
}

impl Neg for TokenBalance {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            negative: !self.negative && !self.magnitude.is_zero(),
            magnitude: self.magnitude,
        }
    }
}

impl fmt::Display for TokenBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}", self.magnitude)
    }
}

/// One exported balance-change row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    /// Block of the originating transfer.
    pub block_number: u64,
    /// Timestamp of the requested block (not of the transfer).
    pub timestamp: u64,
    /// Address whose balance changes.
    pub user_address: Address,
    /// Token contract that emitted the transfer.
    pub token_address: Address,
    /// Signed balance change.
    pub token_balance: TokenBalance,
    /// Vault token symbol.
    pub token_symbol: String,
    /// Price placeholder, always `0`.
    pub usd_price: f64,
}

impl OutputRow {
    /// Column names in export order.
    pub const HEADER: [&'static str; 7] = [
        "block_number",
        "timestamp",
        "user_address",
        "token_address",
        "token_balance",
        "token_symbol",
        "usd_price",
    ];

    /// Render the row as text cells in [`Self::HEADER`] order.
    ///
    /// Addresses use their EIP-55 checksummed form and the balance is an
    /// exact decimal integer.
    #[must_use]
    pub fn to_record(&self) -> [String; 7] {
        [
            self.block_number.to_string(),
            self.timestamp.to_string(),
            self.user_address.to_checksum(None),
            self.token_address.to_checksum(None),
            self.token_balance.to_string(),
            self.token_symbol.clone(),
            self.usd_price.to_string(),
        ]
    }
}
