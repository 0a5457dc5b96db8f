//! Transfer-to-row transform.

use crate::types::{Leg, OutputRow, TokenBalance, TransferEvent};
use crate::vaults::ScanConfig;

/// Turn one transfer into zero, one or two balance rows.
///
/// The sender leg (debit) comes before the receiver leg (credit). A leg
/// whose address is exempt under `config` produces no row; the other leg is
/// unaffected.
#[must_use]
pub fn transfer_rows(
    event: &TransferEvent,
    token_symbol: &str,
    timestamp: u64,
    config: &ScanConfig,
) -> Vec<OutputRow> {
    [(Leg::Sender, event.from), (Leg::Receiver, event.to)]
        .into_iter()
        .filter(|&(_, user)| !config.is_exempt(user))
        .map(|(leg, user)| OutputRow {
            block_number: event.block_number,
            timestamp,
            user_address: user,
            token_address: event.token_address,
            token_balance: match leg {
                Leg::Sender => TokenBalance::debit(event.amount),
                Leg::Receiver => TokenBalance::credit(event.amount),
            },
            token_symbol: token_symbol.to_owned(),
            usd_price: 0.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256, address};

    use super::*;

    const FARM: Address = address!("00000000000000000000000000000000000000fa");
    const VAULT: Address = address!("00000000000000000000000000000000000000aa");
    const ALICE: Address = address!("0000000000000000000000000000000000000a11");
    const BOB: Address = address!("0000000000000000000000000000000000000b0b");

    fn config() -> ScanConfig {
        ScanConfig::new(Vec::new(), 0, FARM)
    }

    fn transfer(from: Address, to: Address, amount: u64) -> TransferEvent {
        TransferEvent {
            from,
            to,
            amount: U256::from(amount),
            block_number: 950,
            token_address: VAULT,
        }
    }

    #[test]
    fn ordinary_transfer_yields_balanced_legs() {
        let rows = transfer_rows(&transfer(ALICE, BOB, 500), "USDX", 1_700_000_000, &config());
        assert_eq!(rows.len(), 2, "both legs emitted");

        let (sender, receiver) = (&rows[0], &rows[1]);
        assert_eq!(sender.user_address, ALICE);
        assert_eq!(sender.token_balance.to_string(), "-500");
        assert_eq!(receiver.user_address, BOB);
        assert_eq!(receiver.token_balance.to_string(), "500");
        assert_eq!(sender.token_balance, -receiver.token_balance, "legs cancel");

        for row in &rows {
            assert_eq!(row.block_number, 950);
            assert_eq!(row.timestamp, 1_700_000_000);
            assert_eq!(row.token_address, VAULT);
            assert_eq!(row.token_symbol, "USDX");
            assert!(row.usd_price == 0.0, "price placeholder");
        }
    }

    #[test]
    fn mint_drops_sender_leg() {
        let rows = transfer_rows(&transfer(Address::ZERO, BOB, 7), "USDX", 1, &config());
        assert_eq!(rows.len(), 1, "only receiver leg");
        assert_eq!(rows[0].user_address, BOB);
        assert!(!rows[0].token_balance.is_negative(), "credit");
    }

    #[test]
    fn burn_drops_receiver_leg() {
        let rows = transfer_rows(&transfer(ALICE, Address::ZERO, 7), "USDX", 1, &config());
        assert_eq!(rows.len(), 1, "only sender leg");
        assert_eq!(rows[0].user_address, ALICE);
        assert!(rows[0].token_balance.is_negative(), "debit");
    }

    #[test]
    fn farm_legs_are_dropped() {
        let deposit = transfer_rows(&transfer(ALICE, FARM, 9), "USDX", 1, &config());
        assert_eq!(deposit.len(), 1, "farm receiver dropped");
        assert_eq!(deposit[0].user_address, ALICE);

        let withdrawal = transfer_rows(&transfer(FARM, BOB, 9), "USDX", 1, &config());
        assert_eq!(withdrawal.len(), 1, "farm sender dropped");
        assert_eq!(withdrawal[0].user_address, BOB);

        let internal = transfer_rows(&transfer(FARM, Address::ZERO, 9), "USDX", 1, &config());
        assert!(internal.is_empty(), "both legs exempt");
    }

    #[test]
    fn self_transfer_keeps_both_legs() {
        let rows = transfer_rows(&transfer(ALICE, ALICE, 3), "USDX", 1, &config());
        assert_eq!(rows.len(), 2, "self transfer is two legs");
        assert_eq!(rows[0].token_balance, -rows[1].token_balance, "net zero");
    }

    #[test]
    fn huge_amount_is_exact() {
        let mut event = transfer(ALICE, BOB, 0);
        event.amount = U256::MAX;
        let rows = transfer_rows(&event, "USDX", 1, &config());
        assert_eq!(rows[0].token_balance.magnitude(), U256::MAX);
        assert_eq!(rows[1].token_balance.magnitude(), U256::MAX);
        assert_eq!(rows[0].token_balance, -rows[1].token_balance, "exact negation");
    }
}
