use anchor_lang::prelude::*;

use crate::math::{convert_to_assets, convert_to_shares, Rounding};

/// Snapshot of a share ledger (vault or strategy) used for pricing.
///
/// Every quote rounds in the ledger's favor: deposit and redeem floor,
/// mint and withdraw ceil. Zero in gives zero out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareLedger {
    pub total_assets: u64,
    pub total_shares: u64,
    pub decimals_offset: u8,
}

impl ShareLedger {
    pub fn new(total_assets: u64, total_shares: u64, decimals_offset: u8) -> Self {
        Self {
            total_assets,
            total_shares,
            decimals_offset,
        }
    }

    /// Shares minted for depositing `assets` (floor)
    pub fn preview_deposit(&self, assets: u64) -> Result<u64> {
        self.to_shares(assets, Rounding::Floor)
    }

    /// Assets charged for minting exactly `shares` (ceiling)
    pub fn preview_mint(&self, shares: u64) -> Result<u64> {
        self.to_assets(shares, Rounding::Ceiling)
    }

    /// Shares burned for withdrawing exactly `assets` (ceiling)
    pub fn preview_withdraw(&self, assets: u64) -> Result<u64> {
        self.to_shares(assets, Rounding::Ceiling)
    }

    /// Assets paid out for redeeming `shares` (floor)
    pub fn preview_redeem(&self, shares: u64) -> Result<u64> {
        self.to_assets(shares, Rounding::Floor)
    }

    pub fn convert_to_shares(&self, assets: u64) -> Result<u64> {
        self.to_shares(assets, Rounding::Floor)
    }

    pub fn convert_to_assets(&self, shares: u64) -> Result<u64> {
        self.to_assets(shares, Rounding::Floor)
    }

    /// Assets a holder of `balance` shares can take out, capped at the ledger total
    pub fn max_withdraw(&self, balance: u64) -> Result<u64> {
        Ok(self.preview_redeem(balance)?.min(self.total_assets))
    }

    fn to_shares(&self, assets: u64, rounding: Rounding) -> Result<u64> {
        if assets == 0 {
            return Ok(0);
        }
        convert_to_shares(
            assets,
            self.total_assets,
            self.total_shares,
            self.decimals_offset,
            rounding,
        )
    }

    fn to_assets(&self, shares: u64, rounding: Rounding) -> Result<u64> {
        if shares == 0 {
            return Ok(0);
        }
        convert_to_assets(
            shares,
            self.total_assets,
            self.total_shares,
            self.decimals_offset,
            rounding,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_deposit_is_one_to_one() {
        let ledger = ShareLedger::new(0, 0, 0);
        assert_eq!(ledger.preview_deposit(1_000).unwrap(), 1_000);
        assert_eq!(ledger.preview_mint(1_000).unwrap(), 1_000);
    }

    #[test]
    fn test_zero_amounts_quote_zero() {
        let ledger = ShareLedger::new(5_000, 4_000, 0);
        assert_eq!(ledger.preview_deposit(0).unwrap(), 0);
        assert_eq!(ledger.preview_mint(0).unwrap(), 0);
        assert_eq!(ledger.preview_withdraw(0).unwrap(), 0);
        assert_eq!(ledger.preview_redeem(0).unwrap(), 0);
    }

    #[test]
    fn test_round_trip_returns_deposit() {
        let before = ShareLedger::new(7_331, 7_000, 0);
        let shares = before.preview_deposit(1_000).unwrap();

        let after = ShareLedger::new(7_331 + 1_000, 7_000 + shares, 0);
        let back = after.preview_redeem(shares).unwrap();

        assert!(back <= 1_000);
        assert!(1_000 - back <= 2);
    }

    #[test]
    fn test_equal_deposits_get_equal_shares() {
        let ledger = ShareLedger::new(0, 0, 0);
        let alice = ledger.preview_deposit(500).unwrap();

        let ledger = ShareLedger::new(500, alice, 0);
        let bob = ledger.preview_deposit(500).unwrap();

        assert_eq!(alice, bob);
    }

    #[test]
    fn test_yield_raises_share_price() {
        let flat = ShareLedger::new(1_000, 1_000, 0);
        let grown = ShareLedger::new(1_200, 1_000, 0);

        let unit = 1_000_000;
        let flat_price = ShareLedger::new(1_000 * unit, 1_000 * unit, 0)
            .convert_to_assets(unit)
            .unwrap();
        let grown_price = ShareLedger::new(1_200 * unit, 1_000 * unit, 0)
            .convert_to_assets(unit)
            .unwrap();

        assert!(grown.convert_to_assets(1_000).unwrap() > flat.convert_to_assets(1_000).unwrap());
        assert!(grown_price > flat_price);
    }

    #[test]
    fn test_withdraw_costs_at_least_redeem_value() {
        let ledger = ShareLedger::new(1_200, 1_000, 0);
        let shares = ledger.preview_withdraw(800).unwrap();
        assert!(ledger.preview_redeem(shares).unwrap() >= 800);
    }

    #[test]
    fn test_max_withdraw_capped_by_total() {
        let ledger = ShareLedger::new(1_000, 1_000, 0);
        assert_eq!(ledger.max_withdraw(1_000).unwrap(), 1_000);
        assert_eq!(ledger.max_withdraw(0).unwrap(), 0);
    }
}
