//! Strategy registry: insertion-ordered allocations with key lookup.
//!
//! Invariant: `Σ target_allocation_bps == total_allocation_bps <= MAX_BPS`.

use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_BPS, MAX_STRATEGIES},
    error::VaultError,
    state::{StrategyAllocation, Vault},
};

impl Vault {
    /// Registered strategies in the order rebalancing and withdrawals visit them
    pub fn strategies(&self) -> &[StrategyAllocation] {
        &self.strategies
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_active(&self, strategy: &Pubkey) -> bool {
        self.allocation(strategy).is_some()
    }

    pub fn allocation(&self, strategy: &Pubkey) -> Option<&StrategyAllocation> {
        self.strategies.iter().find(|a| a.strategy == *strategy)
    }

    fn allocation_mut(&mut self, strategy: &Pubkey) -> Result<&mut StrategyAllocation> {
        self.strategies
            .iter_mut()
            .find(|a| a.strategy == *strategy)
            .ok_or(VaultError::StrategyNotRegistered.into())
    }

    pub fn register_strategy(&mut self, strategy: Pubkey, weight_bps: u16) -> Result<()> {
        require_keys_neq!(strategy, Pubkey::default(), VaultError::InvalidAddress);
        require!(!self.is_active(&strategy), VaultError::StrategyAlreadyActive);
        require!(weight_bps <= MAX_BPS, VaultError::AllocationTooHigh);

        let total = self
            .total_allocation_bps
            .checked_add(weight_bps)
            .ok_or(VaultError::MathOverflow)?;
        require!(total <= MAX_BPS, VaultError::AllocationExceeded);
        require!(
            self.strategies.len() < MAX_STRATEGIES,
            VaultError::TooManyStrategies
        );

        self.strategies.push(StrategyAllocation {
            strategy,
            target_allocation_bps: weight_bps,
            total_deposited: 0,
        });
        self.total_allocation_bps = total;

        Ok(())
    }

    /// Swap `strategy`'s weight for `new_bps`. Returns the previous weight.
    pub fn update_allocation(&mut self, strategy: &Pubkey, new_bps: u16) -> Result<u16> {
        require!(new_bps <= MAX_BPS, VaultError::AllocationTooHigh);

        let total_allocation_bps = self.total_allocation_bps;
        let allocation = self.allocation_mut(strategy)?;
        let previous = allocation.target_allocation_bps;

        let total = total_allocation_bps
            .checked_sub(previous)
            .ok_or(VaultError::MathOverflow)?
            .checked_add(new_bps)
            .ok_or(VaultError::MathOverflow)?;
        require!(total <= MAX_BPS, VaultError::AllocationExceeded);

        allocation.target_allocation_bps = new_bps;
        self.total_allocation_bps = total;

        Ok(previous)
    }

    /// Drop `strategy` from the registry and release its weight.
    /// The last entry takes its slot.
    pub fn deregister_strategy(&mut self, strategy: &Pubkey) -> Result<StrategyAllocation> {
        let index = self
            .strategies
            .iter()
            .position(|a| a.strategy == *strategy)
            .ok_or(VaultError::StrategyNotRegistered)?;

        let removed = self.strategies[index];
        self.total_allocation_bps = self
            .total_allocation_bps
            .checked_sub(removed.target_allocation_bps)
            .ok_or(VaultError::MathOverflow)?;
        self.strategies.swap_remove(index);

        Ok(removed)
    }

    /// Record assets sent to `strategy`. Returns the new recorded total.
    pub fn record_deposit(&mut self, strategy: &Pubkey, assets: u64) -> Result<u64> {
        let allocation = self.allocation_mut(strategy)?;
        allocation.total_deposited = allocation
            .total_deposited
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        Ok(allocation.total_deposited)
    }

    /// Record assets recovered from `strategy`, never going below zero.
    pub fn record_recovery(&mut self, strategy: &Pubkey, assets: u64) -> Result<u64> {
        let allocation = self.allocation_mut(strategy)?;
        allocation.total_deposited = allocation.total_deposited.saturating_sub(assets);
        Ok(allocation.total_deposited)
    }

    /// Fold realized profit or loss into the recorded deposits.
    pub fn record_pnl(&mut self, strategy: &Pubkey, pnl: i64) -> Result<u64> {
        if pnl >= 0 {
            self.record_deposit(strategy, pnl as u64)
        } else {
            self.record_recovery(strategy, pnl.unsigned_abs())
        }
    }
}
