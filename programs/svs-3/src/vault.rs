//! Vault ledger: share accounting over the buffer plus every registered
//! strategy, with the rebalancer and the liquidity router wired in as the
//! after-deposit and before-withdraw hooks.
//!
//! The ledger only does bookkeeping and strategy calls. Instruction
//! handlers move the depositor's tokens and mint or burn shares around it.

use anchor_lang::prelude::*;

use crate::{
    error::VaultError,
    events::{HarvestExecuted, StrategyRemoved, StrategySkipped},
    ledger::ShareLedger,
    state::Vault,
    strategy::StrategyPort,
};

/// Outcome of a harvest over every registered strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub pnl: i64,
    pub harvested: u8,
    pub skipped: u8,
}

pub struct VaultLedger<'a, P: StrategyPort> {
    pub vault_key: Pubkey,
    pub vault: &'a mut Vault,
    pub(crate) buffer: u64,
    pub(crate) total_supply: u64,
    pub(crate) ports: &'a mut [P],
}

impl<'a, P: StrategyPort> VaultLedger<'a, P> {
    /// `buffer` is the vault's asset balance and `total_supply` the shares
    /// supply, both read before the instruction moves any tokens.
    pub fn new(
        vault_key: Pubkey,
        vault: &'a mut Vault,
        buffer: u64,
        total_supply: u64,
        ports: &'a mut [P],
    ) -> Self {
        Self {
            vault_key,
            vault,
            buffer,
            total_supply,
            ports,
        }
    }

    pub fn buffer(&self) -> u64 {
        self.buffer
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Buffer plus each strategy's live value, or its recorded deposits when
    /// the strategy can't be valued or wasn't supplied. Share pricing goes
    /// through `priced_total_assets`, which refuses the second case.
    pub fn total_managed_assets(&self) -> Result<u64> {
        let mut total = self.buffer;

        for allocation in self.vault.strategies() {
            let value = match self.ports.iter().find(|p| p.key() == allocation.strategy) {
                Some(port) => port.managed_assets().unwrap_or_else(|err| {
                    msg!(
                        "Valuing strategy {} at recorded deposits: {}",
                        allocation.strategy,
                        err
                    );
                    allocation.total_deposited
                }),
                None => allocation.total_deposited,
            };
            total = total.checked_add(value).ok_or(VaultError::MathOverflow)?;
        }

        Ok(total)
    }

    fn require_all_strategies(&self) -> Result<()> {
        for allocation in self.vault.strategies() {
            require!(
                self.ports.iter().any(|p| p.key() == allocation.strategy),
                VaultError::MissingStrategyAccounts
            );
        }
        Ok(())
    }

    /// Total managed assets with every registered strategy supplied
    pub fn priced_total_assets(&self) -> Result<u64> {
        self.require_all_strategies()?;
        self.total_managed_assets()
    }

    pub fn share_ledger(&self) -> Result<ShareLedger> {
        Ok(ShareLedger::new(
            self.priced_total_assets()?,
            self.total_supply,
            self.vault.decimals_offset,
        ))
    }

    pub fn max_deposit(&self) -> u64 {
        if self.vault.paused {
            0
        } else {
            u64::MAX
        }
    }

    pub fn max_mint(&self) -> u64 {
        self.max_deposit()
    }

    /// Exits are never blocked by pause
    pub fn max_withdraw(&self, owner_shares: u64) -> Result<u64> {
        self.share_ledger()?.max_withdraw(owner_shares)
    }

    pub fn max_redeem(&self, owner_shares: u64) -> u64 {
        owner_shares
    }

    /// Accept `assets` into the buffer, returning shares to mint (floor)
    pub fn deposit(&mut self, assets: u64) -> Result<u64> {
        require!(!self.vault.paused, VaultError::VaultPaused);
        if assets == 0 {
            msg!("Zero-asset deposit, nothing to do");
            return Ok(0);
        }

        let shares = self.share_ledger()?.preview_deposit(assets)?;
        self.credit(assets, shares)?;
        self.after_deposit()?;
        Ok(shares)
    }

    /// Accept assets for exactly `shares`, returning assets charged (ceiling)
    pub fn mint(&mut self, shares: u64) -> Result<u64> {
        require!(!self.vault.paused, VaultError::VaultPaused);
        if shares == 0 {
            msg!("Zero-share mint, nothing to do");
            return Ok(0);
        }

        let assets = self.share_ledger()?.preview_mint(shares)?;
        self.credit(assets, shares)?;
        self.after_deposit()?;
        Ok(assets)
    }

    /// Release exactly `assets` from the buffer, returning shares to burn (ceiling)
    pub fn withdraw(&mut self, assets: u64, owner_shares: u64) -> Result<u64> {
        if assets == 0 {
            msg!("Zero-asset withdraw, nothing to do");
            return Ok(0);
        }

        let shares = self.share_ledger()?.preview_withdraw(assets)?;
        require!(shares <= owner_shares, VaultError::InsufficientShares);

        self.before_withdraw(assets)?;
        self.debit(assets, shares)?;
        Ok(shares)
    }

    /// Burn `shares`, returning assets to release from the buffer (floor)
    pub fn redeem(&mut self, shares: u64, owner_shares: u64) -> Result<u64> {
        if shares == 0 {
            msg!("Zero-share redeem, nothing to do");
            return Ok(0);
        }
        require!(shares <= owner_shares, VaultError::InsufficientShares);

        let assets = self.share_ledger()?.preview_redeem(shares)?;

        self.before_withdraw(assets)?;
        self.debit(assets, shares)?;
        Ok(assets)
    }

    fn credit(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.buffer = self
            .buffer
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.total_supply = self
            .total_supply
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    fn debit(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.buffer = self
            .buffer
            .checked_sub(assets)
            .ok_or(VaultError::InsufficientLiquidity)?;
        self.total_supply = self
            .total_supply
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Runs after new assets land in the buffer
    fn after_deposit(&mut self) -> Result<()> {
        self.rebalance()?;
        Ok(())
    }

    /// Runs before assets leave the buffer
    fn before_withdraw(&mut self, assets: u64) -> Result<()> {
        self.source_liquidity(assets)?;
        Ok(())
    }

    /// Realize yield on every registered strategy, in registry order.
    /// A strategy that fails or wasn't supplied is skipped.
    pub fn harvest_all(&mut self) -> Result<HarvestSummary> {
        let mut summary = HarvestSummary::default();

        for index in 0..self.vault.strategies.len() {
            let strategy = self.vault.strategies[index].strategy;

            let Some(port) = self.ports.iter_mut().find(|p| p.key() == strategy) else {
                msg!("Harvest skipped {}: accounts not supplied", strategy);
                summary.skipped = summary.skipped.saturating_add(1);
                continue;
            };

            match port.realize_yield() {
                Ok(report) => {
                    self.vault.record_pnl(&strategy, report.pnl)?;
                    summary.pnl = summary
                        .pnl
                        .checked_add(report.pnl)
                        .ok_or(VaultError::MathOverflow)?;
                    summary.harvested = summary.harvested.saturating_add(1);
                }
                Err(err) => {
                    msg!("Harvest skipped {}: {}", strategy, err);
                    emit!(StrategySkipped {
                        vault: self.vault_key,
                        strategy,
                        requested: 0,
                    });
                    summary.skipped = summary.skipped.saturating_add(1);
                }
            }
        }

        emit!(HarvestExecuted {
            vault: self.vault_key,
            pnl: summary.pnl,
            harvested: summary.harvested,
            skipped: summary.skipped,
        });

        Ok(summary)
    }

    /// Realize yield on one strategy. Failures propagate.
    pub fn harvest(&mut self, strategy: &Pubkey) -> Result<i64> {
        require!(
            self.vault.is_active(strategy),
            VaultError::StrategyNotRegistered
        );
        let port = self
            .ports
            .iter_mut()
            .find(|p| p.key() == *strategy)
            .ok_or(VaultError::InvalidStrategyAccounts)?;

        let report = port.realize_yield()?;
        self.vault.record_pnl(strategy, report.pnl)?;

        emit!(HarvestExecuted {
            vault: self.vault_key,
            pnl: report.pnl,
            harvested: 1,
            skipped: 0,
        });

        Ok(report.pnl)
    }

    /// Evacuate `strategy` into the buffer and deregister it.
    /// Returns the assets recovered.
    pub fn remove_strategy(&mut self, strategy: &Pubkey) -> Result<u64> {
        let recorded = self
            .vault
            .allocation(strategy)
            .ok_or(VaultError::StrategyNotRegistered)?
            .total_deposited;

        let recovered = match self.ports.iter_mut().find(|p| p.key() == *strategy) {
            Some(port) => {
                if recorded > 0 || port.managed_assets()? > 0 {
                    port.emergency_evacuate()?
                } else {
                    0
                }
            }
            None => {
                require!(recorded == 0, VaultError::InvalidStrategyAccounts);
                0
            }
        };

        self.buffer = self
            .buffer
            .checked_add(recovered)
            .ok_or(VaultError::MathOverflow)?;
        self.vault.deregister_strategy(strategy)?;

        emit!(StrategyRemoved {
            vault: self.vault_key,
            strategy: *strategy,
            recovered,
            total_allocation_bps: self.vault.total_allocation_bps,
        });

        Ok(recovered)
    }
}
