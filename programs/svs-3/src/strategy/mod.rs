//! Strategy accounting unit: a single-holder share ledger whose only
//! depositor is the vault the strategy was initialized for.
//!
//! State transitions are computed in full before anything is written back,
//! so an `Err` leaves the account untouched and the caller may skip it.

pub mod hooks;
pub mod port;

use anchor_lang::prelude::*;

use crate::{constants::DECIMALS_OFFSET, error::VaultError, ledger::ShareLedger, state::Strategy};

pub use hooks::{StrategyHooks, VenueBalances};
pub use port::{load_strategy_ports, persist_strategy_ports, StrategyHandle, StrategyPort, VaultSigner};

/// Outcome of a yield realization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyReport {
    pub total_assets: u64,
    pub pnl: i64,
}

impl Strategy {
    fn balances(&self) -> VenueBalances {
        VenueBalances {
            idle: self.idle_assets,
            deployed: self.deployed_assets,
        }
    }

    fn commit(&mut self, balances: VenueBalances, total_shares: u64) {
        self.idle_assets = balances.idle;
        self.deployed_assets = self.kind.deployed_assets(&balances);
        self.total_shares = total_shares;
    }

    /// idle + hook-reported deployed assets, as last recorded
    pub fn managed_assets(&self) -> Result<u64> {
        self.managed_assets_observed(self.idle_assets)
    }

    /// Managed assets with the idle balance read from the token account
    pub fn managed_assets_observed(&self, observed_idle: u64) -> Result<u64> {
        let balances = VenueBalances {
            idle: observed_idle,
            deployed: self.deployed_assets,
        };
        let deployed = self.kind.deployed_assets(&balances);
        observed_idle
            .checked_add(deployed)
            .ok_or(VaultError::MathOverflow.into())
    }

    pub fn ledger(&self) -> Result<ShareLedger> {
        Ok(ShareLedger::new(
            self.managed_assets()?,
            self.total_shares,
            DECIMALS_OFFSET,
        ))
    }

    pub fn max_deposit(&self) -> u64 {
        if self.paused {
            0
        } else {
            u64::MAX
        }
    }

    pub fn max_mint(&self) -> u64 {
        self.max_deposit()
    }

    /// Assets the vault can pull out right now. The bound vault holds every
    /// share, so this is everything recorded. Pausing does not limit this.
    pub fn max_withdraw(&self) -> Result<u64> {
        self.managed_assets()
    }

    /// `max_withdraw`, further capped by what the token account really holds
    pub fn max_withdraw_observed(&self, observed_idle: u64) -> Result<u64> {
        Ok(self
            .max_withdraw()?
            .min(self.managed_assets_observed(observed_idle)?))
    }

    fn require_vault(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.vault, VaultError::UnboundVault);
        Ok(())
    }

    fn require_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.owner, VaultError::Unauthorized);
        Ok(())
    }

    /// Take `assets` from the vault, returning shares minted (floor)
    pub fn deposit(&mut self, caller: &Pubkey, assets: u64) -> Result<u64> {
        self.require_vault(caller)?;
        require!(!self.paused, VaultError::StrategyPaused);
        if assets == 0 {
            return Ok(0);
        }

        let shares = self.ledger()?.preview_deposit(assets)?;
        self.credit(assets, shares)?;
        Ok(shares)
    }

    /// Mint exactly `shares` to the vault, returning assets charged (ceiling)
    pub fn mint(&mut self, caller: &Pubkey, shares: u64) -> Result<u64> {
        self.require_vault(caller)?;
        require!(!self.paused, VaultError::StrategyPaused);
        if shares == 0 {
            return Ok(0);
        }

        let assets = self.ledger()?.preview_mint(shares)?;
        self.credit(assets, shares)?;
        Ok(assets)
    }

    /// Release exactly `assets` to the vault, returning shares burned (ceiling)
    pub fn withdraw(&mut self, caller: &Pubkey, assets: u64) -> Result<u64> {
        self.require_vault(caller)?;
        if assets == 0 {
            return Ok(0);
        }

        let shares = self
            .ledger()?
            .preview_withdraw(assets)?
            .min(self.total_shares);
        self.debit(assets, shares)?;
        Ok(shares)
    }

    /// Burn `shares`, returning assets released to the vault (floor)
    pub fn redeem(&mut self, caller: &Pubkey, shares: u64) -> Result<u64> {
        self.require_vault(caller)?;
        if shares == 0 {
            return Ok(0);
        }

        let assets = self.ledger()?.preview_redeem(shares)?;
        self.debit(assets, shares)?;
        Ok(assets)
    }

    fn credit(&mut self, assets: u64, shares: u64) -> Result<()> {
        let mut balances = self.balances();
        balances.idle = balances
            .idle
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        let total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;

        self.kind.deploy_funds(&mut balances, assets)?;

        self.commit(balances, total_shares);
        Ok(())
    }

    fn debit(&mut self, assets: u64, shares: u64) -> Result<()> {
        require!(shares <= self.total_shares, VaultError::InsufficientShares);

        let mut balances = self.balances();
        let available = self.kind.free_funds(&mut balances, assets)?;
        require!(available >= assets, VaultError::InsufficientLiquidity);

        balances.idle = balances
            .idle
            .checked_sub(assets)
            .ok_or(VaultError::InsufficientLiquidity)?;

        self.commit(balances, self.total_shares - shares);
        Ok(())
    }

    /// Re-sync the idle balance with the token account, pull venue rewards
    /// and report the change in managed assets. Owner only.
    pub fn realize_yield(&mut self, caller: &Pubkey, observed_idle: u64) -> Result<StrategyReport> {
        self.require_owner(caller)?;

        let before = self.managed_assets()?;

        let mut balances = VenueBalances {
            idle: observed_idle,
            deployed: self.deployed_assets,
        };
        let rewards = self.kind.harvest_rewards(&mut balances)?;
        if rewards > 0 {
            msg!("Strategy harvested {} in venue rewards", rewards);
        }

        self.commit(balances, self.total_shares);
        let total_assets = self.managed_assets()?;
        let pnl = i64::try_from(total_assets as i128 - before as i128)
            .map_err(|_| VaultError::MathOverflow)?;

        Ok(StrategyReport { total_assets, pnl })
    }

    /// Recall everything the venue will release and hand it all to the vault.
    /// Returns the assets leaving the strategy. Owner only.
    pub fn emergency_evacuate(&mut self, caller: &Pubkey, observed_idle: u64) -> Result<u64> {
        self.require_owner(caller)?;

        let mut balances = VenueBalances {
            idle: observed_idle,
            deployed: self.deployed_assets,
        };
        self.kind.free_funds(&mut balances, u64::MAX)?;
        let recovered = balances.idle;

        balances.idle = 0;
        let remaining = self.kind.deployed_assets(&balances);
        let total_shares = if remaining == 0 {
            0
        } else {
            let ledger = ShareLedger::new(
                remaining
                    .checked_add(recovered)
                    .ok_or(VaultError::MathOverflow)?,
                self.total_shares,
                DECIMALS_OFFSET,
            );
            let burned = ledger.preview_withdraw(recovered)?.min(self.total_shares);
            self.total_shares - burned
        };

        self.commit(balances, total_shares);
        Ok(recovered)
    }

    pub fn pause(&mut self, caller: &Pubkey) -> Result<()> {
        self.require_owner(caller)?;
        require!(!self.paused, VaultError::StrategyPaused);
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Pubkey) -> Result<()> {
        self.require_owner(caller)?;
        require!(self.paused, VaultError::StrategyNotPaused);
        self.paused = false;
        Ok(())
    }
}
