use anchor_lang::prelude::*;

use crate::state::StrategyKind;

/// Balances a venue hook may move between the strategy's token account
/// (`idle`) and its external venue (`deployed`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VenueBalances {
    pub idle: u64,
    pub deployed: u64,
}

/// Points where a concrete strategy plugs into the accounting unit.
///
/// The defaults describe a strategy that never leaves its token account.
pub trait StrategyHooks {
    /// Invest up to `assets` of the idle balance.
    fn deploy_funds(&self, _balances: &mut VenueBalances, _assets: u64) -> Result<()> {
        Ok(())
    }

    /// Recall up to `assets` into the idle balance. Returns what is now
    /// withdrawable for the request, which may be less than asked.
    fn free_funds(&self, balances: &mut VenueBalances, assets: u64) -> Result<u64> {
        Ok(assets.min(balances.idle))
    }

    /// Assets currently held in the venue.
    fn deployed_assets(&self, _balances: &VenueBalances) -> u64 {
        0
    }

    /// Pull venue rewards into the idle balance, returning the amount pulled.
    fn harvest_rewards(&self, _balances: &mut VenueBalances) -> Result<u64> {
        Ok(0)
    }
}

pub struct IdleHooks;

impl StrategyHooks for IdleHooks {}

impl StrategyHooks for StrategyKind {
    fn deploy_funds(&self, balances: &mut VenueBalances, assets: u64) -> Result<()> {
        match self {
            StrategyKind::Idle => IdleHooks.deploy_funds(balances, assets),
        }
    }

    fn free_funds(&self, balances: &mut VenueBalances, assets: u64) -> Result<u64> {
        match self {
            StrategyKind::Idle => IdleHooks.free_funds(balances, assets),
        }
    }

    fn deployed_assets(&self, balances: &VenueBalances) -> u64 {
        match self {
            StrategyKind::Idle => IdleHooks.deployed_assets(balances),
        }
    }

    fn harvest_rewards(&self, balances: &mut VenueBalances) -> Result<u64> {
        match self {
            StrategyKind::Idle => IdleHooks.harvest_rewards(balances),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_free_funds_capped_by_idle() {
        let mut balances = VenueBalances {
            idle: 300,
            deployed: 0,
        };
        assert_eq!(StrategyKind::Idle.free_funds(&mut balances, 100).unwrap(), 100);
        assert_eq!(StrategyKind::Idle.free_funds(&mut balances, 500).unwrap(), 300);
        assert_eq!(StrategyKind::Idle.free_funds(&mut balances, u64::MAX).unwrap(), 300);
    }

    #[test]
    fn test_idle_keeps_assets_in_place() {
        let mut balances = VenueBalances {
            idle: 300,
            deployed: 0,
        };
        StrategyKind::Idle.deploy_funds(&mut balances, 300).unwrap();
        assert_eq!(balances.idle, 300);
        assert_eq!(StrategyKind::Idle.deployed_assets(&balances), 0);
        assert_eq!(StrategyKind::Idle.harvest_rewards(&mut balances).unwrap(), 0);
    }
}
