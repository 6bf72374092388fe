use anchor_lang::prelude::*;

use crate::constants::{MAX_STRATEGIES, STRATEGY_SEED, VAULT_SEED};

#[account]
pub struct Vault {
    /// Vault admin who can pause, configure strategies, rebalance and harvest
    pub authority: Pubkey,
    /// Underlying asset mint
    pub asset_mint: Pubkey,
    /// LP token mint (shares)
    pub shares_mint: Pubkey,
    /// Token account holding the liquid buffer
    pub asset_vault: Pubkey,
    /// Buffer kept out of strategies before anything is deployed
    pub min_liquidity: u64,
    /// Sum of target_allocation_bps over registered strategies
    pub total_allocation_bps: u16,
    /// Virtual offset exponent for inflation attack protection
    pub decimals_offset: u8,
    /// PDA bump seed
    pub bump: u8,
    /// Emergency pause flag (blocks deposit and mint only)
    pub paused: bool,
    /// Unique vault identifier (allows multiple vaults per asset)
    pub vault_id: u64,
    /// Registered strategies in insertion order
    pub strategies: Vec<StrategyAllocation>,
    /// Reserved for future upgrades
    pub _reserved: [u8; 64],
}

impl Vault {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // authority
        32 +  // asset_mint
        32 +  // shares_mint
        32 +  // asset_vault
        8 +   // min_liquidity
        2 +   // total_allocation_bps
        1 +   // decimals_offset
        1 +   // bump
        1 +   // paused
        8 +   // vault_id
        4 + MAX_STRATEGIES * StrategyAllocation::LEN + // strategies
        64; // _reserved

    pub const SEED_PREFIX: &'static [u8] = VAULT_SEED;
}

/// Registry entry for one strategy
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyAllocation {
    /// Strategy account address
    pub strategy: Pubkey,
    /// Desired share of deployable assets, 10_000 = 100%
    pub target_allocation_bps: u16,
    /// Assets the vault believes it has placed in the strategy
    pub total_deposited: u64,
}

impl StrategyAllocation {
    pub const LEN: usize = 32 + 2 + 8;
}

/// Venue a strategy deploys into. Chosen at initialization.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// Keeps every asset in the strategy's own token account
    Idle,
}

#[account]
pub struct Strategy {
    /// May report, pause and evacuate
    pub owner: Pubkey,
    /// The only vault allowed to deposit into or withdraw from this strategy
    pub vault: Pubkey,
    /// Underlying asset mint (same as the vault's)
    pub asset_mint: Pubkey,
    /// Token account (owned by this PDA) holding idle assets
    pub asset_account: Pubkey,
    pub strategy_id: u64,
    pub kind: StrategyKind,
    /// Shares outstanding, all held by `vault`
    pub total_shares: u64,
    /// Cached balance of `asset_account`, re-synced on report
    pub idle_assets: u64,
    /// Assets placed in the external venue, as reported by the hooks
    pub deployed_assets: u64,
    pub paused: bool,
    pub bump: u8,
    pub _reserved: [u8; 32],
}

impl Strategy {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // owner
        32 +  // vault
        32 +  // asset_mint
        32 +  // asset_account
        8 +   // strategy_id
        1 +   // kind
        8 +   // total_shares
        8 +   // idle_assets
        8 +   // deployed_assets
        1 +   // paused
        1 +   // bump
        32; // _reserved

    pub const SEED_PREFIX: &'static [u8] = STRATEGY_SEED;
}
