use anchor_lang::prelude::*;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub shares_mint: Pubkey,
    pub vault_id: u64,
    pub min_liquidity: u64,
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

#[event]
pub struct Deposit {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct Withdraw {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct VaultStatusChanged {
    pub vault: Pubkey,
    pub paused: bool,
}

#[event]
pub struct AuthorityTransferred {
    pub vault: Pubkey,
    pub previous_authority: Pubkey,
    pub new_authority: Pubkey,
}

#[event]
pub struct MinLiquidityUpdated {
    pub vault: Pubkey,
    pub previous_min_liquidity: u64,
    pub new_min_liquidity: u64,
}

#[event]
pub struct StrategyAdded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub target_allocation_bps: u16,
    pub total_allocation_bps: u16,
}

#[event]
pub struct StrategyRemoved {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub recovered: u64,
    pub total_allocation_bps: u16,
}

#[event]
pub struct StrategyReweighted {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub previous_bps: u16,
    pub new_bps: u16,
    pub total_allocation_bps: u16,
}

/// Assets moved from the buffer into a strategy
#[event]
pub struct StrategyFunded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub assets: u64,
    pub total_deposited: u64,
}

/// Assets moved from a strategy back into the buffer
#[event]
pub struct StrategyDefunded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub assets: u64,
    pub total_deposited: u64,
}

/// A best-effort strategy call failed and was skipped
#[event]
pub struct StrategySkipped {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub requested: u64,
}

#[event]
pub struct Rebalanced {
    pub vault: Pubkey,
    pub total_assets: u64,
    pub deployed: u64,
    pub recalled: u64,
    pub skipped: u8,
}

#[event]
pub struct HarvestExecuted {
    pub vault: Pubkey,
    pub pnl: i64,
    pub harvested: u8,
    pub skipped: u8,
}

#[event]
pub struct StrategyInitialized {
    pub strategy: Pubkey,
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub strategy_id: u64,
}

#[event]
pub struct StrategyReported {
    pub strategy: Pubkey,
    pub total_assets: u64,
    pub pnl: i64,
}

#[event]
pub struct StrategyStatusChanged {
    pub strategy: Pubkey,
    pub paused: bool,
}

#[event]
pub struct StrategyEvacuated {
    pub strategy: Pubkey,
    pub vault: Pubkey,
    pub assets: u64,
}
