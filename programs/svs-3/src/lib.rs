use anchor_lang::prelude::*;

pub mod allocator;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod math;
pub mod registry;
pub mod router;
pub mod state;
pub mod strategy;
pub mod vault;

#[cfg(test)]
mod testing;

use instructions::*;
use state::StrategyKind;

declare_id!("D4frbnafGk5aZWYzKbFvTX8XbyseK1cPbEG1gTWGHyYB");

#[program]
pub mod svs_3 {
    use super::*;

    /// Initialize a new vault for the given asset
    pub fn initialize(
        ctx: Context<Initialize>,
        vault_id: u64,
        name: String,
        symbol: String,
        uri: String,
        min_liquidity: u64,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, vault_id, name, symbol, uri, min_liquidity)
    }

    /// Deposit assets and receive shares, then deploy toward target weights
    /// Returns shares minted (floor rounding - favors vault)
    pub fn deposit<'info>(
        ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
        assets: u64,
        min_shares_out: u64,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, assets, min_shares_out)
    }

    /// Mint exact shares by depositing required assets
    /// Pays assets (ceiling rounding - favors vault)
    pub fn mint<'info>(
        ctx: Context<'_, '_, 'info, 'info, MintShares<'info>>,
        shares: u64,
        max_assets_in: u64,
    ) -> Result<()> {
        instructions::mint::handler(ctx, shares, max_assets_in)
    }

    /// Withdraw exact assets by burning required shares
    /// Burns shares (ceiling rounding - favors vault)
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        assets: u64,
        max_shares_in: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, assets, max_shares_in)
    }

    /// Redeem shares for assets
    /// Receives assets (floor rounding - favors vault)
    pub fn redeem<'info>(
        ctx: Context<'_, '_, 'info, 'info, Redeem<'info>>,
        shares: u64,
        min_assets_out: u64,
    ) -> Result<()> {
        instructions::redeem::handler(ctx, shares, min_assets_out)
    }

    /// Pause deposits and mints (emergency)
    pub fn pause(ctx: Context<Admin>) -> Result<()> {
        instructions::admin::pause(ctx)
    }

    /// Unpause vault operations
    pub fn unpause(ctx: Context<Admin>) -> Result<()> {
        instructions::admin::unpause(ctx)
    }

    /// Transfer vault authority
    pub fn transfer_authority(ctx: Context<Admin>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::transfer_authority(ctx, new_authority)
    }

    /// Set the buffer kept out of strategies
    pub fn set_min_liquidity(ctx: Context<Admin>, min_liquidity: u64) -> Result<()> {
        instructions::admin::set_min_liquidity(ctx, min_liquidity)
    }

    // ============ Strategy Registry ============

    /// Register a strategy with a target weight in bps
    pub fn add_strategy(ctx: Context<AddStrategy>, weight_bps: u16) -> Result<()> {
        instructions::allocation::add_strategy(ctx, weight_bps)
    }

    /// Change a registered strategy's target weight
    pub fn update_allocation(ctx: Context<Admin>, strategy: Pubkey, new_bps: u16) -> Result<()> {
        instructions::allocation::update_allocation(ctx, strategy, new_bps)
    }

    /// Evacuate and deregister a strategy
    pub fn remove_strategy<'info>(
        ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
        strategy: Pubkey,
    ) -> Result<()> {
        instructions::allocation::remove_strategy(ctx, strategy)
    }

    /// Move assets between the buffer and strategies toward target weights
    pub fn rebalance<'info>(
        ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
    ) -> Result<()> {
        instructions::rebalance::handler(ctx)
    }

    /// Realize yield on every supplied strategy, skipping failures
    pub fn harvest_all<'info>(
        ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
    ) -> Result<()> {
        instructions::harvest::harvest_all(ctx)
    }

    /// Realize yield on one strategy
    pub fn harvest<'info>(
        ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
        strategy: Pubkey,
    ) -> Result<()> {
        instructions::harvest::harvest(ctx, strategy)
    }

    // ============ Strategy Owner ============

    /// Create a strategy bound to a vault
    pub fn initialize_strategy(
        ctx: Context<InitializeStrategy>,
        strategy_id: u64,
        kind: StrategyKind,
    ) -> Result<()> {
        instructions::strategy::initialize_strategy(ctx, strategy_id, kind)
    }

    /// Re-sync a strategy with its token account and report PnL
    pub fn report_strategy(ctx: Context<StrategyFunds>) -> Result<()> {
        instructions::strategy::report_strategy(ctx)
    }

    /// Block new deposits into a strategy
    pub fn pause_strategy(ctx: Context<StrategyOwner>) -> Result<()> {
        instructions::strategy::pause_strategy(ctx)
    }

    pub fn unpause_strategy(ctx: Context<StrategyOwner>) -> Result<()> {
        instructions::strategy::unpause_strategy(ctx)
    }

    /// Send everything a strategy holds back to its vault's buffer
    pub fn emergency_evacuate(ctx: Context<StrategyFunds>) -> Result<()> {
        instructions::strategy::emergency_evacuate(ctx)
    }

    // ============ View Functions (CPI composable) ============

    /// Preview shares for deposit (floor rounding)
    pub fn preview_deposit<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
        assets: u64,
    ) -> Result<()> {
        instructions::view::preview_deposit(ctx, assets)
    }

    /// Preview assets required for mint (ceiling rounding)
    pub fn preview_mint<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
        shares: u64,
    ) -> Result<()> {
        instructions::view::preview_mint(ctx, shares)
    }

    /// Preview shares to burn for withdraw (ceiling rounding)
    pub fn preview_withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
        assets: u64,
    ) -> Result<()> {
        instructions::view::preview_withdraw(ctx, assets)
    }

    /// Preview assets for redeem (floor rounding)
    pub fn preview_redeem<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
        shares: u64,
    ) -> Result<()> {
        instructions::view::preview_redeem(ctx, shares)
    }

    /// Convert assets to shares (floor rounding)
    pub fn convert_to_shares<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
        assets: u64,
    ) -> Result<()> {
        instructions::view::convert_to_shares_view(ctx, assets)
    }

    /// Convert shares to assets (floor rounding)
    pub fn convert_to_assets<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
        shares: u64,
    ) -> Result<()> {
        instructions::view::convert_to_assets_view(ctx, shares)
    }

    /// Get total assets managed by the vault, buffer plus strategies
    pub fn total_assets<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    ) -> Result<()> {
        instructions::view::get_total_assets(ctx)
    }

    /// Max assets depositable (u64::MAX or 0 if paused)
    pub fn max_deposit<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    ) -> Result<()> {
        instructions::view::max_deposit(ctx)
    }

    /// Max shares mintable (u64::MAX or 0 if paused)
    pub fn max_mint<'info>(ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>) -> Result<()> {
        instructions::view::max_mint(ctx)
    }

    /// Max assets owner can withdraw
    pub fn max_withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultViewWithOwner<'info>>,
    ) -> Result<()> {
        instructions::view::max_withdraw(ctx)
    }

    /// Max shares owner can redeem
    pub fn max_redeem<'info>(
        ctx: Context<'_, '_, 'info, 'info, VaultViewWithOwner<'info>>,
    ) -> Result<()> {
        instructions::view::max_redeem(ctx)
    }
}
