use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::{
    constants::STRATEGY_SEED,
    error::VaultError,
    events::{StrategyEvacuated, StrategyInitialized, StrategyReported, StrategyStatusChanged},
    state::{Strategy, StrategyKind, Vault},
    strategy::port::transfer_from_strategy,
};

#[derive(Accounts)]
#[instruction(strategy_id: u64)]
pub struct InitializeStrategy<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Vault this strategy is permanently bound to
    pub vault: Account<'info, Vault>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = owner,
        space = Strategy::LEN,
        seeds = [STRATEGY_SEED, vault.key().as_ref(), &strategy_id.to_le_bytes()],
        bump
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(
        init,
        payer = owner,
        associated_token::mint = asset_mint,
        associated_token::authority = strategy,
        associated_token::token_program = asset_token_program,
    )]
    pub strategy_asset_account: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn initialize_strategy(
    ctx: Context<InitializeStrategy>,
    strategy_id: u64,
    kind: StrategyKind,
) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    strategy.owner = ctx.accounts.owner.key();
    strategy.vault = ctx.accounts.vault.key();
    strategy.asset_mint = ctx.accounts.asset_mint.key();
    strategy.asset_account = ctx.accounts.strategy_asset_account.key();
    strategy.strategy_id = strategy_id;
    strategy.kind = kind;
    strategy.total_shares = 0;
    strategy.idle_assets = 0;
    strategy.deployed_assets = 0;
    strategy.paused = false;
    strategy.bump = ctx.bumps.strategy;
    strategy._reserved = [0u8; 32];

    emit!(StrategyInitialized {
        strategy: strategy.key(),
        owner: strategy.owner,
        vault: strategy.vault,
        strategy_id,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct StrategyOwner<'info> {
    #[account(
        constraint = owner.key() == strategy.owner @ VaultError::Unauthorized,
    )]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub strategy: Account<'info, Strategy>,
}

pub fn pause_strategy(ctx: Context<StrategyOwner>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let strategy = &mut ctx.accounts.strategy;

    strategy.pause(&owner)?;

    emit!(StrategyStatusChanged {
        strategy: strategy.key(),
        paused: true,
    });

    Ok(())
}

pub fn unpause_strategy(ctx: Context<StrategyOwner>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let strategy = &mut ctx.accounts.strategy;

    strategy.unpause(&owner)?;

    emit!(StrategyStatusChanged {
        strategy: strategy.key(),
        paused: false,
    });

    Ok(())
}

/// Owner-side access to a strategy's funds and the vault it reports to
#[derive(Accounts)]
pub struct StrategyFunds<'info> {
    #[account(
        constraint = owner.key() == strategy.owner @ VaultError::Unauthorized,
    )]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub strategy: Account<'info, Strategy>,

    #[account(
        mut,
        constraint = strategy_asset_account.key() == strategy.asset_account
            @ VaultError::StrategyVaultMismatch,
    )]
    pub strategy_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault.key() == strategy.vault @ VaultError::StrategyVaultMismatch,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
}

/// Re-sync the strategy with its token account and report the PnL.
/// A registered strategy's recorded deposits follow the report.
pub fn report_strategy(ctx: Context<StrategyFunds>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let observed = ctx.accounts.strategy_asset_account.amount;
    let strategy_key = ctx.accounts.strategy.key();

    let report = ctx.accounts.strategy.realize_yield(&owner, observed)?;

    let vault = &mut ctx.accounts.vault;
    if vault.is_active(&strategy_key) {
        vault.record_pnl(&strategy_key, report.pnl)?;
    }

    emit!(StrategyReported {
        strategy: strategy_key,
        total_assets: report.total_assets,
        pnl: report.pnl,
    });

    Ok(())
}

/// Pull everything out of the venue and send it to the vault buffer.
/// The strategy stays registered; the vault's recorded deposits drop by
/// what was recovered.
pub fn emergency_evacuate(ctx: Context<StrategyFunds>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let observed = ctx.accounts.strategy_asset_account.amount;
    let strategy_key = ctx.accounts.strategy.key();

    let recovered = ctx.accounts.strategy.emergency_evacuate(&owner, observed)?;

    if recovered > 0 {
        transfer_from_strategy(
            &ctx.accounts.strategy,
            ctx.accounts.strategy_asset_account.to_account_info(),
            ctx.accounts.asset_vault.to_account_info(),
            ctx.accounts.asset_mint.to_account_info(),
            ctx.accounts.asset_mint.decimals,
            ctx.accounts.asset_token_program.to_account_info(),
            recovered,
        )?;
    }

    let vault = &mut ctx.accounts.vault;
    if vault.is_active(&strategy_key) {
        vault.record_recovery(&strategy_key, recovered)?;
    }

    emit!(StrategyEvacuated {
        strategy: strategy_key,
        vault: vault.key(),
        assets: recovered,
    });

    Ok(())
}
