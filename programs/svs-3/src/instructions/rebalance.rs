use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::{
    error::VaultError,
    state::Vault,
    strategy::{load_strategy_ports, persist_strategy_ports, StrategyHandle, VaultSigner},
    vault::VaultLedger,
};

/// Authority instructions that move assets between the buffer and
/// strategies. Strategies are passed as remaining accounts.
#[derive(Accounts)]
pub struct ManageStrategies<'info> {
    #[account(
        constraint = authority.key() == vault.authority @ VaultError::Unauthorized,
    )]
    pub authority: Signer<'info>,

    #[account(mut)]
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

    #[account(
        constraint = shares_mint.key() == vault.shares_mint,
    )]
    pub shares_mint: InterfaceAccount<'info, Mint>,

    pub asset_token_program: Interface<'info, TokenInterface>,
}

/// Build the vault ledger over the supplied strategies, run `op`, then write
/// the strategy accounts back.
pub(crate) fn with_ledger<'info, T>(
    ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
    op: impl FnOnce(&mut VaultLedger<'_, StrategyHandle<'info>>) -> Result<T>,
) -> Result<T> {
    let accounts = ctx.accounts;
    let signer = VaultSigner::new(
        &accounts.vault,
        accounts.authority.key(),
        accounts.asset_vault.to_account_info(),
        &accounts.asset_mint,
        accounts.asset_token_program.to_account_info(),
    );
    let mut ports = load_strategy_ports(&accounts.vault, &signer, ctx.remaining_accounts)?;

    let vault_key = accounts.vault.key();
    let buffer = accounts.asset_vault.amount;
    let total_shares = accounts.shares_mint.supply;

    let out = {
        let mut ledger = VaultLedger::new(
            vault_key,
            &mut accounts.vault,
            buffer,
            total_shares,
            &mut ports,
        );
        op(&mut ledger)?
    };
    persist_strategy_ports(&ports)?;

    Ok(out)
}

/// Move assets toward every strategy's target weight
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>) -> Result<()> {
    let summary = with_ledger(ctx, |ledger| ledger.rebalance())?;

    msg!(
        "Rebalanced {} managed: {} deployed, {} recalled, {} skipped",
        summary.total_assets,
        summary.deployed,
        summary.recalled,
        summary.skipped
    );

    Ok(())
}
