use anchor_lang::prelude::*;

use crate::{
    error::VaultError,
    events::{StrategyAdded, StrategyReweighted},
    instructions::{
        admin::Admin,
        rebalance::{with_ledger, ManageStrategies},
    },
    state::{Strategy, Vault},
};

#[derive(Accounts)]
pub struct AddStrategy<'info> {
    #[account(
        constraint = authority.key() == vault.authority @ VaultError::Unauthorized,
    )]
    pub authority: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, Vault>,

    #[account(
        constraint = strategy.vault == vault.key() @ VaultError::StrategyVaultMismatch,
        constraint = strategy.asset_mint == vault.asset_mint @ VaultError::StrategyVaultMismatch,
    )]
    pub strategy: Account<'info, Strategy>,
}

/// Register a strategy bound to this vault with a target weight
pub fn add_strategy(ctx: Context<AddStrategy>, weight_bps: u16) -> Result<()> {
    let strategy = ctx.accounts.strategy.key();
    let vault = &mut ctx.accounts.vault;

    vault.register_strategy(strategy, weight_bps)?;

    emit!(StrategyAdded {
        vault: vault.key(),
        strategy,
        target_allocation_bps: weight_bps,
        total_allocation_bps: vault.total_allocation_bps,
    });

    Ok(())
}

/// Replace a registered strategy's weight. Capital moves on the next rebalance.
pub fn update_allocation(ctx: Context<Admin>, strategy: Pubkey, new_bps: u16) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    let previous_bps = vault.update_allocation(&strategy, new_bps)?;

    emit!(StrategyReweighted {
        vault: vault.key(),
        strategy,
        previous_bps,
        new_bps,
        total_allocation_bps: vault.total_allocation_bps,
    });

    Ok(())
}

/// Evacuate a strategy into the buffer and deregister it.
/// A strategy with recorded deposits must be passed in remaining accounts.
pub fn remove_strategy<'info>(
    ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
    strategy: Pubkey,
) -> Result<()> {
    let recovered = with_ledger(ctx, |ledger| ledger.remove_strategy(&strategy))?;
    msg!("Removed strategy {}, recovered {}", strategy, recovered);
    Ok(())
}
