use anchor_lang::prelude::*;

use crate::{
    error::VaultError,
    events::{AuthorityTransferred, MinLiquidityUpdated, VaultStatusChanged},
    state::Vault,
};

#[derive(Accounts)]
pub struct Admin<'info> {
    #[account(
        constraint = authority.key() == vault.authority @ VaultError::Unauthorized,
    )]
    pub authority: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, Vault>,
}

/// Block deposit and mint (emergency circuit breaker). Exits stay open.
pub fn pause(ctx: Context<Admin>) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    require!(!vault.paused, VaultError::VaultPaused);

    vault.paused = true;

    emit!(VaultStatusChanged {
        vault: vault.key(),
        paused: true,
    });

    Ok(())
}

pub fn unpause(ctx: Context<Admin>) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    require!(vault.paused, VaultError::VaultNotPaused);

    vault.paused = false;

    emit!(VaultStatusChanged {
        vault: vault.key(),
        paused: false,
    });

    Ok(())
}

/// Transfer vault authority to new address
pub fn transfer_authority(ctx: Context<Admin>, new_authority: Pubkey) -> Result<()> {
    require_keys_neq!(new_authority, Pubkey::default(), VaultError::InvalidAddress);

    let vault = &mut ctx.accounts.vault;
    let previous_authority = vault.authority;

    vault.authority = new_authority;

    emit!(AuthorityTransferred {
        vault: vault.key(),
        previous_authority,
        new_authority,
    });

    Ok(())
}

/// Change the buffer floor kept out of strategies. Applies from the next rebalance.
pub fn set_min_liquidity(ctx: Context<Admin>, min_liquidity: u64) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let previous_min_liquidity = vault.min_liquidity;

    vault.min_liquidity = min_liquidity;

    emit!(MinLiquidityUpdated {
        vault: vault.key(),
        previous_min_liquidity,
        new_min_liquidity: min_liquidity,
    });

    Ok(())
}
