use anchor_lang::prelude::*;
use anchor_spl::{
    token_2022::{self, Burn, Token2022},
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::{
    error::VaultError,
    events::Withdraw as WithdrawEvent,
    instructions::withdraw::spendable_shares,
    state::Vault,
    strategy::{load_strategy_ports, persist_strategy_ports, VaultSigner},
    vault::VaultLedger,
};

#[derive(Accounts)]
pub struct Redeem<'info> {
    /// Owner of the shares, or a delegate approved on the owner's shares account
    pub caller: Signer<'info>,

    #[account(mut)]
    pub vault: Account<'info, Vault>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault.asset_mint,
    )]
    pub receiver_asset_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.key() == vault.asset_vault,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = shares_mint.key() == vault.shares_mint,
    )]
    pub shares_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = owner_shares_account.mint == vault.shares_mint,
    )]
    pub owner_shares_account: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub token_2022_program: Program<'info, Token2022>,
}

/// Redeem shares for assets (floor rounding - protects vault)
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Redeem<'info>>,
    shares: u64,
    min_assets_out: u64,
) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    let owner_account = &ctx.accounts.owner_shares_account;
    let owner = owner_account.owner;
    let owner_shares = spendable_shares(
        &caller,
        &owner,
        owner_account.amount,
        owner_account.delegate,
        owner_account.delegated_amount,
    );

    let signer = VaultSigner::new(
        &ctx.accounts.vault,
        ctx.accounts.vault.authority,
        ctx.accounts.asset_vault.to_account_info(),
        &ctx.accounts.asset_mint,
        ctx.accounts.asset_token_program.to_account_info(),
    );
    let mut ports = load_strategy_ports(&ctx.accounts.vault, &signer, ctx.remaining_accounts)?;

    let vault_key = ctx.accounts.vault.key();
    let buffer = ctx.accounts.asset_vault.amount;
    let total_shares = ctx.accounts.shares_mint.supply;

    let assets = {
        let mut ledger = VaultLedger::new(
            vault_key,
            &mut ctx.accounts.vault,
            buffer,
            total_shares,
            &mut ports,
        );
        ledger.redeem(shares, owner_shares)?
    };
    require!(assets >= min_assets_out, VaultError::SlippageExceeded);
    persist_strategy_ports(&ports)?;

    if shares > 0 {
        token_2022::burn(
            CpiContext::new(
                ctx.accounts.token_2022_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.shares_mint.to_account_info(),
                    from: ctx.accounts.owner_shares_account.to_account_info(),
                    authority: ctx.accounts.caller.to_account_info(),
                },
            ),
            shares,
        )?;
    }
    if assets > 0 {
        signer.transfer_out(ctx.accounts.receiver_asset_account.to_account_info(), assets)?;
    }

    emit!(WithdrawEvent {
        vault: vault_key,
        caller,
        receiver: ctx.accounts.receiver_asset_account.owner,
        owner,
        assets,
        shares,
    });

    Ok(())
}
