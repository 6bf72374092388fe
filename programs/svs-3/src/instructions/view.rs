use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::{
    state::Vault,
    strategy::{load_strategy_ports, StrategyHandle, VaultSigner},
    vault::VaultLedger,
};

/// Read-only vault quotes. Every registered strategy is passed as a
/// `(strategy, asset account)` pair in remaining accounts and valued live.
#[derive(Accounts)]
pub struct VaultView<'info> {
    pub vault: Account<'info, Vault>,

    #[account(constraint = asset_mint.key() == vault.asset_mint)]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(constraint = asset_vault.key() == vault.asset_vault)]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(constraint = shares_mint.key() == vault.shares_mint)]
    pub shares_mint: InterfaceAccount<'info, Mint>,

    pub asset_token_program: Interface<'info, TokenInterface>,
}

#[derive(Accounts)]
pub struct VaultViewWithOwner<'info> {
    pub view: VaultView<'info>,

    #[account(
        constraint = owner_shares_account.mint == view.vault.shares_mint,
    )]
    pub owner_shares_account: InterfaceAccount<'info, TokenAccount>,
}

fn quote<'info>(
    view: &mut VaultView<'info>,
    remaining: &'info [AccountInfo<'info>],
    op: impl FnOnce(&VaultLedger<'_, StrategyHandle<'info>>) -> Result<u64>,
) -> Result<()> {
    let signer = VaultSigner::new(
        &view.vault,
        view.vault.authority,
        view.asset_vault.to_account_info(),
        &view.asset_mint,
        view.asset_token_program.to_account_info(),
    );
    let mut ports = load_strategy_ports(&view.vault, &signer, remaining)?;

    let vault_key = view.vault.key();
    let buffer = view.asset_vault.amount;
    let total_shares = view.shares_mint.supply;
    let ledger = VaultLedger::new(
        vault_key,
        &mut view.vault,
        buffer,
        total_shares,
        &mut ports,
    );

    let value = op(&ledger)?;
    set_return_data(&value.to_le_bytes());
    Ok(())
}

/// Preview how many shares would be minted for given assets (floor rounding)
pub fn preview_deposit<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    assets: u64,
) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        ledger.share_ledger()?.preview_deposit(assets)
    })
}

/// Preview how many assets are required to mint exact shares (ceiling rounding)
pub fn preview_mint<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    shares: u64,
) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        ledger.share_ledger()?.preview_mint(shares)
    })
}

/// Preview how many shares must be burned to withdraw exact assets (ceiling rounding)
pub fn preview_withdraw<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    assets: u64,
) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        ledger.share_ledger()?.preview_withdraw(assets)
    })
}

/// Preview how many assets would be received for redeeming shares (floor rounding)
pub fn preview_redeem<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    shares: u64,
) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        ledger.share_ledger()?.preview_redeem(shares)
    })
}

pub fn convert_to_shares_view<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    assets: u64,
) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        ledger.share_ledger()?.convert_to_shares(assets)
    })
}

pub fn convert_to_assets_view<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>,
    shares: u64,
) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        ledger.share_ledger()?.convert_to_assets(shares)
    })
}

/// Buffer plus every strategy's value
pub fn get_total_assets<'info>(ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        ledger.priced_total_assets()
    })
}

/// Maximum assets that can be deposited (u64::MAX if not paused, 0 if paused)
pub fn max_deposit<'info>(ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| {
        Ok(ledger.max_deposit())
    })
}

/// Maximum shares that can be minted (u64::MAX if not paused, 0 if paused)
pub fn max_mint<'info>(ctx: Context<'_, '_, 'info, 'info, VaultView<'info>>) -> Result<()> {
    quote(ctx.accounts, ctx.remaining_accounts, |ledger| Ok(ledger.max_mint()))
}

/// Maximum assets the owner can withdraw. Not limited by pause.
pub fn max_withdraw<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultViewWithOwner<'info>>,
) -> Result<()> {
    let owner_shares = ctx.accounts.owner_shares_account.amount;
    quote(&mut ctx.accounts.view, ctx.remaining_accounts, |ledger| {
        ledger.max_withdraw(owner_shares)
    })
}

/// Maximum shares the owner can redeem (their share balance)
pub fn max_redeem<'info>(
    ctx: Context<'_, '_, 'info, 'info, VaultViewWithOwner<'info>>,
) -> Result<()> {
    let owner_shares = ctx.accounts.owner_shares_account.amount;
    quote(&mut ctx.accounts.view, ctx.remaining_accounts, |ledger| {
        Ok(ledger.max_redeem(owner_shares))
    })
}
