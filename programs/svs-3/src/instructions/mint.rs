use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_2022::{self, MintTo, Token2022},
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

use crate::{
    constants::VAULT_SEED,
    error::VaultError,
    events::Deposit as DepositEvent,
    state::Vault,
    strategy::{load_strategy_ports, persist_strategy_ports, VaultSigner},
    vault::VaultLedger,
};

#[derive(Accounts)]
pub struct MintShares<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = !vault.paused @ VaultError::VaultPaused,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint,
    )]
    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = user_asset_account.mint == vault.asset_mint,
        constraint = user_asset_account.owner == user.key(),
    )]
    pub user_asset_account: InterfaceAccount<'info, TokenAccount>,

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

    /// CHECK: Only used as the authority of the receiving shares account
    pub receiver: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = user,
        associated_token::mint = shares_mint,
        associated_token::authority = receiver,
        associated_token::token_program = token_2022_program,
    )]
    pub receiver_shares_account: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub token_2022_program: Program<'info, Token2022>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Mint exact shares, paying required assets (ceiling rounding - protects vault)
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, MintShares<'info>>,
    shares: u64,
    max_assets_in: u64,
) -> Result<()> {
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

        let quoted = ledger.share_ledger()?.preview_mint(shares)?;
        require!(quoted <= max_assets_in, VaultError::SlippageExceeded);

        if quoted > 0 {
            transfer_checked(
                CpiContext::new(
                    ctx.accounts.asset_token_program.to_account_info(),
                    TransferChecked {
                        from: ctx.accounts.user_asset_account.to_account_info(),
                        to: ctx.accounts.asset_vault.to_account_info(),
                        mint: ctx.accounts.asset_mint.to_account_info(),
                        authority: ctx.accounts.user.to_account_info(),
                    },
                ),
                quoted,
                ctx.accounts.asset_mint.decimals,
            )?;
        }

        ledger.mint(shares)?
    };
    persist_strategy_ports(&ports)?;

    if shares > 0 {
        let asset_mint_key = ctx.accounts.vault.asset_mint;
        let vault_id_bytes = ctx.accounts.vault.vault_id.to_le_bytes();
        let bump = ctx.accounts.vault.bump;
        let signer_seeds: &[&[&[u8]]] = &[&[
            VAULT_SEED,
            asset_mint_key.as_ref(),
            vault_id_bytes.as_ref(),
            &[bump],
        ]];

        token_2022::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_2022_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.shares_mint.to_account_info(),
                    to: ctx.accounts.receiver_shares_account.to_account_info(),
                    authority: ctx.accounts.vault.to_account_info(),
                },
                signer_seeds,
            ),
            shares,
        )?;
    }

    emit!(DepositEvent {
        vault: vault_key,
        caller: ctx.accounts.user.key(),
        owner: ctx.accounts.receiver.key(),
        assets,
        shares,
    });

    Ok(())
}
