use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::{
    token_2022::{self, Burn, Token2022},
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::{
    error::VaultError,
    events::Withdraw as WithdrawEvent,
    state::Vault,
    strategy::{load_strategy_ports, persist_strategy_ports, VaultSigner},
    vault::VaultLedger,
};

#[derive(Accounts)]
pub struct Withdraw<'info> {
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

/// Shares `caller` may burn from an account: the full balance for its owner,
/// the approved allowance for its delegate, nothing otherwise.
pub fn spendable_shares(
    caller: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    delegate: COption<Pubkey>,
    delegated_amount: u64,
) -> u64 {
    if caller == owner {
        return amount;
    }
    match delegate {
        COption::Some(delegate) if delegate == *caller => delegated_amount.min(amount),
        _ => 0,
    }
}

/// Withdraw exact assets, burning required shares (ceiling rounding - protects vault).
/// Allowed while paused. Strategies passed as remaining accounts cover any
/// shortfall in the buffer, in registry order.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    assets: u64,
    max_shares_in: u64,
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

    let shares = {
        let mut ledger = VaultLedger::new(
            vault_key,
            &mut ctx.accounts.vault,
            buffer,
            total_shares,
            &mut ports,
        );
        ledger.withdraw(assets, owner_shares)?
    };
    require!(shares <= max_shares_in, VaultError::SlippageExceeded);
    persist_strategy_ports(&ports)?;

    if shares > 0 {
        // Token program enforces the delegate allowance
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_spends_full_balance() {
        let owner = Pubkey::new_unique();
        assert_eq!(spendable_shares(&owner, &owner, 500, COption::None, 0), 500);
    }

    #[test]
    fn test_delegate_limited_by_allowance() {
        let owner = Pubkey::new_unique();
        let delegate = Pubkey::new_unique();

        assert_eq!(
            spendable_shares(&delegate, &owner, 500, COption::Some(delegate), 120),
            120
        );
        // allowance above balance is capped
        assert_eq!(
            spendable_shares(&delegate, &owner, 50, COption::Some(delegate), 120),
            50
        );
    }

    #[test]
    fn test_stranger_spends_nothing() {
        let owner = Pubkey::new_unique();
        let delegate = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();

        assert_eq!(
            spendable_shares(&stranger, &owner, 500, COption::Some(delegate), 120),
            0
        );
        assert_eq!(spendable_shares(&stranger, &owner, 500, COption::None, 0), 0);
    }
}
