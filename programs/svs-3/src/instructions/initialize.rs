use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_2022::{
        spl_token_2022::{extension::ExtensionType, instruction::initialize_mint2},
        Token2022,
    },
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::{
    constants::{
        DECIMALS_OFFSET, MAX_DECIMALS, MAX_NAME_LEN, MAX_SYMBOL_LEN, MAX_URI_LEN, SHARES_DECIMALS,
        SHARES_MINT_SEED, VAULT_SEED,
    },
    error::VaultError,
    events::VaultInitialized,
    state::Vault,
};

#[derive(Accounts)]
#[instruction(vault_id: u64)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = Vault::LEN,
        seeds = [VAULT_SEED, asset_mint.key().as_ref(), &vault_id.to_le_bytes()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    pub asset_mint: InterfaceAccount<'info, Mint>,

    /// CHECK: Shares mint is initialized via CPI in handler
    #[account(
        mut,
        seeds = [SHARES_MINT_SEED, vault.key().as_ref()],
        bump
    )]
    pub shares_mint: UncheckedAccount<'info>,

    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault,
        associated_token::token_program = asset_token_program,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    pub asset_token_program: Interface<'info, TokenInterface>,
    pub token_2022_program: Program<'info, Token2022>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/// Name and symbol are required, uri may be empty
fn validate_share_metadata(name: &str, symbol: &str, uri: &str) -> Result<()> {
    require!(
        !name.is_empty() && name.len() <= MAX_NAME_LEN,
        VaultError::InvalidShareMetadata
    );
    require!(
        !symbol.is_empty() && symbol.len() <= MAX_SYMBOL_LEN,
        VaultError::InvalidShareMetadata
    );
    require!(uri.len() <= MAX_URI_LEN, VaultError::InvalidShareMetadata);
    Ok(())
}

pub fn handler(
    ctx: Context<Initialize>,
    vault_id: u64,
    name: String,
    symbol: String,
    uri: String,
    min_liquidity: u64,
) -> Result<()> {
    require!(
        ctx.accounts.asset_mint.decimals <= MAX_DECIMALS,
        VaultError::InvalidAssetDecimals
    );
    validate_share_metadata(&name, &symbol, &uri)?;

    let vault_key = ctx.accounts.vault.key();
    let shares_mint_bump = ctx.bumps.shares_mint;

    // Plain Token-2022 mint, no extensions
    let mint_size = ExtensionType::try_calculate_account_len::<spl_token_2022::state::Mint>(&[])
        .map_err(|_| VaultError::MathOverflow)?;
    let lamports = ctx.accounts.rent.minimum_balance(mint_size);

    let shares_mint_bump_bytes = [shares_mint_bump];
    let shares_mint_seeds: &[&[u8]] = &[
        SHARES_MINT_SEED,
        vault_key.as_ref(),
        &shares_mint_bump_bytes,
    ];

    invoke_signed(
        &anchor_lang::solana_program::system_instruction::create_account(
            &ctx.accounts.authority.key(),
            &ctx.accounts.shares_mint.key(),
            lamports,
            mint_size as u64,
            &ctx.accounts.token_2022_program.key(),
        ),
        &[
            ctx.accounts.authority.to_account_info(),
            ctx.accounts.shares_mint.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
        &[shares_mint_seeds],
    )?;

    // Vault PDA is mint authority, no freeze authority
    let init_mint_ix = initialize_mint2(
        &ctx.accounts.token_2022_program.key(),
        &ctx.accounts.shares_mint.key(),
        &vault_key,
        None,
        SHARES_DECIMALS,
    )?;

    invoke_signed(
        &init_mint_ix,
        &[ctx.accounts.shares_mint.to_account_info()],
        &[shares_mint_seeds],
    )?;

    let vault = &mut ctx.accounts.vault;
    vault.authority = ctx.accounts.authority.key();
    vault.asset_mint = ctx.accounts.asset_mint.key();
    vault.shares_mint = ctx.accounts.shares_mint.key();
    vault.asset_vault = ctx.accounts.asset_vault.key();
    vault.min_liquidity = min_liquidity;
    vault.total_allocation_bps = 0;
    vault.decimals_offset = DECIMALS_OFFSET;
    vault.bump = ctx.bumps.vault;
    vault.paused = false;
    vault.vault_id = vault_id;
    vault.strategies = Vec::new();
    vault._reserved = [0u8; 64];

    msg!("Vault initialized: {} ({})", name, symbol);

    emit!(VaultInitialized {
        vault: vault.key(),
        authority: vault.authority,
        asset_mint: vault.asset_mint,
        shares_mint: vault.shares_mint,
        vault_id,
        min_liquidity,
        name,
        symbol,
        uri,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_metadata_limits() {
        assert!(validate_share_metadata("Allocator USDC", "avUSDC", "").is_ok());
        assert!(validate_share_metadata("Allocator USDC", "avUSDC", "https://x.io/a.json").is_ok());

        let long_name = "n".repeat(MAX_NAME_LEN + 1);
        let long_symbol = "S".repeat(MAX_SYMBOL_LEN + 1);
        let long_uri = "u".repeat(MAX_URI_LEN + 1);
        for (name, symbol, uri) in [
            ("", "avUSDC", ""),
            ("Allocator USDC", "", ""),
            (long_name.as_str(), "avUSDC", ""),
            ("Allocator USDC", long_symbol.as_str(), ""),
            ("Allocator USDC", "avUSDC", long_uri.as_str()),
        ] {
            assert_eq!(
                validate_share_metadata(name, symbol, uri).unwrap_err(),
                VaultError::InvalidShareMetadata.into()
            );
        }
    }
}
