use anchor_lang::prelude::*;

use crate::{constants::MAX_BPS, error::VaultError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceiling,
}

/// Convert assets to shares with virtual offset protection against inflation attacks.
///
/// Formula: shares = assets × (total_shares + 10^offset) / (total_assets + 1)
///
/// The virtual share and asset keep an empty ledger priced at 1:1 (offset 0)
/// and stop a donation from inflating the price for the next depositor.
pub fn convert_to_shares(
    assets: u64,
    total_assets: u64,
    total_shares: u64,
    decimals_offset: u8,
    rounding: Rounding,
) -> Result<u64> {
    let (virtual_assets, virtual_shares) =
        virtual_totals(total_assets, total_shares, decimals_offset)?;
    mul_div(assets, virtual_shares, virtual_assets, rounding)
}

/// Convert shares to assets with virtual offset protection.
///
/// Formula: assets = shares × (total_assets + 1) / (total_shares + 10^offset)
pub fn convert_to_assets(
    shares: u64,
    total_assets: u64,
    total_shares: u64,
    decimals_offset: u8,
    rounding: Rounding,
) -> Result<u64> {
    let (virtual_assets, virtual_shares) =
        virtual_totals(total_assets, total_shares, decimals_offset)?;
    mul_div(shares, virtual_assets, virtual_shares, rounding)
}

/// (total_assets + 1, total_shares + 10^offset)
fn virtual_totals(total_assets: u64, total_shares: u64, decimals_offset: u8) -> Result<(u64, u64)> {
    let offset = 10u64
        .checked_pow(decimals_offset as u32)
        .ok_or(VaultError::MathOverflow)?;

    let virtual_shares = total_shares
        .checked_add(offset)
        .ok_or(VaultError::MathOverflow)?;
    let virtual_assets = total_assets
        .checked_add(1)
        .ok_or(VaultError::MathOverflow)?;

    Ok((virtual_assets, virtual_shares))
}

/// Portion of `amount` represented by `bps` basis points (floor rounding).
///
/// Floor keeps the sum of strategy targets at or below the deployable amount.
pub fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    mul_div(amount, bps as u64, MAX_BPS as u64, Rounding::Floor)
}

/// Safe multiplication then division with configurable rounding.
///
/// Computes: (value × numerator) / denominator
/// Uses u128 intermediate to prevent overflow.
pub fn mul_div(value: u64, numerator: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);

    let product = (value as u128)
        .checked_mul(numerator as u128)
        .ok_or(VaultError::MathOverflow)?;

    let result = match rounding {
        Rounding::Floor => product / (denominator as u128),
        Rounding::Ceiling => {
            let denom = denominator as u128;
            product
                .checked_add(denom)
                .ok_or(VaultError::MathOverflow)?
                .checked_sub(1)
                .ok_or(VaultError::MathOverflow)?
                / denom
        }
    };

    require!(result <= u64::MAX as u128, VaultError::MathOverflow);
    Ok(result as u64)
}
