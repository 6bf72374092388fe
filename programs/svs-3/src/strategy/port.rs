use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, Mint, TokenAccount, TransferChecked};

use crate::{
    constants::{ACCOUNTS_PER_STRATEGY, STRATEGY_SEED, VAULT_SEED},
    error::VaultError,
    events::{StrategyEvacuated, StrategyReported},
    state::{Strategy, Vault},
};

use super::StrategyReport;

/// The vault's view of one strategy.
///
/// Every call is made on the vault's behalf: fund movements as the bound
/// vault, yield realization and evacuation as the vault authority.
pub trait StrategyPort {
    fn key(&self) -> Pubkey;

    /// Live valuation of the strategy
    fn managed_assets(&self) -> Result<u64>;

    /// 0 while the strategy refuses deposits
    fn max_deposit(&self) -> u64;

    /// Assets a `withdraw` call can deliver right now
    fn max_withdraw(&self) -> Result<u64>;

    /// Move `assets` from the vault buffer into the strategy, returning shares minted
    fn deposit(&mut self, assets: u64) -> Result<u64>;

    /// Move `assets` from the strategy into the vault buffer, returning assets received
    fn withdraw(&mut self, assets: u64) -> Result<u64>;

    fn realize_yield(&mut self) -> Result<StrategyReport>;

    /// Returns assets moved back into the vault buffer
    fn emergency_evacuate(&mut self) -> Result<u64>;
}

/// Accounts needed to move assets out of the vault buffer under the vault PDA.
#[derive(Clone)]
pub struct VaultSigner<'info> {
    pub vault: AccountInfo<'info>,
    /// Signer acting as strategy owner for report and evacuation
    pub authority: Pubkey,
    pub asset_vault: AccountInfo<'info>,
    pub asset_mint: AccountInfo<'info>,
    pub asset_decimals: u8,
    pub token_program: AccountInfo<'info>,
    asset_mint_key: Pubkey,
    vault_id: u64,
    bump: u8,
}

impl<'info> VaultSigner<'info> {
    pub fn new(
        vault: &Account<'info, Vault>,
        authority: Pubkey,
        asset_vault: AccountInfo<'info>,
        asset_mint: &InterfaceAccount<'info, Mint>,
        token_program: AccountInfo<'info>,
    ) -> Self {
        Self {
            vault: vault.to_account_info(),
            authority,
            asset_vault,
            asset_mint: asset_mint.to_account_info(),
            asset_decimals: asset_mint.decimals,
            token_program,
            asset_mint_key: vault.asset_mint,
            vault_id: vault.vault_id,
            bump: vault.bump,
        }
    }

    pub fn key(&self) -> Pubkey {
        self.vault.key()
    }

    /// Transfer `amount` from the vault buffer to `to`, signed by the vault PDA
    pub fn transfer_out(&self, to: AccountInfo<'info>, amount: u64) -> Result<()> {
        let vault_id_bytes = self.vault_id.to_le_bytes();
        let signer_seeds: &[&[&[u8]]] = &[&[
            VAULT_SEED,
            self.asset_mint_key.as_ref(),
            vault_id_bytes.as_ref(),
            &[self.bump],
        ]];

        transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                TransferChecked {
                    from: self.asset_vault.clone(),
                    to,
                    mint: self.asset_mint.clone(),
                    authority: self.vault.clone(),
                },
                signer_seeds,
            ),
            amount,
            self.asset_decimals,
        )
    }
}

/// Transfer `amount` out of a strategy's token account, signed by the strategy PDA
pub fn transfer_from_strategy<'info>(
    strategy: &Account<'info, Strategy>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    mint: AccountInfo<'info>,
    decimals: u8,
    token_program: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let strategy_id_bytes = strategy.strategy_id.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[
        STRATEGY_SEED,
        strategy.vault.as_ref(),
        strategy_id_bytes.as_ref(),
        &[strategy.bump],
    ]];

    transfer_checked(
        CpiContext::new_with_signer(
            token_program,
            TransferChecked {
                from,
                to,
                mint,
                authority: strategy.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        decimals,
    )
}

/// A strategy loaded from `remaining_accounts`
pub struct StrategyHandle<'info> {
    strategy: Account<'info, Strategy>,
    strategy_asset: InterfaceAccount<'info, TokenAccount>,
    signer: VaultSigner<'info>,
}

impl<'info> StrategyHandle<'info> {
    pub fn try_new(
        signer: &VaultSigner<'info>,
        strategy_info: &'info AccountInfo<'info>,
        asset_info: &'info AccountInfo<'info>,
    ) -> Result<Self> {
        let strategy = Account::<Strategy>::try_from(strategy_info)?;
        require_keys_eq!(strategy.vault, signer.key(), VaultError::StrategyVaultMismatch);
        require_keys_eq!(
            strategy.asset_account,
            asset_info.key(),
            VaultError::StrategyVaultMismatch
        );
        let strategy_asset = InterfaceAccount::<TokenAccount>::try_from(asset_info)?;

        Ok(Self {
            strategy,
            strategy_asset,
            signer: signer.clone(),
        })
    }

    /// Write the strategy account back; remaining accounts are not exited by Anchor
    pub fn persist(&self) -> Result<()> {
        self.strategy.exit(&crate::ID)
    }
}

impl<'info> StrategyPort for StrategyHandle<'info> {
    fn key(&self) -> Pubkey {
        self.strategy.key()
    }

    fn managed_assets(&self) -> Result<u64> {
        self.strategy
            .managed_assets_observed(self.strategy_asset.amount)
    }

    fn max_deposit(&self) -> u64 {
        self.strategy.max_deposit()
    }

    fn max_withdraw(&self) -> Result<u64> {
        self.strategy
            .max_withdraw_observed(self.strategy_asset.amount)
    }

    fn deposit(&mut self, assets: u64) -> Result<u64> {
        let shares = self.strategy.deposit(&self.signer.key(), assets)?;
        if assets > 0 {
            self.signer
                .transfer_out(self.strategy_asset.to_account_info(), assets)?;
            self.strategy_asset.reload()?;
        }
        Ok(shares)
    }

    fn withdraw(&mut self, assets: u64) -> Result<u64> {
        self.strategy.withdraw(&self.signer.key(), assets)?;
        if assets > 0 {
            transfer_from_strategy(
                &self.strategy,
                self.strategy_asset.to_account_info(),
                self.signer.asset_vault.clone(),
                self.signer.asset_mint.clone(),
                self.signer.asset_decimals,
                self.signer.token_program.clone(),
                assets,
            )?;
            self.strategy_asset.reload()?;
        }
        Ok(assets)
    }

    fn realize_yield(&mut self) -> Result<StrategyReport> {
        self.strategy_asset.reload()?;
        let report = self
            .strategy
            .realize_yield(&self.signer.authority, self.strategy_asset.amount)?;

        emit!(StrategyReported {
            strategy: self.strategy.key(),
            total_assets: report.total_assets,
            pnl: report.pnl,
        });

        Ok(report)
    }

    fn emergency_evacuate(&mut self) -> Result<u64> {
        self.strategy_asset.reload()?;
        let recovered = self
            .strategy
            .emergency_evacuate(&self.signer.authority, self.strategy_asset.amount)?;

        if recovered > 0 {
            transfer_from_strategy(
                &self.strategy,
                self.strategy_asset.to_account_info(),
                self.signer.asset_vault.clone(),
                self.signer.asset_mint.clone(),
                self.signer.asset_decimals,
                self.signer.token_program.clone(),
                recovered,
            )?;
            self.strategy_asset.reload()?;
        }

        emit!(StrategyEvacuated {
            strategy: self.strategy.key(),
            vault: self.signer.key(),
            assets: recovered,
        });

        Ok(recovered)
    }
}

/// Load `(strategy, strategy_asset_account)` pairs.
///
/// Every strategy must be registered with the vault, appear once and come
/// with its own asset account. Whether every registered strategy is present
/// is checked by the ledger when shares are priced.
pub fn load_strategy_ports<'info>(
    vault: &Vault,
    signer: &VaultSigner<'info>,
    remaining: &'info [AccountInfo<'info>],
) -> Result<Vec<StrategyHandle<'info>>> {
    require!(
        remaining.len() % ACCOUNTS_PER_STRATEGY == 0,
        VaultError::InvalidStrategyAccounts
    );

    let mut handles: Vec<StrategyHandle<'info>> =
        Vec::with_capacity(remaining.len() / ACCOUNTS_PER_STRATEGY);
    let mut seen: Vec<Pubkey> = Vec::with_capacity(handles.capacity());

    for pair in remaining.chunks(ACCOUNTS_PER_STRATEGY) {
        let strategy_key = pair[0].key();
        require!(
            vault.is_active(&strategy_key),
            VaultError::StrategyNotRegistered
        );
        require!(
            !seen.contains(&strategy_key),
            VaultError::InvalidStrategyAccounts
        );
        seen.push(strategy_key);

        handles.push(StrategyHandle::try_new(signer, &pair[0], &pair[1])?);
    }

    Ok(handles)
}

pub fn persist_strategy_ports(handles: &[StrategyHandle]) -> Result<()> {
    for handle in handles {
        handle.persist()?;
    }
    Ok(())
}
