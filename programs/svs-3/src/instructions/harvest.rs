use anchor_lang::prelude::*;

use crate::instructions::rebalance::{with_ledger, ManageStrategies};

/// Realize yield on every supplied strategy. Strategies that fail are skipped.
pub fn harvest_all<'info>(
    ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
) -> Result<()> {
    let summary = with_ledger(ctx, |ledger| ledger.harvest_all())?;

    msg!(
        "Harvested {} strategies, {} skipped, pnl {}",
        summary.harvested,
        summary.skipped,
        summary.pnl
    );

    Ok(())
}

/// Realize yield on one strategy; any failure aborts the instruction
pub fn harvest<'info>(
    ctx: Context<'_, '_, 'info, 'info, ManageStrategies<'info>>,
    strategy: Pubkey,
) -> Result<()> {
    let pnl = with_ledger(ctx, |ledger| ledger.harvest(&strategy))?;
    msg!("Harvested {}: pnl {}", strategy, pnl);
    Ok(())
}
