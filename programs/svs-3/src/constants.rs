pub const VAULT_SEED: &[u8] = b"vault";
pub const SHARES_MINT_SEED: &[u8] = b"shares";
pub const STRATEGY_SEED: &[u8] = b"strategy";

pub const MAX_DECIMALS: u8 = 9;

/// Share token naming limits, as in the Metaplex metadata standard
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_URI_LEN: usize = 200;
pub const SHARES_DECIMALS: u8 = 9;

/// Virtual share offset exponent. Zero keeps the first deposit at 1:1.
pub const DECIMALS_OFFSET: u8 = 0;

/// 10_000 bps = 100%
pub const MAX_BPS: u16 = 10_000;

/// Registry capacity, bounds the vault account size
pub const MAX_STRATEGIES: usize = 10;

/// remaining_accounts per strategy: (strategy, strategy_asset_account)
pub const ACCOUNTS_PER_STRATEGY: usize = 2;
