use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    #[msg("Vault is paused")]
    VaultPaused,

    #[msg("Vault is not paused")]
    VaultNotPaused,

    #[msg("Asset decimals must be <= 9")]
    InvalidAssetDecimals,

    #[msg("Share name, symbol or uri is empty or too long")]
    InvalidShareMetadata,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,

    #[msg("Insufficient shares balance")]
    InsufficientShares,

    #[msg("Buffer and strategies cannot cover the withdrawal")]
    InsufficientLiquidity,

    #[msg("Unauthorized - caller is not vault authority")]
    Unauthorized,

    #[msg("Unauthorized - caller is not the strategy's bound vault")]
    UnboundVault,

    #[msg("Address must not be the default pubkey")]
    InvalidAddress,

    #[msg("Allocation weight exceeds 10000 bps")]
    AllocationTooHigh,

    #[msg("Total allocation would exceed 10000 bps")]
    AllocationExceeded,

    #[msg("Strategy is already registered")]
    StrategyAlreadyActive,

    #[msg("Strategy is not registered with this vault")]
    StrategyNotRegistered,

    #[msg("Strategy registry is full")]
    TooManyStrategies,

    #[msg("Strategy is bound to a different vault or asset")]
    StrategyVaultMismatch,

    #[msg("Strategy accounts must be passed as (strategy, asset account) pairs")]
    InvalidStrategyAccounts,

    #[msg("Every registered strategy must be supplied to price shares")]
    MissingStrategyAccounts,

    #[msg("Strategy is paused")]
    StrategyPaused,

    #[msg("Strategy is not paused")]
    StrategyNotPaused,
}
