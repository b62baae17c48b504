use solana_program::program_error::ProgramError;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid instruction")]
    InvalidInstruction,

    #[error("Account not initialized")]
    AccountNotInitialized,

    #[error("Account already initialized")]
    AccountAlreadyInitialized,

    #[error("Invalid authority")]
    InvalidAuthority,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Collateral asset is not registered")]
    UnsupportedCollateral,

    #[error("Collateral and price feed lists differ in length")]
    LengthMismatch,

    #[error("Too many collateral assets")]
    TooManyCollateralAssets,

    #[error("Collateral transfer failed")]
    CollateralTransferFailed,

    #[error("Synthetic burn transfer failed")]
    BurnTransferFailed,

    #[error("Insufficient collateral balance")]
    InsufficientCollateral,

    #[error("Insufficient debt balance")]
    InsufficientDebt,

    #[error("Health factor broken: {health_factor}")]
    HealthFactorBroken { health_factor: u128 },

    #[error("Synthetic mint failed")]
    MintFailed,

    #[error("Health factor is not below the liquidation boundary")]
    HealthFactorOk,

    #[error("Liquidation did not improve target health factor")]
    HealthFactorNotImproved,

    #[error("Price feed missing, invalid or stale")]
    OracleUnavailable,

    #[error("Arithmetic overflow")]
    MathOverflow,

    #[error("Reentrant call rejected")]
    Reentrancy,

    #[error("Ledger capacity exceeded")]
    LedgerFull,

    #[error("Amount exceeds token transfer width")]
    AmountTooLarge,
}

impl EngineError {
    /// Stable numeric code surfaced through `ProgramError::Custom`.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidInstruction => 0,
            Self::AccountNotInitialized => 1,
            Self::AccountAlreadyInitialized => 2,
            Self::InvalidAuthority => 3,
            Self::InvalidAmount => 4,
            Self::UnsupportedCollateral => 5,
            Self::LengthMismatch => 6,
            Self::TooManyCollateralAssets => 7,
            Self::CollateralTransferFailed => 8,
            Self::BurnTransferFailed => 9,
            Self::InsufficientCollateral => 10,
            Self::InsufficientDebt => 11,
            Self::HealthFactorBroken { .. } => 12,
            Self::MintFailed => 13,
            Self::HealthFactorOk => 14,
            Self::HealthFactorNotImproved => 15,
            Self::OracleUnavailable => 16,
            Self::MathOverflow => 17,
            Self::Reentrancy => 18,
            Self::LedgerFull => 19,
            Self::AmountTooLarge => 20,
        }
    }
}

impl From<EngineError> for ProgramError {
    fn from(e: EngineError) -> Self {
        ProgramError::Custom(e.code())
    }
}
