//! Capability interfaces over the external fungible-token collaborators.
//!
//! The engine never moves tokens itself. It instructs these collaborators
//! and treats any refusal as terminal for the enclosing transaction. The
//! production implementations in `processor` drive spl-token CPIs; tests
//! substitute deterministic fakes.

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

/// External custody of the collateral tokens.
pub trait CollateralGateway {
    /// Pull `amount` of `asset` from `from` into engine custody.
    fn pull(&mut self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    /// Push `amount` of `asset` from engine custody to `to`.
    fn push(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;
}

/// External mint/burn service for the synthetic asset.
pub trait SyntheticIssuer {
    /// Mint `amount` of the synthetic to `to`.
    fn mint_to(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    /// Pull `amount` of the synthetic from `from` and destroy it.
    fn burn_from(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;
}
