//! Pure data-access layer for collateral and debt balances.
//!
//! Balances are never negative: any debit beyond the recorded balance fails
//! before mutating the entry. Positions are created implicitly on first
//! credit and fall to zero rather than being destroyed.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{error::EngineError, math};

/// Collateral deposited by one participant in one asset.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CollateralPosition {
    pub owner: Pubkey,
    pub mint: Pubkey,
    /// 18-decimal quantity
    pub amount: u128,
}

/// Per-(participant, asset) collateral balances.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CollateralLedger {
    pub positions: Vec<CollateralPosition>,
}

impl CollateralLedger {
    pub const MAX_POSITIONS: usize = 256;

    pub fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> u128 {
        self.positions
            .iter()
            .find(|p| p.owner == *owner && p.mint == *mint)
            .map(|p| p.amount)
            .unwrap_or(0)
    }

    pub fn credit(
        &mut self,
        owner: &Pubkey,
        mint: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        if let Some(position) = self
            .positions
            .iter_mut()
            .find(|p| p.owner == *owner && p.mint == *mint)
        {
            position.amount = math::checked_add(position.amount, amount)?;
            return Ok(());
        }
        if self.positions.len() >= Self::MAX_POSITIONS {
            return Err(EngineError::LedgerFull);
        }
        self.positions.push(CollateralPosition {
            owner: *owner,
            mint: *mint,
            amount,
        });
        Ok(())
    }

    pub fn debit(
        &mut self,
        owner: &Pubkey,
        mint: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.owner == *owner && p.mint == *mint)
            .ok_or(EngineError::InsufficientCollateral)?;
        position.amount = position
            .amount
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientCollateral)?;
        Ok(())
    }
}

/// Synthetic units minted on behalf of one participant.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct DebtPosition {
    pub owner: Pubkey,
    /// 18-decimal quantity
    pub amount: u128,
}

/// Per-participant minted-synthetic balances.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DebtLedger {
    pub positions: Vec<DebtPosition>,
}

impl DebtLedger {
    pub const MAX_POSITIONS: usize = 256;

    pub fn balance(&self, owner: &Pubkey) -> u128 {
        self.positions
            .iter()
            .find(|p| p.owner == *owner)
            .map(|p| p.amount)
            .unwrap_or(0)
    }

    pub fn credit(&mut self, owner: &Pubkey, amount: u128) -> Result<(), EngineError> {
        if let Some(position) = self.positions.iter_mut().find(|p| p.owner == *owner) {
            position.amount = math::checked_add(position.amount, amount)?;
            return Ok(());
        }
        if self.positions.len() >= Self::MAX_POSITIONS {
            return Err(EngineError::LedgerFull);
        }
        self.positions.push(DebtPosition {
            owner: *owner,
            amount,
        });
        Ok(())
    }

    pub fn debit(&mut self, owner: &Pubkey, amount: u128) -> Result<(), EngineError> {
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.owner == *owner)
            .ok_or(EngineError::InsufficientDebt)?;
        position.amount = position
            .amount
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientDebt)?;
        Ok(())
    }
}
