use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::EngineError,
    state::ledger::{CollateralLedger, DebtLedger},
};

/// One approved collateral asset and the oracle feed that prices it.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralAsset {
    pub mint: Pubkey,
    pub feed: Pubkey,
}

/// The engine's entire persisted state: collateral registry, both ledgers,
/// the reentrancy latch and lifetime stats. The registry is fixed at
/// construction; registration order drives valuation iteration.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct EngineState {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized
    pub is_initialized: bool,

    /// Authority that created the engine
    pub authority: Pubkey,

    /// Mint of the synthetic asset this engine issues
    pub synthetic_mint: Pubkey,

    /// Bump of the engine authority PDA (vault owner and mint authority)
    pub authority_bump: u8,

    /// Approved collateral assets, in registration order
    pub assets: Vec<CollateralAsset>,

    /// Per-(participant, asset) collateral balances
    pub collateral: CollateralLedger,

    /// Per-participant minted-synthetic balances
    pub debt: DebtLedger,

    /// Reentrancy latch: set for the duration of any mutating operation
    pub locked: bool,

    /// Lifetime stats
    pub total_deposits: u64,
    pub total_mints: u64,
    pub total_liquidations: u64,
}

/// Rollback point for the mutable portion of [`EngineState`].
#[derive(Debug, Clone)]
pub struct Checkpoint {
    collateral: CollateralLedger,
    debt: DebtLedger,
    total_deposits: u64,
    total_mints: u64,
    total_liquidations: u64,
}

impl EngineState {
    pub const DISCRIMINATOR: [u8; 8] = *b"SYNTHENG";

    pub const MAX_COLLATERAL_ASSETS: usize = 8;

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // authority
        32 + // synthetic_mint
        1 + // authority_bump
        4 + (Self::MAX_COLLATERAL_ASSETS * 64) + // assets vec
        4 + (CollateralLedger::MAX_POSITIONS * 80) + // collateral positions
        4 + (DebtLedger::MAX_POSITIONS * 48) + // debt positions
        1 + // locked
        8 + // total_deposits
        8 + // total_mints
        8 + // total_liquidations
        128; // padding for growth

    /// Builds a fresh engine over an ordered collateral set.
    /// Fails with `LengthMismatch` when the mint and feed lists disagree.
    pub fn new(
        authority: Pubkey,
        synthetic_mint: Pubkey,
        authority_bump: u8,
        collateral_mints: Vec<Pubkey>,
        price_feeds: Vec<Pubkey>,
    ) -> Result<Self, EngineError> {
        if collateral_mints.len() != price_feeds.len() {
            return Err(EngineError::LengthMismatch);
        }
        if collateral_mints.len() > Self::MAX_COLLATERAL_ASSETS {
            return Err(EngineError::TooManyCollateralAssets);
        }

        let assets = collateral_mints
            .into_iter()
            .zip(price_feeds)
            .map(|(mint, feed)| CollateralAsset { mint, feed })
            .collect();

        Ok(Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            authority,
            synthetic_mint,
            authority_bump,
            assets,
            collateral: CollateralLedger::default(),
            debt: DebtLedger::default(),
            locked: false,
            total_deposits: 0,
            total_mints: 0,
            total_liquidations: 0,
        })
    }

    /// Feed registered for `mint`, or None when the asset is unsupported.
    pub fn feed_for(&self, mint: &Pubkey) -> Option<&Pubkey> {
        self.assets
            .iter()
            .find(|asset| asset.mint == *mint)
            .map(|asset| &asset.feed)
    }

    pub fn is_supported(&self, mint: &Pubkey) -> bool {
        self.feed_for(mint).is_some()
    }

    /// Snapshot of everything a failed operation must roll back.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            collateral: self.collateral.clone(),
            debt: self.debt.clone(),
            total_deposits: self.total_deposits,
            total_mints: self.total_mints,
            total_liquidations: self.total_liquidations,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.collateral = checkpoint.collateral;
        self.debt = checkpoint.debt;
        self.total_deposits = checkpoint.total_deposits;
        self.total_mints = checkpoint.total_mints;
        self.total_liquidations = checkpoint.total_liquidations;
    }

    /// Validate state loaded from an account.
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }
        if !self.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(())
    }
}
