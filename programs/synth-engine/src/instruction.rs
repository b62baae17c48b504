use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvar,
};

use crate::error::EngineError;

/// Amounts are raw token units (u64 at the spl-token boundary); the engine
/// widens them internally. Solvency-checked instructions take the full set
/// of registered price-feed accounts, in registration order, as trailing
/// accounts.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub enum EngineInstruction {
    /// Create the engine over a fixed collateral registry
    /// Accounts:
    /// 0. `[signer, writable]` Authority (pays for the state account)
    /// 1. `[signer, writable]` Engine state account (fresh keypair)
    /// 2. `[]` Synthetic mint
    /// 3. `[]` System program
    /// 4. `[]` Rent sysvar
    InitializeEngine {
        collateral_mints: Vec<Pubkey>,
        price_feeds: Vec<Pubkey>,
    },

    /// Lock collateral in engine custody
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[writable]` Engine state account
    /// 2. `[writable]` Participant collateral token account
    /// 3. `[writable]` Vault collateral token account
    /// 4. `[]` Collateral mint
    /// 5. `[]` Token program
    DepositCollateral { asset: Pubkey, amount: u64 },

    /// Release collateral back to the participant, then re-check solvency
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[writable]` Engine state account
    /// 2. `[writable]` Vault collateral token account
    /// 3. `[writable]` Participant collateral token account
    /// 4. `[]` Collateral mint
    /// 5. `[]` Engine authority PDA
    /// 6. `[]` Token program
    /// 7.. `[]` Price feed accounts (registration order)
    WithdrawCollateral { asset: Pubkey, amount: u64 },

    /// Mint synthetic against the caller's collateral
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[writable]` Engine state account
    /// 2. `[writable]` Synthetic mint
    /// 3. `[writable]` Participant synthetic token account
    /// 4. `[]` Engine authority PDA
    /// 5. `[]` Token program
    /// 6.. `[]` Price feed accounts (registration order)
    MintSynthetic { amount: u64 },

    /// Destroy synthetic from the caller and reduce their debt
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[writable]` Engine state account
    /// 2. `[writable]` Synthetic mint
    /// 3. `[writable]` Participant synthetic token account
    /// 4. `[]` Token program
    /// 5.. `[]` Price feed accounts (registration order)
    BurnSynthetic { amount: u64 },

    /// Deposit and mint as one logical unit
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[writable]` Engine state account
    /// 2. `[writable]` Participant collateral token account
    /// 3. `[writable]` Vault collateral token account
    /// 4. `[]` Collateral mint
    /// 5. `[writable]` Synthetic mint
    /// 6. `[writable]` Participant synthetic token account
    /// 7. `[]` Engine authority PDA
    /// 8. `[]` Token program
    /// 9.. `[]` Price feed accounts (registration order)
    DepositAndMint {
        asset: Pubkey,
        amount: u64,
        mint_amount: u64,
    },

    /// Burn then withdraw as one logical unit
    /// Accounts:
    /// 0. `[signer]` Participant
    /// 1. `[writable]` Engine state account
    /// 2. `[writable]` Synthetic mint
    /// 3. `[writable]` Participant synthetic token account
    /// 4. `[writable]` Vault collateral token account
    /// 5. `[writable]` Participant collateral token account
    /// 6. `[]` Collateral mint
    /// 7. `[]` Engine authority PDA
    /// 8. `[]` Token program
    /// 9.. `[]` Price feed accounts (registration order)
    RedeemForSynthetic {
        asset: Pubkey,
        amount: u64,
        burn_amount: u64,
    },

    /// Close part of an undercollateralized position
    /// Accounts:
    /// 0. `[signer]` Liquidator
    /// 1. `[writable]` Engine state account
    /// 2. `[writable]` Vault collateral token account
    /// 3. `[writable]` Liquidator collateral token account
    /// 4. `[]` Collateral mint
    /// 5. `[writable]` Synthetic mint
    /// 6. `[writable]` Liquidator synthetic token account
    /// 7. `[]` Engine authority PDA
    /// 8. `[]` Token program
    /// 9.. `[]` Price feed accounts (registration order)
    Liquidate {
        asset: Pubkey,
        target: Pubkey,
        debt_to_cover: u64,
    },
}

impl EngineInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&variant, rest) = input
            .split_first()
            .ok_or::<ProgramError>(EngineError::InvalidInstruction.into())?;

        if variant > 7 {
            return Err(EngineError::InvalidInstruction.into());
        }
        Self::try_from_slice(rest).map_err(|_| EngineError::InvalidInstruction.into())
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        let tag = match self {
            Self::InitializeEngine { .. } => 0,
            Self::DepositCollateral { .. } => 1,
            Self::WithdrawCollateral { .. } => 2,
            Self::MintSynthetic { .. } => 3,
            Self::BurnSynthetic { .. } => 4,
            Self::DepositAndMint { .. } => 5,
            Self::RedeemForSynthetic { .. } => 6,
            Self::Liquidate { .. } => 7,
        };
        buf.push(tag);
        buf.extend_from_slice(&self.try_to_vec().unwrap());
        buf
    }
}

// Helper functions to create instructions
pub fn initialize_engine(
    program_id: &Pubkey,
    authority: &Pubkey,
    state: &Pubkey,
    synthetic_mint: &Pubkey,
    collateral_mints: Vec<Pubkey>,
    price_feeds: Vec<Pubkey>,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new(*state, true),
        AccountMeta::new_readonly(*synthetic_mint, false),
        AccountMeta::new_readonly(solana_program::system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    let data = EngineInstruction::InitializeEngine {
        collateral_mints,
        price_feeds,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn deposit_collateral(
    program_id: &Pubkey,
    participant: &Pubkey,
    state: &Pubkey,
    participant_token: &Pubkey,
    vault_token: &Pubkey,
    asset: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*participant, true),
        AccountMeta::new(*state, false),
        AccountMeta::new(*participant_token, false),
        AccountMeta::new(*vault_token, false),
        AccountMeta::new_readonly(*asset, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    let data = EngineInstruction::DepositCollateral {
        asset: *asset,
        amount,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

pub fn liquidate(
    program_id: &Pubkey,
    liquidator: &Pubkey,
    state: &Pubkey,
    vault_token: &Pubkey,
    liquidator_token: &Pubkey,
    asset: &Pubkey,
    synthetic_mint: &Pubkey,
    liquidator_synthetic_token: &Pubkey,
    engine_authority: &Pubkey,
    price_feeds: &[Pubkey],
    target: &Pubkey,
    debt_to_cover: u64,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*liquidator, true),
        AccountMeta::new(*state, false),
        AccountMeta::new(*vault_token, false),
        AccountMeta::new(*liquidator_token, false),
        AccountMeta::new_readonly(*asset, false),
        AccountMeta::new(*synthetic_mint, false),
        AccountMeta::new(*liquidator_synthetic_token, false),
        AccountMeta::new_readonly(*engine_authority, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];
    for feed in price_feeds {
        accounts.push(AccountMeta::new_readonly(*feed, false));
    }

    let data = EngineInstruction::Liquidate {
        asset: *asset,
        target: *target,
        debt_to_cover,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}
