use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    engine::SynthEngine,
    error::EngineError,
    instruction::EngineInstruction,
    oracle::{PriceFeed, PriceQuote, SnapshotPriceSource},
    state::EngineState,
    tokens::{CollateralGateway, SyntheticIssuer},
};

/// Seed of the engine authority PDA: owner of the collateral vaults and
/// mint authority of the synthetic.
pub const ENGINE_AUTHORITY_SEED: &[u8] = b"engine-authority";

pub fn engine_authority_address(program_id: &Pubkey, state: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ENGINE_AUTHORITY_SEED, state.as_ref()], program_id)
}

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = EngineInstruction::unpack(instruction_data)?;

    match instruction {
        EngineInstruction::InitializeEngine {
            collateral_mints,
            price_feeds,
        } => {
            msg!("Instruction: InitializeEngine");
            process_initialize_engine(program_id, accounts, collateral_mints, price_feeds)
        }

        EngineInstruction::DepositCollateral { asset, amount } => {
            msg!("Instruction: DepositCollateral");
            process_deposit_collateral(program_id, accounts, asset, amount)
        }

        EngineInstruction::WithdrawCollateral { asset, amount } => {
            msg!("Instruction: WithdrawCollateral");
            process_withdraw_collateral(program_id, accounts, asset, amount)
        }

        EngineInstruction::MintSynthetic { amount } => {
            msg!("Instruction: MintSynthetic");
            process_mint_synthetic(program_id, accounts, amount)
        }

        EngineInstruction::BurnSynthetic { amount } => {
            msg!("Instruction: BurnSynthetic");
            process_burn_synthetic(program_id, accounts, amount)
        }

        EngineInstruction::DepositAndMint {
            asset,
            amount,
            mint_amount,
        } => {
            msg!("Instruction: DepositAndMint");
            process_deposit_and_mint(program_id, accounts, asset, amount, mint_amount)
        }

        EngineInstruction::RedeemForSynthetic {
            asset,
            amount,
            burn_amount,
        } => {
            msg!("Instruction: RedeemForSynthetic");
            process_redeem_for_synthetic(program_id, accounts, asset, amount, burn_amount)
        }

        EngineInstruction::Liquidate {
            asset,
            target,
            debt_to_cover,
        } => {
            msg!("Instruction: Liquidate");
            process_liquidate(program_id, accounts, asset, target, debt_to_cover)
        }
    }
}

/// Create and initialize the engine state account
fn process_initialize_engine(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    collateral_mints: Vec<Pubkey>,
    price_feeds: Vec<Pubkey>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let authority_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let synthetic_mint_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;
    let rent_sysvar = next_account_info(account_info_iter)?;

    if !authority_info.is_signer || !state_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    if !state_info.data_is_empty() {
        return Err(EngineError::AccountAlreadyInitialized.into());
    }

    // Create state account
    let rent = &Rent::from_account_info(rent_sysvar)?;
    let required_lamports = rent.minimum_balance(EngineState::LEN);

    invoke(
        &system_instruction::create_account(
            authority_info.key,
            state_info.key,
            required_lamports,
            EngineState::LEN as u64,
            program_id,
        ),
        &[
            authority_info.clone(),
            state_info.clone(),
            system_program.clone(),
        ],
    )?;

    let (engine_authority, bump) = engine_authority_address(program_id, state_info.key);

    let state = EngineState::new(
        *authority_info.key,
        *synthetic_mint_info.key,
        bump,
        collateral_mints,
        price_feeds,
    )
    .map_err(fail)?;

    persist_state(&state, state_info)?;

    msg!(
        "Engine initialized: {} collateral assets, authority PDA {}",
        state.assets.len(),
        engine_authority
    );

    Ok(())
}

/// Lock collateral in engine custody
fn process_deposit_collateral(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    asset: Pubkey,
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let participant_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let participant_token_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let collateral_mint_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;

    if !participant_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if *collateral_mint_info.key != asset {
        return Err(EngineError::UnsupportedCollateral.into());
    }

    let mut state = load_state(program_id, state_info)?;
    arm_reentrancy_latch(&state, state_info)?;

    let mut gateway = SplCollateralGateway {
        token_program: token_program_info,
        participant: Some(participant_info),
        participant_token: Some(participant_token_info),
        vault_token: vault_token_info,
        recipient_token: None,
        engine_authority: None,
        state_key: state_info.key,
        bump: state.authority_bump,
    };

    SynthEngine::deposit_collateral(&mut state, participant_info.key, &asset, amount as u128, &mut gateway)
        .map_err(fail)?;

    persist_state(&state, state_info)
}

/// Release collateral, then re-check the participant's solvency
fn process_withdraw_collateral(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    asset: Pubkey,
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let participant_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let participant_token_info = next_account_info(account_info_iter)?;
    let collateral_mint_info = next_account_info(account_info_iter)?;
    let engine_authority_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;
    let feed_infos = account_info_iter.as_slice();

    if !participant_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if *collateral_mint_info.key != asset {
        return Err(EngineError::UnsupportedCollateral.into());
    }

    let mut state = load_state(program_id, state_info)?;
    verify_engine_authority(program_id, state_info.key, state.authority_bump, engine_authority_info)?;
    let prices = snapshot_prices(&state, feed_infos)?;
    let now = Clock::get()?.unix_timestamp;
    arm_reentrancy_latch(&state, state_info)?;

    let mut gateway = SplCollateralGateway {
        token_program: token_program_info,
        participant: None,
        participant_token: None,
        vault_token: vault_token_info,
        recipient_token: Some(participant_token_info),
        engine_authority: Some(engine_authority_info),
        state_key: state_info.key,
        bump: state.authority_bump,
    };

    SynthEngine::withdraw_collateral(
        &mut state,
        &prices,
        participant_info.key,
        &asset,
        amount as u128,
        now,
        &mut gateway,
    )
    .map_err(fail)?;

    persist_state(&state, state_info)
}

/// Mint synthetic against the caller's collateral
fn process_mint_synthetic(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let participant_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let synthetic_mint_info = next_account_info(account_info_iter)?;
    let participant_synthetic_info = next_account_info(account_info_iter)?;
    let engine_authority_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;
    let feed_infos = account_info_iter.as_slice();

    if !participant_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let mut state = load_state(program_id, state_info)?;
    if *synthetic_mint_info.key != state.synthetic_mint {
        return Err(ProgramError::InvalidAccountData);
    }
    verify_engine_authority(program_id, state_info.key, state.authority_bump, engine_authority_info)?;
    let prices = snapshot_prices(&state, feed_infos)?;
    let now = Clock::get()?.unix_timestamp;
    arm_reentrancy_latch(&state, state_info)?;

    let mut issuer = SplSyntheticIssuer {
        token_program: token_program_info,
        synthetic_mint: synthetic_mint_info,
        recipient_token: Some(participant_synthetic_info),
        payer: None,
        payer_token: None,
        engine_authority: Some(engine_authority_info),
        state_key: state_info.key,
        bump: state.authority_bump,
    };

    SynthEngine::mint_synthetic(
        &mut state,
        &prices,
        participant_info.key,
        amount as u128,
        now,
        &mut issuer,
    )
    .map_err(fail)?;

    persist_state(&state, state_info)
}

/// Destroy synthetic from the caller and reduce their debt
fn process_burn_synthetic(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let participant_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let synthetic_mint_info = next_account_info(account_info_iter)?;
    let participant_synthetic_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;
    let feed_infos = account_info_iter.as_slice();

    if !participant_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let mut state = load_state(program_id, state_info)?;
    if *synthetic_mint_info.key != state.synthetic_mint {
        return Err(ProgramError::InvalidAccountData);
    }
    let prices = snapshot_prices(&state, feed_infos)?;
    let now = Clock::get()?.unix_timestamp;
    arm_reentrancy_latch(&state, state_info)?;

    let mut issuer = SplSyntheticIssuer {
        token_program: token_program_info,
        synthetic_mint: synthetic_mint_info,
        recipient_token: None,
        payer: Some(participant_info),
        payer_token: Some(participant_synthetic_info),
        engine_authority: None,
        state_key: state_info.key,
        bump: state.authority_bump,
    };

    SynthEngine::burn_synthetic(
        &mut state,
        &prices,
        participant_info.key,
        amount as u128,
        now,
        &mut issuer,
    )
    .map_err(fail)?;

    persist_state(&state, state_info)
}

/// Deposit and mint as one logical unit
fn process_deposit_and_mint(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    asset: Pubkey,
    amount: u64,
    mint_amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let participant_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let participant_token_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let collateral_mint_info = next_account_info(account_info_iter)?;
    let synthetic_mint_info = next_account_info(account_info_iter)?;
    let participant_synthetic_info = next_account_info(account_info_iter)?;
    let engine_authority_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;
    let feed_infos = account_info_iter.as_slice();

    if !participant_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if *collateral_mint_info.key != asset {
        return Err(EngineError::UnsupportedCollateral.into());
    }

    let mut state = load_state(program_id, state_info)?;
    if *synthetic_mint_info.key != state.synthetic_mint {
        return Err(ProgramError::InvalidAccountData);
    }
    verify_engine_authority(program_id, state_info.key, state.authority_bump, engine_authority_info)?;
    let prices = snapshot_prices(&state, feed_infos)?;
    let now = Clock::get()?.unix_timestamp;
    arm_reentrancy_latch(&state, state_info)?;

    let mut gateway = SplCollateralGateway {
        token_program: token_program_info,
        participant: Some(participant_info),
        participant_token: Some(participant_token_info),
        vault_token: vault_token_info,
        recipient_token: None,
        engine_authority: None,
        state_key: state_info.key,
        bump: state.authority_bump,
    };
    let mut issuer = SplSyntheticIssuer {
        token_program: token_program_info,
        synthetic_mint: synthetic_mint_info,
        recipient_token: Some(participant_synthetic_info),
        payer: None,
        payer_token: None,
        engine_authority: Some(engine_authority_info),
        state_key: state_info.key,
        bump: state.authority_bump,
    };

    SynthEngine::deposit_and_mint(
        &mut state,
        &prices,
        participant_info.key,
        &asset,
        amount as u128,
        mint_amount as u128,
        now,
        &mut gateway,
        &mut issuer,
    )
    .map_err(fail)?;

    persist_state(&state, state_info)
}

/// Burn then withdraw as one logical unit
fn process_redeem_for_synthetic(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    asset: Pubkey,
    amount: u64,
    burn_amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let participant_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let synthetic_mint_info = next_account_info(account_info_iter)?;
    let participant_synthetic_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let participant_token_info = next_account_info(account_info_iter)?;
    let collateral_mint_info = next_account_info(account_info_iter)?;
    let engine_authority_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;
    let feed_infos = account_info_iter.as_slice();

    if !participant_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if *collateral_mint_info.key != asset {
        return Err(EngineError::UnsupportedCollateral.into());
    }

    let mut state = load_state(program_id, state_info)?;
    if *synthetic_mint_info.key != state.synthetic_mint {
        return Err(ProgramError::InvalidAccountData);
    }
    verify_engine_authority(program_id, state_info.key, state.authority_bump, engine_authority_info)?;
    let prices = snapshot_prices(&state, feed_infos)?;
    let now = Clock::get()?.unix_timestamp;
    arm_reentrancy_latch(&state, state_info)?;

    let mut gateway = SplCollateralGateway {
        token_program: token_program_info,
        participant: None,
        participant_token: None,
        vault_token: vault_token_info,
        recipient_token: Some(participant_token_info),
        engine_authority: Some(engine_authority_info),
        state_key: state_info.key,
        bump: state.authority_bump,
    };
    let mut issuer = SplSyntheticIssuer {
        token_program: token_program_info,
        synthetic_mint: synthetic_mint_info,
        recipient_token: None,
        payer: Some(participant_info),
        payer_token: Some(participant_synthetic_info),
        engine_authority: None,
        state_key: state_info.key,
        bump: state.authority_bump,
    };

    SynthEngine::redeem_for_synthetic(
        &mut state,
        &prices,
        participant_info.key,
        &asset,
        amount as u128,
        burn_amount as u128,
        now,
        &mut gateway,
        &mut issuer,
    )
    .map_err(fail)?;

    persist_state(&state, state_info)
}

/// Close part of an undercollateralized position
fn process_liquidate(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    asset: Pubkey,
    target: Pubkey,
    debt_to_cover: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let liquidator_info = next_account_info(account_info_iter)?;
    let state_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let liquidator_token_info = next_account_info(account_info_iter)?;
    let collateral_mint_info = next_account_info(account_info_iter)?;
    let synthetic_mint_info = next_account_info(account_info_iter)?;
    let liquidator_synthetic_info = next_account_info(account_info_iter)?;
    let engine_authority_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;
    let feed_infos = account_info_iter.as_slice();

    if !liquidator_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if *collateral_mint_info.key != asset {
        return Err(EngineError::UnsupportedCollateral.into());
    }

    let mut state = load_state(program_id, state_info)?;
    if *synthetic_mint_info.key != state.synthetic_mint {
        return Err(ProgramError::InvalidAccountData);
    }
    verify_engine_authority(program_id, state_info.key, state.authority_bump, engine_authority_info)?;
    let prices = snapshot_prices(&state, feed_infos)?;
    let now = Clock::get()?.unix_timestamp;
    arm_reentrancy_latch(&state, state_info)?;

    let mut gateway = SplCollateralGateway {
        token_program: token_program_info,
        participant: None,
        participant_token: None,
        vault_token: vault_token_info,
        recipient_token: Some(liquidator_token_info),
        engine_authority: Some(engine_authority_info),
        state_key: state_info.key,
        bump: state.authority_bump,
    };
    let mut issuer = SplSyntheticIssuer {
        token_program: token_program_info,
        synthetic_mint: synthetic_mint_info,
        recipient_token: None,
        payer: Some(liquidator_info),
        payer_token: Some(liquidator_synthetic_info),
        engine_authority: None,
        state_key: state_info.key,
        bump: state.authority_bump,
    };

    let outcome = SynthEngine::liquidate(
        &mut state,
        &prices,
        liquidator_info.key,
        &target,
        &asset,
        debt_to_cover as u128,
        now,
        &mut gateway,
        &mut issuer,
    )
    .map_err(fail)?;

    msg!(
        "Health factor {} -> {}",
        outcome.starting_health_factor,
        outcome.ending_health_factor
    );

    persist_state(&state, state_info)
}

// ---------------------------------------------------------------------------
// Account plumbing
// ---------------------------------------------------------------------------

fn load_state(program_id: &Pubkey, state_info: &AccountInfo) -> Result<EngineState, ProgramError> {
    if state_info.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }
    let data = state_info.data.borrow();
    if data.is_empty() {
        return Err(EngineError::AccountNotInitialized.into());
    }
    let state =
        EngineState::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)?;
    state.validate()?;
    Ok(state)
}

fn persist_state(state: &EngineState, state_info: &AccountInfo) -> ProgramResult {
    state.serialize(&mut &mut state_info.data.borrow_mut()[..])?;
    Ok(())
}

/// Persist the state with the reentrancy latch set before any CPI leaves the
/// program. A token callback that re-enters a mutating instruction loads
/// `locked == true` and is rejected; the latch is released by the final
/// persist on success or by transaction abort on failure.
fn arm_reentrancy_latch(state: &EngineState, state_info: &AccountInfo) -> ProgramResult {
    let mut armed = state.clone();
    armed.locked = true;
    persist_state(&armed, state_info)
}

/// Read every registered feed account, in registration order.
fn snapshot_prices(
    state: &EngineState,
    feed_infos: &[AccountInfo],
) -> Result<SnapshotPriceSource, ProgramError> {
    if feed_infos.len() != state.assets.len() {
        return Err(EngineError::OracleUnavailable.into());
    }

    let mut source = SnapshotPriceSource::default();
    for (asset, info) in state.assets.iter().zip(feed_infos) {
        if *info.key != asset.feed {
            return Err(EngineError::OracleUnavailable.into());
        }
        let feed = PriceFeed::load(&info.data.borrow())?;
        source.insert(
            asset.feed,
            PriceQuote {
                price: feed.price,
                publish_time: feed.publish_time,
            },
        );
    }
    Ok(source)
}

fn verify_engine_authority(
    program_id: &Pubkey,
    state_key: &Pubkey,
    bump: u8,
    authority_info: &AccountInfo,
) -> ProgramResult {
    let expected = Pubkey::create_program_address(
        &[ENGINE_AUTHORITY_SEED, state_key.as_ref(), &[bump]],
        program_id,
    )
    .map_err(|_| ProgramError::from(EngineError::InvalidAuthority))?;
    if expected != *authority_info.key {
        return Err(EngineError::InvalidAuthority.into());
    }
    Ok(())
}

fn narrow(amount: u128) -> Result<u64, ProgramError> {
    u64::try_from(amount).map_err(|_| EngineError::AmountTooLarge.into())
}

fn fail(e: EngineError) -> ProgramError {
    msg!("Engine error: {}", e);
    e.into()
}

// ---------------------------------------------------------------------------
// spl-token implementations of the capability traits
// ---------------------------------------------------------------------------

/// Collateral custody over spl-token: pulls are signed by the participant,
/// pushes by the engine authority PDA that owns the vault accounts.
struct SplCollateralGateway<'a, 'info> {
    token_program: &'a AccountInfo<'info>,
    participant: Option<&'a AccountInfo<'info>>,
    participant_token: Option<&'a AccountInfo<'info>>,
    vault_token: &'a AccountInfo<'info>,
    recipient_token: Option<&'a AccountInfo<'info>>,
    engine_authority: Option<&'a AccountInfo<'info>>,
    state_key: &'a Pubkey,
    bump: u8,
}

impl CollateralGateway for SplCollateralGateway<'_, '_> {
    fn pull(&mut self, _asset: &Pubkey, _from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let participant = self.participant.ok_or(ProgramError::NotEnoughAccountKeys)?;
        let participant_token = self
            .participant_token
            .ok_or(ProgramError::NotEnoughAccountKeys)?;

        let ix = spl_token::instruction::transfer(
            self.token_program.key,
            participant_token.key,
            self.vault_token.key,
            participant.key,
            &[],
            narrow(amount)?,
        )?;
        invoke(
            &ix,
            &[
                participant_token.clone(),
                self.vault_token.clone(),
                participant.clone(),
                self.token_program.clone(),
            ],
        )
    }

    fn push(&mut self, _asset: &Pubkey, _to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let recipient_token = self
            .recipient_token
            .ok_or(ProgramError::NotEnoughAccountKeys)?;
        let engine_authority = self
            .engine_authority
            .ok_or(ProgramError::NotEnoughAccountKeys)?;

        let ix = spl_token::instruction::transfer(
            self.token_program.key,
            self.vault_token.key,
            recipient_token.key,
            engine_authority.key,
            &[],
            narrow(amount)?,
        )?;
        invoke_signed(
            &ix,
            &[
                self.vault_token.clone(),
                recipient_token.clone(),
                engine_authority.clone(),
                self.token_program.clone(),
            ],
            &[&[ENGINE_AUTHORITY_SEED, self.state_key.as_ref(), &[self.bump]]],
        )
    }
}

/// Synthetic issuance over spl-token: mints are signed by the engine
/// authority PDA (mint authority), burns by the paying participant.
struct SplSyntheticIssuer<'a, 'info> {
    token_program: &'a AccountInfo<'info>,
    synthetic_mint: &'a AccountInfo<'info>,
    recipient_token: Option<&'a AccountInfo<'info>>,
    payer: Option<&'a AccountInfo<'info>>,
    payer_token: Option<&'a AccountInfo<'info>>,
    engine_authority: Option<&'a AccountInfo<'info>>,
    state_key: &'a Pubkey,
    bump: u8,
}

impl SyntheticIssuer for SplSyntheticIssuer<'_, '_> {
    fn mint_to(&mut self, _to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let recipient_token = self
            .recipient_token
            .ok_or(ProgramError::NotEnoughAccountKeys)?;
        let engine_authority = self
            .engine_authority
            .ok_or(ProgramError::NotEnoughAccountKeys)?;

        let ix = spl_token::instruction::mint_to(
            self.token_program.key,
            self.synthetic_mint.key,
            recipient_token.key,
            engine_authority.key,
            &[],
            narrow(amount)?,
        )?;
        invoke_signed(
            &ix,
            &[
                self.synthetic_mint.clone(),
                recipient_token.clone(),
                engine_authority.clone(),
                self.token_program.clone(),
            ],
            &[&[ENGINE_AUTHORITY_SEED, self.state_key.as_ref(), &[self.bump]]],
        )
    }

    fn burn_from(&mut self, _from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let payer = self.payer.ok_or(ProgramError::NotEnoughAccountKeys)?;
        let payer_token = self.payer_token.ok_or(ProgramError::NotEnoughAccountKeys)?;

        let ix = spl_token::instruction::burn(
            self.token_program.key,
            payer_token.key,
            self.synthetic_mint.key,
            payer.key,
            &[],
            narrow(amount)?,
        )?;
        invoke(
            &ix,
            &[
                payer_token.clone(),
                self.synthetic_mint.clone(),
                payer.clone(),
                self.token_program.clone(),
            ],
        )
    }
}
