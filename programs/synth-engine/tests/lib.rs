use std::collections::HashMap;

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use synth_engine::{
    engine::{SynthEngine, MAX_HEALTH_FACTOR, MIN_HEALTH_FACTOR},
    error::EngineError,
    instruction::EngineInstruction,
    math::{FEED_PRECISION, PRECISION},
    oracle::{PriceQuote, SnapshotPriceSource},
    state::EngineState,
    tokens::{CollateralGateway, SyntheticIssuer},
};

const NOW: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// Deterministic fakes for the token collaborators
// ---------------------------------------------------------------------------

/// In-memory collateral custody. Wallet balances are keyed by
/// (owner, asset); engine custody is pooled per asset.
#[derive(Default)]
struct FakeVault {
    wallets: HashMap<(Pubkey, Pubkey), u128>,
    custody: HashMap<Pubkey, u128>,
    fail_pull: bool,
    fail_push: bool,
}

impl FakeVault {
    fn fund(&mut self, owner: &Pubkey, asset: &Pubkey, amount: u128) {
        *self.wallets.entry((*owner, *asset)).or_default() += amount;
    }

    fn wallet(&self, owner: &Pubkey, asset: &Pubkey) -> u128 {
        self.wallets.get(&(*owner, *asset)).copied().unwrap_or(0)
    }

    fn custody(&self, asset: &Pubkey) -> u128 {
        self.custody.get(asset).copied().unwrap_or(0)
    }
}

impl CollateralGateway for FakeVault {
    fn pull(&mut self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if self.fail_pull {
            return Err(ProgramError::Custom(999));
        }
        let wallet = self.wallets.entry((*from, *asset)).or_default();
        *wallet = wallet
            .checked_sub(amount)
            .ok_or(ProgramError::InsufficientFunds)?;
        *self.custody.entry(*asset).or_default() += amount;
        Ok(())
    }

    fn push(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if self.fail_push {
            return Err(ProgramError::Custom(999));
        }
        let custody = self.custody.entry(*asset).or_default();
        *custody = custody
            .checked_sub(amount)
            .ok_or(ProgramError::InsufficientFunds)?;
        *self.wallets.entry((*to, *asset)).or_default() += amount;
        Ok(())
    }
}

/// In-memory synthetic mint with a running supply.
#[derive(Default)]
struct FakeMint {
    supply: u128,
    wallets: HashMap<Pubkey, u128>,
    fail_mint: bool,
    fail_burn: bool,
}

impl FakeMint {
    fn wallet(&self, owner: &Pubkey) -> u128 {
        self.wallets.get(owner).copied().unwrap_or(0)
    }
}

impl SyntheticIssuer for FakeMint {
    fn mint_to(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if self.fail_mint {
            return Err(ProgramError::Custom(999));
        }
        *self.wallets.entry(*to).or_default() += amount;
        self.supply += amount;
        Ok(())
    }

    fn burn_from(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if self.fail_burn {
            return Err(ProgramError::Custom(999));
        }
        let wallet = self.wallets.entry(*from).or_default();
        *wallet = wallet
            .checked_sub(amount)
            .ok_or(ProgramError::InsufficientFunds)?;
        self.supply -= amount;
        Ok(())
    }
}

fn quote(usd: u64) -> PriceQuote {
    PriceQuote {
        price: usd * FEED_PRECISION as u64,
        publish_time: NOW,
    }
}

struct Harness {
    state: EngineState,
    asset: Pubkey,
    feed: Pubkey,
    vault: FakeVault,
    mint: FakeMint,
}

impl Harness {
    fn new() -> Self {
        let asset = Pubkey::new_unique();
        let feed = Pubkey::new_unique();
        let state = EngineState::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            255,
            vec![asset],
            vec![feed],
        )
        .unwrap();
        Harness {
            state,
            asset,
            feed,
            vault: FakeVault::default(),
            mint: FakeMint::default(),
        }
    }

    fn prices(&self, usd: u64) -> SnapshotPriceSource {
        let mut source = SnapshotPriceSource::default();
        source.insert(self.feed, quote(usd));
        source
    }

    /// Funds and deposits collateral, then mints synthetic debt.
    fn open_position(&mut self, owner: &Pubkey, deposit: u128, debt: u128, usd: u64) {
        let asset = self.asset;
        self.vault.fund(owner, &asset, deposit);
        SynthEngine::deposit_collateral(&mut self.state, owner, &asset, deposit, &mut self.vault)
            .unwrap();
        if debt > 0 {
            let prices = self.prices(usd);
            SynthEngine::mint_synthetic(&mut self.state, &prices, owner, debt, NOW, &mut self.mint)
                .unwrap();
        }
    }
}

// ---------------------------------------------------------------------------
// Deposit / withdraw
// ---------------------------------------------------------------------------

#[test]
fn test_deposit_moves_tokens_into_custody() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    h.vault.fund(&user, &h.asset, 10 * PRECISION);

    let asset = h.asset;
    SynthEngine::deposit_collateral(&mut h.state, &user, &asset, 10 * PRECISION, &mut h.vault)
        .unwrap();

    assert_eq!(h.state.collateral.balance(&user, &asset), 10 * PRECISION);
    assert_eq!(h.vault.wallet(&user, &asset), 0);
    assert_eq!(h.vault.custody(&asset), 10 * PRECISION);
    assert_eq!(h.state.total_deposits, 1);
    assert!(!h.state.locked);
}

#[test]
fn test_deposit_rejects_zero_amount() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;

    assert_eq!(
        SynthEngine::deposit_collateral(&mut h.state, &user, &asset, 0, &mut h.vault),
        Err(EngineError::InvalidAmount)
    );
}

#[test]
fn test_deposit_rejects_unregistered_asset() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let rogue = Pubkey::new_unique();

    assert_eq!(
        SynthEngine::deposit_collateral(&mut h.state, &user, &rogue, PRECISION, &mut h.vault),
        Err(EngineError::UnsupportedCollateral)
    );
    assert_eq!(h.state.total_deposits, 0);
}

#[test]
fn test_failed_transfer_rolls_back_deposit() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.vault.fund(&user, &asset, 10 * PRECISION);
    h.vault.fail_pull = true;

    assert_eq!(
        SynthEngine::deposit_collateral(&mut h.state, &user, &asset, 10 * PRECISION, &mut h.vault),
        Err(EngineError::CollateralTransferFailed)
    );

    // Ledger credit undone, latch released
    assert_eq!(h.state.collateral.balance(&user, &asset), 0);
    assert_eq!(h.state.total_deposits, 0);
    assert!(!h.state.locked);
}

#[test]
fn test_withdraw_without_debt() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.open_position(&user, 10 * PRECISION, 0, 2_000);

    let prices = h.prices(2_000);
    SynthEngine::withdraw_collateral(
        &mut h.state,
        &prices,
        &user,
        &asset,
        10 * PRECISION,
        NOW,
        &mut h.vault,
    )
    .unwrap();

    assert_eq!(h.state.collateral.balance(&user, &asset), 0);
    assert_eq!(h.vault.wallet(&user, &asset), 10 * PRECISION);
}

#[test]
fn test_withdraw_beyond_balance_rejected() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.open_position(&user, 10 * PRECISION, 0, 2_000);

    let prices = h.prices(2_000);
    assert_eq!(
        SynthEngine::withdraw_collateral(
            &mut h.state,
            &prices,
            &user,
            &asset,
            11 * PRECISION,
            NOW,
            &mut h.vault,
        ),
        Err(EngineError::InsufficientCollateral)
    );
    assert_eq!(h.state.collateral.balance(&user, &asset), 10 * PRECISION);
}

#[test]
fn test_withdraw_that_breaks_solvency_rolls_back() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    // 10 units at $2000, 5000 debt: health factor exactly 2.0
    h.open_position(&user, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    // Withdrawing 6 units would leave 4000 USD adjusted against 5000 debt
    let prices = h.prices(2_000);
    let result = SynthEngine::withdraw_collateral(
        &mut h.state,
        &prices,
        &user,
        &asset,
        6 * PRECISION,
        NOW,
        &mut h.vault,
    );
    assert!(matches!(result, Err(EngineError::HealthFactorBroken { .. })));

    assert_eq!(h.state.collateral.balance(&user, &asset), 10 * PRECISION);
    assert!(!h.state.locked);
}

#[test]
fn test_stale_price_blocks_withdrawal() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.open_position(&user, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    let mut stale = SnapshotPriceSource::default();
    stale.insert(
        h.feed,
        PriceQuote {
            price: 2_000 * FEED_PRECISION as u64,
            publish_time: NOW - 90_000,
        },
    );

    assert_eq!(
        SynthEngine::withdraw_collateral(
            &mut h.state,
            &stale,
            &user,
            &asset,
            PRECISION,
            NOW,
            &mut h.vault,
        ),
        Err(EngineError::OracleUnavailable)
    );
    assert_eq!(h.state.collateral.balance(&user, &asset), 10 * PRECISION);
}

// ---------------------------------------------------------------------------
// Mint / burn
// ---------------------------------------------------------------------------

#[test]
fn test_health_factor_after_mint() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    // 10 units at $2000 = 20,000 USD, adjusted 10,000 against 5000 debt
    h.open_position(&user, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    let prices = h.prices(2_000);
    let hf = SynthEngine::health_factor(&h.state, &prices, &user, NOW).unwrap();
    assert_eq!(hf, 2 * PRECISION);
    assert_eq!(h.mint.wallet(&user), 5_000 * PRECISION);
    assert_eq!(h.mint.supply, 5_000 * PRECISION);
}

#[test]
fn test_debt_free_health_factor_is_safe_sentinel() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    h.open_position(&user, 10 * PRECISION, 0, 2_000);

    let prices = h.prices(2_000);
    let hf = SynthEngine::health_factor(&h.state, &prices, &user, NOW).unwrap();
    assert_eq!(hf, MAX_HEALTH_FACTOR);
}

#[test]
fn test_overmint_reports_health_factor_and_rolls_back() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    h.open_position(&user, 10 * PRECISION, 0, 2_000);

    // 15,000 debt against 10,000 adjusted collateral: hf = 2/3
    let prices = h.prices(2_000);
    let result = SynthEngine::mint_synthetic(
        &mut h.state,
        &prices,
        &user,
        15_000 * PRECISION,
        NOW,
        &mut h.mint,
    );
    assert_eq!(
        result,
        Err(EngineError::HealthFactorBroken {
            health_factor: 666_666_666_666_666_666,
        })
    );

    assert_eq!(h.state.debt.balance(&user), 0);
    assert_eq!(h.mint.supply, 0);
    assert_eq!(h.state.total_mints, 0);
    assert!(!h.state.locked);
}

#[test]
fn test_mint_at_exact_boundary_is_allowed() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    // hf lands exactly on MIN_HEALTH_FACTOR
    h.open_position(&user, 10 * PRECISION, 10_000 * PRECISION, 2_000);

    let prices = h.prices(2_000);
    let hf = SynthEngine::health_factor(&h.state, &prices, &user, NOW).unwrap();
    assert_eq!(hf, MIN_HEALTH_FACTOR);
}

#[test]
fn test_burn_reduces_debt() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    h.open_position(&user, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    let prices = h.prices(2_000);
    SynthEngine::burn_synthetic(
        &mut h.state,
        &prices,
        &user,
        2_000 * PRECISION,
        NOW,
        &mut h.mint,
    )
    .unwrap();

    assert_eq!(h.state.debt.balance(&user), 3_000 * PRECISION);
    assert_eq!(h.mint.wallet(&user), 3_000 * PRECISION);
    assert_eq!(h.mint.supply, 3_000 * PRECISION);
}

#[test]
fn test_burn_beyond_debt_rejected_before_tokens_move() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    h.open_position(&user, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    let prices = h.prices(2_000);
    assert_eq!(
        SynthEngine::burn_synthetic(
            &mut h.state,
            &prices,
            &user,
            6_000 * PRECISION,
            NOW,
            &mut h.mint,
        ),
        Err(EngineError::InsufficientDebt)
    );

    // The external burn was never attempted
    assert_eq!(h.mint.wallet(&user), 5_000 * PRECISION);
    assert_eq!(h.state.debt.balance(&user), 5_000 * PRECISION);
}

// ---------------------------------------------------------------------------
// Composites
// ---------------------------------------------------------------------------

#[test]
fn test_deposit_and_mint_in_one_call() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.vault.fund(&user, &asset, 10 * PRECISION);

    let prices = h.prices(2_000);
    SynthEngine::deposit_and_mint(
        &mut h.state,
        &prices,
        &user,
        &asset,
        10 * PRECISION,
        5_000 * PRECISION,
        NOW,
        &mut h.vault,
        &mut h.mint,
    )
    .unwrap();

    assert_eq!(h.state.collateral.balance(&user, &asset), 10 * PRECISION);
    assert_eq!(h.state.debt.balance(&user), 5_000 * PRECISION);
    assert_eq!(h.mint.wallet(&user), 5_000 * PRECISION);
}

#[test]
fn test_deposit_and_mint_is_all_or_nothing() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.vault.fund(&user, &asset, 10 * PRECISION);

    // The mint leg is insolvent, so the deposit leg must unwind too
    let prices = h.prices(2_000);
    let result = SynthEngine::deposit_and_mint(
        &mut h.state,
        &prices,
        &user,
        &asset,
        10 * PRECISION,
        15_000 * PRECISION,
        NOW,
        &mut h.vault,
        &mut h.mint,
    );
    assert!(matches!(result, Err(EngineError::HealthFactorBroken { .. })));

    assert_eq!(h.state.collateral.balance(&user, &asset), 0);
    assert_eq!(h.state.debt.balance(&user), 0);
    assert_eq!(h.state.total_deposits, 0);
    assert_eq!(h.state.total_mints, 0);
    assert!(!h.state.locked);
}

#[test]
fn test_redeem_for_synthetic_closes_position() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.open_position(&user, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    let prices = h.prices(2_000);
    SynthEngine::redeem_for_synthetic(
        &mut h.state,
        &prices,
        &user,
        &asset,
        10 * PRECISION,
        5_000 * PRECISION,
        NOW,
        &mut h.vault,
        &mut h.mint,
    )
    .unwrap();

    assert_eq!(h.state.collateral.balance(&user, &asset), 0);
    assert_eq!(h.state.debt.balance(&user), 0);
    assert_eq!(h.vault.wallet(&user, &asset), 10 * PRECISION);
    assert_eq!(h.mint.supply, 0);
}

#[test]
fn test_redeem_for_synthetic_is_all_or_nothing() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.open_position(&user, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    let prices = h.prices(2_000);
    assert_eq!(
        SynthEngine::redeem_for_synthetic(
            &mut h.state,
            &prices,
            &user,
            &asset,
            10 * PRECISION,
            6_000 * PRECISION,
            NOW,
            &mut h.vault,
            &mut h.mint,
        ),
        Err(EngineError::InsufficientDebt)
    );

    assert_eq!(h.state.collateral.balance(&user, &asset), 10 * PRECISION);
    assert_eq!(h.state.debt.balance(&user), 5_000 * PRECISION);
}

// ---------------------------------------------------------------------------
// Liquidation
// ---------------------------------------------------------------------------

#[test]
fn test_full_liquidation_after_price_drop() {
    let mut h = Harness::new();
    let target = Pubkey::new_unique();
    let liquidator = Pubkey::new_unique();
    let asset = h.asset;

    // Opened at $2000: 15 units, 10,000 debt, hf = 1.5
    h.open_position(&target, 15 * PRECISION, 10_000 * PRECISION, 2_000);
    h.mint.wallets.insert(liquidator, 10_000 * PRECISION);
    h.mint.supply += 10_000 * PRECISION;

    // Price falls to $800: hf = 0.6
    let prices = h.prices(800);
    let outcome = SynthEngine::liquidate(
        &mut h.state,
        &prices,
        &liquidator,
        &target,
        &asset,
        10_000 * PRECISION,
        NOW,
        &mut h.vault,
        &mut h.mint,
    )
    .unwrap();

    // 12.5 units cover the debt, 1.25 more as bonus
    assert_eq!(outcome.collateral_seized, 13_750 * PRECISION / 1_000);
    assert_eq!(outcome.debt_covered, 10_000 * PRECISION);
    assert!(outcome.starting_health_factor < MIN_HEALTH_FACTOR);
    assert_eq!(outcome.ending_health_factor, MAX_HEALTH_FACTOR);

    assert_eq!(h.vault.wallet(&liquidator, &asset), 13_750 * PRECISION / 1_000);
    assert_eq!(
        h.state.collateral.balance(&target, &asset),
        1_250 * PRECISION / 1_000
    );
    assert_eq!(h.state.debt.balance(&target), 0);
    assert_eq!(h.mint.wallet(&liquidator), 0);
    assert_eq!(h.state.total_liquidations, 1);
}

#[test]
fn test_partial_liquidation_improves_health_factor() {
    let mut h = Harness::new();
    let target = Pubkey::new_unique();
    let liquidator = Pubkey::new_unique();
    let asset = h.asset;

    h.open_position(&target, 15 * PRECISION, 10_000 * PRECISION, 2_000);
    h.mint.wallets.insert(liquidator, 5_000 * PRECISION);
    h.mint.supply += 5_000 * PRECISION;

    let prices = h.prices(800);
    let outcome = SynthEngine::liquidate(
        &mut h.state,
        &prices,
        &liquidator,
        &target,
        &asset,
        5_000 * PRECISION,
        NOW,
        &mut h.vault,
        &mut h.mint,
    )
    .unwrap();

    // 8.125 units remain against 5000 debt: hf rises from 0.6 to 0.65
    assert_eq!(outcome.starting_health_factor, 600_000_000_000_000_000);
    assert_eq!(outcome.ending_health_factor, 650_000_000_000_000_000);
    assert_eq!(h.state.debt.balance(&target), 5_000 * PRECISION);
}

#[test]
fn test_liquidating_solvent_position_rejected() {
    let mut h = Harness::new();
    let target = Pubkey::new_unique();
    let liquidator = Pubkey::new_unique();
    let asset = h.asset;
    h.open_position(&target, 15 * PRECISION, 10_000 * PRECISION, 2_000);

    let prices = h.prices(2_000);
    assert_eq!(
        SynthEngine::liquidate(
            &mut h.state,
            &prices,
            &liquidator,
            &target,
            &asset,
            1_000 * PRECISION,
            NOW,
            &mut h.vault,
            &mut h.mint,
        ),
        Err(EngineError::HealthFactorOk)
    );
}

#[test]
fn test_liquidation_rejects_zero_cover() {
    let mut h = Harness::new();
    let target = Pubkey::new_unique();
    let liquidator = Pubkey::new_unique();
    let asset = h.asset;
    h.open_position(&target, 15 * PRECISION, 10_000 * PRECISION, 2_000);

    let prices = h.prices(800);
    assert_eq!(
        SynthEngine::liquidate(
            &mut h.state,
            &prices,
            &liquidator,
            &target,
            &asset,
            0,
            NOW,
            &mut h.vault,
            &mut h.mint,
        ),
        Err(EngineError::InvalidAmount)
    );
}

#[test]
fn test_liquidation_that_worsens_position_rolls_back() {
    let mut h = Harness::new();
    let target = Pubkey::new_unique();
    let liquidator = Pubkey::new_unique();
    let asset = h.asset;

    // Opened at the boundary: 10 units, 10,000 debt, hf = 1.0
    h.open_position(&target, 10 * PRECISION, 10_000 * PRECISION, 2_000);
    h.mint.wallets.insert(liquidator, 5_000 * PRECISION);
    h.mint.supply += 5_000 * PRECISION;

    // At $800 the position is deeply under water (hf = 0.4). Covering
    // 5000 seizes 6.875 units and drives hf down to 0.25.
    let prices = h.prices(800);
    assert_eq!(
        SynthEngine::liquidate(
            &mut h.state,
            &prices,
            &liquidator,
            &target,
            &asset,
            5_000 * PRECISION,
            NOW,
            &mut h.vault,
            &mut h.mint,
        ),
        Err(EngineError::HealthFactorNotImproved)
    );

    assert_eq!(h.state.collateral.balance(&target, &asset), 10 * PRECISION);
    assert_eq!(h.state.debt.balance(&target), 10_000 * PRECISION);
    assert_eq!(h.state.total_liquidations, 0);
    assert!(!h.state.locked);
}

#[test]
fn test_bonus_unfundable_when_collateral_exhausted() {
    let mut h = Harness::new();
    let target = Pubkey::new_unique();
    let liquidator = Pubkey::new_unique();
    let asset = h.asset;

    h.open_position(&target, 10 * PRECISION, 10_000 * PRECISION, 2_000);
    h.mint.wallets.insert(liquidator, 10_000 * PRECISION);
    h.mint.supply += 10_000 * PRECISION;

    // Covering the full 10,000 debt at $800 asks for 13.75 units but the
    // target only holds 10. The bonus cannot be funded.
    let prices = h.prices(800);
    assert_eq!(
        SynthEngine::liquidate(
            &mut h.state,
            &prices,
            &liquidator,
            &target,
            &asset,
            10_000 * PRECISION,
            NOW,
            &mut h.vault,
            &mut h.mint,
        ),
        Err(EngineError::InsufficientCollateral)
    );
    assert_eq!(h.state.collateral.balance(&target, &asset), 10 * PRECISION);
}

#[test]
fn test_insolvent_liquidator_rejected() {
    let mut h = Harness::new();
    let target = Pubkey::new_unique();
    let liquidator = Pubkey::new_unique();
    let asset = h.asset;

    h.open_position(&target, 15 * PRECISION, 10_000 * PRECISION, 2_000);
    // The liquidator carries debt of their own: hf = 2.0 at $2000 but
    // 0.8 once the price falls
    h.open_position(&liquidator, 10 * PRECISION, 5_000 * PRECISION, 2_000);

    let prices = h.prices(800);
    let result = SynthEngine::liquidate(
        &mut h.state,
        &prices,
        &liquidator,
        &target,
        &asset,
        5_000 * PRECISION,
        NOW,
        &mut h.vault,
        &mut h.mint,
    );
    assert!(matches!(result, Err(EngineError::HealthFactorBroken { .. })));

    assert_eq!(h.state.collateral.balance(&target, &asset), 15 * PRECISION);
    assert_eq!(h.state.debt.balance(&target), 10_000 * PRECISION);
}

// ---------------------------------------------------------------------------
// Reentrancy latch
// ---------------------------------------------------------------------------

#[test]
fn test_locked_state_rejects_mutation() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.vault.fund(&user, &asset, 10 * PRECISION);
    h.state.locked = true;

    assert_eq!(
        SynthEngine::deposit_collateral(&mut h.state, &user, &asset, PRECISION, &mut h.vault),
        Err(EngineError::Reentrancy)
    );

    let prices = h.prices(2_000);
    assert_eq!(
        SynthEngine::mint_synthetic(&mut h.state, &prices, &user, PRECISION, NOW, &mut h.mint),
        Err(EngineError::Reentrancy)
    );
}

#[test]
fn test_latch_released_after_success_and_failure() {
    let mut h = Harness::new();
    let user = Pubkey::new_unique();
    let asset = h.asset;
    h.vault.fund(&user, &asset, 10 * PRECISION);

    SynthEngine::deposit_collateral(&mut h.state, &user, &asset, 5 * PRECISION, &mut h.vault)
        .unwrap();
    assert!(!h.state.locked);

    let rogue = Pubkey::new_unique();
    SynthEngine::deposit_collateral(&mut h.state, &user, &rogue, PRECISION, &mut h.vault)
        .unwrap_err();
    assert!(!h.state.locked);
}

// ---------------------------------------------------------------------------
// Instruction codec
// ---------------------------------------------------------------------------

#[test]
fn test_instruction_round_trip() {
    let original = EngineInstruction::Liquidate {
        asset: Pubkey::new_unique(),
        target: Pubkey::new_unique(),
        debt_to_cover: 5_000,
    };
    let packed = original.pack();
    let unpacked = EngineInstruction::unpack(&packed).unwrap();
    assert_eq!(unpacked.pack(), packed);
    match unpacked {
        EngineInstruction::Liquidate { debt_to_cover, .. } => assert_eq!(debt_to_cover, 5_000),
        other => panic!("wrong variant: {:?}", other),
    }

    let original = EngineInstruction::DepositAndMint {
        asset: Pubkey::new_unique(),
        amount: 42,
        mint_amount: 7,
    };
    let packed = original.pack();
    let unpacked = EngineInstruction::unpack(&packed).unwrap();
    assert_eq!(unpacked.pack(), packed);
}

#[test]
fn test_instruction_rejects_garbage() {
    assert!(EngineInstruction::unpack(&[]).is_err());
    assert!(EngineInstruction::unpack(&[200]).is_err());
    assert!(EngineInstruction::unpack(&[1, 2, 3]).is_err());
}

