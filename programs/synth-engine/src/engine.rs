//! The solvency core: health-factor derivation, position control and
//! liquidation, expressed over the injected token and price collaborators.
//!
//! Every mutating entry point runs under a reentrancy latch and a ledger
//! checkpoint: either every step commits or the ledgers are restored to
//! their pre-call image. On chain the aborted transaction additionally
//! voids the collaborator CPIs, so the two rollback layers agree.

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    error::EngineError,
    math::{self, PRECISION},
    oracle::{self, PriceSource},
    state::EngineState,
    tokens::{CollateralGateway, SyntheticIssuer},
};

/// Share of nominal collateral value counted toward solvency, in percent.
/// 50 means the system requires 200% collateralization at the boundary.
pub const LIQUIDATION_THRESHOLD: u128 = 50;

/// Percent denominator for threshold and bonus.
pub const LIQUIDATION_PRECISION: u128 = 100;

/// Seizure premium paid to liquidators, in percent of the covered value.
pub const LIQUIDATION_BONUS: u128 = 10;

/// A position at or above this health factor is solvent.
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

/// Sentinel health factor for debt-free participants: always safe.
pub const MAX_HEALTH_FACTOR: u128 = u128::MAX;

/// Result of a successful liquidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub starting_health_factor: u128,
    pub ending_health_factor: u128,
    pub collateral_seized: u128,
    pub debt_covered: u128,
}

/// Main position and liquidation engine
pub struct SynthEngine;

impl SynthEngine {
    /// USD value (18-decimal) of `amount` units of a registered asset.
    pub fn usd_value(
        state: &EngineState,
        prices: &dyn PriceSource,
        asset: &Pubkey,
        amount: u128,
        now: i64,
    ) -> Result<u128, EngineError> {
        let feed = state
            .feed_for(asset)
            .ok_or(EngineError::UnsupportedCollateral)?;
        oracle::usd_value(prices, feed, amount, now)
    }

    /// Quantity of a registered asset worth `usd_amount`.
    pub fn token_amount_from_usd(
        state: &EngineState,
        prices: &dyn PriceSource,
        asset: &Pubkey,
        usd_amount: u128,
        now: i64,
    ) -> Result<u128, EngineError> {
        let feed = state
            .feed_for(asset)
            .ok_or(EngineError::UnsupportedCollateral)?;
        oracle::token_amount_from_usd(prices, feed, usd_amount, now)
    }

    /// Total USD value of a participant's collateral, summed over the
    /// registry in registration order.
    pub fn account_collateral_value_usd(
        state: &EngineState,
        prices: &dyn PriceSource,
        owner: &Pubkey,
        now: i64,
    ) -> Result<u128, EngineError> {
        let mut total = 0u128;
        for asset in &state.assets {
            let balance = state.collateral.balance(owner, &asset.mint);
            if balance == 0 {
                continue;
            }
            let value = oracle::usd_value(prices, &asset.feed, balance, now)?;
            total = math::checked_add(total, value)?;
        }
        Ok(total)
    }

    /// Solvency ratio of a participant. Debt-free participants report the
    /// safe sentinel and can never be liquidated.
    pub fn health_factor(
        state: &EngineState,
        prices: &dyn PriceSource,
        owner: &Pubkey,
        now: i64,
    ) -> Result<u128, EngineError> {
        let debt = state.debt.balance(owner);
        if debt == 0 {
            return Ok(MAX_HEALTH_FACTOR);
        }
        let collateral_usd = Self::account_collateral_value_usd(state, prices, owner, now)?;
        let adjusted =
            math::mul_div(collateral_usd, LIQUIDATION_THRESHOLD, LIQUIDATION_PRECISION)?;
        math::mul_div(adjusted, PRECISION, debt)
    }

    fn assert_solvent(
        state: &EngineState,
        prices: &dyn PriceSource,
        owner: &Pubkey,
        now: i64,
    ) -> Result<(), EngineError> {
        let health_factor = Self::health_factor(state, prices, owner, now)?;
        if health_factor < MIN_HEALTH_FACTOR {
            return Err(EngineError::HealthFactorBroken { health_factor });
        }
        Ok(())
    }

    /// Credit collateral and pull the tokens into engine custody.
    /// No solvency check: a deposit can only improve the health factor.
    pub fn deposit_collateral(
        state: &mut EngineState,
        participant: &Pubkey,
        asset: &Pubkey,
        amount: u128,
        gateway: &mut dyn CollateralGateway,
    ) -> Result<(), EngineError> {
        Self::execute(state, |state| {
            Self::deposit_inner(state, participant, asset, amount, gateway)
        })
    }

    /// Debit collateral, push the tokens back, then re-check solvency.
    pub fn withdraw_collateral(
        state: &mut EngineState,
        prices: &dyn PriceSource,
        participant: &Pubkey,
        asset: &Pubkey,
        amount: u128,
        now: i64,
        gateway: &mut dyn CollateralGateway,
    ) -> Result<(), EngineError> {
        Self::execute(state, |state| {
            Self::redeem_inner(state, participant, participant, asset, amount, gateway)?;
            Self::assert_solvent(state, prices, participant, now)
        })
    }

    /// Record debt, check solvency, then instruct the external mint.
    pub fn mint_synthetic(
        state: &mut EngineState,
        prices: &dyn PriceSource,
        participant: &Pubkey,
        amount: u128,
        now: i64,
        issuer: &mut dyn SyntheticIssuer,
    ) -> Result<(), EngineError> {
        Self::execute(state, |state| {
            Self::mint_inner(state, prices, participant, amount, now, issuer)
        })
    }

    /// Pull and destroy synthetic from the participant, reducing their debt.
    pub fn burn_synthetic(
        state: &mut EngineState,
        prices: &dyn PriceSource,
        participant: &Pubkey,
        amount: u128,
        now: i64,
        issuer: &mut dyn SyntheticIssuer,
    ) -> Result<(), EngineError> {
        Self::execute(state, |state| {
            Self::burn_inner(state, participant, participant, amount, issuer)?;
            Self::assert_solvent(state, prices, participant, now)
        })
    }

    /// Deposit collateral and mint against it as one logical unit.
    pub fn deposit_and_mint(
        state: &mut EngineState,
        prices: &dyn PriceSource,
        participant: &Pubkey,
        asset: &Pubkey,
        amount: u128,
        mint_amount: u128,
        now: i64,
        gateway: &mut dyn CollateralGateway,
        issuer: &mut dyn SyntheticIssuer,
    ) -> Result<(), EngineError> {
        Self::execute(state, |state| {
            Self::deposit_inner(state, participant, asset, amount, gateway)?;
            Self::mint_inner(state, prices, participant, mint_amount, now, issuer)
        })
    }

    /// Burn synthetic then withdraw collateral as one logical unit.
    /// Burning first keeps the post-withdrawal solvency check fair.
    pub fn redeem_for_synthetic(
        state: &mut EngineState,
        prices: &dyn PriceSource,
        participant: &Pubkey,
        asset: &Pubkey,
        amount: u128,
        burn_amount: u128,
        now: i64,
        gateway: &mut dyn CollateralGateway,
        issuer: &mut dyn SyntheticIssuer,
    ) -> Result<(), EngineError> {
        Self::execute(state, |state| {
            Self::burn_inner(state, participant, participant, burn_amount, issuer)?;
            Self::redeem_inner(state, participant, participant, asset, amount, gateway)?;
            Self::assert_solvent(state, prices, participant, now)
        })
    }

    /// Forcibly close part of an undercollateralized position.
    ///
    /// The liquidator pays `debt_to_cover` of synthetic and receives the
    /// debt-equivalent collateral plus a 10% bonus, seized from the target.
    /// The target's health factor must not end below where it started.
    ///
    /// Known economic limit: once a position's collateral is worth less than
    /// its debt, seizure plus bonus can exceed what the target holds and the
    /// operation fails with `InsufficientCollateral` — the bonus incentive
    /// cannot be funded and such positions may persist unliquidated.
    pub fn liquidate(
        state: &mut EngineState,
        prices: &dyn PriceSource,
        liquidator: &Pubkey,
        target: &Pubkey,
        asset: &Pubkey,
        debt_to_cover: u128,
        now: i64,
        gateway: &mut dyn CollateralGateway,
        issuer: &mut dyn SyntheticIssuer,
    ) -> Result<LiquidationOutcome, EngineError> {
        Self::execute(state, |state| {
            if debt_to_cover == 0 {
                return Err(EngineError::InvalidAmount);
            }

            let starting_health_factor = Self::health_factor(state, prices, target, now)?;
            if starting_health_factor >= MIN_HEALTH_FACTOR {
                return Err(EngineError::HealthFactorOk);
            }

            // Size the seizure: debt-equivalent collateral plus the bonus
            let feed = *state
                .feed_for(asset)
                .ok_or(EngineError::UnsupportedCollateral)?;
            let collateral_from_debt =
                oracle::token_amount_from_usd(prices, &feed, debt_to_cover, now)?;
            let bonus =
                math::mul_div(collateral_from_debt, LIQUIDATION_BONUS, LIQUIDATION_PRECISION)?;
            let collateral_seized = math::checked_add(collateral_from_debt, bonus)?;

            // Seize from the target, pay the liquidator
            Self::redeem_inner(state, target, liquidator, asset, collateral_seized, gateway)?;

            // Liquidator funds the debt reduction
            Self::burn_inner(state, target, liquidator, debt_to_cover, issuer)?;

            let ending_health_factor = Self::health_factor(state, prices, target, now)?;
            if ending_health_factor < starting_health_factor {
                return Err(EngineError::HealthFactorNotImproved);
            }

            // Liquidators may hold debt of their own and must not self-harm
            Self::assert_solvent(state, prices, liquidator, now)?;

            state.total_liquidations += 1;
            msg!(
                "Liquidated: target={} liquidator={} asset={} seized={} debt_covered={}",
                target,
                liquidator,
                asset,
                collateral_seized,
                debt_to_cover
            );

            Ok(LiquidationOutcome {
                starting_health_factor,
                ending_health_factor,
                collateral_seized,
                debt_covered: debt_to_cover,
            })
        })
    }

    /// Reentrancy latch plus all-or-nothing checkpoint around one operation.
    fn execute<T>(
        state: &mut EngineState,
        op: impl FnOnce(&mut EngineState) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        if state.locked {
            return Err(EngineError::Reentrancy);
        }
        state.locked = true;
        let checkpoint = state.checkpoint();
        let outcome = op(state);
        if outcome.is_err() {
            state.restore(checkpoint);
        }
        state.locked = false;
        outcome
    }

    fn deposit_inner(
        state: &mut EngineState,
        participant: &Pubkey,
        asset: &Pubkey,
        amount: u128,
        gateway: &mut dyn CollateralGateway,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }
        if !state.is_supported(asset) {
            return Err(EngineError::UnsupportedCollateral);
        }

        state.collateral.credit(participant, asset, amount)?;
        state.total_deposits += 1;
        msg!(
            "CollateralDeposited: participant={} asset={} amount={}",
            participant,
            asset,
            amount
        );

        gateway
            .pull(asset, participant, amount)
            .map_err(|_| EngineError::CollateralTransferFailed)
    }

    fn redeem_inner(
        state: &mut EngineState,
        from: &Pubkey,
        to: &Pubkey,
        asset: &Pubkey,
        amount: u128,
        gateway: &mut dyn CollateralGateway,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }

        state.collateral.debit(from, asset, amount)?;
        msg!(
            "CollateralRedeemed: from={} to={} asset={} amount={}",
            from,
            to,
            asset,
            amount
        );

        gateway
            .push(asset, to, amount)
            .map_err(|_| EngineError::CollateralTransferFailed)
    }

    fn mint_inner(
        state: &mut EngineState,
        prices: &dyn PriceSource,
        participant: &Pubkey,
        amount: u128,
        now: i64,
        issuer: &mut dyn SyntheticIssuer,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }

        state.debt.credit(participant, amount)?;
        state.total_mints += 1;
        Self::assert_solvent(state, prices, participant, now)?;

        issuer
            .mint_to(participant, amount)
            .map_err(|_| EngineError::MintFailed)
    }

    fn burn_inner(
        state: &mut EngineState,
        on_behalf_of: &Pubkey,
        payer: &Pubkey,
        amount: u128,
        issuer: &mut dyn SyntheticIssuer,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }
        if amount > state.debt.balance(on_behalf_of) {
            return Err(EngineError::InsufficientDebt);
        }

        issuer
            .burn_from(payer, amount)
            .map_err(|_| EngineError::BurnTransferFailed)?;
        state.debt.debit(on_behalf_of, amount)
    }
}
