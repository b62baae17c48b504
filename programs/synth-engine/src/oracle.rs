//! Price feed consumption and USD valuation.
//!
//! The engine never produces prices. It reads feed accounts published by an
//! external oracle and refuses to value collateral against a price that is
//! missing, non-positive or older than [`MAX_PRICE_AGE_SECS`].

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{
    error::EngineError,
    math::{self, ADDITIONAL_FEED_PRECISION, PRECISION},
};

/// A quote older than this (relative to the transaction clock) is rejected.
pub const MAX_PRICE_AGE_SECS: i64 = 3_600;

/// On-chain layout of an oracle feed account. 8-decimal USD price.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFeed {
    pub discriminator: [u8; 8],
    /// Price in USD with 8 fractional digits
    pub price: u64,
    /// Unix time the price was published
    pub publish_time: i64,
}

impl PriceFeed {
    pub const DISCRIMINATOR: [u8; 8] = *b"PRICEFD\0";

    pub const LEN: usize = 8 + 8 + 8;

    pub fn load(data: &[u8]) -> Result<Self, EngineError> {
        let feed = Self::deserialize(&mut &data[..])
            .map_err(|_| EngineError::OracleUnavailable)?;
        if feed.discriminator != Self::DISCRIMINATOR {
            return Err(EngineError::OracleUnavailable);
        }
        Ok(feed)
    }
}

/// A single observed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Price in USD with 8 fractional digits
    pub price: u64,
    /// Unix time the price was published
    pub publish_time: i64,
}

/// Capability interface over the external price source, keyed by feed id.
/// Deterministic fakes stand in for it under test.
pub trait PriceSource {
    fn quote(&self, feed: &Pubkey) -> Option<PriceQuote>;
}

/// Price source backed by feed accounts read once at transaction entry.
#[derive(Debug, Default)]
pub struct SnapshotPriceSource {
    quotes: Vec<(Pubkey, PriceQuote)>,
}

impl SnapshotPriceSource {
    pub fn insert(&mut self, feed: Pubkey, quote: PriceQuote) {
        self.quotes.push((feed, quote));
    }
}

impl PriceSource for SnapshotPriceSource {
    fn quote(&self, feed: &Pubkey) -> Option<PriceQuote> {
        self.quotes
            .iter()
            .find(|(key, _)| key == feed)
            .map(|(_, quote)| *quote)
    }
}

/// Validates a quote and lifts it to working precision.
///
/// `OracleUnavailable` when the feed is unknown, the price is zero, or the
/// publish time is stale (or claims to be from the future).
pub fn validated_price_wad(
    prices: &dyn PriceSource,
    feed: &Pubkey,
    now: i64,
) -> Result<u128, EngineError> {
    let quote = prices.quote(feed).ok_or(EngineError::OracleUnavailable)?;
    if quote.price == 0 {
        return Err(EngineError::OracleUnavailable);
    }
    if quote.publish_time > now || now - quote.publish_time > MAX_PRICE_AGE_SECS {
        return Err(EngineError::OracleUnavailable);
    }
    Ok(quote.price as u128 * ADDITIONAL_FEED_PRECISION)
}

/// USD value (18-decimal) of `amount` units of the asset behind `feed`.
pub fn usd_value(
    prices: &dyn PriceSource,
    feed: &Pubkey,
    amount: u128,
    now: i64,
) -> Result<u128, EngineError> {
    let price_wad = validated_price_wad(prices, feed, now)?;
    math::mul_div(price_wad, amount, PRECISION)
}

/// Inverse of [`usd_value`]: asset quantity worth `usd_amount`.
pub fn token_amount_from_usd(
    prices: &dyn PriceSource,
    feed: &Pubkey,
    usd_amount: u128,
    now: i64,
) -> Result<u128, EngineError> {
    let price_wad = validated_price_wad(prices, feed, now)?;
    math::mul_div(usd_amount, PRECISION, price_wad)
}
