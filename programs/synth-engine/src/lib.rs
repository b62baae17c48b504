// Overcollateralized synthetic-dollar engine
// Native Solana implementation - NO ANCHOR
//
// Participants lock approved collateral tokens, mint a USD-pegged synthetic
// against them up to a 200% collateralization boundary, and anyone may
// liquidate a position whose health factor falls below 1.0.

pub mod engine;
pub mod error;
pub mod instruction;
pub mod math;
pub mod oracle;
pub mod processor;
pub mod state;
pub mod tokens;

use processor::process_instruction;

// Declare program ID
solana_program::declare_id!("SynthEngine11111111111111111111111111111111");

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction);
