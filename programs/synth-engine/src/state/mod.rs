pub mod engine_state;
pub mod ledger;

pub use engine_state::{Checkpoint, CollateralAsset, EngineState};
pub use ledger::{CollateralLedger, CollateralPosition, DebtLedger, DebtPosition};
