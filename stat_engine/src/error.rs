//! Error types

use crate::types::{HandSlot, InventorySlot};
use thiserror::Error;

/// Misuse of the attack constructors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CombatError {
    #[error("Slot {0:?} cannot make a weapon attack")]
    NotAHand(InventorySlot),
    #[error("No weapon equipped in {0:?}")]
    NoWeaponInSlot(HandSlot),
}

/// Failure to restore persisted data
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Malformed saved data: {0}")]
    Malformed(#[from] serde_json::Error),
}
