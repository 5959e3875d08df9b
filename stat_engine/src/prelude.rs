//! Prelude module for convenient imports
//!
//! ```rust
//! use stat_engine::prelude::*;
//! ```

// Bonuses
pub use crate::bonus::{Bonus, BonusList, BonusManager, BonusType, StackType};

// Stats
pub use crate::stat::{SavedStats, Stat, StatManager};

// Creatures and items
pub use crate::creature::{Creature, HitPoints};
pub use crate::effect::Effect;
pub use crate::item::{ArmorStats, Handedness, Item, ItemKind, Quality, WeaponStats, WeaponType};

// Combat
pub use crate::combat::{Attack, Damage};
pub use crate::context::{Difficulty, RulesContext};
pub use crate::dice::{Dice, ScriptedDice, SeededDice};

// Config
pub use crate::config::{default_rules, Ruleset};

// Shared types
pub use crate::types::{Attribute, Faction, GridPoint, HandSlot, InventorySlot};
