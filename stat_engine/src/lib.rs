//! stat_engine - Bonus stacking and derived stats for tactical RPG creatures
//!
//! This library provides:
//! - Bonus / BonusList: typed modifiers with D&D-style stacking categories
//! - BonusManager: per-creature aggregation of every active bonus
//! - StatManager: cached derived stats recomputed from bonus deltas
//! - Attack: to-hit, critical and damage resolution between two creatures
//! - Ruleset: TOML-loadable rule values, roles, skills and races

pub mod bonus;
pub mod combat;
pub mod config;
pub mod context;
pub mod creature;
pub mod dice;
pub mod effect;
pub mod error;
pub mod item;
pub mod prelude;
pub mod stat;
pub mod types;

// Re-export core types for convenience
pub use bonus::{Bonus, BonusKind, BonusList, BonusManager, BonusStackTypeList, BonusType, StackType};
pub use combat::{Attack, Damage};
pub use config::{default_rules, ConfigError, Ruleset};
pub use context::{Difficulty, RulesContext};
pub use creature::Creature;
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use effect::{Effect, EffectSet};
pub use error::{CombatError, LoadError};
pub use item::Item;
pub use stat::{SavedStats, Stat, StatManager};
