//! RulesContext - the ruleset, dice and difficulty handed to combat code

use crate::config::Ruleset;
use crate::dice::{Dice, SeededDice};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Difficulty switches that change combat outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Whether player characters can suffer critical hits
    pub critical_hits_on_pcs: bool,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty {
            critical_hits_on_pcs: true,
        }
    }
}

/// Everything an attack needs besides the two combatants
pub struct RulesContext {
    pub rules: Arc<Ruleset>,
    pub dice: Box<dyn Dice>,
    pub difficulty: Difficulty,
}

impl RulesContext {
    pub fn new(rules: Arc<Ruleset>, dice: Box<dyn Dice>) -> Self {
        RulesContext {
            rules,
            dice,
            difficulty: Difficulty::default(),
        }
    }

    /// Built-in rules with dice seeded from `seed`
    pub fn seeded(seed: u64) -> Self {
        RulesContext::new(Arc::new(Ruleset::default()), Box::new(SeededDice::new(seed)))
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }
}
