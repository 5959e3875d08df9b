//! Damage - typed damage amounts and their mitigation

use crate::bonus::BonusManager;
use serde::{Deserialize, Serialize};

/// Damage type used for HP loss caused by stat changes; never mitigated
pub const EFFECT_DAMAGE_TYPE: &str = "Effect";

/// Damage of one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEntry {
    pub damage_type: String,
    pub amount: i32,
}

/// Damage about to be dealt, grouped by damage type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damage {
    entries: Vec<DamageEntry>,
}

impl Damage {
    pub fn new() -> Self {
        Damage {
            entries: Vec::new(),
        }
    }

    /// Single-type damage
    pub fn of(damage_type: &str, amount: i32) -> Self {
        let mut damage = Damage::new();
        damage.add(damage_type, amount);
        damage
    }

    /// Add damage, merging with an existing entry of the same type
    pub fn add(&mut self, damage_type: &str, amount: i32) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.damage_type == damage_type)
        {
            Some(entry) => entry.amount += amount,
            None => self.entries.push(DamageEntry {
                damage_type: damage_type.to_string(),
                amount,
            }),
        }
    }

    /// Merge all entries of `other`
    pub fn add_all(&mut self, other: &Damage) {
        for entry in &other.entries {
            self.add(&entry.damage_type, entry.amount);
        }
    }

    pub fn entries(&self) -> &[DamageEntry] {
        &self.entries
    }

    pub fn amount_of(&self, damage_type: &str) -> i32 {
        self.entries
            .iter()
            .filter(|e| e.damage_type == damage_type)
            .map(|e| e.amount)
            .sum()
    }

    pub fn total(&self) -> i32 {
        self.entries.iter().map(|e| e.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Damage left after the defender's immunity and reduction.
    ///
    /// Per entry: `max(0, amount * (100 - immunity) / 100 - reduction)`.
    /// Entries of type [`EFFECT_DAMAGE_TYPE`] pass through unchanged.
    pub fn mitigated_by(&self, defender: &BonusManager) -> Damage {
        let mut applied = Damage::new();
        for entry in &self.entries {
            let amount = if entry.damage_type == EFFECT_DAMAGE_TYPE {
                entry.amount
            } else {
                let immunity = defender.damage_immunity(&entry.damage_type);
                let reduction = defender.damage_reduction(&entry.damage_type);
                (entry.amount * (100 - immunity) / 100 - reduction).max(0)
            };
            applied.add(&entry.damage_type, amount);
        }
        applied
    }
}
