//! BonusManager - every active bonus of a creature, bucketed for lookup

use super::{Bonus, BonusKind, BonusList, BonusStackTypeList, BonusType, StackType, StandaloneDamageBonusList};
use crate::combat::Damage;
use crate::dice::Dice;
use std::collections::HashMap;

/// Bucket key: the bonus type plus its optional conditional key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BonusKey {
    pub bonus_type: BonusType,
    pub super_type: Option<String>,
}

impl BonusKey {
    pub fn plain(bonus_type: BonusType) -> Self {
        BonusKey {
            bonus_type,
            super_type: None,
        }
    }

    pub fn keyed(super_type: &str, bonus_type: BonusType) -> Self {
        BonusKey {
            bonus_type,
            super_type: Some(super_type.to_string()),
        }
    }

    fn of(bonus: &Bonus) -> Self {
        BonusKey {
            bonus_type: bonus.bonus_type(),
            super_type: bonus.super_type().map(str::to_string),
        }
    }
}

/// Aggregates bonuses into `(key, stack type)` buckets.
///
/// Buckets are created lazily on first add. Queries for keys that were never
/// added return 0 / false.
#[derive(Debug, Clone, Default)]
pub struct BonusManager {
    buckets: HashMap<BonusKey, HashMap<StackType, BonusStackTypeList>>,
    type_counts: HashMap<BonusType, usize>,
    standalone: StandaloneDamageBonusList,
}

impl BonusManager {
    pub fn new() -> Self {
        BonusManager {
            buckets: HashMap::new(),
            type_counts: HashMap::new(),
            standalone: StandaloneDamageBonusList::new(),
        }
    }

    /// Route a bonus into its bucket
    pub fn add(&mut self, bonus: &Bonus) {
        tracing::trace!("adding bonus {}", bonus);
        *self.type_counts.entry(bonus.bonus_type()).or_insert(0) += 1;

        if matches!(bonus.kind(), BonusKind::StandaloneDamage { .. }) {
            self.standalone.add(bonus.clone());
            return;
        }

        self.buckets
            .entry(BonusKey::of(bonus))
            .or_default()
            .entry(bonus.stack_type())
            .or_insert_with(|| BonusStackTypeList::new(bonus.stack_type()))
            .add(bonus.clone());
    }

    /// Remove one bonus equal to `bonus`; returns false if none was present
    pub fn remove(&mut self, bonus: &Bonus) -> bool {
        tracing::trace!("removing bonus {}", bonus);
        let removed = if matches!(bonus.kind(), BonusKind::StandaloneDamage { .. }) {
            self.standalone.remove(bonus)
        } else {
            let key = BonusKey::of(bonus);
            let Some(stacks) = self.buckets.get_mut(&key) else {
                return false;
            };
            let removed = stacks
                .get_mut(&bonus.stack_type())
                .is_some_and(|list| list.remove(bonus));

            stacks.retain(|_, list| !list.is_empty());
            if stacks.is_empty() {
                self.buckets.remove(&key);
            }
            removed
        };

        if removed {
            if let Some(count) = self.type_counts.get_mut(&bonus.bonus_type()) {
                *count -= 1;
                if *count == 0 {
                    self.type_counts.remove(&bonus.bonus_type());
                }
            }
        }
        removed
    }

    pub fn add_all(&mut self, list: &BonusList) {
        for bonus in list {
            self.add(bonus);
        }
    }

    pub fn remove_all(&mut self, list: &BonusList) {
        for bonus in list {
            self.remove(bonus);
        }
    }

    /// Sum of every stack category's total for an unkeyed type
    pub fn get(&self, bonus_type: BonusType) -> i32 {
        self.total_for(&BonusKey::plain(bonus_type), None)
    }

    /// Total of one stack category
    pub fn get_stack(&self, bonus_type: BonusType, stack_type: StackType) -> i32 {
        self.get_stacks(bonus_type, &[stack_type])
    }

    /// Sum of the totals of the listed stack categories
    pub fn get_stacks(&self, bonus_type: BonusType, stack_types: &[StackType]) -> i32 {
        self.total_for(&BonusKey::plain(bonus_type), Some(stack_types))
    }

    /// Total for a conditional bucket (armor type, base weapon, racial type...)
    pub fn get_keyed(&self, super_type: &str, bonus_type: BonusType) -> i32 {
        self.total_for(&BonusKey::keyed(super_type, bonus_type), None)
    }

    /// Whether any bonus of this type is active, keyed or not
    pub fn has(&self, bonus_type: BonusType) -> bool {
        self.type_counts.contains_key(&bonus_type)
    }

    /// Whether a bonus of this type is active for the given key
    pub fn has_keyed(&self, super_type: &str, bonus_type: BonusType) -> bool {
        self.buckets
            .contains_key(&BonusKey::keyed(super_type, bonus_type))
    }

    pub fn has_weapon_proficiency(&self, base_weapon: &str) -> bool {
        self.has_keyed(base_weapon, BonusType::WeaponProficiency)
    }

    pub fn has_armor_proficiency(&self, armor_type: &str) -> bool {
        self.has_keyed(armor_type, BonusType::ArmorProficiency)
    }

    pub fn damage_reduction(&self, damage_type: &str) -> i32 {
        self.get_keyed(damage_type, BonusType::DamageReduction)
    }

    pub fn damage_immunity(&self, damage_type: &str) -> i32 {
        self.get_keyed(damage_type, BonusType::DamageImmunity)
    }

    pub fn skill_bonus(&self, skill: &str) -> i32 {
        self.get_keyed(skill, BonusType::Skill)
    }

    pub fn standalone_damage(&self) -> &StandaloneDamageBonusList {
        &self.standalone
    }

    /// Roll every pending standalone damage bonus
    pub fn roll_standalone_damage(&self, dice: &mut dyn Dice) -> Damage {
        self.standalone.roll(dice)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.type_counts.clear();
        self.standalone.clear();
    }

    fn total_for(&self, key: &BonusKey, stack_types: Option<&[StackType]>) -> i32 {
        let Some(stacks) = self.buckets.get(key) else {
            return 0;
        };
        stacks
            .iter()
            .filter(|(stack_type, _)| stack_types.map_or(true, |wanted| wanted.contains(stack_type)))
            .map(|(_, list)| list.current_total())
            .sum()
    }
}
