//! Stat dependency graph - which derived stats a bonus change dirties

use crate::bonus::{BonusList, BonusType};
use bitflags::bitflags;

bitflags! {
    /// Groups of derived stats that are recomputed together
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatGroups: u32 {
        /// Str and weight limit
        const STR = 1 << 0;
        const DEX = 1 << 1;
        const CON = 1 << 2;
        const INT = 1 << 3;
        const WIS = 1 << 4;
        const CHA = 1 << 5;
        /// Creature/caster level, level attack and damage, max HP
        const LEVEL = 1 << 6;
        /// Mental resistance and spell resistance
        const MENTAL_RESISTANCE = 1 << 7;
        const PHYSICAL_RESISTANCE = 1 << 8;
        const REFLEX_RESISTANCE = 1 << 9;
        const INITIATIVE = 1 << 10;
        /// Armor class, touch AC, armor penalty, movement cost
        const ARMOR_CLASS = 1 << 11;
        /// Hand attack and damage bonuses, touch attack, attack cost
        const ATTACK = 1 << 12;
    }
}

/// Groups in dependency order; each entry only reads stats of earlier ones
pub const RECOMPUTE_ORDER: [StatGroups; 13] = [
    StatGroups::STR,
    StatGroups::DEX,
    StatGroups::CON,
    StatGroups::INT,
    StatGroups::WIS,
    StatGroups::CHA,
    StatGroups::LEVEL,
    StatGroups::MENTAL_RESISTANCE,
    StatGroups::PHYSICAL_RESISTANCE,
    StatGroups::REFLEX_RESISTANCE,
    StatGroups::INITIATIVE,
    StatGroups::ARMOR_CLASS,
    StatGroups::ATTACK,
];

impl StatGroups {
    /// Groups that read the output of `self` directly
    fn dependents(self) -> StatGroups {
        let mut out = StatGroups::empty();
        if self.contains(StatGroups::STR) {
            out |= StatGroups::ATTACK;
        }
        if self.contains(StatGroups::DEX) {
            out |= StatGroups::REFLEX_RESISTANCE
                | StatGroups::INITIATIVE
                | StatGroups::ARMOR_CLASS
                | StatGroups::ATTACK;
        }
        if self.contains(StatGroups::CON) {
            out |= StatGroups::LEVEL | StatGroups::PHYSICAL_RESISTANCE;
        }
        if self.contains(StatGroups::WIS) {
            out |= StatGroups::MENTAL_RESISTANCE;
        }
        if self.contains(StatGroups::LEVEL) {
            out |= StatGroups::MENTAL_RESISTANCE
                | StatGroups::PHYSICAL_RESISTANCE
                | StatGroups::REFLEX_RESISTANCE
                | StatGroups::ATTACK;
        }
        out
    }

    /// `self` plus everything reachable from it
    pub fn with_dependents(self) -> StatGroups {
        let mut dirty = self;
        loop {
            let next = dirty | dirty.dependents();
            if next == dirty {
                return dirty;
            }
            dirty = next;
        }
    }

    /// Groups a change of this bonus type invalidates
    pub fn for_bonus_type(bonus_type: BonusType) -> StatGroups {
        match bonus_type {
            BonusType::Str => StatGroups::STR,
            BonusType::Dex => StatGroups::DEX,
            BonusType::Con => StatGroups::CON,
            BonusType::Int => StatGroups::INT,
            BonusType::Wis => StatGroups::WIS,
            BonusType::Cha => StatGroups::CHA,

            BonusType::CasterLevel => StatGroups::LEVEL,
            BonusType::MentalResistance | BonusType::SpellResistance => {
                StatGroups::MENTAL_RESISTANCE
            }
            BonusType::PhysicalResistance => StatGroups::PHYSICAL_RESISTANCE,
            BonusType::ReflexResistance => StatGroups::REFLEX_RESISTANCE,
            BonusType::Initiative => StatGroups::INITIATIVE,

            BonusType::ArmorClass
            | BonusType::ArmorPenalty
            | BonusType::ArmorTypeArmorClass
            | BonusType::ArmorTypeArmorPenalty
            | BonusType::ArmorTypeMovementPenalty
            | BonusType::Movement
            | BonusType::Immobilized
            | BonusType::UndispellableImmobilized => StatGroups::ARMOR_CLASS,

            BonusType::Attack
            | BonusType::Damage
            | BonusType::MainHandAttack
            | BonusType::MainHandDamage
            | BonusType::OffHandAttack
            | BonusType::OffHandDamage
            | BonusType::MeleeAttack
            | BonusType::MeleeDamage
            | BonusType::RangedAttack
            | BonusType::RangedDamage
            | BonusType::TouchAttack
            | BonusType::DualWieldAttack
            | BonusType::AttackCost
            | BonusType::BaseWeaponAttack
            | BonusType::BaseWeaponDamage
            | BonusType::BaseWeaponSpeed => StatGroups::ATTACK,

            _ => StatGroups::empty(),
        }
    }

    /// Every group dirtied by a bonus delta, dependents included
    pub fn for_bonus_list(bonuses: &BonusList) -> StatGroups {
        bonuses
            .iter()
            .fold(StatGroups::empty(), |dirty, bonus| {
                dirty | StatGroups::for_bonus_type(bonus.bonus_type())
            })
            .with_dependents()
    }
}
