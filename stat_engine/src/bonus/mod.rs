//! Bonuses - immutable modifiers and the collections that combine them
//!
//! A [`Bonus`] names what it modifies ([`BonusType`]) and how it stacks with
//! others of the same type ([`StackType`]). Extra keys (armor type, base
//! weapon, racial type, damage type, skill) live in [`BonusKind`] and scope
//! the bonus to a keyed bucket in the [`BonusManager`].

mod list;
mod manager;
mod stack;
mod standalone;
mod types;

pub use list::BonusList;
pub use manager::{BonusKey, BonusManager};
pub use stack::BonusStackTypeList;
pub use standalone::StandaloneDamageBonusList;
pub use types::{parse_stack_type, parse_type, stack_type_from_parts, BonusType, StackType};

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind-specific payload of a bonus.
///
/// The serialized `kind` tag is part of the save format: new kinds get a new
/// tag, existing tags are never renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BonusKind {
    /// Presence only
    Marker,
    Int {
        value: i32,
    },
    ArmorType {
        armor_type: String,
        value: i32,
    },
    BaseWeapon {
        base_weapon: String,
        value: i32,
    },
    RacialType {
        racial_type: String,
        value: i32,
    },
    Damage {
        damage_type: String,
        value: i32,
    },
    Skill {
        skill: String,
        value: i32,
    },
    /// Extra damage rolled fresh in `[min, max]` for every attack
    StandaloneDamage {
        damage_type: String,
        min: i32,
        max: i32,
    },
    ArmorProficiency {
        armor_type: String,
    },
    WeaponProficiency {
        base_weapon: String,
    },
}

/// A single immutable modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    #[serde(rename = "type")]
    bonus_type: BonusType,
    stack_type: StackType,
    #[serde(flatten)]
    kind: BonusKind,
}

impl Bonus {
    /// Create a bonus from its parts
    pub fn new(bonus_type: BonusType, stack_type: StackType, kind: BonusKind) -> Self {
        Bonus {
            bonus_type,
            stack_type,
            kind,
        }
    }

    /// Presence-only bonus such as `Immobilized`
    pub fn marker(bonus_type: BonusType) -> Self {
        Bonus::new(bonus_type, StackType::GenericBonus, BonusKind::Marker)
    }

    /// Plain integer bonus
    pub fn int(bonus_type: BonusType, stack_type: StackType, value: i32) -> Self {
        Bonus::new(bonus_type, stack_type, BonusKind::Int { value })
    }

    pub fn armor_type(
        armor_type: impl Into<String>,
        bonus_type: BonusType,
        stack_type: StackType,
        value: i32,
    ) -> Self {
        Bonus::new(
            bonus_type,
            stack_type,
            BonusKind::ArmorType {
                armor_type: armor_type.into(),
                value,
            },
        )
    }

    pub fn base_weapon(
        base_weapon: impl Into<String>,
        bonus_type: BonusType,
        stack_type: StackType,
        value: i32,
    ) -> Self {
        Bonus::new(
            bonus_type,
            stack_type,
            BonusKind::BaseWeapon {
                base_weapon: base_weapon.into(),
                value,
            },
        )
    }

    pub fn racial_type(
        racial_type: impl Into<String>,
        bonus_type: BonusType,
        stack_type: StackType,
        value: i32,
    ) -> Self {
        Bonus::new(
            bonus_type,
            stack_type,
            BonusKind::RacialType {
                racial_type: racial_type.into(),
                value,
            },
        )
    }

    pub fn damage(
        damage_type: impl Into<String>,
        bonus_type: BonusType,
        stack_type: StackType,
        value: i32,
    ) -> Self {
        Bonus::new(
            bonus_type,
            stack_type,
            BonusKind::Damage {
                damage_type: damage_type.into(),
                value,
            },
        )
    }

    pub fn skill(skill: impl Into<String>, stack_type: StackType, value: i32) -> Self {
        Bonus::new(
            BonusType::Skill,
            stack_type,
            BonusKind::Skill {
                skill: skill.into(),
                value,
            },
        )
    }

    pub fn standalone_damage(damage_type: impl Into<String>, min: i32, max: i32) -> Self {
        Bonus::new(
            BonusType::StandaloneDamage,
            StackType::StackableBonus,
            BonusKind::StandaloneDamage {
                damage_type: damage_type.into(),
                min,
                max,
            },
        )
    }

    pub fn armor_proficiency(armor_type: impl Into<String>) -> Self {
        Bonus::new(
            BonusType::ArmorProficiency,
            StackType::GenericBonus,
            BonusKind::ArmorProficiency {
                armor_type: armor_type.into(),
            },
        )
    }

    pub fn weapon_proficiency(base_weapon: impl Into<String>) -> Self {
        Bonus::new(
            BonusType::WeaponProficiency,
            StackType::GenericBonus,
            BonusKind::WeaponProficiency {
                base_weapon: base_weapon.into(),
            },
        )
    }

    pub fn bonus_type(&self) -> BonusType {
        self.bonus_type
    }

    pub fn stack_type(&self) -> StackType {
        self.stack_type
    }

    pub fn kind(&self) -> &BonusKind {
        &self.kind
    }

    /// Whether this bonus carries a single integer value
    pub fn has_value(&self) -> bool {
        !matches!(
            self.kind,
            BonusKind::Marker
                | BonusKind::StandaloneDamage { .. }
                | BonusKind::ArmorProficiency { .. }
                | BonusKind::WeaponProficiency { .. }
        )
    }

    /// Integer value, or 0 for bonuses without one
    pub fn value(&self) -> i32 {
        match self.kind {
            BonusKind::Int { value }
            | BonusKind::ArmorType { value, .. }
            | BonusKind::BaseWeapon { value, .. }
            | BonusKind::RacialType { value, .. }
            | BonusKind::Damage { value, .. }
            | BonusKind::Skill { value, .. } => value,
            BonusKind::Marker
            | BonusKind::StandaloneDamage { .. }
            | BonusKind::ArmorProficiency { .. }
            | BonusKind::WeaponProficiency { .. } => 0,
        }
    }

    /// Key that scopes this bonus to a conditional bucket, if any
    pub fn super_type(&self) -> Option<&str> {
        match &self.kind {
            BonusKind::Marker | BonusKind::Int { .. } => None,
            BonusKind::ArmorType { armor_type, .. }
            | BonusKind::ArmorProficiency { armor_type } => Some(armor_type),
            BonusKind::BaseWeapon { base_weapon, .. }
            | BonusKind::WeaponProficiency { base_weapon } => Some(base_weapon),
            BonusKind::RacialType { racial_type, .. } => Some(racial_type),
            BonusKind::Damage { damage_type, .. }
            | BonusKind::StandaloneDamage { damage_type, .. } => Some(damage_type),
            BonusKind::Skill { skill, .. } => Some(skill),
        }
    }

    /// A same-kind bonus with its value lowered by `amount`.
    ///
    /// Standalone damage lowers both ends of its range; bonuses without a
    /// value come back unchanged.
    pub fn clone_with_reduction(&self, amount: i32) -> Bonus {
        let kind = match &self.kind {
            BonusKind::Int { value } => BonusKind::Int {
                value: value - amount,
            },
            BonusKind::ArmorType { armor_type, value } => BonusKind::ArmorType {
                armor_type: armor_type.clone(),
                value: value - amount,
            },
            BonusKind::BaseWeapon { base_weapon, value } => BonusKind::BaseWeapon {
                base_weapon: base_weapon.clone(),
                value: value - amount,
            },
            BonusKind::RacialType { racial_type, value } => BonusKind::RacialType {
                racial_type: racial_type.clone(),
                value: value - amount,
            },
            BonusKind::Damage { damage_type, value } => BonusKind::Damage {
                damage_type: damage_type.clone(),
                value: value - amount,
            },
            BonusKind::Skill { skill, value } => BonusKind::Skill {
                skill: skill.clone(),
                value: value - amount,
            },
            BonusKind::StandaloneDamage {
                damage_type,
                min,
                max,
            } => BonusKind::StandaloneDamage {
                damage_type: damage_type.clone(),
                min: min - amount,
                max: max - amount,
            },
            other => other.clone(),
        };

        Bonus::new(self.bonus_type, self.stack_type, kind)
    }

    /// Append a tooltip/log description of this bonus
    pub fn append_description(&self, out: &mut String) {
        let stack = match self.stack_type {
            StackType::GenericBonus
            | StackType::GenericPenalty
            | StackType::StackableBonus
            | StackType::StackablePenalty => String::new(),
            other => format!(" ({})", other),
        };

        let text = match &self.kind {
            BonusKind::Marker => self.bonus_type.to_string(),
            BonusKind::Int { value } => {
                format!("{:+} {}{}", value, self.bonus_type, stack)
            }
            BonusKind::ArmorType { armor_type, value } => {
                format!("{:+} {} with {} Armor{}", value, self.bonus_type, armor_type, stack)
            }
            BonusKind::BaseWeapon { base_weapon, value } => {
                format!("{:+} {} with {}{}", value, self.bonus_type, base_weapon, stack)
            }
            BonusKind::RacialType { racial_type, value } => {
                format!("{:+} {} {}{}", value, self.bonus_type, racial_type, stack)
            }
            BonusKind::Damage { damage_type, value } => {
                format!("{:+} {} {}{}", value, damage_type, self.bonus_type, stack)
            }
            BonusKind::Skill { skill, value } => format!("{:+} {}{}", value, skill, stack),
            BonusKind::StandaloneDamage {
                damage_type,
                min,
                max,
            } => {
                if min == max {
                    format!("{} {} Damage", min, damage_type)
                } else {
                    format!("{} to {} {} Damage", min, max, damage_type)
                }
            }
            BonusKind::ArmorProficiency { armor_type } => {
                format!("Armor Proficiency: {}", armor_type)
            }
            BonusKind::WeaponProficiency { base_weapon } => {
                format!("Weapon Proficiency: {}", base_weapon)
            }
        };

        out.push_str(&text);
    }

    /// Serialize to the structured save format
    pub fn save(&self) -> Result<serde_json::Value, LoadError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild a bonus from the structured save format, dispatching on `kind`
    pub fn load(data: &serde_json::Value) -> Result<Bonus, LoadError> {
        Ok(Bonus::deserialize(data)?)
    }
}

impl fmt::Display for Bonus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.append_description(&mut out);
        f.write_str(&out)
    }
}
