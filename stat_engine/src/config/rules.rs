//! Ruleset - named rule values and content lookups

use super::ConfigError;
use crate::bonus::BonusList;
use crate::item::{Handedness, WeaponStats, WeaponType};
use crate::types::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A damage type known to the ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageTypeDef {
    pub id: String,
    #[serde(default)]
    pub physical: bool,
}

/// A character role (class)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDef {
    pub id: String,
    pub hp_at_level_one: i32,
    pub hp_per_level: i32,
    pub attack_per_level: i32,
    pub damage_per_level: i32,
    #[serde(default)]
    pub caster_level_per_level: i32,
    #[serde(default)]
    pub spell_casting_attribute: Option<Attribute>,
    #[serde(default)]
    pub spell_failure_base: i32,
    #[serde(default)]
    pub spell_failure_spell_level_factor: i32,
    #[serde(default)]
    pub spell_failure_ability_factor: i32,
    #[serde(default)]
    pub spell_failure_level_factor: i32,
}

/// A skill and the attribute that modifies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub key_attribute: Attribute,
}

/// A bonus as authored in content files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusDef {
    #[serde(rename = "type")]
    pub bonus_type: String,
    #[serde(default)]
    pub stack_type: Option<String>,
    #[serde(default)]
    pub value: i32,
    /// Armor type, base weapon, racial type, damage type or skill
    #[serde(default)]
    pub key: Option<String>,
}

/// A playable or monster race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceDef {
    pub id: String,
    #[serde(default)]
    pub racial_types: Vec<String>,
    #[serde(default)]
    pub bonuses: Vec<BonusDef>,
}

impl RaceDef {
    /// Build the race's innate bonuses; malformed entries are logged and skipped
    pub fn bonus_list(&self) -> BonusList {
        let mut list = BonusList::new();
        for def in &self.bonuses {
            let stack = def.stack_type.as_deref();
            match &def.key {
                Some(key) => list.add_named_keyed(&def.bonus_type, key, stack, def.value),
                None => list.add_named(&def.bonus_type, stack, def.value),
            };
        }
        list
    }
}

/// All tunable rules content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub values: HashMap<String, i32>,
    #[serde(default)]
    pub strings: HashMap<String, String>,
    #[serde(default)]
    pub damage_types: Vec<DamageTypeDef>,
    #[serde(default)]
    pub roles: Vec<RoleDef>,
    #[serde(default)]
    pub skills: Vec<SkillDef>,
    #[serde(default)]
    pub races: Vec<RaceDef>,
    #[serde(default = "default_unarmed")]
    pub unarmed: WeaponStats,
}

impl Default for Ruleset {
    fn default() -> Self {
        default_rules()
    }
}

impl Ruleset {
    /// Named integer rule value; unknown names log and return 0
    pub fn value(&self, name: &str) -> i32 {
        match self.values.get(name) {
            Some(value) => *value,
            None => {
                tracing::warn!("Rule value '{}' not found", name);
                0
            }
        }
    }

    /// Named string rule value
    pub fn string(&self, name: &str) -> Option<&str> {
        let value = self.strings.get(name).map(String::as_str);
        if value.is_none() {
            tracing::warn!("Rule string '{}' not found", name);
        }
        value
    }

    pub fn damage_type(&self, id: &str) -> Option<&DamageTypeDef> {
        self.damage_types.iter().find(|d| d.id == id)
    }

    pub fn role(&self, id: &str) -> Option<&RoleDef> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn race(&self, id: &str) -> Option<&RaceDef> {
        self.races.iter().find(|r| r.id == id)
    }

    /// Fill in any missing built-in values and check cross references
    pub(super) fn validated(mut self) -> Result<Ruleset, ConfigError> {
        for (name, value) in default_values() {
            self.values.entry(name).or_insert(value);
        }
        for (name, value) in default_strings() {
            self.strings.entry(name).or_insert(value);
        }

        for role in &self.roles {
            if role.hp_at_level_one < 0 || role.hp_per_level < 0 {
                return Err(ConfigError::ValidationError(format!(
                    "Role '{}' has negative hit points",
                    role.id
                )));
            }
        }

        let unarmed = &self.unarmed;
        if unarmed.min_damage > unarmed.max_damage {
            return Err(ConfigError::ValidationError(
                "Unarmed strike min damage exceeds max damage".to_string(),
            ));
        }

        Ok(self)
    }
}

fn default_values() -> Vec<(String, i32)> {
    [
        ("WeightLimitBase", 100),
        ("WeightLimitStrengthFactor", 10),
        ("BaseMovementCost", 1000),
        ("BaseArmorClass", 50),
        ("FlankingBonus", 20),
        ("FlankingAngle", 140),
        ("ImmobilizedArmorClassPenalty", 20),
        ("DualWieldMainHandPenalty", 15),
        ("DualWieldOffHandPenalty", 25),
        ("DualWieldMainHandStrDamage", 5),
        ("DualWieldOffHandStrDamage", 3),
        ("RangedStrengthDamageFactor", 5),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

fn default_strings() -> Vec<(String, String)> {
    [("DefaultArmorType", "None")]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn default_unarmed() -> WeaponStats {
    WeaponStats {
        base_weapon: "Unarmed".to_string(),
        weapon_type: WeaponType::Melee,
        handedness: Handedness::Light,
        damage_type: "Blunt".to_string(),
        min_damage: 1,
        max_damage: 3,
        critical_threat: 100,
        critical_multiplier: 2,
        attack_cost: 3000,
        range_penalty: 0,
        reach: 1,
        min_strength_bonus: 0,
        max_strength_bonus: 0,
    }
}

fn role(id: &str, hp: (i32, i32), per_level: (i32, i32), caster: Option<Attribute>) -> RoleDef {
    RoleDef {
        id: id.to_string(),
        hp_at_level_one: hp.0,
        hp_per_level: hp.1,
        attack_per_level: per_level.0,
        damage_per_level: per_level.1,
        caster_level_per_level: i32::from(caster.is_some()),
        spell_casting_attribute: caster,
        spell_failure_base: if caster.is_some() { 10 } else { 0 },
        spell_failure_spell_level_factor: if caster.is_some() { 5 } else { 0 },
        spell_failure_ability_factor: if caster.is_some() { 3 } else { 0 },
        spell_failure_level_factor: if caster.is_some() { 1 } else { 0 },
    }
}

fn race(id: &str, racial_types: &[&str], bonuses: &[(&str, Option<&str>, i32)]) -> RaceDef {
    RaceDef {
        id: id.to_string(),
        racial_types: racial_types.iter().map(|s| s.to_string()).collect(),
        bonuses: bonuses
            .iter()
            .map(|(bonus_type, stack_type, value)| BonusDef {
                bonus_type: bonus_type.to_string(),
                stack_type: stack_type.map(str::to_string),
                value: *value,
                key: None,
            })
            .collect(),
    }
}

/// Built-in ruleset used when no content files are loaded
pub fn default_rules() -> Ruleset {
    let damage_types = [
        ("Slashing", true),
        ("Piercing", true),
        ("Blunt", true),
        ("Fire", false),
        ("Cold", false),
        ("Electrical", false),
        ("Acid", false),
    ]
    .into_iter()
    .map(|(id, physical)| DamageTypeDef {
        id: id.to_string(),
        physical,
    })
    .collect();

    let skills = [
        ("Athletics", Attribute::Str),
        ("Hide", Attribute::Dex),
        ("Locks", Attribute::Dex),
        ("Search", Attribute::Int),
        ("Traps", Attribute::Int),
        ("Heal", Attribute::Wis),
        ("Speech", Attribute::Cha),
    ]
    .into_iter()
    .map(|(id, key_attribute)| SkillDef {
        id: id.to_string(),
        key_attribute,
    })
    .collect();

    Ruleset {
        values: default_values().into_iter().collect(),
        strings: default_strings().into_iter().collect(),
        damage_types,
        roles: vec![
            role("Warrior", (20, 8), (6, 4), None),
            role("Rogue", (16, 6), (5, 3), None),
            role("Priest", (16, 6), (4, 3), Some(Attribute::Wis)),
            role("Mage", (12, 4), (3, 2), Some(Attribute::Int)),
        ],
        skills,
        races: vec![
            race("Human", &["Humanoid"], &[]),
            race("Dwarf", &["Humanoid", "Dwarf"], &[("Con", None, 2), ("Cha", None, -2)]),
            race("Elf", &["Humanoid", "Elf"], &[("Dex", None, 2), ("Con", None, -2)]),
            race("Goblin", &["Goblinoid"], &[("Dex", None, 2), ("Str", None, -2)]),
            race(
                "Skeleton",
                &["Undead"],
                &[("CriticalHitImmunity", None, 0), ("Con", None, -10)],
            ),
        ],
        unarmed: default_unarmed(),
    }
}
