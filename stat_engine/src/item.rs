//! Items - equippable gear feeding armor class, weapon attacks and bonuses

use crate::bonus::BonusList;
use serde::{Deserialize, Serialize};

/// Melee handedness, which decides how Str and Dex feed attack and damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Light,
    OneHanded,
    TwoHanded,
}

/// How a weapon reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Melee,
    /// Fires ammunition from the quiver
    Ranged,
    /// The weapon itself is thrown
    Thrown,
}

/// Stats of a weapon item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub base_weapon: String,
    pub weapon_type: WeaponType,
    pub handedness: Handedness,
    pub damage_type: String,
    pub min_damage: i32,
    pub max_damage: i32,
    /// Minimum d100 roll that threatens a critical hit
    pub critical_threat: i32,
    pub critical_multiplier: i32,
    /// Action point cost of one attack
    pub attack_cost: i32,
    /// Attack penalty per tile of distance (ranged and thrown)
    #[serde(default)]
    pub range_penalty: i32,
    /// Tiles a melee weapon reaches
    #[serde(default = "default_reach")]
    pub reach: i32,
    /// Bounds on Str-above-10 counted for ranged damage
    #[serde(default)]
    pub min_strength_bonus: i32,
    #[serde(default)]
    pub max_strength_bonus: i32,
}

fn default_reach() -> i32 {
    1
}

impl WeaponStats {
    pub fn is_melee(&self) -> bool {
        self.weapon_type == WeaponType::Melee
    }
}

/// Stats of armor and shields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorStats {
    pub armor_type: String,
    pub armor_class: i32,
    /// Percentage cut from positive Dex bonus to AC
    pub armor_penalty: i32,
    /// Percentage added to movement cost
    pub movement_penalty: i32,
}

/// Item quality, applied as a modifier over the base stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub name: String,
    /// Percent added to armor class
    #[serde(default)]
    pub armor_class_bonus: i32,
    /// Percent removed from armor and movement penalties
    #[serde(default)]
    pub penalty_reduction: i32,
    /// Flat attack bonus
    #[serde(default)]
    pub attack_bonus: i32,
    /// Percent added to damage
    #[serde(default)]
    pub damage_bonus: i32,
}

impl Default for Quality {
    fn default() -> Self {
        Quality {
            name: "Average".to_string(),
            armor_class_bonus: 0,
            penalty_reduction: 0,
            attack_bonus: 0,
            damage_bonus: 0,
        }
    }
}

/// What kind of item this is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Armor(ArmorStats),
    Shield(ArmorStats),
    Weapon(WeaponStats),
    /// Quiver contents; `ammo_for` names the base weapon that fires it
    Ammo { ammo_for: String },
    Other,
}

/// An equippable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub bonuses: BonusList,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl Item {
    pub fn new(id: &str, name: &str, kind: ItemKind) -> Self {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            quality: Quality::default(),
            bonuses: BonusList::new(),
            quantity: 1,
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_bonuses(mut self, bonuses: BonusList) -> Self {
        self.bonuses = bonuses;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn weapon(&self) -> Option<&WeaponStats> {
        match &self.kind {
            ItemKind::Weapon(stats) => Some(stats),
            _ => None,
        }
    }

    /// Armor stats for armor and shields
    pub fn armor(&self) -> Option<&ArmorStats> {
        match &self.kind {
            ItemKind::Armor(stats) | ItemKind::Shield(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn is_shield(&self) -> bool {
        matches!(self.kind, ItemKind::Shield(_))
    }

    /// Armor class after quality
    pub fn quality_armor_class(&self) -> f32 {
        let base = self.armor().map_or(0, |a| a.armor_class) as f32;
        base * (100 + self.quality.armor_class_bonus) as f32 / 100.0
    }

    /// Armor penalty after quality
    pub fn quality_armor_penalty(&self) -> f32 {
        let base = self.armor().map_or(0, |a| a.armor_penalty) as f32;
        base * (100 - self.quality.penalty_reduction) as f32 / 100.0
    }

    /// Movement penalty after quality
    pub fn quality_movement_penalty(&self) -> f32 {
        let base = self.armor().map_or(0, |a| a.movement_penalty) as f32;
        base * (100 - self.quality.penalty_reduction) as f32 / 100.0
    }
}
