//! BonusType and StackType - what a bonus modifies and how it combines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::EnumMessage;

/// What a bonus modifies.
///
/// The string form accepted by [`parse_type`] and returned by [`BonusType::id`] is the
/// variant identifier (`"ArmorClass"`); `Display` renders the human readable
/// name (`"Armor Class"`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumMessage,
    strum::IntoStaticStr,
)]
pub enum BonusType {
    // === State flags ===
    Immobilized,
    #[strum(message = "Undispellable Immobilized")]
    UndispellableImmobilized,
    #[strum(message = "Immobilization Immunity")]
    ImmobilizationImmunity,
    Helpless,
    Hidden,
    Silence,
    Blind,
    Deaf,
    Invisible,
    Flight,
    #[strum(message = "Critical Hit Immunity")]
    CriticalHitImmunity,
    #[strum(message = "Spell Immunity")]
    SpellImmunity,
    #[strum(message = "Trap Immunity")]
    TrapImmunity,
    #[strum(message = "Attack of Opportunity Immunity")]
    AoOImmunity,
    #[strum(message = "Free Action Spellcasting")]
    FreeActionSpellcasting,
    #[strum(message = "Armor Spell Casting")]
    ArmorSpellCasting,
    #[strum(message = "Unarmed Defense")]
    UnarmedDefense,

    // === Attributes ===
    #[strum(message = "Strength")]
    Str,
    #[strum(message = "Dexterity")]
    Dex,
    #[strum(message = "Constitution")]
    Con,
    #[strum(message = "Intelligence")]
    Int,
    #[strum(message = "Wisdom")]
    Wis,
    #[strum(message = "Charisma")]
    Cha,

    // === Defense ===
    #[strum(message = "Armor Class")]
    ArmorClass,
    #[strum(message = "Armor Penalty")]
    ArmorPenalty,
    Concealment,
    #[strum(message = "Concealment Ignoring")]
    ConcealmentIgnoring,
    #[strum(message = "Mental Resistance")]
    MentalResistance,
    #[strum(message = "Physical Resistance")]
    PhysicalResistance,
    #[strum(message = "Reflex Resistance")]
    ReflexResistance,
    #[strum(message = "Spell Resistance")]
    SpellResistance,
    #[strum(message = "Temporary Hit Points")]
    TemporaryHP,

    // === Offense ===
    Attack,
    Damage,
    #[strum(message = "Main Hand Attack")]
    MainHandAttack,
    #[strum(message = "Main Hand Damage")]
    MainHandDamage,
    #[strum(message = "Off Hand Attack")]
    OffHandAttack,
    #[strum(message = "Off Hand Damage")]
    OffHandDamage,
    #[strum(message = "Melee Attack")]
    MeleeAttack,
    #[strum(message = "Melee Damage")]
    MeleeDamage,
    #[strum(message = "Ranged Attack")]
    RangedAttack,
    #[strum(message = "Ranged Damage")]
    RangedDamage,
    #[strum(message = "Touch Attack")]
    TouchAttack,
    #[strum(message = "Dual Wield Attack")]
    DualWieldAttack,
    #[strum(message = "Attack Speed")]
    AttackCost,
    #[strum(message = "Range Penalty")]
    RangePenalty,
    #[strum(message = "Critical Chance")]
    CriticalChance,
    #[strum(message = "Critical Multiplier")]
    CriticalMultiplier,
    #[strum(message = "Flanking Angle")]
    FlankingAngle,
    Initiative,

    // === Per weapon swing (read from the weapon's own list) ===
    #[strum(message = "Weapon Attack")]
    WeaponAttack,
    #[strum(message = "Weapon Damage")]
    WeaponDamage,
    #[strum(message = "Weapon Speed")]
    WeaponSpeed,
    #[strum(message = "Weapon Critical Chance")]
    WeaponCriticalChance,
    #[strum(message = "Weapon Critical Multiplier")]
    WeaponCriticalMultiplier,

    // === Racial type conditioned ===
    #[strum(message = "Attack vs")]
    AttackVsRacialType,
    #[strum(message = "Damage vs")]
    DamageVsRacialType,
    #[strum(message = "Armor Class vs")]
    ArmorClassVsRacialType,

    // === Armor type conditioned ===
    #[strum(message = "Armor Class")]
    ArmorTypeArmorClass,
    #[strum(message = "Armor Penalty Reduction")]
    ArmorTypeArmorPenalty,
    #[strum(message = "Movement Penalty Reduction")]
    ArmorTypeMovementPenalty,

    // === Base weapon conditioned ===
    #[strum(message = "Attack")]
    BaseWeaponAttack,
    #[strum(message = "Damage")]
    BaseWeaponDamage,
    #[strum(message = "Attack Speed")]
    BaseWeaponSpeed,
    #[strum(message = "Critical Chance")]
    BaseWeaponCriticalChance,
    #[strum(message = "Critical Multiplier")]
    BaseWeaponCriticalMultiplier,

    // === Skills and proficiencies ===
    Skill,
    #[strum(message = "Weapon Proficiency")]
    WeaponProficiency,
    #[strum(message = "Armor Proficiency")]
    ArmorProficiency,

    // === Damage type keyed ===
    #[strum(message = "Damage Reduction")]
    DamageReduction,
    #[strum(message = "Damage Immunity")]
    DamageImmunity,
    #[strum(message = "Damage")]
    DamageForWeaponType,
    #[strum(message = "Spell Damage")]
    DamageForSpellType,
    #[strum(message = "Damage")]
    StandaloneDamage,

    // === Spellcasting ===
    #[strum(message = "Caster Level")]
    CasterLevel,
    #[strum(message = "Spell Failure")]
    SpellFailure,
    #[strum(message = "Spell Damage")]
    SpellDamage,
    #[strum(message = "Spell Duration")]
    SpellDuration,
    #[strum(message = "Spell Cooldown")]
    SpellCooldown,
    #[strum(message = "Spell Healing")]
    SpellHealing,

    // === Movement and misc ===
    #[strum(message = "Movement Speed")]
    Movement,
    #[strum(message = "Action Points")]
    ActionPoint,
    #[strum(message = "Vision Radius")]
    VisionRadius,
}

impl BonusType {
    /// Flags carry no value; only their presence matters
    pub fn is_state_flag(self) -> bool {
        matches!(
            self,
            BonusType::Immobilized
                | BonusType::UndispellableImmobilized
                | BonusType::ImmobilizationImmunity
                | BonusType::Helpless
                | BonusType::Hidden
                | BonusType::Silence
                | BonusType::Blind
                | BonusType::Deaf
                | BonusType::Invisible
                | BonusType::Flight
                | BonusType::CriticalHitImmunity
                | BonusType::SpellImmunity
                | BonusType::TrapImmunity
                | BonusType::AoOImmunity
                | BonusType::FreeActionSpellcasting
                | BonusType::ArmorSpellCasting
                | BonusType::UnarmedDefense
        )
    }

    /// Human readable name used in descriptions
    pub fn display_name(self) -> &'static str {
        self.get_message().unwrap_or_else(|| self.id())
    }

    /// Identifier form, as written in content files
    pub fn id(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Parse a bonus type by identifier, logging unknown names
pub fn parse_type(name: &str) -> Option<BonusType> {
    match BonusType::from_str(name) {
        Ok(bonus_type) => Some(bonus_type),
        Err(_) => {
            tracing::warn!("Unknown bonus type '{}'", name);
            None
        }
    }
}

/// How bonuses of the same type combine.
///
/// Within one `(BonusType, StackType)` bucket the two stackable variants sum;
/// every other variant keeps only the single largest magnitude.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum StackType {
    StackableBonus,
    StackablePenalty,
    GenericBonus,
    GenericPenalty,
    MoraleBonus,
    MoralePenalty,
    DeflectionBonus,
    DeflectionPenalty,
    NaturalArmorBonus,
    NaturalArmorPenalty,
    ArmorBonus,
    ArmorPenalty,
    ShieldBonus,
    ShieldPenalty,
    EnhancementBonus,
    EnhancementPenalty,
    LuckBonus,
    LuckPenalty,
}

impl StackType {
    /// Whether bonuses in this category sum instead of taking the largest
    pub fn is_stackable(self) -> bool {
        matches!(self, StackType::StackableBonus | StackType::StackablePenalty)
    }

    /// Generic bonus or penalty depending on the sign of `value`
    pub fn generic_for(value: i32) -> StackType {
        if value < 0 {
            StackType::GenericPenalty
        } else {
            StackType::GenericBonus
        }
    }

    /// Category name without the Bonus/Penalty suffix, e.g. "NaturalArmor"
    pub fn category(self) -> &'static str {
        let id: &'static str = self.into();
        id.strip_suffix("Bonus")
            .or_else(|| id.strip_suffix("Penalty"))
            .unwrap_or(id)
    }

    pub fn is_penalty(self) -> bool {
        let id: &'static str = self.into();
        id.ends_with("Penalty")
    }
}

impl fmt::Display for StackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.is_penalty() { "Penalty" } else { "Bonus" };
        match self.category() {
            "NaturalArmor" => write!(f, "Natural Armor {}", suffix),
            category => write!(f, "{} {}", category, suffix),
        }
    }
}

/// Parse a stack type name, falling back to `GenericBonus` on unknown input
pub fn parse_stack_type(name: &str) -> StackType {
    match StackType::from_str(name) {
        Ok(stack_type) => stack_type,
        Err(_) => {
            tracing::warn!("Unknown stack type '{}', using GenericBonus", name);
            StackType::GenericBonus
        }
    }
}

/// Build a stack type from a category ("Morale") and a polarity ("Bonus").
///
/// A missing category picks the generic variant matching the polarity.
pub fn stack_type_from_parts(category: Option<&str>, polarity: &str) -> StackType {
    match category {
        Some(category) => parse_stack_type(&format!("{}{}", category, polarity)),
        None if polarity == "Penalty" => StackType::GenericPenalty,
        None => StackType::GenericBonus,
    }
}
