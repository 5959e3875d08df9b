//! StatManager - a creature's cached derived stats
//!
//! Every bonus delta goes through [`StatManager::add_all`] or
//! [`StatManager::remove_all`]. The delta is classified into [`StatGroups`],
//! the dirty set is closed over the dependency graph, and each dirty group is
//! recomputed once in dependency order before the call returns.

mod formulas;
mod groups;

pub use groups::{StatGroups, RECOMPUTE_ORDER};

use crate::bonus::{BonusList, BonusManager, BonusType};
use crate::config::Ruleset;
use crate::creature::{HitPoints, Inventory, RoleSet};
use crate::effect::EffectSet;
use crate::types::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cached derived values of a creature
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Stat {
    // === Attributes ===
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
    BaseStr,
    BaseDex,
    BaseCon,
    BaseInt,
    BaseWis,
    BaseCha,
    WeightLimit,

    // === Level ===
    CreatureLevel,
    CasterLevel,
    LevelAttackBonus,
    LevelDamageBonus,
    MaxHP,

    // === Resistances ===
    MentalResistance,
    PhysicalResistance,
    ReflexResistance,
    SpellResistance,

    // === Defense ===
    ArmorClass,
    TouchArmorClass,
    ArmorPenalty,
    MovementCost,

    // === Offense ===
    MainHandAttackBonus,
    MainHandDamageBonus,
    OffHandAttackBonus,
    OffHandDamageBonus,
    TouchAttackBonus,
    AttackCost,
    InitiativeBonus,
}

impl Stat {
    /// Current value stat of an attribute
    pub fn attribute(attribute: Attribute) -> Stat {
        match attribute {
            Attribute::Str => Stat::Str,
            Attribute::Dex => Stat::Dex,
            Attribute::Con => Stat::Con,
            Attribute::Int => Stat::Int,
            Attribute::Wis => Stat::Wis,
            Attribute::Cha => Stat::Cha,
        }
    }

    /// Unmodified value stat of an attribute
    pub fn base_attribute(attribute: Attribute) -> Stat {
        match attribute {
            Attribute::Str => Stat::BaseStr,
            Attribute::Dex => Stat::BaseDex,
            Attribute::Con => Stat::BaseCon,
            Attribute::Int => Stat::BaseInt,
            Attribute::Wis => Stat::BaseWis,
            Attribute::Cha => Stat::BaseCha,
        }
    }
}

pub(crate) fn attribute_bonus_type(attribute: Attribute) -> BonusType {
    match attribute {
        Attribute::Str => BonusType::Str,
        Attribute::Dex => BonusType::Dex,
        Attribute::Con => BonusType::Con,
        Attribute::Int => BonusType::Int,
        Attribute::Wis => BonusType::Wis,
        Attribute::Cha => BonusType::Cha,
    }
}

fn attribute_group(attribute: Attribute) -> StatGroups {
    match attribute {
        Attribute::Str => StatGroups::STR,
        Attribute::Dex => StatGroups::DEX,
        Attribute::Con => StatGroups::CON,
        Attribute::Int => StatGroups::INT,
        Attribute::Wis => StatGroups::WIS,
        Attribute::Cha => StatGroups::CHA,
    }
}

/// The parts of a creature that stat recomputes read, borrowed for one call.
///
/// Hit points are the only thing written: temporary HP bonuses and
/// Constitution changes adjust them directly.
pub struct StatParent<'a> {
    pub rules: &'a Ruleset,
    pub roles: &'a RoleSet,
    pub inventory: &'a Inventory,
    pub effects: &'a EffectSet,
    /// Bonuses the creature always has (race and the like)
    pub innate: &'a BonusList,
    pub hit_points: &'a mut HitPoints,
}

/// Persisted stat state; everything else is recomputed on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedStats {
    pub base_str: i32,
    pub base_dex: i32,
    pub base_con: i32,
    pub base_int: i32,
    pub base_wis: i32,
    pub base_cha: i32,
}

/// Derived stat cache plus the bonus aggregator it is computed from
#[derive(Debug, Clone, Default)]
pub struct StatManager {
    stats: HashMap<Stat, i32>,
    bonuses: BonusManager,
}

impl StatManager {
    /// All stats start at zero
    pub fn new() -> Self {
        StatManager {
            stats: HashMap::new(),
            bonuses: BonusManager::new(),
        }
    }

    /// Cached value; stats never computed read as 0
    pub fn get(&self, stat: Stat) -> i32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    pub(crate) fn set(&mut self, stat: Stat, value: i32) {
        self.stats.insert(stat, value);
    }

    pub fn bonuses(&self) -> &BonusManager {
        &self.bonuses
    }

    /// Total of all active bonuses of an unkeyed type
    pub fn bonus(&self, bonus_type: BonusType) -> i32 {
        self.bonuses.get(bonus_type)
    }

    pub fn has(&self, bonus_type: BonusType) -> bool {
        self.bonuses.has(bonus_type)
    }

    /// Immobilized by any means
    pub fn is_immobilized(&self) -> bool {
        self.has(BonusType::Immobilized) || self.has(BonusType::UndispellableImmobilized)
    }

    pub fn base_attribute(&self, attribute: Attribute) -> i32 {
        self.get(Stat::base_attribute(attribute))
    }

    /// Change a base attribute and recompute what depends on it
    pub fn set_base_attribute(&mut self, attribute: Attribute, value: i32, parent: &mut StatParent) {
        self.set(Stat::base_attribute(attribute), value);
        self.recompute(attribute_group(attribute).with_dependents(), parent);
    }

    /// Apply a bonus list and recompute the stats it touches
    pub fn add_all(&mut self, bonuses: &BonusList, parent: &mut StatParent) {
        self.apply_delta(&BonusList::new(), bonuses, parent);
    }

    /// Withdraw a bonus list and recompute the stats it touches
    pub fn remove_all(&mut self, bonuses: &BonusList, parent: &mut StatParent) {
        self.apply_delta(bonuses, &BonusList::new(), parent);
    }

    /// Bulk load ahead of an explicit [`recompute_all_stats`](Self::recompute_all_stats)
    pub fn add_all_no_recompute(&mut self, bonuses: &BonusList) {
        self.bonuses.add_all(bonuses);
    }

    fn apply_delta(&mut self, removed: &BonusList, added: &BonusList, parent: &mut StatParent) {
        let old_con_bonus = self.bonus(BonusType::Con);

        self.bonuses.remove_all(removed);
        self.bonuses.add_all(added);

        for bonus in removed {
            if bonus.bonus_type() == BonusType::TemporaryHP {
                parent.hit_points.remove_temporary(bonus.value());
            }
        }
        for bonus in added {
            if bonus.bonus_type() == BonusType::TemporaryHP {
                parent.hit_points.add_temporary(bonus.value());
            }
        }

        let dirty = StatGroups::for_bonus_list(removed) | StatGroups::for_bonus_list(added);
        if dirty.is_empty() {
            return;
        }
        tracing::debug!("Recomputing stat groups {:?}", dirty);
        self.recompute(dirty, parent);

        let new_con_bonus = self.bonus(BonusType::Con);
        if new_con_bonus != old_con_bonus {
            self.reconcile_constitution(old_con_bonus, new_con_bonus, parent);
        }
    }

    /// Keep current HP in step with a Constitution bonus change
    fn reconcile_constitution(&self, old_bonus: i32, new_bonus: i32, parent: &mut StatParent) {
        let con = self.get(Stat::Con);
        let level = self.get(Stat::CreatureLevel);
        let old_con_hp = (con - new_bonus + old_bonus - 10) * level / 3;
        let new_con_hp = (con - 10) * level / 3;

        if new_con_hp < old_con_hp {
            parent.hit_points.drain(old_con_hp - new_con_hp);
        } else if new_con_hp > old_con_hp {
            parent
                .hit_points
                .heal(new_con_hp - old_con_hp, self.get(Stat::MaxHP));
        }
    }

    /// Recompute every group in `dirty`, each once, in dependency order
    pub fn recompute(&mut self, dirty: StatGroups, parent: &StatParent) {
        for group in RECOMPUTE_ORDER {
            if dirty.contains(group) {
                self.recompute_group(group, parent);
            }
        }
    }

    /// Rebuild the aggregator from every bonus source and recompute everything.
    ///
    /// The effects collection is read through a snapshot so timer code can
    /// keep adding and removing effects while the rebuild runs.
    pub fn recompute_all_stats(&mut self, parent: &StatParent) {
        self.bonuses.clear();
        self.bonuses.add_all(parent.innate);
        for (_, item) in parent.inventory.iter() {
            self.bonuses.add_all(&item.bonuses);
        }
        for effect in parent.effects.snapshot() {
            self.bonuses.add_all(effect.bonuses());
        }

        tracing::debug!("Recomputing all stats");
        self.recompute(StatGroups::all(), parent);
    }

    /// Weaken negative bonuses of `bonus_type` on active effects by up to
    /// `amount` in total, then recompute.
    ///
    /// Effects are visited in the order they were applied. Each penalty is
    /// reduced by as much of the remaining amount as it can absorb.
    pub fn reduce_penalties_of_type_by_amount(
        &mut self,
        bonus_type: BonusType,
        amount: i32,
        parent: &mut StatParent,
    ) {
        let mut remaining = amount;
        let mut removed = BonusList::new();
        let mut added = BonusList::new();

        'effects: for effect in parent.effects.snapshot() {
            for bonus in effect.bonuses() {
                if remaining <= 0 {
                    break 'effects;
                }
                if bonus.bonus_type() != bonus_type || bonus.value() >= 0 {
                    continue;
                }

                let reduction = remaining.min(-bonus.value());
                let reduced = bonus.clone_with_reduction(-reduction);
                let replaced = parent
                    .effects
                    .update(&effect.id, |e| e.bonuses.replace(bonus, reduced.clone()))
                    .unwrap_or(false);
                if !replaced {
                    continue;
                }

                removed.add(bonus.clone());
                added.add(reduced);
                remaining -= reduction;
            }
        }

        if !removed.is_empty() {
            self.apply_delta(&removed, &added, parent);
        }
    }

    pub fn save(&self) -> SavedStats {
        SavedStats {
            base_str: self.base_attribute(Attribute::Str),
            base_dex: self.base_attribute(Attribute::Dex),
            base_con: self.base_attribute(Attribute::Con),
            base_int: self.base_attribute(Attribute::Int),
            base_wis: self.base_attribute(Attribute::Wis),
            base_cha: self.base_attribute(Attribute::Cha),
        }
    }

    /// Restore base attributes and rebuild every derived stat from them
    pub fn load(&mut self, saved: &SavedStats, parent: &StatParent) {
        self.stats.clear();
        self.set(Stat::BaseStr, saved.base_str);
        self.set(Stat::BaseDex, saved.base_dex);
        self.set(Stat::BaseCon, saved.base_con);
        self.set(Stat::BaseInt, saved.base_int);
        self.set(Stat::BaseWis, saved.base_wis);
        self.set(Stat::BaseCha, saved.base_cha);
        self.recompute_all_stats(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::StackType;
    use crate::config::default_rules;
    use crate::effect::Effect;
    use crate::item::{ArmorStats, Item, ItemKind};
    use crate::types::InventorySlot;

    struct Fixture {
        rules: Ruleset,
        roles: RoleSet,
        inventory: Inventory,
        effects: EffectSet,
        innate: BonusList,
        hit_points: HitPoints,
    }

    impl Fixture {
        fn new() -> Self {
            let mut roles = RoleSet::new();
            roles.add_levels("Warrior", 3);
            Fixture {
                rules: default_rules(),
                roles,
                inventory: Inventory::new(),
                effects: EffectSet::new(),
                innate: BonusList::new(),
                hit_points: HitPoints::new(30),
            }
        }

        fn parent(&mut self) -> StatParent<'_> {
            StatParent {
                rules: &self.rules,
                roles: &self.roles,
                inventory: &self.inventory,
                effects: &self.effects,
                innate: &self.innate,
                hit_points: &mut self.hit_points,
            }
        }
    }

    fn manager(fixture: &mut Fixture) -> StatManager {
        let mut stats = StatManager::new();
        stats.load(
            &SavedStats {
                base_str: 10,
                base_dex: 10,
                base_con: 10,
                base_int: 10,
                base_wis: 10,
                base_cha: 10,
            },
            &fixture.parent(),
        );
        stats
    }

    fn list(bonus_type: BonusType, value: i32) -> BonusList {
        let mut list = BonusList::new();
        list.add_int(bonus_type, value);
        list
    }

    #[test]
    fn test_new_manager_reads_zero() {
        let stats = StatManager::new();
        assert_eq!(stats.get(Stat::ArmorClass), 0);
        assert_eq!(stats.get(Stat::MaxHP), 0);
    }

    #[test]
    fn test_attribute_bonus_flows_into_dependents() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        assert_eq!(stats.get(Stat::ArmorClass), 50);

        stats.add_all(&list(BonusType::Dex, 4), &mut fixture.parent());
        assert_eq!(stats.get(Stat::Dex), 14);
        assert_eq!(stats.get(Stat::ArmorClass), 50 + 12);
        assert_eq!(stats.get(Stat::ReflexResistance), 8 + 9);
        assert_eq!(stats.get(Stat::InitiativeBonus), 8);

        stats.remove_all(&list(BonusType::Dex, 4), &mut fixture.parent());
        assert_eq!(stats.get(Stat::Dex), 10);
        assert_eq!(stats.get(Stat::ArmorClass), 50);
    }

    #[test]
    fn test_constitution_heals_and_damages() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        // Warrior 3: 20 + 2 * 8
        assert_eq!(stats.get(Stat::MaxHP), 36);
        fixture.hit_points.current = 30;

        stats.add_all(&list(BonusType::Con, 4), &mut fixture.parent());
        assert_eq!(stats.get(Stat::MaxHP), 40);
        assert_eq!(fixture.hit_points.current, 34);

        stats.remove_all(&list(BonusType::Con, 4), &mut fixture.parent());
        assert_eq!(stats.get(Stat::MaxHP), 36);
        assert_eq!(fixture.hit_points.current, 30);
    }

    #[test]
    fn test_constitution_loss_ignores_temporary_hp() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        fixture.hit_points.current = 36;

        stats.add_all(&list(BonusType::Con, 6), &mut fixture.parent());
        assert_eq!(fixture.hit_points.current, 42);
        fixture.hit_points.add_temporary(10);

        stats.remove_all(&list(BonusType::Con, 6), &mut fixture.parent());
        assert_eq!(stats.get(Stat::MaxHP), 36);
        assert_eq!(fixture.hit_points.current, 36);
        assert_eq!(fixture.hit_points.temporary, 10);
    }

    #[test]
    fn test_constitution_heal_caps_at_max() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        fixture.hit_points.current = 36;

        stats.add_all(&list(BonusType::Con, 6), &mut fixture.parent());
        assert_eq!(stats.get(Stat::MaxHP), 42);
        assert_eq!(fixture.hit_points.current, 42);
    }

    #[test]
    fn test_temporary_hp_goes_to_hit_points() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        stats.add_all(&list(BonusType::TemporaryHP, 10), &mut fixture.parent());
        assert_eq!(fixture.hit_points.temporary, 10);
        stats.remove_all(&list(BonusType::TemporaryHP, 10), &mut fixture.parent());
        assert_eq!(fixture.hit_points.temporary, 0);
    }

    #[test]
    fn test_recompute_all_reads_every_source() {
        let mut fixture = Fixture::new();
        fixture.innate.add_int(BonusType::Str, 2);
        fixture.effects.add(Effect::new("haste", "Haste", list(BonusType::Dex, 2)));
        fixture.inventory.equip(
            InventorySlot::Armor,
            Item::new(
                "mail",
                "Chain Mail",
                ItemKind::Armor(ArmorStats {
                    armor_type: "Medium".to_string(),
                    armor_class: 20,
                    armor_penalty: 0,
                    movement_penalty: 10,
                }),
            )
            .with_bonuses(list(BonusType::Wis, 2)),
        );

        let stats = manager(&mut fixture);
        assert_eq!(stats.get(Stat::Str), 12);
        assert_eq!(stats.get(Stat::Dex), 12);
        assert_eq!(stats.get(Stat::Wis), 12);
        assert_eq!(stats.get(Stat::ArmorClass), 50 + 20 + 6);
        assert_eq!(stats.get(Stat::MovementCost), 1100);
    }

    #[test]
    fn test_reduce_penalties() {
        let mut fixture = Fixture::new();
        fixture
            .effects
            .add(Effect::new("weak", "Weakness", list(BonusType::Str, -4)));
        fixture
            .effects
            .add(Effect::new("curse", "Curse", list(BonusType::Str, -3)));
        let mut stats = manager(&mut fixture);
        // two generic penalties: largest magnitude wins
        assert_eq!(stats.get(Stat::Str), 6);

        stats.reduce_penalties_of_type_by_amount(BonusType::Str, 5, &mut fixture.parent());

        let effects = fixture.effects.snapshot();
        assert_eq!(effects[0].bonuses.sum_of_type(BonusType::Str), 0);
        assert_eq!(effects[1].bonuses.sum_of_type(BonusType::Str), -2);
        assert_eq!(stats.get(Stat::Str), 8);
    }

    #[test]
    fn test_unrelated_bonus_does_not_recompute() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        let mut skills = BonusList::new();
        skills.add_skill("Search", 5);
        stats.add_all(&skills, &mut fixture.parent());
        assert_eq!(stats.bonuses().skill_bonus("Search"), 5);
        assert_eq!(stats.get(Stat::ArmorClass), 50);
    }

    #[test]
    fn test_no_recompute_then_full_recompute() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        let mut bonus = BonusList::new();
        bonus.add_stacked(BonusType::ArmorClass, StackType::DeflectionBonus, 5);
        stats.add_all_no_recompute(&bonus);
        assert_eq!(stats.get(Stat::ArmorClass), 50);

        fixture.innate.add_all(&bonus);
        stats.recompute_all_stats(&fixture.parent());
        assert_eq!(stats.get(Stat::ArmorClass), 55);
    }

    #[test]
    fn test_save_load() {
        let mut fixture = Fixture::new();
        let mut stats = manager(&mut fixture);
        stats.set_base_attribute(Attribute::Wis, 14, &mut fixture.parent());
        assert_eq!(stats.get(Stat::MentalResistance), 8 + 9);

        let saved = stats.save();
        let json = serde_json::to_string(&saved).unwrap();
        let restored: SavedStats = serde_json::from_str(&json).unwrap();

        let mut copy = StatManager::new();
        copy.load(&restored, &fixture.parent());
        assert_eq!(copy.get(Stat::Wis), 14);
        assert_eq!(copy.get(Stat::MentalResistance), stats.get(Stat::MentalResistance));
    }
}
