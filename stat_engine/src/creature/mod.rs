//! Creature - the per-creature bundle of stats and their sources
//!
//! A creature owns its roles, inventory, effects, innate bonuses and hit
//! points, plus the [`StatManager`] derived from them. Every mutation that
//! changes a bonus source goes through a method here so the stat cache is
//! updated before the call returns.

mod hit_points;
mod inventory;
mod roles;

pub use hit_points::HitPoints;
pub use inventory::Inventory;
pub use roles::{RoleLevel, RoleSet};

use crate::bonus::{BonusList, BonusType};
use crate::combat::Damage;
use crate::config::Ruleset;
use crate::effect::{Effect, EffectSet};
use crate::item::{Item, WeaponType};
use crate::stat::{SavedStats, Stat, StatGroups, StatManager, StatParent};
use crate::types::{Attribute, Faction, GridPoint, HandSlot, InventorySlot};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Creature {
    pub name: String,
    pub faction: Faction,
    pub position: GridPoint,
    race: String,
    racial_types: Vec<String>,
    rules: Arc<Ruleset>,
    roles: RoleSet,
    inventory: Inventory,
    effects: EffectSet,
    innate_bonuses: BonusList,
    skill_ranks: HashMap<String, i32>,
    hit_points: HitPoints,
    stats: StatManager,
}

impl Creature {
    /// Create a creature of `race` with the given base attributes, at full HP.
    ///
    /// An unknown race logs a warning and leaves the creature without racial
    /// types or innate bonuses.
    pub fn new(
        name: &str,
        race: &str,
        faction: Faction,
        attributes: SavedStats,
        rules: Arc<Ruleset>,
    ) -> Self {
        let (racial_types, innate_bonuses) = match rules.race(race) {
            Some(def) => (def.racial_types.clone(), def.bonus_list()),
            None => {
                tracing::warn!("Race '{}' not found in ruleset", race);
                (Vec::new(), BonusList::new())
            }
        };

        let mut creature = Creature {
            name: name.to_string(),
            faction,
            position: GridPoint::default(),
            race: race.to_string(),
            racial_types,
            rules,
            roles: RoleSet::new(),
            inventory: Inventory::new(),
            effects: EffectSet::new(),
            innate_bonuses,
            skill_ranks: HashMap::new(),
            hit_points: HitPoints::default(),
            stats: StatManager::new(),
        };
        creature.load_stats(&attributes);
        creature.hit_points.current = creature.stat(Stat::MaxHP);
        creature
    }

    /// Split the creature into its stat cache and the view the cache reads
    fn parts(&mut self) -> (&mut StatManager, StatParent<'_>) {
        (
            &mut self.stats,
            StatParent {
                rules: &self.rules,
                roles: &self.roles,
                inventory: &self.inventory,
                effects: &self.effects,
                innate: &self.innate_bonuses,
                hit_points: &mut self.hit_points,
            },
        )
    }

    // === Accessors ===

    pub fn race(&self) -> &str {
        &self.race
    }

    pub fn racial_types(&self) -> &[String] {
        &self.racial_types
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    pub fn stats(&self) -> &StatManager {
        &self.stats
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        self.stats.get(stat)
    }

    /// Total of all active bonuses of an unkeyed type
    pub fn bonus(&self, bonus_type: BonusType) -> i32 {
        self.stats.bonus(bonus_type)
    }

    pub fn has(&self, bonus_type: BonusType) -> bool {
        self.stats.has(bonus_type)
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    pub fn innate_bonuses(&self) -> &BonusList {
        &self.innate_bonuses
    }

    pub fn hit_points(&self) -> HitPoints {
        self.hit_points
    }

    /// Armor type of worn body armor, or the ruleset's default when unarmored
    pub fn armor_type(&self) -> &str {
        match self
            .inventory
            .equipped(InventorySlot::Armor)
            .and_then(Item::armor)
        {
            Some(armor) => armor.armor_type.as_str(),
            None => self.rules.string("DefaultArmorType").unwrap_or_default(),
        }
    }

    // === Bonus sources ===

    pub fn set_base_attribute(&mut self, attribute: Attribute, value: i32) {
        let (stats, mut parent) = self.parts();
        stats.set_base_attribute(attribute, value, &mut parent);
    }

    /// Grant permanent bonuses (feats, racial traits)
    pub fn add_innate_bonuses(&mut self, bonuses: &BonusList) {
        self.innate_bonuses.add_all(bonuses);
        let (stats, mut parent) = self.parts();
        stats.add_all(bonuses, &mut parent);
    }

    /// Equip an item, returning whatever the slot held before
    pub fn equip(&mut self, slot: InventorySlot, item: Item) -> Option<Item> {
        let old = self.inventory.unequip(slot);
        let bonuses = item.bonuses.clone();
        self.inventory.equip(slot, item);

        let (stats, mut parent) = self.parts();
        if let Some(old) = &old {
            stats.remove_all(&old.bonuses, &mut parent);
        }
        stats.add_all(&bonuses, &mut parent);
        // armor and weapon stats themselves changed, not only bonuses
        stats.recompute(StatGroups::ARMOR_CLASS | StatGroups::ATTACK, &parent);
        old
    }

    pub fn unequip(&mut self, slot: InventorySlot) -> Option<Item> {
        let old = self.inventory.unequip(slot)?;
        let (stats, mut parent) = self.parts();
        stats.remove_all(&old.bonuses, &mut parent);
        stats.recompute(StatGroups::ARMOR_CLASS | StatGroups::ATTACK, &parent);
        Some(old)
    }

    pub fn apply_effect(&mut self, effect: Effect) {
        tracing::debug!("{} gains effect '{}'", self.name, effect.title);
        let bonuses = effect.bonuses.clone();
        self.effects.add(effect);
        let (stats, mut parent) = self.parts();
        stats.add_all(&bonuses, &mut parent);
    }

    pub fn remove_effect(&mut self, id: &str) -> Option<Effect> {
        let effect = self.effects.remove(id)?;
        tracing::debug!("{} loses effect '{}'", self.name, effect.title);
        let (stats, mut parent) = self.parts();
        stats.remove_all(&effect.bonuses, &mut parent);
        Some(effect)
    }

    /// Count down timed effects and withdraw the ones that expired
    pub fn elapse_round(&mut self) -> Vec<Effect> {
        let expired = self.effects.elapse_round();
        let (stats, mut parent) = self.parts();
        for effect in &expired {
            stats.remove_all(&effect.bonuses, &mut parent);
        }
        expired
    }

    /// Gain levels in a role. Current HP rises with max HP.
    pub fn add_role_levels(&mut self, role: &str, levels: u32) {
        let old_max = self.stat(Stat::MaxHP);
        self.roles.add_levels(role, levels);
        let (stats, parent) = self.parts();
        stats.recompute(StatGroups::LEVEL.with_dependents(), &parent);

        let gained = self.stat(Stat::MaxHP) - old_max;
        if gained > 0 {
            self.hit_points.current += gained;
        }
    }

    /// Weaken active penalties of one type by up to `amount`
    pub fn reduce_penalties(&mut self, bonus_type: BonusType, amount: i32) {
        let (stats, mut parent) = self.parts();
        stats.reduce_penalties_of_type_by_amount(bonus_type, amount, &mut parent);
    }

    pub fn recompute_all_stats(&mut self) {
        let (stats, parent) = self.parts();
        stats.recompute_all_stats(&parent);
    }

    // === Hit points ===

    /// Apply damage after this creature's reduction and immunity.
    ///
    /// Returns the damage actually dealt per type.
    pub fn take_damage(&mut self, damage: &Damage) -> Damage {
        let applied = damage.mitigated_by(self.stats.bonuses());
        let lost = self.hit_points.take_damage(applied.total());
        tracing::debug!(
            "{} takes {} damage ({} from HP), {} HP left",
            self.name,
            applied.total(),
            lost,
            self.hit_points.current
        );
        applied
    }

    pub fn take_raw_damage(&mut self, amount: i32, damage_type: &str) -> Damage {
        self.take_damage(&Damage::of(damage_type, amount))
    }

    /// Heal up to max HP; returns the amount healed
    pub fn heal(&mut self, amount: i32) -> i32 {
        let max = self.stat(Stat::MaxHP);
        self.hit_points.heal(amount, max)
    }

    pub fn add_temporary_hp(&mut self, amount: i32) {
        self.hit_points.add_temporary(amount);
    }

    pub fn remove_temporary_hp(&mut self, amount: i32) {
        self.hit_points.remove_temporary(amount);
    }

    pub fn is_dead(&self) -> bool {
        self.hit_points.is_dead()
    }

    // === Combat helpers ===

    /// Whether this creature can make melee attacks into `point`
    pub fn threatens(&self, point: GridPoint) -> bool {
        if self.is_dead() || self.has(BonusType::Helpless) || self.stats.is_immobilized() {
            return false;
        }

        let main_hand = self
            .inventory
            .weapon(HandSlot::MainHand)
            .unwrap_or(&self.rules.unarmed);
        let reach = [Some(main_hand), self.inventory.weapon(HandSlot::OffHand)]
            .into_iter()
            .flatten()
            .filter(|weapon| weapon.is_melee())
            .map(|weapon| weapon.reach)
            .max();

        match reach {
            Some(reach) => self.position.grid_distance(point) <= reach,
            None => false,
        }
    }

    /// Spend one round of ammunition, or the thrown weapon itself, for an
    /// attack from `hand`. Stacks that run out are unequipped.
    ///
    /// Returns false if the weapon in that hand uses no ammunition.
    pub fn consume_ammo(&mut self, hand: HandSlot) -> bool {
        let Some(weapon) = self.inventory.weapon(hand) else {
            return false;
        };
        let slot = match weapon.weapon_type {
            WeaponType::Melee => return false,
            WeaponType::Thrown => InventorySlot::from(hand),
            WeaponType::Ranged => {
                if self.inventory.ammo_for(&weapon.base_weapon).is_none() {
                    return false;
                }
                InventorySlot::Quiver
            }
        };

        let Some(item) = self.inventory.equipped_mut(slot) else {
            return false;
        };
        item.quantity = item.quantity.saturating_sub(1);
        if item.quantity == 0 {
            tracing::debug!("{} used the last of {}", self.name, item.name);
            self.unequip(slot);
        }
        true
    }

    // === Skills and spells ===

    pub fn set_skill_rank(&mut self, skill: &str, ranks: i32) {
        self.skill_ranks.insert(skill.to_string(), ranks);
    }

    pub fn skill_rank(&self, skill: &str) -> i32 {
        self.skill_ranks.get(skill).copied().unwrap_or(0)
    }

    /// Ranks plus skill bonuses plus twice the key attribute above 10
    pub fn skill_modifier(&self, skill: &str) -> i32 {
        let base = self.skill_rank(skill) + self.stats.bonuses().skill_bonus(skill);
        match self.rules.skill(skill) {
            Some(def) => base + (self.stat(Stat::attribute(def.key_attribute)) - 10) * 2,
            None => {
                tracing::warn!("Skill '{}' not found in ruleset", skill);
                base
            }
        }
    }

    /// Percent chance that casting a spell of `spell_level` as `role` fails.
    ///
    /// Non-casters and unknown roles always fail. Armor adds its penalty
    /// unless the creature can cast in armor.
    pub fn spell_failure(&self, role: &str, spell_level: i32) -> i32 {
        let Some(def) = self.rules.role(role) else {
            tracing::warn!("Role '{}' not found in ruleset", role);
            return 100;
        };
        let Some(attribute) = def.spell_casting_attribute else {
            return 100;
        };

        let mut failure = def.spell_failure_base
            + spell_level * def.spell_failure_spell_level_factor
            - (self.stat(Stat::attribute(attribute)) - 10) * def.spell_failure_ability_factor
            - self.roles.level(role) as i32 * def.spell_failure_level_factor
            + self.bonus(BonusType::SpellFailure);
        if !self.has(BonusType::ArmorSpellCasting) {
            failure += self.stat(Stat::ArmorPenalty);
        }
        failure.clamp(0, 100)
    }

    // === Persistence ===

    pub fn save_stats(&self) -> SavedStats {
        self.stats.save()
    }

    /// Restore base attributes and recompute every derived stat
    pub fn load_stats(&mut self, saved: &SavedStats) {
        let (stats, parent) = self.parts();
        stats.load(saved, &parent);
    }
}
