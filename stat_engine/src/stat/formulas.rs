//! Derived stat formulas, one recompute function per stat group

use super::{attribute_bonus_type, Stat, StatGroups, StatManager, StatParent};
use crate::bonus::{BonusType, StackType};
use crate::item::{Handedness, Item, WeaponStats};
use crate::types::{Attribute, HandSlot, InventorySlot};

/// Stack categories that count as dodge armor class
const DODGE_STACKS: [StackType; 10] = [
    StackType::StackableBonus,
    StackType::StackablePenalty,
    StackType::GenericBonus,
    StackType::GenericPenalty,
    StackType::MoraleBonus,
    StackType::MoralePenalty,
    StackType::EnhancementBonus,
    StackType::EnhancementPenalty,
    StackType::LuckBonus,
    StackType::LuckPenalty,
];

/// Armor class and penalties contributed by worn items
#[derive(Debug, Default)]
struct ItemArmor {
    armor_class: f32,
    shield_armor_class: f32,
    armor_penalty: f32,
    movement_penalty: f32,
}

/// Per-point-above-10 multipliers for melee weapons: (Str attack, Dex attack, Str damage)
fn melee_factors(handedness: Handedness) -> (i32, i32, i32) {
    match handedness {
        Handedness::Light => (1, 2, 3),
        Handedness::OneHanded => (2, 1, 5),
        Handedness::TwoHanded => (3, 0, 7),
    }
}

impl StatManager {
    pub(super) fn recompute_group(&mut self, group: StatGroups, parent: &StatParent) {
        if group == StatGroups::STR {
            self.recompute_attribute(Attribute::Str);
            self.recompute_weight_limit(parent);
        } else if group == StatGroups::DEX {
            self.recompute_attribute(Attribute::Dex);
        } else if group == StatGroups::CON {
            self.recompute_attribute(Attribute::Con);
        } else if group == StatGroups::INT {
            self.recompute_attribute(Attribute::Int);
        } else if group == StatGroups::WIS {
            self.recompute_attribute(Attribute::Wis);
        } else if group == StatGroups::CHA {
            self.recompute_attribute(Attribute::Cha);
        } else if group == StatGroups::LEVEL {
            self.recompute_level(parent);
        } else if group == StatGroups::MENTAL_RESISTANCE {
            self.recompute_resistance(Stat::MentalResistance, Stat::Wis, BonusType::MentalResistance);
            self.set(Stat::SpellResistance, self.bonus(BonusType::SpellResistance));
        } else if group == StatGroups::PHYSICAL_RESISTANCE {
            self.recompute_resistance(Stat::PhysicalResistance, Stat::Con, BonusType::PhysicalResistance);
        } else if group == StatGroups::REFLEX_RESISTANCE {
            self.recompute_resistance(Stat::ReflexResistance, Stat::Dex, BonusType::ReflexResistance);
        } else if group == StatGroups::INITIATIVE {
            let initiative = (self.get(Stat::Dex) - 10) * 2 + self.bonus(BonusType::Initiative);
            self.set(Stat::InitiativeBonus, initiative);
        } else if group == StatGroups::ARMOR_CLASS {
            self.recompute_armor_class(parent);
        } else if group == StatGroups::ATTACK {
            self.recompute_attack_bonus(parent);
        }
    }

    // === Attributes ===

    fn recompute_attribute(&mut self, attribute: Attribute) {
        let value = self.get(Stat::base_attribute(attribute)) + self.bonus(attribute_bonus_type(attribute));
        self.set(Stat::attribute(attribute), value);
    }

    fn recompute_weight_limit(&mut self, parent: &StatParent) {
        let limit = parent.rules.value("WeightLimitBase")
            + (self.get(Stat::Str) - 10) * parent.rules.value("WeightLimitStrengthFactor");
        self.set(Stat::WeightLimit, limit);
    }

    // === Level ===

    fn recompute_level(&mut self, parent: &StatParent) {
        let mut creature_level = 0;
        let mut hit_points = 0;
        let mut attack = 0;
        let mut damage = 0;
        let mut caster_level = 0;

        for held in parent.roles.iter() {
            let level = held.level as i32;
            creature_level += level;

            let Some(role) = parent.rules.role(&held.role) else {
                tracing::warn!("Role '{}' not found in ruleset", held.role);
                continue;
            };

            hit_points += if parent.roles.is_base_role(&role.id) {
                role.hp_at_level_one + (level - 1) * role.hp_per_level
            } else {
                level * role.hp_per_level
            };
            attack += level * role.attack_per_level;
            damage += level * role.damage_per_level;
            caster_level += level * role.caster_level_per_level;
        }

        self.set(Stat::CreatureLevel, creature_level);
        self.set(Stat::LevelAttackBonus, attack);
        self.set(Stat::LevelDamageBonus, damage);
        self.set(Stat::CasterLevel, caster_level + self.bonus(BonusType::CasterLevel));

        let con_hit_points = (self.get(Stat::Con) - 10) * creature_level / 3;
        self.set(Stat::MaxHP, hit_points + con_hit_points);
    }

    // === Resistances ===

    fn recompute_resistance(&mut self, stat: Stat, attribute: Stat, bonus_type: BonusType) {
        let value = (self.get(attribute) - 10) * 2
            + self.get(Stat::CreatureLevel) * 3
            + self.bonus(bonus_type);
        self.set(stat, value);
    }

    // === Armor class ===

    fn item_armor(&self, parent: &StatParent) -> ItemArmor {
        let mut totals = ItemArmor::default();

        let worn = InventorySlot::armor_slots()
            .iter()
            .chain(std::iter::once(&InventorySlot::OffHand))
            .filter_map(|slot| parent.inventory.equipped(*slot));

        for item in worn {
            let Some(armor) = item.armor() else {
                continue;
            };
            let bonuses = &self.bonuses;
            let ac_bonus = bonuses.get_keyed(&armor.armor_type, BonusType::ArmorTypeArmorClass);
            let penalty_cut = bonuses.get_keyed(&armor.armor_type, BonusType::ArmorTypeArmorPenalty);
            let movement_cut = bonuses.get_keyed(&armor.armor_type, BonusType::ArmorTypeMovementPenalty);

            let armor_class = item.quality_armor_class() * (100 + ac_bonus) as f32 / 100.0;
            if item.is_shield() {
                totals.shield_armor_class += armor_class;
            } else {
                totals.armor_class += armor_class;
            }
            totals.armor_penalty += item.quality_armor_penalty() * (100 - penalty_cut) as f32 / 100.0;
            totals.movement_penalty += item.quality_movement_penalty() * (100 - movement_cut) as f32 / 100.0;
        }

        totals
    }

    fn recompute_armor_class(&mut self, parent: &StatParent) {
        let rules = parent.rules;
        let items = self.item_armor(parent);

        let armor_penalty = items.armor_penalty as i32 + self.bonus(BonusType::ArmorPenalty);
        self.set(Stat::ArmorPenalty, armor_penalty);

        let movement = rules.value("BaseMovementCost")
            * (100 + items.movement_penalty as i32 - self.bonus(BonusType::Movement))
            / 100;
        self.set(Stat::MovementCost, movement);

        let ac = &self.bonuses;
        let deflection = ac.get_stacks(
            BonusType::ArmorClass,
            &[StackType::DeflectionBonus, StackType::DeflectionPenalty],
        );
        let natural = ac.get_stacks(
            BonusType::ArmorClass,
            &[StackType::NaturalArmorBonus, StackType::NaturalArmorPenalty],
        );
        let armor_bucket = ac.get_stacks(
            BonusType::ArmorClass,
            &[StackType::ArmorBonus, StackType::ArmorPenalty],
        );
        let shield_bucket = ac.get_stacks(
            BonusType::ArmorClass,
            &[StackType::ShieldBonus, StackType::ShieldPenalty],
        );
        let dodge = ac.get_stacks(BonusType::ArmorClass, &DODGE_STACKS);

        let armor = armor_bucket.max(items.armor_class as i32);
        let shield = shield_bucket.max(items.shield_armor_class as i32);

        let mut dex_bonus = 3 * (self.get(Stat::Dex) - 10);
        if dex_bonus > 0 {
            dex_bonus = dex_bonus * (100 - armor_penalty) / 100;
        }

        let agility = if self.is_immobilized() {
            -rules.value("ImmobilizedArmorClassPenalty")
        } else {
            dodge + dex_bonus
        };

        let base = rules.value("BaseArmorClass");
        self.set(Stat::ArmorClass, base + deflection + natural + armor + shield + agility);
        self.set(Stat::TouchArmorClass, base + deflection + shield + agility);
    }

    // === Attack ===

    fn recompute_attack_bonus(&mut self, parent: &StatParent) {
        let inventory = parent.inventory;
        let main_hand = inventory
            .weapon(HandSlot::MainHand)
            .unwrap_or(&parent.rules.unarmed);
        let off_hand = inventory.weapon(HandSlot::OffHand);
        let dual_wielding = off_hand.is_some();

        let (main_attack, main_damage) =
            self.hand_bonuses(HandSlot::MainHand, main_hand, dual_wielding, parent);
        self.set(Stat::MainHandAttackBonus, main_attack);
        self.set(Stat::MainHandDamageBonus, main_damage);

        let (off_attack, off_damage) = match off_hand {
            Some(weapon) => self.hand_bonuses(HandSlot::OffHand, weapon, true, parent),
            None => (0, 0),
        };
        self.set(Stat::OffHandAttackBonus, off_attack);
        self.set(Stat::OffHandDamageBonus, off_damage);

        let touch = self.get(Stat::LevelAttackBonus)
            + self.bonus(BonusType::Attack)
            + self.bonus(BonusType::TouchAttack)
            + 3 * (self.get(Stat::Dex) - 10);
        self.set(Stat::TouchAttackBonus, touch);

        let main_item = inventory.equipped(InventorySlot::MainHand);
        let mut attack_cost = self.weapon_attack_cost(main_hand, main_item);
        if let Some(weapon) = off_hand {
            let off_cost = self.weapon_attack_cost(weapon, inventory.equipped(InventorySlot::OffHand));
            attack_cost = attack_cost.max(off_cost);
        }
        self.set(Stat::AttackCost, attack_cost);
    }

    /// Attack and damage bonus for one hand wielding `weapon`
    fn hand_bonuses(
        &self,
        hand: HandSlot,
        weapon: &WeaponStats,
        dual_wielding: bool,
        parent: &StatParent,
    ) -> (i32, i32) {
        let rules = parent.rules;
        let bonuses = &self.bonuses;
        let (hand_attack, hand_damage) = match hand {
            HandSlot::MainHand => (BonusType::MainHandAttack, BonusType::MainHandDamage),
            HandSlot::OffHand => (BonusType::OffHandAttack, BonusType::OffHandDamage),
        };

        let mut attack = self.get(Stat::LevelAttackBonus)
            + bonuses.get(BonusType::Attack)
            + bonuses.get(hand_attack)
            + bonuses.get_keyed(&weapon.base_weapon, BonusType::BaseWeaponAttack);
        let mut damage = self.get(Stat::LevelDamageBonus)
            + bonuses.get(BonusType::Damage)
            + bonuses.get(hand_damage)
            + bonuses.get_keyed(&weapon.base_weapon, BonusType::BaseWeaponDamage);

        let str_above = self.get(Stat::Str) - 10;
        let dex_above = self.get(Stat::Dex) - 10;

        if weapon.is_melee() {
            let (str_attack, dex_attack, mut str_damage) = melee_factors(weapon.handedness);
            if dual_wielding {
                str_damage = match hand {
                    HandSlot::MainHand => rules.value("DualWieldMainHandStrDamage"),
                    HandSlot::OffHand => rules.value("DualWieldOffHandStrDamage"),
                };
            }
            attack += bonuses.get(BonusType::MeleeAttack) + str_above * str_attack + dex_above * dex_attack;
            damage += bonuses.get(BonusType::MeleeDamage) + str_above * str_damage;
        } else {
            let counted_str = str_above
                .max(weapon.min_strength_bonus)
                .min(weapon.max_strength_bonus);
            attack += bonuses.get(BonusType::RangedAttack) + 3 * dex_above;
            damage += bonuses.get(BonusType::RangedDamage)
                + counted_str * rules.value("RangedStrengthDamageFactor");
        }

        if dual_wielding {
            let penalty = match hand {
                HandSlot::MainHand => rules.value("DualWieldMainHandPenalty"),
                HandSlot::OffHand => rules.value("DualWieldOffHandPenalty"),
            };
            attack += (bonuses.get(BonusType::DualWieldAttack) - penalty).min(0);
        }

        (attack, damage)
    }

    fn weapon_attack_cost(&self, weapon: &WeaponStats, item: Option<&Item>) -> i32 {
        let item_speed = item.map_or(0, |item| item.bonuses.sum_of_type(BonusType::WeaponSpeed));
        let speed = self.bonus(BonusType::AttackCost)
            + self
                .bonuses
                .get_keyed(&weapon.base_weapon, BonusType::BaseWeaponSpeed)
            + item_speed;
        weapon.attack_cost * (100 - speed) / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::BonusList;
    use crate::config::{default_rules, Ruleset};
    use crate::creature::{HitPoints, Inventory, RoleSet};
    use crate::effect::EffectSet;
    use crate::item::{ArmorStats, ItemKind, Quality, WeaponType};
    use crate::stat::SavedStats;

    struct Fixture {
        rules: Ruleset,
        roles: RoleSet,
        inventory: Inventory,
        effects: EffectSet,
        innate: BonusList,
        hit_points: HitPoints,
    }

    impl Fixture {
        fn new(level: u32) -> Self {
            let mut roles = RoleSet::new();
            roles.add_levels("Warrior", level);
            Fixture {
                rules: default_rules(),
                roles,
                inventory: Inventory::new(),
                effects: EffectSet::new(),
                innate: BonusList::new(),
                hit_points: HitPoints::new(10),
            }
        }

        fn stats(&mut self, str: i32, dex: i32) -> StatManager {
            let parent = StatParent {
                rules: &self.rules,
                roles: &self.roles,
                inventory: &self.inventory,
                effects: &self.effects,
                innate: &self.innate,
                hit_points: &mut self.hit_points,
            };
            let mut stats = StatManager::new();
            stats.load(
                &SavedStats {
                    base_str: str,
                    base_dex: dex,
                    base_con: 10,
                    base_int: 10,
                    base_wis: 10,
                    base_cha: 10,
                },
                &parent,
            );
            stats
        }
    }

    fn weapon(base: &str, weapon_type: WeaponType, handedness: Handedness) -> Item {
        Item::new(
            base,
            base,
            ItemKind::Weapon(WeaponStats {
                base_weapon: base.to_string(),
                weapon_type,
                handedness,
                damage_type: "Slashing".to_string(),
                min_damage: 1,
                max_damage: 8,
                critical_threat: 95,
                critical_multiplier: 2,
                attack_cost: 2000,
                range_penalty: 2,
                reach: 1,
                min_strength_bonus: -2,
                max_strength_bonus: 3,
            }),
        )
    }

    fn armor(kind: fn(ArmorStats) -> ItemKind, armor_class: i32, penalty: i32) -> Item {
        Item::new(
            "armor",
            "Armor",
            kind(ArmorStats {
                armor_type: "Heavy".to_string(),
                armor_class,
                armor_penalty: penalty,
                movement_penalty: 20,
            }),
        )
    }

    #[test]
    fn test_weight_limit() {
        let mut fixture = Fixture::new(1);
        let stats = fixture.stats(14, 10);
        assert_eq!(stats.get(Stat::WeightLimit), 100 + 4 * 10);
    }

    #[test]
    fn test_multi_role_hit_points() {
        let mut fixture = Fixture::new(2);
        fixture.roles.add_levels("Mage", 2);
        fixture.roles.add_levels("Bard", 1);
        let stats = fixture.stats(10, 10);
        // Warrior base: 20 + 8; Mage: 2 * 4; Bard unknown but still counts as a level
        assert_eq!(stats.get(Stat::MaxHP), 28 + 8);
        assert_eq!(stats.get(Stat::CreatureLevel), 5);
        assert_eq!(stats.get(Stat::CasterLevel), 2);
        assert_eq!(stats.get(Stat::LevelAttackBonus), 12 + 6);
    }

    #[test]
    fn test_armor_penalty_limits_positive_dex_only() {
        let mut fixture = Fixture::new(1);
        fixture
            .inventory
            .equip(InventorySlot::Armor, armor(ItemKind::Armor, 30, 50));
        let stats = fixture.stats(10, 14);
        // 50 + 30 + 12 * 50%
        assert_eq!(stats.get(Stat::ArmorClass), 86);
        assert_eq!(stats.get(Stat::ArmorPenalty), 50);
        assert_eq!(stats.get(Stat::MovementCost), 1200);

        let mut clumsy = Fixture::new(1);
        clumsy
            .inventory
            .equip(InventorySlot::Armor, armor(ItemKind::Armor, 30, 50));
        let stats = clumsy.stats(10, 6);
        assert_eq!(stats.get(Stat::ArmorClass), 50 + 30 - 12);
    }

    #[test]
    fn test_armor_bucket_versus_items() {
        let mut fixture = Fixture::new(1);
        fixture
            .inventory
            .equip(InventorySlot::Armor, armor(ItemKind::Armor, 20, 0));
        fixture
            .inventory
            .equip(InventorySlot::OffHand, armor(ItemKind::Shield, 10, 0));
        fixture
            .innate
            .add_stacked(BonusType::ArmorClass, StackType::ArmorBonus, 25);
        fixture
            .innate
            .add_stacked(BonusType::ArmorClass, StackType::NaturalArmorBonus, 5);
        fixture
            .innate
            .add_stacked(BonusType::ArmorClass, StackType::DeflectionBonus, 3);
        let stats = fixture.stats(10, 10);

        assert_eq!(stats.get(Stat::ArmorClass), 50 + 3 + 5 + 25 + 10);
        assert_eq!(stats.get(Stat::TouchArmorClass), 50 + 3 + 10);
    }

    #[test]
    fn test_quality_and_armor_type_bonus() {
        let mut fixture = Fixture::new(1);
        let plate = armor(ItemKind::Armor, 40, 0).with_quality(Quality {
            name: "Fine".to_string(),
            armor_class_bonus: 10,
            penalty_reduction: 50,
            ..Quality::default()
        });
        fixture.inventory.equip(InventorySlot::Armor, plate);
        fixture
            .innate
            .add_armor_type("Heavy", BonusType::ArmorTypeArmorClass, 50);
        let stats = fixture.stats(10, 10);
        // 40 * 1.1 * 1.5
        assert_eq!(stats.get(Stat::ArmorClass), 50 + 66);
        assert_eq!(stats.get(Stat::MovementCost), 1100);
    }

    #[test]
    fn test_immobilized_armor_class() {
        let mut fixture = Fixture::new(1);
        fixture.innate.add_marker(BonusType::Immobilized);
        fixture
            .innate
            .add_stacked(BonusType::ArmorClass, StackType::MoraleBonus, 10);
        let stats = fixture.stats(10, 16);
        assert_eq!(stats.get(Stat::ArmorClass), 30);
        assert_eq!(stats.get(Stat::TouchArmorClass), 30);
    }

    #[test]
    fn test_melee_handedness() {
        let mut fixture = Fixture::new(1);
        fixture.inventory.equip(
            InventorySlot::MainHand,
            weapon("Greatsword", WeaponType::Melee, Handedness::TwoHanded),
        );
        let stats = fixture.stats(14, 12);
        // level 6 + 3 * 4; level 4 + 7 * 4
        assert_eq!(stats.get(Stat::MainHandAttackBonus), 6 + 12);
        assert_eq!(stats.get(Stat::MainHandDamageBonus), 4 + 28);
        assert_eq!(stats.get(Stat::AttackCost), 2000);
    }

    #[test]
    fn test_unarmed_main_hand() {
        let mut fixture = Fixture::new(1);
        let stats = fixture.stats(12, 12);
        // Light: 1 * 2 + 2 * 2; damage 3 * 2
        assert_eq!(stats.get(Stat::MainHandAttackBonus), 6 + 6);
        assert_eq!(stats.get(Stat::MainHandDamageBonus), 4 + 6);
        assert_eq!(stats.get(Stat::OffHandAttackBonus), 0);
        assert_eq!(stats.get(Stat::AttackCost), 3000);
    }

    #[test]
    fn test_ranged_strength_is_clamped() {
        let mut fixture = Fixture::new(1);
        fixture.inventory.equip(
            InventorySlot::MainHand,
            weapon("Longbow", WeaponType::Ranged, Handedness::TwoHanded),
        );
        let stats = fixture.stats(18, 14);
        assert_eq!(stats.get(Stat::MainHandAttackBonus), 6 + 12);
        // Str 8 above, capped at 3
        assert_eq!(stats.get(Stat::MainHandDamageBonus), 4 + 15);
    }

    #[test]
    fn test_dual_wield() {
        let mut fixture = Fixture::new(1);
        fixture.inventory.equip(
            InventorySlot::MainHand,
            weapon("Longsword", WeaponType::Melee, Handedness::OneHanded),
        );
        let mut dagger = weapon("Dagger", WeaponType::Melee, Handedness::Light);
        let mut fast = BonusList::new();
        fast.add_int(BonusType::WeaponSpeed, 50);
        dagger = dagger.with_bonuses(fast);
        fixture.inventory.equip(InventorySlot::OffHand, dagger);
        fixture.innate.add_int(BonusType::DualWieldAttack, 10);

        let stats = fixture.stats(12, 10);
        // main: 6 + 2 * 2 - 5; damage 4 + 5 * 2
        assert_eq!(stats.get(Stat::MainHandAttackBonus), 5);
        assert_eq!(stats.get(Stat::MainHandDamageBonus), 14);
        // off: 6 + 1 * 2 - 15; damage 4 + 3 * 2
        assert_eq!(stats.get(Stat::OffHandAttackBonus), -7);
        assert_eq!(stats.get(Stat::OffHandDamageBonus), 10);
        // max(2000, 1000)
        assert_eq!(stats.get(Stat::AttackCost), 2000);
    }

    #[test]
    fn test_dual_wield_bonus_never_turns_positive() {
        let mut fixture = Fixture::new(1);
        fixture.inventory.equip(
            InventorySlot::MainHand,
            weapon("Longsword", WeaponType::Melee, Handedness::OneHanded),
        );
        fixture.inventory.equip(
            InventorySlot::OffHand,
            weapon("Dagger", WeaponType::Melee, Handedness::Light),
        );
        fixture.innate.add_int(BonusType::DualWieldAttack, 40);
        let stats = fixture.stats(10, 10);
        assert_eq!(stats.get(Stat::MainHandAttackBonus), 6);
        assert_eq!(stats.get(Stat::OffHandAttackBonus), 6);
    }

    #[test]
    fn test_touch_attack_and_initiative() {
        let mut fixture = Fixture::new(2);
        fixture.innate.add_int(BonusType::TouchAttack, 5);
        fixture.innate.add_int(BonusType::Initiative, 3);
        let stats = fixture.stats(10, 13);
        assert_eq!(stats.get(Stat::TouchAttackBonus), 12 + 5 + 9);
        assert_eq!(stats.get(Stat::InitiativeBonus), 6 + 3);
    }
}
