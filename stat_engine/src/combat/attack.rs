//! Attack - one attack attempt from roll to applied damage
//!
//! An attack is built from both combatants' cached stats, optionally adjusted
//! by on-attack scripts through its public fields, resolved with
//! [`Attack::compute_is_hit`], and finally applied with
//! [`Attack::apply_damage`].

use super::flanking::flanking_angle;
use super::Damage;
use crate::bonus::BonusType;
use crate::context::RulesContext;
use crate::creature::Creature;
use crate::error::CombatError;
use crate::item::{Item, WeaponStats};
use crate::stat::Stat;
use crate::types::{Faction, HandSlot, InventorySlot};

/// Natural attack rolls above this always hit
const AUTO_HIT_ABOVE: i32 = 95;
/// Natural attack rolls at or below this always miss
const AUTO_MISS_AT_OR_BELOW: i32 = 5;

/// How the attack is being made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackKind {
    Weapon { hand: HandSlot },
    Touch { ranged: bool },
    /// Always hits and deals no weapon damage
    Dummy,
}

/// Lifecycle of an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackState {
    Constructed,
    HitResolved,
    DamageApplied,
}

#[derive(Debug, Clone)]
pub struct Attack {
    kind: AttackKind,
    state: AttackState,
    weapon: Option<WeaponStats>,

    attack_roll: i32,
    threat_roll: Option<i32>,
    attack_bonus: i32,
    defender_armor_class: i32,
    critical_threat: i32,
    critical_multiplier: i32,

    damage_roll: i32,
    weapon_damage: i32,
    standalone_damage: Damage,

    flanking_bonus: i32,
    is_flanking: bool,
    is_hit: bool,
    is_critical: bool,

    /// Attack bonus added by on-attack scripts
    pub extra_attack: i32,
    /// Flat damage added by on-hit scripts; never multiplied by criticals
    pub extra_damage: i32,
}

/// Sum of one bonus type over an item's own bonus list
fn item_bonus(item: Option<&Item>, bonus_type: BonusType) -> i32 {
    item.map_or(0, |item| item.bonuses.sum_of_type(bonus_type))
}

/// Conditional bonus of `holder` keyed to any of `racial_types`
fn racial_bonus(holder: &Creature, racial_types: &[String], bonus_type: BonusType) -> i32 {
    racial_types
        .iter()
        .map(|racial_type| holder.stats().bonuses().get_keyed(racial_type, bonus_type))
        .sum()
}

/// Defender concealment left after the attacker's concealment ignoring
fn concealment(attacker: &Creature, defender: &Creature) -> i32 {
    (defender.bonus(BonusType::Concealment) - attacker.bonus(BonusType::ConcealmentIgnoring)).max(0)
}

impl Attack {
    fn new(kind: AttackKind, attack_roll: i32, attack_bonus: i32, defender_armor_class: i32) -> Self {
        Attack {
            kind,
            state: AttackState::Constructed,
            weapon: None,
            attack_roll,
            threat_roll: None,
            attack_bonus,
            defender_armor_class,
            critical_threat: 101,
            critical_multiplier: 1,
            damage_roll: 0,
            weapon_damage: 0,
            standalone_damage: Damage::new(),
            flanking_bonus: 0,
            is_flanking: false,
            is_hit: false,
            is_critical: false,
            extra_attack: 0,
            extra_damage: 0,
        }
    }

    /// Weapon attack from a hand.
    ///
    /// An empty main hand attacks with the ruleset's unarmed strike; an empty
    /// off hand is an error. Rolls the attack, the weapon damage and the
    /// attacker's standalone damage, in that order.
    pub fn weapon(
        attacker: &Creature,
        defender: &Creature,
        hand: HandSlot,
        ctx: &mut RulesContext,
    ) -> Result<Attack, CombatError> {
        let inventory = attacker.inventory();
        let weapon = match hand {
            HandSlot::MainHand => inventory
                .weapon(hand)
                .unwrap_or(&ctx.rules.unarmed)
                .clone(),
            HandSlot::OffHand => inventory
                .weapon(hand)
                .cloned()
                .ok_or(CombatError::NoWeaponInSlot(hand))?,
        };
        let item = inventory
            .equipped(hand.into())
            .filter(|item| item.weapon().is_some());
        let ammo = if weapon.is_melee() {
            None
        } else {
            inventory.ammo_for(&weapon.base_weapon)
        };
        let bonuses = attacker.stats().bonuses();

        let (hand_attack, hand_damage) = match hand {
            HandSlot::MainHand => (Stat::MainHandAttackBonus, Stat::MainHandDamageBonus),
            HandSlot::OffHand => (Stat::OffHandAttackBonus, Stat::OffHandDamageBonus),
        };

        let defender_ac = defender.stat(Stat::ArmorClass)
            + concealment(attacker, defender)
            + racial_bonus(defender, attacker.racial_types(), BonusType::ArmorClassVsRacialType);

        let mut attack_bonus = attacker.stat(hand_attack)
            + item.map_or(0, |i| i.quality.attack_bonus)
            + item_bonus(item, BonusType::WeaponAttack)
            + ammo.map_or(0, |a| a.quality.attack_bonus)
            + item_bonus(ammo, BonusType::WeaponAttack)
            + racial_bonus(attacker, defender.racial_types(), BonusType::AttackVsRacialType);

        if !weapon.is_melee() {
            let distance = attacker.position.grid_distance(defender.position);
            attack_bonus -= distance * weapon.range_penalty
                * (100 - attacker.bonus(BonusType::RangePenalty))
                / 100;
        }

        let damage_bonus = attacker.stat(hand_damage)
            + item.map_or(0, |i| i.quality.damage_bonus)
            + item_bonus(item, BonusType::WeaponDamage)
            + ammo.map_or(0, |a| a.quality.damage_bonus)
            + item_bonus(ammo, BonusType::WeaponDamage)
            + bonuses.get_keyed(&weapon.damage_type, BonusType::DamageForWeaponType)
            + racial_bonus(attacker, defender.racial_types(), BonusType::DamageVsRacialType);

        let critical_threat = weapon.critical_threat
            - (attacker.bonus(BonusType::CriticalChance)
                + bonuses.get_keyed(&weapon.base_weapon, BonusType::BaseWeaponCriticalChance)
                + item_bonus(item, BonusType::WeaponCriticalChance));
        let critical_multiplier = weapon.critical_multiplier
            + attacker.bonus(BonusType::CriticalMultiplier)
            + bonuses.get_keyed(&weapon.base_weapon, BonusType::BaseWeaponCriticalMultiplier)
            + item_bonus(item, BonusType::WeaponCriticalMultiplier);

        let attack_roll = ctx.dice.d100();
        let damage_roll = ctx.dice.rand(weapon.min_damage, weapon.max_damage);
        let standalone_damage = bonuses.roll_standalone_damage(ctx.dice.as_mut());

        let mut attack = Attack::new(AttackKind::Weapon { hand }, attack_roll, attack_bonus, defender_ac);
        attack.critical_threat = critical_threat;
        attack.critical_multiplier = critical_multiplier;
        attack.damage_roll = damage_roll;
        attack.weapon_damage = damage_roll * (100 + damage_bonus) / 100;
        attack.standalone_damage = standalone_damage;
        attack.weapon = Some(weapon);
        Ok(attack)
    }

    /// Weapon attack from an arbitrary inventory slot; only hands can attack
    pub fn weapon_from_slot(
        attacker: &Creature,
        defender: &Creature,
        slot: InventorySlot,
        ctx: &mut RulesContext,
    ) -> Result<Attack, CombatError> {
        let hand = HandSlot::try_from(slot)?;
        Attack::weapon(attacker, defender, hand, ctx)
    }

    /// Touch attack against the defender's touch armor class
    pub fn touch(attacker: &Creature, defender: &Creature, ranged: bool, ctx: &mut RulesContext) -> Attack {
        let defender_ac = defender.stat(Stat::TouchArmorClass)
            + concealment(attacker, defender)
            + racial_bonus(defender, attacker.racial_types(), BonusType::ArmorClassVsRacialType);
        let attack_bonus = attacker.stat(Stat::TouchAttackBonus)
            + racial_bonus(attacker, defender.racial_types(), BonusType::AttackVsRacialType);
        let attack_roll = ctx.dice.d100();
        Attack::new(AttackKind::Touch { ranged }, attack_roll, attack_bonus, defender_ac)
    }

    /// Attack that always connects, for scripted effects
    pub fn dummy() -> Attack {
        Attack::new(AttackKind::Dummy, 0, 0, 0)
    }

    // === Accessors ===

    pub fn kind(&self) -> &AttackKind {
        &self.kind
    }

    pub fn state(&self) -> AttackState {
        self.state
    }

    pub fn weapon_stats(&self) -> Option<&WeaponStats> {
        self.weapon.as_ref()
    }

    pub fn attack_roll(&self) -> i32 {
        self.attack_roll
    }

    /// Second roll made on a critical threat
    pub fn threat_roll(&self) -> Option<i32> {
        self.threat_roll
    }

    pub fn attack_bonus(&self) -> i32 {
        self.attack_bonus
    }

    pub fn defender_armor_class(&self) -> i32 {
        self.defender_armor_class
    }

    pub fn damage_roll(&self) -> i32 {
        self.damage_roll
    }

    pub fn flanking_bonus(&self) -> i32 {
        self.flanking_bonus
    }

    pub fn is_flanking(&self) -> bool {
        self.is_flanking
    }

    pub fn is_hit(&self) -> bool {
        self.is_hit
    }

    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    fn is_ranged(&self) -> bool {
        match &self.kind {
            AttackKind::Weapon { .. } => self.weapon.as_ref().is_some_and(|w| !w.is_melee()),
            AttackKind::Touch { ranged } => *ranged,
            AttackKind::Dummy => false,
        }
    }

    // === Resolution ===

    /// Grant the flanking bonus if another creature hostile to the defender
    /// threatens it from far enough around.
    ///
    /// The first qualifying flanker wins; flankers never stack. Ranged
    /// attacks cannot flank.
    pub fn compute_flanking_bonus<'a>(
        &mut self,
        attacker: &Creature,
        defender: &Creature,
        entities: impl IntoIterator<Item = &'a Creature>,
        ctx: &RulesContext,
    ) {
        if self.is_ranged() || matches!(self.kind, AttackKind::Dummy) {
            return;
        }

        let min_angle = (ctx.rules.value("FlankingAngle") - attacker.bonus(BonusType::FlankingAngle)) as f64;
        for flanker in entities {
            if flanker.position == attacker.position || flanker.position == defender.position {
                continue;
            }
            if !flanker.faction.is_hostile_to(defender.faction) || !flanker.threatens(defender.position) {
                continue;
            }

            let angle = flanking_angle(attacker.position, defender.position, flanker.position);
            if angle > min_angle {
                tracing::debug!("{} flanks {} with {} at {:.0} degrees", attacker.name, defender.name, flanker.name, angle);
                self.flanking_bonus = ctx.rules.value("FlankingBonus");
                self.is_flanking = true;
                break;
            }
        }
    }

    fn hit_test(roll: i32, bonus: i32, armor_class: i32) -> bool {
        roll > AUTO_HIT_ABOVE || (roll > AUTO_MISS_AT_OR_BELOW && roll + bonus >= armor_class)
    }

    /// Resolve hit and critical. Ranged and thrown weapon attacks spend their
    /// ammunition here whether or not they hit.
    ///
    /// Resolving twice returns the first result.
    pub fn compute_is_hit(&mut self, attacker: &mut Creature, defender: &Creature, ctx: &mut RulesContext) -> bool {
        if self.state != AttackState::Constructed {
            return self.is_hit;
        }
        self.state = AttackState::HitResolved;

        let immune = defender.has(BonusType::CriticalHitImmunity);
        if immune {
            self.extra_attack = 0;
            self.extra_damage = 0;
        }
        let bonus = self.attack_bonus + self.flanking_bonus + self.extra_attack;

        self.is_hit = match self.kind.clone() {
            AttackKind::Dummy => true,
            AttackKind::Touch { .. } => Attack::hit_test(self.attack_roll, bonus, self.defender_armor_class),
            AttackKind::Weapon { hand } => self.is_hit_normal(attacker, defender, hand, bonus, immune, ctx),
        };

        tracing::debug!(
            "{} attacks {}: roll {} + {} vs AC {} -> hit {}, critical {}",
            attacker.name,
            defender.name,
            self.attack_roll,
            bonus,
            self.defender_armor_class,
            self.is_hit,
            self.is_critical
        );
        self.is_hit
    }

    fn is_hit_normal(
        &mut self,
        attacker: &mut Creature,
        defender: &Creature,
        hand: HandSlot,
        bonus: i32,
        immune: bool,
        ctx: &mut RulesContext,
    ) -> bool {
        if self.is_ranged() {
            attacker.consume_ammo(hand);
        }

        let ac = self.defender_armor_class;
        if !Attack::hit_test(self.attack_roll, bonus, ac) {
            return false;
        }

        let crits_disabled = defender.faction == Faction::Player && !ctx.difficulty.critical_hits_on_pcs;
        if self.attack_roll >= self.critical_threat && !immune && !crits_disabled {
            let threat_roll = ctx.dice.d100();
            self.threat_roll = Some(threat_roll);
            self.is_critical = threat_roll + bonus > AUTO_HIT_ABOVE || threat_roll + bonus >= ac;
        }

        if self.is_critical {
            let multiplier = self.critical_multiplier;
            self.weapon_damage += self.weapon_damage * (multiplier - 1);
            self.damage_roll *= multiplier;
        }
        true
    }

    /// Damage this attack deals if it hits, before the defender's mitigation
    pub fn damage(&self) -> Damage {
        let mut damage = Damage::new();
        if let Some(weapon) = &self.weapon {
            damage.add(&weapon.damage_type, self.weapon_damage + self.extra_damage);
        }
        damage.add_all(&self.standalone_damage);
        damage
    }

    /// Deal the damage to the defender. Returns what was actually taken;
    /// misses and unresolved attacks deal nothing.
    pub fn apply_damage(&mut self, defender: &mut Creature) -> Damage {
        if self.state != AttackState::HitResolved || !self.is_hit {
            return Damage::new();
        }
        self.state = AttackState::DamageApplied;
        defender.take_damage(&self.damage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_rules;
    use crate::dice::ScriptedDice;
    use crate::stat::SavedStats;
    use std::sync::Arc;

    fn creature(name: &str, faction: Faction) -> Creature {
        let stats = SavedStats {
            base_str: 10,
            base_dex: 10,
            base_con: 10,
            base_int: 10,
            base_wis: 10,
            base_cha: 10,
        };
        let mut creature = Creature::new(name, "Human", faction, stats, Arc::new(default_rules()));
        creature.add_role_levels("Warrior", 1);
        creature
    }

    #[test]
    fn test_hit_test_auto_miss_boundary() {
        // 5 misses no matter the bonus, 6 falls back to roll + bonus vs AC
        assert!(!Attack::hit_test(5, 1000, 50));
        assert!(Attack::hit_test(6, 44, 50));
        assert!(!Attack::hit_test(6, 43, 50));
    }

    #[test]
    fn test_hit_test_auto_hit_boundary() {
        // 96 hits no matter the AC, 95 still needs the total
        assert!(Attack::hit_test(96, -1000, 500));
        assert!(!Attack::hit_test(95, 0, 500));
        assert!(Attack::hit_test(95, 5, 100));
    }

    #[test]
    fn test_touch_attack_state_machine() {
        let mut attacker = creature("Mage", Faction::Player);
        let mut defender = creature("Bandit", Faction::Hostile);
        let mut ctx = RulesContext::new(Arc::new(default_rules()), Box::new(ScriptedDice::new(Vec::new())));

        let mut attack = Attack::new(AttackKind::Touch { ranged: false }, 50, 0, 50);
        assert_eq!(attack.state(), AttackState::Constructed);
        // nothing to apply before resolution
        assert!(attack.apply_damage(&mut defender).is_empty());

        assert!(attack.compute_is_hit(&mut attacker, &defender, &mut ctx));
        assert_eq!(attack.state(), AttackState::HitResolved);
        assert_eq!(attack.threat_roll(), None);

        attack.apply_damage(&mut defender);
        assert_eq!(attack.state(), AttackState::DamageApplied);
        // resolving again keeps the first answer
        assert!(attack.compute_is_hit(&mut attacker, &defender, &mut ctx));
    }

    #[test]
    fn test_dummy_always_hits_without_damage() {
        let mut attacker = creature("Trap", Faction::Hostile);
        let mut defender = creature("Hero", Faction::Player);
        let start = defender.hit_points().current;
        let mut ctx = RulesContext::seeded(3);

        let mut attack = Attack::dummy();
        assert!(attack.compute_is_hit(&mut attacker, &defender, &mut ctx));
        assert!(!attack.is_critical());
        attack.apply_damage(&mut defender);
        assert_eq!(defender.hit_points().current, start);
    }
}
