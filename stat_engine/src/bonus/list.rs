//! BonusList - the ordered bonuses owned by one effect, item or race

use super::{parse_type, stack_type_from_parts, Bonus, BonusType, StackType};
use serde::{Deserialize, Serialize};

/// Ordered multiset of bonuses belonging to a single owner.
///
/// Cloning the owner clones the list; lists are never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BonusList {
    bonuses: Vec<Bonus>,
}

impl BonusList {
    pub fn new() -> Self {
        BonusList {
            bonuses: Vec::new(),
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    /// Remove the first bonus structurally equal to `bonus`
    pub fn remove(&mut self, bonus: &Bonus) -> bool {
        match self.bonuses.iter().position(|b| b == bonus) {
            Some(index) => {
                self.bonuses.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the first bonus equal to `old` with `new`, keeping its position
    pub fn replace(&mut self, old: &Bonus, new: Bonus) -> bool {
        match self.bonuses.iter_mut().find(|b| &**b == old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// Append every bonus of `other`
    pub fn add_all(&mut self, other: &BonusList) {
        self.bonuses.extend(other.bonuses.iter().cloned());
    }

    pub fn contains(&self, bonus: &Bonus) -> bool {
        self.bonuses.contains(bonus)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bonus> {
        self.bonuses.iter()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    /// Whether any bonus has the given type
    pub fn has_bonus_of_type(&self, bonus_type: BonusType) -> bool {
        self.bonuses.iter().any(|b| b.bonus_type() == bonus_type)
    }

    /// All bonuses whose type is one of `types`
    pub fn bonuses_of_type(&self, types: &[BonusType]) -> Vec<Bonus> {
        self.bonuses
            .iter()
            .filter(|b| types.contains(&b.bonus_type()))
            .cloned()
            .collect()
    }

    /// First bonus of the given type
    pub fn bonus_of_type(&self, bonus_type: BonusType) -> Option<&Bonus> {
        self.bonuses.iter().find(|b| b.bonus_type() == bonus_type)
    }

    /// Sum of the values of every bonus of `bonus_type`, ignoring stacking.
    ///
    /// Used for weapon-local bonuses read straight off an item.
    pub fn sum_of_type(&self, bonus_type: BonusType) -> i32 {
        self.bonuses
            .iter()
            .filter(|b| b.bonus_type() == bonus_type)
            .map(Bonus::value)
            .sum()
    }

    /// One description line per bonus
    pub fn description(&self) -> String {
        let mut out = String::new();
        for (i, bonus) in self.bonuses.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            bonus.append_description(&mut out);
        }
        out
    }

    // === Typed factories ===

    pub fn add_marker(&mut self, bonus_type: BonusType) {
        self.add(Bonus::marker(bonus_type));
    }

    /// Integer bonus with the generic stack type matching its sign
    pub fn add_int(&mut self, bonus_type: BonusType, value: i32) {
        self.add(Bonus::int(bonus_type, StackType::generic_for(value), value));
    }

    pub fn add_stacked(&mut self, bonus_type: BonusType, stack_type: StackType, value: i32) {
        self.add(Bonus::int(bonus_type, stack_type, value));
    }

    pub fn add_armor_type(&mut self, armor_type: &str, bonus_type: BonusType, value: i32) {
        self.add(Bonus::armor_type(
            armor_type,
            bonus_type,
            StackType::generic_for(value),
            value,
        ));
    }

    pub fn add_base_weapon(&mut self, base_weapon: &str, bonus_type: BonusType, value: i32) {
        self.add(Bonus::base_weapon(
            base_weapon,
            bonus_type,
            StackType::generic_for(value),
            value,
        ));
    }

    pub fn add_racial_type(&mut self, racial_type: &str, bonus_type: BonusType, value: i32) {
        self.add(Bonus::racial_type(
            racial_type,
            bonus_type,
            StackType::generic_for(value),
            value,
        ));
    }

    pub fn add_damage_reduction(&mut self, damage_type: &str, value: i32) {
        self.add(Bonus::damage(
            damage_type,
            BonusType::DamageReduction,
            StackType::generic_for(value),
            value,
        ));
    }

    pub fn add_damage_immunity(&mut self, damage_type: &str, value: i32) {
        self.add(Bonus::damage(
            damage_type,
            BonusType::DamageImmunity,
            StackType::generic_for(value),
            value,
        ));
    }

    pub fn add_damage_for_weapon_type(&mut self, damage_type: &str, value: i32) {
        self.add(Bonus::damage(
            damage_type,
            BonusType::DamageForWeaponType,
            StackType::generic_for(value),
            value,
        ));
    }

    pub fn add_damage_for_spell_type(&mut self, damage_type: &str, value: i32) {
        self.add(Bonus::damage(
            damage_type,
            BonusType::DamageForSpellType,
            StackType::generic_for(value),
            value,
        ));
    }

    pub fn add_skill(&mut self, skill: &str, value: i32) {
        self.add(Bonus::skill(skill, StackType::generic_for(value), value));
    }

    pub fn add_standalone_damage(&mut self, damage_type: &str, min: i32, max: i32) {
        self.add(Bonus::standalone_damage(damage_type, min, max));
    }

    pub fn add_armor_proficiency(&mut self, armor_type: &str) {
        self.add(Bonus::armor_proficiency(armor_type));
    }

    pub fn add_weapon_proficiency(&mut self, base_weapon: &str) {
        self.add(Bonus::weapon_proficiency(base_weapon));
    }

    /// Add an integer bonus from content strings.
    ///
    /// `stack_category` is e.g. "Morale"; the Bonus/Penalty half follows the
    /// sign of `value`. Unknown type names are logged and skipped; unknown
    /// stack categories fall back to `GenericBonus`. Returns whether a bonus
    /// was added.
    pub fn add_named(&mut self, type_name: &str, stack_category: Option<&str>, value: i32) -> bool {
        let Some(bonus_type) = parse_type(type_name) else {
            return false;
        };

        if bonus_type.is_state_flag() {
            self.add_marker(bonus_type);
            return true;
        }

        let polarity = if value < 0 { "Penalty" } else { "Bonus" };
        let stack_type = stack_type_from_parts(stack_category, polarity);
        self.add(Bonus::int(bonus_type, stack_type, value));
        true
    }

    /// Add a keyed bonus from content strings, picking the bonus kind that
    /// matches the type (armor type, base weapon, racial type, damage type,
    /// skill or proficiency).
    pub fn add_named_keyed(
        &mut self,
        type_name: &str,
        key: &str,
        stack_category: Option<&str>,
        value: i32,
    ) -> bool {
        let Some(bonus_type) = parse_type(type_name) else {
            return false;
        };
        let polarity = if value < 0 { "Penalty" } else { "Bonus" };
        let stack_type = stack_type_from_parts(stack_category, polarity);

        let bonus = match bonus_type {
            BonusType::ArmorTypeArmorClass
            | BonusType::ArmorTypeArmorPenalty
            | BonusType::ArmorTypeMovementPenalty => {
                Bonus::armor_type(key, bonus_type, stack_type, value)
            }
            BonusType::BaseWeaponAttack
            | BonusType::BaseWeaponDamage
            | BonusType::BaseWeaponSpeed
            | BonusType::BaseWeaponCriticalChance
            | BonusType::BaseWeaponCriticalMultiplier => {
                Bonus::base_weapon(key, bonus_type, stack_type, value)
            }
            BonusType::AttackVsRacialType
            | BonusType::DamageVsRacialType
            | BonusType::ArmorClassVsRacialType => {
                Bonus::racial_type(key, bonus_type, stack_type, value)
            }
            BonusType::DamageReduction
            | BonusType::DamageImmunity
            | BonusType::DamageForWeaponType
            | BonusType::DamageForSpellType => Bonus::damage(key, bonus_type, stack_type, value),
            BonusType::StandaloneDamage => Bonus::standalone_damage(key, value, value),
            BonusType::Skill => Bonus::skill(key, stack_type, value),
            BonusType::ArmorProficiency => Bonus::armor_proficiency(key),
            BonusType::WeaponProficiency => Bonus::weapon_proficiency(key),
            other => {
                tracing::warn!("Bonus type {:?} does not take a key ('{}')", other, key);
                Bonus::int(other, stack_type, value)
            }
        };

        self.add(bonus);
        true
    }
}

impl<'a> IntoIterator for &'a BonusList {
    type Item = &'a Bonus;
    type IntoIter = std::slice::Iter<'a, Bonus>;

    fn into_iter(self) -> Self::IntoIter {
        self.bonuses.iter()
    }
}

impl FromIterator<Bonus> for BonusList {
    fn from_iter<I: IntoIterator<Item = Bonus>>(iter: I) -> Self {
        BonusList {
            bonuses: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::BonusKind;

    #[test]
    fn test_add_int_picks_generic_by_sign() {
        let mut list = BonusList::new();
        list.add_int(BonusType::Str, 2);
        list.add_int(BonusType::Dex, -3);

        let str_bonus = list.bonus_of_type(BonusType::Str).unwrap();
        assert_eq!(str_bonus.stack_type(), StackType::GenericBonus);
        let dex_bonus = list.bonus_of_type(BonusType::Dex).unwrap();
        assert_eq!(dex_bonus.stack_type(), StackType::GenericPenalty);
    }

    #[test]
    fn test_remove_first_equal_only() {
        let mut list = BonusList::new();
        list.add_int(BonusType::Attack, 5);
        list.add_int(BonusType::Attack, 5);
        assert!(list.remove(&Bonus::int(BonusType::Attack, StackType::GenericBonus, 5)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_bonuses_of_type() {
        let mut list = BonusList::new();
        list.add_int(BonusType::Attack, 5);
        list.add_int(BonusType::Damage, 10);
        list.add_marker(BonusType::Hidden);

        let found = list.bonuses_of_type(&[BonusType::Attack, BonusType::Hidden]);
        assert_eq!(found.len(), 2);
        assert!(list.bonus_of_type(BonusType::Silence).is_none());
    }

    #[test]
    fn test_add_all_copies() {
        let mut a = BonusList::new();
        a.add_int(BonusType::Con, 2);
        let mut b = BonusList::new();
        b.add_all(&a);
        a.add_int(BonusType::Con, 4);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_add_named() {
        let mut list = BonusList::new();
        assert!(list.add_named("ArmorClass", Some("Morale"), 4));
        assert!(list.add_named("Attack", None, -10));
        assert!(list.add_named("Immobilized", None, 0));
        assert!(!list.add_named("Armour", None, 1));

        let stacks: Vec<_> = list.iter().map(|b| b.stack_type()).collect();
        assert_eq!(
            stacks,
            vec![StackType::MoraleBonus, StackType::GenericPenalty, StackType::GenericBonus]
        );
        assert!(!list.iter().nth(2).unwrap().has_value());
    }

    #[test]
    fn test_add_named_typo_in_stack_type_falls_back() {
        let mut list = BonusList::new();
        list.add_named("ArmorClass", Some("Moral"), 4);
        assert_eq!(list.iter().next().unwrap().stack_type(), StackType::GenericBonus);
    }

    #[test]
    fn test_add_named_keyed_picks_kind() {
        let mut list = BonusList::new();
        list.add_named_keyed("ArmorClassVsRacialType", "Goblinoid", None, 10);
        list.add_named_keyed("Skill", "Search", Some("Luck"), 3);
        list.add_named_keyed("WeaponProficiency", "Spear", None, 0);

        let kinds: Vec<_> = list.iter().map(|b| b.kind().clone()).collect();
        assert!(matches!(kinds[0], BonusKind::RacialType { .. }));
        assert!(matches!(kinds[1], BonusKind::Skill { .. }));
        assert!(matches!(kinds[2], BonusKind::WeaponProficiency { .. }));
    }

    #[test]
    fn test_description_lines() {
        let mut list = BonusList::new();
        list.add_int(BonusType::Str, 2);
        list.add_marker(BonusType::Hidden);
        assert_eq!(list.description(), "+2 Strength\nHidden");
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut list = BonusList::new();
        list.add_int(BonusType::Str, -4);
        list.add_int(BonusType::Dex, 1);
        let old = Bonus::int(BonusType::Str, StackType::GenericPenalty, -4);
        assert!(list.replace(&old, old.clone_with_reduction(-2)));
        assert_eq!(list.iter().next().unwrap().value(), -2);
    }
}
