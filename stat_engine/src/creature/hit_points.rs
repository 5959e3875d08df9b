//! HitPoints - current and temporary hit points

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    /// Absorbs damage before `current`
    pub temporary: i32,
}

impl HitPoints {
    pub fn new(current: i32) -> Self {
        HitPoints {
            current,
            temporary: 0,
        }
    }

    /// Lose `amount` HP, temporary HP first. Returns HP lost from `current`.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let absorbed = amount.min(self.temporary);
        self.temporary -= absorbed;
        let remaining = amount - absorbed;
        self.current -= remaining;
        remaining
    }

    /// Lose `amount` from `current` only; temporary HP is left alone
    pub fn drain(&mut self, amount: i32) {
        if amount > 0 {
            self.current -= amount;
        }
    }

    /// Heal up to `max`; returns the amount actually healed
    pub fn heal(&mut self, amount: i32, max: i32) -> i32 {
        if amount <= 0 || self.current >= max {
            return 0;
        }
        let healed = amount.min(max - self.current);
        self.current += healed;
        healed
    }

    pub fn add_temporary(&mut self, amount: i32) {
        self.temporary += amount;
    }

    /// Drop temporary HP granted by an expiring source; never below zero
    pub fn remove_temporary(&mut self, amount: i32) {
        self.temporary = (self.temporary - amount).max(0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}
