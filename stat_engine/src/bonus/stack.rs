//! BonusStackTypeList - running total for one (type, stack type) bucket

use super::{Bonus, StackType};

/// The members and aggregate of one `(BonusType, StackType)` bucket.
///
/// Stackable buckets sum their members. Every other bucket keeps the single
/// member with the largest magnitude; ties keep the earlier total.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusStackTypeList {
    stack_type: StackType,
    bonuses: Vec<Bonus>,
    current_total: i32,
}

impl BonusStackTypeList {
    /// Create an empty bucket for `stack_type`
    pub fn new(stack_type: StackType) -> Self {
        BonusStackTypeList {
            stack_type,
            bonuses: Vec::new(),
            current_total: 0,
        }
    }

    /// Add a member, updating the total without rescanning
    pub fn add(&mut self, bonus: Bonus) {
        self.current_total = combine(self.stack_type, self.current_total, bonus.value());
        self.bonuses.push(bonus);
    }

    /// Remove the first member equal to `bonus` and recompute the total.
    ///
    /// Returns false if no member matched.
    pub fn remove(&mut self, bonus: &Bonus) -> bool {
        let Some(index) = self.bonuses.iter().position(|b| b == bonus) else {
            return false;
        };
        self.bonuses.remove(index);

        // The removed member may have been the max, so start over
        self.current_total = self
            .bonuses
            .iter()
            .fold(0, |total, b| combine(self.stack_type, total, b.value()));
        true
    }

    pub fn current_total(&self) -> i32 {
        self.current_total
    }

    pub fn stack_type(&self) -> StackType {
        self.stack_type
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bonus> {
        self.bonuses.iter()
    }
}

fn combine(stack_type: StackType, total: i32, value: i32) -> i32 {
    if stack_type.is_stackable() {
        total + value
    } else if value.abs() > total.abs() {
        value
    } else {
        total
    }
}
