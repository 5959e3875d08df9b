//! Effects - timed sources of bonuses on a creature

use crate::bonus::BonusList;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A status effect applied to a creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: String,
    pub title: String,
    pub bonuses: BonusList,
    /// Rounds left; `None` lasts until removed
    #[serde(default)]
    pub rounds_remaining: Option<u32>,
}

impl Effect {
    pub fn new(id: &str, title: &str, bonuses: BonusList) -> Self {
        Effect {
            id: id.to_string(),
            title: title.to_string(),
            bonuses,
            rounds_remaining: None,
        }
    }

    pub fn with_duration(mut self, rounds: u32) -> Self {
        self.rounds_remaining = Some(rounds);
        self
    }

    pub fn bonuses(&self) -> &BonusList {
        &self.bonuses
    }

    /// Count down one round; returns true once expired
    pub fn elapse_round(&mut self) -> bool {
        match self.rounds_remaining.as_mut() {
            Some(0) => true,
            Some(rounds) => {
                *rounds -= 1;
                *rounds == 0
            }
            None => false,
        }
    }
}

/// The active effects of one creature.
///
/// Effects may be added or removed from timer code running beside the game
/// loop, so every access goes through the lock. Readers that walk the
/// collection take a [`snapshot`](EffectSet::snapshot) and iterate that copy;
/// the lock is never held across a recompute.
#[derive(Debug, Default)]
pub struct EffectSet {
    effects: Mutex<Vec<Effect>>,
}

impl EffectSet {
    pub fn new() -> Self {
        EffectSet {
            effects: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Effect>> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, effect: Effect) {
        self.lock().push(effect);
    }

    /// Remove the effect with this id
    pub fn remove(&self, id: &str) -> Option<Effect> {
        let mut effects = self.lock();
        let index = effects.iter().position(|e| e.id == id)?;
        Some(effects.remove(index))
    }

    /// Value copy of the current effects
    pub fn snapshot(&self) -> Vec<Effect> {
        self.lock().clone()
    }

    /// Run `f` against one effect while holding the lock
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut Effect) -> R) -> Option<R> {
        let mut effects = self.lock();
        effects.iter_mut().find(|e| e.id == id).map(f)
    }

    /// Count down every effect and return the ones that expired
    pub fn elapse_round(&self) -> Vec<Effect> {
        let mut effects = self.lock();
        let mut expired = Vec::new();
        let mut i = 0;
        while i < effects.len() {
            if effects[i].elapse_round() {
                expired.push(effects.remove(i));
            } else {
                i += 1;
            }
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Clone for EffectSet {
    fn clone(&self) -> Self {
        EffectSet {
            effects: Mutex::new(self.snapshot()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::BonusType;

    fn bless() -> Effect {
        let mut bonuses = BonusList::new();
        bonuses.add_int(BonusType::Attack, 10);
        Effect::new("bless", "Bless", bonuses)
    }

    #[test]
    fn test_add_remove() {
        let set = EffectSet::new();
        set.add(bless());
        assert_eq!(set.len(), 1);
        assert!(set.remove("bless").is_some());
        assert!(set.remove("bless").is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let set = EffectSet::new();
        set.add(bless());
        let snapshot = set.snapshot();
        set.remove("bless");
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_clone_is_deep() {
        let set = EffectSet::new();
        set.add(bless());
        let copy = set.clone();
        set.remove("bless");
        assert_eq!(copy.len(), 1);
    }

    #[test]
    fn test_elapse_round_expires() {
        let set = EffectSet::new();
        set.add(bless().with_duration(2));
        assert!(set.elapse_round().is_empty());
        let expired = set.elapse_round();
        assert_eq!(expired.len(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_concurrent_adds() {
        let set = std::sync::Arc::new(EffectSet::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let set = set.clone();
                std::thread::spawn(move || {
                    let mut effect = bless();
                    effect.id = format!("bless{}", i);
                    set.add(effect);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(set.len(), 4);
    }
}
