//! Inventory - equipped items by slot

use crate::item::{Item, ItemKind, WeaponStats};
use crate::types::{HandSlot, InventorySlot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    equipped: HashMap<InventorySlot, Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory {
            equipped: HashMap::new(),
        }
    }

    /// Put an item in a slot, returning what was there
    pub fn equip(&mut self, slot: InventorySlot, item: Item) -> Option<Item> {
        self.equipped.insert(slot, item)
    }

    pub fn unequip(&mut self, slot: InventorySlot) -> Option<Item> {
        self.equipped.remove(&slot)
    }

    pub fn equipped(&self, slot: InventorySlot) -> Option<&Item> {
        self.equipped.get(&slot)
    }

    pub fn equipped_mut(&mut self, slot: InventorySlot) -> Option<&mut Item> {
        self.equipped.get_mut(&slot)
    }

    /// Weapon held in a hand; shields and empty hands give `None`
    pub fn weapon(&self, hand: HandSlot) -> Option<&WeaponStats> {
        self.equipped(hand.into()).and_then(Item::weapon)
    }

    /// Shield held in the off hand
    pub fn shield(&self) -> Option<&Item> {
        self.equipped(InventorySlot::OffHand)
            .filter(|item| item.is_shield())
    }

    /// Ammunition in the quiver usable by `base_weapon`
    pub fn ammo_for(&self, base_weapon: &str) -> Option<&Item> {
        self.equipped(InventorySlot::Quiver)
            .filter(|item| matches!(&item.kind, ItemKind::Ammo { ammo_for } if ammo_for == base_weapon))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InventorySlot, &Item)> {
        self.equipped.iter()
    }
}
