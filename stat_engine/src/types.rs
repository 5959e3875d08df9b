//! Core types shared across the engine

use crate::error::CombatError;
use serde::{Deserialize, Serialize};

/// Equipment slot of a creature's inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventorySlot {
    MainHand,
    OffHand,
    Armor,
    Helmet,
    Gloves,
    Boots,
    Quiver,
}

impl InventorySlot {
    /// Slots whose items contribute armor class
    pub fn armor_slots() -> &'static [InventorySlot] {
        &[
            InventorySlot::Armor,
            InventorySlot::Helmet,
            InventorySlot::Gloves,
            InventorySlot::Boots,
        ]
    }
}

/// A hand that can make a weapon attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSlot {
    MainHand,
    OffHand,
}

impl From<HandSlot> for InventorySlot {
    fn from(hand: HandSlot) -> Self {
        match hand {
            HandSlot::MainHand => InventorySlot::MainHand,
            HandSlot::OffHand => InventorySlot::OffHand,
        }
    }
}

impl TryFrom<InventorySlot> for HandSlot {
    type Error = CombatError;

    fn try_from(slot: InventorySlot) -> Result<Self, Self::Error> {
        match slot {
            InventorySlot::MainHand => Ok(HandSlot::MainHand),
            InventorySlot::OffHand => Ok(HandSlot::OffHand),
            other => Err(CombatError::NotAHand(other)),
        }
    }
}

/// The six base attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

/// Creature allegiance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Friendly,
    #[default]
    Neutral,
    Hostile,
}

impl Faction {
    /// Player-side factions fight hostile ones and vice versa
    pub fn is_hostile_to(self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Player | Faction::Friendly, Faction::Hostile)
                | (Faction::Hostile, Faction::Player | Faction::Friendly)
        )
    }
}

/// Screen size of one hex tile
pub const TILE_WIDTH: f64 = 72.0;
pub const TILE_HEIGHT: f64 = 64.0;

/// Position on the hex grid (odd columns shifted down half a tile)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        GridPoint { x, y }
    }

    /// Pixel position of the tile center
    pub fn screen_point(self) -> (f64, f64) {
        let sx = self.x as f64 * TILE_WIDTH * 3.0 / 4.0;
        let shift = if self.x.rem_euclid(2) == 1 {
            TILE_HEIGHT / 2.0
        } else {
            0.0
        };
        let sy = self.y as f64 * TILE_HEIGHT + shift;
        (sx, sy)
    }

    /// Straight-line distance between tile centers in screen space
    pub fn screen_distance(self, other: GridPoint) -> f64 {
        let (ax, ay) = self.screen_point();
        let (bx, by) = other.screen_point();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Number of hex steps between two tiles
    pub fn grid_distance(self, other: GridPoint) -> i32 {
        let (ax, ay, az) = self.cube();
        let (bx, by, bz) = other.cube();
        ((ax - bx).abs() + (ay - by).abs() + (az - bz).abs()) / 2
    }

    fn cube(self) -> (i32, i32, i32) {
        let x = self.x;
        let z = self.y - (self.x - (self.x & 1)) / 2;
        (x, -x - z, z)
    }
}
