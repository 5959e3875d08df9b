//! Combat - attack resolution and typed damage

mod attack;
mod damage;
mod flanking;

pub use attack::{Attack, AttackKind, AttackState};
pub use damage::{Damage, DamageEntry, EFFECT_DAMAGE_TYPE};
pub use flanking::flanking_angle;
