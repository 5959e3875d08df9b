//! Flanking geometry

use crate::types::GridPoint;

/// Angle in degrees at `defender` between the lines to `attacker` and
/// `flanker`, from the law of cosines on screen-space distances.
///
/// Returns 0 when either line has no length.
pub fn flanking_angle(attacker: GridPoint, defender: GridPoint, flanker: GridPoint) -> f64 {
    let a = defender.screen_distance(attacker);
    let b = defender.screen_distance(flanker);
    let c = attacker.screen_distance(flanker);
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }

    let cos = (a * a + b * b - c * c) / (2.0 * a * b);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}
