// ==============================================================================
// probe.rs — PER-WHEEL GROUND PROBE
// ------------------------------------------------------------------------------
// Casts a ray from the wheel origin along -chassis_up for up to `cast_length`.
// - grounded = ray hit anything within the length
// - distance = hit distance (cast length when airborne)
//
// Probing is a pure function of world geometry: no state is shared between
// wheels and calling it twice with the same world yields the same result.
// The caller owns the trail toggle and the grounded count.
// ==============================================================================

use rapier3d::prelude::{Point, Real, Vector};

use crate::dynamics::types::{GroundQuery, ProbeResult};

pub fn probe<G: GroundQuery + ?Sized>(
    ground: &G,
    origin: Point<Real>,
    chassis_up: Vector<Real>,
    cast_length: Real,
) -> ProbeResult {
    let dir = -chassis_up;

    match ground.cast(origin, dir, cast_length) {
        Some(toi) if toi <= cast_length => ProbeResult::hit(toi),
        _ => ProbeResult::airborne(cast_length),
    }
}

/// Number of grounded wheels this tick (always 0..=4).
pub fn grounded_count(results: &[ProbeResult; 4]) -> usize {
    results.iter().filter(|r| r.grounded).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::testing::FlatGround;
    use approx::assert_abs_diff_eq;
    use rapier3d::prelude::{point, vector};

    #[test]
    fn hit_within_reach_reports_distance() {
        let ground = FlatGround::at(0.0);
        let r = probe(&ground, point![0.0, 0.3, 0.0], vector![0.0, 1.0, 0.0], 0.35);
        assert!(r.grounded);
        assert_abs_diff_eq!(r.distance, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn miss_beyond_reach_is_airborne() {
        let ground = FlatGround::at(0.0);
        let r = probe(&ground, point![0.0, 2.0, 0.0], vector![0.0, 1.0, 0.0], 0.35);
        assert!(!r.grounded);
        assert_abs_diff_eq!(r.distance, 0.35);
    }

    #[test]
    fn inverted_chassis_casts_upward() {
        // Upside-down car: the probe points at the sky and misses the ground.
        let ground = FlatGround::at(0.0);
        let r = probe(&ground, point![0.0, 0.1, 0.0], vector![0.0, -1.0, 0.0], 0.35);
        assert!(!r.grounded);
    }

    #[test]
    fn probing_twice_is_identical() {
        let ground = FlatGround::at(0.0);
        let origin = point![1.0, 0.2, -3.0];
        let a = probe(&ground, origin, vector![0.0, 1.0, 0.0], 0.5);
        let b = probe(&ground, origin, vector![0.0, 1.0, 0.0], 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn grounded_count_stays_in_range() {
        let hit = ProbeResult::hit(0.1);
        let air = ProbeResult::airborne(0.5);
        assert_eq!(grounded_count(&[air; 4]), 0);
        assert_eq!(grounded_count(&[hit, air, hit, air]), 2);
        assert_eq!(grounded_count(&[hit; 4]), 4);
    }
}
