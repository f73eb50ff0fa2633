//! Flip recovery: zero roll and pitch, keep heading.

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Real, Vector};

/// Heading (radians about world up) of an arbitrary orientation.
///
/// Uses the forward axis projected on the ground plane; when the nose points
/// straight up or down, falls back to the lateral axis.
pub fn heading(rotation: &UnitQuaternion<Real>) -> Real {
    let forward = rotation * Vector::z();
    if forward.x.hypot(forward.z) > 1e-4 {
        return forward.x.atan2(forward.z);
    }

    let lateral = rotation * Vector::x();
    (-lateral.z).atan2(lateral.x)
}

/// Same heading, wheels down.
pub fn upright(rotation: &UnitQuaternion<Real>) -> UnitQuaternion<Real> {
    UnitQuaternion::from_axis_angle(&Vector::y_axis(), heading(rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rot(axis: Vector<Real>, deg: Real) -> UnitQuaternion<Real> {
        UnitQuaternion::from_axis_angle(&rapier3d::na::Unit::new_normalize(axis), deg.to_radians())
    }

    fn assert_level(q: &UnitQuaternion<Real>) {
        let up = q * Vector::y();
        assert_abs_diff_eq!(up, Vector::y(), epsilon = 1e-5);
    }

    #[test]
    fn rolled_car_keeps_yaw() {
        let q = rot(Vector::y(), 30.0) * rot(Vector::z(), 40.0);
        let fixed = upright(&q);
        assert_level(&fixed);
        assert_abs_diff_eq!(heading(&fixed).to_degrees(), 30.0, epsilon = 1e-3);
    }

    #[test]
    fn inverted_car_keeps_yaw() {
        let q = rot(Vector::y(), -75.0) * rot(Vector::z(), 180.0);
        let fixed = upright(&q);
        assert_level(&fixed);
        assert_abs_diff_eq!(heading(&fixed).to_degrees(), -75.0, epsilon = 1e-3);
    }

    #[test]
    fn pitched_car_keeps_yaw() {
        let q = rot(Vector::y(), 120.0) * rot(Vector::x(), 35.0);
        let fixed = upright(&q);
        assert_level(&fixed);
        assert_abs_diff_eq!(heading(&fixed).to_degrees(), 120.0, epsilon = 1e-3);
    }

    #[test]
    fn nose_down_falls_back_to_lateral_axis() {
        let q = rot(Vector::y(), 45.0) * rot(Vector::x(), 90.0);
        let fixed = upright(&q);
        assert_level(&fixed);
        assert_abs_diff_eq!(heading(&fixed).to_degrees(), 45.0, epsilon = 1e-2);
    }

    #[test]
    fn level_car_is_untouched() {
        let q = rot(Vector::y(), 10.0);
        assert_abs_diff_eq!(upright(&q).angle_to(&q), 0.0, epsilon = 1e-5);
    }
}
