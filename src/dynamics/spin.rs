//! Wheel roll visuals: chassis linear speed → wheel spin about its axle.
//!
//! Purely cosmetic; nothing here feeds back into the physics.

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Real, Vector};

/// +1 when moving along the chassis forward axis, -1 otherwise.
#[inline]
pub fn roll_direction(linvel: &Vector<Real>, forward: &Vector<Real>) -> Real {
    if linvel.dot(forward) > 0.0 { 1.0 } else { -1.0 }
}

/// Wheel angular speed (deg/s) for a chassis moving at `speed` m/s.
#[inline]
pub fn angular_speed_deg(speed: Real, radius: Real) -> Real {
    (speed / radius).to_degrees()
}

/// Signed roll (degrees) for this tick.
pub fn roll_angle(linvel: &Vector<Real>, forward: &Vector<Real>, radius: Real, dt: Real) -> Real {
    roll_direction(linvel, forward) * angular_speed_deg(linvel.norm(), radius) * dt
}

/// Rotate a wheel visual about its lateral (local x) axis by `angle_deg`.
pub fn spin(visual: &UnitQuaternion<Real>, angle_deg: Real) -> UnitQuaternion<Real> {
    visual * UnitQuaternion::from_axis_angle(&Vector::x_axis(), angle_deg.to_radians())
}
