// ==============================================================================
// drive.rs — STEER / THROTTLE / BRAKE → CHASSIS
// ------------------------------------------------------------------------------
// turn(...):
// - grounded > 0: yaw the chassis about its own up axis by turn_speed * steer * dt
// - always: front anchors point at steer_lock * steer (visual steer angle is
//   independent of traction)
//
// drive(...):
// - grounded > 0: velocity change of move_speed * gas * dt along chassis forward
// - grounded > 0: drag = baseline + brake_strength * brake * dt
// - grounded == 0: nothing; the chassis is ballistic
//
// Braking works by inflating drag, not by an opposing force. The drag is only
// rewritten while grounded, so it keeps its last value through airtime.
//
// native_commands(...):
// - wheel-collider cars hand steer/motor/brake straight to the engine wheels.
// ==============================================================================

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Real, Vector};
use serde::Serialize;

use crate::config::{DriveTuning, NativeTuning};
use crate::dynamics::types::{ChassisBody, WheelId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveOutput {
    pub velocity_change: Vector<Real>,
    pub drag: Real,
}

/// Per-wheel order for engine-side wheel colliders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelCommand {
    pub steer_deg: Real,
    pub motor: Real,
    pub brake: Real,
}

/// Local rotation of a front anchor for the given steer input.
pub fn steer_rotation(tuning: &DriveTuning, steer_x: Real) -> UnitQuaternion<Real> {
    UnitQuaternion::from_axis_angle(&Vector::y_axis(), (tuning.steer_lock_deg * steer_x).to_radians())
}

pub fn turn<C: ChassisBody + ?Sized>(
    chassis: &mut C,
    tuning: &DriveTuning,
    steer_x: Real,
    grounded: usize,
    dt: Real,
) -> UnitQuaternion<Real> {
    if grounded > 0 {
        let yaw = (tuning.turn_speed * steer_x * dt).to_radians();
        let rotation = chassis.pose().rotation * UnitQuaternion::from_axis_angle(&Vector::y_axis(), yaw);
        chassis.set_orientation(rotation);
    }

    steer_rotation(tuning, steer_x)
}

pub fn drive<C: ChassisBody + ?Sized>(
    chassis: &mut C,
    tuning: &DriveTuning,
    gas: Real,
    brake: Real,
    grounded: usize,
    baseline_drag: Real,
    dt: Real,
) -> Option<DriveOutput> {
    if grounded == 0 {
        return None;
    }

    // gas (forward-relative, mass independent)
    let velocity_change = chassis.forward() * (tuning.move_speed * gas * dt);
    chassis.add_velocity_change(velocity_change);

    // brake
    let drag = baseline_drag + tuning.brake_strength * brake * dt;
    chassis.set_drag(drag);

    Some(DriveOutput { velocity_change, drag })
}

pub fn native_commands(tuning: &NativeTuning, steer_x: Real, gas: Real, brake: Real) -> [WheelCommand; 4] {
    WheelId::ALL.map(|id| WheelCommand {
        steer_deg: if id.is_front() { tuning.steer_deg * steer_x } else { 0.0 },
        motor: tuning.motor * gas,
        brake: tuning.brake * brake,
    })
}
