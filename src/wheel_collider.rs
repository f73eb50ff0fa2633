// ==============================================================================
// wheel_collider.rs — ENGINE-SIDE WHEELS (wheel-collider cars)
// ------------------------------------------------------------------------------
// Thin wrapper over rapier's DynamicRayCastVehicleController.
//
// Chassis frame: +z forward, +y up, +x right.
// - suspension direction -y, axle -x  → rolling forward is +z
// - positive steering (rad) yaws the wheel toward +x
//
// Wheels are added in WheelId::ALL order, so `id.index()` addresses them.
// ==============================================================================

use rapier3d::control::{DynamicRayCastVehicleController, WheelTuning};
use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::{
    ColliderSet, Isometry, QueryFilter, QueryPipeline, Real, RigidBodyHandle, RigidBodySet, Vector,
};

use crate::config::NativeTuning;
use crate::contact::WheelColliders;
use crate::dynamics::WheelId;
use crate::dynamics::drive::WheelCommand;
use crate::vehicle::Wheel;

pub struct NativeWheels {
    controller: DynamicRayCastVehicleController,
    poses: [Isometry<Real>; 4],
}

impl NativeWheels {
    pub fn new(chassis: RigidBodyHandle, chassis_pose: &Isometry<Real>, wheels: &[Wheel; 4], tuning: &NativeTuning) -> Self {
        let mut controller = DynamicRayCastVehicleController::new(chassis);
        controller.index_up_axis = 1;
        controller.index_forward_axis = 2;

        let wheel_tuning = WheelTuning {
            suspension_stiffness: tuning.stiffness,
            max_suspension_travel: tuning.max_travel,
            friction_slip: tuning.friction_slip,
            ..WheelTuning::default()
        };

        let mut poses = [Isometry::identity(); 4];
        for (wheel, pose) in wheels.iter().zip(poses.iter_mut()) {
            controller.add_wheel(
                wheel.anchor,
                -Vector::y(),
                -Vector::x(),
                tuning.rest_length,
                wheel.radius,
                &wheel_tuning,
            );
            // resting pose until the first engine update
            let local = wheel.anchor - Vector::y() * tuning.rest_length;
            *pose = chassis_pose * Isometry::from_parts(Translation3::from(local.coords), UnitQuaternion::identity());
        }

        Self { controller, poses }
    }

    /// Engine suspension + traction for one tick, then refresh wheel poses.
    pub fn update(
        &mut self,
        dt: Real,
        bodies: &mut RigidBodySet,
        colliders: &ColliderSet,
        queries: &QueryPipeline,
        filter: QueryFilter,
    ) {
        self.controller.update_vehicle(dt, bodies, colliders, queries, filter);

        let chassis_rot = bodies
            .get(self.controller.chassis)
            .map(|b| *b.rotation())
            .unwrap_or_else(UnitQuaternion::identity);

        for (pose, wheel) in self.poses.iter_mut().zip(self.controller.wheels()) {
            let steer = UnitQuaternion::from_axis_angle(&Vector::y_axis(), wheel.steering);
            let roll = UnitQuaternion::from_axis_angle(&Vector::x_axis(), wheel.rotation);
            *pose = Isometry::from_parts(Translation3::from(wheel.center().coords), chassis_rot * steer * roll);
        }
    }
}

impl WheelColliders for NativeWheels {
    fn apply(&mut self, id: WheelId, command: &WheelCommand) {
        if let Some(wheel) = self.controller.wheels_mut().get_mut(id.index()) {
            wheel.steering = command.steer_deg.to_radians();
            wheel.engine_force = command.motor;
            wheel.brake = command.brake;
        }
    }

    fn world_pose(&self, id: WheelId) -> Isometry<Real> {
        self.poses[id.index()]
    }

    fn contact_distance(&self, id: WheelId) -> Option<Real> {
        let wheel = self.controller.wheels().get(id.index())?;
        let info = wheel.raycast_info();
        info.is_in_contact.then(|| (wheel.center() - info.contact_point_ws).norm())
    }
}
