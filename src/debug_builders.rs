// ==============================================================================
// debug_builders.rs — TELEMETRY SNAPSHOTS (SIM -> STDOUT)
// ------------------------------------------------------------------------------
// Serializable per-tick view of every vehicle:
// - VehicleSnapshot: chassis pose/speed, mode, grounded count, latest input
// - DebugWheel: per-wheel probe result, spring force, trail, steer/roll, center
//
// Builders only read state; nothing here touches the simulation.
// ==============================================================================

use rapier3d::prelude::{Isometry, Point, Real, Vector};
use serde::Serialize;

use crate::config::CarVariant;
use crate::controller::VehicleController;
use crate::dynamics::{ChassisBody, WheelId};
use crate::vehicle::{VehicleMode, Wheel};

#[inline] fn v3(v: Vector<Real>) -> [f32; 3] { [v.x, v.y, v.z] }
#[inline] fn p3(p: Point<Real>)  -> [f32; 3] { [p.x, p.y, p.z] }

#[derive(Debug, Clone, Serialize)]
pub struct DebugWheel {
    pub id: WheelId,
    pub grounded: bool,
    pub distance: f32,          // probe hit distance (reach when airborne)
    pub spring_force: [f32; 3], // world space, zero without raycast suspension
    pub damping: f32,
    pub trail_emitting: bool,
    pub steer_deg: f32,
    pub roll_deg: f32,
    pub center: [f32; 3],       // wheel visual, world space
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugInput {
    pub steer: f32,
    pub gas: f32,
    pub brake: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub variant: CarVariant,
    pub mode: VehicleMode,
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion (x, y, z, w)
    pub speed: f32,
    pub grounded: usize,
    pub input: DebugInput,
    pub wheels: Vec<DebugWheel>,
}

pub fn build_debug_wheel(wheel: &Wheel, chassis: &Isometry<Real>) -> DebugWheel {
    let pose = wheel.world_pose(chassis);
    DebugWheel {
        id: wheel.id,
        grounded: wheel.probe.grounded,
        distance: wheel.probe.distance,
        spring_force: v3(wheel.spring_force),
        damping: wheel.damping,
        trail_emitting: wheel.trail_emitting,
        steer_deg: wheel.steer_deg(),
        roll_deg: wheel.roll_deg,
        center: p3(Point::from(pose.translation.vector)),
    }
}

pub fn build_vehicle_snapshot<C: ChassisBody + ?Sized>(
    id: &str,
    chassis: &C,
    controller: &VehicleController,
) -> VehicleSnapshot {
    let pose = chassis.pose();
    let q = pose.rotation.quaternion();
    let input = controller.input();

    VehicleSnapshot {
        id: id.to_string(),
        variant: controller.variant(),
        mode: controller.mode(),
        position: v3(pose.translation.vector),
        rotation: [q.i, q.j, q.k, q.w],
        speed: chassis.linear_velocity().norm(),
        grounded: controller.grounded(),
        input: DebugInput {
            steer: input.steer.x,
            gas: input.gas,
            brake: input.brake,
        },
        wheels: controller
            .wheels()
            .iter()
            .map(|w| build_debug_wheel(w, &pose))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PHYSICS_CAR;
    use crate::dynamics::testing::{FlatGround, MockChassis};
    use approx::assert_abs_diff_eq;
    use rapier3d::prelude::vector;

    #[test]
    fn snapshot_reports_pose_and_wheels() {
        let mut chassis = MockChassis::at_height(0.6).moving(vector![0.0, 0.0, 3.0]);
        let mut car = VehicleController::new(&PHYSICS_CAR, VehicleMode::Drivable, &chassis).expect("preset");
        car.tick(&mut chassis, &FlatGround::at(0.0), 0.02);

        let snap = build_vehicle_snapshot("player", &chassis, &car);

        assert_eq!(snap.id, "player");
        assert_eq!(snap.grounded, 4);
        assert_abs_diff_eq!(snap.speed, 3.0);
        assert_eq!(snap.wheels.len(), 4);
        assert_eq!(snap.wheels[1].id, WheelId::FR);
        assert_abs_diff_eq!(snap.wheels[1].center[0], 0.8, epsilon = 1e-5);
        assert_abs_diff_eq!(snap.wheels[1].center[1], 0.3, epsilon = 1e-5);
        assert!(snap.wheels.iter().all(|w| w.trail_emitting));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let chassis = MockChassis::at_height(2.0);
        let car = VehicleController::new(&PHYSICS_CAR, VehicleMode::Menu, &chassis).expect("preset");
        let json = serde_json::to_value(build_vehicle_snapshot("physics", &chassis, &car)).expect("json");
        assert_eq!(json["mode"], "menu");
        assert_eq!(json["variant"], "physics");
        assert_eq!(json["wheels"][0]["id"], "FL");
    }
}
