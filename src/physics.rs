// src/physics.rs
// ==============================================================================
// PhysicsWorld — rapier sets + ground slab + spawned vehicles.
// ------------------------------------------------------------------------------
// step(dt), per vehicle:
//   reset → probe → drive → suspension
//   (wheel-collider: push commands → engine vehicle update → pull wheel poses
//    → grounding from engine wheel contact, no probe)
//   → wheel visual sync
// then one PhysicsPipeline::step for the whole world, then the world guard.
// ==============================================================================

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::{CarVariant, VehicleConfig};
use crate::controller::VehicleController;
use crate::debug_builders::{build_vehicle_snapshot, VehicleSnapshot};
use crate::dynamics::{ChassisBody, GroundQuery};
use crate::error::SimError;
use crate::state::{InputEvent, InputSample};
use crate::vehicle::VehicleMode;
use crate::wheel_collider::NativeWheels;

const GROUP_GROUND: Group  = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

const WORLD_LIMIT: Real = 1_000.0;

// --------------------------------------------------
// engine seams
// --------------------------------------------------

impl ChassisBody for RigidBody {
    fn pose(&self) -> Isometry<Real> {
        *self.position()
    }

    fn set_orientation(&mut self, rotation: UnitQuaternion<Real>) {
        self.set_rotation(rotation, true);
    }

    fn linear_velocity(&self) -> Vector<Real> {
        *self.linvel()
    }

    fn point_velocity(&self, point: &Point<Real>) -> Vector<Real> {
        self.velocity_at_point(point)
    }

    fn drag(&self) -> Real {
        self.linear_damping()
    }

    fn set_drag(&mut self, drag: Real) {
        self.set_linear_damping(drag);
    }

    fn add_velocity_change(&mut self, delta_v: Vector<Real>) {
        let v = *self.linvel() + delta_v;
        self.set_linvel(v, true);
    }

    fn add_force_at_point(&mut self, force: Vector<Real>, point: Point<Real>, dt: Real) {
        // impulse, so nothing lingers into the next tick
        self.apply_impulse_at_point(force * dt, point, true);
    }
}

/// Ray queries against the scene, ignoring one rigid body (the prober).
pub struct SceneQuery<'a> {
    pub pipeline: &'a QueryPipeline,
    pub bodies: &'a RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub filter: QueryFilter<'a>,
}

impl GroundQuery for SceneQuery<'_> {
    fn cast(&self, origin: Point<Real>, dir: Vector<Real>, max_len: Real) -> Option<Real> {
        let ray = Ray::new(origin, dir);
        self.pipeline
            .cast_ray(self.bodies, self.colliders, &ray, max_len, true, self.filter)
            .map(|(_hit, toi)| toi)
    }
}

// --------------------------------------------------
// world
// --------------------------------------------------

pub struct Vehicle {
    pub body: RigidBodyHandle,
    pub controller: VehicleController,
    pub native: Option<NativeWheels>, // wheel-collider cars only
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // gravity vector
    pub pipeline: PhysicsPipeline, // physics pipeline
    pub island_manager: IslandManager, // manages islands of bodies
    pub broad_phase: DefaultBroadPhase, // broad-phase collision detection
    pub narrow_phase: NarrowPhase, // collision detection
    pub bodies: RigidBodySet, // for rigid bodies
    pub colliders: ColliderSet, // for collision shapes
    pub joints: ImpulseJointSet, // for constraints
    pub multibody_joints: MultibodyJointSet,// for articulated bodies
    pub ccd: CCDSolver, // continuous collision detection
    pub query_pipeline: QueryPipeline, // for raycasting
    pub vehicles: HashMap<String, Vehicle>, // vehicle id → vehicle
    pub tick: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let gravity = vector![0.0, -9.81, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Static ground slab, 1000 x 2 x 1000, top face at y = 0.
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -1.0, 0.0])
            .build();

        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(500.0, 1.0, 500.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();

        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        info!(bodies = bodies.len(), colliders = colliders.len(), "ground inserted");

        let mut query_pipeline = QueryPipeline::new();
        query_pipeline.update(&colliders);

        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline,
            vehicles: HashMap::new(),
            tick: 0,
        }
    }

    /// Spawn a car of `config.variant` with its chassis origin at `position`.
    ///
    /// - dynamic box chassis, density from the configured mass
    /// - physics/raycast cars: massless ball collider of wheel radius per anchor
    /// - wheel-collider cars: engine ray-cast wheels instead
    pub fn spawn_vehicle(
        &mut self,
        id: &str,
        config: &VehicleConfig,
        mode: VehicleMode,
        position: [f32; 3],
    ) -> Result<RigidBodyHandle, SimError> {
        config.validate()?;

        let c = &config.chassis;
        let [hx, hy, hz] = c.half_extents;
        let volume = 8.0 * hx * hy * hz;
        let density = c.mass / volume; // ρ = m / V

        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], position[1], position[2]])
            .linear_damping(c.linear_drag)
            .angular_damping(c.angular_drag)
            .ccd_enabled(true)
            .build();

        let chassis_collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND))
            .active_events(ActiveEvents::empty())
            .density(density)
            .friction(0.0)
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(chassis_collider, handle, &mut self.bodies);

        let body = self.bodies.get(handle).ok_or_else(|| SimError::MissingBody(id.to_string()))?;
        let controller = VehicleController::new(config, mode, body)?;
        let pose = *body.position();

        let native = match config.variant {
            CarVariant::WheelCollider => Some(NativeWheels::new(handle, &pose, controller.wheels(), &config.native)),
            CarVariant::Physics | CarVariant::Raycast => {
                for wheel in controller.wheels() {
                    let ball = ColliderBuilder::ball(wheel.radius)
                        .translation(wheel.anchor.coords)
                        .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND))
                        .density(0.0)
                        .friction(c.wheel_friction)
                        .restitution(0.0)
                        .build();
                    self.colliders.insert_with_parent(ball, handle, &mut self.bodies);
                }
                None
            }
        };

        if let Some(old) = self.vehicles.insert(id.to_string(), Vehicle { body: handle, controller, native }) {
            warn!(vehicle = id, "replacing existing vehicle");
            self.bodies.remove(
                old.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                true,
            );
        }

        info!(
            vehicle = id,
            variant = config.variant.as_str(),
            ?mode,
            ?position,
            body = ?handle,
            "spawned vehicle"
        );

        Ok(handle)
    }

    pub fn vehicle(&self, id: &str) -> Result<&Vehicle, SimError> {
        self.vehicles.get(id).ok_or_else(|| SimError::UnknownVehicle(id.to_string()))
    }

    pub fn chassis(&self, id: &str) -> Result<&RigidBody, SimError> {
        let v = self.vehicle(id)?;
        self.bodies.get(v.body).ok_or_else(|| SimError::MissingBody(id.to_string()))
    }

    /// Replace a vehicle's whole input sample (read at the next tick).
    pub fn submit_input(&mut self, id: &str, sample: InputSample) -> Result<(), SimError> {
        let v = self.vehicles.get_mut(id).ok_or_else(|| SimError::UnknownVehicle(id.to_string()))?;
        v.controller.submit_input(sample);
        Ok(())
    }

    pub fn handle_event(&mut self, id: &str, event: InputEvent) -> Result<(), SimError> {
        let v = self.vehicles.get_mut(id).ok_or_else(|| SimError::UnknownVehicle(id.to_string()))?;
        v.controller.handle_event(event);
        Ok(())
    }

    /// Event for every vehicle (unaddressed input).
    pub fn broadcast_event(&mut self, event: InputEvent) {
        for v in self.vehicles.values_mut() {
            v.controller.handle_event(event);
        }
    }

    fn drive_vehicles(&mut self, dt: Real) {
        for v in self.vehicles.values_mut() {
            // 0) reset
            {
                let Some(body) = self.bodies.get_mut(v.body) else { continue };
                v.controller.recover(body);
            }

            // 1) probe (everything but ourselves); native cars sense after the engine update
            if v.native.is_none() {
                let Some(body) = self.bodies.get(v.body) else { continue };
                let query = SceneQuery {
                    pipeline: &self.query_pipeline,
                    bodies: &self.bodies,
                    colliders: &self.colliders,
                    filter: QueryFilter::default().exclude_rigid_body(v.body),
                };
                v.controller.sense(body, &query);
            }

            // 2) drive + suspension
            {
                let Some(body) = self.bodies.get_mut(v.body) else { continue };
                v.controller.actuate(body, dt);
            }

            // native wheels
            if let Some(native) = v.native.as_mut() {
                v.controller.push_commands(native);
                native.update(
                    dt,
                    &mut self.bodies,
                    &self.colliders,
                    &self.query_pipeline,
                    QueryFilter::default().exclude_rigid_body(v.body),
                );
                v.controller.pull_poses(native);
                v.controller.sense_native(native);
            }

            // 3) visuals
            if let Some(body) = self.bodies.get(v.body) {
                v.controller.sync_visuals(body, dt);
            }
        }
    }

    pub fn step(&mut self, dt: Real) {
        let hooks = ();
        let events = ();

        // probes see this tick's collider positions
        self.query_pipeline.update(&self.colliders);

        // 1) vehicle core
        self.drive_vehicles(dt);

        // 2) step physics
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &hooks,
            &events,
        );

        // 3) guard: keep bodies out of insane coordinates
        for (handle, body) in self.bodies.iter_mut() {
            let pos = *body.translation();

            let bad = !pos.iter().all(|c| c.is_finite()) || pos.iter().any(|c| c.abs() > WORLD_LIMIT);

            if bad {
                let safe = vector![0.0, 1.0, 0.0];
                body.set_translation(safe, true);
                body.set_linvel(Vector::zeros(), true);
                body.set_angvel(Vector::zeros(), true);

                warn!(body = ?handle, from = ?pos, "reset exploding body");
            }
        }

        self.tick += 1;
    }

    pub fn snapshot(&self) -> Vec<VehicleSnapshot> {
        let mut out: Vec<VehicleSnapshot> = self
            .vehicles
            .iter()
            .filter_map(|(id, v)| {
                let body = self.bodies.get(v.body)?;
                Some(build_vehicle_snapshot(id, body, &v.controller))
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PHYSICS_CAR, RAYCAST_CAR, WHEEL_COLLIDER_CAR};
    use crate::contact::WheelColliders;
    use crate::dynamics::WheelId;
    use approx::assert_abs_diff_eq;

    const DT: Real = 0.02;

    fn gas() -> InputEvent {
        InputEvent::Gas { value: 1.0 }
    }

    #[test]
    fn ground_top_face_is_at_zero() {
        let world = PhysicsWorld::new();
        let query = SceneQuery {
            pipeline: &world.query_pipeline,
            bodies: &world.bodies,
            colliders: &world.colliders,
            filter: QueryFilter::default(),
        };
        let toi = query.cast(point![3.0, 2.0, -4.0], -Vector::y(), 5.0).expect("ground below");
        assert_abs_diff_eq!(toi, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn parked_car_is_grounded_before_any_step() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("player", &PHYSICS_CAR, VehicleMode::Drivable, [0.0, 0.64, 0.0]).expect("spawn");

        world.step(DT);

        assert_eq!(world.vehicle("player").expect("spawned").controller.grounded(), 4);
    }

    #[test]
    fn grounded_car_accelerates_forward() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("player", &PHYSICS_CAR, VehicleMode::Drivable, [0.0, 0.64, 0.0]).expect("spawn");
        world.handle_event("player", gas()).expect("known id");

        world.step(DT);

        let vz = world.chassis("player").expect("body").linvel().z;
        assert!(vz > 0.2, "vz = {vz}");
    }

    #[test]
    fn airborne_car_ignores_gas() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("player", &PHYSICS_CAR, VehicleMode::Drivable, [0.0, 20.0, 0.0]).expect("spawn");
        world.handle_event("player", gas()).expect("known id");

        world.step(DT);

        let v = world.vehicle("player").expect("spawned");
        assert_eq!(v.controller.grounded(), 0);
        assert_abs_diff_eq!(world.chassis("player").expect("body").linvel().z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn menu_car_ignores_gas() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("physics", &PHYSICS_CAR, VehicleMode::Menu, [0.0, 0.64, 0.0]).expect("spawn");
        world.handle_event("physics", gas()).expect("known id");

        world.step(DT);

        assert_abs_diff_eq!(world.chassis("physics").expect("body").linvel().z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn raycast_car_springs_push_up() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("player", &RAYCAST_CAR, VehicleMode::Drivable, [0.0, 0.6, 0.0]).expect("spawn");

        world.step(DT);

        let v = world.vehicle("player").expect("spawned");
        assert!(v.controller.wheels().iter().all(|w| w.spring_force.y > 0.0));
    }

    #[test]
    fn wheel_collider_car_stays_finite() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("player", &WHEEL_COLLIDER_CAR, VehicleMode::Drivable, [0.0, 1.0, 0.0]).expect("spawn");
        world.handle_event("player", gas()).expect("known id");
        world.handle_event("player", InputEvent::Steer { x: 0.5, y: 0.0 }).expect("known id");

        for _ in 0..120 {
            world.step(DT);
        }

        let body = world.chassis("player").expect("body");
        assert!(body.translation().iter().all(|c| c.is_finite()));
        let v = world.vehicle("player").expect("spawned");
        assert!(v.controller.wheels().iter().all(|w| w.visual_pose.is_some()));
        let native = v.native.as_ref().expect("engine wheels");
        assert!(WheelId::ALL.iter().any(|id| native.in_contact(*id)));
    }

    #[test]
    fn resting_wheel_collider_car_counts_all_wheels_grounded() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("player", &WHEEL_COLLIDER_CAR, VehicleMode::Drivable, [0.0, 1.0, 0.0]).expect("spawn");

        for _ in 0..150 {
            world.step(DT);
        }

        let v = world.vehicle("player").expect("spawned");
        assert_eq!(v.controller.grounded(), 4);
        assert!(v.controller.wheels().iter().all(|w| w.trail_emitting));
        let native = v.native.as_ref().expect("engine wheels");
        assert!(WheelId::ALL.iter().all(|id| native.in_contact(*id)));
    }

    #[test]
    fn unknown_vehicle_is_an_error() {
        let mut world = PhysicsWorld::new();
        assert!(matches!(
            world.handle_event("ghost", InputEvent::Reset),
            Err(SimError::UnknownVehicle(_))
        ));
    }

    #[test]
    fn exploding_body_is_snapped_back() {
        let mut world = PhysicsWorld::new();
        let handle = world.spawn_vehicle("player", &PHYSICS_CAR, VehicleMode::Drivable, [0.0, 0.6, 0.0]).expect("spawn");
        if let Some(body) = world.bodies.get_mut(handle) {
            body.set_translation(vector![5_000.0, 1.0, 0.0], true);
        }

        world.step(DT);

        let pos = *world.chassis("player").expect("body").translation();
        assert_abs_diff_eq!(pos, vector![0.0, 1.0, 0.0]);
    }

    #[test]
    fn snapshot_lists_vehicles_by_id() {
        let mut world = PhysicsWorld::new();
        world.spawn_vehicle("b", &PHYSICS_CAR, VehicleMode::Menu, [0.0, 0.6, 0.0]).expect("spawn");
        world.spawn_vehicle("a", &RAYCAST_CAR, VehicleMode::Menu, [8.0, 0.6, 0.0]).expect("spawn");
        let ids: Vec<String> = world.snapshot().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
