// ==============================================================================
// controller.rs — PER-TICK VEHICLE PIPELINE
// ------------------------------------------------------------------------------
// Fixed order every physics tick:
//
//   0) recover      pending reset → roll/pitch zeroed, yaw kept (any mode)
//   1) sense        ground probe ×4, trails, grounded count
//                   (native: sense_native() from engine wheel contact instead)
//   2) actuate      Drivable only: turn, then move (or native wheel commands)
//                   raycast suspension: spring force ×4 at the anchors
//   3) sync_visuals wheel roll from chassis speed (native: engine poses)
//
// Native wheel colliders need the engine in between 2) and 3):
// push_commands() → engine vehicle update → pull_poses() → sense_native().
// `tick()` runs the
// whole thing for engines without native wheels (and for tests).
//
// Nothing carries over between ticks except what the rigid body itself keeps
// (pose, velocity, drag) and the wheel visuals.
// ==============================================================================

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Real, Vector};
use tracing::debug;

use crate::config::{CarVariant, DriveTuning, NativeTuning, VehicleConfig};
use crate::contact::{ContactModel, WheelColliders};
use crate::dynamics::drive::{self, DriveOutput};
use crate::dynamics::probe::{grounded_count, probe};
use crate::dynamics::spin;
use crate::dynamics::suspension::{compute_suspension_force, SuspensionMode};
use crate::dynamics::upright::upright;
use crate::dynamics::{ChassisBody, GroundQuery, ProbeResult};
use crate::error::SimError;
use crate::state::{InputEvent, InputSample, InputState};
use crate::vehicle::{VehicleMode, Wheel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub reset: bool,
    pub grounded: usize,
    pub drive: Option<DriveOutput>,
}

#[derive(Debug, Clone)]
pub struct VehicleController {
    variant: CarVariant,
    mode: VehicleMode,
    contact: ContactModel,
    drive: DriveTuning,
    native: NativeTuning,
    wheels: [Wheel; 4],
    input: InputState,
    grounded: usize,
    baseline_drag: Real, // captured once from the chassis
}

impl VehicleController {
    pub fn new<C: ChassisBody + ?Sized>(
        config: &VehicleConfig,
        mode: VehicleMode,
        chassis: &C,
    ) -> Result<Self, SimError> {
        let wheels = Wheel::set_from_config(config)?;

        Ok(Self {
            variant: config.variant,
            mode,
            contact: ContactModel::for_variant(config.variant, config.suspension),
            drive: config.drive,
            native: config.native,
            wheels,
            input: InputState::default(),
            grounded: 0,
            baseline_drag: chassis.drag(),
        })
    }

    pub fn variant(&self) -> CarVariant { self.variant }
    pub fn mode(&self) -> VehicleMode { self.mode }
    pub fn wheels(&self) -> &[Wheel; 4] { &self.wheels }
    pub fn grounded(&self) -> usize { self.grounded }
    pub fn input(&self) -> InputSample { self.input.sample() }
    pub fn baseline_drag(&self) -> Real { self.baseline_drag }

    pub fn submit_input(&mut self, sample: InputSample) {
        self.input.submit(sample);
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        self.input.apply(event);
    }

    // ----------------------------------------------------------------------
    // 0) flip recovery
    // ----------------------------------------------------------------------
    pub fn recover<C: ChassisBody + ?Sized>(&mut self, chassis: &mut C) -> bool {
        if !self.input.take_reset() {
            return false;
        }
        let rotation = upright(&chassis.pose().rotation);
        chassis.set_orientation(rotation);
        true
    }

    // ----------------------------------------------------------------------
    // 1) ground probe
    // ----------------------------------------------------------------------
    pub fn sense<C, G>(&mut self, chassis: &C, ground: &G) -> usize
    where
        C: ChassisBody + ?Sized,
        G: GroundQuery + ?Sized,
    {
        // engine wheels report their own contact
        if self.contact.is_native() {
            return self.grounded;
        }

        let pose = chassis.pose();
        let up = chassis.up();

        let mut results = [ProbeResult::airborne(0.0); 4];
        for (wheel, result) in self.wheels.iter_mut().zip(results.iter_mut()) {
            let origin = wheel.anchor_world(&pose);
            *result = probe(ground, origin, up, wheel.max_distance);
            wheel.probe = *result;
            wheel.trail_emitting = result.grounded;
        }

        self.set_grounded(grounded_count(&results))
    }

    /// Grounding for native wheel colliders, read after the engine update.
    pub fn sense_native<W: WheelColliders + ?Sized>(&mut self, colliders: &W) -> usize {
        let mut results = [ProbeResult::airborne(0.0); 4];
        for (wheel, result) in self.wheels.iter_mut().zip(results.iter_mut()) {
            *result = match colliders.contact_distance(wheel.id) {
                Some(distance) => ProbeResult::hit(distance),
                None => ProbeResult::airborne(wheel.max_distance),
            };
            wheel.probe = *result;
            wheel.trail_emitting = result.grounded;
        }

        self.set_grounded(grounded_count(&results))
    }

    fn set_grounded(&mut self, count: usize) -> usize {
        if count != self.grounded {
            debug!(variant = self.variant.as_str(), grounded = count, "grounded wheel count changed");
        }
        self.grounded = count;
        count
    }

    // ----------------------------------------------------------------------
    // 2) drive + suspension
    // ----------------------------------------------------------------------
    pub fn actuate<C: ChassisBody + ?Sized>(&mut self, chassis: &mut C, dt: Real) -> Option<DriveOutput> {
        let sample = self.input.sample();
        let mut output = None;

        if self.mode == VehicleMode::Drivable {
            match self.contact {
                ContactModel::Raycast { .. } => {
                    let steer = drive::turn(chassis, &self.drive, sample.steer.x, self.grounded, dt);
                    for wheel in self.wheels.iter_mut().filter(|w| w.id.is_front()) {
                        wheel.anchor_rotation = steer;
                    }
                    output = drive::drive(
                        chassis,
                        &self.drive,
                        sample.gas,
                        sample.brake,
                        self.grounded,
                        self.baseline_drag,
                        dt,
                    );
                }
                ContactModel::NativeCollider => {
                    let commands = drive::native_commands(&self.native, sample.steer.x, sample.gas, sample.brake);
                    for (wheel, command) in self.wheels.iter_mut().zip(commands) {
                        wheel.command = command;
                        wheel.anchor_rotation =
                            UnitQuaternion::from_axis_angle(&Vector::y_axis(), command.steer_deg.to_radians());
                    }
                }
            }
        }

        match self.contact.suspension() {
            Some(mode) => self.suspend(chassis, mode, dt),
            None => {
                for wheel in self.wheels.iter_mut() {
                    wheel.spring_force = Vector::zeros();
                    wheel.damping = 0.0;
                }
            }
        }

        output
    }

    fn suspend<C: ChassisBody + ?Sized>(&mut self, chassis: &mut C, mode: SuspensionMode, dt: Real) {
        let pose = chassis.pose();
        let up = chassis.up();

        for wheel in self.wheels.iter_mut() {
            let anchor = wheel.anchor_world(&pose);
            let point_vel = chassis.point_velocity(&anchor);
            let out = compute_suspension_force(&wheel.spring_params(), &wheel.probe, point_vel, up, dt, mode);

            wheel.spring_force = out.spring_force;
            wheel.damping = out.damping;

            if wheel.probe.grounded {
                chassis.add_force_at_point(out.net_force, anchor, dt);
            }
        }
    }

    // ----------------------------------------------------------------------
    // native wheel colliders
    // ----------------------------------------------------------------------
    pub fn push_commands<W: WheelColliders + ?Sized>(&self, colliders: &mut W) {
        for wheel in &self.wheels {
            colliders.apply(wheel.id, &wheel.command);
        }
    }

    pub fn pull_poses<W: WheelColliders + ?Sized>(&mut self, colliders: &W) {
        for wheel in self.wheels.iter_mut() {
            wheel.visual_pose = Some(colliders.world_pose(wheel.id));
        }
    }

    // ----------------------------------------------------------------------
    // 3) wheel visuals
    // ----------------------------------------------------------------------
    pub fn sync_visuals<C: ChassisBody + ?Sized>(&mut self, chassis: &C, dt: Real) {
        if self.contact.is_native() {
            return; // poses come from the engine wheels
        }

        let linvel = chassis.linear_velocity();
        let forward = chassis.forward();

        for wheel in self.wheels.iter_mut() {
            let angle = spin::roll_angle(&linvel, &forward, wheel.radius, dt);
            wheel.spin = spin::spin(&wheel.spin, angle);
            wheel.roll_deg = (wheel.roll_deg + angle).rem_euclid(360.0);
        }
    }

    /// Whole pipeline against an engine without native wheels.
    pub fn tick<C, G>(&mut self, chassis: &mut C, ground: &G, dt: Real) -> TickReport
    where
        C: ChassisBody + ?Sized,
        G: GroundQuery + ?Sized,
    {
        let reset = self.recover(chassis);
        let grounded = self.sense(&*chassis, ground);
        let drive = self.actuate(chassis, dt);
        self.sync_visuals(&*chassis, dt);

        TickReport { reset, grounded, drive }
    }
}
