use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::{Isometry, Point, Real, Vector};
use serde::{Deserialize, Serialize};

use crate::config::{VehicleConfig, WheelConfig};
use crate::dynamics::drive::WheelCommand;
use crate::dynamics::suspension::SpringParams;
use crate::dynamics::{ProbeResult, WheelId};
use crate::error::SimError;

/// Fixed at construction from the hosting scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleMode {
    /// On display for selection: no turning, no propulsion.
    Menu,
    Drivable,
}

#[derive(Debug, Clone)]
pub struct Wheel {
    pub id: WheelId,

    // --- geometry (fixed after init) ---
    pub anchor: Point<Real>,                   // chassis-local attach point, raycast origin
    pub anchor_rotation: UnitQuaternion<Real>, // steer pivot, local to chassis
    pub radius: Real,                          // from mesh bounds
    pub max_distance: Real,                    // probe reach (m)
    pub spring_strength: Real,
    pub damping_factor: Real,

    // --- per tick (fully recomputed) ---
    pub probe: ProbeResult,
    pub spring_force: Vector<Real>,
    pub damping: Real,
    pub trail_emitting: bool,

    // --- visuals ---
    pub spin: UnitQuaternion<Real>,          // roll about the axle, local to anchor
    pub roll_deg: Real,                      // accumulated roll, [0, 360)
    pub visual_pose: Option<Isometry<Real>>, // world pose reported by engine wheels
    pub command: WheelCommand,               // engine wheel order (wheel-collider only)
}

impl Wheel {
    pub fn from_config(cfg: &WheelConfig, max_distance: Real) -> Result<Self, SimError> {
        let radius = cfg.radius();
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidRadius { wheel: cfg.id, radius });
        }
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(SimError::InvalidReach { wheel: cfg.id, max_distance });
        }

        Ok(Self {
            id: cfg.id,
            anchor: Point::from(cfg.anchor),
            anchor_rotation: UnitQuaternion::identity(),
            radius,
            max_distance,
            spring_strength: cfg.spring_strength,
            damping_factor: cfg.damping_factor,
            probe: ProbeResult::airborne(max_distance),
            spring_force: Vector::zeros(),
            damping: 0.0,
            trail_emitting: false,
            spin: UnitQuaternion::identity(),
            roll_deg: 0.0,
            visual_pose: None,
            command: WheelCommand::default(),
        })
    }

    /// All four wheels in `WheelId::ALL` order.
    pub fn set_from_config(config: &VehicleConfig) -> Result<[Wheel; 4], SimError> {
        config.validate()?;

        let build = |id: WheelId| -> Result<Wheel, SimError> {
            let cfg = config.wheel(id).ok_or(SimError::MissingWheel(id))?;
            let reach = config.reach(cfg).ok_or(SimError::MissingProbePoint(id))?;
            Wheel::from_config(cfg, reach)
        };

        Ok([
            build(WheelId::FL)?,
            build(WheelId::FR)?,
            build(WheelId::RL)?,
            build(WheelId::RR)?,
        ])
    }

    pub fn anchor_world(&self, chassis: &Isometry<Real>) -> Point<Real> {
        chassis * self.anchor
    }

    pub fn spring_params(&self) -> SpringParams {
        SpringParams {
            spring_strength: self.spring_strength,
            damping_factor: self.damping_factor,
            max_distance: self.max_distance,
            radius: self.radius,
        }
    }

    /// Signed visual steer angle of the anchor (degrees about chassis up).
    pub fn steer_deg(&self) -> Real {
        let f = self.anchor_rotation * Vector::z();
        f.x.atan2(f.z).to_degrees()
    }

    /// World pose of the wheel visual.
    pub fn world_pose(&self, chassis: &Isometry<Real>) -> Isometry<Real> {
        match self.visual_pose {
            Some(pose) => pose,
            None => {
                let anchor = Isometry::from_parts(Translation3::from(self.anchor.coords), self.anchor_rotation);
                chassis * anchor * Isometry::from_parts(Translation3::identity(), self.spin)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PHYSICS_CAR, RAYCAST_CAR};
    use approx::assert_abs_diff_eq;

    #[test]
    fn wheels_come_out_in_fixed_order() {
        let mut cfg = PHYSICS_CAR;
        cfg.wheels.reverse();
        let wheels = Wheel::set_from_config(&cfg).expect("valid");
        for (w, id) in wheels.iter().zip(WheelId::ALL) {
            assert_eq!(w.id, id);
        }
    }

    #[test]
    fn raycast_geometry_is_derived_once() {
        let wheels = Wheel::set_from_config(&RAYCAST_CAR).expect("valid");
        assert_abs_diff_eq!(wheels[0].radius, 0.35);
        assert_abs_diff_eq!(wheels[0].max_distance, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn zero_reach_fails_fast() {
        let cfg = PHYSICS_CAR.wheels[0];
        assert!(matches!(Wheel::from_config(&cfg, 0.0), Err(SimError::InvalidReach { .. })));
    }

    #[test]
    fn anchor_follows_chassis_pose() {
        let wheels = Wheel::set_from_config(&PHYSICS_CAR).expect("valid");
        let chassis = Isometry::translation(0.0, 1.0, 5.0);
        let p = wheels[0].anchor_world(&chassis);
        assert_abs_diff_eq!(p.y, 0.7, epsilon = 1e-6);
        assert_abs_diff_eq!(p.z, 6.3, epsilon = 1e-6);
    }
}
