// ==============================================================================
// config.rs — VEHICLE TUNING + PRESETS
// ------------------------------------------------------------------------------
// Everything a vehicle needs before its first tick. Loaded from JSON or taken
// from one of the built-in presets, then validated once at spawn time.
// ==============================================================================

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};

use crate::dynamics::WheelId;
use crate::dynamics::suspension::SuspensionMode;
use crate::error::SimError;

/// Which of the three car builds to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CarVariant {
    /// Wheels touch the ground through ball colliders; grounding reach = radius.
    Physics,
    /// Raycast springs hold the chassis up.
    Raycast,
    /// Engine-side wheel colliders.
    WheelCollider,
}

impl CarVariant {
    pub const ALL: [CarVariant; 3] = [CarVariant::Physics, CarVariant::Raycast, CarVariant::WheelCollider];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarVariant::Physics => "physics",
            CarVariant::Raycast => "raycast",
            CarVariant::WheelCollider => "wheel-collider",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChassisConfig {
    pub mass: Real,                // kg
    pub linear_drag: Real,         // baseline drag, brake inflates it
    pub angular_drag: Real,        // rotational drag
    pub half_extents: [Real; 3],   // [hx, hy, hz] meters
    pub wheel_friction: Real,      // friction of the wheel ball colliders
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriveTuning {
    pub move_speed: Real,     // m/s of velocity change per second of full gas
    pub turn_speed: Real,     // deg/s of yaw at full steer
    pub brake_strength: Real, // drag added per second of full brake
    pub steer_lock_deg: Real, // visual front-wheel angle at full steer
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            move_speed: 35.0,
            turn_speed: 90.0,
            brake_strength: 5.0,
            steer_lock_deg: 45.0,
        }
    }
}

/// Engine wheel-collider tuning (wheel-collider variant only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NativeTuning {
    pub motor: Real,             // engine force per wheel at full gas
    pub steer_deg: Real,         // front wheel angle at full steer
    pub brake: Real,             // brake per wheel at full brake
    pub rest_length: Real,       // suspension rest length (m)
    pub stiffness: Real,         // suspension stiffness
    pub max_travel: Real,        // suspension travel (m)
    pub friction_slip: Real,
}

impl Default for NativeTuning {
    fn default() -> Self {
        Self {
            motor: 1500.0,
            steer_deg: 50.0,
            brake: 40.0,
            rest_length: 0.3,
            stiffness: 24.0,
            max_travel: 0.3,
            friction_slip: 10.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WheelConfig {
    pub id: WheelId,
    pub anchor: [Real; 3],            // chassis-local attachment point
    pub mesh_half_extents: [Real; 3], // wheel mesh bounds; radius = y
    #[serde(default)]
    pub probe_point: Option<[Real; 3]>, // chassis-local end of the suspension ray
    #[serde(default = "default_spring_strength")]
    pub spring_strength: Real,        // strong enough to hold the car (~280k for 1000 kg)
    #[serde(default = "default_damping_factor")]
    pub damping_factor: Real,         // 0.0 boat .. 0.3 car
}

fn default_spring_strength() -> Real { 280_000.0 }
fn default_damping_factor() -> Real { 0.1 }

impl WheelConfig {
    pub fn radius(&self) -> Real {
        self.mesh_half_extents[1]
    }

    /// Anchor-to-probe-point distance, if a probe point is set.
    pub fn probe_reach(&self) -> Option<Real> {
        self.probe_point.map(|p| self.anchor[1] - p[1])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub variant: CarVariant,
    pub chassis: ChassisConfig,
    #[serde(default)]
    pub drive: DriveTuning,
    #[serde(default)]
    pub native: NativeTuning,
    #[serde(default)]
    pub suspension: SuspensionMode,
    pub wheels: [WheelConfig; 4],
}

const CHASSIS_1000KG: ChassisConfig = ChassisConfig {
    mass: 1000.0,
    linear_drag: 1.0,
    angular_drag: 5.0,
    half_extents: [0.9, 0.3, 2.0],
    wheel_friction: 0.6,
};

const DRIVE: DriveTuning = DriveTuning {
    move_speed: 35.0,
    turn_speed: 90.0,
    brake_strength: 5.0,
    steer_lock_deg: 45.0,
};

const NATIVE: NativeTuning = NativeTuning {
    motor: 1500.0,
    steer_deg: 50.0,
    brake: 40.0,
    rest_length: 0.3,
    stiffness: 24.0,
    max_travel: 0.3,
    friction_slip: 10.5,
};

const WHEEL_MESH: [Real; 3] = [0.15, 0.35, 0.35];

const fn wheel(id: WheelId, x: Real, y: Real, z: Real, probe_y: Option<Real>) -> WheelConfig {
    WheelConfig {
        id,
        anchor: [x, y, z],
        mesh_half_extents: WHEEL_MESH,
        probe_point: match probe_y {
            Some(py) => Some([x, py, z]),
            None => None,
        },
        spring_strength: 280_000.0,
        damping_factor: 0.1,
    }
}

pub const PHYSICS_CAR: VehicleConfig = VehicleConfig {
    variant: CarVariant::Physics,
    chassis: CHASSIS_1000KG,
    drive: DRIVE,
    native: NATIVE,
    suspension: SuspensionMode::SpringOnly,
    wheels: [
        wheel(WheelId::FL, -0.8, -0.3,  1.3, None),
        wheel(WheelId::FR,  0.8, -0.3,  1.3, None),
        wheel(WheelId::RL, -0.8, -0.3, -1.3, None),
        wheel(WheelId::RR,  0.8, -0.3, -1.3, None),
    ],
};

pub const RAYCAST_CAR: VehicleConfig = VehicleConfig {
    variant: CarVariant::Raycast,
    chassis: CHASSIS_1000KG,
    drive: DRIVE,
    native: NATIVE,
    suspension: SuspensionMode::SpringOnly,
    wheels: [
        wheel(WheelId::FL, -0.8, -0.3,  1.3, Some(-0.9)),
        wheel(WheelId::FR,  0.8, -0.3,  1.3, Some(-0.9)),
        wheel(WheelId::RL, -0.8, -0.3, -1.3, Some(-0.9)),
        wheel(WheelId::RR,  0.8, -0.3, -1.3, Some(-0.9)),
    ],
};

pub const WHEEL_COLLIDER_CAR: VehicleConfig = VehicleConfig {
    variant: CarVariant::WheelCollider,
    chassis: CHASSIS_1000KG,
    drive: DRIVE,
    native: NATIVE,
    suspension: SuspensionMode::SpringOnly,
    wheels: [
        wheel(WheelId::FL, -0.8, -0.3,  1.3, None),
        wheel(WheelId::FR,  0.8, -0.3,  1.3, None),
        wheel(WheelId::RL, -0.8, -0.3, -1.3, None),
        wheel(WheelId::RR,  0.8, -0.3, -1.3, None),
    ],
};

fn check_finite(field: &'static str, value: Real) -> Result<(), SimError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidTuning { field, value })
    }
}

impl VehicleConfig {
    pub fn preset(variant: CarVariant) -> Self {
        match variant {
            CarVariant::Physics => PHYSICS_CAR,
            CarVariant::Raycast => RAYCAST_CAR,
            CarVariant::WheelCollider => WHEEL_COLLIDER_CAR,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, SimError> {
        let config: VehicleConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Wheel config for `id`. Only valid after `validate()`.
    pub fn wheel(&self, id: WheelId) -> Option<&WheelConfig> {
        self.wheels.iter().find(|w| w.id == id)
    }

    /// Reach of the grounding ray for one wheel under this variant.
    /// Wheel-collider cars never cast it; it only fills their airborne result.
    pub fn reach(&self, wheel: &WheelConfig) -> Option<Real> {
        match self.variant {
            CarVariant::Raycast => wheel.probe_reach(),
            CarVariant::Physics | CarVariant::WheelCollider => Some(wheel.radius()),
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let mut seen = HashSet::new();
        for w in &self.wheels {
            if !seen.insert(w.id) {
                return Err(SimError::DuplicateWheel(w.id));
            }
        }
        if let Some(missing) = WheelId::ALL.iter().find(|id| !seen.contains(id)) {
            return Err(SimError::MissingWheel(*missing));
        }

        let c = &self.chassis;
        if !(c.mass.is_finite() && c.mass > 0.0) {
            return Err(SimError::InvalidTuning { field: "chassis.mass", value: c.mass });
        }
        check_finite("chassis.linear_drag", c.linear_drag)?;
        check_finite("chassis.angular_drag", c.angular_drag)?;
        check_finite("drive.move_speed", self.drive.move_speed)?;
        check_finite("drive.turn_speed", self.drive.turn_speed)?;
        check_finite("drive.brake_strength", self.drive.brake_strength)?;
        check_finite("drive.steer_lock_deg", self.drive.steer_lock_deg)?;

        for w in &self.wheels {
            let radius = w.radius();
            if !(radius.is_finite() && radius > 0.0) {
                return Err(SimError::InvalidRadius { wheel: w.id, radius });
            }
            match self.reach(w) {
                Some(d) if d.is_finite() && d > 0.0 => {}
                Some(d) => return Err(SimError::InvalidReach { wheel: w.id, max_distance: d }),
                None => return Err(SimError::MissingProbePoint(w.id)),
            }
            check_finite("wheel.spring_strength", w.spring_strength)?;
            check_finite("wheel.damping_factor", w.damping_factor)?;
        }

        Ok(())
    }
}
