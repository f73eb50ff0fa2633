// ==============================================================================
// suspension.rs — RAYCAST SPRING (+ OPTIONAL DAMPER) PER WHEEL
// ------------------------------------------------------------------------------
// For a grounded wheel:
//
//     extension = (max_distance - distance * radius) / max_distance
//     spring    = up * k * dt * extension
//     damping   = c * dot(point_vel, up)
//
// Extension is not clamped: a radius above 1 drives it below 0 near full reach.
//
// `point_vel` is the chassis velocity at the wheel anchor, so each corner sees
// its own rocking motion on a rotating body.
//
// The model is memoryless: every tick recomputes from the current probe and
// velocity. The damping scalar is always reported; it only enters the net force
// in `SuspensionMode::SpringDamper`.
//
// This file does NOT apply forces. The controller applies `net_force` at the
// anchor for the current tick only.
// ==============================================================================

use rapier3d::prelude::{Real, Vector};
use serde::{Deserialize, Serialize};

use crate::dynamics::types::ProbeResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuspensionMode {
    /// Only the spring term pushes the chassis.
    #[default]
    SpringOnly,
    /// Spring minus damping along the suspension axis.
    SpringDamper,
}

/// Static spring geometry of one wheel.
#[derive(Debug, Clone, Copy)]
pub struct SpringParams {
    pub spring_strength: Real, // k
    pub damping_factor: Real,  // c
    pub max_distance: Real,    // probe reach (m)
    pub radius: Real,          // wheel radius (m)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionOutput {
    pub extension: Real,
    pub spring_force: Vector<Real>,
    pub damping: Real,
    pub net_force: Vector<Real>,
}

impl SuspensionOutput {
    pub fn zero() -> Self {
        Self {
            extension: 0.0,
            spring_force: Vector::zeros(),
            damping: 0.0,
            net_force: Vector::zeros(),
        }
    }
}

/// Normalized suspension travel for a hit at `distance`.
#[inline]
pub fn extension(params: &SpringParams, distance: Real) -> Real {
    (params.max_distance - distance * params.radius) / params.max_distance
}

pub fn compute_suspension_force(
    params: &SpringParams,
    probe: &ProbeResult,
    point_vel: Vector<Real>,
    chassis_up: Vector<Real>,
    dt: Real,
    mode: SuspensionMode,
) -> SuspensionOutput {
    if !probe.grounded {
        return SuspensionOutput::zero();
    }

    let extension = extension(params, probe.distance);
    let spring_force = chassis_up * (params.spring_strength * dt * extension); // F_s = up * k * dt * x
    let damping = params.damping_factor * point_vel.dot(&chassis_up);          // c * v_n

    let net_force = match mode {
        SuspensionMode::SpringOnly => spring_force,
        SuspensionMode::SpringDamper => spring_force - chassis_up * damping,
    };

    SuspensionOutput {
        extension,
        spring_force,
        damping,
        net_force,
    }
}
