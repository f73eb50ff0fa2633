//! Core shared types for `dynamics` (wheel ids, probe results, engine seams).
// dynamics/types.rs
use std::fmt;

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Isometry, Point, Real, Vector};
use serde::{Deserialize, Serialize};

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum WheelId { FL, FR, RL, RR }

impl WheelId {
    /// Fixed wheel order used for every per-wheel array in the crate.
    pub const ALL: [WheelId; 4] = [WheelId::FL, WheelId::FR, WheelId::RL, WheelId::RR];

    pub fn index(&self) -> usize {
        match self {
            WheelId::FL => 0,
            WheelId::FR => 1,
            WheelId::RL => 2,
            WheelId::RR => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::RL => "RL",
            WheelId::RR => "RR",
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelId::FL | WheelId::FR)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Probe result
// ============================================

/// Outcome of one downward ground probe.
///
/// `distance` is the hit distance along the ray when grounded; when airborne it
/// holds the full cast length and carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub grounded: bool,
    pub distance: Real,
}

impl ProbeResult {
    pub fn hit(distance: Real) -> Self {
        Self { grounded: true, distance }
    }

    pub fn airborne(cast_length: Real) -> Self {
        Self { grounded: false, distance: cast_length }
    }
}

// ============================================
// Engine seams
// ============================================

/// The chassis rigid body as seen by the vehicle core.
///
/// Forces only last for the tick they are applied in.
pub trait ChassisBody {
    fn pose(&self) -> Isometry<Real>;
    fn set_orientation(&mut self, rotation: UnitQuaternion<Real>);

    fn linear_velocity(&self) -> Vector<Real>;
    /// Linear velocity of a world point rigidly attached to the body (v + ω × r).
    fn point_velocity(&self, point: &Point<Real>) -> Vector<Real>;

    fn drag(&self) -> Real;
    fn set_drag(&mut self, drag: Real);

    /// Mass-independent change of linear velocity (world space).
    fn add_velocity_change(&mut self, delta_v: Vector<Real>);
    /// Force at a world point, integrated over `dt`.
    fn add_force_at_point(&mut self, force: Vector<Real>, point: Point<Real>, dt: Real);

    fn up(&self) -> Vector<Real> {
        self.pose().rotation * Vector::y()
    }

    fn forward(&self) -> Vector<Real> {
        self.pose().rotation * Vector::z()
    }
}

/// Raycast against everything except the vehicle itself.
pub trait GroundQuery {
    /// Distance to the first hit within `max_len`, if any.
    fn cast(&self, origin: Point<Real>, dir: Vector<Real>, max_len: Real) -> Option<Real>;
}
