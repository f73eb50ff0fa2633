//! Engine-free stand-ins for the chassis and the ground, used by unit tests.

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::{Isometry, Point, Real, Vector};

use crate::dynamics::types::{ChassisBody, GroundQuery};

/// Infinite horizontal plane at `height`.
pub struct FlatGround {
    pub height: Real,
}

impl FlatGround {
    pub fn at(height: Real) -> Self {
        Self { height }
    }
}

impl GroundQuery for FlatGround {
    fn cast(&self, origin: Point<Real>, dir: Vector<Real>, max_len: Real) -> Option<Real> {
        if dir.y >= 0.0 {
            return None;
        }
        let toi = (origin.y - self.height) / -dir.y;
        (toi >= 0.0 && toi <= max_len).then_some(toi)
    }
}

/// Ground that never answers (deep space).
pub struct NoGround;

impl GroundQuery for NoGround {
    fn cast(&self, _origin: Point<Real>, _dir: Vector<Real>, _max_len: Real) -> Option<Real> {
        None
    }
}

/// Rigid body that records what the core asked of it.
#[derive(Debug, Clone)]
pub struct MockChassis {
    pub pose: Isometry<Real>,
    pub linvel: Vector<Real>,
    pub angvel: Vector<Real>,
    pub drag: Real,
    pub velocity_changes: Vec<Vector<Real>>,
    pub forces: Vec<(Vector<Real>, Point<Real>)>,
}

impl MockChassis {
    pub fn at_height(y: Real) -> Self {
        Self {
            pose: Isometry::translation(0.0, y, 0.0),
            linvel: Vector::zeros(),
            angvel: Vector::zeros(),
            drag: 1.0,
            velocity_changes: Vec::new(),
            forces: Vec::new(),
        }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<Real>) -> Self {
        self.pose = Isometry::from_parts(self.pose.translation, rotation);
        self
    }

    pub fn moving(mut self, linvel: Vector<Real>) -> Self {
        self.linvel = linvel;
        self
    }

    pub fn total_velocity_change(&self) -> Vector<Real> {
        self.velocity_changes.iter().sum()
    }
}

impl ChassisBody for MockChassis {
    fn pose(&self) -> Isometry<Real> {
        self.pose
    }

    fn set_orientation(&mut self, rotation: UnitQuaternion<Real>) {
        self.pose = Isometry::from_parts(self.pose.translation, rotation);
    }

    fn linear_velocity(&self) -> Vector<Real> {
        self.linvel
    }

    fn point_velocity(&self, point: &Point<Real>) -> Vector<Real> {
        let r = point.coords - self.pose.translation.vector;
        self.linvel + self.angvel.cross(&r)
    }

    fn drag(&self) -> Real {
        self.drag
    }

    fn set_drag(&mut self, drag: Real) {
        self.drag = drag;
    }

    fn add_velocity_change(&mut self, delta_v: Vector<Real>) {
        self.velocity_changes.push(delta_v);
    }

    fn add_force_at_point(&mut self, force: Vector<Real>, point: Point<Real>, _dt: Real) {
        self.forces.push((force, point));
    }
}
