// ==============================================================================
// contact.rs — GROUND CONTACT MODELS
// ------------------------------------------------------------------------------
// One car, two ways of knowing where the ground is:
//
// - Raycast:        probe from each anchor; the reach is either the wheel radius
//                   (wheels sit on ball colliders) or the anchor→probe-point
//                   distance, in which case a spring holds the chassis up.
// - NativeCollider: the engine owns wheel colliders (suspension, traction); the
//                   core only sends steer/motor/brake and mirrors their poses.
//
// Trails + grounded count come from the probe (raycast) or from the engine
// wheels' own ground contact (native).
// ==============================================================================

use rapier3d::prelude::{Isometry, Real};

use crate::config::CarVariant;
use crate::dynamics::WheelId;
use crate::dynamics::drive::WheelCommand;
use crate::dynamics::suspension::SuspensionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactModel {
    Raycast { suspension: Option<SuspensionMode> },
    NativeCollider,
}

impl ContactModel {
    pub fn for_variant(variant: CarVariant, suspension: SuspensionMode) -> Self {
        match variant {
            CarVariant::Physics => ContactModel::Raycast { suspension: None },
            CarVariant::Raycast => ContactModel::Raycast { suspension: Some(suspension) },
            CarVariant::WheelCollider => ContactModel::NativeCollider,
        }
    }

    /// Spring mode, if this model pushes the chassis up itself.
    pub fn suspension(&self) -> Option<SuspensionMode> {
        match self {
            ContactModel::Raycast { suspension } => *suspension,
            ContactModel::NativeCollider => None,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, ContactModel::NativeCollider)
    }
}

/// Engine-side wheel colliders used by `ContactModel::NativeCollider`.
pub trait WheelColliders {
    fn apply(&mut self, id: WheelId, command: &WheelCommand);
    fn world_pose(&self, id: WheelId) -> Isometry<Real>;
    /// Wheel center to ground contact, if the wheel touches anything.
    fn contact_distance(&self, id: WheelId) -> Option<Real>;

    fn in_contact(&self, id: WheelId) -> bool {
        self.contact_distance(id).is_some()
    }
}
