use std::path::PathBuf;

use rapier3d::prelude::Real;
use thiserror::Error;

use crate::dynamics::WheelId;

/// Everything that can go wrong before the first tick (or when addressing a
/// vehicle that does not exist). Tick-time misses are states, not errors.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("wheel {0} is configured twice")]
    DuplicateWheel(WheelId),

    #[error("wheel {0} is not configured")]
    MissingWheel(WheelId),

    #[error("wheel {wheel}: radius must be positive, got {radius}")]
    InvalidRadius { wheel: WheelId, radius: Real },

    #[error("wheel {wheel}: probe reach must be positive, got {max_distance}")]
    InvalidReach { wheel: WheelId, max_distance: Real },

    #[error("wheel {0}: raycast suspension needs a probe point")]
    MissingProbePoint(WheelId),

    #[error("invalid tuning value {field} = {value}")]
    InvalidTuning { field: &'static str, value: Real },

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to encode snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error("unknown vehicle `{0}`")]
    UnknownVehicle(String),

    #[error("vehicle `{0}` has no rigid body")]
    MissingBody(String),
}
