// ==============================================================================
// scene.rs — WHICH CARS EXIST, WHERE, AND IN WHAT MODE
// ------------------------------------------------------------------------------
// - parking-lot: one Drivable car ("player") at the origin
// - menu:        the three builds on display, 8 m apart along x, Menu mode
// ==============================================================================

use tracing::info;

use crate::config::{CarVariant, VehicleConfig};
use crate::error::SimError;
use crate::physics::PhysicsWorld;
use crate::vehicle::VehicleMode;

pub const PLAYER_ID: &str = "player";
pub const MENU_SPACING: f32 = 8.0;

/// Chassis origin height at spawn; the car settles from here.
pub const SPAWN_HEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SceneKind {
    Menu,
    ParkingLot,
}

#[derive(Debug, Clone)]
pub struct SpawnInfo {
    pub id: String,
    pub config: VehicleConfig,
    pub mode: VehicleMode,
    pub position: [f32; 3],
}

impl SceneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKind::Menu => "menu",
            SceneKind::ParkingLot => "parking-lot",
        }
    }

    /// `player` is the car driven in the parking lot (ignored by the menu).
    pub fn layout(&self, player: &VehicleConfig) -> Vec<SpawnInfo> {
        match self {
            SceneKind::ParkingLot => vec![SpawnInfo {
                id: PLAYER_ID.to_string(),
                config: player.clone(),
                mode: VehicleMode::Drivable,
                position: [0.0, SPAWN_HEIGHT, 0.0],
            }],
            SceneKind::Menu => {
                let first = -MENU_SPACING * (CarVariant::ALL.len() as f32 - 1.0) * 0.5;
                CarVariant::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, variant)| SpawnInfo {
                        id: variant.as_str().to_string(),
                        config: VehicleConfig::preset(*variant),
                        mode: VehicleMode::Menu,
                        position: [first + MENU_SPACING * i as f32, SPAWN_HEIGHT, 0.0],
                    })
                    .collect()
            }
        }
    }

    pub fn spawn(&self, world: &mut PhysicsWorld, player: &VehicleConfig) -> Result<Vec<String>, SimError> {
        let mut ids = Vec::new();
        for s in self.layout(player) {
            world.spawn_vehicle(&s.id, &s.config, s.mode, s.position)?;
            ids.push(s.id);
        }
        info!(scene = self.as_str(), vehicles = ids.len(), "scene ready");
        Ok(ids)
    }
}
