pub mod config;
pub mod contact;
pub mod controller;
pub mod debug_builders;
pub mod dynamics;
pub mod error;
pub mod feed;
pub mod physics;
pub mod scene;
pub mod state;
pub mod vehicle;
pub mod wheel_collider;

pub use config::{CarVariant, VehicleConfig};
pub use controller::VehicleController;
pub use error::SimError;
pub use physics::PhysicsWorld;
pub use vehicle::VehicleMode;
