//! vehicle - engine-agnostic vehicle actuator (parameter store + per-step motor loops)

pub mod types;
pub mod math;
pub mod presets;
pub mod params;
pub mod body;
pub mod known;
pub mod linear;
pub mod angular;
pub mod limit;
pub mod dynamics;

#[cfg(test)]
pub(crate) mod mock;

pub use types::*;
pub use body::{EntityProperties, TerrainSource, VehicleBody};
pub use dynamics::VehicleDynamics;
pub use params::VehicleParams;
pub use presets::{VehiclePreset, preset_for};
