// ==============================================================================
// config.rs — SERVER + VEHICLE TUNING CONFIGURATION
// ------------------------------------------------------------------------------
// Loaded once at startup from the JSON file named by REGION_PHYSICS_CONFIG.
// Every field has a default, so a partial file (or no file) is fine.
// ==============================================================================

use std::path::Path;

use serde::Deserialize;

use crate::error::ServerError;

pub const CONFIG_ENV: &str = "REGION_PHYSICS_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub tick_hz: u32,
    pub gravity: [f32; 3],
    pub terrain: TerrainConfig,
    pub vehicle: VehicleTuning,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9001".to_string(),
            tick_hz: 60,
            gravity: [0.0, 0.0, -9.80665],
            terrain: TerrainConfig::default(),
            vehicle: VehicleTuning::default(),
        }
    }
}

impl ServerConfig {
    /// Read the file named by `REGION_PHYSICS_CONFIG`, or use the defaults.
    pub fn load() -> Result<Self, ServerError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ServerError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Solver step length in seconds.
    pub fn step_seconds(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub ground_height: f32,
    pub water_level: f32,
    pub grid: Option<GridConfig>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self { ground_height: 21.0, water_level: 20.0, grid: None }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    pub origin: [f32; 2],
    pub cell_size: f32,
    pub columns: usize,
    pub rows: usize,
    /// Row-major, `rows * columns` samples.
    pub heights: Vec<f32>,
}

/// Host-level knobs for every vehicle in the world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub max_linear_velocity: f32,
    pub min_linear_velocity: f32,
    pub max_angular_velocity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
    pub inertia_factor: [f32; 3],
    /// Gravity scale for a ground vehicle that is touching something.
    pub ground_gravity_fudge: f32,
    pub enable_linear_deflection: bool,
    pub linear_deflection_not_colliding_no_z: bool,
    pub enable_angular_vertical_attraction: bool,
    pub enable_angular_deflection: bool,
    pub enable_angular_banking: bool,
    /// Hover timescales at or above this disable hovering.
    pub hover_timescale_cutoff: f32,
    pub vertical_attraction_cutoff: f32,
    pub rotational_velocity_epsilon: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            max_linear_velocity: 1000.0,
            min_linear_velocity: 0.001,
            max_angular_velocity: 12.0,
            linear_damping: 0.0,
            angular_damping: 0.95,
            friction: 0.0,
            restitution: 0.0,
            inertia_factor: [1.0, 1.0, 1.0],
            ground_gravity_fudge: 0.2,
            enable_linear_deflection: true,
            linear_deflection_not_colliding_no_z: true,
            enable_angular_vertical_attraction: true,
            enable_angular_deflection: true,
            enable_angular_banking: true,
            hover_timescale_cutoff: 300.0,
            vertical_attraction_cutoff: 500.0,
            rotational_velocity_epsilon: 0.0001,
        }
    }
}
