// ==============================================================================
// presets.rs — VEHICLE ARCHETYPE DEFAULTS
// ------------------------------------------------------------------------------
// One static bundle per VehicleType. Applying a type copies the whole bundle
// into the parameter store in one go, then edits the flag set with the
// bundle's clear/set masks (NONE clears everything).
//
// Values are raw: they are not passed through the clamping setters, so a
// preset may hold values a script could not set directly (SLED hover
// efficiency of 10 is one).
// ==============================================================================

use crate::vehicle::types::{VehicleFlags, VehicleType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePreset {
    pub linear_motor_timescale: f32,
    pub linear_motor_decay_timescale: f32,
    pub linear_friction_timescale: [f32; 3],

    pub angular_motor_timescale: f32,
    pub angular_motor_decay_timescale: f32,
    pub angular_friction_timescale: [f32; 3],

    pub hover_height: f32,
    pub hover_efficiency: f32,
    pub hover_timescale: f32,
    pub buoyancy: f32,

    pub linear_deflection_efficiency: f32,
    pub linear_deflection_timescale: f32,
    pub angular_deflection_efficiency: f32,
    pub angular_deflection_timescale: f32,

    pub vertical_attraction_efficiency: f32,
    pub vertical_attraction_timescale: f32,

    pub banking_efficiency: f32,
    pub banking_mix: f32,
    pub banking_timescale: f32,

    pub flags_clear: VehicleFlags,
    pub flags_set: VehicleFlags,
}

impl VehiclePreset {
    /// Flag set after applying this preset on top of `current`.
    pub fn apply_flags(&self, current: VehicleFlags) -> VehicleFlags {
        (current - self.flags_clear) | self.flags_set
    }
}

const NONE: VehiclePreset = VehiclePreset {
    linear_motor_timescale: 1000.0,
    linear_motor_decay_timescale: 120.0,
    linear_friction_timescale: [1000.0, 1000.0, 1000.0],
    angular_motor_timescale: 1000.0,
    angular_motor_decay_timescale: 120.0,
    angular_friction_timescale: [1000.0, 1000.0, 1000.0],
    hover_height: 0.0,
    hover_efficiency: 0.0,
    hover_timescale: 310.0,
    buoyancy: 0.0,
    linear_deflection_efficiency: 1.0,
    linear_deflection_timescale: 1.0,
    angular_deflection_efficiency: 0.0,
    angular_deflection_timescale: 1000.0,
    vertical_attraction_efficiency: 0.0,
    vertical_attraction_timescale: 1000.0,
    banking_efficiency: 0.0,
    banking_mix: 1.0,
    banking_timescale: 1000.0,
    flags_clear: VehicleFlags::all(),
    flags_set: VehicleFlags::empty(),
};

const SLED: VehiclePreset = VehiclePreset {
    linear_motor_timescale: 1000.0,
    linear_motor_decay_timescale: 120.0,
    linear_friction_timescale: [30.0, 1.0, 1000.0],
    angular_motor_timescale: 1000.0,
    angular_motor_decay_timescale: 120.0,
    angular_friction_timescale: [1000.0, 1000.0, 1000.0],
    hover_height: 0.0,
    hover_efficiency: 10.0,
    hover_timescale: 10.0,
    buoyancy: 0.0,
    linear_deflection_efficiency: 1.0,
    linear_deflection_timescale: 1.0,
    angular_deflection_efficiency: 0.0,
    angular_deflection_timescale: 10.0,
    vertical_attraction_efficiency: 1.0,
    vertical_attraction_timescale: 1000.0,
    banking_efficiency: 0.0,
    banking_mix: 1.0,
    banking_timescale: 10.0,
    flags_clear: VehicleFlags::HOVER_WATER_ONLY
        .union(VehicleFlags::HOVER_TERRAIN_ONLY)
        .union(VehicleFlags::HOVER_GLOBAL_HEIGHT)
        .union(VehicleFlags::HOVER_UP_ONLY),
    flags_set: VehicleFlags::NO_DEFLECTION_UP
        .union(VehicleFlags::LIMIT_ROLL_ONLY)
        .union(VehicleFlags::LIMIT_MOTOR_UP),
};

const CAR: VehiclePreset = VehiclePreset {
    linear_motor_timescale: 1.0,
    linear_motor_decay_timescale: 60.0,
    linear_friction_timescale: [100.0, 2.0, 1000.0],
    angular_motor_timescale: 1.0,
    angular_motor_decay_timescale: 0.8,
    angular_friction_timescale: [1000.0, 1000.0, 1000.0],
    hover_height: 0.0,
    hover_efficiency: 0.0,
    hover_timescale: 1000.0,
    buoyancy: 0.0,
    linear_deflection_efficiency: 1.0,
    linear_deflection_timescale: 2.0,
    angular_deflection_efficiency: 0.0,
    angular_deflection_timescale: 10.0,
    vertical_attraction_efficiency: 1.0,
    vertical_attraction_timescale: 10.0,
    banking_efficiency: -0.2,
    banking_mix: 1.0,
    banking_timescale: 1.0,
    flags_clear: VehicleFlags::HOVER_WATER_ONLY
        .union(VehicleFlags::HOVER_TERRAIN_ONLY)
        .union(VehicleFlags::HOVER_GLOBAL_HEIGHT),
    flags_set: VehicleFlags::NO_DEFLECTION_UP
        .union(VehicleFlags::LIMIT_ROLL_ONLY)
        .union(VehicleFlags::LIMIT_MOTOR_UP)
        .union(VehicleFlags::HOVER_UP_ONLY),
};

const BOAT: VehiclePreset = VehiclePreset {
    linear_motor_timescale: 5.0,
    linear_motor_decay_timescale: 60.0,
    linear_friction_timescale: [10.0, 3.0, 2.0],
    angular_motor_timescale: 4.0,
    angular_motor_decay_timescale: 4.0,
    angular_friction_timescale: [10.0, 10.0, 10.0],
    hover_height: 0.0,
    hover_efficiency: 0.5,
    hover_timescale: 2.0,
    buoyancy: 1.0,
    linear_deflection_efficiency: 0.5,
    linear_deflection_timescale: 3.0,
    angular_deflection_efficiency: 0.5,
    angular_deflection_timescale: 5.0,
    vertical_attraction_efficiency: 0.5,
    vertical_attraction_timescale: 5.0,
    banking_efficiency: -0.3,
    banking_mix: 0.8,
    banking_timescale: 1.0,
    flags_clear: VehicleFlags::HOVER_TERRAIN_ONLY
        .union(VehicleFlags::HOVER_GLOBAL_HEIGHT)
        .union(VehicleFlags::LIMIT_ROLL_ONLY),
    flags_set: VehicleFlags::NO_DEFLECTION_UP
        .union(VehicleFlags::LIMIT_MOTOR_UP)
        .union(VehicleFlags::HOVER_WATER_ONLY)
        .union(VehicleFlags::HOVER_UP_ONLY),
};

const AIRPLANE: VehiclePreset = VehiclePreset {
    linear_motor_timescale: 2.0,
    linear_motor_decay_timescale: 60.0,
    linear_friction_timescale: [200.0, 10.0, 5.0],
    angular_motor_timescale: 4.0,
    angular_motor_decay_timescale: 8.0,
    angular_friction_timescale: [20.0, 20.0, 20.0],
    hover_height: 0.0,
    hover_efficiency: 0.5,
    hover_timescale: 1000.0,
    buoyancy: 0.0,
    linear_deflection_efficiency: 0.5,
    linear_deflection_timescale: 0.5,
    angular_deflection_efficiency: 1.0,
    angular_deflection_timescale: 2.0,
    vertical_attraction_efficiency: 0.9,
    vertical_attraction_timescale: 2.0,
    banking_efficiency: 1.0,
    banking_mix: 0.7,
    banking_timescale: 2.0,
    flags_clear: VehicleFlags::HOVER_WATER_ONLY
        .union(VehicleFlags::HOVER_TERRAIN_ONLY)
        .union(VehicleFlags::HOVER_GLOBAL_HEIGHT)
        .union(VehicleFlags::HOVER_UP_ONLY)
        .union(VehicleFlags::NO_DEFLECTION_UP)
        .union(VehicleFlags::LIMIT_MOTOR_UP),
    flags_set: VehicleFlags::LIMIT_ROLL_ONLY,
};

const BALLOON: VehiclePreset = VehiclePreset {
    linear_motor_timescale: 5.0,
    linear_motor_decay_timescale: 60.0,
    linear_friction_timescale: [5.0, 5.0, 5.0],
    angular_motor_timescale: 6.0,
    angular_motor_decay_timescale: 10.0,
    angular_friction_timescale: [10.0, 10.0, 10.0],
    hover_height: 5.0,
    hover_efficiency: 0.8,
    hover_timescale: 10.0,
    buoyancy: 1.0,
    linear_deflection_efficiency: 0.0,
    linear_deflection_timescale: 5.0,
    angular_deflection_efficiency: 0.0,
    angular_deflection_timescale: 5.0,
    vertical_attraction_efficiency: 1.0,
    vertical_attraction_timescale: 1000.0,
    banking_efficiency: 0.0,
    banking_mix: 0.7,
    banking_timescale: 5.0,
    flags_clear: VehicleFlags::HOVER_WATER_ONLY
        .union(VehicleFlags::HOVER_TERRAIN_ONLY)
        .union(VehicleFlags::HOVER_UP_ONLY)
        .union(VehicleFlags::LIMIT_ROLL_ONLY)
        .union(VehicleFlags::NO_DEFLECTION_UP)
        .union(VehicleFlags::HOVER_GLOBAL_HEIGHT)
        .union(VehicleFlags::LIMIT_MOTOR_UP),
    flags_set: VehicleFlags::empty(),
};

static PRESETS: [VehiclePreset; 6] = [NONE, SLED, CAR, BOAT, AIRPLANE, BALLOON];

pub fn preset_for(kind: VehicleType) -> &'static VehiclePreset {
    let idx = match kind {
        VehicleType::None => 0,
        VehicleType::Sled => 1,
        VehicleType::Car => 2,
        VehicleType::Boat => 3,
        VehicleType::Airplane => 4,
        VehicleType::Balloon => 5,
    };
    &PRESETS[idx]
}
