//! Scripting-facing identifiers: vehicle archetypes, flag bits and parameter codes.
// vehicle/types.rs
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ============================================
// Vehicle archetype
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    None,
    Sled,
    Car,
    Boat,
    Airplane,
    Balloon,
}

impl VehicleType {
    #[cfg(test)]
    pub const ALL: [VehicleType; 6] = [
        VehicleType::None,
        VehicleType::Sled,
        VehicleType::Car,
        VehicleType::Boat,
        VehicleType::Airplane,
        VehicleType::Balloon,
    ];

    /// Decode the legacy `VEHICLE_TYPE_*` integer.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(VehicleType::None),
            1 => Some(VehicleType::Sled),
            2 => Some(VehicleType::Car),
            3 => Some(VehicleType::Boat),
            4 => Some(VehicleType::Airplane),
            5 => Some(VehicleType::Balloon),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn code(&self) -> i32 {
        match self {
            VehicleType::None => 0,
            VehicleType::Sled => 1,
            VehicleType::Car => 2,
            VehicleType::Boat => 3,
            VehicleType::Airplane => 4,
            VehicleType::Balloon => 5,
        }
    }

    /// Vehicles that are expected to sit on the ground.
    pub fn is_ground(&self) -> bool {
        matches!(self, VehicleType::Car | VehicleType::Sled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::None => "none",
            VehicleType::Sled => "sled",
            VehicleType::Car => "car",
            VehicleType::Boat => "boat",
            VehicleType::Airplane => "airplane",
            VehicleType::Balloon => "balloon",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Flag bits (values match the scripting constants)
// ============================================

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VehicleFlags: u32 {
        const NO_DEFLECTION_UP    = 1 << 0;
        const LIMIT_ROLL_ONLY     = 1 << 1;
        const HOVER_WATER_ONLY    = 1 << 2;
        const HOVER_TERRAIN_ONLY  = 1 << 3;
        const HOVER_GLOBAL_HEIGHT = 1 << 4;
        const HOVER_UP_ONLY       = 1 << 5;
        const LIMIT_MOTOR_UP      = 1 << 6;
        const MOUSELOOK_STEER     = 1 << 7;
        const MOUSELOOK_BANK      = 1 << 8;
        const CAMERA_DECOUPLED    = 1 << 9;
        const NO_X                = 1 << 10;
        const NO_Y                = 1 << 11;
        const NO_Z                = 1 << 12;
        const LOCK_HOVER_HEIGHT   = 1 << 13;
        const NO_DEFLECTION       = 1 << 14;
        const LOCK_ROTATION       = 1 << 15;
    }
}

impl VehicleFlags {
    /// Any of the three modes that select a hover reference height.
    pub const HOVER_MODES: VehicleFlags = VehicleFlags::HOVER_WATER_ONLY
        .union(VehicleFlags::HOVER_TERRAIN_ONLY)
        .union(VehicleFlags::HOVER_GLOBAL_HEIGHT);

    pub const NO_AXIS: VehicleFlags = VehicleFlags::NO_X
        .union(VehicleFlags::NO_Y)
        .union(VehicleFlags::NO_Z);
}

// ============================================
// Parameter identifiers
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleParam {
    LinearFrictionTimescale,
    AngularFrictionTimescale,
    LinearMotorDirection,
    AngularMotorDirection,
    LinearMotorOffset,
    HoverHeight,
    HoverEfficiency,
    HoverTimescale,
    Buoyancy,
    LinearDeflectionEfficiency,
    LinearDeflectionTimescale,
    LinearMotorTimescale,
    LinearMotorDecayTimescale,
    AngularDeflectionEfficiency,
    AngularDeflectionTimescale,
    AngularMotorTimescale,
    AngularMotorDecayTimescale,
    VerticalAttractionEfficiency,
    VerticalAttractionTimescale,
    BankingEfficiency,
    BankingMix,
    BankingTimescale,
    ReferenceFrame,
    RollFrame,
    BlockExit,
}

impl VehicleParam {
    /// Decode a legacy `VEHICLE_*` parameter code. Unknown codes are `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        use VehicleParam::*;
        let p = match code {
            16 => LinearFrictionTimescale,
            17 => AngularFrictionTimescale,
            18 => LinearMotorDirection,
            19 => AngularMotorDirection,
            20 => LinearMotorOffset,
            24 => HoverHeight,
            25 => HoverEfficiency,
            26 => HoverTimescale,
            27 => Buoyancy,
            28 => LinearDeflectionEfficiency,
            29 => LinearDeflectionTimescale,
            30 => LinearMotorTimescale,
            31 => LinearMotorDecayTimescale,
            32 => AngularDeflectionEfficiency,
            33 => AngularDeflectionTimescale,
            34 => AngularMotorTimescale,
            35 => AngularMotorDecayTimescale,
            36 => VerticalAttractionEfficiency,
            37 => VerticalAttractionTimescale,
            38 => BankingEfficiency,
            39 => BankingMix,
            40 => BankingTimescale,
            44 => ReferenceFrame,
            45 => RollFrame,
            47 => BlockExit,
            _ => return None,
        };
        Some(p)
    }

    pub fn code(&self) -> i32 {
        use VehicleParam::*;
        match self {
            LinearFrictionTimescale => 16,
            AngularFrictionTimescale => 17,
            LinearMotorDirection => 18,
            AngularMotorDirection => 19,
            LinearMotorOffset => 20,
            HoverHeight => 24,
            HoverEfficiency => 25,
            HoverTimescale => 26,
            Buoyancy => 27,
            LinearDeflectionEfficiency => 28,
            LinearDeflectionTimescale => 29,
            LinearMotorTimescale => 30,
            LinearMotorDecayTimescale => 31,
            AngularDeflectionEfficiency => 32,
            AngularDeflectionTimescale => 33,
            AngularMotorTimescale => 34,
            AngularMotorDecayTimescale => 35,
            VerticalAttractionEfficiency => 36,
            VerticalAttractionTimescale => 37,
            BankingEfficiency => 38,
            BankingMix => 39,
            BankingTimescale => 40,
            ReferenceFrame => 44,
            RollFrame => 45,
            BlockExit => 47,
        }
    }
}
