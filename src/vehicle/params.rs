// ==============================================================================
// params.rs — VEHICLE PARAMETER STORE
// ------------------------------------------------------------------------------
// Holds the vehicle type, flag set and every script-tunable value, plus the
// two decaying motors (linear + angular).
//
// Setters never fail:
// - out-of-range values are clamped
// - identifiers that do not apply to a setter are ignored
//
// Changes take effect the next time the actuator steps.
// ==============================================================================

use crate::vehicle::math::{
    MIN_TIMESCALE, Quat, Vec3, clamp_in_range, friction_factor, infinite_vector,
};
use crate::vehicle::presets::preset_for;
use crate::vehicle::types::{VehicleFlags, VehicleParam, VehicleType};

/// Requested angular motor speed is limited to two revolutions per second.
const MAX_ANGULAR_MOTOR: f32 = 12.56;
const MAX_DECAY_TIMESCALE: f32 = 120.0;

// ============================================
// Decaying motor
// ============================================

/// A motor whose commanded direction snaps in when set and then relaxes
/// toward zero with `decay_timescale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayingMotor {
    /// Direction requested by a script, consumed on the next step.
    pub requested: Option<Vec3>,
    pub decaying: Vec3,
    pub timescale: f32,
    pub decay_timescale: f32,
    pub friction_timescale: Vec3,
}

impl Default for DecayingMotor {
    fn default() -> Self {
        Self {
            requested: None,
            decaying: Vec3::zeros(),
            timescale: 1.0,
            decay_timescale: 1.0,
            friction_timescale: infinite_vector(),
        }
    }
}

impl DecayingMotor {
    pub fn request(&mut self, direction: Vec3) {
        self.requested = Some(direction);
    }

    /// Advance the decaying direction by one step and return it.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        match self.requested.take() {
            Some(dir) => self.decaying = dir,
            None => self.decaying -= self.decaying * dt / self.decay_timescale,
        }
        self.decaying
    }

    /// Frame-space correction toward the decaying direction, less friction.
    pub fn correction(&mut self, current: &Vec3, dt: f32) -> Vec3 {
        let target = self.advance(dt);
        let drive = (target - current) * dt / self.timescale;
        drive - current.component_mul(&friction_factor(&self.friction_timescale, dt))
    }
}

// ============================================
// Parameter store
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleParams {
    pub kind: VehicleType,
    pub flags: VehicleFlags,

    pub linear: DecayingMotor,
    pub angular: DecayingMotor,
    pub linear_motor_offset: Vec3,

    pub block_exit: Vec3,
    pub reference_frame: Quat,
    /// Bounds for the rotation limiter; `None` until a script sets one.
    pub roll_frame: Option<Quat>,

    pub linear_deflection_efficiency: f32,
    pub linear_deflection_timescale: f32,
    pub angular_deflection_efficiency: f32,
    pub angular_deflection_timescale: f32,

    pub banking_efficiency: f32,
    pub banking_mix: f32,
    pub banking_timescale: f32,

    pub hover_height: f32,
    pub hover_efficiency: f32,
    pub hover_timescale: f32,
    pub hover_target_height: f32,
    /// -1 (double gravity) .. 1 (no gravity)
    pub buoyancy: f32,

    pub vertical_attraction_efficiency: f32,
    pub vertical_attraction_timescale: f32,
    pub vertical_attraction_cutoff: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            kind: VehicleType::None,
            flags: VehicleFlags::empty(),
            linear: DecayingMotor::default(),
            angular: DecayingMotor::default(),
            linear_motor_offset: Vec3::zeros(),
            block_exit: Vec3::zeros(),
            reference_frame: Quat::identity(),
            roll_frame: None,
            linear_deflection_efficiency: 0.0,
            linear_deflection_timescale: 1.0,
            angular_deflection_efficiency: 0.0,
            angular_deflection_timescale: 1.0,
            banking_efficiency: 0.0,
            banking_mix: 0.0,
            banking_timescale: 1.0,
            hover_height: 0.0,
            hover_efficiency: 0.0,
            hover_timescale: 310.0,
            hover_target_height: 0.0,
            buoyancy: 0.0,
            vertical_attraction_efficiency: 1.0,
            vertical_attraction_timescale: 510.0,
            vertical_attraction_cutoff: 500.0,
        }
    }
}

impl VehicleParams {
    pub fn set_float(&mut self, param: VehicleParam, value: f32) {
        use VehicleParam::*;
        match param {
            AngularDeflectionEfficiency => self.angular_deflection_efficiency = clamp_in_range(0.0, value, 1.0),
            AngularDeflectionTimescale => self.angular_deflection_timescale = value.max(MIN_TIMESCALE),
            AngularMotorDecayTimescale => {
                self.angular.decay_timescale = clamp_in_range(MIN_TIMESCALE, value, MAX_DECAY_TIMESCALE)
            }
            AngularMotorTimescale => self.angular.timescale = value.max(MIN_TIMESCALE),
            BankingEfficiency => self.banking_efficiency = clamp_in_range(-1.0, value, 1.0),
            BankingMix => self.banking_mix = value.max(MIN_TIMESCALE),
            BankingTimescale => self.banking_timescale = value.max(MIN_TIMESCALE),
            Buoyancy => self.buoyancy = clamp_in_range(-1.0, value, 1.0),
            HoverEfficiency => self.hover_efficiency = clamp_in_range(0.0, value, 1.0),
            HoverHeight => self.hover_height = value,
            HoverTimescale => self.hover_timescale = value.max(MIN_TIMESCALE),
            LinearDeflectionEfficiency => self.linear_deflection_efficiency = clamp_in_range(0.0, value, 1.0),
            LinearDeflectionTimescale => self.linear_deflection_timescale = value.max(MIN_TIMESCALE),
            LinearMotorDecayTimescale => {
                self.linear.decay_timescale = clamp_in_range(MIN_TIMESCALE, value, MAX_DECAY_TIMESCALE)
            }
            LinearMotorTimescale => self.linear.timescale = value.max(MIN_TIMESCALE),
            VerticalAttractionEfficiency => {
                self.vertical_attraction_efficiency = clamp_in_range(0.1, value, 1.0)
            }
            VerticalAttractionTimescale => self.vertical_attraction_timescale = value.max(MIN_TIMESCALE),

            // vector parameters accept a scalar for all three components
            AngularFrictionTimescale | AngularMotorDirection | LinearFrictionTimescale
            | LinearMotorDirection | LinearMotorOffset => {
                self.set_vector(param, Vec3::new(value, value, value))
            }

            ReferenceFrame | RollFrame | BlockExit => {}
        }
    }

    pub fn set_vector(&mut self, param: VehicleParam, value: Vec3) {
        use VehicleParam::*;
        match param {
            AngularFrictionTimescale => {
                self.angular.friction_timescale = value.map(|c| c.max(MIN_TIMESCALE))
            }
            AngularMotorDirection => self
                .angular
                .request(value.map(|c| clamp_in_range(-MAX_ANGULAR_MOTOR, c, MAX_ANGULAR_MOTOR))),
            LinearFrictionTimescale => {
                self.linear.friction_timescale = value.map(|c| c.max(MIN_TIMESCALE))
            }
            LinearMotorDirection => self.linear.request(value),
            LinearMotorOffset => self.linear_motor_offset = value,
            BlockExit => self.block_exit = value,
            _ => {}
        }
    }

    pub fn set_rotation(&mut self, param: VehicleParam, value: Quat) {
        match param {
            VehicleParam::ReferenceFrame => self.reference_frame = value,
            VehicleParam::RollFrame => self.roll_frame = Some(value),
            _ => {}
        }
    }

    /// `-1` clears every flag; otherwise `mask` is added or removed.
    pub fn set_flags(&mut self, mask: i32, remove: bool) {
        if mask == -1 {
            self.flags = VehicleFlags::empty();
            return;
        }
        let bits = VehicleFlags::from_bits_truncate(mask as u32);
        if remove {
            self.flags.remove(bits);
        } else {
            self.flags.insert(bits);
        }
    }

    /// Switch archetype: reset both motors and copy the preset bundle.
    pub fn apply_preset(&mut self, kind: VehicleType) {
        let p = preset_for(kind);
        self.kind = kind;

        self.linear.request(Vec3::zeros());
        self.linear.decaying = Vec3::zeros();
        self.linear.timescale = p.linear_motor_timescale;
        self.linear.decay_timescale = p.linear_motor_decay_timescale;
        self.linear.friction_timescale = Vec3::from(p.linear_friction_timescale);

        self.angular.request(Vec3::zeros());
        self.angular.decaying = Vec3::zeros();
        self.angular.timescale = p.angular_motor_timescale;
        self.angular.decay_timescale = p.angular_motor_decay_timescale;
        self.angular.friction_timescale = Vec3::from(p.angular_friction_timescale);

        self.hover_height = p.hover_height;
        self.hover_efficiency = p.hover_efficiency;
        self.hover_timescale = p.hover_timescale;
        self.buoyancy = p.buoyancy;

        self.linear_deflection_efficiency = p.linear_deflection_efficiency;
        self.linear_deflection_timescale = p.linear_deflection_timescale;
        self.angular_deflection_efficiency = p.angular_deflection_efficiency;
        self.angular_deflection_timescale = p.angular_deflection_timescale;

        self.vertical_attraction_efficiency = p.vertical_attraction_efficiency;
        self.vertical_attraction_timescale = p.vertical_attraction_timescale;

        self.banking_efficiency = p.banking_efficiency;
        self.banking_mix = p.banking_mix;
        self.banking_timescale = p.banking_timescale;

        self.reference_frame = Quat::identity();
        self.flags = p.apply_flags(self.flags);
    }

    /// Hover is on when a reference-height mode is selected, the height is
    /// positive and the timescale is under `cutoff`.
    pub fn hover_enabled(&self, cutoff: f32) -> bool {
        self.flags.intersects(VehicleFlags::HOVER_MODES)
            && self.hover_height > 0.0
            && self.hover_timescale < cutoff
    }

    /// Gravity the vehicle applies to itself, given the world gravity.
    pub fn vehicle_gravity(&self, world: Vec3) -> Vec3 {
        world * (1.0 - self.buoyancy)
    }

    pub fn vertical_attraction_enabled(&self) -> bool {
        self.vertical_attraction_timescale < self.vertical_attraction_cutoff
    }
}
