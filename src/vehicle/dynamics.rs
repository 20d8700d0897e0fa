// ==============================================================================
// dynamics.rs — VEHICLE ACTUATOR
// ------------------------------------------------------------------------------
// One per controlled object. Owns the parameter store and the known-value
// cache, and is driven by the world's step schedule:
//
//   scripting surface  -> process_* (type, float, vector, rotation, flags)
//   deferred refresh   -> set_physical_parameters (via Taint::RefreshVehicle)
//   pre-step hook      -> step: linear, angular, rotation limit, flush
//   post-step hook     -> post_step
//   property report    -> pre_update_property
//
// Hooks are registered only while the type is not NONE.
// ==============================================================================

use tracing::{debug, info, trace};

use crate::config::VehicleTuning;
use crate::schedule::{LocalId, StepSchedule, Taint};
use crate::vehicle::angular::move_angular;
use crate::vehicle::body::{EntityProperties, TerrainSource, VehicleBody};
use crate::vehicle::known::{KnownBody, KnownValues};
use crate::vehicle::limit::limit_rotation;
use crate::vehicle::linear::move_linear;
use crate::vehicle::math::{Quat, Vec3};
use crate::vehicle::params::VehicleParams;
use crate::vehicle::types::{VehicleParam, VehicleType};

/// Per-step inputs shared by every pipeline stage.
pub struct StepEnv<'a, T: ?Sized> {
    pub id: LocalId,
    pub dt: f32,
    pub tuning: &'a VehicleTuning,
    pub terrain: &'a T,
    pub mass: f32,
    /// World gravity on the body.
    pub gravity: Vec3,
    /// World gravity scaled by buoyancy.
    pub vehicle_gravity: Vec3,
    /// Position at the end of the previous step.
    pub last_position: Option<Vec3>,
}

/// Vehicle orientation with the reference frame applied.
pub fn frame_orientation<B>(kb: &mut KnownBody<'_, B>, params: &VehicleParams) -> Quat
where
    B: VehicleBody + ?Sized,
{
    kb.orientation() * params.reference_frame
}

#[derive(Debug, Clone)]
pub struct VehicleDynamics {
    id: LocalId,
    params: VehicleParams,
    known: KnownValues,
    tuning: VehicleTuning,

    mass: f32,
    gravity: Vec3,
    vehicle_gravity: Vec3,
    last_position: Option<Vec3>,

    registered: bool,
    enabled: bool,
}

impl VehicleDynamics {
    pub fn new(id: LocalId, tuning: VehicleTuning) -> Self {
        let params = VehicleParams {
            vertical_attraction_cutoff: tuning.vertical_attraction_cutoff,
            ..VehicleParams::default()
        };
        Self {
            id,
            params,
            known: KnownValues::default(),
            tuning,
            mass: 0.0,
            gravity: Vec3::zeros(),
            vehicle_gravity: Vec3::zeros(),
            last_position: None,
            registered: false,
            enabled: true,
        }
    }

    pub fn kind(&self) -> VehicleType {
        self.params.kind
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn vehicle_gravity(&self) -> Vec3 {
        self.vehicle_gravity
    }

    #[cfg(test)]
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// A vehicle type is set and the body is taking part in the simulation.
    pub fn is_active<B: VehicleBody + ?Sized>(&self, body: &B) -> bool {
        self.enabled && self.params.kind != VehicleType::None && body.is_physically_active()
    }

    // ============================================
    // Scripting surface
    // ============================================

    pub fn process_type_change(&mut self, kind: VehicleType, schedule: &mut StepSchedule) {
        if !self.enabled {
            return;
        }
        info!(id = self.id, from = %self.params.kind, to = %kind, "vehicle type change");

        self.params.apply_preset(kind);
        if kind == VehicleType::None {
            self.unregister(schedule);
        } else {
            self.register(schedule);
        }
        self.refresh(schedule);
    }

    pub fn process_float_param(&mut self, param: VehicleParam, value: f32) {
        self.params.set_float(param, value);
        if param == VehicleParam::Buoyancy {
            self.vehicle_gravity = self.params.vehicle_gravity(self.gravity);
        }
        debug!(id = self.id, ?param, value, "vehicle float param");
    }

    pub fn process_vector_param(&mut self, param: VehicleParam, value: Vec3) {
        self.params.set_vector(param, value);
        debug!(id = self.id, ?param, ?value, "vehicle vector param");
    }

    pub fn process_rotation_param(&mut self, param: VehicleParam, value: Quat) {
        self.params.set_rotation(param, value);
        debug!(id = self.id, ?param, ?value, "vehicle rotation param");
    }

    pub fn process_flags(&mut self, mask: i32, remove: bool) {
        self.params.set_flags(mask, remove);
        debug!(id = self.id, mask, remove, flags = ?self.params.flags, "vehicle flags");
    }

    // ============================================
    // Physical properties
    // ============================================

    /// Queue a push of physical properties to the body for the next tick.
    pub fn refresh(&self, schedule: &mut StepSchedule) {
        schedule.post_taint(self.id, Taint::RefreshVehicle);
    }

    /// Runs from the refresh taint, between solver steps.
    pub fn set_physical_parameters<B: VehicleBody + ?Sized>(&mut self, body: &mut B) {
        if self.is_active(body) {
            self.mass = body.total_mass();
            body.set_friction(self.tuning.friction);
            body.set_restitution(self.tuning.restitution);
            body.set_damping(self.tuning.linear_damping, self.tuning.angular_damping);
            body.set_inertia_factor(Vec3::from(self.tuning.inertia_factor));
            body.add_vehicle_collision_flag();

            // The vehicle applies its own gravity.
            self.gravity = body.gravity();
            self.vehicle_gravity = self.params.vehicle_gravity(self.gravity);
            body.set_engine_gravity(false);

            debug!(
                id = self.id,
                mass = self.mass,
                gravity = ?self.vehicle_gravity,
                "vehicle physical parameters set"
            );
        } else if body.has_physical_body() {
            body.remove_vehicle_collision_flag();
            body.set_engine_gravity(true);
            debug!(id = self.id, "vehicle physical parameters cleared");
        }
    }

    // ============================================
    // Tick hooks
    // ============================================

    /// Pre-step hook: compute and apply this tick's vehicle contribution.
    pub fn step<B, T>(&mut self, body: &mut B, terrain: &T, dt: f32)
    where
        B: VehicleBody + ?Sized,
        T: TerrainSource + ?Sized,
    {
        if !self.is_active(body) {
            return;
        }

        self.known.forget();

        let env = StepEnv {
            id: self.id,
            dt,
            tuning: &self.tuning,
            terrain,
            mass: self.mass,
            gravity: self.gravity,
            vehicle_gravity: self.vehicle_gravity,
            last_position: self.last_position,
        };

        let mut kb = self.known.bind(body);
        move_linear(&mut kb, &mut self.params, &env);
        move_angular(&mut kb, &mut self.params, &env);
        limit_rotation(&mut kb, &self.params);

        let position = kb.position();
        let wrote = kb.flush();
        self.last_position = Some(position);

        trace!(id = self.id, ?position, wrote, "vehicle step");
    }

    /// Post-step hook. Nothing to correct after the solver at present.
    pub fn post_step<B: VehicleBody + ?Sized>(&self, body: &B, dt: f32) {
        if self.is_active(body) {
            trace!(id = self.id, dt, "vehicle post step");
        }
    }

    /// Adjust properties about to be reported for this body.
    pub fn pre_update_property<B: VehicleBody + ?Sized>(&self, body: &B, props: &mut EntityProperties) {
        if self.is_active(body) {
            // leftover solver spin is not the vehicle's
            props.rotational_velocity = Vec3::zeros();
        }
    }

    /// The object is going away: stop stepping and never restart.
    pub fn dispose(&mut self, schedule: &mut StepSchedule) {
        self.unregister(schedule);
        self.params.apply_preset(VehicleType::None);
        self.enabled = false;
        debug!(id = self.id, "vehicle disposed");
    }

    fn register(&mut self, schedule: &mut StepSchedule) {
        if !self.registered {
            schedule.subscribe(self.id);
            self.registered = true;
        }
    }

    fn unregister(&mut self, schedule: &mut StepSchedule) {
        if self.registered {
            schedule.unsubscribe(self.id);
            self.registered = false;
        }
    }
}
