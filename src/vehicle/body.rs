//! Seams between the actuator and its host: the physics body it drives and the
//! terrain/water height provider.
// vehicle/body.rs
use crate::vehicle::math::{Quat, Vec3};

/// The rigid body a vehicle controls, as exposed by the physics engine.
///
/// All calls are synchronous and happen on the stepping thread.
pub trait VehicleBody {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn orientation(&self) -> Quat;
    fn set_orientation(&mut self, orientation: Quat);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn rotational_velocity(&self) -> Vec3;
    fn set_rotational_velocity(&mut self, velocity: Vec3);

    fn add_force(&mut self, force: Vec3);
    fn add_force_impulse(&mut self, impulse: Vec3);
    fn add_angular_force(&mut self, torque: Vec3);
    fn add_rotational_impulse(&mut self, impulse: Vec3);

    fn total_mass(&self) -> f32;
    /// World gravity acting on this body before any vehicle adjustment.
    fn gravity(&self) -> Vec3;
    /// The body collided with something during the last solver step.
    fn has_some_collision(&self) -> bool;
    /// An engine-side body has been instantiated.
    fn has_physical_body(&self) -> bool;
    /// Instantiated, dynamic and enabled.
    fn is_physically_active(&self) -> bool;

    fn set_friction(&mut self, friction: f32);
    fn set_restitution(&mut self, restitution: f32);
    fn set_damping(&mut self, linear: f32, angular: f32);
    fn set_inertia_factor(&mut self, factor: Vec3);
    /// Let the engine apply its own gravity, or leave gravity to the vehicle.
    fn set_engine_gravity(&mut self, enabled: bool);
    fn add_vehicle_collision_flag(&mut self);
    fn remove_vehicle_collision_flag(&mut self);

    /// Ask the engine to report this body's properties after the step.
    fn push_update(&mut self);
}

/// Ground and water heights, Z-up.
pub trait TerrainSource {
    fn height_at(&self, x: f32, y: f32) -> f32;
    fn water_level_at(&self, x: f32, y: f32) -> f32;
}

/// Body state as reported back to the simulator after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityProperties {
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub rotational_velocity: Vec3,
}
