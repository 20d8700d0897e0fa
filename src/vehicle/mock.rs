//! In-memory stand-ins for the physics body and terrain, used by unit tests.
use std::cell::Cell;

use crate::vehicle::body::{TerrainSource, VehicleBody};
use crate::vehicle::math::{Quat, Vec3};

#[derive(Debug, Clone)]
pub struct MockBody {
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub rotational_velocity: Vec3,
    pub forces: Vec<Vec3>,
    pub impulses: Vec<Vec3>,
    pub angular_forces: Vec<Vec3>,
    pub rotational_impulses: Vec<Vec3>,

    pub mass: f32,
    pub gravity: Vec3,
    pub colliding: bool,
    pub physical: bool,
    pub active: bool,

    pub friction: Option<f32>,
    pub restitution: Option<f32>,
    pub damping: Option<(f32, f32)>,
    pub inertia_factor: Option<Vec3>,
    pub engine_gravity: bool,
    pub vehicle_collisions: bool,

    pub push_updates: usize,
    pub reads: Cell<usize>,
    pub log: Vec<&'static str>,
}

impl Default for MockBody {
    fn default() -> Self {
        Self {
            position: Vec3::new(128.0, 128.0, 30.0),
            orientation: Quat::identity(),
            velocity: Vec3::zeros(),
            rotational_velocity: Vec3::zeros(),
            forces: Vec::new(),
            impulses: Vec::new(),
            angular_forces: Vec::new(),
            rotational_impulses: Vec::new(),
            mass: 10.0,
            gravity: Vec3::new(0.0, 0.0, -9.80665),
            colliding: false,
            physical: true,
            active: true,
            friction: None,
            restitution: None,
            damping: None,
            inertia_factor: None,
            engine_gravity: true,
            vehicle_collisions: false,
            push_updates: 0,
            reads: Cell::new(0),
            log: Vec::new(),
        }
    }
}

impl MockBody {
    pub fn at(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    /// Number of state writes and accumulator pushes (excluding push_update).
    pub fn writes(&self) -> usize {
        self.log.iter().filter(|e| **e != "push_update").count()
    }

    pub fn total_force(&self) -> Vec3 {
        self.forces.iter().sum()
    }

    fn read<T>(&self, v: T) -> T {
        self.reads.set(self.reads.get() + 1);
        v
    }
}

impl VehicleBody for MockBody {
    fn position(&self) -> Vec3 {
        self.read(self.position)
    }
    fn set_position(&mut self, position: Vec3) {
        self.log.push("position");
        self.position = position;
    }
    fn orientation(&self) -> Quat {
        self.read(self.orientation)
    }
    fn set_orientation(&mut self, orientation: Quat) {
        self.log.push("orientation");
        self.orientation = orientation;
    }
    fn velocity(&self) -> Vec3 {
        self.read(self.velocity)
    }
    fn set_velocity(&mut self, velocity: Vec3) {
        self.log.push("velocity");
        self.velocity = velocity;
    }
    fn rotational_velocity(&self) -> Vec3 {
        self.read(self.rotational_velocity)
    }
    fn set_rotational_velocity(&mut self, velocity: Vec3) {
        self.log.push("rotational_velocity");
        self.rotational_velocity = velocity;
    }

    fn add_force(&mut self, force: Vec3) {
        self.log.push("force");
        self.forces.push(force);
    }
    fn add_force_impulse(&mut self, impulse: Vec3) {
        self.log.push("impulse");
        self.impulses.push(impulse);
    }
    fn add_angular_force(&mut self, torque: Vec3) {
        self.log.push("rotational_force");
        self.angular_forces.push(torque);
    }
    fn add_rotational_impulse(&mut self, impulse: Vec3) {
        self.log.push("rotational_impulse");
        self.rotational_impulses.push(impulse);
    }

    fn total_mass(&self) -> f32 {
        self.mass
    }
    fn gravity(&self) -> Vec3 {
        self.gravity
    }
    fn has_some_collision(&self) -> bool {
        self.colliding
    }
    fn has_physical_body(&self) -> bool {
        self.physical
    }
    fn is_physically_active(&self) -> bool {
        self.physical && self.active
    }

    fn set_friction(&mut self, friction: f32) {
        self.friction = Some(friction);
    }
    fn set_restitution(&mut self, restitution: f32) {
        self.restitution = Some(restitution);
    }
    fn set_damping(&mut self, linear: f32, angular: f32) {
        self.damping = Some((linear, angular));
    }
    fn set_inertia_factor(&mut self, factor: Vec3) {
        self.inertia_factor = Some(factor);
    }
    fn set_engine_gravity(&mut self, enabled: bool) {
        self.engine_gravity = enabled;
    }
    fn add_vehicle_collision_flag(&mut self) {
        self.vehicle_collisions = true;
    }
    fn remove_vehicle_collision_flag(&mut self) {
        self.vehicle_collisions = false;
    }

    fn push_update(&mut self) {
        self.log.push("push_update");
        self.push_updates += 1;
    }
}

#[derive(Debug, Default)]
pub struct FlatTerrain {
    pub height: f32,
    pub water: f32,
    pub lookups: Cell<usize>,
}

impl FlatTerrain {
    pub fn new(height: f32, water: f32) -> Self {
        Self { height, water, lookups: Cell::new(0) }
    }
}

impl TerrainSource for FlatTerrain {
    fn height_at(&self, _x: f32, _y: f32) -> f32 {
        self.lookups.set(self.lookups.get() + 1);
        self.height
    }
    fn water_level_at(&self, _x: f32, _y: f32) -> f32 {
        self.lookups.set(self.lookups.get() + 1);
        self.water
    }
}
