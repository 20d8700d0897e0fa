// src/physics.rs
//
// Rapier world for the region (Z-up), plus the adapter that lets a
// VehicleDynamics drive a rapier rigid body.
//
// One tick, in order:
//   1) deferred taints (vehicle property refresh)
//   2) queued hook (un)subscriptions
//   3) pre-step hooks: every registered vehicle steps
//   4) solver step
//   5) clear accumulated forces on vehicle bodies, record contacts
//   6) post-step hooks
//   7) property updates (vehicles get to edit what is reported)

use std::collections::{BTreeMap, HashSet};

use rapier3d::na::Quaternion;
use rapier3d::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{ServerConfig, VehicleTuning};
use crate::schedule::{LocalId, StepSchedule, Taint};
use crate::state::VehicleCommand;
use crate::terrain::TerrainMap;
use crate::vehicle::math::{Quat, Vec3};
use crate::vehicle::{EntityProperties, TerrainSource, VehicleBody, VehicleDynamics, VehicleParam};

const GROUP_GROUND: Group = Group::from_bits_truncate(0b0001);
const GROUP_OBJECT: Group = Group::from_bits_truncate(0b0010);

/// Half size of the ground slab under the region.
const GROUND_HALF_EXTENT: f32 = 4096.0;
/// Bodies further out than this (or non-finite) are put back above the terrain.
const WORLD_LIMIT: f32 = 10_000.0;

#[inline]
fn v3(v: &Vector<Real>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

// ============================================
// Vehicle body adapter
// ============================================

/// A rapier rigid body seen through the `VehicleBody` seam.
///
/// Missing bodies read as zero and ignore writes.
pub struct RapierVehicleBody<'a> {
    bodies: &'a mut RigidBodySet,
    colliders: &'a mut ColliderSet,
    handle: RigidBodyHandle,
    gravity: Vec3,
    colliding: bool,
    max_angular_velocity: f32,
    pushed: bool,
}

impl<'a> RapierVehicleBody<'a> {
    pub fn new(
        bodies: &'a mut RigidBodySet,
        colliders: &'a mut ColliderSet,
        handle: RigidBodyHandle,
        gravity: Vec3,
        colliding: bool,
        max_angular_velocity: f32,
    ) -> Self {
        Self { bodies, colliders, handle, gravity, colliding, max_angular_velocity, pushed: false }
    }

    /// A property update was requested since this adapter was made.
    pub fn pushed(&self) -> bool {
        self.pushed
    }

    fn body(&self) -> Option<&RigidBody> {
        self.bodies.get(self.handle)
    }

    fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.bodies.get_mut(self.handle)
    }

    fn for_each_collider(&mut self, mut f: impl FnMut(&mut Collider)) {
        let Some(rb) = self.bodies.get(self.handle) else {
            return;
        };
        for ch in rb.colliders() {
            if let Some(c) = self.colliders.get_mut(*ch) {
                f(c);
            }
        }
    }
}

impl VehicleBody for RapierVehicleBody<'_> {
    fn position(&self) -> Vec3 {
        self.body().map(|b| *b.translation()).unwrap_or_else(Vec3::zeros)
    }

    fn set_position(&mut self, position: Vec3) {
        if let Some(b) = self.body_mut() {
            b.set_translation(position, true);
        }
    }

    fn orientation(&self) -> Quat {
        self.body().map(|b| *b.rotation()).unwrap_or_else(Quat::identity)
    }

    fn set_orientation(&mut self, orientation: Quat) {
        if let Some(b) = self.body_mut() {
            b.set_rotation(orientation, true);
        }
    }

    fn velocity(&self) -> Vec3 {
        self.body().map(|b| *b.linvel()).unwrap_or_else(Vec3::zeros)
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        if let Some(b) = self.body_mut() {
            b.set_linvel(velocity, true);
        }
    }

    fn rotational_velocity(&self) -> Vec3 {
        self.body().map(|b| *b.angvel()).unwrap_or_else(Vec3::zeros)
    }

    fn set_rotational_velocity(&mut self, velocity: Vec3) {
        let max = self.max_angular_velocity;
        let clamped = if velocity.norm_squared() > max * max {
            velocity.normalize() * max
        } else {
            velocity
        };
        if let Some(b) = self.body_mut() {
            b.set_angvel(clamped, true);
        }
    }

    fn add_force(&mut self, force: Vec3) {
        if let Some(b) = self.body_mut() {
            b.add_force(force, true);
        }
    }

    fn add_force_impulse(&mut self, impulse: Vec3) {
        if let Some(b) = self.body_mut() {
            b.apply_impulse(impulse, true);
        }
    }

    fn add_angular_force(&mut self, torque: Vec3) {
        if let Some(b) = self.body_mut() {
            b.add_torque(torque, true);
        }
    }

    fn add_rotational_impulse(&mut self, impulse: Vec3) {
        if let Some(b) = self.body_mut() {
            b.apply_torque_impulse(impulse, true);
        }
    }

    fn total_mass(&self) -> f32 {
        self.body().map(|b| b.mass()).unwrap_or(0.0)
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn has_some_collision(&self) -> bool {
        self.colliding
    }

    fn has_physical_body(&self) -> bool {
        self.body().is_some()
    }

    fn is_physically_active(&self) -> bool {
        self.body().is_some_and(|b| b.is_dynamic() && b.is_enabled())
    }

    fn set_friction(&mut self, friction: f32) {
        self.for_each_collider(|c| c.set_friction(friction));
    }

    fn set_restitution(&mut self, restitution: f32) {
        self.for_each_collider(|c| c.set_restitution(restitution));
    }

    fn set_damping(&mut self, linear: f32, angular: f32) {
        if let Some(b) = self.body_mut() {
            b.set_linear_damping(linear);
            b.set_angular_damping(angular);
        }
    }

    fn set_inertia_factor(&mut self, factor: Vec3) {
        let Some(b) = self.body_mut() else {
            return;
        };
        // scale the collider-derived inertia by adding the difference
        let principal = b.mass_properties().local_mprops.principal_inertia();
        let extra = principal.component_mul(&factor.map(|f| (f - 1.0).max(0.0)));
        let props = MassProperties::new(Point::origin(), 0.0, extra);
        b.set_additional_mass_properties(props, true);
    }

    fn set_engine_gravity(&mut self, enabled: bool) {
        if let Some(b) = self.body_mut() {
            b.set_gravity_scale(if enabled { 1.0 } else { 0.0 }, true);
        }
    }

    fn add_vehicle_collision_flag(&mut self) {
        self.for_each_collider(|c| c.set_active_events(c.active_events() | ActiveEvents::COLLISION_EVENTS));
    }

    fn remove_vehicle_collision_flag(&mut self) {
        self.for_each_collider(|c| c.set_active_events(c.active_events() - ActiveEvents::COLLISION_EVENTS));
    }

    fn push_update(&mut self) {
        self.pushed = true;
    }
}

// ============================================
// World
// ============================================

pub struct PhysicsObject {
    pub id: LocalId,
    pub body: RigidBodyHandle,
    pub vehicle: VehicleDynamics,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectUpdate {
    pub id: LocalId,
    pub properties: EntityProperties,
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // Z-up
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline,

    pub schedule: StepSchedule,
    pub terrain: TerrainMap,
    tuning: VehicleTuning,
    objects: BTreeMap<LocalId, PhysicsObject>,
    next_id: LocalId,

    /// Bodies that had an active contact in the last solver step.
    colliding: HashSet<RigidBodyHandle>,
    /// Objects whose vehicle asked for a property update this tick.
    pushed: HashSet<LocalId>,
    updates: Vec<ObjectUpdate>,
}

impl PhysicsWorld {
    pub fn new(config: &ServerConfig) -> Self {
        let [gx, gy, gz] = config.gravity;
        let terrain = TerrainMap::from_config(&config.terrain);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Static ground slab whose top face sits at the lowest terrain height.
        let ground_top = terrain.base_height();
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, 0.0, ground_top - 1.0])
            .build();
        let ground_handle = bodies.insert(ground_rb);
        let ground_collider = ColliderBuilder::cuboid(GROUND_HALF_EXTENT, GROUND_HALF_EXTENT, 1.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_OBJECT))
            .friction(1.2)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        info!(ground = ground_top, water = config.terrain.water_level, "ground inserted");

        Self {
            gravity: vector![gx, gy, gz],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            schedule: StepSchedule::new(),
            terrain,
            tuning: config.vehicle.clone(),
            objects: BTreeMap::new(),
            next_id: 1,
            colliding: HashSet::new(),
            pushed: HashSet::new(),
            updates: Vec::new(),
        }
    }

    /// Insert a dynamic box. Every object carries an (initially inactive) vehicle.
    pub fn spawn_box(&mut self, position: [f32; 3], half_extents: [f32; 3], mass: f32) -> LocalId {
        let id = self.next_id;
        self.next_id += 1;

        let [x, y, z] = position;
        let [hx, hy, hz] = half_extents;
        let volume = 8.0 * hx * hy * hz;
        let density = mass / volume.max(f32::EPSILON);

        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![x, y, z])
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_OBJECT, GROUP_GROUND | GROUP_OBJECT))
            .density(density)
            .friction(0.5)
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        // mass is needed before the first solver step (vehicle refresh reads it)
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }

        self.objects.insert(
            id,
            PhysicsObject { id, body: handle, vehicle: VehicleDynamics::new(id, self.tuning.clone()) },
        );

        info!(id, ?position, mass, "object spawned");
        id
    }

    pub fn remove_object(&mut self, id: LocalId) -> bool {
        let Some(mut obj) = self.objects.remove(&id) else {
            return false;
        };
        obj.vehicle.dispose(&mut self.schedule);
        self.schedule.forget(id);
        self.pushed.remove(&id);
        self.bodies.remove(
            obj.body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            true,
        );
        info!(id, "object removed");
        true
    }

    #[cfg(test)]
    pub fn object_ids(&self) -> impl Iterator<Item = LocalId> + '_ {
        self.objects.keys().copied()
    }

    pub fn vehicle(&self, id: LocalId) -> Option<&VehicleDynamics> {
        self.objects.get(&id).map(|o| &o.vehicle)
    }

    pub fn rigid_body(&self, id: LocalId) -> Option<&RigidBody> {
        self.objects.get(&id).and_then(|o| self.bodies.get(o.body))
    }

    pub fn position(&self, id: LocalId) -> Option<[f32; 3]> {
        self.rigid_body(id).map(|b| v3(b.translation()))
    }

    /// Properties reported at the end of the last tick.
    pub fn updates(&self) -> &[ObjectUpdate] {
        &self.updates
    }

    // ============================================
    // Scripting commands
    // ============================================

    /// Apply one scripting command to object `id`. Returns false when the object is unknown.
    pub fn apply_vehicle_command(&mut self, id: LocalId, command: &VehicleCommand) -> bool {
        let Some(obj) = self.objects.get_mut(&id) else {
            return false;
        };
        let vehicle = &mut obj.vehicle;

        match *command {
            VehicleCommand::SetType(kind) => vehicle.process_type_change(kind, &mut self.schedule),
            VehicleCommand::SetFloat { param, value } => match VehicleParam::from_code(param) {
                Some(p) => vehicle.process_float_param(p, value),
                None => debug!(id, param, "unknown vehicle float param ignored"),
            },
            VehicleCommand::SetVector { param, value } => match VehicleParam::from_code(param) {
                Some(p) => vehicle.process_vector_param(p, Vec3::from(value)),
                None => debug!(id, param, "unknown vehicle vector param ignored"),
            },
            VehicleCommand::SetRotation { param, value } => match VehicleParam::from_code(param) {
                Some(p) => {
                    let [x, y, z, w] = value;
                    let q = Quat::try_new(Quaternion::new(w, x, y, z), 1.0e-6).unwrap_or_else(Quat::identity);
                    vehicle.process_rotation_param(p, q);
                }
                None => debug!(id, param, "unknown vehicle rotation param ignored"),
            },
            VehicleCommand::SetFlags { mask, remove } => vehicle.process_flags(mask, remove),
        }
        true
    }

    // ============================================
    // Tick
    // ============================================

    pub fn step(&mut self, dt: Real) {
        let gravity = self.gravity;
        let max_angvel = self.tuning.max_angular_velocity;

        // 1) deferred mutations
        for (id, taint) in self.schedule.take_taints() {
            let Some(obj) = self.objects.get_mut(&id) else {
                continue;
            };
            match taint {
                Taint::RefreshVehicle => {
                    let colliding = self.colliding.contains(&obj.body);
                    let mut body = RapierVehicleBody::new(
                        &mut self.bodies,
                        &mut self.colliders,
                        obj.body,
                        gravity,
                        colliding,
                        max_angvel,
                    );
                    obj.vehicle.set_physical_parameters(&mut body);
                }
            }
        }

        // 2) hook changes are only applied here, never mid-dispatch
        self.schedule.apply_pending();

        // 3) pre-step
        self.pushed.clear();
        for id in self.schedule.pre_step_subscribers() {
            let Some(obj) = self.objects.get_mut(id) else {
                continue;
            };
            let colliding = self.colliding.contains(&obj.body);
            let mut body = RapierVehicleBody::new(
                &mut self.bodies,
                &mut self.colliders,
                obj.body,
                gravity,
                colliding,
                max_angvel,
            );
            obj.vehicle.step(&mut body, &self.terrain, dt);
            if body.pushed() {
                self.pushed.insert(*id);
            }
        }

        // 4) solver
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters { dt, ..IntegrationParameters::default() },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // 5) vehicle forces are re-applied every tick; contacts for next tick
        for id in self.schedule.pre_step_subscribers() {
            if let Some(b) = self.objects.get(id).and_then(|o| self.bodies.get_mut(o.body)) {
                b.reset_forces(false);
                b.reset_torques(false);
            }
        }
        self.colliding.clear();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            for ch in [pair.collider1, pair.collider2] {
                if let Some(parent) = self.colliders.get(ch).and_then(|c| c.parent()) {
                    self.colliding.insert(parent);
                }
            }
        }

        // 6) post-step
        for id in self.schedule.post_step_subscribers() {
            let Some(obj) = self.objects.get(id) else {
                continue;
            };
            let colliding = self.colliding.contains(&obj.body);
            let body = RapierVehicleBody::new(
                &mut self.bodies,
                &mut self.colliders,
                obj.body,
                gravity,
                colliding,
                max_angvel,
            );
            obj.vehicle.post_step(&body, dt);
        }

        self.reset_runaway_bodies();

        // 7) property updates
        self.updates.clear();
        for obj in self.objects.values() {
            let Some(rb) = self.bodies.get(obj.body) else {
                continue;
            };
            if rb.is_sleeping() && !self.pushed.contains(&obj.id) {
                continue;
            }
            let mut properties = EntityProperties {
                position: *rb.translation(),
                orientation: *rb.rotation(),
                velocity: *rb.linvel(),
                rotational_velocity: *rb.angvel(),
            };
            let colliding = self.colliding.contains(&obj.body);
            let body = RapierVehicleBody::new(
                &mut self.bodies,
                &mut self.colliders,
                obj.body,
                gravity,
                colliding,
                max_angvel,
            );
            obj.vehicle.pre_update_property(&body, &mut properties);
            self.updates.push(ObjectUpdate { id: obj.id, properties });
        }
    }

    /// Put non-finite or far-away bodies back above the terrain.
    fn reset_runaway_bodies(&mut self) {
        for obj in self.objects.values() {
            let Some(body) = self.bodies.get_mut(obj.body) else {
                continue;
            };
            let pos = *body.translation();
            let bad = !pos.iter().all(|c| c.is_finite()) || pos.iter().any(|c| c.abs() > WORLD_LIMIT);
            if !bad {
                continue;
            }

            let ground = self.terrain.height_at(0.0, 0.0);
            let safe = vector![0.0, 0.0, ground + 1.0];
            body.set_translation(safe, true);
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(Vector::zeros(), true);
            warn!(id = obj.id, from = ?v3(&pos), "reset runaway body");
        }
    }
}
