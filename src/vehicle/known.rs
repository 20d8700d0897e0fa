// ==============================================================================
// known.rs — PER-STEP KNOWN-VALUE CACHE
// ------------------------------------------------------------------------------
// Sits between the motion pipelines and the physics body:
// - state fields (position, orientation, velocity, rotational velocity) are
//   fetched from the body on first read in a step and cached afterwards
// - accumulators (force, impulse, angular force, rotational impulse) start at
//   zero on first write and add up after that
// - every field has its own fetched/changed record
//
// flush() writes changed fields back in a fixed order:
//   position, orientation, velocity, force, impulse,
//   rotational velocity, rotational impulse, rotational force
// and then asks for exactly one property update. A second flush with no
// writes in between touches nothing.
// ==============================================================================

use crate::vehicle::body::{TerrainSource, VehicleBody};
use crate::vehicle::math::{Quat, Vec3};

#[derive(Debug, Clone, Copy)]
struct Known<T> {
    value: T,
    fetched: bool,
    changed: bool,
}

impl<T: Copy> Known<T> {
    fn new(value: T) -> Self {
        Self { value, fetched: false, changed: false }
    }

    fn get(&mut self, fetch: impl FnOnce() -> T) -> T {
        if !self.fetched {
            self.value = fetch();
            self.fetched = true;
        }
        self.value
    }

    fn set(&mut self, value: T) {
        self.value = value;
        self.fetched = true;
        self.changed = true;
    }

    fn take_changed(&mut self) -> Option<T> {
        if self.changed {
            self.changed = false;
            Some(self.value)
        } else {
            None
        }
    }

    fn forget(&mut self) {
        self.fetched = false;
        self.changed = false;
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    value: Vec3,
    changed: bool,
}

impl Accumulator {
    fn add(&mut self, v: Vec3) {
        if !self.changed {
            self.value = Vec3::zeros();
        }
        self.value += v;
        self.changed = true;
    }

    fn take_changed(&mut self) -> Option<Vec3> {
        if self.changed {
            self.changed = false;
            Some(std::mem::replace(&mut self.value, Vec3::zeros()))
        } else {
            None
        }
    }
}

/// Height lookup memoised on the queried position.
#[derive(Debug, Clone, Copy, Default)]
struct HeightMemo {
    at: Option<Vec3>,
    value: f32,
}

impl HeightMemo {
    fn get(&mut self, pos: Vec3, lookup: impl FnOnce() -> f32) -> f32 {
        if self.at != Some(pos) {
            self.value = lookup();
            self.at = Some(pos);
        }
        self.value
    }
}

#[derive(Debug, Clone)]
pub struct KnownValues {
    position: Known<Vec3>,
    orientation: Known<Quat>,
    velocity: Known<Vec3>,
    rotational_velocity: Known<Vec3>,
    force: Accumulator,
    impulse: Accumulator,
    rotational_force: Accumulator,
    rotational_impulse: Accumulator,
    terrain_height: HeightMemo,
    water_level: HeightMemo,
}

impl Default for KnownValues {
    fn default() -> Self {
        Self {
            position: Known::new(Vec3::zeros()),
            orientation: Known::new(Quat::identity()),
            velocity: Known::new(Vec3::zeros()),
            rotational_velocity: Known::new(Vec3::zeros()),
            force: Accumulator::default(),
            impulse: Accumulator::default(),
            rotational_force: Accumulator::default(),
            rotational_impulse: Accumulator::default(),
            terrain_height: HeightMemo::default(),
            water_level: HeightMemo::default(),
        }
    }
}

impl KnownValues {
    /// Drop everything cached by the previous step.
    pub fn forget(&mut self) {
        self.position.forget();
        self.orientation.forget();
        self.velocity.forget();
        self.rotational_velocity.forget();
        self.force = Accumulator::default();
        self.impulse = Accumulator::default();
        self.rotational_force = Accumulator::default();
        self.rotational_impulse = Accumulator::default();
        self.terrain_height = HeightMemo::default();
        self.water_level = HeightMemo::default();
    }

    pub fn has_changes(&self) -> bool {
        self.position.changed
            || self.orientation.changed
            || self.velocity.changed
            || self.rotational_velocity.changed
            || self.force.changed
            || self.impulse.changed
            || self.rotational_force.changed
            || self.rotational_impulse.changed
    }

    /// Write changed fields back to `body`. Returns whether anything was written.
    pub fn flush<B: VehicleBody + ?Sized>(&mut self, body: &mut B) -> bool {
        if !self.has_changes() {
            return false;
        }
        if let Some(p) = self.position.take_changed() {
            body.set_position(p);
        }
        if let Some(q) = self.orientation.take_changed() {
            body.set_orientation(q);
        }
        if let Some(v) = self.velocity.take_changed() {
            body.set_velocity(v);
        }
        if let Some(f) = self.force.take_changed() {
            body.add_force(f);
        }
        if let Some(i) = self.impulse.take_changed() {
            body.add_force_impulse(i);
        }
        if let Some(w) = self.rotational_velocity.take_changed() {
            body.set_rotational_velocity(w);
        }
        if let Some(i) = self.rotational_impulse.take_changed() {
            body.add_rotational_impulse(i);
        }
        if let Some(t) = self.rotational_force.take_changed() {
            body.add_angular_force(t);
        }
        body.push_update();
        true
    }

    pub fn bind<'a, B: VehicleBody + ?Sized>(&'a mut self, body: &'a mut B) -> KnownBody<'a, B> {
        KnownBody { body, known: self }
    }
}

/// A body seen through the known-value cache for the duration of one step.
pub struct KnownBody<'a, B: VehicleBody + ?Sized> {
    body: &'a mut B,
    known: &'a mut KnownValues,
}

impl<B: VehicleBody + ?Sized> KnownBody<'_, B> {
    pub fn position(&mut self) -> Vec3 {
        let body = &*self.body;
        self.known.position.get(|| body.position())
    }

    pub fn set_position(&mut self, p: Vec3) {
        self.known.position.set(p);
    }

    pub fn orientation(&mut self) -> Quat {
        let body = &*self.body;
        self.known.orientation.get(|| body.orientation())
    }

    pub fn set_orientation(&mut self, q: Quat) {
        self.known.orientation.set(q);
    }

    pub fn velocity(&mut self) -> Vec3 {
        let body = &*self.body;
        self.known.velocity.get(|| body.velocity())
    }

    pub fn set_velocity(&mut self, v: Vec3) {
        self.known.velocity.set(v);
    }

    pub fn rotational_velocity(&mut self) -> Vec3 {
        let body = &*self.body;
        self.known.rotational_velocity.get(|| body.rotational_velocity())
    }

    pub fn set_rotational_velocity(&mut self, w: Vec3) {
        self.known.rotational_velocity.set(w);
    }

    pub fn add_force(&mut self, f: Vec3) {
        self.known.force.add(f);
    }

    pub fn add_force_impulse(&mut self, i: Vec3) {
        self.known.impulse.add(i);
    }

    pub fn add_angular_force(&mut self, t: Vec3) {
        self.known.rotational_force.add(t);
    }

    pub fn add_rotational_impulse(&mut self, i: Vec3) {
        self.known.rotational_impulse.add(i);
    }

    pub fn terrain_height<T: TerrainSource + ?Sized>(&mut self, terrain: &T) -> f32 {
        let pos = self.position();
        self.known.terrain_height.get(pos, || terrain.height_at(pos.x, pos.y))
    }

    pub fn water_level<T: TerrainSource + ?Sized>(&mut self, terrain: &T) -> f32 {
        let pos = self.position();
        self.known.water_level.get(pos, || terrain.water_level_at(pos.x, pos.y))
    }

    pub fn has_some_collision(&self) -> bool {
        self.body.has_some_collision()
    }

    pub fn flush(&mut self) -> bool {
        self.known.flush(&mut *self.body)
    }
}
