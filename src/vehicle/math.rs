//! Small math helpers shared by the motion pipelines.
// vehicle/math.rs
use rapier3d::na::{UnitQuaternion, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Quat = UnitQuaternion<f32>;

/// Friction timescale sentinel meaning "no friction on this axis".
pub const INFINITE: f32 = 12345.6;

/// Smallest timescale any setter will accept (divisor guard).
pub const MIN_TIMESCALE: f32 = 0.01;

#[inline]
pub fn infinite_vector() -> Vec3 {
    Vec3::new(INFINITE, INFINITE, INFINITE)
}

#[inline]
pub fn clamp_in_range(low: f32, val: f32, high: f32) -> f32 {
    low.max(val.min(high))
}

/// Clamp with bounds given in either order.
#[inline]
pub fn sorted_clamp_in_range(a: f32, val: f32, b: f32) -> f32 {
    if a > b { clamp_in_range(b, val, a) } else { clamp_in_range(a, val, b) }
}

/// Per-axis fraction of velocity removed by friction this step.
/// An axis whose timescale is the infinite sentinel contributes exactly 0.
pub fn friction_factor(friction: &Vec3, dt: f32) -> Vec3 {
    if *friction == infinite_vector() {
        return Vec3::zeros();
    }
    let axis = |t: f32| if t == INFINITE { 0.0 } else { 1.0 / t };
    Vec3::new(axis(friction.x), axis(friction.y), axis(friction.z)) * dt
}

/// World-space vector expressed in the given vehicle frame.
#[inline]
pub fn to_frame(v: &Vec3, frame: &Quat) -> Vec3 {
    frame.inverse_transform_vector(v)
}

/// Vehicle-frame vector expressed in world space.
#[inline]
pub fn to_world(v: &Vec3, frame: &Quat) -> Vec3 {
    frame.transform_vector(v)
}

/// Replace NaN components with zero.
#[inline]
pub fn zero_nan(mut v: Vec3) -> Vec3 {
    for c in v.iter_mut() {
        if c.is_nan() {
            *c = 0.0;
        }
    }
    v
}

#[inline]
pub fn approx_zero(v: &Vec3, tolerance: f32) -> bool {
    v.norm() <= tolerance
}
