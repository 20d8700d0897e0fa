// ==============================================================================
// angular.rs — ANGULAR MOTION PIPELINE
// ------------------------------------------------------------------------------
// Everything here adds into the cached rotational velocity:
//   1) angular motor (decaying direction + friction, vehicle frame)
//   2) vertical attraction (roll/pitch back toward upright)
//   3) angular deflection (nose toward the direction of travel)
//   4) banking (roll rate coupled into yaw)
// then a near-zero result is snapped to exactly zero and the motor-offset
// torque is applied (currently always zero).
// ==============================================================================

use tracing::trace;

use crate::vehicle::body::{TerrainSource, VehicleBody};
use crate::vehicle::dynamics::{StepEnv, frame_orientation};
use crate::vehicle::known::KnownBody;
use crate::vehicle::math::{Vec3, approx_zero, clamp_in_range, to_frame, to_world, zero_nan};
use crate::vehicle::params::VehicleParams;
use crate::vehicle::types::VehicleFlags;

/// Banking never asks for more than this many radians/sec of yaw.
const MAX_BANKING_YAW: f32 = 12.0;

pub fn move_angular<B, T>(kb: &mut KnownBody<'_, B>, params: &mut VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    angular_turning(kb, params, env);
    vertical_attraction(kb, params, env);
    angular_deflection(kb, params, env);
    banking(kb, params, env);

    if approx_zero(&kb.rotational_velocity(), env.tuning.rotational_velocity_epsilon) {
        kb.set_rotational_velocity(Vec3::zeros());
    }

    offset_torque(kb, params, env);
}

pub(crate) fn angular_turning<B, T>(kb: &mut KnownBody<'_, B>, params: &mut VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    let frame = frame_orientation(kb, params);
    let current = to_frame(&kb.rotational_velocity(), &frame);
    let correction = params.angular.correction(&current, env.dt);

    let rotvel = kb.rotational_velocity() + to_world(&correction, &frame);
    kb.set_rotational_velocity(rotvel);

    trace!(id = env.id, ?current, ?correction, ?rotvel, "angular motor");
}

pub(crate) fn vertical_attraction<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    if !env.tuning.enable_angular_vertical_attraction || !params.vertical_attraction_enabled() {
        return;
    }

    // tilt of the vehicle with its reference frame taken out
    let tilt = kb.orientation() * params.reference_frame.inverse();
    let (roll, pitch, _yaw) = tilt.euler_angles();

    let mut error = Vec3::new(-roll, -pitch, 0.0);
    if params.flags.contains(VehicleFlags::LIMIT_ROLL_ONLY) {
        error.y = 0.0;
    }
    error *= params.vertical_attraction_efficiency * env.dt / params.vertical_attraction_timescale;

    // roll/pitch are about the vehicle's own axes
    let error_w = to_world(&error, &tilt);
    let rotvel = kb.rotational_velocity() + error_w;
    kb.set_rotational_velocity(rotvel);

    trace!(id = env.id, roll, pitch, ?error_w, "vertical attraction");
}

pub(crate) fn angular_deflection<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    if !env.tuning.enable_angular_deflection || params.angular_deflection_efficiency == 0.0 {
        return;
    }

    let frame = frame_orientation(kb, params);
    let forward = to_frame(&kb.velocity(), &frame);

    let mut moving = forward * forward.x.signum();
    if forward.x.abs() < 0.001 {
        moving = Vec3::new(0.001, forward.y, forward.z);
    }

    let feff = env.dt * params.angular_deflection_efficiency / params.angular_deflection_timescale;
    let mut delta = Vec3::zeros();
    if moving.z.abs() > 0.01 {
        delta.y = -moving.z.atan2(moving.x) * feff;
    }
    if moving.y.abs() > 0.01 {
        delta.z = moving.y.atan2(moving.x) * feff;
    }

    let rotvel = kb.rotational_velocity() + to_world(&delta, &frame);
    kb.set_rotational_velocity(rotvel);

    trace!(id = env.id, ?moving, ?delta, "angular deflection");
}

pub(crate) fn banking<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    // banking only makes sense with vertical attraction on
    if !env.tuning.enable_angular_banking
        || params.banking_efficiency == 0.0
        || !params.vertical_attraction_enabled()
    {
        return;
    }

    let frame = frame_orientation(kb, params);
    let yaw = to_frame(&kb.rotational_velocity(), &frame).z * params.banking_efficiency;
    let forward_speed = to_frame(&kb.velocity(), &frame).x;

    // static turn + speed-scaled turn
    let mix = params.banking_mix;
    let mixed = yaw * (1.0 - mix) + yaw * mix * forward_speed.abs();
    let mixed = clamp_in_range(-MAX_BANKING_YAW, mixed, MAX_BANKING_YAW);

    let contribution = Vec3::new(-mixed, 0.0, 0.0) * env.dt / params.banking_timescale;
    let rotvel = kb.rotational_velocity() + to_world(&contribution, &frame);
    kb.set_rotational_velocity(rotvel);

    trace!(id = env.id, yaw, mixed, ?contribution, "banking");
}

pub(crate) fn offset_torque<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    if params.linear_motor_offset == Vec3::zeros() {
        return;
    }
    // Torque from pushing off-centre (offset x applied impulse) is not wired
    // up; the term stays zero until the linear stage reports its impulse.
    let torque = zero_nan(Vec3::zeros());
    kb.add_angular_force(torque * env.mass);
}
