// ==============================================================================
// linear.rs — LINEAR MOTION PIPELINE
// ------------------------------------------------------------------------------
// Stages run in this order, each reading and writing the cached body state:
//   1) linear motor (decaying direction + friction, vehicle frame)
//   2) terrain floor (hard position correction)
//   3) hover (position spring toward the hover target height)
//   4) blocking end point (keep inside the box [0, corner])
//   5) limit motor up (no upward velocity while airborne)
//   6) gravity (vehicle-owned, scaled by buoyancy)
//   7) linear deflection (side/vertical velocity bent onto forward)
//   8) axis lock + velocity clamp
// ==============================================================================

use tracing::trace;

use crate::vehicle::body::{TerrainSource, VehicleBody};
use crate::vehicle::dynamics::{StepEnv, frame_orientation};
use crate::vehicle::known::KnownBody;
use crate::vehicle::math::{Vec3, sorted_clamp_in_range, to_frame, to_world};
use crate::vehicle::params::VehicleParams;
use crate::vehicle::types::VehicleFlags;

/// Hover aims slightly above the target; matches long-standing script behaviour.
const HOVER_TARGET_BIAS: f32 = 0.21728;
/// Lock-height snaps when further than this from the target.
const HOVER_LOCK_TOLERANCE: f32 = 0.2;

pub fn move_linear<B, T>(kb: &mut KnownBody<'_, B>, params: &mut VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    linear_motor(kb, params, env);
    terrain_height_correction(kb, env);
    hover(kb, params, env);
    blocking_end_point(kb, params, env);
    limit_motor_up(kb, params);
    apply_gravity(kb, params, env);
    linear_deflection(kb, params, env);
    lock_axes_and_clamp(kb, params, env);
}

pub(crate) fn linear_motor<B, T>(kb: &mut KnownBody<'_, B>, params: &mut VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    let frame = frame_orientation(kb, params);
    let current = to_frame(&kb.velocity(), &frame);
    let correction = params.linear.correction(&current, env.dt);

    let mut correction_w = to_world(&correction, &frame);
    if params.flags.contains(VehicleFlags::LIMIT_MOTOR_UP) && correction_w.z > 0.0 {
        correction_w.z = 0.0;
    }

    // The world-space correction is rotated by the frame a second time here.
    // Kept as-is: existing vehicles are tuned against this behaviour.
    let velocity = kb.velocity() + to_world(&correction_w, &frame);
    kb.set_velocity(velocity);

    trace!(id = env.id, ?current, decaying = ?params.linear.decaying, ?velocity, "linear motor");
}

pub(crate) fn terrain_height_correction<B, T>(kb: &mut KnownBody<'_, B>, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    let height = kb.terrain_height(env.terrain);
    let mut pos = kb.position();
    if pos.z < height {
        // a force would not get the body back through the ground
        pos.z = height + 1.0;
        kb.set_position(pos);
        trace!(id = env.id, height, "terrain floor");
    }
}

pub(crate) fn hover<B, T>(kb: &mut KnownBody<'_, B>, params: &mut VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    if !params.hover_enabled(env.tuning.hover_timescale_cutoff) {
        return;
    }

    let flags = params.flags;
    let mut target = params.hover_target_height;
    if flags.contains(VehicleFlags::HOVER_WATER_ONLY) {
        target = kb.water_level(env.terrain) + params.hover_height;
    }
    if flags.contains(VehicleFlags::HOVER_TERRAIN_ONLY) {
        target = kb.terrain_height(env.terrain) + params.hover_height;
    }
    if flags.contains(VehicleFlags::HOVER_GLOBAL_HEIGHT) {
        target = params.hover_height;
    }

    let mut pos = kb.position();
    if flags.contains(VehicleFlags::HOVER_UP_ONLY) && pos.z > target {
        target = pos.z;
        // Above the hover height a buoyant vehicle loses its buoyancy.
        if params.buoyancy != 0.0 {
            kb.add_force(env.gravity * env.mass);
        }
    }
    params.hover_target_height = target;

    if flags.contains(VehicleFlags::LOCK_HOVER_HEIGHT) {
        if (pos.z - target).abs() > HOVER_LOCK_TOLERANCE {
            pos.z = target;
            kb.set_position(pos);
        }
        return;
    }

    // positive below the target, negative above
    let error = target + HOVER_TARGET_BIAS - pos.z;
    let mut correction = error / params.hover_timescale * env.dt * params.hover_efficiency;
    let scale = (error * 10.0).abs();
    if scale < 1.0 {
        correction *= scale;
    }

    if correction > 0.0 || !flags.contains(VehicleFlags::HOVER_UP_ONLY) {
        pos.z += correction;
        kb.set_position(pos);
    }

    let mut vel = kb.velocity();
    vel.z = 0.0;
    kb.set_velocity(vel);

    trace!(id = env.id, target, error, correction, "hover");
}

pub(crate) fn blocking_end_point<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    let corner = params.block_exit;
    if corner == Vec3::zeros() {
        return;
    }

    let mut pos = kb.position();
    let moved = env.last_position.map_or_else(Vec3::zeros, |last| pos - last);
    let mut changed = false;

    if pos.x >= corner.x - 1.0 {
        pos.x -= moved.x + 1.0;
        changed = true;
    }
    if pos.y >= corner.y - 1.0 {
        pos.y -= moved.y + 1.0;
        changed = true;
    }
    if pos.z >= corner.z - 1.0 {
        pos.z -= moved.z + 1.0;
        changed = true;
    }
    if pos.x <= 0.0 {
        pos.x += moved.x + 1.0;
        changed = true;
    }
    if pos.y <= 0.0 {
        pos.y += moved.y + 1.0;
        changed = true;
    }

    if changed {
        kb.set_position(pos);
        trace!(id = env.id, ?pos, "blocking end point");
    }
}

pub(crate) fn limit_motor_up<B>(kb: &mut KnownBody<'_, B>, params: &VehicleParams)
where
    B: VehicleBody + ?Sized,
{
    if !params.flags.contains(VehicleFlags::LIMIT_MOTOR_UP) {
        return;
    }
    // going up without touching anything: in the air, drop the climb
    let mut vel = kb.velocity();
    if !kb.has_some_collision() && vel.z > 0.1 {
        vel.z = 0.0;
        kb.set_velocity(vel);
    }
}

pub(crate) fn apply_gravity<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    let mut applied = env.vehicle_gravity * env.mass;
    // probably sitting on the ground: less pull so it does not bounce
    if kb.has_some_collision() && params.kind.is_ground() {
        applied *= env.tuning.ground_gravity_fudge;
    }
    kb.add_force(applied);
}

pub(crate) fn linear_deflection<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    if !env.tuning.enable_linear_deflection {
        return;
    }

    let frame = frame_orientation(kb, params);
    let vel_v = to_frame(&kb.velocity(), &frame);
    let eff = params.linear_deflection_efficiency;
    let ts = params.linear_deflection_timescale;

    let mut deflection = Vec3::zeros();
    deflection.y = sorted_clamp_in_range(0.0, vel_v.y * eff / ts, vel_v.y);
    deflection.x += deflection.y.abs();
    if !params.flags.contains(VehicleFlags::NO_DEFLECTION_UP) {
        deflection.z = sorted_clamp_in_range(0.0, vel_v.z * eff / ts, vel_v.z);
        deflection.x += deflection.z.abs();
    }

    deflection *= env.dt;
    // take from the side and vertical, give to forward
    deflection.y = -deflection.y;
    deflection.z = -deflection.z;

    let mut deflection_w = to_world(&deflection, &frame);
    if env.tuning.linear_deflection_not_colliding_no_z && !kb.has_some_collision() {
        deflection_w.z = 0.0;
    }

    let vel = kb.velocity() + deflection_w;
    kb.set_velocity(vel);
}

pub(crate) fn lock_axes_and_clamp<B, T>(kb: &mut KnownBody<'_, B>, params: &VehicleParams, env: &StepEnv<'_, T>)
where
    B: VehicleBody + ?Sized,
    T: TerrainSource + ?Sized,
{
    let flags = params.flags;
    if flags.intersects(VehicleFlags::NO_AXIS) {
        let mut vel = kb.velocity();
        if flags.contains(VehicleFlags::NO_X) {
            vel.x = 0.0;
        }
        if flags.contains(VehicleFlags::NO_Y) {
            vel.y = 0.0;
        }
        if flags.contains(VehicleFlags::NO_Z) {
            vel.z = 0.0;
        }
        kb.set_velocity(vel);
    }

    let vel = kb.velocity();
    let max = env.tuning.max_linear_velocity;
    let min = env.tuning.min_linear_velocity;
    let len_sq = vel.norm_squared();
    if len_sq > max * max {
        kb.set_velocity(vel / len_sq.sqrt() * max);
    } else if len_sq < min * min {
        kb.set_velocity(Vec3::zeros());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleTuning;
    use crate::vehicle::known::KnownValues;
    use crate::vehicle::math::{INFINITE, Quat};
    use crate::vehicle::mock::{FlatTerrain, MockBody};
    use crate::vehicle::types::{VehicleParam, VehicleType};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn env<'a>(tuning: &'a VehicleTuning, terrain: &'a FlatTerrain, dt: f32) -> StepEnv<'a, FlatTerrain> {
        StepEnv {
            id: 1,
            dt,
            tuning,
            terrain,
            mass: 10.0,
            gravity: Vec3::new(0.0, 0.0, -9.8),
            vehicle_gravity: Vec3::new(0.0, 0.0, -9.8),
            last_position: None,
        }
    }

    #[test]
    fn terrain_floor_lifts_body_one_unit_above_ground() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(25.0, 20.0);
        let env = env(&tuning, &terrain, 0.1);
        let mut body = MockBody::at(Vec3::new(10.0, 10.0, 23.5));
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        terrain_height_correction(&mut kb, &env);
        kb.flush();
        assert_eq!(body.position.z, 26.0);
    }

    #[test]
    fn terrain_floor_leaves_airborne_body_alone() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(25.0, 20.0);
        let env = env(&tuning, &terrain, 0.1);
        let mut body = MockBody::at(Vec3::new(10.0, 10.0, 40.0));
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        terrain_height_correction(&mut kb, &env);
        assert!(!kb.flush());
    }

    #[test]
    fn blocking_end_point_pulls_back_inside() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let mut env = env(&tuning, &terrain, 0.1);
        env.last_position = Some(Vec3::new(9.0, 5.0, 5.0));

        let mut params = VehicleParams::default();
        params.set_vector(VehicleParam::BlockExit, Vec3::new(10.0, 10.0, 10.0));

        let mut body = MockBody::at(Vec3::new(9.6, 5.0, 5.0));
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        blocking_end_point(&mut kb, &params, &env);
        kb.flush();
        assert_relative_eq!(body.position.x, 8.0, epsilon = 1e-5);
        assert!(body.position.x <= 10.0 - 1.0);
        assert_eq!(body.position.y, 5.0);
        assert_eq!(body.position.z, 5.0);
    }

    #[test]
    fn zero_corner_disables_blocking() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.1);
        let params = VehicleParams::default();
        let mut body = MockBody::at(Vec3::new(-5.0, -5.0, 5.0));
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        blocking_end_point(&mut kb, &params, &env);
        assert!(!kb.flush());
    }

    #[test]
    fn lock_height_hover_converges_and_stays() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.1);

        let mut params = VehicleParams::default();
        params.set_float(VehicleParam::HoverHeight, 40.0);
        params.set_float(VehicleParam::HoverTimescale, 1.0);
        params.set_float(VehicleParam::HoverEfficiency, 0.5);
        params.set_flags(
            (VehicleFlags::HOVER_GLOBAL_HEIGHT | VehicleFlags::LOCK_HOVER_HEIGHT).bits() as i32,
            false,
        );

        let mut body = MockBody::at(Vec3::new(10.0, 10.0, 30.0));
        let mut known = KnownValues::default();
        for _ in 0..20 {
            known.forget();
            let mut kb = known.bind(&mut body);
            hover(&mut kb, &mut params, &env);
            kb.flush();
            assert!((body.position.z - 40.0).abs() <= 0.2);
            // drift a little between steps
            body.position.z -= 0.05;
        }
        assert_eq!(params.hover_target_height, 40.0);
    }

    #[test]
    fn hover_spring_moves_toward_target_and_zeroes_vertical_velocity() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(20.0, 18.0);
        let env = env(&tuning, &terrain, 0.1);

        let mut params = VehicleParams::default();
        params.set_float(VehicleParam::HoverHeight, 2.0);
        params.set_float(VehicleParam::HoverTimescale, 1.0);
        params.set_float(VehicleParam::HoverEfficiency, 1.0);
        params.set_flags(VehicleFlags::HOVER_TERRAIN_ONLY.bits() as i32, false);

        let mut body = MockBody::at(Vec3::new(10.0, 10.0, 20.0));
        body.velocity = Vec3::new(1.0, 0.0, -3.0);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        hover(&mut kb, &mut params, &env);
        kb.flush();

        let error = 22.0 + 0.21728 - 20.0;
        assert_relative_eq!(body.position.z, 20.0 + error * 0.1, epsilon = 1e-4);
        assert_eq!(body.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(params.hover_target_height, 22.0);
    }

    #[test]
    fn hover_near_target_is_downscaled() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.1);
        let mut params = VehicleParams::default();
        params.set_float(VehicleParam::HoverHeight, 10.0);
        params.set_float(VehicleParam::HoverTimescale, 1.0);
        params.set_float(VehicleParam::HoverEfficiency, 1.0);
        params.set_flags(VehicleFlags::HOVER_GLOBAL_HEIGHT.bits() as i32, false);

        // error of 0.05 -> correction scaled by 0.5
        let z = 10.0 + 0.21728 - 0.05;
        let mut body = MockBody::at(Vec3::new(1.0, 1.0, z));
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        hover(&mut kb, &mut params, &env);
        kb.flush();
        assert_abs_diff_eq!(body.position.z - z, 0.05 * 0.1 * 0.5, epsilon = 1e-4);
    }

    #[test]
    fn up_only_hover_above_target_reapplies_gravity_and_does_not_pull_down() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 20.0);
        let env = env(&tuning, &terrain, 0.1);
        let mut params = VehicleParams::default();
        params.apply_preset(VehicleType::Boat);
        params.set_float(VehicleParam::HoverHeight, 1.0);

        let mut body = MockBody::at(Vec3::new(1.0, 1.0, 30.0));
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        hover(&mut kb, &mut params, &env);
        kb.flush();
        assert_eq!(params.hover_target_height, 30.0);
        assert_relative_eq!(body.total_force(), Vec3::new(0.0, 0.0, -98.0), epsilon = 1e-4);
        // 0.21728 above target is a positive correction, applied
        assert!(body.position.z > 30.0);
    }

    #[test]
    fn limit_motor_up_drops_climb_only_when_airborne() {
        let mut params = VehicleParams::default();
        params.set_flags(VehicleFlags::LIMIT_MOTOR_UP.bits() as i32, false);

        let mut body = MockBody::default();
        body.velocity = Vec3::new(2.0, 0.0, 3.0);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        limit_motor_up(&mut kb, &params);
        kb.flush();
        assert_eq!(body.velocity, Vec3::new(2.0, 0.0, 0.0));

        let mut grounded = MockBody { colliding: true, ..MockBody::default() };
        grounded.velocity = Vec3::new(2.0, 0.0, 3.0);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut grounded);
        limit_motor_up(&mut kb, &params);
        assert!(!kb.flush());
    }

    #[test]
    fn gravity_scales_with_buoyancy_and_ground_fudge() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let mut params = VehicleParams::default();
        params.apply_preset(VehicleType::Car);
        params.set_float(VehicleParam::Buoyancy, 0.5);

        let mut env = env(&tuning, &terrain, 0.1);
        env.vehicle_gravity = params.vehicle_gravity(env.gravity);

        let mut body = MockBody::default();
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        apply_gravity(&mut kb, &params, &env);
        kb.flush();
        assert_relative_eq!(body.total_force().z, -9.8 * 10.0 * 0.5, epsilon = 1e-4);

        let mut on_ground = MockBody { colliding: true, ..MockBody::default() };
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut on_ground);
        apply_gravity(&mut kb, &params, &env);
        kb.flush();
        assert_relative_eq!(on_ground.total_force().z, -9.8 * 10.0 * 0.5 * 0.2, epsilon = 1e-4);
    }

    #[test]
    fn linear_motor_drives_toward_requested_direction() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.1);

        let mut params = VehicleParams::default();
        params.linear.timescale = 1.0;
        params.linear.friction_timescale = Vec3::repeat(INFINITE);
        params.set_vector(VehicleParam::LinearMotorDirection, Vec3::new(10.0, 0.0, 0.0));

        let mut body = MockBody::default();
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        linear_motor(&mut kb, &mut params, &env);
        kb.flush();
        assert_relative_eq!(body.velocity, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_eq!(params.linear.requested, None);
    }

    #[test]
    fn linear_motor_limit_up_removes_upward_correction() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.1);

        let mut params = VehicleParams::default();
        params.set_flags(VehicleFlags::LIMIT_MOTOR_UP.bits() as i32, false);
        params.set_vector(VehicleParam::LinearMotorDirection, Vec3::new(0.0, 0.0, 10.0));

        let mut body = MockBody::default();
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        linear_motor(&mut kb, &mut params, &env);
        kb.flush();
        assert_eq!(body.velocity.z, 0.0);
    }

    #[test]
    fn linear_motor_rotates_correction_by_frame_twice() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 1.0);

        let mut params = VehicleParams::default();
        params.linear.timescale = 1.0;
        params.set_vector(VehicleParam::LinearMotorDirection, Vec3::new(1.0, 0.0, 0.0));

        let mut body = MockBody::default();
        body.orientation = Quat::from_euler_angles(0.0, 0.0, std::f32::consts::FRAC_PI_2);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        linear_motor(&mut kb, &mut params, &env);
        kb.flush();
        // forward (+X) rotated by 90 degrees of yaw twice points along -X
        assert_relative_eq!(body.velocity, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn linear_deflection_bends_sideways_motion_forward() {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.5);

        let mut params = VehicleParams::default();
        params.set_float(VehicleParam::LinearDeflectionEfficiency, 1.0);
        params.set_float(VehicleParam::LinearDeflectionTimescale, 1.0);

        let mut body = MockBody { colliding: true, ..MockBody::default() };
        body.velocity = Vec3::new(0.0, 4.0, 0.0);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        linear_deflection(&mut kb, &params, &env);
        kb.flush();
        assert_relative_eq!(body.velocity, Vec3::new(2.0, 2.0, 0.0), epsilon = 1e-5);
    }

    fn deflect_climb(flags: VehicleFlags, colliding: bool) -> Vec3 {
        let tuning = VehicleTuning::default();
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.5);

        let mut params = VehicleParams::default();
        params.set_float(VehicleParam::LinearDeflectionEfficiency, 1.0);
        params.set_float(VehicleParam::LinearDeflectionTimescale, 1.0);
        params.set_flags(flags.bits() as i32, false);

        let mut body = MockBody { colliding, ..MockBody::default() };
        body.velocity = Vec3::new(0.0, 0.0, 4.0);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        linear_deflection(&mut kb, &params, &env);
        kb.flush();
        body.velocity
    }

    #[test]
    fn linear_deflection_bends_climb_forward_when_touching() {
        // z 4 -> deflect 4 * 0.5 = 2 taken from z, given to x
        let vel = deflect_climb(VehicleFlags::empty(), true);
        assert_relative_eq!(vel, Vec3::new(2.0, 0.0, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn no_deflection_up_leaves_climb_alone() {
        let vel = deflect_climb(VehicleFlags::NO_DEFLECTION_UP, true);
        assert_relative_eq!(vel, Vec3::new(0.0, 0.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn airborne_deflection_has_no_vertical_part() {
        // forward part is kept, the world-z removal is dropped
        let vel = deflect_climb(VehicleFlags::empty(), false);
        assert_relative_eq!(vel, Vec3::new(2.0, 0.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn axis_lock_and_velocity_clamp() {
        let tuning = VehicleTuning { max_linear_velocity: 5.0, ..VehicleTuning::default() };
        let terrain = FlatTerrain::new(0.0, 0.0);
        let env = env(&tuning, &terrain, 0.1);

        let mut params = VehicleParams::default();
        params.set_flags(VehicleFlags::NO_Y.bits() as i32, false);
        let mut body = MockBody::default();
        body.velocity = Vec3::new(30.0, 7.0, 40.0);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut body);
        lock_axes_and_clamp(&mut kb, &params, &env);
        kb.flush();
        assert_relative_eq!(body.velocity, Vec3::new(3.0, 0.0, 4.0), epsilon = 1e-5);

        let params = VehicleParams::default();
        let mut slow = MockBody::default();
        slow.velocity = Vec3::new(0.0005, 0.0, 0.0);
        let mut known = KnownValues::default();
        let mut kb = known.bind(&mut slow);
        lock_axes_and_clamp(&mut kb, &params, &env);
        kb.flush();
        assert_eq!(slow.velocity, Vec3::zeros());
    }
}
