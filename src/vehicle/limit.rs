//! Rotation limiter: roll-frame bounds and rotation lock, applied after both
//! motion pipelines.
//!
//! The roll-frame clamp compares raw quaternion components against the
//! reference components. It is not a geometric clamp and its behaviour near
//! the ±180° wrap is unspecified.
// vehicle/limit.rs
use rapier3d::na::Quaternion;
use tracing::trace;

use crate::vehicle::body::VehicleBody;
use crate::vehicle::known::KnownBody;
use crate::vehicle::math::Quat;
use crate::vehicle::params::VehicleParams;
use crate::vehicle::types::VehicleFlags;

const NORMALIZE_EPSILON: f32 = 1.0e-6;

pub fn limit_rotation<B>(kb: &mut KnownBody<'_, B>, params: &VehicleParams)
where
    B: VehicleBody + ?Sized,
{
    let lock = params.flags.contains(VehicleFlags::LOCK_ROTATION);
    let roll = params.roll_frame.filter(|r| *r != Quat::identity());
    if roll.is_none() && !lock {
        return;
    }

    let rot = kb.orientation();
    let (mut x, mut y) = (rot.i, rot.j);

    if let Some(r) = roll {
        if rot.i >= r.i {
            x = rot.i - r.i / 2.0;
        }
        if rot.j >= r.j {
            y = rot.j - r.j / 2.0;
        }
        if rot.i <= -r.i {
            x = rot.i + r.i / 2.0;
        }
        if rot.j <= -r.j {
            y = rot.j + r.j / 2.0;
        }
    }

    if lock {
        x = 0.0;
        y = 0.0;
    }

    if x == rot.i && y == rot.j {
        return;
    }

    let limited = Quat::try_new(Quaternion::new(rot.w, x, y, rot.k), NORMALIZE_EPSILON)
        .unwrap_or_else(Quat::identity);
    kb.set_orientation(limited);
    trace!(before = ?rot, after = ?limited, "limit rotation");
}
