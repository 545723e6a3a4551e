//! Lateral acceleration demands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::*;
use util::maths::cross_2d;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Feedback lateral acceleration from the error between the current and
/// reference air velocities.
///
/// Above 90 degrees of heading error the demand is held at its maximum. The
/// demand is scaled back from the reference airspeed to the current airspeed.
pub fn lateral_accel(
    air_vel: &Vector2<f64>,
    air_vel_ref: &Vector2<f64>,
    airspeed_ms: f64,
    airspeed_ref_ms: f64,
    p_gain: f64
) -> f64 {
    let dot_air_vel_err = air_vel.dot(air_vel_ref);
    let cross_air_vel_err = cross_2d(air_vel, air_vel_ref);

    if dot_air_vel_err < 0.0 {
        let max_accel = airspeed_ms * airspeed_ms;

        p_gain * if cross_air_vel_err < 0.0 { -max_accel } else { max_accel }
    }
    else {
        p_gain * cross_air_vel_err * airspeed_ms / airspeed_ref_ms.max(EPSILON)
    }
}

/// Curvature of the path offset to pass through the aircraft.
///
/// For a loiter this is the curvature of the concentric circle the aircraft
/// is on. The radius is floored at `MIN_RADIUS_M`.
pub fn path_frame_curvature(path_curvature_m: f64, signed_track_error_m: f64) -> f64 {
    path_curvature_m / (1.0 - path_curvature_m * signed_track_error_m)
        .max(path_curvature_m.abs() * MIN_RADIUS_M)
}

/// Feedforward lateral acceleration needed to follow the path's curvature.
///
/// Evaluated at the closest point on the path as though the aircraft were on
/// it with no heading error, then ramped in with the track proximity and
/// faded out as the bearing becomes infeasible.
pub fn lateral_accel_ff(
    unit_path_tangent: &Vector2<f64>,
    ground_vel: &Vector2<f64>,
    wind_dot_upt: f64,
    wind_cross_upt: f64,
    airspeed_ms: f64,
    signed_track_error_m: f64,
    path_curvature_m: f64,
    track_proximity: f64,
    feas: f64
) -> f64 {
    let path_frame_curvature = path_frame_curvature(path_curvature_m, signed_track_error_m);

    // Only forward motion along the track
    let tangent_ground_speed_ms = ground_vel.dot(unit_path_tangent).max(0.0);

    let path_frame_rate = path_frame_curvature * tangent_ground_speed_ms;

    // Ground over air speed along the track
    let speed_ratio = 1.0
        + wind_dot_upt / project_airsp_on_bearing(airspeed_ms, wind_cross_upt).max(EPSILON);

    airspeed_ms * track_proximity * feas * speed_ratio * path_frame_rate
}
