//! Stability bounded gain scheduling
//!
//! The guidance law's proportional gain and time constant are derived from a
//! single period and the damping ratio. The nominal period from the
//! parameters is bounded below for stability against the roll response, and
//! optionally above so the aircraft can hold curved tracks in wind.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::{FRAC_PI_2, PI};

// Internal
use super::*;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GuidCtrl {
    /// Adapt the control period to the current flight condition.
    ///
    /// If lower bounding is enabled the nominal period is raised to at least
    /// the (safety factored) lower bound. Only then, if upper bounding is
    /// enabled and the period violates a finite upper bound, the period is
    /// reduced towards the upper bound, never below the lower bound. With
    /// `ramp_in_adapted_period` the reduction is blended in with the track
    /// proximity, so that it only takes full effect on the track.
    pub(crate) fn adapt_period(
        &self,
        ground_speed_ms: f64,
        airspeed_ms: f64,
        wind_ratio: f64,
        track_error_m: f64,
        path_curvature_m: f64,
        feas_on_track: f64
    ) -> f64 {
        let mut period_s = self.params.period_s;

        if !self.params.en_period_lb {
            return period_s
        }

        let air_turn_rate_rads = (path_curvature_m * airspeed_ms).abs();
        let wind_factor = wind_factor(wind_ratio);

        let period_lb_s = self.period_lb(air_turn_rate_rads, wind_factor, feas_on_track);
        period_s = (period_lb_s * PERIOD_SAFETY_FACTOR).max(period_s);

        let period_ub_s = self.period_ub(air_turn_rate_rads, wind_factor, feas_on_track);

        if self.params.en_period_ub && period_ub_s.is_finite() && period_s > period_ub_s {
            // Prefer the lower bound if the two conflict
            let period_adapted_s = (period_lb_s * PERIOD_SAFETY_FACTOR).max(period_ub_s);

            // Track proximity with the lower bounded period. The adapted gains
            // and the proximity depend on each other, so this is only an
            // approximation.
            let time_const_s = time_const(period_s, self.params.damping);
            let track_error_bound_m = track_error_bound(ground_speed_ms, time_const_s);
            let normalized_track_error =
                normalized_track_error(track_error_m, track_error_bound_m);
            let track_proximity = track_proximity(look_ahead_angle(normalized_track_error));

            period_s = if self.params.ramp_in_adapted_period {
                period_adapted_s * track_proximity + (1.0 - track_proximity) * period_s
            }
            else {
                period_adapted_s
            };
        }

        period_s
    }

    /// Lower bound on the period for stability with respect to the roll time
    /// constant.
    ///
    /// The bound for straight tracks in no wind (or low damping) is used
    /// unless there is both curvature and wind, in which case it is blended
    /// with the curved & windy bound by the on track feasibility.
    pub(crate) fn period_lb(
        &self,
        air_turn_rate_rads: f64,
        wind_factor: f64,
        feas_on_track: f64
    ) -> f64 {
        let roll_time_const_s = self.params.roll_time_const_s;
        let damping = self.params.damping;

        let period_lb_s = PI * roll_time_const_s / damping;

        if air_turn_rate_rads * wind_factor < EPSILON || damping < 0.5 {
            period_lb_s
        }
        else {
            let period_windy_curved_damped_s = 4.0 * PI * roll_time_const_s * damping;

            period_windy_curved_damped_s * feas_on_track + (1.0 - feas_on_track) * period_lb_s
        }
    }

    /// Upper bound on the period for track keeping on curved paths in wind.
    ///
    /// Returns infinity if there is no curvature or wind to consider. The
    /// turn rate is scaled by the on track feasibility so that curvature is
    /// ignored when the track can't be held anyway.
    pub(crate) fn period_ub(
        &self,
        air_turn_rate_rads: f64,
        wind_factor: f64,
        feas_on_track: f64
    ) -> f64 {
        let denom = air_turn_rate_rads * wind_factor * feas_on_track;

        if air_turn_rate_rads * wind_factor > EPSILON && denom > 0.0 {
            4.0 * PI * self.params.damping / denom
        }
        else {
            std::f64::INFINITY
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Approximate severity of the wind, mapping a wind ratio of 0 to 0 and a
/// wind ratio of 1 or more to 2.
pub fn wind_factor(wind_ratio: f64) -> f64 {
    2.0 * (1.0 - (1.0 - wind_ratio.min(1.0)).sqrt())
}

/// Proportional gain for the given period and damping ratio.
pub fn p_gain(period_s: f64, damping: f64) -> f64 {
    4.0 * PI * damping / period_s
}

/// Time constant for the given period and damping ratio.
pub fn time_const(period_s: f64, damping: f64) -> f64 {
    period_s * damping
}

/// Track error at which the guidance steers directly at the path.
///
/// Below 1 m/s of ground speed the bound is blended onto a quadratic so that
/// it never reaches zero.
pub fn track_error_bound(ground_speed_ms: f64, time_const_s: f64) -> f64 {
    if ground_speed_ms > 1.0 {
        ground_speed_ms * time_const_s
    }
    else {
        0.5 * time_const_s * (ground_speed_ms * ground_speed_ms + 1.0)
    }
}

/// Track error normalised by its bound, in `[0, 1]`.
pub fn normalized_track_error(track_error_m: f64, track_error_bound_m: f64) -> f64 {
    clamp(&(track_error_m / track_error_bound_m.max(EPSILON)), &0.0, &1.0)
}

/// Look ahead angle from the path normal toward the tangent.
///
/// `pi/2` on the track (steer along the path) easing out to 0 at the track
/// error bound (steer straight at the path).
pub fn look_ahead_angle(normalized_track_error: f64) -> f64 {
    FRAC_PI_2 * (normalized_track_error - 1.0).powi(2)
}

/// Track proximity in `[0, 1]`. 1 on the track, 0 at or beyond the track
/// error bound.
pub fn track_proximity(look_ahead_ang_rad: f64) -> f64 {
    let sin_look_ahead_ang = look_ahead_ang_rad.sin();
    sin_look_ahead_ang * sin_look_ahead_ang
}
