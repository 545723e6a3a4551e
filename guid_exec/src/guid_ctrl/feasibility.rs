//! Bearing feasibility and minimum ground speed demands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::FRAC_PI_2;

// Internal
use super::*;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Minimum ground speed demand along the bearing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinGroundSpeed {
    /// The total demand, the larger of the track keeping and user demands.
    ///
    /// Units: meters/second
    pub total_ms: f64,

    /// The demand from track keeping alone.
    ///
    /// Units: meters/second
    pub track_keeping_ms: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GuidCtrl {
    /// Minimum ground speed demanded along the bearing.
    ///
    /// Track keeping demands more ground speed the less feasible the bearing
    /// is and the further the aircraft is from the track, saturating at
    /// `nte_fraction` of the track error bound. Both demands are only made
    /// when wind excess regulation is enabled.
    pub(crate) fn min_ground_speed(
        &self,
        normalized_track_error: f64,
        feas: f64
    ) -> MinGroundSpeed {
        let p = &self.params;

        let mut track_keeping_ms = 0.0;
        if p.en_track_keeping && p.en_wind_excess_regulation {
            track_keeping_ms = (1.0 - feas)
                * p.min_gsp_track_keeping_max_ms
                * clamp(&(normalized_track_error * p.inv_nte_fraction()), &0.0, &1.0);
        }

        let mut min_gsp_cmd_ms = 0.0;
        if p.en_min_ground_speed && p.en_wind_excess_regulation {
            min_gsp_cmd_ms = p.min_gsp_cmd_ms;
        }

        MinGroundSpeed {
            total_ms: track_keeping_ms.max(min_gsp_cmd_ms),
            track_keeping_ms
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Continuous feasibility of a bearing in the given wind.
///
/// The bearing is fully feasible (1) while the wind ratio is below a lower
/// barrier and fully infeasible (0) above an upper barrier. Both barriers
/// depend on the sine of the angle between the wind and the bearing, and are
/// linearised for small angles to avoid the singularity of a tail wind. In
/// between the two the feasibility follows a `cos^2` blend.
///
/// # Inputs
/// - `wind_cross_bearing`: cross product of the wind and the bearing.
/// - `wind_dot_bearing`: dot product of the wind and the bearing.
/// - `wind_speed_ms`: magnitude of the wind.
/// - `wind_ratio`: wind speed over airspeed.
/// - `wind_ratio_buffer`: buffer on the lower barrier.
pub fn bearing_feasibility(
    wind_cross_bearing: f64,
    wind_dot_bearing: f64,
    wind_speed_ms: f64,
    wind_ratio: f64,
    wind_ratio_buffer: f64
) -> f64 {
    // Constant after 90 degrees
    let sin_cross_wind_ang = if wind_dot_bearing <= 0.0 {
        1.0
    }
    else {
        (wind_cross_bearing.abs() / wind_speed_ms).min(1.0)
    };

    let (wind_ratio_ub, wind_ratio_lb) = if sin_cross_wind_ang < CROSS_WIND_ANG_CO {
        let ub = ONE_DIV_SIN_CROSS_WIND_ANG_CO
            + CO_SLOPE * (CROSS_WIND_ANG_CO - sin_cross_wind_ang);
        let lb = (ONE_DIV_SIN_CROSS_WIND_ANG_CO - 2.0) * wind_ratio_buffer
            + 1.0
            + wind_ratio_buffer * CO_SLOPE * (CROSS_WIND_ANG_CO - sin_cross_wind_ang);

        (ub, lb)
    }
    else {
        let one_div_sin_cross_wind_ang = 1.0 / sin_cross_wind_ang;

        (
            one_div_sin_cross_wind_ang,
            (one_div_sin_cross_wind_ang - 2.0) * wind_ratio_buffer + 1.0
        )
    };

    if wind_ratio > wind_ratio_ub {
        0.0
    }
    else if wind_ratio > wind_ratio_lb {
        let blend = clamp(
            &((wind_ratio - wind_ratio_lb) / (wind_ratio_ub - wind_ratio_lb)),
            &0.0,
            &1.0
        );
        let feas = (FRAC_PI_2 * blend).cos();
        feas * feas
    }
    else {
        1.0
    }
}
