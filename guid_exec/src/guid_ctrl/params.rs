//! Guidance control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use super::EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for guidance control.
///
/// Any parameter missing from the parameter file takes its default value.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Params {

    // ---- CONTROL DESIGN ----

    /// Nominal period of the closed loop track error response.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Damping ratio of the closed loop track error response.
    pub damping: f64,

    /// Time constant of the aircraft's roll response, used to lower bound the
    /// period. Zero disables the bound in practice.
    ///
    /// Units: seconds
    pub roll_time_const_s: f64,

    /// Lower bound the period for stability against the roll response.
    pub en_period_lb: bool,

    /// Upper bound the period for track keeping in curvature and wind. Only
    /// applied when `en_period_lb` is also set.
    pub en_period_ub: bool,

    /// Ramp the upper bounded period in with track proximity rather than
    /// applying it everywhere.
    pub ramp_in_adapted_period: bool,

    // ---- AIRSPEED ----

    /// Nominal airspeed reference.
    ///
    /// Units: meters/second
    pub airspeed_nom_ms: f64,

    /// Maximum airspeed reference.
    ///
    /// Units: meters/second
    pub airspeed_max_ms: f64,

    // ---- WIND EXCESS ----

    /// Allow the airspeed reference to be incremented above nominal in excess
    /// wind. Also gates the minimum ground speed demands.
    pub en_wind_excess_regulation: bool,

    /// Demand a ground speed along the bearing when the track is infeasible
    /// and the aircraft is being pushed away from it.
    pub en_track_keeping: bool,

    /// Demand at least `min_gsp_cmd_ms` of ground speed along the bearing.
    pub en_min_ground_speed: bool,

    /// User set minimum ground speed.
    ///
    /// Units: meters/second
    pub min_gsp_cmd_ms: f64,

    /// Maximum ground speed demand from track keeping.
    ///
    /// Units: meters/second
    pub min_gsp_track_keeping_max_ms: f64,

    /// Fraction of the normalised track error at which the track keeping
    /// demand reaches its maximum.
    pub nte_fraction: f64,

    /// Buffer on the wind ratio below which a bearing is fully feasible.
    pub wind_ratio_buffer: f64,

    // ---- ROLL SETPOINT ----

    /// Roll setpoint limit.
    ///
    /// Units: radians
    pub roll_lim_rad: f64,

    /// Roll setpoint slew rate limit. Zero disables slew limiting.
    ///
    /// Units: radians/second
    pub roll_slew_rate_rads: f64,

    /// Control loop period, used for slew limiting. Zero disables slew
    /// limiting.
    ///
    /// Units: seconds
    pub dt_s: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Ways in which a parameter set can be invalid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamsError {
    #[error("Expected a positive control period, found {0} s")]
    NonPositivePeriod(f64),

    #[error("Expected a positive damping ratio, found {0}")]
    NonPositiveDamping(f64),

    #[error("Expected 0 <= nominal airspeed ({nom} m/s) <= maximum airspeed ({max} m/s)")]
    InvalidAirspeedRange { nom: f64, max: f64 },

    #[error("Expected a positive roll limit, found {0} rad")]
    NonPositiveRollLimit(f64),

    #[error("Expected `{0}` to be finite and not negative, found {1}")]
    NegativeValue(&'static str, f64),

    #[error("Expected a wind ratio buffer no greater than 1, found {0}")]
    WindRatioBufferTooLarge(f64)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            period_s: 10.0,
            damping: 0.7071,
            roll_time_const_s: 0.0,
            en_period_lb: true,
            en_period_ub: true,
            ramp_in_adapted_period: true,
            airspeed_nom_ms: 15.0,
            airspeed_max_ms: 20.0,
            en_wind_excess_regulation: true,
            en_track_keeping: false,
            en_min_ground_speed: false,
            min_gsp_cmd_ms: 0.0,
            min_gsp_track_keeping_max_ms: 5.0,
            nte_fraction: 0.5,
            wind_ratio_buffer: 0.1,
            roll_lim_rad: 40f64.to_radians(),
            roll_slew_rate_rads: 0.0,
            dt_s: 0.0
        }
    }
}

impl Params {
    /// Check the parameters against the invariants the guidance law relies
    /// on.
    pub fn validate(&self) -> Result<(), ParamsError> {
        // Written as negated comparisons so that NaN is rejected
        if !(self.period_s > 0.0) || !self.period_s.is_finite() {
            return Err(ParamsError::NonPositivePeriod(self.period_s))
        }
        if !(self.damping > 0.0) || !self.damping.is_finite() {
            return Err(ParamsError::NonPositiveDamping(self.damping))
        }
        if !(self.airspeed_nom_ms >= 0.0 && self.airspeed_nom_ms <= self.airspeed_max_ms)
            || !self.airspeed_max_ms.is_finite()
        {
            return Err(ParamsError::InvalidAirspeedRange {
                nom: self.airspeed_nom_ms,
                max: self.airspeed_max_ms
            })
        }
        if !(self.roll_lim_rad > 0.0) {
            return Err(ParamsError::NonPositiveRollLimit(self.roll_lim_rad))
        }

        let non_negative = [
            ("roll_time_const_s", self.roll_time_const_s),
            ("min_gsp_cmd_ms", self.min_gsp_cmd_ms),
            ("min_gsp_track_keeping_max_ms", self.min_gsp_track_keeping_max_ms),
            ("nte_fraction", self.nte_fraction),
            ("wind_ratio_buffer", self.wind_ratio_buffer),
            ("roll_slew_rate_rads", self.roll_slew_rate_rads),
            ("dt_s", self.dt_s)
        ];

        for (name, value) in non_negative.iter() {
            if !(*value >= 0.0) || !value.is_finite() {
                return Err(ParamsError::NegativeValue(*name, *value))
            }
        }

        // Above 1 the lower feasibility barrier can exceed the upper one
        if self.wind_ratio_buffer > 1.0 {
            return Err(ParamsError::WindRatioBufferTooLarge(self.wind_ratio_buffer))
        }

        Ok(())
    }

    /// Inverse of the normalised track error fraction, with the fraction
    /// floored at `EPSILON`.
    pub fn inv_nte_fraction(&self) -> f64 {
        1.0 / self.nte_fraction.max(EPSILON)
    }
}
