//! Simulation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Deserialize;
use thiserror::Error;

// Internal
use crate::guid_ctrl::{GeoPoint, PathCmd};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a closed loop guidance simulation.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct SimParams {

    // ---- TIMING ----

    /// Period of one guidance and integration cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Length of the simulation.
    ///
    /// Units: seconds
    pub duration_s: f64,

    // ---- INITIAL STATE ----

    pub initial_pos: GeoPoint,

    /// Air relative heading, from north towards east.
    ///
    /// Units: radians
    pub initial_heading_rad: f64,

    /// Units: meters/second
    pub initial_airspeed_ms: f64,

    // ---- ENVIRONMENT ----

    /// Constant wind velocity as [north, east].
    ///
    /// Units: meters/second
    pub wind_vel_ms: [f64; 2],

    // ---- AIRCRAFT ----

    /// Time constant of the aircraft's first order roll response. Zero tracks
    /// the setpoint instantly.
    ///
    /// Units: seconds
    pub roll_time_const_s: f64,

    /// Time constant of the aircraft's first order airspeed response. Zero
    /// tracks the reference instantly.
    ///
    /// Units: seconds
    pub airspeed_time_const_s: f64,

    // ---- PATH ----

    pub path_cmd: PathCmd
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimParamsError {
    #[error("Expected a positive cycle period, found {0} s")]
    NonPositiveCyclePeriod(f64),

    #[error("Expected `{0}` to be finite and not negative, found {1}")]
    NegativeValue(&'static str, f64)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimParams {
    pub fn validate(&self) -> Result<(), SimParamsError> {
        if !(self.cycle_period_s > 0.0) || !self.cycle_period_s.is_finite() {
            return Err(SimParamsError::NonPositiveCyclePeriod(self.cycle_period_s))
        }

        let non_negative = [
            ("duration_s", self.duration_s),
            ("initial_airspeed_ms", self.initial_airspeed_ms),
            ("roll_time_const_s", self.roll_time_const_s),
            ("airspeed_time_const_s", self.airspeed_time_const_s)
        ];

        for (name, value) in non_negative.iter() {
            if !(*value >= 0.0) || !value.is_finite() {
                return Err(SimParamsError::NegativeValue(*name, *value))
            }
        }

        Ok(())
    }

    pub fn wind_vel(&self) -> Vector2<f64> {
        Vector2::new(self.wind_vel_ms[0], self.wind_vel_ms[1])
    }

    /// Number of cycles in the simulation, to the nearest whole cycle.
    pub fn num_cycles(&self) -> u64 {
        (self.duration_s / self.cycle_period_s).round() as u64
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::guid_ctrl::LoiterDirection;

    const SIM_TOML: &str = r#"
cycle_period_s = 0.02
duration_s = 120.0
initial_heading_rad = 1.5708
initial_airspeed_ms = 15.0
wind_vel_ms = [0.0, 5.0]
roll_time_const_s = 0.3
airspeed_time_const_s = 1.5

[initial_pos]
lat_deg = 47.0
lon_deg = 8.0

[path_cmd]
type = "loiter"
radius_m = 100.0
direction = "clockwise"
center = { lat_deg = 47.001, lon_deg = 8.0 }
"#;

    #[test]
    fn test_parse() {
        let p: SimParams = util::params::parse(SIM_TOML).unwrap();

        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.num_cycles(), 6000);
        assert_eq!(p.wind_vel(), Vector2::new(0.0, 5.0));

        match p.path_cmd {
            PathCmd::Loiter { radius_m, direction, .. } => {
                assert_eq!(radius_m, 100.0);
                assert_eq!(direction, LoiterDirection::Clockwise);
            },
            c => panic!("Expected a loiter, got {:?}", c)
        }
    }

    #[test]
    fn test_shipped_params() {
        let p: SimParams = util::params::load_from_path(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/guid_sim.toml")
        ).unwrap();

        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn test_invalid() {
        let mut p: SimParams = util::params::parse(SIM_TOML).unwrap();

        p.cycle_period_s = 0.0;
        assert_eq!(p.validate(), Err(SimParamsError::NonPositiveCyclePeriod(0.0)));

        p.cycle_period_s = 0.1;
        p.roll_time_const_s = -1.0;
        assert_eq!(
            p.validate(),
            Err(SimParamsError::NegativeValue("roll_time_const_s", -1.0))
        );
    }
}
