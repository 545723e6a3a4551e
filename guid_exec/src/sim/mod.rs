//! # Closed loop guidance simulation
//!
//! A kinematic point mass fixed-wing aircraft flown by guidance control. The
//! aircraft makes coordinated turns at the yaw rate `g tan(roll) / V`, with
//! first order responses to the roll setpoint and the airspeed reference. The
//! wind is constant.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;
use serde::Serialize;

// Internal
pub use params::*;
use crate::guid_ctrl::{
    self,
    GeoPoint,
    InputData,
    OutputData,
    StatusReport,
    local_planar_vector,
    unit_vec_from_angle};
use util::{
    archive::{ArchiveError, Archiver},
    maths::wrap_pi,
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of the simulated aircraft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimAircraft {
    pub pos: GeoPoint,

    /// Air relative heading, from north towards east.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Units: meters/second
    pub airspeed_ms: f64,

    /// Units: radians
    pub roll_rad: f64
}

/// A closed loop simulation.
pub struct Sim {
    params: SimParams,
    aircraft: SimAircraft,
    wind_vel: Vector2<f64>,

    cycle: u64,

    summary: SimSummary,

    arch: Archiver
}

/// Summary of a simulation run, saved at the end of the session.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SimSummary {
    pub num_cycles: u64,

    /// Units: seconds
    pub sim_time_s: f64,

    /// Units: meters
    pub max_abs_track_error_m: f64,

    /// Units: meters
    pub final_track_error_m: f64,

    /// Units: radians
    pub max_abs_roll_sp_rad: f64,

    /// Units: meters/second
    pub max_airspeed_ref_ms: f64,

    /// Number of cycles in which the airspeed was too low for guidance.
    pub num_degenerate_cycles: u64,

    /// Number of cycles in which the bearing was not fully feasible.
    pub num_infeasible_cycles: u64
}

/// A single row of the simulation archive.
#[derive(Debug, Clone, Copy, Serialize)]
struct SimRecord {
    time_s: f64,
    lat_deg: f64,
    lon_deg: f64,
    north_m: f64,
    east_m: f64,
    heading_rad: f64,
    airspeed_ms: f64,
    roll_rad: f64,
    ground_speed_ms: f64,
    airspeed_ref_ms: f64,
    lateral_accel_mss: f64,
    roll_sp_rad: f64,
    signed_track_error_m: f64,
    air_vel_ref_case: &'static str
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimAircraft {
    pub fn new(params: &SimParams) -> Self {
        Self {
            pos: params.initial_pos,
            heading_rad: params.initial_heading_rad,
            airspeed_ms: params.initial_airspeed_ms,
            roll_rad: 0.0
        }
    }

    pub fn air_vel(&self) -> Vector2<f64> {
        unit_vec_from_angle(self.heading_rad) * self.airspeed_ms
    }

    pub fn ground_vel(&self, wind_vel: &Vector2<f64>) -> Vector2<f64> {
        self.air_vel() + wind_vel
    }

    /// Integrate one step of the aircraft's motion under the given demands.
    pub fn step(
        &mut self,
        demands: &OutputData,
        wind_vel: &Vector2<f64>,
        params: &SimParams,
        dt_s: f64
    ) {
        self.roll_rad = first_order(
            self.roll_rad, demands.roll_sp_rad, params.roll_time_const_s, dt_s
        );
        self.airspeed_ms = first_order(
            self.airspeed_ms, demands.airspeed_ref_ms, params.airspeed_time_const_s, dt_s
        );

        // Coordinated turn, floored airspeed to keep the rate bounded
        let yaw_rate_rads = guid_ctrl::GRAVITY_MSS * self.roll_rad.tan()
            / self.airspeed_ms.max(guid_ctrl::MIN_AIRSPEED_MS);
        self.heading_rad = wrap_pi(self.heading_rad + yaw_rate_rads * dt_s);

        let ground_vel = self.ground_vel(wind_vel);
        self.pos = self.pos.offset_by(&(ground_vel * dt_s));
    }
}

impl Sim {
    pub fn new(params: SimParams) -> Result<Self, SimParamsError> {
        params.validate()?;

        Ok(Self {
            aircraft: SimAircraft::new(&params),
            wind_vel: params.wind_vel(),
            params,
            cycle: 0,
            summary: SimSummary::default(),
            arch: Archiver::default()
        })
    }

    /// Start archiving each cycle into the session.
    pub fn init_archive(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch = Archiver::from_path(session, "sim/aircraft.csv")?;
        Ok(())
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn aircraft(&self) -> &SimAircraft {
        &self.aircraft
    }

    pub fn summary(&self) -> &SimSummary {
        &self.summary
    }

    /// Simulation time at the start of the current cycle.
    ///
    /// Units: seconds
    pub fn time_s(&self) -> f64 {
        self.cycle as f64 * self.params.cycle_period_s
    }

    pub fn is_finished(&self) -> bool {
        self.cycle >= self.params.num_cycles()
    }

    /// Inputs to guidance control for the current cycle.
    pub fn input_data(&self) -> InputData {
        InputData {
            path_cmd: self.params.path_cmd,
            vehicle_pos: self.aircraft.pos,
            ground_vel: self.aircraft.ground_vel(&self.wind_vel),
            wind_vel: self.wind_vel
        }
    }

    /// Apply guidance control's demands for one cycle.
    ///
    /// The cycle is archived, if archiving was initialised, before the
    /// aircraft is moved.
    pub fn step(
        &mut self,
        demands: &OutputData,
        report: &StatusReport
    ) -> Result<(), ArchiveError> {
        self.update_summary(report);

        if self.arch.is_initialised() {
            let record = self.record(demands, report);
            self.arch.serialise(record)?;
        }

        self.aircraft.step(demands, &self.wind_vel, &self.params, self.params.cycle_period_s);
        self.cycle += 1;

        trace!(
            "Sim t = {:.2} s: heading {:.3} rad, airspeed {:.2} m/s, roll {:.3} rad",
            self.time_s(),
            self.aircraft.heading_rad,
            self.aircraft.airspeed_ms,
            self.aircraft.roll_rad
        );

        Ok(())
    }

    fn update_summary(&mut self, report: &StatusReport) {
        let s = &mut self.summary;
        let track_error_m = report.path.signed_track_error_m;

        s.num_cycles = self.cycle + 1;
        s.sim_time_s = (self.cycle + 1) as f64 * self.params.cycle_period_s;
        s.max_abs_track_error_m = s.max_abs_track_error_m.max(track_error_m.abs());
        s.final_track_error_m = track_error_m;
        s.max_abs_roll_sp_rad = s.max_abs_roll_sp_rad.max(report.roll_sp_rad.abs());
        s.max_airspeed_ref_ms = s.max_airspeed_ref_ms.max(report.airspeed_ref_ms);

        if report.airspeed_degenerate {
            s.num_degenerate_cycles += 1;
        }
        if report.feas_combined < 1.0 {
            s.num_infeasible_cycles += 1;
        }
    }

    fn record(&self, demands: &OutputData, report: &StatusReport) -> SimRecord {
        let local = local_planar_vector(&self.params.initial_pos, &self.aircraft.pos);

        SimRecord {
            time_s: self.time_s(),
            lat_deg: self.aircraft.pos.lat_deg,
            lon_deg: self.aircraft.pos.lon_deg,
            north_m: local[0],
            east_m: local[1],
            heading_rad: self.aircraft.heading_rad,
            airspeed_ms: self.aircraft.airspeed_ms,
            roll_rad: self.aircraft.roll_rad,
            ground_speed_ms: self.aircraft.ground_vel(&self.wind_vel).norm(),
            airspeed_ref_ms: demands.airspeed_ref_ms,
            lateral_accel_mss: demands.lateral_accel_mss,
            roll_sp_rad: demands.roll_sp_rad,
            signed_track_error_m: report.path.signed_track_error_m,
            air_vel_ref_case: report.air_vel_ref_case.name()
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Discrete first order response of `value` towards `target`.
fn first_order(value: f64, target: f64, time_const_s: f64, dt_s: f64) -> f64 {
    if time_const_s > 0.0 {
        value + (target - value) * (1.0 - (-dt_s / time_const_s).exp())
    }
    else {
        target
    }
}
