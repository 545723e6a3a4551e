//! Implementations for the GuidCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::*;
use util::{
    params,
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Guidance control module state
pub struct GuidCtrl {

    pub(crate) params: Params,

    initialised: bool,

    /// Previous roll setpoint, carried over for slew rate limiting.
    pub(crate) roll_sp_rad: f64,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    last_path_kind: Option<&'static str>
}

/// Input data to Guidance Control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// The path to follow on this cycle.
    pub path_cmd: PathCmd,

    /// Current position of the aircraft.
    pub vehicle_pos: GeoPoint,

    /// Ground velocity in the local north-east frame.
    ///
    /// Units: meters/second
    pub ground_vel: Vector2<f64>,

    /// Estimated wind velocity in the local north-east frame.
    ///
    /// Units: meters/second
    pub wind_vel: Vector2<f64>
}

/// Output demands from GuidCtrl for the attitude and airspeed controllers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    /// Units: meters/second
    pub airspeed_ref_ms: f64,

    /// Units: meters/second^2
    pub lateral_accel_mss: f64,

    /// Units: radians
    pub roll_sp_rad: f64
}

/// Status report for GuidCtrl processing.
///
/// Contains every intermediate of the last guidance evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// Control period after stability bounding.
    ///
    /// Units: seconds
    pub adapted_period_s: f64,

    pub p_gain: f64,

    /// Units: seconds
    pub time_const_s: f64,

    /// Units: meters
    pub track_error_bound_m: f64,

    /// Unit vector of the commanded bearing.
    pub bearing_vec: Vector2<f64>,

    /// Feasibility of the bearing.
    pub feas: f64,

    /// Feasibility of the path tangent at the closest point.
    pub feas_on_track: f64,

    /// Product of `feas` and `feas_on_track`.
    pub feas_combined: f64,

    /// Units: meters/second
    pub min_ground_speed_ref_ms: f64,

    /// Units: meters/second
    pub min_gsp_track_keeping_ms: f64,

    /// Units: meters/second
    pub air_vel_ref: Vector2<f64>,

    /// Units: meters/second
    pub airspeed_ref_ms: f64,

    pub air_vel_ref_case: AirVelRefCase,

    pub track_proximity: f64,

    /// Units: meters/second^2
    pub lateral_accel_ff_mss: f64,

    /// Total lateral acceleration demand, feedback plus feedforward.
    ///
    /// Units: meters/second^2
    pub lateral_accel_mss: f64,

    pub path: PathDesc,

    pub path_type_loiter: bool,

    /// True if the airspeed was too low to evaluate the guidance law.
    pub airspeed_degenerate: bool,

    /// Units: radians
    pub roll_sp_rad: f64
}

/// A single row of the status report archive.
#[derive(Serialize)]
struct ReportRecord {
    adapted_period_s: f64,
    p_gain: f64,
    time_const_s: f64,
    track_error_bound_m: f64,
    bearing_x: f64,
    bearing_y: f64,
    feas: f64,
    feas_on_track: f64,
    feas_combined: f64,
    min_ground_speed_ref_ms: f64,
    min_gsp_track_keeping_ms: f64,
    air_vel_ref_x_ms: f64,
    air_vel_ref_y_ms: f64,
    airspeed_ref_ms: f64,
    air_vel_ref_case: &'static str,
    track_proximity: f64,
    lateral_accel_ff_mss: f64,
    lateral_accel_mss: f64,
    unit_path_tangent_x: f64,
    unit_path_tangent_y: f64,
    signed_track_error_m: f64,
    path_curvature_m: f64,
    path_type_loiter: bool,
    airspeed_degenerate: bool,
    roll_sp_rad: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GuidCtrl {
    fn default() -> Self {
        let params = Params::default();

        Self {
            params,
            initialised: false,
            roll_sp_rad: 0.0,
            report: StatusReport::neutral(&params),
            arch_report: Archiver::default(),
            last_path_kind: None
        }
    }
}

impl State for GuidCtrl {
    type InitData = &'static str;
    type InitError = GuidCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = GuidCtrlError;

    /// Initialise the GuidCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data)
            .map_err(GuidCtrlError::ParamLoadError)?;
        params.validate().map_err(GuidCtrlError::InvalidParams)?;

        self.arch_report = Archiver::from_path(session, "guid_ctrl/status_report.csv")
            .map_err(GuidCtrlError::ArchiveInitError)?;

        self.params = params;
        self.roll_sp_rad = 0.0;
        self.report = StatusReport::neutral(&self.params);
        self.last_path_kind = None;
        self.initialised = true;

        info!("GuidCtrl initialised from {}", init_data);
        debug!("GuidCtrl params: {:#?}", self.params);

        Ok(())
    }

    /// Perform cyclic processing of Guidance Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !self.initialised {
            return Err(GuidCtrlError::NotInitialised)
        }

        let output = self.navigate(
            &input_data.path_cmd,
            &input_data.vehicle_pos,
            &input_data.ground_vel,
            &input_data.wind_vel
        );

        Ok((output, self.report))
    }
}

impl Archived for GuidCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(ReportRecord::from(&self.report))
    }
}

impl GuidCtrl {
    /// Create a new guidance controller from a parameter set.
    ///
    /// The controller is usable straight away, but must be initialised with
    /// [`State::init`] before [`State::proc`] can be called.
    pub fn new(params: Params) -> Result<Self, GuidCtrlError> {
        params.validate().map_err(GuidCtrlError::InvalidParams)?;

        Ok(Self {
            params,
            report: StatusReport::neutral(&params),
            ..Default::default()
        })
    }

    /// Update the parameters at runtime.
    ///
    /// If the new parameters are invalid the current ones are kept.
    pub fn set_params(&mut self, params: Params) -> Result<(), GuidCtrlError> {
        params.validate().map_err(GuidCtrlError::InvalidParams)?;

        self.params = params;
        info!("GuidCtrl parameters updated");

        Ok(())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Follow the given path command.
    pub fn navigate(
        &mut self,
        path_cmd: &PathCmd,
        vehicle_pos: &GeoPoint,
        ground_vel: &Vector2<f64>,
        wind_vel: &Vector2<f64>
    ) -> OutputData {
        let kind = path_cmd.kind_name();
        if self.last_path_kind != Some(kind) {
            debug!("GuidCtrl now following a {} path", kind);
            self.last_path_kind = Some(kind);
        }

        match *path_cmd {
            PathCmd::Waypoints { wp_a, wp_b } => {
                self.navigate_waypoints(&wp_a, &wp_b, vehicle_pos, ground_vel, wind_vel)
            },
            PathCmd::Loiter { center, radius_m, direction } => self.navigate_loiter(
                &center, vehicle_pos, radius_m, direction, ground_vel, wind_vel
            ),
            PathCmd::Heading { heading_rad } => {
                self.navigate_heading(heading_rad, ground_vel, wind_vel)
            },
            PathCmd::Bearing { bearing_rad } => {
                self.navigate_bearing(bearing_rad, ground_vel, wind_vel)
            },
            PathCmd::LevelFlight { heading_rad } => self.navigate_level_flight(heading_rad)
        }

        self.output()
    }

    /// Follow the line between two waypoints, flying first to `wp_a` if the
    /// aircraft is in front of it.
    pub fn navigate_waypoints(
        &mut self,
        wp_a: &GeoPoint,
        wp_b: &GeoPoint,
        vehicle_pos: &GeoPoint,
        ground_vel: &Vector2<f64>,
        wind_vel: &Vector2<f64>
    ) {
        let vector_a_to_b = local_planar_vector(wp_a, wp_b);
        let vector_a_to_vehicle = local_planar_vector(wp_a, vehicle_pos);

        let path = PathDesc::waypoints(&vector_a_to_b, &vector_a_to_vehicle);

        self.report.path_type_loiter = false;
        self.report = self.evaluate(ground_vel, wind_vel, &path);
        self.update_roll_setpoint();
    }

    /// Circle the loiter center at the given radius.
    pub fn navigate_loiter(
        &mut self,
        center: &GeoPoint,
        vehicle_pos: &GeoPoint,
        radius_m: f64,
        direction: LoiterDirection,
        ground_vel: &Vector2<f64>,
        wind_vel: &Vector2<f64>
    ) {
        let vector_center_to_vehicle = local_planar_vector(center, vehicle_pos);

        let path = PathDesc::loiter(&vector_center_to_vehicle, radius_m, direction, ground_vel);

        self.report.path_type_loiter = true;
        self.report = self.evaluate(ground_vel, wind_vel, &path);
        self.update_roll_setpoint();
    }

    /// Hold an air relative heading.
    ///
    /// The guidance law is evaluated on the air velocity with no wind, so
    /// neither wind nor position are regulated.
    pub fn navigate_heading(
        &mut self,
        heading_rad: f64,
        ground_vel: &Vector2<f64>,
        wind_vel: &Vector2<f64>
    ) {
        let air_vel = ground_vel - wind_vel;
        let path = PathDesc::from_angle(heading_rad);

        self.report.path_type_loiter = false;
        self.report = self.evaluate(&air_vel, &Vector2::zeros(), &path);
        self.update_roll_setpoint();
    }

    /// Hold a ground relative bearing.
    pub fn navigate_bearing(
        &mut self,
        bearing_rad: f64,
        ground_vel: &Vector2<f64>,
        wind_vel: &Vector2<f64>
    ) {
        let path = PathDesc::from_angle(bearing_rad);

        self.report.path_type_loiter = false;
        self.report = self.evaluate(ground_vel, wind_vel, &path);
        self.update_roll_setpoint();
    }

    /// Fly wings level on the given heading, without evaluating the guidance
    /// law.
    pub fn navigate_level_flight(&mut self, heading_rad: f64) {
        let path = PathDesc::from_angle(heading_rad);

        let mut report = StatusReport::neutral(&self.params);
        report.bearing_vec = path.unit_path_tangent;
        report.air_vel_ref = path.unit_path_tangent * self.params.airspeed_nom_ms;
        report.path = path;
        report.roll_sp_rad = self.roll_sp_rad;

        self.report = report;
        self.update_roll_setpoint();
    }

    /// The current demands.
    pub fn output(&self) -> OutputData {
        OutputData {
            airspeed_ref_ms: self.report.airspeed_ref_ms,
            lateral_accel_mss: self.report.lateral_accel_mss,
            roll_sp_rad: self.roll_sp_rad
        }
    }

    /// Units: meters/second
    pub fn airspeed_ref(&self) -> f64 {
        self.report.airspeed_ref_ms
    }

    /// Units: meters/second^2
    pub fn lateral_accel(&self) -> f64 {
        self.report.lateral_accel_mss
    }

    /// Units: radians
    pub fn roll_setpoint(&self) -> f64 {
        self.roll_sp_rad
    }

    /// Units: meters
    pub fn track_error_bound(&self) -> f64 {
        self.report.track_error_bound_m
    }

    /// Distance from a waypoint at which to switch to the next one.
    ///
    /// The waypoint's acceptance radius, reduced to the track error bound so
    /// that the switch happens no earlier than the approach to the next
    /// segment would begin.
    pub fn switch_distance(&self, wp_radius_m: f64) -> f64 {
        wp_radius_m.min(self.report.track_error_bound_m)
    }

    /// The report from the last evaluation.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }
}

impl StatusReport {
    /// Report for an aircraft flying the nominal airspeed with no demands,
    /// using the gains from the nominal period.
    pub fn neutral(params: &Params) -> Self {
        let time_const_s = time_const(params.period_s, params.damping);
        let path = PathDesc::default();

        Self {
            adapted_period_s: params.period_s,
            p_gain: p_gain(params.period_s, params.damping),
            time_const_s,
            track_error_bound_m: track_error_bound(0.0, time_const_s),
            bearing_vec: path.unit_path_tangent,
            feas: 1.0,
            feas_on_track: 1.0,
            feas_combined: 1.0,
            min_ground_speed_ref_ms: 0.0,
            min_gsp_track_keeping_ms: 0.0,
            air_vel_ref: path.unit_path_tangent * params.airspeed_nom_ms,
            airspeed_ref_ms: params.airspeed_nom_ms,
            air_vel_ref_case: AirVelRefCase::None,
            track_proximity: 0.0,
            lateral_accel_ff_mss: 0.0,
            lateral_accel_mss: 0.0,
            path,
            path_type_loiter: false,
            airspeed_degenerate: false,
            roll_sp_rad: 0.0
        }
    }
}

impl From<&StatusReport> for ReportRecord {
    fn from(r: &StatusReport) -> Self {
        Self {
            adapted_period_s: r.adapted_period_s,
            p_gain: r.p_gain,
            time_const_s: r.time_const_s,
            track_error_bound_m: r.track_error_bound_m,
            bearing_x: r.bearing_vec[0],
            bearing_y: r.bearing_vec[1],
            feas: r.feas,
            feas_on_track: r.feas_on_track,
            feas_combined: r.feas_combined,
            min_ground_speed_ref_ms: r.min_ground_speed_ref_ms,
            min_gsp_track_keeping_ms: r.min_gsp_track_keeping_ms,
            air_vel_ref_x_ms: r.air_vel_ref[0],
            air_vel_ref_y_ms: r.air_vel_ref[1],
            airspeed_ref_ms: r.airspeed_ref_ms,
            air_vel_ref_case: r.air_vel_ref_case.name(),
            track_proximity: r.track_proximity,
            lateral_accel_ff_mss: r.lateral_accel_ff_mss,
            lateral_accel_mss: r.lateral_accel_mss,
            unit_path_tangent_x: r.path.unit_path_tangent[0],
            unit_path_tangent_y: r.path.unit_path_tangent[1],
            signed_track_error_m: r.path.signed_track_error_m,
            path_curvature_m: r.path.path_curvature_m,
            path_type_loiter: r.path_type_loiter,
            airspeed_degenerate: r.airspeed_degenerate,
            roll_sp_rad: r.roll_sp_rad
        }
    }
}
