//! # Guidance control module
//!
//! Guidance control is responsible for keeping a fixed-wing aircraft on the
//! target path, even when the wind approaches or exceeds the airspeed the
//! aircraft can fly at. It outputs an airspeed reference and a lateral
//! acceleration demand, which is converted into a roll angle setpoint for
//! the attitude controller.
//!
//! The path is described locally by three quantities: the unit tangent of the
//! path at the closest point to the aircraft, the signed track error (the
//! distance from that closest point, positive along the path normal) and the
//! curvature of the path. Adapters build these from waypoints, loiter
//! circles, headings and bearings.
//!
//! From the path description a bearing is chosen which blends steering
//! straight at the path (far from it) into steering along it (on it). The
//! wind triangle is then solved for the air velocity which makes good that
//! bearing, incrementing the airspeed or mitigating when the bearing can't be
//! achieved in the current wind. The heading error between the current and
//! reference air velocities is fed back with a gain whose period is adapted
//! to keep the loop stable for the roll response, path curvature and wind.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod eval;
mod feasibility;
mod gain_sched;
mod lat_accel;
mod params;
mod path;
mod roll;
mod state;
mod wind_triangle;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use feasibility::*;
pub use gain_sched::*;
pub use lat_accel::*;
pub use params::*;
pub use path::*;
pub use roll::*;
pub use state::*;
pub use wind_triangle::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Small number used to guard divisions and degenerate geometry.
pub const EPSILON: f64 = 1.0e-6;

/// Airspeed below which the wind triangle is not solved.
///
/// Units: meters/second
pub const MIN_AIRSPEED_MS: f64 = 1.0;

/// Minimum radius of a loiter circle, also used to bound the path frame
/// curvature.
///
/// Units: meters
pub const MIN_RADIUS_M: f64 = 0.5;

/// Sine of the cross wind angle below which the feasibility barriers are
/// linearised.
pub const CROSS_WIND_ANG_CO: f64 = 0.02;

/// `1 / CROSS_WIND_ANG_CO`
pub const ONE_DIV_SIN_CROSS_WIND_ANG_CO: f64 = 50.0;

/// Slope of the linearised feasibility barriers, `1 / CROSS_WIND_ANG_CO^2`.
pub const CO_SLOPE: f64 = 2500.0;

/// Multiplier on the lower bound of the control period.
pub const PERIOD_SAFETY_FACTOR: f64 = 1.5;

/// Standard gravitational acceleration.
///
/// Units: meters/second^2
pub const GRAVITY_MSS: f64 = 9.80665;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
///
/// None of these are raised by the guidance law itself, which always produces
/// a bounded command. They concern loading and updating the parameters and
/// the module lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum GuidCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveInitError(util::archive::ArchiveError),

    /// `proc` was called before the module was initialised.
    #[error("GuidCtrl has not been initialised")]
    NotInitialised,
}
