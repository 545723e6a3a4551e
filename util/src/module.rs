//! Module interfaces
//!
//! Cyclic modules such as `GuidCtrl` implement [`State`] so that executables
//! drive them the same way: `init` once with a parameter file name (resolved
//! under `$FW_GUID_SW_ROOT/params`) and the session, then `proc` once per
//! guidance cycle with that cycle's path command and navigation solution.
//! `proc` must not be called before a successful `init`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data required during initialisation, for guidance the parameter file
    /// name.
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for cyclic processing, e.g. the active path command
    /// with the vehicle's position and its ground and wind velocities.
    type InputData;
    /// Demands produced by cyclic processing, e.g. the airspeed reference
    /// and roll setpoint.
    type OutputData;
    /// A report on the status of the cyclic processing, archived by the
    /// module each cycle.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Initialise the module.
    ///
    /// # Inputs
    /// - `init_data`: The data required to initialise the module.
    /// - `session`: The current session, under which the module opens its
    ///   archives.
    ///
    /// # Outputs
    /// - On success `Ok(())`.
    /// - On error an `InitError` instance.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one guidance cycle.
    ///
    /// # Inputs
    /// - `input_data`: The data required for processing by the module.
    ///
    /// # Outputs
    /// - On success a tuple of the output data and status report.
    /// - On error a `ProcError` instance, for example if the module has not
    ///   been initialised.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
