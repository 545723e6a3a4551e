//! # Guidance Executable
//!
//! Flies guidance control in closed loop against the kinematic aircraft
//! simulation. The scenario (initial state, wind, path) comes from a
//! simulation parameter file, by default `guid_sim.toml`, which may be
//! overridden with the first command line argument. Guidance parameters are
//! loaded from `guid_ctrl.toml`.
//!
//! Every cycle is archived into the session directory and a summary of the
//! run is saved as `summary.json` at the end.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::env;

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};

use guid_lib::{
    guid_ctrl::GuidCtrl,
    sim::{Sim, SimParams},
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default simulation parameter file, relative to the params directory.
const DEFAULT_SIM_PARAMS: &str = "guid_sim.toml";

/// Number of simulated seconds between progress messages.
const PROGRESS_PERIOD_S: f64 = 10.0;

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("guid_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Fixed-wing Guidance Simulation\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let sim_params_path = match args.len() {
        1 => DEFAULT_SIM_PARAMS.to_string(),
        2 => args[1].clone(),
        _ => return Err(eyre!("Expected at most one argument, the simulation parameter file")),
    };

    info!("Loading simulation parameters from \"{}\"", sim_params_path);
    let sim_params: SimParams = util::params::load(&sim_params_path)
        .wrap_err("Could not load the simulation parameters")?;

    info!(
        "Simulating {:.01} s of {} flight in a [{:.01}, {:.01}] m/s wind\n",
        sim_params.duration_s,
        sim_params.path_cmd.kind_name(),
        sim_params.wind_vel_ms[0],
        sim_params.wind_vel_ms[1]
    );

    // ---- MODULE INIT ----

    let mut sim = Sim::new(sim_params).wrap_err("Invalid simulation parameters")?;
    sim.init_archive(&session)
        .wrap_err("Failed to initialise the simulation archive")?;

    let mut guid_ctrl = GuidCtrl::default();
    guid_ctrl
        .init("guid_ctrl.toml", &session)
        .wrap_err("Failed to initialise GuidCtrl")?;

    if guid_ctrl.params().dt_s > 0.0
        && (guid_ctrl.params().dt_s - sim.params().cycle_period_s).abs() > 1e-9
    {
        warn!(
            "GuidCtrl's dt ({} s) differs from the simulation cycle period ({} s)",
            guid_ctrl.params().dt_s,
            sim.params().cycle_period_s
        );
    }

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut next_progress_s = PROGRESS_PERIOD_S;

    while !sim.is_finished() {
        let input = sim.input_data();

        let (output, report) = guid_ctrl
            .proc(&input)
            .wrap_err("Error during GuidCtrl processing")?;

        guid_ctrl
            .write()
            .wrap_err("Failed to write the GuidCtrl archive")?;

        sim.step(&output, &report)
            .wrap_err("Failed to write the simulation archive")?;

        if sim.time_s() >= next_progress_s {
            info!(
                "t = {:6.01} s: track error {:8.02} m, airspeed ref {:5.02} m/s, roll sp {:6.02} deg",
                sim.time_s(),
                report.path.signed_track_error_m,
                output.airspeed_ref_ms,
                output.roll_sp_rad.to_degrees()
            );
            next_progress_s += PROGRESS_PERIOD_S;
        }
    }

    // ---- SUMMARY ----

    let summary = *sim.summary();

    info!("Simulation complete after {} cycles", summary.num_cycles);
    info!("    Max track error: {:.02} m", summary.max_abs_track_error_m);
    info!("    Final track error: {:.02} m", summary.final_track_error_m);
    info!("    Max roll setpoint: {:.02} deg", summary.max_abs_roll_sp_rad.to_degrees());
    info!("    Max airspeed ref: {:.02} m/s", summary.max_airspeed_ref_ms);
    info!(
        "    Cycles with degenerate airspeed: {}, not fully feasible: {}",
        summary.num_degenerate_cycles,
        summary.num_infeasible_cycles
    );

    session
        .save_json("summary.json", &summary)
        .wrap_err("Failed to save the simulation summary")?;

    info!("End of execution");

    Ok(())
}
