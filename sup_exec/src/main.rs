//! Main superstructure executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Effector processing
//!         - Joint control processing
//!         - Simulated motor update
//!         - Telemetry snapshot on the 1Hz cycle
//!
//! # Modules
//!
//! All cyclic modules (e.g. `joint_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::tc::TcResponse;
use sup_lib::{
    data_store::{DataStore, SafeModeCause},
    params::SupParams,
    sim_mech::SimMotor,
    tc_processor,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Superstructure executable, drives the control core against simulated
/// motors using an operator script.
#[derive(Debug, StructOpt)]
#[structopt(name = "sup_exec")]
struct Opt {
    /// Path to the operator script to run
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Minimum level of log messages to record (info, debug or trace)
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Minimum level for the per-tick joint and effector messages
    #[structopt(long, default_value = "info")]
    tick_log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "sup_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, opt.tick_log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Superstructure Executable\n");
    info!("Running on: {}", host::get_platform());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params = SupParams::load()
        .wrap_err("Could not load the superstructure parameters")?;
    let cycle_period_s = params.exec.cycle_period_s;
    let cycle_frequency_hz = 1.0 / cycle_period_s;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    info!("Loading script from {:?}", opt.script);

    let mut script = ScriptInterpreter::new(&opt.script)
        .wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let sim_rate = params.exec.sim_max_rate_per_s;
    let mut ds = DataStore::new(&params, |id| {
        debug!("Creating simulated motor for {}", id);
        SimMotor::new(sim_rate)
    }).wrap_err("Failed to initialise the superstructure")?;

    info!("Module initialisation complete, mode is {:?}\n", ds.mode_arb.mode());

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut last_sim_s = session::get_elapsed_seconds();

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let now_s = session::get_elapsed_seconds();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz, now_s);

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs(now_s) {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    match tc_processor::exec(&mut ds, tc, now_s) {
                        TcResponse::Ok => (),
                        r => warn!("TC {:?} not executed: {:?}", tc, r)
                    }
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                ds.make_safe(SafeModeCause::Shutdown);
                break
            }
        }

        // ---- CONTROL PROCESSING ----

        ds.proc(now_s);

        // ---- SIMULATION ----

        let sim_now_s = session::get_elapsed_seconds();
        let dt_s = sim_now_s - last_sim_s;
        ds.for_each_driver(|_, motor| motor.advance(dt_s));
        last_sim_s = sim_now_s;

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            session.save(
                format!("telemetry/snapshot_{:06}.json", ds.num_cycles),
                ds.snapshot()
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    session.save("telemetry/final.json", ds.snapshot());
    session.exit();

    info!("End of execution");

    Ok(())
}
