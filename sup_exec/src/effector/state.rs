//! Implementations for the IntakeEffector state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{EffectorError, MotorParams};
use comms_if::eqpt::mech::{EffectorId, MotorDriver};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An open loop effector driven by a single motor.
pub struct IntakeEffector<D> {
    id: EffectorId,

    driver: D,

    run: Run,

    /// The last output written to the driver
    last_output: f64,
}

/// Input data to the effector.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Current session time.
    ///
    /// Units: seconds
    pub now_s: f64,
}

/// Output of one effector tick.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct OutputData {
    /// The normalised output written to the driver this tick.
    pub output: f64,
}

/// Status report for effector processing.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct StatusReport {
    /// A timed run ended on this tick.
    pub timed_run_complete: bool,
}

/// Read-only view of an effector, used for telemetry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EffectorSnapshot {
    pub id: EffectorId,
    pub output: f64,
    pub run: Run,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What the effector is currently doing.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum Run {
    Stopped,

    Continuous {
        speed: f64
    },

    Timed {
        speed: f64,
        start_s: f64,
        duration_s: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: MotorDriver> IntakeEffector<D> {
    /// Create a new effector, configuring the motor's current limit and brake
    /// mode.
    pub fn new(id: EffectorId, params: &MotorParams, mut driver: D) -> Result<Self, EffectorError> {
        driver.apply_current_limit(params.current_limit_a)?;
        driver.set_brake_mode(params.brake)?;

        Ok(Self {
            id,
            driver,
            run: Run::Stopped,
            last_output: 0.0,
        })
    }

    /// Run at a constant speed until stopped or replaced by another command.
    pub fn run(&mut self, speed: f64) -> Result<(), EffectorError> {
        let speed = clamp_speed(speed);
        debug!("{}: run at {:.2}", self.id, speed);

        self.run = Run::Continuous { speed };
        self.write(speed)
    }

    /// Run at a constant speed for `duration_s` seconds starting at `now_s`.
    ///
    /// The run ends on the first tick more than `duration_s` after the start.
    pub fn run_for(&mut self, speed: f64, duration_s: f64, now_s: f64) -> Result<(), EffectorError> {
        let speed = clamp_speed(speed);
        debug!("{}: run at {:.2} for {:.2} s", self.id, speed, duration_s);

        self.run = Run::Timed {
            speed,
            start_s: now_s,
            duration_s,
        };
        self.write(speed)
    }

    /// Stop the effector.
    pub fn stop(&mut self) -> Result<(), EffectorError> {
        if self.run != Run::Stopped {
            debug!("{}: stop", self.id);
        }

        self.run = Run::Stopped;
        self.write(0.0)
    }

    pub fn id(&self) -> EffectorId {
        self.id
    }

    pub fn current_run(&self) -> Run {
        self.run
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn snapshot(&self) -> EffectorSnapshot {
        EffectorSnapshot {
            id: self.id,
            output: self.last_output,
            run: self.run,
        }
    }

    fn write(&mut self, output: f64) -> Result<(), EffectorError> {
        match self.driver.write_output(output) {
            Ok(()) => {
                self.last_output = output;
                Ok(())
            },
            Err(e) => {
                warn!("{}: failed to write output {:.4}: {}", self.id, output, e);

                if let Err(e) = self.driver.write_output(0.0) {
                    warn!("{}: failed to write zero output: {}", self.id, e);
                }
                self.last_output = 0.0;

                Err(EffectorError::Driver(e))
            }
        }
    }
}

impl<D: MotorDriver> State for IntakeEffector<D> {
    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = EffectorError;

    /// Perform cyclic processing of the effector, ending any timed run which
    /// has expired.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        let output = match self.run {
            Run::Stopped => 0.0,
            Run::Continuous { speed } => speed,
            Run::Timed { speed, start_s, duration_s } => {
                if input_data.now_s - start_s > duration_s {
                    debug!("{}: timed run complete", self.id);
                    self.run = Run::Stopped;
                    report.timed_run_complete = true;
                    0.0
                }
                else {
                    speed
                }
            }
        };

        self.write(output)?;

        trace!("{}: output {:.3}", self.id, output);

        Ok((OutputData { output }, report))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.max(-1.0).min(1.0)
    }
    else {
        0.0
    }
}
