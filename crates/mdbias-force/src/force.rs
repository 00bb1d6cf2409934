use std::sync::Arc;

use mdbias_core::{Communicator, Force};
use mdbias_host::LogTarget;

/// Temperature value meaning "not set"; no thermal energy is passed on.
pub const UNSET_TEMPERATURE: f64 = -1.0;

/// Engine name announced to the library unless overridden.
pub const DEFAULT_MD_ENGINE: &str = "OpenMM";

/// A force whose behaviour is defined by a sampling-library input script.
///
/// The script can define bias potentials to apply to the system as well as
/// values to write out every time the force is evaluated. For example,
/// metadynamics on the distance between particles 0 and 9:
///
/// ```text
/// d: DISTANCE ATOMS=1,10
/// METAD ARG=d SIGMA=0.2 HEIGHT=0.3 PACE=500
/// ```
///
/// Atoms in the script are numbered from 1 while the host numbers particles
/// from 0. No translation is applied.
///
/// The descriptor only stores settings. Everything is validated when a
/// kernel is initialized against a concrete system.
#[derive(Debug, Clone)]
pub struct PlumedForce {
    script: String,
    intra_comm: Arc<dyn Communicator>,
    inter_comm: Arc<dyn Communicator>,
    temperature: f64,
    masses: Vec<f64>,
    log_target: LogTarget,
    restart: bool,
    md_engine: String,
}

impl PlumedForce {
    /// Creates a force from a script and the replica-exchange communicator pair.
    pub fn new(
        script: impl Into<String>,
        intra_comm: Arc<dyn Communicator>,
        inter_comm: Arc<dyn Communicator>,
    ) -> Self {
        Self {
            script: script.into(),
            intra_comm,
            inter_comm,
            temperature: UNSET_TEMPERATURE,
            masses: Vec::new(),
            log_target: LogTarget::Stdout,
            restart: false,
            md_engine: DEFAULT_MD_ENGINE.to_string(),
        }
    }

    /// The input script.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Communicator within one replica.
    pub fn intra_comm(&self) -> &Arc<dyn Communicator> {
        &self.intra_comm
    }

    /// Communicator across replicas.
    pub fn inter_comm(&self) -> &Arc<dyn Communicator> {
        &self.inter_comm
    }

    /// Temperature in Kelvin; negative means unset.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Sets the temperature in Kelvin. A negative value leaves it unset.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Mass override in Dalton; empty means the system masses are used.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Overrides particle masses, e.g. to give the library physical masses
    /// for center-of-mass definitions when hydrogen mass repartitioning is
    /// applied to the system.
    pub fn set_masses(&mut self, masses: Vec<f64>) {
        self.masses = masses;
    }

    /// Destination of the library log.
    pub fn log_target(&self) -> &LogTarget {
        &self.log_target
    }

    /// Sets the destination of the library log. Defaults to standard output.
    pub fn set_log_target(&mut self, target: LogTarget) {
        self.log_target = target;
    }

    /// Whether the library resumes accumulated bias from earlier output.
    pub fn restart(&self) -> bool {
        self.restart
    }

    /// Sets the restart state. Defaults to `false`.
    pub fn set_restart(&mut self, restart: bool) {
        self.restart = restart;
    }

    /// Engine name announced to the library.
    pub fn md_engine(&self) -> &str {
        &self.md_engine
    }

    /// Overrides the engine name announced to the library.
    pub fn set_md_engine(&mut self, md_engine: impl Into<String>) {
        self.md_engine = md_engine.into();
    }
}

impl Force for PlumedForce {
    /// Always false: box vectors are handed to the library, which applies
    /// its own periodic wrapping.
    fn uses_periodic_boundary_conditions(&self) -> bool {
        false
    }
}
