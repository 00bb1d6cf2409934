use log::{debug, info, warn};
use mdbias_core::errors::{BiasError, ErrorInfo};
use mdbias_core::units::thermal_energy;
use mdbias_core::{Context, ParallelRuntime, System};
use mdbias_host::{
    keys, supports_multiline_input, verify_api_compat, CmdArg, CommandInterface, LibraryOpener,
    REAL_PRECISION_BYTES,
};

use crate::force::PlumedForce;
use crate::runtime::ensure_parallel_runtime;

/// Unit conversion announced for energy, length and time. The host and the
/// library share kJ/mol, nm and ps.
const IDENTITY_CONVERSION: f64 = 1.0;

/// How the input script reaches the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFeed {
    /// The whole script in one `readInputLines` command.
    Block,
    /// One `readInputLine` per non-empty line. Same-line comments and line
    /// continuations are not understood by the library on this path.
    LineByLine,
}

impl ScriptFeed {
    /// Picks the feeding mode supported by the given interface version.
    pub fn for_api_version(api_version: i32) -> Self {
        if supports_multiline_input(api_version) {
            ScriptFeed::Block
        } else {
            ScriptFeed::LineByLine
        }
    }
}

/// Splits a script on CR/LF boundaries, dropping empty pieces.
pub fn script_lines(script: &str) -> impl Iterator<Item = &str> {
    script.split(['\r', '\n']).filter(|line| !line.is_empty())
}

/// Execution kernel binding one context to one library session.
///
/// Constructed by [`CalcPlumedForceKernel::initialize`]; dropping the kernel
/// finalizes the session.
pub struct CalcPlumedForceKernel {
    session: Box<dyn CommandInterface>,
    api_version: i32,
    script_feed: ScriptFeed,
    last_step_index: Option<i64>,
    masses: Vec<f64>,
    charges: Vec<f64>,
    uses_periodic: bool,
}

impl std::fmt::Debug for CalcPlumedForceKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalcPlumedForceKernel")
            .field("api_version", &self.api_version)
            .field("script_feed", &self.script_feed)
            .field("last_step_index", &self.last_step_index)
            .field("particles", &self.masses.len())
            .field("charges", &!self.charges.is_empty())
            .field("uses_periodic", &self.uses_periodic)
            .finish_non_exhaustive()
    }
}

impl CalcPlumedForceKernel {
    /// Opens a library session and configures it for `system`.
    ///
    /// `step_size` is the integrator step of the owning context. Any failure
    /// drops (and thereby finalizes) the session before returning.
    pub fn initialize(
        system: &dyn System,
        force: &PlumedForce,
        step_size: f64,
        opener: &dyn LibraryOpener,
        runtime: &dyn ParallelRuntime,
    ) -> Result<Self, BiasError> {
        let mut session = opener.open()?;
        ensure_parallel_runtime(runtime)?;

        let intra = force.intra_comm();
        if intra.rank() == 0 {
            session.cmd(
                keys::GREX_SET_INTERCOMM,
                CmdArg::Comm(force.inter_comm().as_raw()),
            )?;
        }
        session.cmd(keys::GREX_SET_INTRACOMM, CmdArg::Comm(intra.as_raw()))?;
        session.cmd(keys::GREX_INIT, CmdArg::None)?;
        session.cmd(keys::SET_MPI_COMM, CmdArg::Comm(intra.as_raw()))?;

        let mut api_version = 0;
        session.cmd(keys::GET_API_VERSION, CmdArg::IntOut(&mut api_version))?;
        verify_api_compat(api_version)?;
        info!("sampling library reports API version {api_version}");

        session.cmd(keys::SET_REAL_PRECISION, CmdArg::Int(REAL_PRECISION_BYTES))?;
        session.cmd(keys::SET_ENERGY_UNITS, CmdArg::Real(IDENTITY_CONVERSION))?;
        session.cmd(keys::SET_LENGTH_UNITS, CmdArg::Real(IDENTITY_CONVERSION))?;
        session.cmd(keys::SET_TIME_UNITS, CmdArg::Real(IDENTITY_CONVERSION))?;
        session.cmd(keys::SET_MD_ENGINE, CmdArg::Text(force.md_engine()))?;
        session.cmd(keys::SET_LOG, CmdArg::Log(force.log_target()))?;

        let num_particles = system.num_particles();
        let natoms = i32::try_from(num_particles).map_err(|_| {
            BiasError::Config(
                ErrorInfo::new(
                    "mdbias_force.particle_count",
                    "particle count exceeds the library's atom index range",
                )
                .with_context("particles", num_particles.to_string()),
            )
        })?;
        session.cmd(keys::SET_NATOMS, CmdArg::Int(natoms))?;
        session.cmd(keys::SET_TIMESTEP, CmdArg::Real(step_size))?;
        let kbt = thermal_energy(force.temperature());
        if kbt >= 0.0 {
            session.cmd(keys::SET_KBT, CmdArg::Real(kbt))?;
        }
        session.cmd(keys::SET_RESTART, CmdArg::Int(i32::from(force.restart())))?;
        session.cmd(keys::INIT, CmdArg::None)?;

        let script_feed = ScriptFeed::for_api_version(api_version);
        match script_feed {
            ScriptFeed::Block => {
                session.cmd(keys::READ_INPUT_LINES, CmdArg::Text(force.script()))?;
            }
            ScriptFeed::LineByLine => {
                for line in script_lines(force.script()) {
                    session.cmd(keys::READ_INPUT_LINE, CmdArg::Text(line))?;
                }
            }
        }
        info!("fed input script to the library ({script_feed:?})");

        let uses_periodic = system.uses_periodic_boundary_conditions();
        let masses = resolve_masses(system, force)?;
        let charges = collect_charges(system)?;
        info!(
            "bias kernel ready: {num_particles} particles, periodic={uses_periodic}, charges={}",
            !charges.is_empty()
        );

        Ok(Self {
            session,
            api_version,
            script_feed,
            last_step_index: None,
            masses,
            charges,
            uses_periodic,
        })
    }

    /// Pushes the current state, runs the bias calculation and returns the bias energy.
    ///
    /// The context's buffers must hold exactly the particle count the kernel
    /// was initialized with. Bias forces are added into the context's force
    /// buffer. Both flags are accepted for interface conformance; forces and
    /// energy are always computed together. Errors here are fatal for the run.
    pub fn execute(
        &mut self,
        context: &mut dyn Context,
        include_forces: bool,
        include_energy: bool,
    ) -> Result<f64, BiasError> {
        let _ = (include_forces, include_energy);
        let step = context.step_count();
        let step_arg = i32::try_from(step).map_err(|_| {
            BiasError::Command(
                ErrorInfo::new(
                    "mdbias_force.step_range",
                    "step index does not fit the library's step argument",
                )
                .with_context("command", keys::SET_STEP)
                .with_context("step", step.to_string()),
            )
        })?;
        let buffers = context.buffers();
        let num_particles = self.masses.len();
        if buffers.positions.len() != num_particles || buffers.forces.len() != num_particles {
            return Err(BiasError::Config(
                ErrorInfo::new(
                    "mdbias_force.buffer_len",
                    "context buffers do not match the particle count the kernel was initialized with",
                )
                .with_context("particles", num_particles.to_string())
                .with_context("positions", buffers.positions.len().to_string())
                .with_context("forces", buffers.forces.len().to_string()),
            ));
        }

        self.session.cmd(keys::SET_STEP, CmdArg::Int(step_arg))?;
        self.session.cmd(keys::SET_MASSES, CmdArg::Reals(&self.masses))?;
        if !self.charges.is_empty() {
            self.session.cmd(keys::SET_CHARGES, CmdArg::Reals(&self.charges))?;
        }
        self.session.cmd(
            keys::SET_POSITIONS,
            CmdArg::Reals(buffers.positions.as_flattened()),
        )?;
        self.session.cmd(
            keys::SET_FORCES,
            CmdArg::RealsMut(buffers.forces.as_flattened_mut()),
        )?;
        if self.uses_periodic {
            self.session.cmd(
                keys::SET_BOX,
                CmdArg::Reals(buffers.box_vectors.as_flattened()),
            )?;
        }
        // Filled by the library, not read back.
        let mut virial = [0.0_f64; 9];
        self.session.cmd(keys::SET_VIRIAL, CmdArg::RealsMut(&mut virial))?;

        self.session.cmd(keys::PREPARE_CALC, CmdArg::None)?;
        self.session.cmd(keys::PERFORM_CALC_NO_UPDATE, CmdArg::None)?;
        if self.last_step_index != Some(step) {
            self.session.cmd(keys::UPDATE, CmdArg::None)?;
            self.last_step_index = Some(step);
            debug!("library update at step {step}");
        }

        let mut energy = 0.0;
        self.session.cmd(keys::GET_BIAS, CmdArg::RealOut(&mut energy))?;
        debug!("bias energy {energy} at step {step}");
        Ok(energy)
    }

    /// Interface version reported by the library.
    pub fn api_version(&self) -> i32 {
        self.api_version
    }

    /// How the script was fed at initialization.
    pub fn script_feed(&self) -> ScriptFeed {
        self.script_feed
    }

    /// Step at which `update` last fired, if any.
    pub fn last_step_index(&self) -> Option<i64> {
        self.last_step_index
    }

    /// Masses sent each step.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Charges sent each step; empty when the system has no charge provider.
    pub fn charges(&self) -> &[f64] {
        &self.charges
    }

    /// Whether box vectors are sent each step.
    pub fn uses_periodic(&self) -> bool {
        self.uses_periodic
    }
}

/// Accepts an empty override or one mass per particle.
pub fn validate_mass_override(overrides: &[f64], num_particles: usize) -> Result<(), BiasError> {
    if overrides.is_empty() || overrides.len() == num_particles {
        return Ok(());
    }
    Err(BiasError::Config(
        ErrorInfo::new(
            "mdbias_force.mass_count",
            "the number of override masses is different from the number of particles",
        )
        .with_context("masses", overrides.len().to_string())
        .with_context("particles", num_particles.to_string()),
    ))
}

fn resolve_masses(system: &dyn System, force: &PlumedForce) -> Result<Vec<f64>, BiasError> {
    let num_particles = system.num_particles();
    let overrides = force.masses();
    validate_mass_override(overrides, num_particles)?;
    if overrides.is_empty() {
        return Ok((0..num_particles)
            .map(|index| system.particle_mass(index))
            .collect());
    }
    info!("using {} override masses", overrides.len());
    Ok(overrides.to_vec())
}

fn collect_charges(system: &dyn System) -> Result<Vec<f64>, BiasError> {
    let mut providers = system
        .forces()
        .iter()
        .filter_map(|force| force.charge_parameters());
    let Some(provider) = providers.next() else {
        return Ok(Vec::new());
    };
    if providers.next().is_some() {
        warn!("system has several charge-providing forces; using the first one");
    }
    (0..system.num_particles())
        .map(|index| {
            provider.particle_charge(index).ok_or_else(|| {
                BiasError::Config(
                    ErrorInfo::new(
                        "mdbias_force.charge_missing",
                        "charge provider has no parameters for a particle",
                    )
                    .with_context("particle", index.to_string()),
                )
            })
        })
        .collect()
}
