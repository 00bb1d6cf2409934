use mdbias_core::errors::{BiasError, ErrorInfo};
use mdbias_core::{ChargeProvider, Force, System, Vec3};
use serde::{Deserialize, Serialize};

/// Box used until the caller sets one: a 2 nm cube.
pub const DEFAULT_BOX_VECTORS: [Vec3; 3] = [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]];

/// A system held entirely in memory.
#[derive(Default)]
pub struct ReferenceSystem {
    masses: Vec<f64>,
    forces: Vec<Box<dyn Force>>,
    default_box_vectors: Option<[Vec3; 3]>,
}

impl ReferenceSystem {
    /// Creates an empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a particle and returns its index.
    pub fn add_particle(&mut self, mass: f64) -> usize {
        self.masses.push(mass);
        self.masses.len() - 1
    }

    /// Adds a force and returns its index in the force list.
    pub fn add_force(&mut self, force: Box<dyn Force>) -> usize {
        self.forces.push(force);
        self.forces.len() - 1
    }

    /// Sets the box vectors new contexts start from.
    pub fn set_default_box_vectors(&mut self, box_vectors: [Vec3; 3]) {
        self.default_box_vectors = Some(box_vectors);
    }

    /// Box vectors new contexts start from.
    pub fn default_box_vectors(&self) -> [Vec3; 3] {
        self.default_box_vectors.unwrap_or(DEFAULT_BOX_VECTORS)
    }
}

impl System for ReferenceSystem {
    fn num_particles(&self) -> usize {
        self.masses.len()
    }

    fn particle_mass(&self, index: usize) -> f64 {
        self.masses.get(index).copied().unwrap_or(0.0)
    }

    fn forces(&self) -> &[Box<dyn Force>] {
        &self.forces
    }
}

/// How nonbonded interactions are cut off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonbondedMethod {
    /// All pairs interact, no periodicity.
    #[default]
    NoCutoff,
    /// Cutoff without periodic images.
    CutoffNonPeriodic,
    /// Cutoff with periodic images.
    CutoffPeriodic,
    /// Ewald summation.
    Ewald,
    /// Particle mesh Ewald.
    Pme,
}

impl NonbondedMethod {
    /// Returns whether the method uses periodic images.
    pub fn is_periodic(self) -> bool {
        matches!(
            self,
            NonbondedMethod::CutoffPeriodic | NonbondedMethod::Ewald | NonbondedMethod::Pme
        )
    }
}

/// Per-particle nonbonded parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleParameters {
    /// Charge in elementary charges.
    pub charge: f64,
    /// Lennard-Jones sigma in nm.
    pub sigma: f64,
    /// Lennard-Jones epsilon in kJ/mol.
    pub epsilon: f64,
}

/// Coulomb and Lennard-Jones parameter holder; the charge provider of a system.
#[derive(Debug, Clone, Default)]
pub struct NonbondedForce {
    method: NonbondedMethod,
    particles: Vec<ParticleParameters>,
}

impl NonbondedForce {
    /// Creates a force without particles and no cutoff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends parameters for the next particle and returns its index.
    pub fn add_particle(&mut self, charge: f64, sigma: f64, epsilon: f64) -> usize {
        self.particles.push(ParticleParameters {
            charge,
            sigma,
            epsilon,
        });
        self.particles.len() - 1
    }

    /// Parameters of the particle at `index`.
    pub fn particle_parameters(&self, index: usize) -> Result<ParticleParameters, BiasError> {
        self.particles.get(index).copied().ok_or_else(|| {
            BiasError::Config(
                ErrorInfo::new("mdbias_reference.particle_index", "particle index out of range")
                    .with_context("index", index.to_string())
                    .with_context("particles", self.particles.len().to_string()),
            )
        })
    }

    /// Number of parameterized particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Current cutoff method.
    pub fn nonbonded_method(&self) -> NonbondedMethod {
        self.method
    }

    /// Sets the cutoff method.
    pub fn set_nonbonded_method(&mut self, method: NonbondedMethod) {
        self.method = method;
    }
}

impl ChargeProvider for NonbondedForce {
    fn particle_charge(&self, index: usize) -> Option<f64> {
        self.particles.get(index).map(|params| params.charge)
    }
}

impl Force for NonbondedForce {
    fn uses_periodic_boundary_conditions(&self) -> bool {
        self.method.is_periodic()
    }

    fn charge_parameters(&self) -> Option<&dyn ChargeProvider> {
        Some(self)
    }
}

/// Position-dependent external field without per-particle charges.
///
/// Periodic when the field uses minimum-image distances, which is how a
/// system without electrostatics still gets a periodic box.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalForce {
    periodic: bool,
}

impl ExternalForce {
    /// Creates a field evaluated with or without periodic images.
    pub fn new(periodic: bool) -> Self {
        Self { periodic }
    }
}

impl Force for ExternalForce {
    fn uses_periodic_boundary_conditions(&self) -> bool {
        self.periodic
    }
}
