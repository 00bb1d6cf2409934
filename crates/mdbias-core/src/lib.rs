#![deny(missing_docs)]
//! Core traits and data types for the mdbias adapter.
//!
//! The traits in this crate describe the host side of the adapter: the
//! simulated system and its force list, the live context that owns the
//! per-step buffers, and the parallel runtime with its communicators. The
//! sampling library side lives in `mdbias-host`.

use std::ffi::c_void;
use std::fmt;

pub mod errors;
pub mod units;

pub use errors::{BiasError, ErrorInfo};

/// Cartesian triple used for positions, forces and box vectors.
pub type Vec3 = [f64; 3];

/// Per-particle charge parameters exposed by a nonbonded force.
pub trait ChargeProvider {
    /// Returns the charge of the particle, or `None` if the index is unknown.
    fn particle_charge(&self, index: usize) -> Option<f64>;
}

/// A force term registered in a [`System`].
pub trait Force: Send + Sync {
    /// Returns whether the force applies periodic boundary conditions.
    fn uses_periodic_boundary_conditions(&self) -> bool;

    /// Capability query: forces that carry per-particle charges expose them here.
    fn charge_parameters(&self) -> Option<&dyn ChargeProvider> {
        None
    }
}

/// Static description of a simulated system.
pub trait System {
    /// Number of particles in the system.
    fn num_particles(&self) -> usize;

    /// Mass of the particle at `index`, in Dalton.
    fn particle_mass(&self, index: usize) -> f64;

    /// Registered forces, in insertion order.
    fn forces(&self) -> &[Box<dyn Force>];

    /// Returns true if any registered force is periodic.
    fn uses_periodic_boundary_conditions(&self) -> bool {
        self.forces()
            .iter()
            .any(|force| force.uses_periodic_boundary_conditions())
    }
}

/// Simultaneous views of the buffers a context owns for the current step.
#[derive(Debug)]
pub struct StepBuffers<'a> {
    /// Particle positions in nm.
    pub positions: &'a [Vec3],
    /// Accumulated forces in kJ/(mol nm); bias contributions are added in place.
    pub forces: &'a mut [Vec3],
    /// Periodic box vectors, one row per vector.
    pub box_vectors: &'a [Vec3; 3],
}

/// A live simulation context bound to one system and integrator.
pub trait Context {
    /// Index of the current integration step.
    fn step_count(&self) -> i64;

    /// Integrator step size in ps.
    fn step_size(&self) -> f64;

    /// Borrows positions, forces and box vectors together.
    fn buffers(&mut self) -> StepBuffers<'_>;
}

/// Opaque pointer to a communicator handle owned by the parallel runtime.
///
/// The library receives the address of the handle, never the handle itself,
/// so the pointee must stay alive for as long as the library session does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawComm(*const c_void);

impl RawComm {
    /// Wraps the address of a communicator handle.
    pub fn from_ptr(ptr: *const c_void) -> Self {
        Self(ptr)
    }

    /// Returns the wrapped address.
    pub fn as_ptr(self) -> *const c_void {
        self.0
    }
}

/// A communicator handle passed through to the sampling library.
pub trait Communicator: Send + Sync + fmt::Debug {
    /// Rank of the calling process within this communicator.
    fn rank(&self) -> i32;

    /// Address of the underlying handle.
    fn as_raw(&self) -> RawComm;
}

/// The process-wide parallel communication runtime.
pub trait ParallelRuntime: Send + Sync {
    /// Returns whether the runtime has already been started in this process.
    fn is_initialized(&self) -> bool;

    /// Starts the runtime. Callers check [`Self::is_initialized`] first.
    fn initialize(&self) -> Result<(), BiasError>;
}
