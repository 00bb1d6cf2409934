#![deny(missing_docs)]
//! Reference host platform for the mdbias kernel.
//!
//! Everything lives in plain vectors on the CPU: a [`ReferenceSystem`] with
//! its force list, a [`ReferenceContext`] holding positions, forces, box
//! vectors and the step counter, plus single-process stand-ins for the
//! parallel runtime and its communicators.

mod context;
mod parallel;
mod system;

pub use context::{PlatformData, ReferenceContext};
pub use parallel::{LocalRuntime, SerialCommunicator};
pub use system::{
    ExternalForce, NonbondedForce, NonbondedMethod, ParticleParameters, ReferenceSystem,
    DEFAULT_BOX_VECTORS,
};
