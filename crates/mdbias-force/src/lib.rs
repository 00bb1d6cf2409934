#![deny(missing_docs)]
//! Bias force for molecular-dynamics hosts, driven by an external
//! enhanced-sampling library.
//!
//! A [`PlumedForce`] describes the bias (input script, communicators,
//! temperature, masses, log, restart). A [`CalcPlumedForceKernel`] binds it
//! to one context: it opens a library session at initialization and, every
//! step, pushes the host state, lets the library add its bias forces and
//! returns the bias energy.

/// TOML configuration for force descriptors.
pub mod config;
/// The force descriptor.
pub mod force;
/// Per-context execution kernel.
pub mod kernel;
/// Process-wide parallel runtime startup.
pub mod runtime;

pub use config::{config_base_dir, load_force_config, ForceConfig};
pub use force::{PlumedForce, DEFAULT_MD_ENGINE, UNSET_TEMPERATURE};
pub use kernel::{script_lines, validate_mass_override, CalcPlumedForceKernel, ScriptFeed};
pub use runtime::ensure_parallel_runtime;
