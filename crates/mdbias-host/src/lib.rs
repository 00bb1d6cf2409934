//! Command interface to the external enhanced-sampling library.
//!
//! Everything the adapter asks of the library goes through a single
//! `cmd(key, argument)` entry point. This crate defines that surface, the
//! interface version gate, and (with the `dynamic` feature) a binding that
//! loads the library's shared object at runtime.

mod abi;
#[cfg(all(feature = "dynamic", unix))]
mod dynamic;
mod loader;
mod session;

pub use abi::{
    keys, CmdArg, LogTarget, LAST_LINE_INPUT_API_VERSION, MIN_API_VERSION, REAL_PRECISION_BYTES,
};
#[cfg(all(feature = "dynamic", unix))]
pub use dynamic::{PlumedLibrary, PlumedSession};
pub use loader::{kernel_path_from_env, supports_multiline_input, verify_api_compat, KERNEL_ENV_VAR};
pub use session::{CommandInterface, LibraryOpener};
