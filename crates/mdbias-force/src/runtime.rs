use log::info;
use mdbias_core::{BiasError, ParallelRuntime};

/// Starts the parallel runtime unless something in this process already did.
///
/// Returns whether this call performed the initialization.
pub fn ensure_parallel_runtime(runtime: &dyn ParallelRuntime) -> Result<bool, BiasError> {
    if runtime.is_initialized() {
        return Ok(false);
    }
    runtime.initialize()?;
    info!("initialized parallel runtime");
    Ok(true)
}
