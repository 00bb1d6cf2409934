use std::env;
use std::path::PathBuf;

use crate::abi::{LAST_LINE_INPUT_API_VERSION, MIN_API_VERSION};
use mdbias_core::errors::{BiasError, ErrorInfo};

/// Environment variable naming the library's shared object.
pub const KERNEL_ENV_VAR: &str = "PLUMED_KERNEL";

/// Rejects library interface versions older than [`MIN_API_VERSION`].
pub fn verify_api_compat(api_version: i32) -> Result<(), BiasError> {
    if api_version < MIN_API_VERSION {
        return Err(BiasError::Version(
            ErrorInfo::new(
                "mdbias_host.api_version",
                format!(
                    "library API {api_version} is older than the supported minimum {MIN_API_VERSION}"
                ),
            )
            .with_hint("Upgrade PLUMED to a newer version."),
        ));
    }
    Ok(())
}

/// Returns whether the library accepts a whole multi-line script in one command.
pub fn supports_multiline_input(api_version: i32) -> bool {
    api_version > LAST_LINE_INPUT_API_VERSION
}

/// Resolves the shared object path from [`KERNEL_ENV_VAR`].
pub fn kernel_path_from_env() -> Result<PathBuf, BiasError> {
    match env::var_os(KERNEL_ENV_VAR) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(BiasError::Library(
            ErrorInfo::new(
                "mdbias_host.kernel_unset",
                format!("{KERNEL_ENV_VAR} is not set"),
            )
            .with_hint("point it at libplumedKernel or pass an explicit path"),
        )),
    }
}
