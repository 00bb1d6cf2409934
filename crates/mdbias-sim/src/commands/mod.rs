use std::error::Error;
use std::path::Path;

use mdbias_host::LibraryOpener;

pub mod check;
pub mod evaluate;
pub mod frames;
pub mod version;

/// Opens the library at `kernel`, falling back to `PLUMED_KERNEL`.
#[cfg(unix)]
pub fn open_library(kernel: Option<&Path>) -> Result<Box<dyn LibraryOpener>, Box<dyn Error>> {
    let library = match kernel {
        Some(path) => mdbias_host::PlumedLibrary::load(path)?,
        None => mdbias_host::PlumedLibrary::from_env()?,
    };
    log::info!("using sampling library at {}", library.path().display());
    Ok(Box::new(library))
}

#[cfg(not(unix))]
pub fn open_library(_kernel: Option<&Path>) -> Result<Box<dyn LibraryOpener>, Box<dyn Error>> {
    Err("loading the sampling library is only supported on unix targets".into())
}
