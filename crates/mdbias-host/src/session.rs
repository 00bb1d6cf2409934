use mdbias_core::errors::BiasError;

use crate::abi::CmdArg;

/// One open session of the sampling library.
///
/// Implementations release every external resource they hold (library
/// handle, log streams) when dropped.
pub trait CommandInterface {
    /// Issues a single command. A rejected command is a [`BiasError::Command`].
    fn cmd(&mut self, key: &str, arg: CmdArg<'_>) -> Result<(), BiasError>;
}

/// Opens fresh library sessions; each kernel asks for exactly one.
pub trait LibraryOpener {
    /// Creates a new, independent session.
    fn open(&self) -> Result<Box<dyn CommandInterface>, BiasError>;
}

impl<T: LibraryOpener + ?Sized> LibraryOpener for &T {
    fn open(&self) -> Result<Box<dyn CommandInterface>, BiasError> {
        (**self).open()
    }
}
