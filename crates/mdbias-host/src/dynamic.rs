//! Runtime binding to the library's C interface through `libloading`.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};
use std::sync::Arc;

use libloading::Library;
use log::{debug, info, warn};
use mdbias_core::errors::{BiasError, ErrorInfo};

use crate::abi::{CmdArg, LogTarget};
use crate::loader::kernel_path_from_env;
use crate::session::{CommandInterface, LibraryOpener};

#[repr(C)]
#[derive(Clone, Copy)]
struct PlumedHandle {
    _p: *mut c_void,
}

type FailureHandler = unsafe extern "C" fn(*mut c_void, c_int, *const c_char, *const c_void);

#[repr(C)]
struct NothrowHandler {
    ptr: *mut c_void,
    handler: Option<FailureHandler>,
}

type CreateFn = unsafe extern "C" fn() -> PlumedHandle;
type CmdFn = unsafe extern "C" fn(PlumedHandle, *const c_char, *const c_void);
type CmdNothrowFn =
    unsafe extern "C" fn(PlumedHandle, *const c_char, *const c_void, NothrowHandler);
type FinalizeFn = unsafe extern "C" fn(PlumedHandle);
type ValidFn = unsafe extern "C" fn(PlumedHandle) -> c_int;

struct Symbols {
    create: CreateFn,
    cmd: CmdFn,
    cmd_nothrow: Option<CmdNothrowFn>,
    finalize: FinalizeFn,
    valid: Option<ValidFn>,
}

struct LoadedLibrary {
    path: PathBuf,
    symbols: Symbols,
    // Keeps the code behind `symbols` mapped.
    _library: Library,
}

/// A loaded copy of the sampling library's shared object.
#[derive(Clone)]
pub struct PlumedLibrary {
    inner: Arc<LoadedLibrary>,
}

impl fmt::Debug for PlumedLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlumedLibrary")
            .field("path", &self.inner.path)
            .field("nothrow", &self.inner.symbols.cmd_nothrow.is_some())
            .finish()
    }
}

fn library_error(code: &str, path: &Path, err: impl fmt::Display) -> BiasError {
    BiasError::Library(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

impl PlumedLibrary {
    /// Loads the shared object at `path` and resolves the C entry points.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BiasError> {
        let path = path.as_ref();
        // SAFETY: loading runs the library's initializers; the library is a
        // trusted dependency selected by the user.
        let library = unsafe { Library::new(path) }
            .map_err(|err| library_error("mdbias_host.load", path, err))?;
        let symbols = unsafe {
            Symbols {
                create: *library
                    .get::<CreateFn>(b"plumed_create\0")
                    .map_err(|err| library_error("mdbias_host.symbol", path, err))?,
                cmd: *library
                    .get::<CmdFn>(b"plumed_cmd\0")
                    .map_err(|err| library_error("mdbias_host.symbol", path, err))?,
                cmd_nothrow: library
                    .get::<CmdNothrowFn>(b"plumed_cmd_nothrow\0")
                    .ok()
                    .map(|symbol| *symbol),
                finalize: *library
                    .get::<FinalizeFn>(b"plumed_finalize\0")
                    .map_err(|err| library_error("mdbias_host.symbol", path, err))?,
                valid: library
                    .get::<ValidFn>(b"plumed_valid\0")
                    .ok()
                    .map(|symbol| *symbol),
            }
        };
        info!(
            "loaded sampling library from {} (nothrow commands: {})",
            path.display(),
            symbols.cmd_nothrow.is_some()
        );
        Ok(Self {
            inner: Arc::new(LoadedLibrary {
                path: path.to_path_buf(),
                symbols,
                _library: library,
            }),
        })
    }

    /// Loads the library named by `PLUMED_KERNEL`.
    pub fn from_env() -> Result<Self, BiasError> {
        Self::load(kernel_path_from_env()?)
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Creates a new session handle.
    pub fn open_session(&self) -> Result<PlumedSession, BiasError> {
        let symbols = &self.inner.symbols;
        // SAFETY: `create` was resolved from the loaded library.
        let handle = unsafe { (symbols.create)() };
        if let Some(valid) = symbols.valid {
            // SAFETY: `handle` was just returned by `create`.
            if unsafe { valid(handle) } == 0 {
                unsafe { (symbols.finalize)(handle) };
                return Err(library_error(
                    "mdbias_host.invalid_handle",
                    &self.inner.path,
                    "library returned an invalid session handle",
                ));
            }
        }
        debug!("opened library session");
        Ok(PlumedSession {
            library: Arc::clone(&self.inner),
            handle,
            log_streams: Vec::new(),
        })
    }
}

impl LibraryOpener for PlumedLibrary {
    fn open(&self) -> Result<Box<dyn CommandInterface>, BiasError> {
        Ok(Box::new(self.open_session()?))
    }
}

/// One library session; finalized, together with any log stream it opened, on drop.
pub struct PlumedSession {
    library: Arc<LoadedLibrary>,
    handle: PlumedHandle,
    log_streams: Vec<NonNull<libc::FILE>>,
}

impl fmt::Debug for PlumedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlumedSession")
            .field("library", &self.library.path)
            .field("log_streams", &self.log_streams.len())
            .finish()
    }
}

unsafe extern "C" fn record_failure(
    slot: *mut c_void,
    code: c_int,
    what: *const c_char,
    _opt: *const c_void,
) {
    let slot = &mut *(slot as *mut Option<(i32, String)>);
    let message = if what.is_null() {
        String::from("unknown library error")
    } else {
        CStr::from_ptr(what).to_string_lossy().into_owned()
    };
    *slot = Some((code, message));
}

fn to_cstring(key: &str, text: &str) -> Result<CString, BiasError> {
    CString::new(text).map_err(|err| {
        BiasError::command(key, format!("argument contains an interior NUL: {err}"))
    })
}

impl PlumedSession {
    fn send(&mut self, key: &CStr, value: *const c_void) -> Result<(), BiasError> {
        let symbols = &self.library.symbols;
        match symbols.cmd_nothrow {
            Some(cmd_nothrow) => {
                let mut failure: Option<(i32, String)> = None;
                let handler = NothrowHandler {
                    ptr: &mut failure as *mut Option<(i32, String)> as *mut c_void,
                    handler: Some(record_failure),
                };
                // SAFETY: `handler.ptr` outlives the call and matches `record_failure`.
                unsafe { cmd_nothrow(self.handle, key.as_ptr(), value, handler) };
                match failure {
                    None => Ok(()),
                    Some((code, message)) => {
                        let key = key.to_string_lossy();
                        Err(BiasError::Command(
                            ErrorInfo::new("mdbias.command_failed", message)
                                .with_context("command", key.into_owned())
                                .with_context("library_code", code.to_string()),
                        ))
                    }
                }
            }
            None => {
                // Without the nothrow entry point a rejected command aborts the process.
                unsafe { (symbols.cmd)(self.handle, key.as_ptr(), value) };
                Ok(())
            }
        }
    }

    fn open_log(
        &mut self,
        key: &str,
        target: &LogTarget,
    ) -> Result<NonNull<libc::FILE>, BiasError> {
        let stream = match target {
            LogTarget::Stdout => unsafe {
                let fd = libc::dup(libc::STDOUT_FILENO);
                if fd < 0 {
                    ptr::null_mut()
                } else {
                    libc::fdopen(fd, b"w\0".as_ptr().cast())
                }
            },
            LogTarget::File(path) => {
                let path_c = to_cstring(key, &path.to_string_lossy())?;
                unsafe { libc::fopen(path_c.as_ptr(), b"w\0".as_ptr().cast()) }
            }
        };
        let stream = NonNull::new(stream).ok_or_else(|| {
            BiasError::Command(
                ErrorInfo::new(
                    "mdbias_host.log_open",
                    std::io::Error::last_os_error().to_string(),
                )
                .with_context("command", key)
                .with_context("target", format!("{target:?}")),
            )
        })?;
        self.log_streams.push(stream);
        Ok(stream)
    }
}

impl CommandInterface for PlumedSession {
    fn cmd(&mut self, key: &str, arg: CmdArg<'_>) -> Result<(), BiasError> {
        let key_c = to_cstring(key, key)?;
        match arg {
            CmdArg::None => self.send(&key_c, ptr::null()),
            CmdArg::Int(value) => self.send(&key_c, &value as *const i32 as *const c_void),
            CmdArg::IntOut(value) => self.send(&key_c, value as *mut i32 as *const c_void),
            CmdArg::Real(value) => self.send(&key_c, &value as *const f64 as *const c_void),
            CmdArg::RealOut(value) => self.send(&key_c, value as *mut f64 as *const c_void),
            CmdArg::Reals(values) => self.send(&key_c, values.as_ptr().cast()),
            CmdArg::RealsMut(values) => self.send(&key_c, values.as_mut_ptr().cast_const().cast()),
            CmdArg::Text(text) => {
                let text_c = to_cstring(key, text)?;
                self.send(&key_c, text_c.as_ptr().cast())
            }
            CmdArg::Comm(comm) => self.send(&key_c, comm.as_ptr()),
            CmdArg::Log(target) => {
                let stream = self.open_log(key, target)?;
                self.send(&key_c, stream.as_ptr().cast_const().cast())
            }
        }
    }
}

impl Drop for PlumedSession {
    fn drop(&mut self) {
        // SAFETY: the handle came from `create` and is finalized exactly once.
        unsafe { (self.library.symbols.finalize)(self.handle) };
        for stream in self.log_streams.drain(..) {
            if unsafe { libc::fclose(stream.as_ptr()) } != 0 {
                warn!("failed to close library log stream");
            }
        }
        debug!("finalized library session");
    }
}
