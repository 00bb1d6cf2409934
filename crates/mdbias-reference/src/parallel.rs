use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::debug;
use mdbias_core::{BiasError, Communicator, ParallelRuntime, RawComm};

/// Single-process communicator: always rank 0.
///
/// The raw handle points at a heap word owned by the communicator, so the
/// address stays valid for as long as the communicator lives.
#[derive(Debug)]
pub struct SerialCommunicator {
    rank: i32,
    handle: Box<u64>,
}

impl SerialCommunicator {
    /// Rank-0 communicator.
    pub fn new() -> Self {
        Self::with_rank(0)
    }

    /// Communicator reporting an explicit rank, for driving multi-rank paths in one process.
    pub fn with_rank(rank: i32) -> Self {
        Self {
            rank,
            handle: Box::new(0),
        }
    }
}

impl Default for SerialCommunicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Communicator for SerialCommunicator {
    fn rank(&self) -> i32 {
        self.rank
    }

    fn as_raw(&self) -> RawComm {
        RawComm::from_ptr(&*self.handle as *const u64 as *const c_void)
    }
}

/// Initialization state of the parallel runtime, owned by whoever starts the process.
#[derive(Debug, Default)]
pub struct LocalRuntime {
    initialized: AtomicBool,
    starts: AtomicUsize,
}

impl LocalRuntime {
    /// A runtime that has not been started.
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime some other component already started.
    pub fn already_initialized() -> Self {
        let runtime = Self::default();
        runtime.initialized.store(true, Ordering::SeqCst);
        runtime
    }

    /// How many times [`ParallelRuntime::initialize`] ran.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl ParallelRuntime for LocalRuntime {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn initialize(&self) -> Result<(), BiasError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.initialized.store(true, Ordering::SeqCst);
        debug!("local parallel runtime started");
        Ok(())
    }
}
