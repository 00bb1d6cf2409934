use std::path::PathBuf;

use mdbias_core::RawComm;
use serde::{Deserialize, Serialize};

/// Oldest library interface the adapter can drive.
pub const MIN_API_VERSION: i32 = 4;

/// Newest interface that still requires line-by-line script input.
pub const LAST_LINE_INPUT_API_VERSION: i32 = 7;

/// Floating point width announced through `setRealPrecision`.
pub const REAL_PRECISION_BYTES: i32 = 8;

/// Command keys understood by the sampling library.
pub mod keys {
    pub const GREX_SET_INTERCOMM: &str = "GREX setMPIIntercomm";
    pub const GREX_SET_INTRACOMM: &str = "GREX setMPIIntracomm";
    pub const GREX_INIT: &str = "GREX init";
    pub const SET_MPI_COMM: &str = "setMPIComm";
    pub const GET_API_VERSION: &str = "getApiVersion";
    pub const SET_REAL_PRECISION: &str = "setRealPrecision";
    pub const SET_ENERGY_UNITS: &str = "setMDEnergyUnits";
    pub const SET_LENGTH_UNITS: &str = "setMDLengthUnits";
    pub const SET_TIME_UNITS: &str = "setMDTimeUnits";
    pub const SET_MD_ENGINE: &str = "setMDEngine";
    pub const SET_LOG: &str = "setLog";
    pub const SET_NATOMS: &str = "setNatoms";
    pub const SET_TIMESTEP: &str = "setTimestep";
    pub const SET_KBT: &str = "setKbT";
    pub const SET_RESTART: &str = "setRestart";
    pub const INIT: &str = "init";
    pub const READ_INPUT_LINES: &str = "readInputLines";
    pub const READ_INPUT_LINE: &str = "readInputLine";
    pub const SET_STEP: &str = "setStep";
    pub const SET_MASSES: &str = "setMasses";
    pub const SET_CHARGES: &str = "setCharges";
    pub const SET_POSITIONS: &str = "setPositions";
    pub const SET_FORCES: &str = "setForces";
    pub const SET_BOX: &str = "setBox";
    pub const SET_VIRIAL: &str = "setVirial";
    pub const PREPARE_CALC: &str = "prepareCalc";
    pub const PERFORM_CALC_NO_UPDATE: &str = "performCalcNoUpdate";
    pub const UPDATE: &str = "update";
    pub const GET_BIAS: &str = "getBias";
}

/// Destination of the library's log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogTarget {
    /// The process's standard output.
    #[default]
    Stdout,
    /// A file created (or truncated) when the session opens its log.
    File(PathBuf),
}

/// Argument passed alongside a command key.
///
/// Slice and out-pointer variants hand the library an address. The library
/// may keep the address of a state buffer until the next compute command, so
/// callers keep those buffers borrowed until the compute has returned.
#[derive(Debug)]
pub enum CmdArg<'a> {
    /// No argument (a null pointer on the wire).
    None,
    /// A single integer passed by address.
    Int(i32),
    /// An integer the library writes into.
    IntOut(&'a mut i32),
    /// A single double passed by address.
    Real(f64),
    /// A double the library writes into.
    RealOut(&'a mut f64),
    /// A read-only array of doubles.
    Reals(&'a [f64]),
    /// An array of doubles the library may modify.
    RealsMut(&'a mut [f64]),
    /// Text, sent NUL terminated.
    Text(&'a str),
    /// Address of a communicator handle.
    Comm(RawComm),
    /// Log destination, opened by the session.
    Log(&'a LogTarget),
}

impl CmdArg<'_> {
    /// Short label of the argument shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            CmdArg::None => "none",
            CmdArg::Int(_) => "int",
            CmdArg::IntOut(_) => "int-out",
            CmdArg::Real(_) => "real",
            CmdArg::RealOut(_) => "real-out",
            CmdArg::Reals(_) => "reals",
            CmdArg::RealsMut(_) => "reals-mut",
            CmdArg::Text(_) => "text",
            CmdArg::Comm(_) => "comm",
            CmdArg::Log(_) => "log",
        }
    }
}
