#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mdbias_core::{BiasError, Communicator};
use mdbias_force::PlumedForce;
use mdbias_host::{keys, CmdArg, CommandInterface, LibraryOpener, LogTarget};
use mdbias_reference::{NonbondedForce, NonbondedMethod, ReferenceSystem, SerialCommunicator};

pub const METAD_SCRIPT: &str =
    "d: DISTANCE ATOMS=1,10\nMETAD ARG=d SIGMA=0.2 HEIGHT=0.3 PACE=500";

/// Argument as the mock library saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    None,
    Int(i32),
    Real(f64),
    Reals(Vec<f64>),
    Text(String),
    Comm(usize),
    Log(LogTarget),
    Out,
}

#[derive(Debug, Default)]
pub struct Journal {
    pub commands: Vec<(String, Recorded)>,
    pub actions: Vec<String>,
    pub initialized: bool,
    pub sessions_opened: usize,
    pub sessions_finalized: usize,
}

impl Journal {
    pub fn keys(&self) -> Vec<&str> {
        self.commands.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn count(&self, key: &str) -> usize {
        self.commands.iter().filter(|(k, _)| k == key).count()
    }

    pub fn args(&self, key: &str) -> Vec<&Recorded> {
        self.commands
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, arg)| arg)
            .collect()
    }
}

/// Stand-in for the sampling library: journals every command and applies a
/// harmonic restraint pulling particle 0 towards the origin.
#[derive(Debug, Clone)]
pub struct MockLibrary {
    pub api_version: i32,
    pub stiffness: f64,
    pub reject: Option<&'static str>,
    pub journal: Arc<Mutex<Journal>>,
}

impl MockLibrary {
    pub fn new(api_version: i32) -> Self {
        Self {
            api_version,
            stiffness: 10.0,
            reject: None,
            journal: Arc::new(Mutex::new(Journal::default())),
        }
    }

    pub fn rejecting(api_version: i32, key: &'static str) -> Self {
        Self {
            reject: Some(key),
            ..Self::new(api_version)
        }
    }

    pub fn journal(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }

    /// Keys issued after `init`, in order.
    pub fn keys_since(&self, key: &str) -> Vec<String> {
        let journal = self.journal();
        let keys = journal.keys();
        let start = keys.iter().rposition(|k| *k == key).map_or(0, |idx| idx + 1);
        keys[start..].iter().map(|k| k.to_string()).collect()
    }
}

impl LibraryOpener for MockLibrary {
    fn open(&self) -> Result<Box<dyn CommandInterface>, BiasError> {
        self.journal().sessions_opened += 1;
        Ok(Box::new(MockSession {
            api_version: self.api_version,
            stiffness: self.stiffness,
            reject: self.reject,
            journal: Arc::clone(&self.journal),
            positions: Vec::new(),
            pending_bias: 0.0,
            bias: 0.0,
        }))
    }
}

struct MockSession {
    api_version: i32,
    stiffness: f64,
    reject: Option<&'static str>,
    journal: Arc<Mutex<Journal>>,
    positions: Vec<f64>,
    pending_bias: f64,
    bias: f64,
}

fn register_line(actions: &mut Vec<String>, line: &str) {
    let line = line.split('#').next().unwrap_or("").trim();
    if !line.is_empty() {
        actions.push(line.to_string());
    }
}

/// Adds `-k x0` to the force on particle 0 and returns `k |x0|^2 / 2`.
fn harmonic_bias(positions: &[f64], forces: &mut [f64], stiffness: f64) -> f64 {
    if positions.len() < 3 || forces.len() < 3 {
        return 0.0;
    }
    let mut energy = 0.0;
    for axis in 0..3 {
        forces[axis] -= stiffness * positions[axis];
        energy += 0.5 * stiffness * positions[axis] * positions[axis];
    }
    energy
}

impl CommandInterface for MockSession {
    fn cmd(&mut self, key: &str, arg: CmdArg<'_>) -> Result<(), BiasError> {
        if self.reject == Some(key) {
            return Err(BiasError::command(key, "rejected by mock library"));
        }
        let mut journal = self.journal.lock().unwrap();
        let recorded = match arg {
            CmdArg::None => Recorded::None,
            CmdArg::Int(value) => Recorded::Int(value),
            CmdArg::IntOut(slot) => {
                if key == keys::GET_API_VERSION {
                    *slot = self.api_version;
                }
                Recorded::Out
            }
            CmdArg::Real(value) => Recorded::Real(value),
            CmdArg::RealOut(slot) => {
                if key == keys::GET_BIAS {
                    *slot = self.bias;
                }
                Recorded::Out
            }
            CmdArg::Reals(values) => {
                if key == keys::SET_POSITIONS {
                    self.positions = values.to_vec();
                }
                Recorded::Reals(values.to_vec())
            }
            CmdArg::RealsMut(values) => {
                let before = values.to_vec();
                if key == keys::SET_FORCES {
                    self.pending_bias = harmonic_bias(&self.positions, values, self.stiffness);
                }
                Recorded::Reals(before)
            }
            CmdArg::Text(text) => {
                match key {
                    keys::READ_INPUT_LINES | keys::READ_INPUT_LINE if !journal.initialized => {
                        return Err(BiasError::command(key, "script read before init"));
                    }
                    keys::READ_INPUT_LINES => {
                        for line in text.lines() {
                            register_line(&mut journal.actions, line);
                        }
                    }
                    keys::READ_INPUT_LINE => register_line(&mut journal.actions, text),
                    _ => {}
                }
                Recorded::Text(text.to_string())
            }
            CmdArg::Comm(comm) => Recorded::Comm(comm.as_ptr() as usize),
            CmdArg::Log(target) => Recorded::Log(target.clone()),
        };
        match key {
            keys::INIT => journal.initialized = true,
            keys::PERFORM_CALC_NO_UPDATE => self.bias = self.pending_bias,
            _ => {}
        }
        journal.commands.push((key.to_string(), recorded));
        Ok(())
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.sessions_finalized += 1;
        }
    }
}

pub fn serial_comm() -> Arc<dyn Communicator> {
    Arc::new(SerialCommunicator::new())
}

pub fn metad_force() -> PlumedForce {
    PlumedForce::new(METAD_SCRIPT, serial_comm(), serial_comm())
}

/// `n` carbon-like particles, optionally with a nonbonded force carrying charges.
pub fn build_system(n: usize, method: Option<NonbondedMethod>) -> ReferenceSystem {
    let mut system = ReferenceSystem::new();
    let mut nonbonded = NonbondedForce::new();
    for index in 0..n {
        system.add_particle(12.0 + index as f64);
        let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
        nonbonded.add_particle(0.25 * sign, 0.3, 0.4);
    }
    if let Some(method) = method {
        nonbonded.set_nonbonded_method(method);
        system.add_force(Box::new(nonbonded));
    }
    system
}
