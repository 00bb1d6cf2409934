use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdbias_core::errors::{BiasError, ErrorInfo};
use mdbias_core::Communicator;
use mdbias_host::LogTarget;
use serde::{Deserialize, Serialize};

use crate::force::{PlumedForce, DEFAULT_MD_ENGINE, UNSET_TEMPERATURE};

/// Log setting naming the process's standard output.
pub const STDOUT_LOG: &str = "stdout";

/// TOML-configurable settings for a [`PlumedForce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForceConfig {
    /// Inline input script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Script file, relative paths resolved from the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_file: Option<PathBuf>,
    /// Temperature in Kelvin; negative leaves it unset.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Per-particle mass override in Dalton.
    #[serde(default)]
    pub masses: Vec<f64>,
    /// `"stdout"` or a log file path.
    #[serde(default = "default_log")]
    pub log: String,
    /// Resume accumulated bias state from previous output.
    #[serde(default)]
    pub restart: bool,
    /// Engine name announced to the library.
    #[serde(default = "default_md_engine")]
    pub md_engine: String,
}

fn default_temperature() -> f64 {
    UNSET_TEMPERATURE
}

fn default_log() -> String {
    STDOUT_LOG.to_string()
}

fn default_md_engine() -> String {
    DEFAULT_MD_ENGINE.to_string()
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            script: None,
            script_file: None,
            temperature: default_temperature(),
            masses: Vec::new(),
            log: default_log(),
            restart: false,
            md_engine: default_md_engine(),
        }
    }
}

impl ForceConfig {
    /// Checks that exactly one script source is given and that it is usable.
    pub fn validate(&self) -> Result<(), BiasError> {
        match (&self.script, &self.script_file) {
            (Some(_), Some(_)) => Err(BiasError::Config(ErrorInfo::new(
                "mdbias_force.config_script",
                "set either `script` or `script_file`, not both",
            ))),
            (None, None) => Err(BiasError::Config(ErrorInfo::new(
                "mdbias_force.config_script",
                "no input script configured",
            ))),
            (Some(script), None) if script.trim().is_empty() => {
                Err(BiasError::Config(ErrorInfo::new(
                    "mdbias_force.config_script",
                    "input script is empty",
                )))
            }
            _ => {
                if self.md_engine.trim().is_empty() {
                    return Err(BiasError::Config(ErrorInfo::new(
                        "mdbias_force.config_engine",
                        "md_engine must not be empty",
                    )));
                }
                Ok(())
            }
        }
    }

    /// Resolves the log setting against `base_dir`.
    pub fn log_target(&self, base_dir: &Path) -> LogTarget {
        if self.log.eq_ignore_ascii_case(STDOUT_LOG) {
            LogTarget::Stdout
        } else {
            LogTarget::File(base_dir.join(&self.log))
        }
    }

    /// Returns the script text, reading `script_file` if needed.
    pub fn resolve_script(&self, base_dir: &Path) -> Result<String, BiasError> {
        self.validate()?;
        match &self.script_file {
            None => Ok(self.script.clone().unwrap_or_default()),
            Some(file) => {
                let path = base_dir.join(file);
                fs::read_to_string(&path).map_err(|err| {
                    BiasError::Serde(
                        ErrorInfo::new(
                            "mdbias_force.read_script",
                            format!("failed to read script: {err}"),
                        )
                        .with_context("path", path.display().to_string()),
                    )
                })
            }
        }
    }

    /// Builds the force descriptor.
    pub fn into_force(
        self,
        base_dir: &Path,
        intra_comm: Arc<dyn Communicator>,
        inter_comm: Arc<dyn Communicator>,
    ) -> Result<PlumedForce, BiasError> {
        let script = self.resolve_script(base_dir)?;
        let log_target = self.log_target(base_dir);
        let mut force = PlumedForce::new(script, intra_comm, inter_comm);
        force.set_temperature(self.temperature);
        force.set_masses(self.masses);
        force.set_log_target(log_target);
        force.set_restart(self.restart);
        force.set_md_engine(self.md_engine);
        Ok(force)
    }
}

/// Reads and parses a TOML force configuration.
pub fn load_force_config(path: &Path) -> Result<ForceConfig, BiasError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        BiasError::Serde(
            ErrorInfo::new(
                "mdbias_force.read_config",
                format!("failed to read config: {err}"),
            )
            .with_context("path", path.display().to_string()),
        )
    })?;
    let config: ForceConfig = toml::from_str(&contents).map_err(|err| {
        BiasError::Serde(
            ErrorInfo::new("mdbias_force.parse_config", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    config.validate()?;
    Ok(config)
}

/// Directory relative config paths resolve against.
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
