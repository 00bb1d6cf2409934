//! Structured error types shared across mdbias crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic carried by every [`BiasError`].
///
/// `code` is a dotted identifier naming the crate and the failed check, for
/// example `mdbias_force.mass_count` or `mdbias_host.api_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Dotted identifier of the failed check.
    pub code: String,
    /// What went wrong, in words.
    pub message: String,
    /// Offending values: the rejected command key, particle and mass counts,
    /// the reported library version, a config or script path.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// What to change in the setup, such as upgrading the library or pointing
    /// `PLUMED_KERNEL` somewhere else.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Diagnostic with no context or hint yet.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records an offending value; a repeated key keeps the last value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remedy shown after the message.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the bias adapter.
///
/// None of the families is retryable: a configuration or library failure
/// aborts the run, since the bias is part of the integrated physics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BiasError {
    /// Invalid force setup detected at initialization.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// The sampling library is older than the supported interface.
    #[error("version error: {0}")]
    Version(ErrorInfo),
    /// A library command was rejected or could not be issued.
    #[error("command error: {0}")]
    Command(ErrorInfo),
    /// The sampling library could not be loaded or bound.
    #[error("library error: {0}")]
    Library(ErrorInfo),
    /// Reading or parsing configuration files failed.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

/// Renders as `[code] message (key=value, ...); hint: ...`.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            f.write_str(")")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "; hint: {hint}")?;
        }
        Ok(())
    }
}

impl BiasError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BiasError::Config(info)
            | BiasError::Version(info)
            | BiasError::Command(info)
            | BiasError::Library(info)
            | BiasError::Serde(info) => info,
        }
    }

    /// Shorthand for a rejected library command.
    pub fn command(key: &str, message: impl Into<String>) -> Self {
        BiasError::Command(
            ErrorInfo::new("mdbias.command_failed", message).with_context("command", key),
        )
    }
}
