//! Error types for handfield.
//!
//! Only construction can fail. Once a [`Simulation`](crate::Simulation) exists,
//! every numerical hazard (coincident hand, stacked kernels) is resolved locally
//! and `tick` never returns an error.

use std::fmt;

/// Errors raised while validating a configuration or formation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Particle count was zero.
    NoParticles,
    /// Chunk size was zero, which would produce a scheduler with no chunks.
    ZeroChunkSize,
    /// A force or timing coefficient is outside its usable range.
    InvalidCoefficient {
        /// Field name as it appears in the config file.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// Formation parameters cannot produce a shape.
    InvalidFormation(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoParticles => write!(f, "Particle count must be at least 1"),
            ConfigError::ZeroChunkSize => write!(f, "Chunk size must be at least 1"),
            ConfigError::InvalidCoefficient { name, value } => {
                write!(f, "Invalid value {} for coefficient `{}`", value, name)
            }
            ConfigError::InvalidFormation(reason) => write!(f, "Invalid formation: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur when loading a configuration file.
#[derive(Debug)]
pub enum LoadError {
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// File contents are not valid config JSON.
    Parse(serde_json::Error),
    /// File parsed but the values are unusable.
    Invalid(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Failed to read config file: {}", e),
            LoadError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
            LoadError::Invalid(e) => write!(f, "Config file rejected: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            LoadError::Invalid(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}
