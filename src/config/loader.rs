//! Configuration loading: file (optional) → overrides → validation.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::SumConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {}", join(.0))]
    Invalid(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Invalid(errors)
    }
}

fn read(path: &Path) -> Result<SumConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the effective configuration.
///
/// Starts from `path` (or the defaults when `None`), lets `overrides`
/// adjust it (command-line flags), then validates the merged result.
pub fn load_config(
    path: Option<&Path>,
    overrides: impl FnOnce(&mut SumConfig),
) -> Result<SumConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read(path)?,
        None => SumConfig::default(),
    };
    overrides(&mut config);

    validate_config(&config)?;

    Ok(config)
}
