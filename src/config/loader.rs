//! Reading `aw-fix.toml`.

use crate::config::schema::{FixConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "aw-fix.toml";

/// Config problems. `path` is `None` for config parsed from a string.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid aw-fix TOML: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("{} has invalid settings:\n{source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "config".to_string(),
    }
}

pub fn load_from_str(input: &str) -> Result<FixConfig, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<FixConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Some(path))
}

/// Deserialize and validate; errors name `file` when there is one.
fn parse(input: &str, file: Option<&Path>) -> Result<FixConfig, ConfigError> {
    let path = || file.map(Path::to_path_buf);
    let config: FixConfig = toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml {
        path: path(),
        source,
    })?;
    config.validate().map_err(|source| ConfigError::Validation {
        path: path(),
        source,
    })?;
    Ok(config)
}

/// Load an explicit config file, or `aw-fix.toml` in `dir` if present.
///
/// A missing default file yields the default config. A missing explicit file
/// is an error.
pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<FixConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        load_from_path(candidate)
    } else {
        Ok(FixConfig::default())
    }
}
