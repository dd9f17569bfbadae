use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration for site generation.
///
/// Every setting can also be given on the command line, which takes
/// precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// A directory of template overrides.
    ///
    /// Any `<template>.md` found here replaces the built-in template of that
    /// name. Templates not found here fall back to the built-in ones.
    pub templates: Option<PathBuf>,

    /// Whether unresolved references fail the run.
    ///
    /// When `false` (default), a reference that does not resolve is replaced
    /// by a placeholder and reported in the summary. When `true`, pages are
    /// still rendered but nothing is written and the run fails.
    pub strict: bool,
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if its content is not a
    /// known version of the configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The file is not a valid configuration.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: toml::de::Error,
    },
}

/// The on-disk versions of the configuration, tagged by `_version`.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        templates: Option<PathBuf>,

        #[serde(default)]
        strict: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { templates, strict } => Self { templates, strict },
        }
    }
}
