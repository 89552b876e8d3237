use crate::{
    errors::{FileOperation, IoError},
    names::NamePolicy,
    outline::ParseOptions,
};
use miette::Diagnostic;
use serde::Deserialize;
use std::{fs, num::NonZeroUsize, path::Path, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("I/O error within config domain")]
    #[diagnostic(code(scaffold::config::io))]
    Io(#[from] IoError),

    #[error("Unable to parse toml file at '{}': {source}", .path.display())]
    #[diagnostic(code(scaffold::config::parse_toml), help("Review toml file"))]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("indent width must be greater than zero, got {value}")]
    #[diagnostic(code(scaffold::config::indent_width))]
    IndentWidth { value: usize },
}

/// Defaults read from a settings file. Every key is optional.
///
/// ```toml
/// indent_width = 4
/// folders_only = true
/// names = "windows"
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub indent_width: Option<usize>,
    pub folders_only: Option<bool>,
    pub names: Option<NamePolicy>,
}
impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;

        let parsed = toml::from_str(&content).map_err(|err| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        })?;

        Ok(parsed)
    }
}

/// Command line values. `None` defers to the settings file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub indent_width: Option<usize>,
    pub folders_only: Option<bool>,
    pub dry_run: bool,
    pub names: Option<NamePolicy>,
}

/// Everything the plan compiler and executor need for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub output_root: PathBuf,
    /// `None` infers the width from the outline.
    pub indent_width: Option<NonZeroUsize>,
    pub dry_run: bool,
    pub folders_only: bool,
    pub names: NamePolicy,
}
impl Config {
    pub fn new<P: Into<PathBuf>>(output_root: P) -> Self {
        Self {
            output_root: output_root.into(),
            indent_width: None,
            dry_run: false,
            folders_only: false,
            names: NamePolicy::default(),
        }
    }

    /// Merges the settings file with command line values, the latter taking precedence.
    pub fn resolve(
        output_root: PathBuf,
        settings: Settings,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let indent_width = match overrides.indent_width.or(settings.indent_width) {
            Some(value) => {
                Some(NonZeroUsize::new(value).ok_or(ConfigError::IndentWidth { value })?)
            }
            None => None,
        };

        Ok(Self {
            output_root,
            indent_width,
            dry_run: overrides.dry_run,
            folders_only: overrides
                .folders_only
                .or(settings.folders_only)
                .unwrap_or(false),
            names: overrides.names.or(settings.names).unwrap_or_default(),
        })
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            indent_width: self.indent_width,
            names: self.names,
        }
    }
}
