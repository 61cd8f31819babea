use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Files picked up from the working directory, in order of preference.
const DEFAULT_FILES: [&str; 2] = ["volley.toml", "volley.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn for_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some(ext) => Err(ConfigError::UnsupportedExtension {
                ext: ext.to_owned(),
            }),
            None => Err(ConfigError::MissingExtension),
        }
    }

    fn parse(self, content: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|source| ConfigError::ParseToml {
                path: path.to_path_buf(),
                source,
            }),
            Self::Json => serde_json::from_str(content).map_err(|source| ConfigError::ParseJson {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Loads the config file named by `--config`, or the first default file
/// present in the working directory.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<ConfigFile>> {
    let chosen = match path {
        Some(path) => Some(Path::new(path)),
        None => DEFAULT_FILES
            .iter()
            .map(Path::new)
            .find(|candidate| candidate.exists()),
    };
    chosen.map(load_config_file).transpose()
}

/// Reads one config file, picking the parser from its extension.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported
/// extension, or fails to parse.
pub fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let format = ConfigFormat::for_path(path).map_err(AppError::config)?;
    debug!("Loading {:?} config from {}", format, path.display());
    let content = std::fs::read_to_string(path).map_err(|source| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })
    })?;
    format.parse(&content, path).map_err(AppError::config)
}
