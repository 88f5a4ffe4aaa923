//! Locating and reading the viewer's TOML configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use erdview::{ErdViewError, config::AppConfig};

/// Problems with a configuration file the CLI was pointed at or found.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Configuration file {0} does not exist")]
    MissingFile(PathBuf),

    #[error("Invalid value in {path}: {message}")]
    Validation { path: PathBuf, message: String },
}

impl From<ConfigError> for ErdViewError {
    fn from(err: ConfigError) -> Self {
        ErdViewError::Config(err.to_string())
    }
}

const LOCAL_CONFIG: &str = "erdview/config.toml";

/// Files consulted when no path is given, highest priority first.
fn implicit_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG)];
    match ProjectDirs::from("com", "erdview", "erdview") {
        Some(dirs) => candidates.push(dirs.config_dir().join("config.toml")),
        None => debug!("No platform configuration directory on this system"),
    }
    candidates
}

/// Loads the configuration.
///
/// An explicit path must exist. Without one, the first existing file among
/// `erdview/config.toml` and the platform configuration directory is used,
/// falling back to [`AppConfig::default`].
///
/// # Errors
///
/// Returns [`ErdViewError::Config`] when the explicit file is missing, or when
/// the chosen file is not valid TOML or holds out-of-range values.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ErdViewError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()).into());
        }
        info!(path = path.display().to_string(); "Using configuration given on the command line");
        return read_config(path);
    }

    let candidates = implicit_candidates();
    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => {
            info!(path = path.display().to_string(); "Using discovered configuration");
            read_config(path)
        }
        None => {
            debug!(searched:? = candidates; "No configuration file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ErdViewError> {
    let text = fs::read_to_string(path)?;

    let config: AppConfig = toml::from_str(&text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.message().to_string(),
    })?;
    config
        .validate()
        .map_err(|message| ConfigError::Validation {
            path: path.to_path_buf(),
            message,
        })?;

    Ok(config)
}
