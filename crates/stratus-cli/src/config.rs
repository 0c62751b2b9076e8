//! Locating and reading the `stratus` configuration file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use stratus::{StratusError, config::AppConfig};

const LOCAL_CONFIG: &str = "stratus/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid configuration in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl From<ConfigError> for StratusError {
    fn from(err: ConfigError) -> Self {
        StratusError::Config(err.to_string())
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    /// Given with `--config`; must exist.
    Explicit(PathBuf),
    /// `stratus/config.toml` under the working directory.
    Local(PathBuf),
    /// `config.toml` in the platform configuration directory.
    Platform(PathBuf),
    Defaults,
}

impl ConfigSource {
    fn discover(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Self::Local(local);
        }

        match ProjectDirs::from("io", "stratus", "stratus") {
            Some(dirs) => {
                let platform = dirs.config_dir().join("config.toml");
                if platform.is_file() {
                    return Self::Platform(platform);
                }
                debug!(path:? = platform; "No platform configuration");
            }
            None => debug!("No platform configuration directory"),
        }
        Self::Defaults
    }

    fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Local(path) | Self::Platform(path) => Some(path),
            Self::Defaults => None,
        }
    }
}

/// Loads the configuration: `explicit` if given, else the local file, else
/// the platform file, else the defaults.
///
/// # Errors
///
/// Returns [`StratusError::Config`] if the chosen file cannot be read or is
/// not a valid configuration. A missing explicit file is an error; missing
/// implicit files are skipped.
pub fn load_config(explicit: Option<impl AsRef<Path>>) -> Result<AppConfig, StratusError> {
    let source = ConfigSource::discover(explicit.as_ref().map(|path| path.as_ref()));
    let Some(path) = source.path() else {
        debug!("Using default configuration");
        return Ok(AppConfig::default());
    };
    info!(source:? = source; "Loading configuration");

    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.message().to_string(),
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use stratus::backend::BackendKind;

    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/nonexistent/stratus.toml");
        assert_eq!(
            ConfigSource::discover(Some(path)),
            ConfigSource::Explicit(path.to_path_buf())
        );
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render]\nbackend = \"layout\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.render().backend(), BackendKind::Layout);
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, StratusError::Config(ref msg) if msg.contains("cannot read")));
    }

    #[test]
    fn test_invalid_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render]\nbackend = \"mermaid\"\n").unwrap();

        match load_config(Some(&path)) {
            Err(StratusError::Config(msg)) => assert!(msg.contains("config.toml"), "{msg}"),
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }
}
