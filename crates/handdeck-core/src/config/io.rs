//! Generic YAML configuration I/O.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to create config directory {path}: {source}")]
    CreateDir { path: std::path::PathBuf, #[source] source: std::io::Error },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("failed to write config file {path}: {source}")]
    Write { path: std::path::PathBuf, #[source] source: std::io::Error },
}

/// Load `T` from `path`. A missing file or a parse failure both fall back
/// to `T::default()` (logged, not an error) — per §1.4, config absence is
/// the expected first-run state, not a failure.
pub fn load_config<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        log::info!("no config file at {path:?}, using defaults");
        return T::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<T>(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("failed to parse config at {path:?}: {e}, using defaults");
                T::default()
            }
        },
        Err(e) => {
            log::warn!("failed to read config at {path:?}: {e}, using defaults");
            T::default()
        }
    }
}

/// Save `config` as YAML to `path`, creating parent directories as needed.
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir { path: parent.to_path_buf(), source })?;
    }
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml).map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
}
