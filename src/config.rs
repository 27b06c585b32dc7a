//! Application configuration.

use crate::consts::poller::{MAX_CONSECUTIVE_TRANSPORT_FAILURES, POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

/// Get the path to the config file. A `grader.config` in the current
/// directory takes precedence; otherwise `~/.grader/config.json`.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let local_config_path = std::env::current_dir()?.join("grader.config");
    if local_config_path.exists() {
        return Ok(local_config_path);
    }

    let home_path = home::home_dir().ok_or(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "Home directory not found",
    ))?;
    Ok(home_path.join(".grader").join("config.json"))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Environment to submit to: "local", "staging" or "production".
    #[serde(default)]
    pub environment: String,

    /// Period between status queries, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Consecutive failed status queries tolerated before the poll loop
    /// fails the job.
    #[serde(default = "default_max_poll_failures")]
    pub max_consecutive_poll_failures: u32,
}

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL_MS
}

fn default_max_poll_failures() -> u32 {
    MAX_CONSECUTIVE_TRANSPORT_FAILURES
}

impl Default for Config {
    fn default() -> Self {
        Config {
            environment: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
            max_consecutive_poll_failures: default_max_poll_failures(),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method
    /// overwrites existing files.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"environment":"staging"}"#).unwrap();
        assert_eq!(config.environment, "staging");
        assert_eq!(config.poll_interval_ms, POLL_INTERVAL_MS);
        assert_eq!(
            config.max_consecutive_poll_failures,
            MAX_CONSECUTIVE_TRANSPORT_FAILURES
        );
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            environment: "local".to_string(),
            poll_interval_ms: 500,
            max_consecutive_poll_failures: 3,
        };
        config.save(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }
}
