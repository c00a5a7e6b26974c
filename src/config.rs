//! Configuration of the command line shell, read from YAML.
//!
//! ```yaml
//! output: site/index.html
//! watch_interval_ms: 250
//! print_tree: true
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "atml.yaml";

/* -------------------- *
 *         ERROR        *
 * -------------------- */
/// Represents a failure to load a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config file {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_yaml::Error },
}


/* -------------------- *
 *        CONFIG        *
 * -------------------- */
/// Represents the settings of a compilation shell. Every field is optional in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the HTML document is written.
    pub output: PathBuf,
    /// How often dev mode polls the source for changes, in milliseconds.
    pub watch_interval_ms: u64,
    /// Whether to print the expanded syntax tree before rendering.
    pub print_tree: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("output.html"),
            watch_interval_ms: 500,
            print_tree: false,
        }
    }
}

impl Config {
    /// Parses a config from YAML text. Blank text yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed text or unknown keys.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(text)
    }

    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `explicit` if given, else [`DEFAULT_CONFIG_FILE`] inside `dir` if it exists,
    /// else returns the defaults.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);

        if candidate.is_file() {
            debug!(path = %candidate.display(), "using config file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the polling interval of dev mode.
    #[inline]
    #[must_use]
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms.max(1))
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("watch_interval_ms: 100\n").unwrap();

        assert_eq!(config, Config { watch_interval_ms: 100, ..Config::default() });
        assert_eq!(config.watch_interval(), Duration::from_millis(100));
    }

    #[test]
    fn blank_yaml_is_default() {
        assert_eq!(Config::from_yaml("\n").unwrap(), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_yaml("outptu: x.html\n").is_err());
    }

    #[test]
    fn discover_prefers_explicit_then_default_file() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "output: site.html\n").unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap().output, PathBuf::from("site.html"));

        let explicit = dir.path().join("other.yaml");
        fs::write(&explicit, "print_tree: true\n").unwrap();
        let config = Config::discover(Some(&explicit), dir.path()).unwrap();
        assert!(config.print_tree);
        assert_eq!(config.output, PathBuf::from("output.html"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(Some(&dir.path().join("nope.yaml")), dir.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
