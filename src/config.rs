use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Preferred port when none is requested.
pub const DEFAULT_PORT: u16 = 6488;

/// Number of sequential ports probed before giving up.
pub const DEFAULT_MAX_PORT_ATTEMPTS: u16 = 100;

/// Server configuration, loadable from an optional TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preferred starting port (overridden by `--port`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// How many sequential ports to probe before giving up
    #[serde(default = "default_max_port_attempts")]
    pub max_port_attempts: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_port_attempts() -> u16 {
    DEFAULT_MAX_PORT_ATTEMPTS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_port_attempts: default_max_port_attempts(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Default serve directory relative to an explicit base directory.
///
/// The caller supplies the base (typically the current working directory)
/// so the default is a pure function rather than ambient process state.
pub fn default_serve_dir(base: &Path) -> PathBuf {
    base.join("serve")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_port_attempts, DEFAULT_MAX_PORT_ATTEMPTS);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config: Config = toml::from_str("port = 9000").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_port_attempts, DEFAULT_MAX_PORT_ATTEMPTS);
    }

    #[test]
    fn default_serve_dir_joins_base() {
        let dir = default_serve_dir(Path::new("/work"));
        assert_eq!(dir, PathBuf::from("/work/serve"));
    }
}
