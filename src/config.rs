//! Configuration file handling for dualcam.
//!
//! Loads configuration from `<config_dir>/dualcam/config.toml` or a custom
//! path. Every setting is optional; command-line flags take precedence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::DEFAULT_OUTPUT_DIR;
use crate::cli::Backend;
use crate::session::DEFAULT_TICK;

/// Configuration file structure for dualcam.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cameras: CamerasConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CamerasConfig {
    pub backend: Backend,
    /// Device index of camera one
    pub one: u32,
    /// Device index of camera two
    pub two: u32,
}

impl Default for CamerasConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            one: 0,
            two: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub output_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Milliseconds to wait for a key before refreshing the preview
    pub tick_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK.as_millis() as u64,
        }
    }
}

impl PreviewConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Template written by `dualcam config init`.
pub const DEFAULT_CONFIG: &str = r#"# dualcam configuration

[cameras]
# Camera source: "synthetic" (test pattern) or "native" (needs the native feature)
backend = "synthetic"
# Device indices (see `dualcam list-cameras`)
one = 0
two = 1

[capture]
# Directory for captured PNG files
output_dir = "camera_captures"

[preview]
# Milliseconds to wait for a key before refreshing the preview
tick_ms = 33
"#;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            Self::parse(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Write [`DEFAULT_CONFIG`] to `path`, refusing to overwrite.
pub fn init(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    AlreadyExists {
        path: PathBuf,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to access config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::AlreadyExists { path } => {
                write!(f, "Config file already exists: {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::AlreadyExists { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dualcam")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config::load(Some(&temp_dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cameras.two, 1);
        assert_eq!(config.capture.output_dir, PathBuf::from("camera_captures"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::parse("[cameras]\ntwo = 4\n").unwrap();
        assert_eq!(config.cameras.one, 0);
        assert_eq!(config.cameras.two, 4);
        assert_eq!(config.cameras.backend, Backend::Synthetic);
        assert_eq!(config.preview, PreviewConfig::default());
    }

    #[test]
    fn test_default_template_matches_defaults() {
        assert_eq!(Config::parse(DEFAULT_CONFIG).unwrap(), Config::default());
    }

    #[test]
    fn test_native_backend_parses() {
        let config = Config::parse("[cameras]\nbackend = \"native\"\n").unwrap();
        assert_eq!(config.cameras.backend, Backend::Native);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[preview]\ntick_ms = \"soon\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_init_writes_once() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("dualcam").join("config.toml");

        init(&path).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());

        let err = init(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let preview = PreviewConfig { tick_ms: 0 };
        assert_eq!(preview.tick(), Duration::from_millis(1));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = Config::default();
        config.cameras.one = 3;
        let text = config.to_toml().unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        let path = default_path();
        assert!(path.ends_with("dualcam/config.toml"));
    }
}
