//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use super::enums::Backend;
use crate::config::Config;
use crate::input::HELP;

/// Parse and validate the preview tick (1-1000 ms)
fn parse_tick(s: &str) -> Result<u64, String> {
    let ms: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(1..=1000).contains(&ms) {
        return Err(format!("Tick must be between 1 and 1000 ms, got {}", ms));
    }
    Ok(ms)
}

/// Live side-by-side preview and still capture from two cameras
#[derive(Parser, Debug)]
#[command(name = "dualcam")]
#[command(version, about = "Dual-camera preview and capture controller", long_about = None)]
#[command(after_help = HELP)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Camera source
    #[arg(long, global = true)]
    pub backend: Option<Backend>,

    /// Device index for camera one (from list-cameras)
    #[arg(long, global = true, value_name = "INDEX")]
    pub camera_one: Option<u32>,

    /// Device index for camera two (from list-cameras)
    #[arg(long, global = true, value_name = "INDEX")]
    pub camera_two: Option<u32>,

    /// Directory for captured images
    #[arg(long, short, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Milliseconds to wait for a key between preview refreshes
    #[arg(long, global = true, value_parser = parse_tick, value_name = "MS")]
    pub tick_ms: Option<u64>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open both cameras and start the interactive preview (default)
    Run,
    /// Print the resolution menu and adjustment ranges
    Options,
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Settings for one interactive run, after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub backend: Backend,
    /// Device index per camera, indexed by `CameraId::index`
    pub devices: [u32; 2],
    pub output_dir: PathBuf,
    pub tick: Duration,
}

impl Args {
    /// Flags win over the config file.
    pub fn resolve(&self, config: &Config) -> RunSettings {
        RunSettings {
            backend: self.backend.unwrap_or(config.cameras.backend),
            devices: [
                self.camera_one.unwrap_or(config.cameras.one),
                self.camera_two.unwrap_or(config.cameras.two),
            ],
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| config.capture.output_dir.clone()),
            tick: self
                .tick_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.preview.tick()),
        }
    }
}
