//! Subcommand handlers for options, list-cameras and config actions.

use std::path::Path;

use super::args::ConfigAction;
use crate::config::{self, Config};
use crate::options::CameraOptions;

/// Print the compiled-in camera options as TOML.
pub fn print_options() -> Result<(), String> {
    let text = CameraOptions::default()
        .to_toml()
        .map_err(|e| format!("Failed to render options: {}", e))?;
    print!("{}", text);
    Ok(())
}

/// List available cameras and print them to stdout.
#[cfg(feature = "native")]
pub fn list_cameras() -> Result<(), String> {
    let devices = crate::camera::native::list_devices().map_err(|e| e.to_string())?;
    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your cameras are connected and permissions are granted.");
    } else {
        println!("Available cameras:");
        for device in devices {
            println!("  {}", device);
        }
        println!();
        println!("Use --camera-one <index> and --camera-two <index> to select cameras.");
    }
    Ok(())
}

#[cfg(not(feature = "native"))]
pub fn list_cameras() -> Result<(), String> {
    Err("dualcam was built without camera support (enable the `native` feature)".to_string())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: &ConfigAction, path: Option<&Path>) -> Result<(), String> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&config_path)).map_err(|e| e.to_string())?;
            let text = config
                .to_toml()
                .map_err(|e| format!("Failed to render config: {}", e))?;
            println!("Current configuration:");
            println!();
            print!("{}", text);
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            config::init(&config_path).map_err(|e| match e {
                config::ConfigError::AlreadyExists { .. } => format!(
                    "{}\nUse 'dualcam config show' to view current settings.",
                    e
                ),
                other => other.to_string(),
            })?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
