use clap::Parser;
use std::fs::File;
use std::path::Path;

use dualcam::camera::{CameraHandle, CameraId, SyntheticCamera, DEFAULT_FRAME_INTERVAL};
use dualcam::capture::CaptureWriter;
use dualcam::cli::{self, Args, Backend, Command, RunSettings};
use dualcam::config::Config;
use dualcam::options::CameraOptions;
use dualcam::session::Session;
use dualcam::signal;
use dualcam::terminal::{TerminalKeys, TerminalScreen};

type Cameras = [Box<dyn CameraHandle>; 2];

/// Set up env_logger. Honours RUST_LOG.
///
/// The interactive preview owns the terminal, so unless a log file is given
/// it only logs to stderr when RUST_LOG asks for it.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<(), String> {
    let default_filter = if interactive && log_file.is_none() {
        "off"
    } else {
        "info"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn synthetic_cameras() -> Cameras {
    CameraId::ALL
        .map(|id| Box::new(SyntheticCamera::new(id, DEFAULT_FRAME_INTERVAL)) as Box<dyn CameraHandle>)
}

#[cfg(feature = "native")]
fn native_cameras(settings: &RunSettings) -> Result<Cameras, String> {
    use dualcam::camera::native::NativeCamera;

    let open = |id: CameraId| {
        NativeCamera::open(id, settings.devices[id.index()])
            .map(|camera| Box::new(camera) as Box<dyn CameraHandle>)
            .map_err(|e| format!("{} failed to open: {}", id, e))
    };
    Ok([open(CameraId::One)?, open(CameraId::Two)?])
}

#[cfg(not(feature = "native"))]
fn native_cameras(_settings: &RunSettings) -> Result<Cameras, String> {
    Err("native cameras need a build with the `native` feature".to_string())
}

fn run(args: &Args) -> Result<(), String> {
    let config = Config::load(args.config.as_deref()).map_err(|e| e.to_string())?;
    let settings = args.resolve(&config);
    let options = CameraOptions::default();

    if let Err(e) = signal::setup_ctrlc_handler() {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }

    log::info!(
        "Starting {} cameras {:?}, saving to {}",
        settings.backend.name(),
        settings.devices,
        settings.output_dir.display()
    );
    let cameras = match settings.backend {
        Backend::Synthetic => synthetic_cameras(),
        Backend::Native => native_cameras(&settings)?,
    };
    let writer = CaptureWriter::new(&settings.output_dir);
    let session = Session::open(cameras, options, writer)
        .map_err(|e| e.to_string())?
        .with_tick(settings.tick);

    let mut screen = TerminalScreen::new()
        .map_err(|e| format!("Failed to initialize terminal: {}", e))?;
    let result = session.run(&mut TerminalKeys, &mut screen);
    if let Err(e) = screen.restore() {
        log::warn!("Failed to restore terminal: {}", e);
    }
    result.map_err(|e| e.to_string())
}

fn main() {
    let args = Args::parse();
    let interactive = matches!(args.command, None | Some(Command::Run));

    if let Err(e) = init_logging(args.log_file.as_deref(), interactive) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match &args.command {
        Some(Command::Options) => cli::print_options(),
        Some(Command::ListCameras) => cli::list_cameras(),
        Some(Command::Config { action }) => {
            cli::handle_config_action(action, args.config.as_deref())
        }
        None | Some(Command::Run) => run(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
