//! Eye mouse: calibrate, train and run gaze pointer control.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use eye_mouse::{
    app::{spawn_control_loop, ControlLoop},
    calibration::{dataset, CalibrationModel, CalibrationSession},
    capture::{JsonLinesSource, LandmarkSource},
    config::{Config, EXAMPLE_CONFIG},
    constants::{FALLBACK_SCREEN_HEIGHT, FALLBACK_SCREEN_WIDTH},
    cursor_control::{marshal, CursorController, NullPointer, PointerSurface},
    feedback::latest_slot,
    gaze_mapper::ScreenBounds,
    stop::StopToken,
};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record calibration samples over the target grid
    Calibrate {
        /// Landmark stream (JSON lines), `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Where to write the samples (defaults to the configured data path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fit the calibration model from recorded samples
    Train {
        /// Sample CSV (defaults to the configured data path)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Where to write the model (defaults to the configured model path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Drive the pointer from a landmark stream
    Run {
        /// Landmark stream (JSON lines), `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Calibration model (defaults to the configured model path)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Log pointer actions instead of moving the real pointer
        #[arg(long)]
        dry_run: bool,
    },

    /// Write an example configuration file
    InitConfig {
        /// Output path
        #[arg(default_value = "eye-mouse.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Eye Mouse v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Calibrate { input, output } => calibrate(&config, &input, output),
        Command::Train { data, output } => train(&config, data, output),
        Command::Run { input, model, dry_run } => run(&config, &input, model, dry_run),
        Command::InitConfig { path, force } => init_config(&path, force),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("Failed to load config file: {}. Using defaults.", e);
                    Config::default()
                }
            }
        }
        None => Config::default(),
    };

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn open_source(input: &Path) -> Result<Box<dyn LandmarkSource>> {
    if input == Path::new("-") {
        info!("Reading landmark frames from stdin");
        return Ok(Box::new(JsonLinesSource::new(BufReader::new(std::io::stdin()))));
    }

    let file = File::open(input).with_context(|| format!("cannot open landmark stream {}", input.display()))?;
    info!("Reading landmark frames from {}", input.display());
    Ok(Box::new(JsonLinesSource::new(BufReader::new(file))))
}

/// Configured size, else the display's, else the fallback
fn resolve_screen(config: &Config, display: Option<ScreenBounds>) -> ScreenBounds {
    if let Some(bounds) = config.screen.bounds() {
        return bounds;
    }
    display.unwrap_or_else(|| {
        warn!(
            "Screen size unknown, assuming {}x{}",
            FALLBACK_SCREEN_WIDTH, FALLBACK_SCREEN_HEIGHT
        );
        ScreenBounds::new(FALLBACK_SCREEN_WIDTH, FALLBACK_SCREEN_HEIGHT)
    })
}

fn install_stop_handler() -> Result<StopToken> {
    let stop = StopToken::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        info!("Interrupt received, stopping");
        handler_stop.stop();
    })
    .context("failed to install Ctrl+C handler")?;
    Ok(stop)
}

fn calibrate(config: &Config, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let display = match config.screen.bounds() {
        Some(_) => None,
        None => CursorController::new().ok().and_then(|c| c.screen_size()),
    };
    let screen = resolve_screen(config, display);
    let output = output.unwrap_or_else(|| config.calibration.data_path.clone());

    let stop = install_stop_handler()?;
    let mut source = open_source(input)?;
    let session = CalibrationSession::new(&config.calibration, screen).with_stop_token(stop);

    info!(
        "Calibrating {} targets, {} samples each",
        session.targets().len(),
        config.calibration.samples_per_target
    );
    let samples = session.run(source.as_mut())?;
    dataset::write_samples(&output, &samples)?;

    println!("Saved {} samples to {}", samples.len(), output.display());
    Ok(())
}

fn train(config: &Config, data: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let data = data.unwrap_or_else(|| config.calibration.data_path.clone());
    let output = output.unwrap_or_else(|| config.calibration.model_path.clone());

    let samples = dataset::read_samples(&data)?;
    let model = CalibrationModel::fit(&samples)?;
    let report = model.evaluate(&samples);
    model.save(&output)?;

    println!(
        "Model trained on {} samples: R² = {:.4}, RMSE = {:.1} px, max error = {:.1} px",
        samples.len(),
        report.r_squared,
        report.rmse_px,
        report.max_error_px
    );
    println!("Saved model to {}", output.display());
    Ok(())
}

fn run(config: &Config, input: &Path, model: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let model_path = model.unwrap_or_else(|| config.calibration.model_path.clone());
    // Fail before any thread starts if there is nothing to map with
    let model = CalibrationModel::load(&model_path)?;
    info!("Loaded calibration model from {}", model_path.display());

    if dry_run {
        let screen = resolve_screen(config, None);
        return drive(config, model, input, NullPointer::new(Some(screen)));
    }

    let controller = CursorController::new()?;
    drive(config, model, input, controller)
}

/// Run the control loop on a worker thread while this thread owns the pointer
fn drive<P: PointerSurface>(config: &Config, model: CalibrationModel, input: &Path, surface: P) -> Result<()> {
    let screen = resolve_screen(config, surface.screen_size());
    let control = ControlLoop::new(config, model, screen)?;
    let source = open_source(input)?;
    let stop = install_stop_handler()?;

    let (pointer, mut dispatcher) = marshal(surface);
    let (feedback_tx, feedback_rx) = latest_slot();
    let worker = spawn_control_loop(control, source, pointer, stop, Some(feedback_tx))?;

    while dispatcher.dispatch_timeout(Duration::from_millis(50)) {
        if let Some(status) = feedback_rx.try_take() {
            debug!(
                "t={:?} face={} L={:?} R={:?} L2x={} R2x={} cursor={:?}",
                status.timestamp,
                status.face_detected,
                status.left_ear,
                status.right_ear,
                status.left_blink.blink_count,
                status.right_blink.blink_count,
                status.cursor
            );
        }
    }
    dispatcher.drain();

    let summary = worker
        .join()
        .map_err(|_| anyhow!("control loop thread panicked"))??;

    info!(
        "Session ended: {} frames ({} with a face), {} moves, {} clicks",
        summary.frames, summary.frames_with_face, summary.moves, summary.clicks
    );
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    std::fs::write(path, EXAMPLE_CONFIG).with_context(|| format!("cannot write {}", path.display()))?;
    println!("Wrote example configuration to {}", path.display());
    Ok(())
}
