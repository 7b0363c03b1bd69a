use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use qr_scan::camera::ReplaySource;
use qr_scan::encode::render_payload;
use qr_scan::tools::{dataset_iter, load_rgba, save_rgba};
use qr_scan::{
    Decoder, FacingMode, FrameLoop, FrameReplayCamera, IntervalClock, PathFile, Payload,
    ResultPanel, RqrrDecoder, ScanConfig, ScanController, TickOutcome, UploadOutcome,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

type CliController = ScanController<RqrrDecoder, ResultPanel, ReplaySource>;

#[derive(Parser)]
#[command(name = "qrscan", version, about = "Scan QR codes from images and camera frames")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan one image the way the upload path does
    Scan {
        #[arg(long)]
        image: PathBuf,
        /// Print the result container as HTML
        #[arg(long)]
        html: bool,
        #[arg(long)]
        max_dim: Option<u32>,
    },
    /// Scan every image under a directory in parallel
    Batch {
        #[arg(long)]
        root: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Run the camera path against a directory of recorded frames
    Camera {
        #[arg(long)]
        frames: PathBuf,
        /// Stop after this many frame ticks
        #[arg(long)]
        ticks: Option<u64>,
        #[arg(long)]
        fps: Option<u32>,
        #[arg(long)]
        facing: Option<FacingMode>,
        /// Play the frames once instead of looping
        #[arg(long)]
        once: bool,
    },
    /// Write a QR code image for a payload
    Encode {
        #[arg(long)]
        payload: String,
        #[arg(long)]
        out: PathBuf,
        /// Pixels per module
        #[arg(long, default_value_t = 8)]
        scale: u32,
    },
}

fn init_tracing() {
    let default = if std::env::var("QR_DEBUG").is_ok() {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = ScanConfig::from_env();

    match cli.command {
        Command::Scan {
            image,
            html,
            max_dim,
        } => scan_cmd(&image, html, max_dim.or(config.max_dim), config),
        Command::Batch { root, limit } => batch_cmd(&root, limit, config.max_dim),
        Command::Camera {
            frames,
            ticks,
            fps,
            facing,
            once,
        } => {
            let mut config = config;
            if let Some(fps) = fps {
                config.frame_interval = qr_scan::config::frame_interval_for_fps(fps);
            }
            if let Some(facing) = facing {
                config.facing = facing;
            }
            camera_cmd(&frames, ticks, once, config)
        }
        Command::Encode {
            payload,
            out,
            scale,
        } => encode_cmd(payload, &out, scale),
    }
}

fn new_controller(config: ScanConfig) -> CliController {
    ScanController::new(RqrrDecoder::new(), ResultPanel::new(), ResultPanel::new())
        .with_config(config)
}

fn print_panel(panel: &ResultPanel, html: bool) {
    if html {
        println!("{}", panel.to_html());
    } else if let Some(content) = panel.content() {
        println!("{}", content.text());
    }
}

fn scan_cmd(image: &Path, html: bool, max_dim: Option<u32>, config: ScanConfig) -> Result<()> {
    let mut controller = new_controller(ScanConfig { max_dim, ..config });
    match controller.handle_file_selection([PathFile::new(image)]) {
        UploadOutcome::Failed(err) => {
            Err(err).with_context(|| format!("failed to scan {}", image.display()))
        }
        _ => {
            print_panel(controller.upload_result(), html);
            Ok(())
        }
    }
}

fn batch_cmd(root: &Path, limit: Option<usize>, max_dim: Option<u32>) -> Result<()> {
    if !root.exists() {
        bail!("directory not found: {}", root.display());
    }
    let images: Vec<PathBuf> = dataset_iter(root, limit).collect();
    if images.is_empty() {
        println!("No images found under {}", root.display());
        return Ok(());
    }

    let start = Instant::now();
    let decoder = RqrrDecoder::new();
    let results: Vec<(PathBuf, Result<Option<Payload>, image::ImageError>)> = images
        .into_par_iter()
        .map(|path| {
            let result = load_rgba(&path, max_dim).map(|frame| decoder.decode(&frame));
            (path, result)
        })
        .collect();

    let mut hits = 0usize;
    for (path, result) in &results {
        match result {
            Ok(Some(payload)) => {
                hits += 1;
                println!("{}: {}", path.display(), payload);
            }
            Ok(None) => println!("{}: -", path.display()),
            Err(err) => println!("{}: load_failed ({})", path.display(), err),
        }
    }
    println!(
        "Decoded {}/{} images in {:.2?}",
        hits,
        results.len(),
        start.elapsed()
    );
    Ok(())
}

fn camera_cmd(frames: &Path, ticks: Option<u64>, once: bool, config: ScanConfig) -> Result<()> {
    let mut camera = FrameReplayCamera::from_dir(frames)
        .max_dim(config.max_dim)
        .repeat(!once);
    let mut controller = new_controller(config);

    if let Err(err) = controller.start_camera(&mut camera) {
        print_panel(controller.scan_result(), false);
        return Err(err).context("camera did not start");
    }

    let mut frame_loop = FrameLoop::new(IntervalClock::new(config.frame_interval));
    if let Some(ticks) = ticks {
        frame_loop = frame_loop.with_tick_limit(ticks);
    }
    let stop = frame_loop.stop_handle();
    let summary = frame_loop.run_with(&mut controller, |controller, outcome| {
        if let TickOutcome::Decoded(payload) = outcome {
            println!("{}", payload);
        }
        if controller.video().is_some_and(ReplaySource::ended) {
            stop.stop();
        }
    });

    println!(
        "Ran {} ticks: {} decoded, {} skipped",
        summary.ticks, summary.decoded, summary.skipped
    );
    Ok(())
}

fn encode_cmd(payload: String, out: &Path, scale: u32) -> Result<()> {
    let payload = Payload::new(payload).context("payload must not be empty")?;
    let frame = render_payload(&payload, scale)?;
    save_rgba(&frame, out).with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "Wrote {} ({}x{})",
        out.display(),
        frame.width(),
        frame.height()
    );
    Ok(())
}
