//! blobtrack CLI: run the color tracker over a live stream or recorded frames.

use std::io::{self, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use blobtrack_rs::{
    ColorRange, FrameSource, ImageSequenceSource, Mission, RawStreamSource, RecordingController,
    SourceError, TrackerConfig, TrackerPipeline, integration::frame_to_rgb_image,
};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "blobtrack")]
#[command(about = "Track a colored blob and report its offset from the frame centre")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track frames and print one JSON result per line.
    Track {
        /// Directory of recorded frames; reads raw BGR24 frames from stdin when omitted.
        #[arg(long)]
        video: Option<PathBuf>,

        /// Raw stream frame width in pixels.
        #[arg(long, default_value_t = 640)]
        width: usize,

        /// Raw stream frame height in pixels.
        #[arg(long, default_value_t = 480)]
        height: usize,

        /// Width recorded frames are scaled to (0 keeps the original size).
        #[arg(long, default_value_t = 600)]
        resize_width: u32,

        /// Tracker configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Color preset overriding the configured range (blue, green, orange, red).
        #[arg(long)]
        color: Option<String>,

        /// Landing radius in pixels overriding the configured one.
        #[arg(long)]
        landing_radius: Option<f64>,

        /// Directory to write annotated frames (PNG) to.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Dry-run the demo flight mission and print its commands.
    Mission {
        /// Move distance in centimetres.
        #[arg(long, default_value_t = 100)]
        distance: u32,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match cli.command {
        Commands::Track {
            video,
            width,
            height,
            resize_width,
            config,
            color,
            landing_radius,
            output,
        } => {
            let mut tracker_config = match config {
                Some(path) => TrackerConfig::from_json_file(&path)?,
                None => TrackerConfig::default(),
            };
            if let Some(name) = color {
                tracker_config.color_range = ColorRange::preset(&name)
                    .ok_or_else(|| -> CliError { format!("unknown color preset: {name}").into() })?;
            }
            if let Some(radius) = landing_radius {
                tracker_config.landing_radius = radius;
            }
            tracker_config.validate()?;

            let source: Box<dyn FrameSource<Error = SourceError>> = match video {
                Some(dir) => {
                    Box::new(ImageSequenceSource::from_dir(dir)?.with_resize_width(resize_width))
                }
                None => Box::new(RawStreamSource::new(io::stdin().lock(), height, width)?),
            };
            run_track(source, tracker_config, output.as_deref())
        }
        Commands::Mission { distance } => {
            let mut controller = RecordingController::new();
            Mission::demo(distance).run(&mut controller)?;
            for command in controller.executed() {
                println!("{command}");
            }
            Ok(())
        }
    }
}

fn run_track(
    source: Box<dyn FrameSource<Error = SourceError>>,
    config: TrackerConfig,
    output: Option<&Path>,
) -> CliResult<()> {
    if let Some(dir) = output {
        std::fs::create_dir_all(dir)?;
    }

    let mut pipeline = TrackerPipeline::new(source, config);
    let mut stdout = BufWriter::new(io::stdout().lock());
    let mut failure: Option<CliError> = None;
    let mut index = 0usize;

    pipeline.run(|tracker, tracked| {
        let step = (|| -> CliResult<()> {
            writeln!(stdout, "{}", serde_json::to_string(&tracked.result)?)?;
            if let Some(dir) = output {
                let annotated = tracker.draw_arrows(tracked.frame);
                let path = dir.join(format!("frame_{index:06}.png"));
                frame_to_rgb_image(&annotated).save(&path)?;
            }
            Ok(())
        })();
        index += 1;
        match step {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        }
    })?;

    stdout.flush()?;
    if let Some(err) = failure {
        return Err(err);
    }
    info!("tracked {} frames", pipeline.frame_count());
    Ok(())
}
