//! Multi-object tracker
//!
//! Draw boxes around the objects on the first frame, then watch them being
//! tracked on the edge-filtered video. ESC quits.
//!
//! Usage:
//!   multitracker --video person2_640_480.mp4 --tracker KCF
//!   multitracker --video frames/ --roi 120,80,40,60 --roi 300,90,30,30 --headless --output-dir out/

use anyhow::{Context, Result};
use clap::Parser;
use multitracker::{
    available_trackers, edge_template_factory, open_source, FixedSelector, FrameSink,
    HeadlessSink, PipelineConfig, PipelineError, RegionSelector, RunOutcome, TrackingSession,
};
use roitrack::{Roi, TrackerFactory, TrackerKind};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Video file, or a directory of frame images
    #[arg(short, long)]
    video: Option<PathBuf>,

    /// Tracking algorithm (BOOSTING, MIL, KCF, TLD, MEDIANFLOW, GOTURN, MOSSE, CSRT)
    #[arg(short, long)]
    tracker: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Region to track as x,y,w,h; repeat for several objects
    #[arg(long = "roi", value_name = "X,Y,W,H")]
    rois: Vec<String>,

    /// Write annotated frames to this directory (headless only)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Run without windows
    #[arg(long)]
    headless: bool,

    /// Seed of the track colors
    #[arg(long)]
    seed: Option<u64>,
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(video) = &args.video {
        config.video_path = video.clone();
    }
    if let Some(name) = &args.tracker {
        config.tracker = name
            .parse::<TrackerKind>()
            .context("Invalid --tracker value")?;
    }
    if !args.rois.is_empty() {
        config.rois = args
            .rois
            .iter()
            .map(|s| s.parse::<Roi>().map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()
            .context("Invalid --roi value")?;
    }
    if args.output_dir.is_some() {
        config.output_dir = args.output_dir.clone();
    }
    if args.headless {
        config.headless = true;
    }
    if let Some(seed) = args.seed {
        config.color_seed = seed;
    }

    config.validate()?;
    Ok(config)
}

fn print_banner(config: &PipelineConfig) {
    println!("Default tracking algorithm is {}", TrackerKind::default());
    println!(
        "Available tracking algorithms are: {}",
        available_trackers().join(", ")
    );
    println!("Using {} on {}", config.tracker, config.video_path.display());
}

/// Interactive selection and windows need OpenCV and a display
fn use_windows(config: &PipelineConfig) -> bool {
    cfg!(feature = "opencv") && !config.headless
}

fn make_factory(config: &PipelineConfig) -> Box<dyn TrackerFactory> {
    if use_windows(config) {
        #[cfg(feature = "opencv")]
        return Box::new(multitracker::opencv_backend::OpenCvFactory);
    }

    Box::new(edge_template_factory())
}

fn make_selector(config: &PipelineConfig) -> Box<dyn RegionSelector> {
    if use_windows(config) && config.rois.is_empty() {
        #[cfg(feature = "opencv")]
        return Box::new(multitracker::opencv_backend::WindowSelector::new(
            config.window_name.clone(),
        ));
    }

    if config.rois.is_empty() {
        log::warn!("No interactive selection available, pass regions with --roi");
    }
    Box::new(FixedSelector::new(config.rois.clone()))
}

fn make_sink(config: &PipelineConfig) -> multitracker::Result<Box<dyn FrameSink>> {
    if use_windows(config) {
        #[cfg(feature = "opencv")]
        return Ok(Box::new(multitracker::opencv_backend::WindowSink::new(
            config.window_name.clone(),
        )));
    }

    Ok(Box::new(HeadlessSink::new(config.output_dir.clone())?))
}

fn track(config: &PipelineConfig) -> multitracker::Result<RunOutcome> {
    // Fail on a bad video before anything is shown
    let mut source = open_source(config)?;

    let factory = make_factory(config);
    log::info!("Tracker backend: {}", factory.name());

    let mut selector = make_selector(config);
    let mut sink = make_sink(config)?;

    TrackingSession::new(config, factory.as_ref()).run(
        source.as_mut(),
        selector.as_mut(),
        sink.as_mut(),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    print_banner(&config);

    match track(&config) {
        Ok(outcome) => {
            if let Some(stats) = outcome.stats() {
                println!(
                    "Tracked {} object(s) over {} frame(s), {:.1} FPS",
                    stats.tracks, stats.frames, stats.average_fps
                );
            }
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            log::error!("{}", e);
            if let PipelineError::VideoOpen { .. } = e {
                eprintln!("{}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
