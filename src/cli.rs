use std::path::PathBuf;

use clap::{ ArgEnum, Parser };
use log::LevelFilter;

use phong_tracer::animation::AnimationMode;
use phong_tracer::config::RenderConfig;
use phong_tracer::error::Error;

/// Log levels selectable from the command line.
#[derive(ArgEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(ArgEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Orbit,
    Move,
}

impl From<Mode> for AnimationMode {
    fn from(mode: Mode) -> AnimationMode {
        match mode {
            Mode::Orbit => AnimationMode::Orbit,
            Mode::Move => AnimationMode::Move,
        }
    }
}

/// Renders a scene with a recursive Phong ray tracer.
#[derive(Parser, Debug)]
#[clap(name = "phong-tracer", version, about)]
pub struct Args {
    /// Scene file, JSON (`.json`) or the block text format
    pub scene: PathBuf,

    /// Output file [default: output.ppm, or animation.gif when animating]
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Render an animated GIF with this many frames
    #[clap(long, value_name = "FRAMES")]
    pub animate: Option<usize>,

    /// What moves in the animation
    #[clap(long, arg_enum, default_value = "orbit")]
    pub mode: Mode,

    /// Also write every animation frame as frame_NN.ppm
    #[clap(long)]
    pub keep_frames: bool,

    /// Enclose the scene in a room of five planes
    #[clap(long)]
    pub room: bool,

    /// Canvas width, in pixels
    #[clap(long)]
    pub width: Option<usize>,

    /// Canvas height, in pixels
    #[clap(long)]
    pub height: Option<usize>,

    /// Maximum number of reflection bounces
    #[clap(long)]
    pub depth: Option<usize>,

    /// Worker threads (0 uses every core)
    #[clap(long)]
    pub threads: Option<usize>,

    /// Render on the calling thread only
    #[clap(long)]
    pub serial: bool,

    /// JSON file with render settings; flags given here override it
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Set the logging level
    #[clap(long, arg_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Builds the render configuration: defaults, then the `--config` file,
    /// then individual flags.
    pub fn render_config(&self) -> Result<RenderConfig, Error> {
        let mut config = match self.config {
            Some(ref path) => RenderConfig::load(path)?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }

        Ok(config)
    }
}

#[test]
fn defaults_without_flags() {
    let args = Args::try_parse_from(&["phong-tracer", "scenes/spheres.txt"])
        .expect("Arguments should parse.");

    assert_eq!(args.scene, PathBuf::from("scenes/spheres.txt"));
    assert_eq!(args.output, None);
    assert_eq!(args.animate, None);
    assert_eq!(args.mode, Mode::Orbit);
    assert_eq!(args.log_level, LogLevel::Info);
    assert_eq!(args.render_config().unwrap(), RenderConfig::default());
}

#[test]
fn flags_override_defaults() {
    let args = Args::try_parse_from(&["phong-tracer", "s.json", "--width", "64",
        "--height", "48", "--depth", "1", "--threads", "2", "--animate", "12",
        "--mode", "move", "--log-level", "debug", "-o", "out.png", "--room"])
        .expect("Arguments should parse.");

    let config = args.render_config().unwrap();
    assert_eq!((config.width, config.height), (64, 48));
    assert_eq!(config.max_depth, 1);
    assert_eq!(config.threads, 2);

    assert_eq!(args.animate, Some(12));
    assert_eq!(AnimationMode::from(args.mode), AnimationMode::Move);
    assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    assert_eq!(args.output, Some(PathBuf::from("out.png")));
    assert!(args.room);
}

#[test]
fn scene_is_required() {
    assert!(Args::try_parse_from(&["phong-tracer"]).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let args = Args::try_parse_from(&["phong-tracer", "s.txt", "--config",
        "no/such/config.json"]).expect("Arguments should parse.");

    assert!(args.render_config().is_err());
}
