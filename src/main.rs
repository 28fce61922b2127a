use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use indicatif::{ ProgressBar, ProgressStyle };
use rayon::ThreadPool;
use log::{ debug, error, info, warn };

use phong_tracer::animation::{ Animation, AnimationMode, GifWriter };
use phong_tracer::canvas::Canvas;
use phong_tracer::config::RenderConfig;
use phong_tracer::consts::{ OUT_FILE, GIF_FILE };
use phong_tracer::description::load_scene;
use phong_tracer::error::Error;
use phong_tracer::light::Light;
use phong_tracer::parallel::{ render_parallel, thread_pool };
use phong_tracer::scene::Scene;

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

fn main() {
    let args = Args::parse();
    init_logger(args.log_level.into());

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let config = args.render_config()?;
    debug!("Render configuration: {:?}", config);

    let mut scene = load_scene(&args.scene)?;
    if args.room {
        scene.add_room();
    }

    let (spheres, planes, triangles) = scene.shape_counts();
    info!("Scene created with {} spheres, {} planes, {} triangles and {} lights.",
        spheres, planes, triangles, scene.lights.len());

    let pool = if args.serial { None } else { Some(thread_pool(&config)?) };
    let pool = pool.as_ref();

    match args.animate {
        Some(frames) => animate(args, &scene, &config, pool, frames),
        None => render_still(args, &scene, &config, pool),
    }
}

/// Renders on `pool`, or on this thread without one.
fn render(scene: &Scene, config: &RenderConfig, pool: Option<&ThreadPool>)
    -> Canvas {
    match pool {
        Some(pool) => render_parallel(pool, scene, config),
        None => scene.camera.render(scene, config),
    }
}

fn render_still(args: &Args, scene: &Scene, config: &RenderConfig,
    pool: Option<&ThreadPool>) -> Result<(), Error> {
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from(OUT_FILE));

    info!("Rendering {}x{} image...", config.width, config.height);
    let start = Instant::now();
    let canvas = render(scene, config, pool);
    info!("...done in {:.2?}.", start.elapsed());

    canvas.save(&output)?;
    info!("Saved render to {}.", output.display());

    Ok(())
}

fn animate(args: &Args, scene: &Scene, config: &RenderConfig,
    pool: Option<&ThreadPool>, frames: usize) -> Result<(), Error> {
    if frames == 0 {
        warn!("Animation with 0 frames requested, nothing to render.");
        return Ok(());
    }

    let animation = Animation::new(frames, args.mode.into());
    match animation.mode {
        AnimationMode::Orbit if !scene.lights.iter().any(|l| matches!(l, Light::Point { .. })) =>
            warn!("No point light to orbit, every frame will look the same."),
        AnimationMode::Move if scene.shape_counts().0 == 0 =>
            warn!("No sphere to move, every frame will look the same."),
        _ => (),
    }

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from(GIF_FILE));
    let mut gif = GifWriter::new(BufWriter::new(File::create(&output)?));

    info!("Starting animation with {} frames...", frames);
    let start = Instant::now();

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{bar:40.cyan/blue} {pos}/{len} frames | {elapsed_precise} | ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar()));

    for frame in 0..frames {
        let frame_scene = animation.frame_scene(scene, frame);
        let canvas = render(&frame_scene, config, pool);
        debug!("Rendered frame {}/{} (angle={:.1}).", frame + 1, frames,
            animation.angle(frame));

        if args.keep_frames {
            canvas.save(format!("frame_{:02}.ppm", frame))?;
        }

        gif.add_frame(&canvas);
        pb.inc(1);
    }

    pb.finish_and_clear();
    gif.finish()?;

    info!("Rendering complete in {:.2?}.", start.elapsed());
    info!("Saved animation to {}.", output.display());

    Ok(())
}
