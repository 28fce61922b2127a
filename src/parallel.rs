use log::debug;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::scene::Scene;
use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::tracer::TraceStats;
use crate::error::Error;

/// Starts the worker pool for `render_parallel`.
///
/// The pool has `config.threads` workers, or as many as rayon sees fit when
/// that is 0. Build it once and reuse it for every frame.
pub fn thread_pool(config: &RenderConfig) -> Result<ThreadPool, Error> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    debug!("Started {} render threads.", pool.current_num_threads());
    Ok(pool)
}

/// Renders `scene` on a pool of worker threads.
///
/// Each worker takes whole rows of the canvas and only ever writes to the
/// rows it took, reading the shared scene. The result is identical to
/// `Camera::render`.
pub fn render_parallel(pool: &ThreadPool, scene: &Scene, config: &RenderConfig)
    -> Canvas {
    let mut image = Canvas::new(config.width, config.height);
    if config.width == 0 {
        return image;
    }

    let camera = &scene.camera;
    let stats = pool.install(|| {
        image.pixels_mut()
            .par_chunks_mut(config.width)
            .enumerate()
            .map(|(y, row)| camera.render_row(scene, config, y, row))
            .reduce(TraceStats::default, |a, b| a + b)
    });

    debug!("Traced {} rays ({} hits, {} reflections, deepest bounce {}).",
        stats.rays, stats.hits, stats.reflection_rays, stats.deepest_bounce);
    image
}

#[cfg(test)]
use crate::vector::Vector3;
#[cfg(test)]
use crate::light::Material;
#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::pattern::Texture;
#[cfg(test)]
use crate::color::Color;

#[test]
fn parallel_render_matches_serial() {
    let mut scene = Scene::new();
    scene.shapes.push(Shape::sphere(Vector3::new(1.5, 0.0, 6.0), 1.0)
        .with_material(Material {
            color: Color::rgb(255.0, 0.0, 0.0),
            specular: 500.0,
            reflective: 0.3,
            texture: Some(Texture::default()),
            ..Default::default()
        }));
    scene.add_room();

    let mut config = RenderConfig::with_size(40, 30);
    config.threads = 3;

    let pool = thread_pool(&config).expect("Thread pool should start.");
    assert_eq!(pool.current_num_threads(), 3);

    let serial = scene.camera.render(&scene, &config);
    let parallel = render_parallel(&pool, &scene, &config);
    assert_eq!(serial, parallel);

    // The same pool serves the next frame too.
    scene.lights.clear();
    assert_eq!(scene.camera.render(&scene, &config),
        render_parallel(&pool, &scene, &config));
}

#[test]
fn parallel_render_of_empty_canvas() {
    let scene = Scene::new();
    let config = RenderConfig::with_size(0, 0);

    let pool = thread_pool(&config).expect("Thread pool should start.");
    let image = render_parallel(&pool, &scene, &config);
    assert!(image.pixels().is_empty());
}
