use log::debug;

use crate::ray::Ray;
use crate::vector::Vector3;
use crate::scene::Scene;
use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::tracer::{ trace_ray_with_stats, TraceStats };
use crate::consts::{ VIEWPORT_WIDTH, VIEWPORT_HEIGHT, PROJECTION_DISTANCE };

/// A camera record for generating a canvas.
///
/// The camera sits at `position` and looks down the +z axis. The canvas is
/// mapped onto a viewport of `viewport_width` by `viewport_height` world
/// units, placed `projection_distance` in front of the camera. Primary rays
/// run from the camera through the viewport.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vector3,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub projection_distance: f64,
}

impl Default for Camera {
    fn default() -> Camera {
        Camera {
            position: Vector3::zero(),
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            projection_distance: PROJECTION_DISTANCE,
        }
    }
}

impl Camera {
    pub fn new(position: Vector3, viewport_width: f64, viewport_height: f64,
        projection_distance: f64) -> Camera {
        Camera { position, viewport_width, viewport_height, projection_distance }
    }

    /// Maps pixel `(px, py)` of a `width` by `height` canvas onto the
    /// viewport, relative to the camera.
    ///
    /// The canvas center maps to the viewport center; canvas rows grow
    /// downwards while viewport `y` grows upwards.
    pub fn canvas_to_viewport(&self, px: usize, py: usize, width: usize,
        height: usize) -> Vector3 {
        let cx = px as f64 - (width / 2) as f64;
        let cy = (height / 2) as f64 - py as f64;

        Vector3::new(
            cx * self.viewport_width / width as f64,
            cy * self.viewport_height / height as f64,
            self.projection_distance,
        )
    }

    /// The primary ray through pixel `(px, py)`, with a unit direction.
    ///
    /// ```
    /// # use phong_tracer::camera::Camera;
    /// # use phong_tracer::vector::Vector3;
    /// let r = Camera::default().ray_for_pixel(250, 250, 500, 500);
    /// assert_eq!(r.origin, Vector3::zero());
    /// assert_eq!(r.direction, Vector3::new(0.0, 0.0, 1.0));
    /// ```
    pub fn ray_for_pixel(&self, px: usize, py: usize, width: usize,
        height: usize) -> Ray {
        let direction = self.canvas_to_viewport(px, py, width, height);
        Ray::new(self.position, direction.normalize())
    }

    /// Traces every pixel of row `y` into `row`, which holds `config.width`
    /// pixels.
    pub fn render_row(&self, scene: &Scene, config: &RenderConfig, y: usize,
        row: &mut [[u8; 3]]) -> TraceStats {
        let mut stats = TraceStats::default();

        for (x, pixel) in row.iter_mut().enumerate() {
            let ray = self.ray_for_pixel(x, y, config.width, config.height);
            let color = trace_ray_with_stats(scene, &ray, config.near,
                std::f64::INFINITY, config.max_depth, config, &mut stats);
            *pixel = color.to_rgb8();
        }

        stats
    }

    /// Renders `scene` as seen from this camera, one pixel after another.
    pub fn render(&self, scene: &Scene, config: &RenderConfig) -> Canvas {
        let mut image = Canvas::new(config.width, config.height);
        let mut stats = TraceStats::default();

        if config.width > 0 {
            for (y, row) in image.pixels_mut().chunks_mut(config.width).enumerate() {
                stats += self.render_row(scene, config, y, row);
            }
        }

        debug!("Traced {} rays ({} hits, {} reflections, deepest bounce {}).",
            stats.rays, stats.hits, stats.reflection_rays, stats.deepest_bounce);
        image
    }
}

/* Tests */

#[cfg(test)]
use crate::color::Color;
#[cfg(test)]
use crate::light::{ Light, Material };
#[cfg(test)]
use crate::shape::Shape;

#[cfg(test)]
fn lone_sphere(lights: Vec<Light>) -> Scene {
    let mut scene = Scene::empty();
    scene.background = Color::rgb(0.0, 0.0, 64.0);
    scene.lights = lights;
    scene.camera = Camera::new(Vector3::new(0.0, 0.0, -3.0), 1.0, 1.0, 1.0);
    scene.shapes.push(Shape::sphere(Vector3::zero(), 1.0)
        .with_material(Material {
            color: Color::rgb(200.0, 100.0, 50.0),
            ..Default::default()
        }));
    scene
}

#[test]
fn center_pixel_maps_to_viewport_center() {
    let c = Camera::default();

    assert_eq!(c.canvas_to_viewport(250, 250, 500, 500),
        Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(c.canvas_to_viewport(0, 0, 500, 500),
        Vector3::new(-1.0, 1.0, 1.0));
    assert_eq!(c.canvas_to_viewport(499, 499, 500, 500),
        Vector3::new(0.996, -0.996, 1.0));
}

#[test]
fn rays_start_at_camera_position() {
    let c = Camera::new(Vector3::new(1.0, 2.0, 3.0), 2.0, 2.0, 1.0);
    let r = c.ray_for_pixel(0, 0, 2, 2);

    let h = 1.0 / 3.0f64.sqrt();
    assert_eq!(r.origin, Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(r.direction, Vector3::new(-h, h, h));
}

#[test]
fn render_sphere_under_full_ambient() {
    let scene = lone_sphere(vec![Light::ambient(1.0)]);
    let config = RenderConfig::with_size(21, 21);
    let image = scene.camera.render(&scene, &config);

    let base = [200, 100, 50];
    let background = [0, 0, 64];

    assert_eq!(image.read_pixel(10, 10), Some(base));
    assert_eq!(image.read_pixel(0, 0), Some(background));
    assert_eq!(image.read_pixel(20, 20), Some(background));
    assert!(image.pixels().iter().all(|&p| p == base || p == background));
}

#[test]
fn light_behind_sphere_leaves_ambient_only() {
    let scene = lone_sphere(vec![
        Light::ambient(0.2),
        Light::point(1.0, Vector3::new(0.0, 0.0, 5.0)),
    ]);
    let config = RenderConfig::with_size(21, 21);
    let image = scene.camera.render(&scene, &config);

    let dim = [40, 20, 10];
    let background = [0, 0, 64];

    assert_eq!(image.read_pixel(10, 10), Some(dim));
    assert!(image.pixels().iter().all(|&p| p == dim || p == background));
}

#[test]
fn render_respects_near_plane() {
    // The sphere lies entirely closer than the near plane.
    let mut scene = lone_sphere(vec![Light::ambient(1.0)]);
    scene.shapes[0] = Shape::sphere(Vector3::new(0.0, 0.0, -2.5), 0.25);

    let config = RenderConfig::with_size(5, 5);
    let image = scene.camera.render(&scene, &config);

    assert!(image.pixels().iter().all(|&p| p == [0, 0, 64]));
}
