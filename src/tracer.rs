use std::ops::{ Add, AddAssign };

use crate::ray::Ray;
use crate::color::Color;
use crate::scene::Scene;
use crate::config::RenderConfig;
use crate::light::compute_lighting;

/// Counters collected while tracing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Calls to the tracer, primary and reflected rays alike.
    pub rays: usize,

    /// Rays which hit a shape.
    pub hits: usize,

    /// Reflection rays spawned.
    pub reflection_rays: usize,

    /// Longest chain of reflections behind a single primary ray.
    pub deepest_bounce: usize,
}

impl Add for TraceStats {
    type Output = TraceStats;

    fn add(self, other: TraceStats) -> TraceStats {
        TraceStats {
            rays: self.rays + other.rays,
            hits: self.hits + other.hits,
            reflection_rays: self.reflection_rays + other.reflection_rays,
            deepest_bounce: self.deepest_bounce.max(other.deepest_bounce),
        }
    }
}

impl AddAssign for TraceStats {
    fn add_assign(&mut self, other: TraceStats) {
        *self = *self + other;
    }
}

/// Determines the color seen along a ray.
///
/// Finds the nearest hit in `[t_min, t_max]`, shades it, and while `depth`
/// allows, mixes in the color seen along the mirrored ray in proportion to
/// the surface's reflectivity. Rays hitting nothing take the background
/// color.
pub fn trace_ray(scene: &Scene, r: &Ray, t_min: f64, t_max: f64,
    depth: usize, config: &RenderConfig) -> Color {
    let mut stats = TraceStats::default();
    trace_ray_with_stats(scene, r, t_min, t_max, depth, config, &mut stats)
}

/// Like `trace_ray`, adding what happened to `stats`.
pub fn trace_ray_with_stats(scene: &Scene, r: &Ray, t_min: f64, t_max: f64,
    depth: usize, config: &RenderConfig, stats: &mut TraceStats) -> Color {
    trace(scene, r, t_min, t_max, depth, 0, config, stats)
}

#[allow(clippy::too_many_arguments)]
fn trace(scene: &Scene, r: &Ray, t_min: f64, t_max: f64, depth: usize,
    bounce: usize, config: &RenderConfig, stats: &mut TraceStats) -> Color {
    stats.rays += 1;

    let hit = match scene.intersect(r, t_min, t_max) {
        Some(hit) => hit,
        None => return scene.background,
    };
    stats.hits += 1;

    let material = hit.what.material();
    let base_color = hit.what.color_at(hit.point);
    let lighting = compute_lighting(hit.point, hit.normalv, hit.eyev,
        material.specular, scene, Some(hit.what), config.epsilon);
    let local_color = (base_color * lighting).clamp();

    let reflective = material.reflective.min(1.0);
    if depth == 0 || !(reflective > 0.0) {
        return local_color;
    }

    stats.reflection_rays += 1;
    stats.deepest_bounce = stats.deepest_bounce.max(bounce + 1);

    let reflected_ray = Ray::new(hit.point, hit.reflectv(r));
    let reflected_color = trace(scene, &reflected_ray, config.epsilon,
        std::f64::INFINITY, depth - 1, bounce + 1, config, stats);

    local_color.blend(&reflected_color, reflective).clamp()
}

/* Tests */

#[cfg(test)]
use crate::vector::Vector3;
#[cfg(test)]
use crate::light::{ Light, Material };
#[cfg(test)]
use crate::shape::Shape;

#[cfg(test)]
const INF: f64 = std::f64::INFINITY;

#[cfg(test)]
fn facing_mirrors(reflective: f64) -> Scene {
    let mirror = Material {
        color: Color::rgb(100.0, 100.0, 100.0),
        reflective,
        ..Default::default()
    };

    let mut scene = Scene::empty();
    scene.lights.push(Light::ambient(1.0));
    scene.shapes.push(Shape::plane(Vector3::zero(),
        Vector3::new(0.0, 0.0, 1.0)).with_material(mirror));
    scene.shapes.push(Shape::plane(Vector3::new(0.0, 0.0, 10.0),
        Vector3::new(0.0, 0.0, -1.0)).with_material(mirror));
    scene
}

#[test]
fn miss_returns_background() {
    let mut scene = Scene::empty();
    scene.background = Color::rgb(10.0, 20.0, 30.0);

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let c = trace_ray(&scene, &r, 1.0, INF, 3, &RenderConfig::default());
    assert_eq!(c, Color::rgb(10.0, 20.0, 30.0));
}

#[test]
fn local_color_is_base_times_lighting() {
    let mut scene = Scene::empty();
    scene.lights.push(Light::ambient(0.5));
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 0.0, 5.0), 1.0)
        .with_material(Material {
            color: Color::rgb(200.0, 100.0, 50.0),
            ..Default::default()
        }));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let c = trace_ray(&scene, &r, 1.0, INF, 3, &RenderConfig::default());
    assert_eq!(c, Color::rgb(100.0, 50.0, 25.0));
}

#[test]
fn overbright_light_is_clamped() {
    let mut scene = Scene::empty();
    scene.lights.push(Light::ambient(3.0));
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 0.0, 5.0), 1.0)
        .with_material(Material {
            color: Color::rgb(200.0, 50.0, 0.0),
            ..Default::default()
        }));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let c = trace_ray(&scene, &r, 1.0, INF, 3, &RenderConfig::default());
    assert_eq!(c, Color::rgb(255.0, 150.0, 0.0));
}

#[test]
fn matte_surfaces_never_reflect() {
    let scene = facing_mirrors(0.0);
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
    let mut stats = TraceStats::default();

    trace_ray_with_stats(&scene, &r, 0.001, INF, 5,
        &RenderConfig::default(), &mut stats);

    assert_eq!(stats.rays, 1);
    assert_eq!(stats.reflection_rays, 0);
}

#[test]
fn depth_bounds_infinite_mirror() {
    let scene = facing_mirrors(0.5);
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));

    for depth in 0..6 {
        let mut stats = TraceStats::default();
        trace_ray_with_stats(&scene, &r, 0.001, INF, depth,
            &RenderConfig::default(), &mut stats);

        assert_eq!(stats.reflection_rays, depth);
        assert_eq!(stats.deepest_bounce, depth);
        assert_eq!(stats.rays, depth + 1);
        assert_eq!(stats.hits, depth + 1);
    }
}

#[test]
fn depth_zero_returns_local_color() {
    let scene = facing_mirrors(0.5);
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));

    let c = trace_ray(&scene, &r, 0.001, INF, 0, &RenderConfig::default());
    assert_eq!(c, Color::rgb(100.0, 100.0, 100.0));
}

#[test]
fn perfect_mirror_ignores_its_own_color() {
    let red = Material {
        color: Color::rgb(255.0, 0.0, 0.0),
        ..Default::default()
    };

    let render_with_mirror = |mirror_color: Color| {
        let mut scene = Scene::empty();
        scene.lights.push(Light::ambient(1.0));
        scene.shapes.push(Shape::plane(Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(0.0, 0.0, -1.0)).with_material(Material {
                color: mirror_color,
                reflective: 1.0,
                ..Default::default()
            }));
        scene.shapes.push(Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0)
            .with_material(red));

        let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
        trace_ray(&scene, &r, 0.001, INF, 3, &RenderConfig::default())
    };

    let through_white = render_with_mirror(Color::white());
    let through_green = render_with_mirror(Color::rgb(0.0, 255.0, 0.0));

    assert_eq!(through_white, through_green);
    assert_eq!(through_white, Color::rgb(255.0, 0.0, 0.0));
}

#[test]
fn half_mirror_blends_with_background() {
    let mut scene = Scene::empty();
    scene.background = Color::rgb(0.0, 0.0, 200.0);
    scene.lights.push(Light::ambient(1.0));
    scene.shapes.push(Shape::plane(Vector3::new(0.0, 0.0, 10.0),
        Vector3::new(0.0, 0.0, -1.0)).with_material(Material {
            color: Color::rgb(100.0, 0.0, 0.0),
            reflective: 0.5,
            ..Default::default()
        }));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let c = trace_ray(&scene, &r, 0.001, INF, 3, &RenderConfig::default());
    assert_eq!(c, Color::rgb(50.0, 0.0, 100.0));
}

#[test]
fn stats_merge_keeps_deepest_bounce() {
    let a = TraceStats { rays: 3, hits: 2, reflection_rays: 1, deepest_bounce: 1 };
    let b = TraceStats { rays: 5, hits: 5, reflection_rays: 4, deepest_bounce: 3 };

    let mut c = a;
    c += b;
    assert_eq!(c, TraceStats { rays: 8, hits: 7, reflection_rays: 5,
        deepest_bounce: 3 });
}
