use crate::color::Color;
use crate::pattern::Texture;
use crate::vector::Vector3;
use crate::ray::Ray;
use crate::shape::Shape;
use crate::scene::Scene;

/// Distance falloff of a point light: `1 / (constant + linear d + quadratic d^2)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f64,
    pub linear: f64,
    pub quadratic: f64,
}

impl Default for Attenuation {
    fn default() -> Attenuation {
        Attenuation { constant: 1.0, linear: 0.1, quadratic: 0.01 }
    }
}

impl Attenuation {
    /// No falloff at all.
    pub fn none() -> Attenuation {
        Attenuation { constant: 1.0, linear: 0.0, quadratic: 0.0 }
    }

    /// The fraction of a light's intensity left after `distance`.
    ///
    /// ```
    /// # use phong_tracer::light::Attenuation;
    /// assert_eq!(Attenuation::none().factor(12.0), 1.0);
    /// assert_eq!(Attenuation::default().factor(10.0), 1.0 / 3.0);
    /// ```
    pub fn factor(&self, distance: f64) -> f64 {
        let denominator = self.constant
            + self.linear * distance
            + self.quadratic * distance * distance;

        if denominator > 0.0 { 1.0 / denominator } else { 1.0 }
    }
}

/// A light source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    /// Light reaching every point equally, from no particular direction.
    Ambient { intensity: f64 },

    /// Light radiating from a position, fading with distance.
    Point {
        intensity: f64,
        position: Vector3,
        attenuation: Attenuation,
    },

    /// Light arriving from infinitely far away. `direction` is the direction
    /// the light travels in.
    Directional { intensity: f64, direction: Vector3 },
}

impl Light {
    pub fn ambient(intensity: f64) -> Light {
        Light::Ambient { intensity }
    }

    /// Creates a point light with the default attenuation.
    pub fn point(intensity: f64, position: Vector3) -> Light {
        Light::Point { intensity, position, attenuation: Default::default() }
    }

    pub fn directional(intensity: f64, direction: Vector3) -> Light {
        Light::Directional { intensity, direction }
    }

    pub fn intensity(&self) -> f64 {
        match *self {
            Light::Ambient { intensity } => intensity,
            Light::Point { intensity, .. } => intensity,
            Light::Directional { intensity, .. } => intensity,
        }
    }
}

/// A material record.
///
/// Materials carry the Phong attributes the tracer needs: a base color, a
/// specular exponent and a reflectivity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    /// Base color, channels in `0.0..=255.0`.
    pub color: Color,

    /// Specular exponent. Zero or negative disables highlights.
    pub specular: f64,

    /// Fraction of the final color taken from the mirror reflection, in
    /// `0.0..=1.0`.
    pub reflective: f64,

    pub texture: Option<Texture>,

    /// Whether the shape blocks shadow rays.
    pub casts_shadow: bool,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            specular: 0.0,
            reflective: 0.0,
            texture: None,
            casts_shadow: true,
        }
    }
}

/// Computes the light intensity arriving at a point.
///
/// Sums over every light in `scene`: ambient lights contribute their
/// intensity as is; point and directional lights contribute a diffuse term
/// and, when `specular > 0`, a specular term, unless a shadow ray toward the
/// light is blocked. Shadows are hard: a blocked light contributes nothing.
/// Point light attenuation scales the diffuse term only; highlights keep the
/// light's full intensity.
///
/// `normal` should face the viewer, and `view` points from the surface back
/// toward the eye. `current` is the shape being shaded; it never shadows
/// itself. The returned scalar is not clamped.
pub fn compute_lighting(point: Vector3, normal: Vector3, view: Vector3,
    specular: f64, scene: &Scene, current: Option<&Shape>, epsilon: f64)
    -> f64 {
    let mut intensity = 0.0;

    for light in scene.lights.iter() {
        // Direction toward the light, how far a shadow ray may travel, the
        // light's intensity and how much of it is left for diffuse shading.
        let (lightv, t_max, strength, falloff) = match *light {
            Light::Ambient { intensity: ambient } => {
                intensity += ambient;
                continue;
            },
            Light::Point { intensity, position, attenuation } => {
                let to_light = position - point;
                let distance = to_light.length();
                (to_light.normalize(), distance, intensity,
                    attenuation.factor(distance))
            },
            Light::Directional { intensity, direction } => {
                (-direction.normalize(), std::f64::INFINITY, intensity, 1.0)
            },
        };

        // A light at the point itself has no direction to shade with.
        if lightv == Vector3::zero() {
            continue;
        }

        let shadow_ray = Ray::new(point, lightv);
        if scene.is_shadowed(&shadow_ray, epsilon, t_max, current) {
            continue;
        }

        // For the side of the surface facing away from the light, there is
        // neither diffuse nor specular light.
        let light_dot_normal = normal.dot(&lightv);
        if light_dot_normal <= 0.0 {
            continue;
        }

        let lengths = normal.length() * lightv.length();
        intensity += strength * falloff * light_dot_normal / lengths;

        if specular > 0.0 {
            let reflectv = normal * (2.0 * light_dot_normal) - lightv;
            let reflect_dot_view = reflectv.dot(&view);
            let lengths = reflectv.length() * view.length();

            if reflect_dot_view > 0.0 && lengths > 0.0 {
                intensity += strength
                    * (reflect_dot_view / lengths).powf(specular);
            }
        }
    }

    intensity
}

/* Tests */

#[cfg(test)]
fn lit_scene(lights: Vec<Light>) -> Scene {
    let mut scene = Scene::empty();
    scene.lights = lights;
    scene
}

#[test]
fn ambient_light_only() {
    let scene = lit_scene(vec![Light::ambient(0.2), Light::ambient(0.3)]);
    let n = Vector3::new(0.0, 0.0, -1.0);

    let i = compute_lighting(Vector3::zero(), n, n, 100.0, &scene, None, 0.001);
    assert!(crate::feq(i, 0.5));
}

#[test]
fn no_lights_is_dark() {
    let scene = Scene::empty();
    let n = Vector3::new(0.0, 0.0, -1.0);

    assert_eq!(compute_lighting(Vector3::zero(), n, n, 10.0, &scene, None, 0.001),
        0.0);
}

#[test]
fn light_straight_ahead() {
    let scene = lit_scene(vec![Light::Point {
        intensity: 0.6,
        position: Vector3::new(0.0, 0.0, -10.0),
        attenuation: Attenuation::none(),
    }]);
    let n = Vector3::new(0.0, 0.0, -1.0);

    // Diffuse 0.6 and a perfect highlight of 0.6.
    let i = compute_lighting(Vector3::zero(), n, n, 50.0, &scene, None, 0.001);
    assert!(crate::feq(i, 1.2));
}

#[test]
fn diffuse_follows_cosine() {
    let scene = lit_scene(vec![Light::directional(1.0,
        Vector3::new(0.0, -1.0, -1.0))]);
    let n = Vector3::new(0.0, 1.0, 0.0);
    let v = Vector3::new(1.0, 0.0, 0.0);

    let i = compute_lighting(Vector3::zero(), n, v, 0.0, &scene, None, 0.001);
    assert!(crate::feq(i, 2.0f64.sqrt() / 2.0));
}

#[test]
fn unnormalized_normal_is_compensated() {
    let scene = lit_scene(vec![Light::directional(1.0,
        Vector3::new(0.0, -1.0, 0.0))]);
    let n = Vector3::new(0.0, 4.0, 0.0);

    let i = compute_lighting(Vector3::zero(), n, n, 0.0, &scene, None, 0.001);
    assert!(crate::feq(i, 1.0));
}

#[test]
fn light_behind_surface_contributes_nothing() {
    let scene = lit_scene(vec![
        Light::ambient(0.1),
        Light::point(0.9, Vector3::new(0.0, 0.0, 10.0)),
    ]);
    let n = Vector3::new(0.0, 0.0, -1.0);

    let i = compute_lighting(Vector3::zero(), n, n, 100.0, &scene, None, 0.001);
    assert!(crate::feq(i, 0.1));
}

#[test]
fn specular_needs_positive_exponent() {
    let light = Light::directional(0.5, Vector3::new(0.0, 0.0, 1.0));
    let scene = lit_scene(vec![light]);
    let n = Vector3::new(0.0, 0.0, -1.0);

    let flat = compute_lighting(Vector3::zero(), n, n, 0.0, &scene, None, 0.001);
    let negative = compute_lighting(Vector3::zero(), n, n, -1.0, &scene, None,
        0.001);
    let shiny = compute_lighting(Vector3::zero(), n, n, 10.0, &scene, None,
        0.001);

    assert!(crate::feq(flat, 0.5));
    assert!(crate::feq(negative, 0.5));
    assert!(crate::feq(shiny, 1.0));
}

#[test]
fn highlight_fades_off_the_mirror_direction() {
    let scene = lit_scene(vec![Light::Point {
        intensity: 1.0,
        position: Vector3::new(0.0, 10.0, -10.0),
        attenuation: Attenuation::none(),
    }]);
    let n = Vector3::new(0.0, 0.0, -1.0);
    let v = Vector3::new(0.0, 0.0, -1.0);

    // The mirror direction is 45 degrees from the eye: cos^s shrinks.
    let i = compute_lighting(Vector3::zero(), n, v, 4.0, &scene, None, 0.001);
    let diffuse = 2.0f64.sqrt() / 2.0;
    let highlight = (2.0f64.sqrt() / 2.0).powf(4.0);
    assert!(crate::feq(i, diffuse + highlight));
}

#[test]
fn point_light_attenuates_with_distance() {
    let near = lit_scene(vec![Light::point(1.0, Vector3::new(0.0, 0.0, -1.0))]);
    let far = lit_scene(vec![Light::point(1.0, Vector3::new(0.0, 0.0, -10.0))]);
    let n = Vector3::new(0.0, 0.0, -1.0);

    let i_near = compute_lighting(Vector3::zero(), n, n, 0.0, &near, None, 0.001);
    let i_far = compute_lighting(Vector3::zero(), n, n, 0.0, &far, None, 0.001);

    assert!(crate::feq(i_near, 1.0 / 1.11));
    assert!(crate::feq(i_far, 1.0 / 3.0));
}

#[test]
fn highlight_of_distant_point_light_is_not_attenuated() {
    let scene = lit_scene(vec![Light::point(0.6, Vector3::new(0.0, 0.0, -10.0))]);
    let n = Vector3::new(0.0, 0.0, -1.0);

    let matte = compute_lighting(Vector3::zero(), n, n, 0.0, &scene, None, 0.001);
    let shiny = compute_lighting(Vector3::zero(), n, n, 50.0, &scene, None, 0.001);

    // Diffuse fades to a third at distance 10, the highlight stays at 0.6.
    assert!(crate::feq(matte, 0.2));
    assert!(crate::feq(shiny - matte, 0.6));
}

#[test]
fn occluded_point_light_is_skipped() {
    let mut scene = lit_scene(vec![
        Light::ambient(0.2),
        Light::point(0.8, Vector3::new(0.0, 10.0, 0.0)),
    ]);
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 5.0, 0.0), 1.0));

    let n = Vector3::new(0.0, 1.0, 0.0);
    let i = compute_lighting(Vector3::zero(), n, n, 10.0, &scene, None, 0.001);
    assert!(crate::feq(i, 0.2));
}

#[test]
fn blocker_beyond_point_light_casts_no_shadow() {
    let mut scene = lit_scene(vec![Light::Point {
        intensity: 0.8,
        position: Vector3::new(0.0, 3.0, 0.0),
        attenuation: Attenuation::none(),
    }]);
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 5.0, 0.0), 1.0));

    let n = Vector3::new(0.0, 1.0, 0.0);
    let i = compute_lighting(Vector3::zero(), n, n, 0.0, &scene, None, 0.001);
    assert!(crate::feq(i, 0.8));
}

#[test]
fn directional_light_is_shadowed_at_any_distance() {
    let mut scene = lit_scene(vec![Light::directional(1.0,
        Vector3::new(0.0, -1.0, 0.0))]);
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 1000.0, 0.0), 1.0));

    let n = Vector3::new(0.0, 1.0, 0.0);
    let i = compute_lighting(Vector3::zero(), n, n, 0.0, &scene, None, 0.001);
    assert_eq!(i, 0.0);
}

#[test]
fn shape_does_not_shadow_itself() {
    let sphere = Shape::sphere(Vector3::zero(), 1.0);
    let mut scene = lit_scene(vec![Light::directional(1.0,
        Vector3::new(0.0, -1.0, 0.0))]);
    scene.shapes.push(sphere);

    let top = Vector3::new(0.0, 1.0, 0.0);
    let i = compute_lighting(top, top, top, 0.0, &scene, scene.shapes.first(),
        0.001);
    assert!(crate::feq(i, 1.0));
}

#[test]
fn shadowless_shapes_let_light_through() {
    let mut blocker = Shape::plane(Vector3::new(0.0, 5.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0));
    blocker.material.casts_shadow = false;

    let mut scene = lit_scene(vec![Light::directional(1.0,
        Vector3::new(0.0, -1.0, 0.0))]);
    scene.shapes.push(blocker);

    let n = Vector3::new(0.0, 1.0, 0.0);
    let i = compute_lighting(Vector3::zero(), n, n, 0.0, &scene, None, 0.001);
    assert!(crate::feq(i, 1.0));
}
