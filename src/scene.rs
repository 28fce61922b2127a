use crate::ray::Ray;
use crate::color::Color;
use crate::vector::Vector3;
use crate::camera::Camera;
use crate::light::{ Light, Material };
use crate::shape::{ Shape, ShapeType };
use crate::intersect::Intersection;

/// A scene with shapes, lights and a camera.
///
/// Scenes are read-only while they are rendered. Shapes keep their declaration
/// order; it decides which shape wins when two are hit at exactly the same
/// distance (the first one declared).
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub shapes: Vec<Shape>,
    pub lights: Vec<Light>,

    /// The color of rays which hit nothing.
    pub background: Color,

    pub camera: Camera,
}

impl Default for Scene {
    /// A lone white sphere in front of the camera, lit the way the classic
    /// sphere scenes are: some ambient light, a point light and a directional
    /// light.
    fn default() -> Scene {
        let sphere = Shape::sphere(Vector3::new(0.0, 0.0, 4.0), 1.0)
            .with_material(Material { specular: 100.0, ..Default::default() });

        Scene {
            shapes: vec![sphere],
            lights: vec![
                Light::ambient(0.2),
                Light::point(0.6, Vector3::new(2.0, 1.0, 0.0)),
                Light::directional(0.2, Vector3::new(-1.0, -4.0, -4.0)),
            ],
            background: Color::black(),
            camera: Default::default(),
        }
    }
}

impl Scene {
    /// Creates the default scene. See `Default`.
    pub fn new() -> Scene {
        Default::default()
    }

    /// Creates a scene with no shapes, no lights, a black background and the
    /// default camera.
    pub fn empty() -> Scene {
        Scene {
            shapes: Vec::new(),
            lights: Vec::new(),
            background: Color::black(),
            camera: Default::default(),
        }
    }

    /// Finds the nearest shape hit by `r` with `t` in `[t_min, t_max]`.
    ///
    /// Shapes are tested in declaration order, and a later shape only replaces
    /// the current hit if it is strictly closer.
    pub fn intersect(&self, r: &Ray, t_min: f64, t_max: f64)
        -> Option<Intersection<'_>> {
        let mut closest: Option<(f64, &Shape)> = None;

        for shape in self.shapes.iter() {
            let limit = match closest {
                Some((t, _)) => t,
                None => t_max,
            };

            if let Some(t) = shape.intersect(r, t_min, limit) {
                let closer = match closest {
                    Some((best, _)) => t < best,
                    None => true,
                };

                if closer {
                    closest = Some((t, shape));
                }
            }
        }

        closest.map(|(t, shape)| Intersection::new(r, t, shape))
    }

    /// Determines whether anything blocks `r` within `[t_min, t_max]`.
    ///
    /// `exclude` (the shape being shaded) and shapes which do not cast
    /// shadows are ignored. Any hit counts; the nearest is not searched for.
    pub fn is_shadowed(&self, r: &Ray, t_min: f64, t_max: f64,
        exclude: Option<&Shape>) -> bool {
        self.shapes.iter()
            .filter(|s| s.material.casts_shadow)
            .filter(|s| match exclude {
                Some(e) => !std::ptr::eq(*s, e),
                None => true,
            })
            .any(|s| s.intersect(r, t_min, t_max).is_some())
    }

    /// Appends an enclosing room of five planes: a floor, a back wall, left
    /// and right walls and a ceiling.
    ///
    /// The walls do not cast shadows, so lights outside of the room still
    /// reach the shapes inside.
    pub fn add_room(&mut self) {
        self.shapes.extend(room_planes());
    }

    /// Counts spheres, planes and triangles, in that order.
    pub fn shape_counts(&self) -> (usize, usize, usize) {
        self.shapes.iter().fold((0, 0, 0), |(s, p, t), shape| {
            match shape.ty {
                ShapeType::Sphere { .. } => (s + 1, p, t),
                ShapeType::Plane { .. } => (s, p + 1, t),
                ShapeType::Triangle(_) => (s, p, t + 1),
            }
        })
    }
}

/// The five planes of the default room.
pub fn room_planes() -> Vec<Shape> {
    let walls = [
        // floor
        ([0.0, -2.0, 0.0], [0.0, 1.0, 0.0], [200.0, 200.0, 200.0]),
        // back wall
        ([0.0, 0.0, 10.0], [0.0, 0.0, -1.0], [180.0, 190.0, 200.0]),
        // left wall
        ([-5.0, 0.0, 0.0], [1.0, 0.0, 0.0], [100.0, 50.0, 200.0]),
        // right wall
        ([5.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [200.0, 0.0, 0.0]),
        // ceiling
        ([0.0, 5.0, 0.0], [0.0, -1.0, 0.0], [200.0, 200.0, 200.0]),
    ];

    walls.iter().map(|&(point, normal, color)| {
        Shape::plane(point.into(), normal.into()).with_material(Material {
            color: color.into(),
            specular: crate::consts::DEFAULT_SPECULAR,
            casts_shadow: false,
            ..Default::default()
        })
    }).collect()
}

#[test]
fn intersect_finds_nearest_shape() {
    let mut scene = Scene::empty();
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 0.0, 10.0), 1.0));
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 0.0, 5.0), 1.0));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let hit = scene.intersect(&r, 0.0, std::f64::INFINITY)
        .expect("Ray should hit a sphere.");

    assert_eq!(hit.t, 4.0);
    assert!(std::ptr::eq(hit.what, &scene.shapes[1]));
}

#[test]
fn intersect_respects_window() {
    let mut scene = Scene::empty();
    scene.shapes.push(Shape::sphere(Vector3::new(0.0, 0.0, 5.0), 1.0));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert!(scene.intersect(&r, 0.0, 3.0).is_none());
    assert!(scene.intersect(&r, 7.0, 100.0).is_none());
    assert_eq!(scene.intersect(&r, 5.0, 100.0).map(|i| i.t), Some(6.0));
}

#[test]
fn first_declared_shape_wins_ties() {
    let mut scene = Scene::empty();
    let mut first = Shape::plane(Vector3::new(0.0, 0.0, 3.0),
        Vector3::new(0.0, 0.0, -1.0));
    first.material.color = Color::rgb(1.0, 0.0, 0.0);
    let mut second = first;
    second.material.color = Color::rgb(0.0, 1.0, 0.0);
    scene.shapes.push(first);
    scene.shapes.push(second);

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let hit = scene.intersect(&r, 0.0, 100.0).expect("Plane should be hit.");

    assert!(std::ptr::eq(hit.what, &scene.shapes[0]));
}

#[test]
fn empty_scene_hits_nothing() {
    let scene = Scene::empty();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert!(scene.intersect(&r, 0.0, std::f64::INFINITY).is_none());
    assert!(!scene.is_shadowed(&r, 0.0, std::f64::INFINITY, None));
}

#[test]
fn shadow_object_behind_point() {
    let mut scene = Scene::empty();
    scene.shapes.push(Shape::sphere(Vector3::zero(), 1.0));

    // The sphere lies behind the shadow ray's origin.
    let r = Ray::new(Vector3::new(0.0, 0.0, -2.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(!scene.is_shadowed(&r, 0.001, 10.0, None));

    let toward = Ray::new(Vector3::new(0.0, 0.0, -2.0), Vector3::new(0.0, 0.0, 1.0));
    assert!(scene.is_shadowed(&toward, 0.001, 10.0, None));
    assert!(!scene.is_shadowed(&toward, 0.001, 10.0, scene.shapes.first()));
}

#[test]
fn room_has_five_shadowless_planes() {
    let mut scene = Scene::empty();
    scene.add_room();

    assert_eq!(scene.shape_counts(), (0, 5, 0));
    assert!(scene.shapes.iter().all(|s| !s.material.casts_shadow));
}
