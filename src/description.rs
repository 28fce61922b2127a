use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::vector::Vector3;
use crate::camera::Camera;
use crate::scene::Scene;
use crate::shape::Shape;
use crate::pattern::Texture;
use crate::light::{ Attenuation, Light, Material };
use crate::consts::{ DEFAULT_SPECULAR, DEFAULT_CHECKER_DIVISIONS,
    VIEWPORT_WIDTH, VIEWPORT_HEIGHT, PROJECTION_DISTANCE };
use crate::error::{ Error, SceneError };
use crate::parser;

/// A scene as written down by a user, before validation.
///
/// Both scene front ends produce this: JSON through serde, and the block
/// text format through `parser::parse`. Converting it into a `Scene` with
/// `Scene::try_from` checks every value.
///
/// ```
/// # use std::convert::TryFrom;
/// # use phong_tracer::description::SceneDescription;
/// # use phong_tracer::scene::Scene;
/// let json = r#"{
///     "shapes": [
///         { "type": "sphere", "center": [0, 0, 3], "radius": 1, "color": [255, 0, 0] }
///     ],
///     "lights": [ { "type": "ambient", "intensity": 0.2 } ]
/// }"#;
///
/// let scene = Scene::try_from(SceneDescription::from_json(json).unwrap()).unwrap();
/// assert_eq!(scene.shape_counts(), (1, 0, 0));
/// assert_eq!(scene.shapes[0].material.specular, 100.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneDescription {
    pub shapes: Vec<ShapeDescription>,
    pub lights: Vec<LightDescription>,
    pub background: [f64; 3],
    pub camera: CameraDescription,
}

/// A shape: its geometry and the optional material keys next to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescription {
    #[serde(flatten)]
    pub geometry: GeometryDescription,

    pub color: Option<[f64; 3]>,
    pub specular: Option<f64>,
    pub reflective: Option<f64>,
    pub texture: Option<TextureDescription>,
    pub shadow: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeometryDescription {
    Sphere { center: [f64; 3], radius: f64 },
    Plane { point: [f64; 3], normal: [f64; 3] },
    Triangle { v0: [f64; 3], v1: [f64; 3], v2: [f64; 3] },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TextureDescription {
    Checker {
        #[serde(default = "white")]
        primary: [f64; 3],
        #[serde(default)]
        secondary: [f64; 3],
        #[serde(default = "default_divisions")]
        divisions: u32,
    },
}

impl Default for TextureDescription {
    fn default() -> TextureDescription {
        TextureDescription::Checker {
            primary: white(),
            secondary: [0.0; 3],
            divisions: DEFAULT_CHECKER_DIVISIONS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum LightDescription {
    Ambient {
        intensity: f64,
    },
    Point {
        intensity: f64,
        position: [f64; 3],
        #[serde(default)]
        attenuation: Option<[f64; 3]>,
    },
    Directional {
        intensity: f64,
        direction: [f64; 3],
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraDescription {
    pub position: [f64; 3],
    pub viewport: [f64; 2],
    pub distance: f64,
}

impl Default for CameraDescription {
    fn default() -> CameraDescription {
        CameraDescription {
            position: [0.0; 3],
            viewport: [VIEWPORT_WIDTH, VIEWPORT_HEIGHT],
            distance: PROJECTION_DISTANCE,
        }
    }
}

fn white() -> [f64; 3] {
    [255.0; 3]
}

fn default_divisions() -> u32 {
    DEFAULT_CHECKER_DIVISIONS
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<SceneDescription, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reads and validates a scene file.
///
/// Files ending in `.json` are read as JSON; anything else is read in the
/// block text format.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;

    let is_json = path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"));

    let description = if is_json {
        SceneDescription::from_json(&text)?
    } else {
        parser::parse(&text)?
    };

    Ok(Scene::try_from(description)?)
}

impl TryFrom<SceneDescription> for Scene {
    type Error = SceneError;

    fn try_from(d: SceneDescription) -> Result<Scene, SceneError> {
        let mut shapes = Vec::with_capacity(d.shapes.len());
        for (i, s) in d.shapes.iter().enumerate() {
            shapes.push(build_shape(s, i + 1)?);
        }

        let mut lights = Vec::with_capacity(d.lights.len());
        for (i, l) in d.lights.iter().enumerate() {
            lights.push(build_light(l, i + 1)?);
        }

        Ok(Scene {
            shapes,
            lights,
            background: color("scene", "background", d.background)?,
            camera: build_camera(&d.camera)?,
        })
    }
}

fn invalid(block: &str, field: &str, message: &str) -> SceneError {
    SceneError::InvalidValue {
        block: block.into(),
        field: field.into(),
        message: message.into(),
    }
}

fn finite(block: &str, field: &str, x: f64) -> Result<f64, SceneError> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(invalid(block, field, "must be a finite number"))
    }
}

fn vector(block: &str, field: &str, v: [f64; 3]) -> Result<Vector3, SceneError> {
    let v = Vector3::from(v);
    if v.is_finite() {
        Ok(v)
    } else {
        Err(invalid(block, field, "must have finite components"))
    }
}

fn nonzero(block: &str, field: &str, v: [f64; 3]) -> Result<Vector3, SceneError> {
    let v = vector(block, field, v)?;
    match v.try_normalize() {
        Some(_) => Ok(v),
        None => Err(invalid(block, field, "must not be the zero vector")),
    }
}

fn color(block: &str, field: &str, c: [f64; 3]) -> Result<Color, SceneError> {
    if c.iter().all(|x| (0.0..=255.0).contains(x)) {
        Ok(c.into())
    } else {
        Err(invalid(block, field, "channels must lie in 0..=255"))
    }
}

fn build_texture(block: &str, t: &TextureDescription)
    -> Result<Texture, SceneError> {
    match *t {
        TextureDescription::Checker { primary, secondary, divisions } => {
            if divisions == 0 {
                return Err(invalid(block, "texture", "divisions must be positive"));
            }

            if divisions % 2 == 1 {
                warn!("{}: checker with {} divisions leaves a seam around the sphere.",
                    block, divisions);
            }

            Ok(Texture::Checker {
                primary: color(block, "texture", primary)?,
                secondary: color(block, "texture", secondary)?,
                divisions,
            })
        }
    }
}

fn build_shape(s: &ShapeDescription, n: usize) -> Result<Shape, SceneError> {
    let (kind, shape) = match s.geometry {
        GeometryDescription::Sphere { center, radius } => {
            let block = format!("sphere #{}", n);
            if !(radius > 0.0 && radius.is_finite()) {
                return Err(invalid(&block, "radius", "must be positive"));
            }

            ("sphere", Shape::sphere(vector(&block, "center", center)?, radius))
        },

        GeometryDescription::Plane { point, normal } => {
            let block = format!("plane #{}", n);
            ("plane", Shape::plane(vector(&block, "point", point)?,
                nonzero(&block, "normal", normal)?))
        },

        GeometryDescription::Triangle { v0, v1, v2 } => {
            let block = format!("triangle #{}", n);
            let shape = Shape::triangle(vector(&block, "v0", v0)?,
                vector(&block, "v1", v1)?, vector(&block, "v2", v2)?);

            if (Vector3::from(v1) - Vector3::from(v0))
                .cross(&(Vector3::from(v2) - Vector3::from(v0)))
                .try_normalize().is_none() {
                warn!("{}: vertices are collinear, it will never be hit.", block);
            }

            ("triangle", shape)
        },
    };

    let block = format!("{} #{}", kind, n);
    let base = s.color.ok_or_else(|| SceneError::MissingField {
        block: block.clone(),
        field: "color".into(),
    })?;

    let reflective = finite(&block, "reflective", s.reflective.unwrap_or(0.0))?;
    if !(0.0..=1.0).contains(&reflective) {
        return Err(invalid(&block, "reflective", "must lie in 0..=1"));
    }

    let texture = match s.texture {
        Some(ref t) => Some(build_texture(&block, t)?),
        None => None,
    };

    let shape = shape.with_material(Material {
        color: color(&block, "color", base)?,
        specular: finite(&block, "specular", s.specular.unwrap_or(DEFAULT_SPECULAR))?,
        reflective,
        texture,
        casts_shadow: s.shadow.unwrap_or(true),
    });

    if shape.has_unmapped_texture() {
        warn!("{}: only spheres are textured, the texture is ignored.", block);
    }

    Ok(shape)
}

fn build_light(l: &LightDescription, n: usize) -> Result<Light, SceneError> {
    let block = format!("light #{}", n);

    let intensity = match *l {
        LightDescription::Ambient { intensity }
        | LightDescription::Point { intensity, .. }
        | LightDescription::Directional { intensity, .. } => intensity,
    };
    if !(intensity >= 0.0 && intensity.is_finite()) {
        return Err(invalid(&block, "intensity", "must be a non-negative number"));
    }

    Ok(match *l {
        LightDescription::Ambient { .. } => Light::ambient(intensity),

        LightDescription::Point { position, attenuation, .. } => {
            let attenuation = match attenuation {
                Some([constant, linear, quadratic]) => {
                    let valid = [constant, linear, quadratic].iter()
                        .all(|c| *c >= 0.0 && c.is_finite());
                    if !valid || constant + linear + quadratic <= 0.0 {
                        return Err(invalid(&block, "attenuation",
                            "coefficients must be non-negative and not all zero"));
                    }

                    Attenuation { constant, linear, quadratic }
                },
                None => Default::default(),
            };

            Light::Point {
                intensity,
                position: vector(&block, "position", position)?,
                attenuation,
            }
        },

        LightDescription::Directional { direction, .. } =>
            Light::directional(intensity, nonzero(&block, "direction", direction)?),
    })
}

fn build_camera(c: &CameraDescription) -> Result<Camera, SceneError> {
    let [width, height] = c.viewport;
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(invalid("camera", "viewport", "dimensions must be positive"));
    }

    if !(c.distance > 0.0 && c.distance.is_finite()) {
        return Err(invalid("camera", "distance", "must be positive"));
    }

    Ok(Camera::new(vector("camera", "position", c.position)?, width, height,
        c.distance))
}

#[cfg(test)]
fn sphere_description(radius: f64) -> ShapeDescription {
    ShapeDescription {
        geometry: GeometryDescription::Sphere { center: [0.0, 0.0, 3.0], radius },
        color: Some([255.0, 0.0, 0.0]),
        specular: None,
        reflective: None,
        texture: None,
        shadow: None,
    }
}

#[test]
fn json_scene_with_every_kind() {
    let json = r#"{
        "shapes": [
            { "type": "sphere", "center": [0, -1, 3], "radius": 1,
              "color": [255, 0, 0], "specular": 500, "reflective": 0.2,
              "texture": { "type": "checker" } },
            { "type": "plane", "point": [0, -2, 0], "normal": [0, 2, 0],
              "color": [200, 200, 200], "shadow": false },
            { "type": "triangle", "v0": [0, 0, 5], "v1": [1, 0, 5], "v2": [0, 1, 5],
              "color": [0, 255, 0] }
        ],
        "lights": [
            { "type": "ambient", "intensity": 0.2 },
            { "type": "point", "intensity": 0.6, "position": [2, 1, 0],
              "attenuation": [1, 0, 0] },
            { "type": "directional", "intensity": 0.2, "direction": [1, 4, 4] }
        ],
        "background": [10, 20, 30],
        "camera": { "position": [0, 0, -1] }
    }"#;

    let d = SceneDescription::from_json(json).expect("JSON should parse.");
    let scene = Scene::try_from(d).expect("Scene should be valid.");

    assert_eq!(scene.shape_counts(), (1, 1, 1));
    assert_eq!(scene.lights.len(), 3);
    assert_eq!(scene.background, Color::rgb(10.0, 20.0, 30.0));
    assert_eq!(scene.camera.position, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(scene.camera.viewport_width, 2.0);

    let sphere = &scene.shapes[0].material;
    assert_eq!(sphere.specular, 500.0);
    assert_eq!(sphere.reflective, 0.2);
    assert_eq!(sphere.texture, Some(Texture::default()));

    assert!(!scene.shapes[1].material.casts_shadow);
    assert_eq!(scene.shapes[2].material.specular, 100.0);

    assert_eq!(scene.lights[1], Light::Point {
        intensity: 0.6,
        position: Vector3::new(2.0, 1.0, 0.0),
        attenuation: Attenuation::none(),
    });
}

#[test]
fn shapes_need_a_color() {
    let mut d = SceneDescription::default();
    let mut s = sphere_description(1.0);
    s.color = None;
    d.shapes.push(s);

    assert_eq!(Scene::try_from(d), Err(SceneError::MissingField {
        block: "sphere #1".into(),
        field: "color".into(),
    }));
}

#[test]
fn invalid_values_are_rejected() {
    let with_shape = |s: ShapeDescription| {
        let mut d = SceneDescription::default();
        d.shapes.push(s);
        Scene::try_from(d)
    };

    assert!(with_shape(sphere_description(0.0)).is_err());
    assert!(with_shape(sphere_description(-1.0)).is_err());

    let mut s = sphere_description(1.0);
    s.reflective = Some(1.5);
    assert!(with_shape(s).is_err());

    let mut s = sphere_description(1.0);
    s.color = Some([256.0, 0.0, 0.0]);
    assert!(with_shape(s).is_err());

    let mut s = sphere_description(1.0);
    s.texture = Some(TextureDescription::Checker {
        primary: [255.0; 3],
        secondary: [0.0; 3],
        divisions: 0,
    });
    assert!(with_shape(s).is_err());

    let mut s = sphere_description(1.0);
    s.geometry = GeometryDescription::Plane { point: [0.0; 3], normal: [0.0; 3] };
    assert!(with_shape(s).is_err());
}

#[test]
fn directional_light_needs_a_direction() {
    let mut d = SceneDescription::default();
    d.lights.push(LightDescription::Directional {
        intensity: 0.5,
        direction: [0.0; 3],
    });

    assert!(matches!(Scene::try_from(d),
        Err(SceneError::InvalidValue { ref field, .. }) if field == "direction"));
}

#[test]
fn unknown_json_light_is_an_error() {
    let json = r#"{ "lights": [ { "type": "spot", "intensity": 1 } ] }"#;
    assert!(SceneDescription::from_json(json).is_err());
}

#[test]
fn load_scene_missing_file() {
    let result = load_scene("this/scene/does/not/exist.json");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn bundled_scenes_load() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenes");

    let text = load_scene(dir.join("spheres.txt")).expect("Text scene should load.");
    let json = load_scene(dir.join("spheres.json")).expect("JSON scene should load.");
    let triangle = load_scene(dir.join("triangle.txt")).expect("Scene should load.");
    let moving = load_scene(dir.join("move.txt")).expect("Scene should load.");

    assert_eq!(text.shape_counts(), (4, 0, 0));
    assert_eq!(json.shape_counts(), (3, 1, 0));
    assert_eq!(triangle.shape_counts(), (0, 0, 1));
    assert_eq!(moving.camera.position, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(text.lights.len(), json.lights.len());
}
