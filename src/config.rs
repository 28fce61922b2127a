use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::consts::{ CANVAS_WIDTH, CANVAS_HEIGHT, REFLECTION_RECURSION_DEPTH,
    SURFACE_EPSILON, NEAR_PLANE };
use crate::error::Error;

/// Parameters of a render that are not part of the scene.
///
/// Every render entry point takes one of these explicitly. Any subset of the
/// fields may be given in a JSON file; the rest keep their defaults.
///
/// ```
/// # use phong_tracer::config::RenderConfig;
/// let config = RenderConfig::from_json(r#"{ "width": 64, "max_depth": 1 }"#).unwrap();
/// assert_eq!(config.width, 64);
/// assert_eq!(config.height, 500);
/// assert_eq!(config.max_depth, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Width of the raster, in pixels.
    pub width: usize,

    /// Height of the raster, in pixels.
    pub height: usize,

    /// Maximum number of reflection bounces per primary ray.
    pub max_depth: usize,

    /// Minimum `t` of shadow and reflection rays, so a surface does not
    /// intersect itself.
    pub epsilon: f64,

    /// Minimum `t` of primary rays.
    pub near: f64,

    /// Worker threads for parallel rendering. 0 lets rayon decide.
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            max_depth: REFLECTION_RECURSION_DEPTH,
            epsilon: SURFACE_EPSILON,
            near: NEAR_PLANE,
            threads: 0,
        }
    }
}

impl RenderConfig {
    /// Creates the default configuration with a different canvas size.
    pub fn with_size(width: usize, height: usize) -> RenderConfig {
        RenderConfig { width, height, ..Default::default() }
    }

    pub fn from_json(json: &str) -> Result<RenderConfig, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RenderConfig, Error> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[test]
fn default_config_matches_classic_render() {
    let c = RenderConfig::default();

    assert_eq!((c.width, c.height), (500, 500));
    assert_eq!(c.max_depth, 3);
    assert_eq!(c.epsilon, 0.001);
    assert_eq!(c.near, 1.0);
}

#[test]
fn empty_json_is_default() {
    assert_eq!(RenderConfig::from_json("{}").unwrap(), RenderConfig::default());
}

#[test]
fn unknown_config_keys_are_rejected() {
    assert!(RenderConfig::from_json(r#"{ "widht": 3 }"#).is_err());
}
