pub mod consts;
pub mod error;
pub mod config;

pub mod vector;
pub mod ray;
pub mod color;
pub mod pattern;

pub mod shape;
pub mod intersect;
pub mod light;
pub mod scene;

pub mod tracer;
pub mod camera;
pub mod parallel;
pub mod canvas;

pub mod description;
pub mod parser;
pub mod animation;

use consts::FEQ_EPSILON;

/// Compares two floats, allowing for rounding error.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
