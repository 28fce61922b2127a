// Default canvas size, in pixels
pub const CANVAS_WIDTH: usize = 500;
pub const CANVAS_HEIGHT: usize = 500;

// Default viewport, in world units
pub const VIEWPORT_WIDTH: f64 = 2.0;
pub const VIEWPORT_HEIGHT: f64 = 2.0;
pub const PROJECTION_DISTANCE: f64 = 1.0;

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset used to step secondary rays off a surface
pub const SURFACE_EPSILON: f64 = 0.001;

// Below this, a plane or triangle is considered parallel to the ray
pub const PARALLEL_EPSILON: f64 = 1e-6;

// Maximum recursion depth for reflections
pub const REFLECTION_RECURSION_DEPTH: usize = 3;

// Nearest distance a primary ray may hit anything
pub const NEAR_PLANE: f64 = 1.0;

// Defaults for the scene description
pub const DEFAULT_SPECULAR: f64 = 100.0;
pub const DEFAULT_CHECKER_DIVISIONS: u32 = 10;

pub const OUT_FILE: &str = "output.ppm";
pub const GIF_FILE: &str = "animation.gif";
