use std::f64::consts::PI;

use crate::color::Color;
use crate::consts::DEFAULT_CHECKER_DIVISIONS;
use crate::vector::Vector3;

/// A procedural texture.
///
/// Textures are sampled in UV space. Only spheres carry a UV mapping; other
/// shapes ignore their texture and keep their base color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Texture {
    /// Alternating cells of `primary` and `secondary`, `divisions` cells per
    /// unit of U and of V.
    Checker {
        primary: Color,
        secondary: Color,
        divisions: u32,
    },
}

impl Default for Texture {
    fn default() -> Texture {
        Texture::checker(Color::white(), Color::black())
    }
}

impl Texture {
    /// A checker with the default number of divisions.
    pub fn checker(primary: Color, secondary: Color) -> Texture {
        Texture::Checker {
            primary,
            secondary,
            divisions: DEFAULT_CHECKER_DIVISIONS,
        }
    }

    /// Samples the texture at UV coordinates.
    pub fn color_at(&self, u: f64, v: f64) -> Color {
        match *self {
            Texture::Checker { primary, secondary, divisions } => {
                if checker_color(u, v, divisions) {
                    secondary
                } else {
                    primary
                }
            }
        }
    }

    /// Samples the texture at a point on a sphere's surface.
    pub fn color_at_sphere(&self, point: Vector3, center: Vector3,
        radius: f64) -> Color {
        let (u, v) = sphere_uv(point, center, radius);
        self.color_at(u, v)
    }
}

/// Decides which checker cell a UV coordinate falls in.
///
/// Returns `true` for the alternate cell, i.e. when
/// `floor(u * divisions) + floor(v * divisions)` is odd.
///
/// ```
/// # use phong_tracer::pattern::checker_color;
/// assert!(!checker_color(0.05, 0.05, 10));
/// assert!(checker_color(0.15, 0.05, 10));
/// assert!(!checker_color(0.25, 0.05, 10));
/// ```
pub fn checker_color(u: f64, v: f64, divisions: u32) -> bool {
    let n = divisions as f64;
    let cells = (u * n).floor() + (v * n).floor();

    cells.rem_euclid(2.0) >= 1.0
}

/// Maps a point on a sphere to UV coordinates in `[0, 1) x [0, 1)`.
///
/// U is the longitude, taken from `atan2` around the Y axis; V is the
/// latitude, taken from `acos` of the normalized height, so the north pole
/// sits at `v = 0`.
pub fn sphere_uv(point: Vector3, center: Vector3, radius: f64) -> (f64, f64) {
    if radius <= 0.0 {
        return (0.0, 0.0);
    }

    let p = (point - center) * (1.0 / radius);
    let u = (0.5 + p.z.atan2(p.x) / (2.0 * PI)).rem_euclid(1.0);
    let v = p.y.clamp(-1.0, 1.0).acos() / PI;

    // Keep the south pole inside the last row of cells.
    (u, v.min(1.0 - f64::EPSILON))
}

#[test]
fn checker_alternates_along_u() {
    let step = 1.0 / 10.0;
    let u = 0.35;
    let v = 0.62;

    assert_ne!(checker_color(u, v, 10), checker_color(u + step, v, 10));
    assert_eq!(checker_color(u, v, 10), checker_color(u + 2.0 * step, v, 10));
}

#[test]
fn checker_alternates_along_v() {
    let step = 1.0 / 8.0;
    let u = 0.1;
    let v = 0.3;

    assert_ne!(checker_color(u, v, 8), checker_color(u, v + step, 8));
    assert_eq!(checker_color(u, v, 8), checker_color(u, v + 2.0 * step, 8));
}

#[test]
fn checker_diagonal_cells_match() {
    assert_eq!(checker_color(0.05, 0.05, 10), checker_color(0.15, 0.15, 10));
}

#[test]
fn texture_picks_primary_and_secondary() {
    let t = Texture::checker(Color::white(), Color::black());

    assert_eq!(t.color_at(0.05, 0.05), Color::white());
    assert_eq!(t.color_at(0.15, 0.05), Color::black());
}

#[test]
fn sphere_uv_poles_and_equator() {
    let c = Vector3::zero();

    let (_, v_north) = sphere_uv(Vector3::new(0.0, 1.0, 0.0), c, 1.0);
    let (_, v_south) = sphere_uv(Vector3::new(0.0, -1.0, 0.0), c, 1.0);
    let (u_east, v_east) = sphere_uv(Vector3::new(1.0, 0.0, 0.0), c, 1.0);

    assert!(crate::feq(v_north, 0.0));
    assert!(v_south < 1.0 && crate::feq(v_south, 1.0));
    assert!(crate::feq(u_east, 0.5));
    assert!(crate::feq(v_east, 0.5));
}

#[test]
fn sphere_uv_stays_in_unit_square() {
    let c = Vector3::new(1.0, 2.0, 3.0);
    let points = [
        Vector3::new(-1.0, 2.0, 3.0),
        Vector3::new(1.0, 2.0, 1.0),
        Vector3::new(1.0, 0.0, 3.0),
        Vector3::new(2.0, 3.0, 3.0 + 2.0f64.sqrt()),
    ];

    for p in points.iter() {
        let (u, v) = sphere_uv(*p, c, 2.0);
        assert!((0.0..1.0).contains(&u), "u = {}", u);
        assert!((0.0..1.0).contains(&v), "v = {}", v);
    }
}

#[test]
fn sphere_uv_scales_with_radius() {
    let small = sphere_uv(Vector3::new(0.0, 0.0, 1.0), Vector3::zero(), 1.0);
    let large = sphere_uv(Vector3::new(0.0, 0.0, 3.0), Vector3::zero(), 3.0);

    assert!(crate::feq(small.0, large.0));
    assert!(crate::feq(small.1, large.1));
}
