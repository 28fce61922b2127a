use std::ops::{ Add, Mul };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values on the 8-bit scale: each
/// channel of a valid color lies in `0.0..=255.0`. Intermediate results of
/// shading may leave that range; `clamp` brings them back.
///
/// # Examples
///
/// Blend two colors:
///
/// ```
/// # use phong_tracer::color::Color;
/// let red = Color::rgb(255.0, 0.0, 0.0);
/// let blue = Color::rgb(0.0, 0.0, 255.0);
/// assert_eq!(red.blend(&blue, 0.5), Color::rgb(127.5, 0.0, 127.5));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Colors are compared component-wise, accounting for possible floating point
/// error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(v: [f64; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl From<[u8; 3]> for Color {
    fn from(v: [u8; 3]) -> Color {
        Color { r: v[0] as f64, g: v[1] as f64, b: v[2] as f64 }
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    /// The color white.
    pub fn white() -> Color {
        Color { r: 255.0, g: 255.0, b: 255.0 }
    }

    /// Clamps each channel to `0.0..=255.0`.
    ///
    /// NaN channels become 0.
    pub fn clamp(&self) -> Color {
        fn channel(c: f64) -> f64 {
            if c.is_nan() { 0.0 } else { c.clamp(0.0, 255.0) }
        }

        Color {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }

    /// Linearly blends towards `other`.
    ///
    /// A `weight` of 0 yields `self`, a `weight` of 1 yields `other`. The
    /// tracer composites reflections this way, with the surface
    /// reflectivity as the weight.
    pub fn blend(&self, other: &Color, weight: f64) -> Color {
        *self * (1.0 - weight) + *other * weight
    }

    /// Quantizes a color to 8-bit channels, rounding to nearest.
    ///
    /// ```
    /// # use phong_tracer::color::Color;
    /// assert_eq!(Color::rgb(300.0, 127.6, -4.0).to_rgb8(), [255, 128, 0]);
    /// ```
    pub fn to_rgb8(&self) -> [u8; 3] {
        let c = self.clamp();
        [c.r.round() as u8, c.g.round() as u8, c.b.round() as u8]
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

/// Multiplies a color by a scalar, such as a lighting intensity.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(90.0, 60.0, 75.0);
    let c2 = Color::rgb(70.0, 10.0, 25.0);

    assert_eq!(c1 + c2, Color::rgb(160.0, 70.0, 100.0));
}

#[test]
fn scale_color() {
    let c = Color::rgb(20.0, 30.0, 40.0);

    assert_eq!(c * 2.0, Color::rgb(40.0, 60.0, 80.0));
    assert_eq!(0.5 * c, Color::rgb(10.0, 15.0, 20.0));
}

#[test]
fn clamp_out_of_range() {
    let c = Color::rgb(400.0, -10.0, f64::NAN);

    assert_eq!(c.clamp(), Color::rgb(255.0, 0.0, 0.0));
}

#[test]
fn blend_endpoints() {
    let a = Color::rgb(10.0, 20.0, 30.0);
    let b = Color::rgb(200.0, 100.0, 0.0);

    assert_eq!(a.blend(&b, 0.0), a);
    assert_eq!(a.blend(&b, 1.0), b);
}
