use std::ops::{ Add, Sub, Neg, Mul };

use crate::feq;

/// A three component vector.
///
/// Used for points and directions alike; the tracer never needs to tell them
/// apart. All operations return new values.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Vector3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Vector3 {
        Vector3 { x: v[0], y: v[1], z: v[2] }
    }
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    pub fn zero() -> Vector3 {
        Default::default()
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scales a vector to unit length.
    ///
    /// A zero-length (or non-finite) vector has no direction; it normalizes
    /// to the zero vector rather than to a vector of NaNs.
    ///
    /// ```
    /// # use phong_tracer::vector::Vector3;
    /// assert_eq!(Vector3::new(4.0, 0.0, 0.0).normalize(), Vector3::new(1.0, 0.0, 0.0));
    /// assert_eq!(Vector3::zero().normalize(), Vector3::zero());
    /// ```
    pub fn normalize(&self) -> Vector3 {
        match self.try_normalize() {
            Some(v) => v,
            None => Vector3::zero(),
        }
    }

    /// Like `normalize`, but reports a degenerate vector as `None`.
    pub fn try_normalize(&self) -> Option<Vector3> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }

        Some(Vector3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        })
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Reflects a vector across a normal.
    ///
    /// `normal` is expected to be unit length.
    pub fn reflect(&self, normal: &Vector3) -> Vector3 {
        *self - (*normal * 2.0 * self.dot(normal))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

/// Scalar right-multiplication.
///
/// ```
/// # use phong_tracer::vector::Vector3;
/// let v = Vector3::new(1.0, 2.0, 3.0);
/// assert_eq!(v * 2.0, Vector3::new(2.0, 4.0, 6.0));
/// ```
impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Scalar left-multiplication.
impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        other * self
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a = Vector3::new(3.0, -2.0, 5.0);
    let b = Vector3::new(-2.0, 3.0, 1.0);

    assert_eq!(a + b, Vector3::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let a = Vector3::new(3.0, 2.0, 1.0);
    let b = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(a - b, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector3::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_fraction() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(a * 0.5, Vector3::new(0.5, -1.0, 1.5));
    assert_eq!(0.5 * a, Vector3::new(0.5, -1.0, 1.5));
}

#[test]
fn length_of_vector() {
    assert_eq!(Vector3::new(1.0, 2.0, 3.0).length(), f64::sqrt(14.0));
    assert_eq!(Vector3::new(-1.0, -2.0, -3.0).length(), f64::sqrt(14.0));
}

#[test]
fn normalize_dirty() {
    let v = Vector3::new(1.0, 2.0, 3.0);
    let e = Vector3::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(v.normalize(), e);
    assert!(crate::feq(v.normalize().length(), 1.0));
}

#[test]
fn normalize_zero_vector_is_guarded() {
    let v = Vector3::zero().normalize();

    assert!(v.is_finite());
    assert_eq!(v, Vector3::zero());
    assert!(Vector3::zero().try_normalize().is_none());
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector3::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector3::new(1.0, -2.0, 1.0));
}

#[test]
fn reflect_45() {
    let v = Vector3::new(1.0, -1.0, 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn reflect_off_slanted_surface() {
    let v = Vector3::new(0.0, -1.0, 0.0);
    let n = Vector3::new(2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3::new(1.0, 0.0, 0.0));
}
