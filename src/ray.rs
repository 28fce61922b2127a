use crate::vector::Vector3;

/// A ray, parameterized as `origin + t * direction`.
///
/// The direction does not need to be unit length.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    pub fn position(&self, t: f64) -> Vector3 {
        self.origin + (t * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
        Vector3::new(2.0, 3.0, 4.0),
        Vector3::new(1.0, 0.0, 0.0)
    );

    assert_eq!(r.position(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_position_with_long_direction() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 2.0));

    assert_eq!(r.position(1.5), Vector3::new(0.0, 0.0, 3.0));
}
