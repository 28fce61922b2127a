use crate::ray::Ray;
use crate::shape::Shape;
use crate::vector::Vector3;

/// The nearest hit of a ray against a scene.
///
/// `t` is the ray parameter of the hit (the offset from the ray origin, in
/// units of the ray direction). `what` is the shape that was hit.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Shape,

    /// The point where the intersection occurs.
    pub point: Vector3,

    /// Unit vector pointing back along the ray, toward its origin.
    pub eyev: Vector3,

    /// The surface normal, flipped if needed so it faces the ray origin.
    pub normalv: Vector3,

    /// Whether the ray hit the back face of the surface.
    pub inside: bool,
}

/// Two intersections are equal if the offsets `t` are equivalent and if the
/// underlying *pointers* of the shapes are equal.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && std::ptr::eq(self.what, other.what)
    }
}

impl<'a> Intersection<'a> {
    /// Builds the hit record for shape `what` at offset `t` along `r`.
    pub fn new(r: &Ray, t: f64, what: &'a Shape) -> Intersection<'a> {
        let point = r.position(t);
        let eyev = (-r.direction).normalize();
        let mut normalv = what.normal_at(point);

        let inside = if normalv.dot(&r.direction) > 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        Intersection { t, what, point, eyev, normalv, inside }
    }

    /// The incoming ray direction mirrored about the surface normal.
    pub fn reflectv(&self, r: &Ray) -> Vector3 {
        r.direction.reflect(&self.normalv).normalize()
    }
}

#[test]
fn precompute_intersection_state() {
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let shape = Shape::sphere(Vector3::zero(), 1.0);
    let i = Intersection::new(&r, 4.0, &shape);

    assert!(std::ptr::eq(i.what, &shape));
    assert_eq!(i.point, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(i.eyev, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(i.normalv, Vector3::new(0.0, 0.0, -1.0));
    assert!(!i.inside);
}

#[test]
fn precompute_inside_intersection() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let shape = Shape::sphere(Vector3::zero(), 1.0);
    let i = Intersection::new(&r, 1.0, &shape);

    assert!(i.inside);
    assert_eq!(i.point, Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(i.normalv, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn plane_seen_from_behind_faces_the_ray() {
    let r = Ray::new(Vector3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
    let shape = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    let i = Intersection::new(&r, 1.0, &shape);

    assert!(i.inside);
    assert_eq!(i.normalv, Vector3::new(0.0, -1.0, 0.0));
}

#[test]
fn reflect_off_plane_at_45() {
    let shape = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(Vector3::new(0.0, 1.0, -1.0), Vector3::new(0.0, -1.0, 1.0));
    let i = Intersection::new(&r, 1.0, &shape);

    let h = 2.0f64.sqrt() / 2.0;
    assert_eq!(i.reflectv(&r), Vector3::new(0.0, h, h));
}
