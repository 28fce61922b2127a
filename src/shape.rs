use crate::consts::PARALLEL_EPSILON;
use crate::color::Color;
use crate::vector::Vector3;
use crate::ray::Ray;
use crate::light::Material;
use crate::pattern::Texture;

/// The geometry of a triangle.
///
/// Edges and the normal are precomputed when the triangle is built; they are
/// used on every intersection test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Vector3,
    pub p2: Vector3,
    pub p3: Vector3,

    /// Edge from `p1` to `p2`.
    pub e1: Vector3,

    /// Edge from `p1` to `p3`.
    pub e2: Vector3,

    /// Unit normal following the winding `p1 -> p2 -> p3`.
    pub normal: Vector3,
}

impl TriangleInfo {
    pub fn new(p1: Vector3, p2: Vector3, p3: Vector3) -> TriangleInfo {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e1.cross(&e2).normalize();

        TriangleInfo { p1, p2, p3, e1, e2, normal }
    }

    pub fn centroid(&self) -> Vector3 {
        (self.p1 + self.p2 + self.p3) * (1.0 / 3.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A sphere with a center and a radius.
    Sphere { center: Vector3, radius: f64 },

    /// An infinite plane through `point`, with a unit `normal`.
    Plane { point: Vector3, normal: Vector3 },

    /// A triangle. See `TriangleInfo`.
    Triangle(TriangleInfo),
}

/// A primitive of the scene: some geometry plus the material it is shaded
/// with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub material: Material,
}

impl Shape {
    pub fn sphere(center: Vector3, radius: f64) -> Shape {
        Shape {
            ty: ShapeType::Sphere { center, radius },
            material: Default::default(),
        }
    }

    /// Creates a plane. The normal is normalized here.
    pub fn plane(point: Vector3, normal: Vector3) -> Shape {
        Shape {
            ty: ShapeType::Plane { point, normal: normal.normalize() },
            material: Default::default(),
        }
    }

    /// Creates a triangle, defined by three points in space.
    pub fn triangle(p1: Vector3, p2: Vector3, p3: Vector3) -> Shape {
        Shape {
            ty: ShapeType::Triangle(TriangleInfo::new(p1, p2, p3)),
            material: Default::default(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Returns the nearest `t` in `[t_min, t_max]` where `ray` meets this
    /// shape, if any.
    ///
    /// Degenerate geometry (a zero direction, a non-positive radius, a ray
    /// parallel to a plane or a triangle) never produces a hit.
    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<f64> {
        match self.ty {
            ShapeType::Sphere { center, radius }
                => intersect_sphere(ray, center, radius, t_min, t_max),
            ShapeType::Plane { point, normal }
                => intersect_plane(ray, point, normal, t_min, t_max),
            ShapeType::Triangle(ref ti)
                => intersect_triangle(ray, ti, t_min, t_max),
        }
    }

    /// Obtains the outward normal at a point on the surface.
    ///
    /// Planes and triangles have the same normal everywhere; a sphere's
    /// normal points from its center through `at`.
    pub fn normal_at(&self, at: Vector3) -> Vector3 {
        match self.ty {
            ShapeType::Sphere { center, .. } => (at - center).normalize(),
            ShapeType::Plane { normal, .. } => normal,
            ShapeType::Triangle(ref ti) => ti.normal,
        }
    }

    /// The unlit color of the surface at `at`.
    ///
    /// Only spheres can be textured; other shapes fall back to their base
    /// color.
    pub fn color_at(&self, at: Vector3) -> Color {
        match (self.ty, self.material.texture) {
            (ShapeType::Sphere { center, radius }, Some(texture))
                => texture.color_at_sphere(at, center, radius),
            _ => self.material.color,
        }
    }

    /// Whether the shape has a texture it cannot map.
    pub fn has_unmapped_texture(&self) -> bool {
        match self.ty {
            ShapeType::Sphere { .. } => false,
            _ => self.material.texture.is_some(),
        }
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.material.texture.as_ref()
    }
}

fn in_window(t: f64, t_min: f64, t_max: f64) -> bool {
    t.is_finite() && t >= t_min && t <= t_max
}

/// Solves `|O + tD - C|^2 = r^2` for `t`.
///
/// The smaller root wins when it is inside the window; otherwise the larger
/// root is tried, which covers rays starting inside the sphere.
fn intersect_sphere(ray: &Ray, center: Vector3, radius: f64, t_min: f64,
    t_max: f64) -> Option<f64> {
    if !(radius > 0.0) || !radius.is_finite() {
        return None;
    }

    let sphere_to_ray = ray.origin - center;

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - radius * radius;

    if a.abs() < f64::EPSILON {
        return None;
    }

    let discriminant = b.powi(2) - (4.0 * a * c);
    if !(discriminant >= 0.0) {
        return None;
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

    if in_window(t1, t_min, t_max) {
        Some(t1)
    } else if in_window(t2, t_min, t_max) {
        Some(t2)
    } else {
        None
    }
}

/// Solves `dot(N, O + tD - P) = 0` for `t`.
fn intersect_plane(ray: &Ray, point: Vector3, normal: Vector3, t_min: f64,
    t_max: f64) -> Option<f64> {
    let denominator = normal.dot(&ray.direction);

    // Parallel rays (and zero normals or directions) never meet the plane.
    if !(denominator.abs() >= PARALLEL_EPSILON) {
        return None;
    }

    let t = (point - ray.origin).dot(&normal) / denominator;
    if in_window(t, t_min, t_max) { Some(t) } else { None }
}

/// Moller-Trumbore ray/triangle intersection.
fn intersect_triangle(ray: &Ray, ti: &TriangleInfo, t_min: f64, t_max: f64)
    -> Option<f64> {
    let dir_cross_e2 = ray.direction.cross(&ti.e2);
    let determinant = ti.e1.dot(&dir_cross_e2);

    // If the ray is parallel to the triangle, or the triangle is degenerate,
    // return no intersection.
    if !(determinant.abs() >= PARALLEL_EPSILON) {
        return None;
    }

    let f = 1.0 / determinant;
    let p1_to_origin = ray.origin - ti.p1;
    let u = f * p1_to_origin.dot(&dir_cross_e2);
    if u < 0.0 || u > 1.0 {
        return None;
    }

    let origin_cross_e1 = p1_to_origin.cross(&ti.e1);
    let v = f * ray.direction.dot(&origin_cross_e1);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * ti.e2.dot(&origin_cross_e1);
    if in_window(t, t_min, t_max) { Some(t) } else { None }
}

/* Tests */

#[cfg(test)]
const INF: f64 = std::f64::INFINITY;

#[cfg(test)]
fn closed_form_roots(ray: &Ray, center: Vector3, radius: f64)
    -> Option<(f64, f64)> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * oc.dot(&ray.direction);
    let c = oc.dot(&oc) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        None
    } else {
        Some(((-b - disc.sqrt()) / (2.0 * a), (-b + disc.sqrt()) / (2.0 * a)))
    }
}

#[test]
fn ray_pierces_sphere() {
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let s = Shape::sphere(Vector3::zero(), 1.0);

    assert_eq!(s.intersect(&r, 0.0, INF), Some(4.0));
}

#[test]
fn sphere_matches_closed_form_solution() {
    let center = Vector3::new(0.5, -1.0, 7.0);
    let radius = 2.5;
    let s = Shape::sphere(center, radius);

    let rays = [
        Ray::new(Vector3::zero(), Vector3::new(0.1, -0.2, 1.0)),
        Ray::new(Vector3::new(3.0, 1.0, 0.0), Vector3::new(-0.4, -0.3, 1.2)),
        Ray::new(Vector3::new(-2.0, -1.0, 2.0), Vector3::new(2.0, 0.0, 4.0)),
    ];

    for r in rays.iter() {
        let (t1, _) = closed_form_roots(r, center, radius)
            .expect("Test rays should hit the sphere.");
        let t = s.intersect(r, 0.0, INF).expect("Sphere should be hit.");
        assert!(crate::feq(t, t1), "{} != {}", t, t1);
    }
}

#[test]
fn sphere_negative_discriminant_misses() {
    let center = Vector3::new(5.0, 0.0, 0.0);
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let s = Shape::sphere(center, 1.0);

    assert!(closed_form_roots(&r, center, 1.0).is_none());
    assert_eq!(s.intersect(&r, 0.0, INF), None);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray::new(Vector3::new(0.0, 1.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let s = Shape::sphere(Vector3::zero(), 1.0);

    assert_eq!(s.intersect(&r, 0.0, INF), Some(5.0));
}

#[test]
fn ray_inside_sphere_takes_far_root() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
    let s = Shape::sphere(Vector3::zero(), 1.0);

    // The near root (-1) is outside the window, the far root is not.
    assert_eq!(s.intersect(&r, 0.001, INF), Some(1.0));
}

#[test]
fn sphere_is_behind_ray() {
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
    let s = Shape::sphere(Vector3::zero(), 1.0);

    assert_eq!(s.intersect(&r, 0.0, INF), None);
}

#[test]
fn sphere_respects_t_max() {
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let s = Shape::sphere(Vector3::zero(), 1.0);

    assert_eq!(s.intersect(&r, 0.0, 3.9), None);
    assert_eq!(s.intersect(&r, 0.0, 4.0), Some(4.0));
}

#[test]
fn degenerate_sphere_never_hits() {
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(Shape::sphere(Vector3::zero(), 0.0).intersect(&r, 0.0, INF), None);
    assert_eq!(Shape::sphere(Vector3::zero(), -1.0).intersect(&r, 0.0, INF), None);

    let still = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::zero());
    assert_eq!(Shape::sphere(Vector3::zero(), 1.0).intersect(&still, 0.0, INF),
        None);
}

#[test]
fn normal_on_sphere_nonaxial() {
    let s = Shape::sphere(Vector3::new(1.0, 1.0, 1.0), 2.0);
    let k = 3.0f64.sqrt() / 3.0;
    let n = s.normal_at(Vector3::new(1.0, 1.0, 1.0) + Vector3::new(k, k, k) * 2.0);

    assert_eq!(n, Vector3::new(k, k, k));
}

#[test]
fn ray_intersecting_plane_from_above() {
    let p = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert_eq!(p.intersect(&r, 0.0, INF), Some(1.0));
}

#[test]
fn ray_intersecting_plane_from_below() {
    let p = Shape::plane(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 3.0, 0.0));
    let r = Ray::new(Vector3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 2.0, 0.0));

    assert_eq!(p.intersect(&r, 0.0, INF), Some(1.5));
    assert_eq!(p.normal_at(Vector3::zero()), Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_parallel_to_plane_misses() {
    let p = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(Vector3::new(0.0, 10.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
    let coplanar = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(p.intersect(&r, 0.0, INF), None);
    assert_eq!(p.intersect(&coplanar, 0.0, INF), None);
}

#[test]
fn plane_behind_ray_misses() {
    let p = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(p.intersect(&r, 0.0, INF), None);
}

#[test]
fn constructing_a_triangle() {
    let p1 = Vector3::new(0.0, 1.0, 0.0);
    let p2 = Vector3::new(-1.0, 0.0, 0.0);
    let p3 = Vector3::new(1.0, 0.0, 0.0);
    let t = Shape::triangle(p1, p2, p3);

    if let ShapeType::Triangle(ref ti) = t.ty {
        assert_eq!(ti.e1, Vector3::new(-1.0, -1.0, 0.0));
        assert_eq!(ti.e2, Vector3::new(1.0, -1.0, 0.0));
        assert_eq!(ti.normal, Vector3::new(0.0, 0.0, 1.0));
    } else {
        unreachable!();
    }

    assert_eq!(t.normal_at(Vector3::new(0.0, 0.5, 0.0)),
        Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn intersecting_a_ray_parallel_to_a_triangle() {
    let t = Shape::triangle(
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0)
    );
    let r = Ray::new(Vector3::new(0.0, -1.0, -2.0), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(t.intersect(&r, 0.0, INF), None);
}

#[test]
fn a_ray_misses_each_triangle_edge() {
    let t = Shape::triangle(
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0)
    );
    let dir = Vector3::new(0.0, 0.0, 1.0);

    for origin in [
        Vector3::new(1.0, 1.0, -2.0),
        Vector3::new(-1.0, 1.0, -2.0),
        Vector3::new(0.0, -1.0, -2.0),
    ].iter() {
        assert_eq!(t.intersect(&Ray::new(*origin, dir), 0.0, INF), None);
    }
}

#[test]
fn a_ray_strikes_a_triangle() {
    let t = Shape::triangle(
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0)
    );
    let r = Ray::new(Vector3::new(0.0, 0.5, -2.0), Vector3::new(0.0, 0.0, 1.0));

    let hit = t.intersect(&r, 0.0, INF).expect("Triangle should be hit.");
    assert!(crate::feq(hit, 2.0));
    assert_eq!(t.intersect(&r, 2.5, INF), None);
}

#[test]
fn degenerate_triangle_never_hits() {
    let t = Shape::triangle(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(2.0, 0.0, 0.0)
    );
    let r = Ray::new(Vector3::new(0.5, 0.0, -2.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(t.intersect(&r, 0.0, INF), None);
}

#[test]
fn textured_sphere_alternates_along_longitude() {
    let center = Vector3::new(0.0, 0.0, 4.0);
    let mut s = Shape::sphere(center, 2.0);
    s.material.color = Color::rgb(10.0, 20.0, 30.0);
    s.material.texture = Some(Texture::checker(Color::white(), Color::black()));

    // Just above the equator, in the middle of a cell: 36 degrees of
    // longitude is one cell at 10 divisions.
    let at = |degrees: f64| {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let r = (1.0f64 - 0.04).sqrt();
        center + Vector3::new(r * cos, 0.2, r * sin) * 2.0
    };

    let first = s.color_at(at(18.0));
    let next = s.color_at(at(54.0));
    let after = s.color_at(at(90.0));

    assert!(first == Color::white() || first == Color::black());
    assert_ne!(first, next);
    assert_eq!(first, after);
}

#[test]
fn textured_plane_keeps_base_color() {
    let mut p = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    p.material.color = Color::rgb(10.0, 20.0, 30.0);
    p.material.texture = Some(Default::default());

    assert!(p.has_unmapped_texture());
    assert_eq!(p.color_at(Vector3::new(3.0, 0.0, 7.0)), Color::rgb(10.0, 20.0, 30.0));
}
