//! Ray casting for screen-to-scene picking.

use nalgebra::{Point3, Vector3};

use crate::geometry::Triangle;
use crate::math::EPSILON;

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit direction
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a ray; `direction` is normalized (a zero direction stays zero and hits nothing)
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(EPSILON).unwrap_or_else(Vector3::zeros),
        }
    }

    /// Ray from `origin` through `target`
    pub fn towards(origin: Point3<f32>, target: Point3<f32>) -> Self {
        Self::new(origin, target - origin)
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Möller-Trumbore ray-triangle intersection.
/// Returns the distance along the ray if hit.
pub fn intersect_triangle(ray: &Ray, triangle: &Triangle) -> Option<f32> {
    let [v0, v1, v2] = *triangle.corners();
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Ray is parallel to the triangle, or the triangle has no area
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    // Reject hits behind or at the origin
    let t = f * edge2.dot(&q);
    (t > EPSILON).then_some(t)
}

pub fn intersects(ray: &Ray, triangle: &Triangle) -> bool {
    intersect_triangle(ray, triangle).is_some()
}

/// Whether the ray hits any of the triangles
pub fn intersects_any(ray: &Ray, triangles: &[Triangle]) -> bool {
    triangles.iter().any(|t| intersects(ray, t))
}

/// Where the ray crosses the plane through `point` with `normal`.
/// `None` when the ray runs parallel to the plane or the plane is behind it.
pub fn intersect_with_plane(ray: &Ray, point: &Point3<f32>, normal: &Vector3<f32>) -> Option<Point3<f32>> {
    let denom = normal.dot(&ray.direction);
    if denom.abs() < EPSILON {
        return None;
    }
    let t = normal.dot(&(point - ray.origin)) / denom;
    (t >= 0.0).then(|| ray.at(t))
}

/// Pick the candidate whose anchor point is closest to the ray origin.
///
/// Only candidates that were actually hit should be passed in. On equal
/// distances the first candidate wins, so identical input gives identical output.
pub fn pick_nearest<K, I>(ray: &Ray, candidates: I) -> Option<K>
where
    I: IntoIterator<Item = (K, Point3<f32>)>,
{
    let mut best: Option<(K, f32)> = None;
    for (key, anchor) in candidates {
        let distance = nalgebra::distance(&ray.origin, &anchor);
        if best.as_ref().is_none_or(|(_, d)| distance < *d) {
            best = Some((key, distance));
        }
    }
    best.map(|(key, _)| key)
}
