use glam::Vec3;

use crate::config;

/// How far along `p0..p1` the segment first meets the sphere, if at all.
///
/// A degenerate (zero length) segment starting inside the sphere reports an
/// immediate hit at `t = 0`. A moving segment must cross the surface within
/// the step to count, so a moving start point already inside misses.
pub fn ray_sphere(center: Vec3, radius: f32, p0: Vec3, p1: Vec3) -> Option<f32> {
    let dir = p1 - p0;

    let a = dir.length_squared() as f64;
    if a <= config::QUADRATIC_EPSILON as f64 {
        // No movement along the segment, either p0 is in the sphere or
        // there is no hit.
        if center.distance_squared(p0) <= radius * radius {
            return Some(0.0);
        }
        return None;
    }

    let b = 2.0 * (dir.dot(p0 - center) as f64);
    let c = (p0.distance_squared(center) - radius * radius) as f64;

    let det = b * b - 4.0 * a * c;
    if det < 0.0 {
        return None;
    }
    let t = ((-b - det.sqrt()) / (2.0 * a)) as f32;

    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(t)
}

/// Segment test against an axis-aligned ellipsoid.
///
/// The segment is rescaled so the ellipsoid becomes the unit sphere, then
/// the hit is mapped back. Normals transform by the inverse scale before
/// normalization, so they stay perpendicular to the surface.
pub fn ray_ellipsoid(center: Vec3, radii: Vec3, p0: Vec3, p1: Vec3) -> Option<(Vec3, Vec3)> {
    // Adjust the segment so the ellipsoid sits at the origin as a unit sphere.
    let start = (p0 - center) / radii;
    let end = (p1 - center) / radii;

    let t = ray_sphere(Vec3::ZERO, 1.0, start, end)?;

    let unit_hit = start + t * (end - start);
    let position = unit_hit * radii + center;
    let normal = (unit_hit / radii).normalize_or(Vec3::Z);

    Some((position, normal))
}
