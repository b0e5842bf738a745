use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::BoundingSphere;

use super::contact::ContactRecord;
use super::primitive::Primitive;

/// Capped cylinder around the local Z axis, extending from the local origin
/// up a distance `length`, with a circular X/Y cross section of `radius`.
///
/// Local bounds are `[-radius, radius] x [-radius, radius] x [0, length]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cylinder {
    length: f32,
    radius: f32,
}

fn in_step(t: f32) -> bool {
    (0.0..=1.0).contains(&t)
}

impl Cylinder {
    /// Extracts the cylinder spanning a local box. The radius comes from the
    /// box's +X extent and the length from its furthest Z extent.
    pub fn from_box(min: Vec3, max: Vec3) -> (Self, BoundingSphere) {
        let length = max.z.max(-min.z);
        let radius = max.x;
        let sphere = BoundingSphere::from_box(
            Vec3::new(-radius, -radius, 0.0),
            Vec3::new(radius, radius, length),
        );
        (Self { length, radius }, sphere)
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sweeps a sphere from `p0` to `p1` against the cylinder.
    ///
    /// After the initial-contact check, the caps are tested before the side,
    /// and the first test that reports a crossing inside the step wins even
    /// when a later test would have found an earlier one.
    pub(crate) fn collide(
        &self,
        prim: &Primitive,
        p0: Vec3,
        p1: Vec3,
        radius: f32,
    ) -> Option<ContactRecord> {
        if let Some(record) = self.check_touching(prim, p0, radius) {
            return Some(record);
        }

        let p0_loc = prim.world_to_local().transform_point3(p0);
        let p1_loc = prim.world_to_local().transform_point3(p1);
        let local_radius = prim.world_to_local_radius(radius);

        // The cap checks look only for the sphere's tangent point landing on
        // the cap disc, never for rim grazes.
        if let Some(t) = self.check_cap_top(p0_loc, p1_loc, local_radius) {
            if in_step(t) {
                return Some(self.cap_hit(prim, p0, p1, t, Vec3::Z, radius));
            }
        }

        if let Some(t) = self.check_cap_bottom(p0_loc, p1_loc, local_radius) {
            if in_step(t) {
                return Some(self.cap_hit(prim, p0, p1, t, Vec3::NEG_Z, radius));
            }
        }

        if let Some(t) = self.check_sides(p0_loc, p1_loc, local_radius) {
            if in_step(t) {
                let local_center = p0_loc + t * (p1_loc - p0_loc);
                if local_center.z >= 0.0 && local_center.z <= self.length {
                    let center = p0 + t * (p1 - p0);
                    let local_norm = Vec3::new(local_center.x, local_center.y, 0.0);
                    let norm = prim
                        .local_to_world()
                        .transform_vector3(local_norm)
                        .normalize_or(Vec3::Z);

                    return Some(ContactRecord::swept(
                        prim.owner(),
                        p0,
                        center,
                        center - norm * radius,
                        norm,
                    ));
                }
            }
        }

        None
    }

    fn cap_hit(
        &self,
        prim: &Primitive,
        p0: Vec3,
        p1: Vec3,
        t: f32,
        local_norm: Vec3,
        radius: f32,
    ) -> ContactRecord {
        let center = p0 + t * (p1 - p0);
        let norm = prim
            .local_to_world()
            .transform_vector3(local_norm)
            .normalize_or(Vec3::Z);

        ContactRecord::swept(prim.owner(), p0, center, center - norm * radius, norm)
    }

    /// Closest point of the solid cylinder to `p`, in local space.
    fn closest_point_local(&self, p: Vec3) -> Vec3 {
        let z = p.z.clamp(0.0, self.length);

        let mut xy = Vec2::new(p.x, p.y);
        let len = xy.length();
        if len > self.radius {
            xy *= self.radius / len;
        }

        Vec3::new(xy.x, xy.y, z)
    }

    /// Initial-contact check. Touching only counts against the side band;
    /// centers whose nearest feature is a cap disc or the axis itself report
    /// no contact (a sphere swallowed whole has nothing to push against).
    fn check_touching(&self, prim: &Primitive, p0: Vec3, radius: f32) -> Option<ContactRecord> {
        let p0_local = prim.world_to_local().transform_point3(p0);

        let mut closest_local = self.closest_point_local(p0_local);
        let mut closest = prim.local_to_world().transform_point3(closest_local);

        if closest.distance_squared(p0) > radius * radius {
            return None;
        }

        if closest_local.z >= self.length || closest_local.z <= 0.0 {
            // Within the infinite cylinder but past an end cap.
            return None;
        }

        // Make sure the contact point sits on the side surface. Embedded
        // centers project radially outward onto the wall.
        let mut xy = Vec2::new(closest_local.x, closest_local.y);
        if xy.length_squared() < self.radius * self.radius {
            let Some(dir) = xy.try_normalize() else {
                // Dead on the axis, no radial direction to push along.
                return None;
            };
            xy = dir * self.radius;
            closest_local.x = xy.x;
            closest_local.y = xy.y;
            closest = prim.local_to_world().transform_point3(closest_local);
        }

        let norm = (p0 - closest).normalize_or(Vec3::Z);

        Some(ContactRecord::touching(prim.owner(), p0, closest, norm))
    }

    /// Crossing fraction for the sphere tangent meeting the top cap plane,
    /// accepted only when the tangent lands on the cap disc.
    fn check_cap_top(&self, p0: Vec3, p1: Vec3, radius: f32) -> Option<f32> {
        let p1z = p1.z - (radius + self.length);
        if p1z >= 0.0 {
            // Ending position never reaches the plane.
            return None;
        }
        if p0.z <= self.length {
            return None;
        }

        // A start already inside the expanded plane is precision slop; treat
        // it as starting exactly on the plane.
        let p0z = (p0.z - (radius + self.length)).max(0.0);

        let t = p0z / (p0z - p1z);
        let on_plane = Vec3::new(p0.x, p0.y, p0z).lerp(Vec3::new(p1.x, p1.y, p1z), t);
        if on_plane.length_squared() < self.radius * self.radius {
            return Some(t);
        }
        None
    }

    /// Mirror of the top cap test against the z = 0 plane.
    fn check_cap_bottom(&self, p0: Vec3, p1: Vec3, radius: f32) -> Option<f32> {
        let p1z = p1.z + radius;
        if p1z <= 0.0 {
            return None;
        }
        if p0.z > 0.0 {
            return None;
        }

        let p0z = (p0.z + radius).min(0.0);

        let t = p0z / (p0z - p1z);
        let on_plane = Vec3::new(p0.x, p0.y, p0z).lerp(Vec3::new(p1.x, p1.y, p1z), t);
        if on_plane.length_squared() < self.radius * self.radius {
            return Some(t);
        }
        None
    }

    /// Crossing fraction of the swept circle against the infinite side wall.
    /// The caller still validates the Z range and step interval.
    fn check_sides(&self, p0: Vec3, p1: Vec3, radius: f32) -> Option<f32> {
        let p02 = Vec2::new(p0.x, p0.y);
        let p12 = Vec2::new(p1.x, p1.y);
        let dir = p12 - p02;

        let a = dir.length_squared() as f64;
        if a < f64::EPSILON {
            return None;
        }
        let b = 2.0 * (dir.dot(p02) as f64);
        let combined = (radius + self.radius) as f64;
        let c = p02.length_squared() as f64 - combined * combined;

        let det = b * b - 4.0 * a * c;
        if det < 0.0 {
            return None;
        }

        Some(((-b - det.sqrt()) / (2.0 * a)) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Transform;
    use crate::utils::allocator::ActorId;

    fn unit_cylinder() -> Primitive {
        // Radius 1, length 2, sitting at the world origin.
        let mut prim = Primitive::cylinder(
            ActorId::from_index(0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 2.0),
        );
        prim.update_transforms(&Transform::default());
        prim
    }

    #[test]
    fn descending_sphere_lands_on_top_cap() {
        let prim = unit_cylinder();
        let hit = prim
            .collide(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0), 0.5)
            .expect("sweep crosses the cap");

        assert!(!hit.touching);
        // Tangency when the center reaches z = 2.5.
        assert!((hit.center - Vec3::new(0.0, 0.0, 2.5)).length() < 1e-4, "center {}", hit.center);
        assert!((hit.contact - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-4, "contact {}", hit.contact);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
        assert!((hit.dist_sq - 6.25).abs() < 1e-3, "dist_sq {}", hit.dist_sq);
    }

    #[test]
    fn horizontal_sweep_hits_the_side() {
        let prim = unit_cylinder();
        let hit = prim
            .collide(Vec3::new(-5.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0), 0.5)
            .expect("sweep crosses the side");

        assert!((hit.center - Vec3::new(-1.5, 0.0, 1.0)).length() < 1e-4, "center {}", hit.center);
        assert!((hit.contact - Vec3::new(-1.0, 0.0, 1.0)).length() < 1e-4, "contact {}", hit.contact);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-4, "normal {}", hit.normal);
    }

    #[test]
    fn sphere_resting_against_side_reports_touching() {
        let prim = unit_cylinder();
        let start = Vec3::new(1.2, 0.0, 1.0);
        let hit = prim
            .collide(start, start + Vec3::new(0.1, 0.0, 0.0), 0.5)
            .expect("already in contact");

        assert!(hit.touching);
        assert_eq!(hit.dist_sq, 0.0);
        assert!((hit.contact - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-4);
        assert!((hit.normal - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn sphere_swallowed_on_axis_reports_nothing() {
        let prim = unit_cylinder();
        let start = Vec3::new(0.0, 0.0, 1.0);
        assert!(prim.collide(start, start, 0.25).is_none());
    }

    #[test]
    fn embedded_off_axis_sphere_projects_to_the_side() {
        let prim = unit_cylinder();
        let start = Vec3::new(0.5, 0.0, 1.0);
        let hit = prim
            .collide(start, start, 0.25)
            .expect("off-axis embedded center still touches the side");

        assert!(hit.touching);
        assert!((hit.contact - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-4, "contact {}", hit.contact);
        // Contact-to-center direction, which points inward for a center
        // buried short of the wall.
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-4, "normal {}", hit.normal);
    }

    #[test]
    fn hover_above_cap_is_not_touching() {
        // The nearest feature is the cap disc, which the touching check
        // ignores; the sweep still reports the resting contact at t = 0.
        let prim = unit_cylinder();
        let start = Vec3::new(0.0, 0.0, 2.4);
        let hit = prim
            .collide(start, start + Vec3::new(0.0, 0.0, -0.01), 0.5)
            .expect("cap plane crossing at t = 0");

        assert!(!hit.touching);
        assert!((hit.center - start).length() < 1e-4);
    }
}
