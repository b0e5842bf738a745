use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::BoundingSphere;

use super::contact::ContactRecord;
use super::primitive::Primitive;
use super::ray;

/// Axis-aligned ellipsoid in the owner's local space.
///
/// The sweep expands the radii by the sphere radius and runs the segment
/// through the scaled ray test, so the moving sphere collapses to a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipsoid {
    center: Vec3,
    radii: Vec3,
}

impl Ellipsoid {
    pub fn from_box(min: Vec3, max: Vec3) -> (Self, BoundingSphere) {
        let center = (min + max) * 0.5;
        let radii = (max - min) * 0.5;
        (Self { center, radii }, BoundingSphere::from_box(min, max))
    }

    pub fn radii(&self) -> Vec3 {
        self.radii
    }

    pub(crate) fn collide(
        &self,
        prim: &Primitive,
        p0: Vec3,
        p1: Vec3,
        radius: f32,
    ) -> Option<ContactRecord> {
        let p0_loc = prim.world_to_local().transform_point3(p0);
        let local_radius = prim.world_to_local_radius(radius);
        let expanded = self.radii + Vec3::splat(local_radius);

        if let Some(record) = self.check_touching(prim, p0, p0_loc, expanded) {
            return Some(record);
        }

        let p1_loc = prim.world_to_local().transform_point3(p1);
        let (hit_loc, normal_loc) = ray::ray_ellipsoid(self.center, expanded, p0_loc, p1_loc)?;

        // The hit lies on the expanded surface, which is where the sphere
        // center sits at tangency.
        let center = prim.local_to_world().transform_point3(hit_loc);
        let normal = prim
            .local_to_world()
            .transform_vector3(normal_loc)
            .normalize_or(Vec3::Z);

        Some(ContactRecord::swept(
            prim.owner(),
            p0,
            center,
            center - normal * radius,
            normal,
        ))
    }

    /// Initial-contact check against the expanded ellipsoid. The contact
    /// point projects radially in the scaled space onto the true surface.
    fn check_touching(
        &self,
        prim: &Primitive,
        p0: Vec3,
        p0_loc: Vec3,
        expanded: Vec3,
    ) -> Option<ContactRecord> {
        let scaled = (p0_loc - self.center) / expanded;
        if scaled.length_squared() > 1.0 {
            return None;
        }

        let dir = ((p0_loc - self.center) / self.radii).normalize_or(Vec3::Z);
        let contact_loc = self.center + self.radii * dir;
        let contact = prim.local_to_world().transform_point3(contact_loc);
        let normal = (p0 - contact).normalize_or(Vec3::Z);

        Some(ContactRecord::touching(prim.owner(), p0, contact, normal))
    }
}
