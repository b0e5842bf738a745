use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::core::types::BoundingSphere;

use super::contact::ContactRecord;
use super::primitive::Primitive;
use super::ray;

/// One face of a box, tested as a bounded plane.
///
/// The rectangle keeps its own plane space in which it lies flat on the XY
/// plane centered at the origin, with the face normal along +Z. Plane space
/// hangs off the owner's local space, so the per-frame transforms chain
/// through [`Primitive`]'s world matrices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    half_width: f32,
    half_height: f32,
    plane_to_local: Mat4,
    local_to_plane: Mat4,
    #[serde(skip)]
    world_to_plane: Mat4,
    #[serde(skip)]
    plane_to_world: Mat4,
    #[serde(skip)]
    world_normal: Vec3,
}

fn next_axis(axis: Vec3) -> Vec3 {
    Vec3::new(axis.y, axis.z, axis.x)
}

impl Rectangle {
    /// Builds the face of the local box that `axis` points at. `axis` must be
    /// one of the six signed cardinal directions.
    pub fn from_box(min: Vec3, max: Vec3, axis: Vec3) -> (Self, BoundingSphere) {
        let mut min = min;
        let mut max = max;
        if axis.dot(Vec3::ONE) >= 0.0 {
            // Flatten the box onto its max plane.
            min += axis * (max - min);
        } else {
            max += axis * (max - min);
        }

        let right = next_axis(axis);
        let up = next_axis(right);
        let rot = Mat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            axis.extend(0.0),
            Vec4::W,
        );

        let center = (min + max) * 0.5;
        let plane_to_local = Mat4::from_translation(center) * rot;
        let local_to_plane = rot.transpose() * Mat4::from_translation(-center);

        let half_width = ((max - min).dot(right) * 0.5).abs();
        let half_height = ((max - min).dot(up) * 0.5).abs();

        let sphere = BoundingSphere::from_box(min, max);
        let rect = Self {
            half_width,
            half_height,
            plane_to_local,
            local_to_plane,
            world_to_plane: Mat4::IDENTITY,
            plane_to_world: Mat4::IDENTITY,
            world_normal: Vec3::Z,
        };
        (rect, sphere)
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    /// Face normal in world space, unit length.
    pub fn world_normal(&self) -> Vec3 {
        self.world_normal
    }

    /// Rebuilds the chained plane transforms after the owner moves.
    pub(crate) fn refresh(&mut self, local_to_world: &Mat4, world_to_local: &Mat4) {
        self.world_to_plane = self.local_to_plane * *world_to_local;
        self.plane_to_world = *local_to_world * self.plane_to_local;
        self.world_normal = self
            .plane_to_world
            .transform_vector3(Vec3::Z)
            .normalize_or(Vec3::Z);
    }

    /// Sweeps a sphere from `p0` to `p1` against the face.
    ///
    /// The sphere's leading tangent point is projected along the motion onto
    /// the face plane. A landing inside the bounds is a direct hit; a landing
    /// off the edge casts a ray back from the clamped edge point to find
    /// where on the sphere contact happens.
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

        let normal = self.world_normal;
        let mut p_tan0 = p0 - normal * radius;
        let mut p_tan1 = p1 - normal * radius;

        let step_dist = (p_tan1 - p_tan0).dot(normal);
        if step_dist >= -f32::EPSILON {
            // Moving away from the face.
            return None;
        }

        let face_center = self.plane_to_world.w_axis.truncate();
        let mut center_dist = face_center.dot(normal) - p_tan0.dot(normal);
        if center_dist > 0.0 {
            if center_dist > radius {
                // More than halfway embedded from the start.
                return None;
            }
            p_tan0 += center_dist * normal;
            p_tan1 += center_dist * normal;
            center_dist = 0.0;
        }

        let t = center_dist / step_dist;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let p_proj = p_tan0 + t * (p_tan1 - p_tan0);
        let mut proj_plane = self.world_to_plane.transform_point3(p_proj);
        if self.inside(proj_plane) {
            // The tangent point smacked straight into the face.
            let center_at_t = p0 + t * (p1 - p0);
            return Some(ContactRecord::swept(
                prim.owner(),
                p0,
                center_at_t,
                p_proj,
                center_at_t - p_proj,
            ));
        }

        // The crossing is off the face. Clamp to the nearest edge point and
        // cast a ray back from it against the moving sphere.
        proj_plane.x = proj_plane.x.clamp(-self.half_width, self.half_width);
        proj_plane.y = proj_plane.y.clamp(-self.half_height, self.half_height);
        let p_hit = self.plane_to_world.transform_point3(proj_plane);

        if p_hit.distance_squared(p_proj) > radius * radius {
            return None;
        }

        let t = ray::ray_sphere(p0, radius, p_hit, p_hit - (p1 - p0))?;
        let center_at_t = p0 + t * (p1 - p0);
        Some(ContactRecord::swept(
            prim.owner(),
            p0,
            center_at_t,
            p_hit,
            center_at_t - p_hit,
        ))
    }

    /// Closest point on the rectangle in world space.
    fn closest_point(&self, world_pos: Vec3) -> Vec3 {
        let mut close = self.world_to_plane.transform_point3(world_pos);
        close.x = close.x.clamp(-self.half_width, self.half_width);
        close.y = close.y.clamp(-self.half_height, self.half_height);
        close.z = 0.0;
        self.plane_to_world.transform_point3(close)
    }

    fn inside(&self, plane_pos: Vec3) -> bool {
        plane_pos.x.abs() <= self.half_width && plane_pos.y.abs() <= self.half_height
    }

    /// Initial-contact check. A center behind the face still pushes out
    /// along the face normal rather than deeper through it.
    fn check_touching(&self, prim: &Primitive, world_pos: Vec3, radius: f32) -> Option<ContactRecord> {
        let close = self.closest_point(world_pos);
        if world_pos.distance_squared(close) > radius * radius {
            return None;
        }

        let mut normal = world_pos - close;
        if normal.dot(self.world_normal) < 0.0 {
            normal = self.world_normal;
        }
        Some(ContactRecord::touching(prim.owner(), world_pos, close, normal))
    }
}
