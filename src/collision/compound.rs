use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{BoundingSphere, Transform};

use super::contact::ContactRecord;
use super::primitive::Primitive;
use super::ray;

/// A group of child primitives tested as one shape.
///
/// Dispatch keeps the globally nearest child hit by distance traveled, and
/// the winning record remembers which child produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compound {
    children: Vec<Primitive>,
}

impl Compound {
    /// Wraps existing primitives. The combined local sphere comes from
    /// merging the children's spheres pairwise.
    pub fn new(children: Vec<Primitive>) -> (Self, BoundingSphere) {
        let mut sphere = BoundingSphere::default();
        let mut iter = children.iter();
        if let Some(first) = iter.next() {
            sphere = *first.local_sphere();
            for child in iter {
                sphere = sphere.merge(child.local_sphere());
            }
        }
        (Self { children }, sphere)
    }

    pub fn children(&self) -> &[Primitive] {
        &self.children
    }

    pub(crate) fn rebind_owner(&mut self, owner: crate::utils::allocator::ActorId) {
        for child in &mut self.children {
            child.rebind_owner(owner);
        }
    }

    pub(crate) fn refresh(&mut self, transform: &Transform) {
        for child in &mut self.children {
            child.update_transforms(transform);
        }
    }

    pub(crate) fn collide(&self, p0: Vec3, p1: Vec3, radius: f32) -> Option<ContactRecord> {
        let mut best: Option<ContactRecord> = None;

        for (index, child) in self.children.iter().enumerate() {
            if !Self::near_child(child, p0, p1, radius) {
                continue;
            }

            if let Some(record) = child.collide(p0, p1, radius) {
                let closer = best
                    .as_ref()
                    .map_or(true, |winner| record.dist_sq < winner.dist_sq);
                if closer {
                    best = Some(record.with_child(index));
                }
            }
        }

        best
    }

    /// Cheap sphere cull before the child's full test. A start inside the
    /// expanded bound always qualifies since the segment test assumes an
    /// outside start.
    fn near_child(child: &Primitive, p0: Vec3, p1: Vec3, radius: f32) -> bool {
        let bound = child.world_sphere();
        let expanded = bound.radius + radius;
        if p0.distance_squared(bound.center) <= expanded * expanded {
            return true;
        }
        ray::ray_sphere(bound.center, expanded, p0, p1).is_some()
    }
}
