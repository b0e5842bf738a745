use glam::Vec3;

use crate::core::actor::ActorState;
use crate::utils::allocator::ActorId;

use super::contact::ContactRecord;
use super::ray;

/// A dynamic sphere registered for collision testing.
///
/// `center` holds the start-of-frame position and `delta` the motion the
/// owner wants to make this frame. Collision response rewrites `delta` in
/// place, so later tests within the same frame see the corrected path.
#[derive(Debug, Clone)]
pub struct Mover {
    pub(crate) actor: ActorId,
    pub(crate) radius: f32,
    pub(crate) center: Vec3,
    pub(crate) delta: Vec3,
    prev_position: Option<Vec3>,
}

impl Mover {
    pub(crate) fn new(actor: &ActorState) -> Self {
        Self {
            actor: actor.id,
            radius: actor.collision_radius,
            center: actor.world_collision_center(),
            delta: Vec3::ZERO,
            prev_position: None,
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Start-of-frame collision center.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Motion still pending for this frame.
    pub fn delta(&self) -> Vec3 {
        self.delta
    }

    /// Rebuilds `delta` from how far the owner moved since the last refresh
    /// and backdates `center` to the start of that motion. The first refresh
    /// after registration sees no motion.
    pub(crate) fn update_transforms(&mut self, actor: &ActorState) {
        let position = actor.transform.position;
        self.delta = match self.prev_position {
            Some(prev) => position - prev,
            None => Vec3::ZERO,
        };
        self.prev_position = Some(position);
        self.center = actor.world_collision_center() - self.delta;
    }

    /// Sweeps a sphere along `p0..p1` against this mover. Folding this
    /// mover's own motion out of the path reduces the test to a swept
    /// sphere against a stationary one.
    pub(crate) fn collide(&self, p0: Vec3, p1: Vec3, radius: f32) -> Option<ContactRecord> {
        let combined = radius + self.radius;
        let rel_end = p1 - self.delta;

        if p0.distance_squared(self.center) <= combined * combined {
            let normal = (p0 - self.center).normalize_or(Vec3::Z);
            let contact = self.center + normal * self.radius;
            return Some(
                ContactRecord::touching(self.actor, p0, contact, normal).with_struck(self.center),
            );
        }

        let t = ray::ray_sphere(self.center, combined, p0, rel_end)?;
        let rel_pos = p0 + t * (rel_end - p0);
        let center = p0 + t * (p1 - p0);
        let struck = self.center + t * self.delta;
        let normal = (rel_pos - self.center).normalize_or(Vec3::Z);
        let contact = struck + normal * self.radius;

        Some(ContactRecord::swept(self.actor, p0, center, contact, normal).with_struck(struck))
    }
}
