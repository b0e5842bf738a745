use glam::Vec3;

use crate::config;
use crate::utils::allocator::ActorId;

/// Collision info used internally while sweeping a sphere through the world.
///
/// `normal` is unit length and points from the struck surface toward the
/// sphere. Primitives that cannot produce a meaningful direction fall back
/// to `+Z`.
#[derive(Debug, Clone, Copy)]
pub struct ContactRecord {
    /// Actor owning the primitive or mover that was struck.
    pub owner: ActorId,
    /// Squared distance the sphere center traveled before impact. Exactly
    /// zero for contacts already present at the start of the frame.
    pub dist_sq: f32,
    /// Sphere center at contact time.
    pub center: Vec3,
    /// Point of contact on the struck surface.
    pub contact: Vec3,
    /// Surface normal at the contact, pointing toward the sphere.
    pub normal: Vec3,
    /// Center of the other body at impact when it was a mover, zero otherwise.
    pub struck: Vec3,
    /// True if the pair was already in contact at the frame start.
    pub touching: bool,
    /// Index of the child primitive hit, for compound bodies.
    pub child: Option<usize>,
}

fn normal_or_up(normal: Vec3) -> Vec3 {
    if normal.length_squared() == 0.0 {
        Vec3::Z
    } else {
        normal
    }
}

impl ContactRecord {
    /// Contact reached partway through the step. `from` is where the sweep
    /// started; `center` is the sphere center at impact.
    pub fn swept(owner: ActorId, from: Vec3, center: Vec3, contact: Vec3, normal: Vec3) -> Self {
        Self {
            owner,
            dist_sq: from.distance_squared(center),
            center,
            contact,
            normal: normal_or_up(normal),
            struck: Vec3::ZERO,
            touching: false,
            child: None,
        }
    }

    /// Contact already present at the start of the step.
    pub fn touching(owner: ActorId, center: Vec3, contact: Vec3, normal: Vec3) -> Self {
        Self {
            owner,
            dist_sq: 0.0,
            center,
            contact,
            normal: normal_or_up(normal),
            struck: Vec3::ZERO,
            touching: true,
            child: None,
        }
    }

    pub fn with_struck(mut self, struck: Vec3) -> Self {
        self.struck = struck;
        self
    }

    pub fn with_child(mut self, child: usize) -> Self {
        self.child = Some(child);
        self
    }
}

/// Collision reporting struct handed to the outside world.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// The actor getting hit by you.
    pub other: ActorId,
    /// Index of the other mover when the struck body was one.
    pub(crate) other_mover: Option<usize>,
    /// Where your center was when you got hit.
    pub center: Vec3,
    /// Point of contact.
    pub contact: Vec3,
    /// Amount you will have to move to stop colliding with `other`.
    pub offset: Vec3,
    /// Where the other body's center was at impact. Zero for non-movers.
    pub struck: Vec3,
    /// Unit surface normal at the contact point.
    pub normal: Vec3,
    /// True if the pair was already in contact at the beginning of the frame.
    pub touching: bool,
    /// Set by consumers on the reciprocating half of a pair so the second
    /// notification can be told apart from the first.
    pub handled: bool,
    /// Squared center travel before impact, used for sorting.
    pub dist_sq: f32,
    /// World clock reading when the hit was recorded.
    pub timestamp: f64,
}

impl HitRecord {
    /// Builds the outward-facing record for a contact. `radius` is the
    /// sphere radius used for the push-out offset.
    pub(crate) fn from_contact(
        info: &ContactRecord,
        other_mover: Option<usize>,
        radius: f32,
        timestamp: f64,
    ) -> Self {
        let mut hit = Self {
            other: info.owner,
            other_mover,
            center: info.center,
            contact: info.contact,
            offset: Vec3::ZERO,
            struck: info.struck,
            normal: info.normal.normalize_or(Vec3::Z),
            touching: info.touching,
            handled: false,
            dist_sq: info.dist_sq,
            timestamp,
        };
        hit.offset = hit.compute_offset(radius);
        hit
    }

    /// Displacement that pushes a sphere of `radius` centered at
    /// `self.center` clear of the contact. Zero when the sphere is not
    /// penetrating. Padded so the pair does not immediately re-collide.
    pub fn compute_offset(&self, radius: f32) -> Vec3 {
        if self.center.distance_squared(self.contact) < radius * radius {
            let new_center = self.contact + self.normal * radius;
            return (new_center - self.center) * config::PUSH_OUT_MARGIN;
        }
        Vec3::ZERO
    }
}

/// Touch reported by the cushion pass: a near miss directly below an actor.
#[derive(Debug, Clone, Copy)]
pub struct TouchRecord {
    /// The actor that was touched.
    pub other: ActorId,
    /// Other actor's position minus the touching actor's position.
    pub offset: Vec3,
    /// Distance from the sweep center to the contact point.
    pub distance: f32,
}
