use glam::{Mat4, Vec3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::core::types::{BoundingSphere, Transform};
use crate::utils::allocator::ActorId;

use super::compound::Compound;
use super::contact::ContactRecord;
use super::cylinder::Cylinder;
use super::ellipsoid::Ellipsoid;
use super::rectangle::Rectangle;

/// The shape carried by a [`Primitive`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShapeKind {
    Ellipsoid(Ellipsoid),
    Cylinder(Cylinder),
    Rectangle(Rectangle),
    Compound(Compound),
}

/// A static collision body: one shape plus the cached transforms placing it
/// in the world.
///
/// [`Primitive::update_transforms`] must run once per frame before any
/// `collide` call in that frame. There is no error for skipping it, the
/// tests just run against wherever the owner stood when last refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primitive {
    owner: ActorId,
    /// Extra transform between the owner's root and this shape's local
    /// space, for shapes tied to an animated bone.
    bone: Option<Mat4>,
    shape: ShapeKind,
    local_sphere: BoundingSphere,
    #[serde(skip)]
    local_to_world: Mat4,
    #[serde(skip)]
    world_to_local: Mat4,
    #[serde(skip)]
    world_to_local_radius: f32,
    #[serde(skip)]
    world_sphere: BoundingSphere,
    #[serde(skip)]
    synced: bool,
}

impl Primitive {
    fn with_shape(owner: ActorId, shape: ShapeKind, local_sphere: BoundingSphere) -> Self {
        Self {
            owner,
            bone: None,
            shape,
            local_sphere,
            local_to_world: Mat4::IDENTITY,
            world_to_local: Mat4::IDENTITY,
            world_to_local_radius: 1.0,
            world_sphere: local_sphere,
            synced: false,
        }
    }

    /// Ellipsoid filling the local box.
    pub fn ellipsoid(owner: ActorId, min: Vec3, max: Vec3) -> Self {
        let (shape, sphere) = Ellipsoid::from_box(min, max);
        Self::with_shape(owner, ShapeKind::Ellipsoid(shape), sphere)
    }

    /// Z-axis cylinder extracted from the local box.
    pub fn cylinder(owner: ActorId, min: Vec3, max: Vec3) -> Self {
        let (shape, sphere) = Cylinder::from_box(min, max);
        Self::with_shape(owner, ShapeKind::Cylinder(shape), sphere)
    }

    /// Single face of the local box, facing along `axis`.
    pub fn rectangle(owner: ActorId, min: Vec3, max: Vec3, axis: Vec3) -> Self {
        let (shape, sphere) = Rectangle::from_box(min, max, axis);
        Self::with_shape(owner, ShapeKind::Rectangle(shape), sphere)
    }

    /// Box tested as its six faces.
    pub fn slab(owner: ActorId, min: Vec3, max: Vec3) -> Self {
        let axes = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ];
        let children = axes
            .iter()
            .map(|&axis| Self::rectangle(owner, min, max, axis))
            .collect();
        Self::compound(owner, children)
    }

    /// Arbitrary group of primitives tested as one body.
    pub fn compound(owner: ActorId, children: Vec<Primitive>) -> Self {
        let (shape, sphere) = Compound::new(children);
        Self::with_shape(owner, ShapeKind::Compound(shape), sphere)
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn shape(&self) -> &ShapeKind {
        &self.shape
    }

    pub fn bone(&self) -> Option<&Mat4> {
        self.bone.as_ref()
    }

    pub fn set_bone(&mut self, bone: Option<Mat4>) {
        self.bone = bone;
        self.synced = false;
    }

    pub fn local_sphere(&self) -> &BoundingSphere {
        &self.local_sphere
    }

    pub fn world_sphere(&self) -> &BoundingSphere {
        &self.world_sphere
    }

    pub fn local_to_world(&self) -> &Mat4 {
        &self.local_to_world
    }

    pub fn world_to_local(&self) -> &Mat4 {
        &self.world_to_local
    }

    /// Converts a world-space radial distance into this primitive's local
    /// space. Only exact for uniform scale, which is all the owners use.
    pub fn world_to_local_radius(&self, world_radius: f32) -> f32 {
        world_radius * self.world_to_local_radius
    }

    /// Recomputes the cached world transforms from the owner's transform
    /// and the bone matrix, then refreshes the world bounding sphere and
    /// any shape-level caches.
    pub fn update_transforms(&mut self, transform: &Transform) {
        let root_to_world = transform.to_matrix();
        let local_to_world = match self.bone {
            Some(bone) => root_to_world * bone,
            None => root_to_world,
        };
        let world_to_local = local_to_world.inverse();

        let mut scale = world_to_local.x_axis.truncate().length();
        if !scale.is_finite() || scale <= config::SCALE_EPSILON {
            warn!(
                "primitive for {:?} has a degenerate scale, clamping to 1",
                self.owner
            );
            scale = 1.0;
        }

        self.local_to_world = local_to_world;
        self.world_to_local = world_to_local;
        self.world_to_local_radius = scale;
        self.world_sphere = BoundingSphere::new(
            local_to_world.transform_point3(self.local_sphere.center),
            self.local_sphere.radius / scale,
        );

        match &mut self.shape {
            ShapeKind::Rectangle(rect) => rect.refresh(&local_to_world, &world_to_local),
            ShapeKind::Compound(compound) => compound.refresh(transform),
            _ => {}
        }
        self.synced = true;
    }

    /// Sweeps a sphere from `start` to `end` against this primitive.
    /// `None` means a clean miss.
    pub fn collide(&self, start: Vec3, end: Vec3, radius: f32) -> Option<ContactRecord> {
        debug_assert!(self.synced, "update_transforms must run before collide");
        match &self.shape {
            ShapeKind::Ellipsoid(shape) => shape.collide(self, start, end, radius),
            ShapeKind::Cylinder(shape) => shape.collide(self, start, end, radius),
            ShapeKind::Rectangle(shape) => shape.collide(self, start, end, radius),
            ShapeKind::Compound(shape) => shape.collide(start, end, radius),
        }
    }

    /// Deep copy rebound to a new owner, as when an actor is duplicated.
    /// The copy's transforms need refreshing before use.
    pub fn clone_for(&self, owner: ActorId) -> Self {
        let mut copy = self.clone();
        copy.rebind_owner(owner);
        copy
    }

    pub(crate) fn rebind_owner(&mut self, owner: ActorId) {
        self.owner = owner;
        self.synced = false;
        if let ShapeKind::Compound(compound) = &mut self.shape {
            compound.rebind_owner(owner);
        }
    }
}
