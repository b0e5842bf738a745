//! Swept-sphere collision detection and response for actor worlds.
//!
//! The crate keeps a registry of actors, sweeps a sphere along each
//! registered mover's per-frame motion against blocker shapes and other
//! movers, and resolves what it finds: positions get nudged clear of
//! contacts, and hit, touch, and strike events are buffered on the actors
//! involved for the host to drain.

pub mod collision;
pub mod config;
pub mod core;
pub mod utils;
pub mod world;

pub use glam::{Mat4, Quat, Vec3};

pub use collision::{
    compound::Compound,
    contact::{ContactRecord, HitRecord, TouchRecord},
    cylinder::Cylinder,
    ellipsoid::Ellipsoid,
    mover::Mover,
    primitive::{Primitive, ShapeKind},
    rectangle::Rectangle,
};
pub use core::{
    actor::ActorState,
    types::{BoundingSphere, Transform},
};
pub use utils::allocator::{ActorId, Arena};
pub use world::CollisionWorld;
