//! Collision modules: swept-sphere ray tests, shape primitives, movers, contact records.

pub mod compound;
pub mod contact;
pub mod cylinder;
pub mod ellipsoid;
pub mod mover;
pub mod primitive;
pub mod ray;
pub mod rectangle;

pub use compound::Compound;
pub use contact::{ContactRecord, HitRecord, TouchRecord};
pub use cylinder::Cylinder;
pub use ellipsoid::Ellipsoid;
pub use mover::Mover;
pub use primitive::{Primitive, ShapeKind};
pub use rectangle::Rectangle;
