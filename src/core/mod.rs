//! Core types describing actors and shared collision data.

pub mod actor;
pub mod types;

pub use actor::ActorState;
pub use types::{BoundingSphere, Transform};
