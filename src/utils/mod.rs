//! Utility helpers: the generational actor arena and logging timers.

pub mod allocator;
pub mod logging;

pub use allocator::{ActorId, Arena, GenerationalId};
