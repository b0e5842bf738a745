use crate::collision::contact::{HitRecord, TouchRecord};
use crate::config;
use crate::utils::allocator::ActorId;

use super::types::Transform;
use glam::Vec3;

/// Gameplay-facing state for one actor known to the collision world.
///
/// The world reads pose and tuning fields from here each frame and writes
/// collision events back into the `hits`, `touched`, and `strikes` buffers.
/// Hosts drain those buffers after `CollisionWorld::update` and own every
/// other field.
#[derive(Debug, Clone)]
pub struct ActorState {
    pub id: ActorId,
    pub transform: Transform,
    /// Radius of the sphere swept along this actor's motion.
    pub collision_radius: f32,
    /// Offset from the actor origin to its collision center, in local space.
    pub collision_center: Vec3,
    /// Per-axis multiplier applied to the sweep radius while squashed.
    pub squash_scale: Vec3,
    /// Extra straight-down reach used to report near-miss touches.
    pub touch_cushion: f32,
    /// While set, the actor neither collides nor blocks.
    pub ignored: bool,
    /// While set, collision response never displaces the actor.
    pub fixed_position: bool,
    /// Marks projectile actors that report strikes instead of bouncing.
    pub missile: bool,
    /// Actor that fired this one. Launchers are immune to their own shots.
    pub launcher: Option<ActorId>,
    /// Actor currently carrying this one, if any.
    pub held_by: Option<ActorId>,
    /// Collisions recorded against this actor during the last update.
    pub hits: Vec<HitRecord>,
    /// Cushion touches recorded during the last update.
    pub touched: Vec<TouchRecord>,
    /// Targets struck during the last update. Only missiles receive these.
    pub strikes: Vec<HitRecord>,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            id: ActorId::default(),
            transform: Transform::default(),
            collision_radius: config::DEFAULT_COLLISION_RADIUS,
            collision_center: Vec3::ZERO,
            squash_scale: Vec3::ONE,
            touch_cushion: 0.0,
            ignored: false,
            fixed_position: false,
            missile: false,
            launcher: None,
            held_by: None,
            hits: Vec::new(),
            touched: Vec::new(),
            strikes: Vec::new(),
        }
    }
}

impl ActorState {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Self::default()
        }
    }

    /// Collision center in world space.
    pub fn world_collision_center(&self) -> Vec3 {
        self.transform.transform_point(self.collision_center)
    }

    /// Empties all event buffers. The world calls this once per update
    /// before any sweeps run.
    pub fn clear_events(&mut self) {
        self.hits.clear();
        self.touched.clear();
        self.strikes.clear();
    }
}
