use std::cmp::Ordering;
use std::mem;

use crate::{
    collision::{
        contact::{ContactRecord, HitRecord, TouchRecord},
        mover::Mover,
        primitive::Primitive,
    },
    config,
    core::actor::ActorState,
    utils::{
        allocator::{ActorId, Arena},
        logging::{warn_if_budget_exceeded, ScopedTimer},
    },
};
use glam::Vec3;
use log::warn;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Central collision container: the actors, the shapes registered to block
/// them, and the movers swept between them each frame.
///
/// Hosts mutate actor poses directly through the `actors` arena, then call
/// [`CollisionWorld::update`] once per frame. The update derives each mover's
/// motion from the pose change, sweeps it against everything registered, and
/// writes the outcome back into actor positions and event buffers.
pub struct CollisionWorld {
    pub actors: Arena<ActorState>,
    things: Vec<Primitive>,
    movers: Vec<Mover>,
    clock: f64,
    picked_up: Option<ActorId>,
    last_cloned: Option<ActorId>,
    scratch: Vec<HitRecord>,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            actors: Arena::new(),
            things: Vec::new(),
            movers: Vec::new(),
            clock: 0.0,
            picked_up: None,
            last_cloned: None,
            scratch: Vec::new(),
        }
    }

    /// Adds an actor and hands back its id. The stored copy has `id`
    /// patched so records naming this actor can be traced back to it.
    pub fn add_actor(&mut self, actor: ActorState) -> ActorId {
        let id = self.actors.insert(actor);
        if let Some(actor) = self.actors.get_mut(id) {
            actor.id = id;
        }
        id
    }

    /// Removes an actor along with every mover and blocker registered to it.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<ActorState> {
        self.unregister_mover(id);
        self.unregister_blocker(id);
        if self.picked_up == Some(id) {
            self.picked_up = None;
        }
        if self.last_cloned == Some(id) {
            self.last_cloned = None;
        }
        self.actors.remove(id)
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorState> {
        self.actors.get_mut(id)
    }

    /// Shapes currently registered as blockers.
    pub fn things(&self) -> &[Primitive] {
        &self.things
    }

    /// Movers currently registered, in sweep order.
    pub fn movers(&self) -> &[Mover] {
        &self.movers
    }

    /// World clock in seconds. Advanced by `update`, stamped onto records.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Marks the actor a player is currently carrying, if any.
    pub fn set_picked_up(&mut self, id: Option<ActorId>) {
        self.picked_up = id;
    }

    /// Marks a freshly spawned clone so the carried original can separate
    /// from it without colliding. The mark clears itself on the first update
    /// where the pair no longer overlaps.
    pub fn set_last_cloned(&mut self, id: Option<ActorId>) {
        self.last_cloned = id;
    }

    pub fn last_cloned(&self) -> Option<ActorId> {
        self.last_cloned
    }

    /// Starts sweeping the actor's collision sphere along its motion every
    /// frame. Registering the same actor twice sweeps it twice.
    pub fn register_mover(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get(id) else {
            warn!("register_mover: no actor {id:?}");
            return;
        };
        self.movers.push(Mover::new(actor));
    }

    /// Removes every mover entry registered for the actor.
    pub fn unregister_mover(&mut self, id: ActorId) {
        self.movers.retain(|mover| mover.actor() != id);
    }

    /// Adds a shape that movers collide against. The shape follows the
    /// transform of the actor named by [`Primitive::owner`].
    pub fn register_blocker(&mut self, mut primitive: Primitive) {
        match self.actors.get(primitive.owner()) {
            Some(owner) => primitive.update_transforms(&owner.transform),
            None => warn!("register_blocker: no actor {:?}", primitive.owner()),
        }
        self.things.push(primitive);
    }

    /// Removes every blocker registered for the actor.
    pub fn unregister_blocker(&mut self, id: ActorId) {
        self.things.retain(|thing| thing.owner() != id);
    }

    /// Re-reads the actor's collision radius and pose into its movers. Call
    /// after changing `collision_radius` outside the normal update flow.
    pub fn refresh_mover_collision(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        for mover in self.movers.iter_mut() {
            if mover.actor == id {
                mover.radius = actor.collision_radius;
                mover.update_transforms(actor);
            }
        }
    }

    /// Sweeps a sphere from `p0` to `p1` against everything registered and
    /// appends the closest hit to `hits`. Touching contacts found along the
    /// way are appended as well. Returns true when `hits` is non-empty on
    /// exit, so pre-existing entries count.
    pub fn test_best(&self, p0: Vec3, p1: Vec3, radius: f32, hits: &mut Vec<HitRecord>) -> bool {
        self.collision_check(p0, p1, Vec3::splat(radius), 0, false, hits)
    }

    /// Sweeps a sphere from `p0` to `p1` and appends every hit, leaving the
    /// list sorted nearest first. Returns true when `hits` is non-empty on
    /// exit.
    pub fn test_all(&self, p0: Vec3, p1: Vec3, radius: f32, hits: &mut Vec<HitRecord>) -> bool {
        self.collision_check(p0, p1, Vec3::splat(radius), 0, true, hits)
    }

    /// Advances the world one frame.
    ///
    /// Refreshes shape and mover transforms from actor poses, sweeps each
    /// mover in registration order against blockers and later movers,
    /// resolves whatever it finds, and runs the cushion pass for actors that
    /// request one. Results land in each actor's `hits`, `touched`, and
    /// `strikes` buffers, which are cleared at the start of the call.
    pub fn update(&mut self, dt: f32) {
        let timer = ScopedTimer::new("collision::update");
        self.clock += f64::from(dt);

        for actor in self.actors.iter_mut() {
            actor.clear_events();
        }

        {
            let _timer = ScopedTimer::new("collision::refresh");
            self.refresh_transforms();
        }

        let mut scratch = mem::take(&mut self.scratch);
        let mut clear_last_cloned = true;

        {
            let _timer = ScopedTimer::new("collision::resolve");
            for first in 0..self.movers.len() {
                let mover = &self.movers[first];
                let actor_id = mover.actor;
                let radius = mover.radius;
                let start = mover.center;
                let end = start + mover.delta;

                let Some(actor) = self.actors.get(actor_id) else {
                    continue;
                };
                if actor.ignored {
                    continue;
                }
                let radii = Vec3::splat(radius) * actor.squash_scale;
                let cushion = actor.touch_cushion;

                scratch.clear();
                if self.collision_check(start, end, radii, first + 1, false, &mut scratch) {
                    for hit in scratch.iter_mut() {
                        self.apply_collision(first, hit, &mut clear_last_cloned);
                    }
                }

                if cushion > 0.0 {
                    scratch.clear();
                    self.touch_below(first, actor_id, start, radius, cushion, radii, &mut scratch);
                }
            }
        }

        self.scratch = scratch;

        if clear_last_cloned {
            self.last_cloned = None;
        }

        warn_if_budget_exceeded("collision::update", timer.elapsed(), config::FRAME_BUDGET_MS);
    }

    /// Pushes actor poses into the registered shapes and movers.
    fn refresh_transforms(&mut self) {
        let actors = &self.actors;

        #[cfg(feature = "parallel")]
        self.things.par_iter_mut().for_each(|thing| {
            if let Some(owner) = actors.get(thing.owner()) {
                thing.update_transforms(&owner.transform);
            }
        });
        #[cfg(not(feature = "parallel"))]
        for thing in self.things.iter_mut() {
            if let Some(owner) = actors.get(thing.owner()) {
                thing.update_transforms(&owner.transform);
            }
        }

        for mover in self.movers.iter_mut() {
            if let Some(owner) = actors.get(mover.actor) {
                mover.update_transforms(owner);
            }
        }
    }

    /// Sweeps a sphere against registered blockers, then against movers from
    /// index `first` onward. `radii.z` drives the surface tests and `radii.x`
    /// the push-out offsets.
    ///
    /// With `list_all` set, every hit is appended and the whole list is
    /// sorted nearest first; the mover scan also restarts at index zero.
    /// Otherwise only the closest hit is appended, along with any touching
    /// contacts found on the way, and the sweep is clamped to each closest
    /// blocker hit in turn. Passing `first == n + 1` marks mover `n` as the
    /// sweep source: it skips itself, and missiles it launched skip it.
    fn collision_check(
        &self,
        start: Vec3,
        mut end: Vec3,
        radii: Vec3,
        first: usize,
        list_all: bool,
        hits: &mut Vec<HitRecord>,
    ) -> bool {
        let cur_mover = first.checked_sub(1);
        let mut best: Option<(ContactRecord, Option<usize>)> = None;

        for thing in self.things.iter() {
            let Some(owner) = self.actors.get(thing.owner()) else {
                continue;
            };
            if owner.ignored {
                continue;
            }
            let Some(record) = thing.collide(start, end, radii.z) else {
                continue;
            };

            if list_all {
                hits.push(HitRecord::from_contact(&record, None, radii.x, self.clock));
            } else if best.map_or(true, |(b, _)| record.dist_sq <= b.dist_sq) {
                // Later tests only need to reach the nearest surface so far.
                end = record.center;
                if record.touching {
                    hits.push(HitRecord::from_contact(&record, None, radii.x, self.clock));
                }
                best = Some((record, None));
            }
        }

        let first_mover = if list_all { 0 } else { first };
        for (second, other) in self.movers.iter().enumerate().skip(first_mover) {
            if Some(second) == cur_mover {
                continue;
            }
            let Some(owner) = self.actors.get(other.actor) else {
                continue;
            };
            if owner.ignored {
                continue;
            }
            // Missiles pass through whoever launched them.
            if let (Some(cur), Some(launcher)) = (cur_mover, owner.launcher) {
                if self.movers.get(cur).map_or(false, |m| m.actor == launcher) {
                    continue;
                }
            }

            let Some(record) = other.collide(start, end, radii.z) else {
                continue;
            };

            if list_all {
                hits.push(HitRecord::from_contact(
                    &record,
                    Some(second),
                    radii.x,
                    self.clock,
                ));
            } else if best.map_or(true, |(b, _)| record.dist_sq <= b.dist_sq) {
                if record.touching {
                    hits.push(HitRecord::from_contact(
                        &record,
                        Some(second),
                        radii.x,
                        self.clock,
                    ));
                }
                best = Some((record, Some(second)));
            }
        }

        if let Some((record, other_mover)) = best {
            if !record.touching {
                hits.push(HitRecord::from_contact(
                    &record,
                    other_mover,
                    radii.x,
                    self.clock,
                ));
            }
        }

        if list_all && hits.len() > 1 {
            hits.sort_by(|a, b| a.dist_sq.partial_cmp(&b.dist_sq).unwrap_or(Ordering::Equal));
        }

        !hits.is_empty()
    }

    /// Resolves one hit found for the mover at `first`: records the event on
    /// both actors, nudges the mover clear, and mirrors the contact onto the
    /// other party unless a missile is involved.
    fn apply_collision(&mut self, first: usize, hit: &mut HitRecord, clear_last_cloned: &mut bool) {
        let mover_actor = self.movers[first].actor;

        let (Some(me), Some(other)) = (self.actors.get(mover_actor), self.actors.get(hit.other))
        else {
            return;
        };

        // Carried actors never bump their carrier, in either role.
        if me.held_by == Some(hit.other) || other.held_by == Some(mover_actor) {
            return;
        }

        // A carried original still overlaps the clone it just spawned. The
        // pair passes through each other until they separate.
        if self.picked_up == Some(mover_actor) && self.last_cloned == Some(hit.other) {
            *clear_last_cloned = false;
            return;
        }

        let me_missile = me.missile;
        let me_launcher = me.launcher;
        let other_missile = other.missile;
        let other_launcher = other.launcher;
        let other_radius = other.collision_radius;

        if let Some(me) = self.actors.get_mut(mover_actor) {
            me.hits.push(*hit);
        }
        self.adjust_delta(Some(first), hit);

        if other_missile || me_missile {
            // Missiles log a strike on their victim instead of bouncing.
            // Launchers are immune to their own shots.
            if other_missile {
                if other_launcher != Some(mover_actor) {
                    let mut strike = *hit;
                    strike.other = mover_actor;
                    if let Some(missile) = self.actors.get_mut(hit.other) {
                        missile.strikes.push(strike);
                    }
                }
            } else if me_launcher != Some(hit.other) {
                if let Some(missile) = self.actors.get_mut(mover_actor) {
                    missile.strikes.push(*hit);
                }
            }
        } else {
            // Mirror the contact so the struck party reacts too.
            let target = hit.other;
            hit.center = hit.struck;
            hit.normal = -hit.normal;
            hit.handled = true;
            hit.other = mover_actor;
            hit.offset = hit.compute_offset(other_radius);
            if let Some(other) = self.actors.get_mut(target) {
                other.hits.push(*hit);
            }
            self.adjust_delta(hit.other_mover, hit);
        }
    }

    /// Shortens a mover's pending motion so it ends clear of the contact,
    /// and shifts its actor to match.
    fn adjust_delta(&mut self, mover_index: Option<usize>, hit: &HitRecord) {
        let Some(index) = mover_index else {
            return;
        };
        let Some(mover) = self.movers.get(index) else {
            return;
        };
        let actor_id = mover.actor;
        let center = mover.center;
        let old_delta = mover.delta;

        // Contacts behind the direction of travel never shorten it.
        if old_delta.dot(hit.contact - center) < 0.0 {
            return;
        }

        let Some(actor) = self.actors.get_mut(actor_id) else {
            return;
        };
        if actor.fixed_position {
            return;
        }

        let end_position = hit.center + hit.offset;
        let new_delta = end_position - center;
        actor.transform.position += new_delta - old_delta;
        if let Some(mover) = self.movers.get_mut(index) {
            mover.delta = new_delta;
        }
    }

    /// Cushion pass: looks straight down for surfaces within `cushion` of
    /// the sweep start and records the first qualifying one as a touch.
    #[allow(clippy::too_many_arguments)]
    fn touch_below(
        &mut self,
        first: usize,
        actor_id: ActorId,
        start: Vec3,
        radius: f32,
        cushion: f32,
        radii: Vec3,
        scratch: &mut Vec<HitRecord>,
    ) {
        // Other movers must sit below the actor's midsection to count.
        let max_height = start.z - radius * config::CUSHION_HEADROOM;
        let mut end = start;
        end.z -= cushion;

        if !self.collision_check(start, end, radii, first + 1, true, scratch) {
            return;
        }

        for hit in scratch.iter() {
            if hit.other == actor_id {
                continue;
            }
            if let Some(index) = hit.other_mover {
                if let Some(other) = self.movers.get(index) {
                    if other.center.z + other.radius >= max_height {
                        continue;
                    }
                }
            }

            let Some(other_position) = self.actors.get(hit.other).map(|a| a.transform.position)
            else {
                continue;
            };
            let distance = hit.center.distance(hit.contact);
            if let Some(actor) = self.actors.get_mut(actor_id) {
                actor.touched.push(TouchRecord {
                    other: hit.other,
                    offset: other_position - actor.transform.position,
                    distance,
                });
            }
            break;
        }
    }
}
