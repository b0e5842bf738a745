use glam::Vec3;
use swept_collide::*;

const DT: f32 = 1.0 / 60.0;

fn spawn_mover(world: &mut CollisionWorld, position: Vec3, radius: f32) -> ActorId {
    let mut actor = ActorState::at(position);
    actor.collision_radius = radius;
    let id = world.add_actor(actor);
    world.register_mover(id);
    id
}

fn spawn_wall(world: &mut CollisionWorld, min: Vec3, max: Vec3) -> ActorId {
    let id = world.add_actor(ActorState::at(Vec3::ZERO));
    world.register_blocker(Primitive::slab(id, min, max));
    id
}

fn move_to(world: &mut CollisionWorld, id: ActorId, position: Vec3) {
    world.actor_mut(id).unwrap().transform.position = position;
}

#[test]
fn registration_is_per_entry_and_unregister_removes_all() {
    let mut world = CollisionWorld::new();
    let id = spawn_mover(&mut world, Vec3::ZERO, 0.5);

    world.register_mover(id);
    assert_eq!(world.movers().len(), 2, "double registration keeps both");

    world.unregister_mover(id);
    assert!(world.movers().is_empty());

    world.register_blocker(Primitive::slab(id, Vec3::splat(-1.0), Vec3::ONE));
    world.register_blocker(Primitive::slab(id, Vec3::splat(-2.0), Vec3::splat(2.0)));
    assert_eq!(world.things().len(), 2);
    world.unregister_blocker(id);
    assert!(world.things().is_empty());
}

#[test]
fn blockers_survive_registration_for_unknown_owners() {
    let mut world = CollisionWorld::new();
    // No actor behind this id; the shape still registers, it just stays
    // unsynced until an owner shows up.
    let orphan = ActorId::from_index(7);
    world.register_blocker(Primitive::slab(orphan, Vec3::splat(-1.0), Vec3::ONE));
    assert_eq!(world.things().len(), 1);
}

#[test]
fn removing_an_actor_drops_its_movers_and_blockers() {
    let mut world = CollisionWorld::new();
    let id = spawn_mover(&mut world, Vec3::ZERO, 0.5);
    world.register_blocker(Primitive::slab(id, Vec3::splat(-1.0), Vec3::ONE));
    world.set_last_cloned(Some(id));

    assert!(world.remove_actor(id).is_some());
    assert!(world.movers().is_empty());
    assert!(world.things().is_empty());
    assert!(world.last_cloned().is_none());
    assert!(world.actor(id).is_none());
}

#[test]
fn refresh_mover_collision_rereads_the_radius() {
    let mut world = CollisionWorld::new();
    let id = spawn_mover(&mut world, Vec3::new(1.0, 2.0, 3.0), 0.5);

    world.actor_mut(id).unwrap().collision_radius = 1.25;
    world.refresh_mover_collision(id);

    assert_eq!(world.movers()[0].radius(), 1.25);
    assert!((world.movers()[0].center() - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
}

#[test]
fn mover_stops_on_a_slab_face() {
    let mut world = CollisionWorld::new();
    let wall = spawn_wall(&mut world, Vec3::new(-5.0, -5.0, 0.0), Vec3::new(5.0, 5.0, 1.0));
    let walker = spawn_mover(&mut world, Vec3::new(0.0, 0.0, 3.0), 0.5);

    world.update(DT);
    assert!(world.actor(walker).unwrap().hits.is_empty(), "no motion yet");

    move_to(&mut world, walker, Vec3::new(0.0, 0.0, 0.5));
    world.update(DT);

    let actor = world.actor(walker).unwrap();
    assert_eq!(actor.hits.len(), 1);
    let hit = &actor.hits[0];
    assert_eq!(hit.other, wall);
    assert!(!hit.touching);
    assert!(!hit.handled);
    assert!((hit.contact - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-3, "contact {}", hit.contact);
    assert!((hit.center - Vec3::new(0.0, 0.0, 1.5)).length() < 1e-3, "center {}", hit.center);
    assert!((hit.dist_sq - 2.25).abs() < 1e-3, "dist_sq {}", hit.dist_sq);
    assert!(hit.timestamp > 0.0);

    // Pulled back so the sphere rests on the face instead of sinking in.
    let position = actor.transform.position;
    assert!((position - Vec3::new(0.0, 0.0, 1.5)).length() < 1e-3, "position {position}");

    let mirrored = &world.actor(wall).unwrap().hits;
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].other, walker);
    assert!(mirrored[0].handled);
    assert!((mirrored[0].normal - Vec3::NEG_Z).length() < 1e-3);
}

#[test]
fn mover_pair_resolves_in_the_earlier_movers_turn() {
    let mut world = CollisionWorld::new();
    let a = spawn_mover(&mut world, Vec3::new(0.0, 0.0, 5.0), 0.5);
    let b = spawn_mover(&mut world, Vec3::new(2.5, 0.0, 5.0), 0.5);

    world.update(DT);
    move_to(&mut world, a, Vec3::new(2.0, 0.0, 5.0));
    world.update(DT);

    let hitter = world.actor(a).unwrap();
    assert_eq!(hitter.hits.len(), 1);
    assert_eq!(hitter.hits[0].other, b);
    assert!(!hitter.hits[0].handled);
    assert!((hitter.hits[0].struck - Vec3::new(2.5, 0.0, 5.0)).length() < 1e-3);
    // Stopped a combined radius short of the other center.
    let position = hitter.transform.position;
    assert!((position - Vec3::new(1.5, 0.0, 5.0)).length() < 1e-3, "position {position}");

    // The struck mover got the mirrored record during a's sweep; its own
    // sweep never revisits the pair.
    let struck = world.actor(b).unwrap();
    assert_eq!(struck.hits.len(), 1);
    assert_eq!(struck.hits[0].other, a);
    assert!(struck.hits[0].handled);
    assert!((struck.hits[0].normal - Vec3::X).length() < 1e-3);
    assert!((struck.hits[0].center - Vec3::new(2.5, 0.0, 5.0)).length() < 1e-3);
    assert!((struck.transform.position - Vec3::new(2.5, 0.0, 5.0)).length() < 1e-6);
}

#[test]
fn test_all_sorts_nearest_first_and_appends() {
    let mut world = CollisionWorld::new();
    let near = spawn_wall(&mut world, Vec3::new(2.0, -2.0, 4.0), Vec3::new(3.0, 2.0, 6.0));
    let far = spawn_wall(&mut world, Vec3::new(6.0, -2.0, 4.0), Vec3::new(7.0, 2.0, 6.0));

    let p0 = Vec3::new(0.0, 0.0, 5.0);
    let p1 = Vec3::new(10.0, 0.0, 5.0);

    let mut hits = Vec::new();
    assert!(world.test_all(p0, p1, 0.5, &mut hits));
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].other, near);
    assert_eq!(hits[1].other, far);
    assert!((hits[0].dist_sq - 2.25).abs() < 1e-3, "near dist_sq {}", hits[0].dist_sq);
    assert!((hits[1].dist_sq - 30.25).abs() < 1e-3, "far dist_sq {}", hits[1].dist_sq);

    // Append-only contract: a second query grows the same list and keeps
    // it sorted as a whole.
    assert!(world.test_all(p0, p1, 0.5, &mut hits));
    assert_eq!(hits.len(), 4);
    assert!(hits.windows(2).all(|w| w[0].dist_sq <= w[1].dist_sq));
}

#[test]
fn test_best_clamps_the_sweep_at_the_nearest_surface() {
    let mut world = CollisionWorld::new();
    let near = spawn_wall(&mut world, Vec3::new(2.0, -2.0, 4.0), Vec3::new(3.0, 2.0, 6.0));
    spawn_wall(&mut world, Vec3::new(6.0, -2.0, 4.0), Vec3::new(7.0, 2.0, 6.0));

    let mut hits = Vec::new();
    assert!(world.test_best(
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::new(10.0, 0.0, 5.0),
        0.5,
        &mut hits
    ));
    assert_eq!(hits.len(), 1, "only the nearest surface reports");
    assert_eq!(hits[0].other, near);
}

#[test]
fn blocker_hit_shields_movers_behind_it() {
    let mut world = CollisionWorld::new();
    let wall = spawn_wall(&mut world, Vec3::new(2.0, -2.0, 4.0), Vec3::new(3.0, 2.0, 6.0));
    let runner = spawn_mover(&mut world, Vec3::new(0.0, 0.0, 5.0), 0.5);
    let bystander = spawn_mover(&mut world, Vec3::new(4.0, 0.0, 5.0), 0.5);

    world.update(DT);
    move_to(&mut world, runner, Vec3::new(5.0, 0.0, 5.0));
    world.update(DT);

    let actor = world.actor(runner).unwrap();
    assert_eq!(actor.hits.len(), 1);
    assert_eq!(actor.hits[0].other, wall);
    let position = actor.transform.position;
    assert!((position - Vec3::new(1.5, 0.0, 5.0)).length() < 1e-3, "position {position}");

    // The clamped sweep never reaches the mover on the far side.
    let other = world.actor(bystander).unwrap();
    assert!(other.hits.is_empty());
    assert!((other.transform.position - Vec3::new(4.0, 0.0, 5.0)).length() < 1e-6);
}

#[test]
fn touching_a_wall_pushes_out_and_releases() {
    let mut world = CollisionWorld::new();
    let wall = spawn_wall(&mut world, Vec3::new(-3.0, -2.0, 4.0), Vec3::new(-2.0, 2.0, 6.0));
    let walker = spawn_mover(&mut world, Vec3::new(-1.52, 0.0, 5.0), 0.5);

    world.update(DT);

    let actor = world.actor(walker).unwrap();
    assert_eq!(actor.hits.len(), 1);
    assert!(actor.hits[0].touching);
    assert_eq!(actor.hits[0].other, wall);
    // Push-out carries the overlap margin: 0.02 overlap scaled by 1.05.
    let position = actor.transform.position;
    assert!((position.x - -1.499).abs() < 1e-3, "position {position}");

    // Walking away: the contact is behind the motion, nothing reports.
    move_to(&mut world, walker, Vec3::new(1.0, 0.0, 5.0));
    world.update(DT);
    let actor = world.actor(walker).unwrap();
    assert!(actor.hits.is_empty());
    assert!((actor.transform.position - Vec3::new(1.0, 0.0, 5.0)).length() < 1e-6);
}

#[test]
fn resting_contact_blanks_the_rest_of_the_sweep() {
    let mut world = CollisionWorld::new();
    let near_wall = spawn_wall(&mut world, Vec3::new(-3.0, -2.0, 4.0), Vec3::new(-2.0, 2.0, 6.0));
    let far_wall = spawn_wall(&mut world, Vec3::new(2.0, -2.0, 4.0), Vec3::new(3.0, 2.0, 6.0));

    let walker = spawn_mover(&mut world, Vec3::new(-1.52, 0.0, 5.0), 0.5);
    world.actor_mut(walker).unwrap().fixed_position = true;

    world.update(DT);
    // Sprint across the room, straight through the far wall's plane.
    move_to(&mut world, walker, Vec3::new(1.0, 0.0, 5.0));
    world.update(DT);

    // The resting contact against the near wall clamps the query down to a
    // zero-length sweep, so the far wall never gets a say.
    let actor = world.actor(walker).unwrap();
    assert_eq!(actor.hits.len(), 1);
    assert_eq!(actor.hits[0].other, near_wall);
    assert!(actor.hits[0].touching);
    assert!(world.actor(far_wall).unwrap().hits.is_empty());
    assert!((actor.transform.position - Vec3::new(1.0, 0.0, 5.0)).length() < 1e-6);
}

#[test]
fn clock_advances_and_stamps_records() {
    let mut world = CollisionWorld::new();
    assert_eq!(world.clock(), 0.0);
    world.update(DT);
    world.update(DT);
    assert!((world.clock() - f64::from(DT) * 2.0).abs() < 1e-9);
}
