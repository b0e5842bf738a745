use swept_collide::*;

const DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    let mut world = CollisionWorld::new();

    // Corridor walls along X, one pillar in the middle of the walkway.
    let walls = world.add_actor(ActorState::at(Vec3::ZERO));
    world.register_blocker(Primitive::slab(
        walls,
        Vec3::new(-1.0, 1.5, 0.0),
        Vec3::new(13.0, 2.5, 2.0),
    ));
    world.register_blocker(Primitive::slab(
        walls,
        Vec3::new(-1.0, -2.5, 0.0),
        Vec3::new(13.0, -1.5, 2.0),
    ));

    let pillar = world.add_actor(ActorState::at(Vec3::new(6.0, 0.0, 0.0)));
    world.register_blocker(Primitive::cylinder(
        pillar,
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 2.0),
    ));

    let mut runner = ActorState::at(Vec3::new(0.0, 0.4, 0.5));
    runner.collision_radius = 0.5;
    let runner = world.add_actor(runner);
    world.register_mover(runner);

    // Walk the runner down the corridor; the pillar shoulders it aside.
    let mut bumps = 0;
    for _ in 0..240 {
        if let Some(actor) = world.actor_mut(runner) {
            actor.transform.position.x += 4.0 * DT;
        }
        world.update(DT);
        if let Some(actor) = world.actor(runner) {
            if !actor.hits.is_empty() {
                bumps += 1;
            }
        }
    }

    if let Some(actor) = world.actor(runner) {
        println!(
            "Runner finished at {} after {} contact frames",
            actor.transform.position, bumps
        );
    }
}
