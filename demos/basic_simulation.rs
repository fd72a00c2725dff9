//! Basic physics simulation example
//!
//! Two cubes collide head-on above a fixed block while a soft cube falls
//! under gravity. Run with `RUST_LOG=debug` to see contacts as they happen.

use elastiphy::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    println!("elastiphy - Basic Simulation Example");
    println!("====================================\n");

    let dt = 1.0 / 60.0;
    let mut world = World::new(WorldConfig::default().with_time_step(dt))?
        .with_gravity(Vec3::new(0.0, -9.81, 0.0));

    // A fixed block: infinite mass, never moves
    let block = RigidBody::fixed(
        Transform::from_position(Vec3::new(0.0, -2.0, 0.0)),
        Arc::new(Mesh::cuboid(Vec3::new(4.0, 0.5, 4.0))),
    );
    world.register(block);
    println!("Created fixed block at Y=-2 (top surface at Y=-1.5)");

    // Two cubes flying towards each other
    let left = world.register(
        RigidBody::cube(1.0, 1.0)?
            .with_position(Vec3::new(-2.0, 2.0, 0.0))
            .with_velocity(Vec3::new(3.0, 0.0, 0.0)),
    );
    let right = world.register(
        RigidBody::cube(1.0, 1.0)?
            .with_position(Vec3::new(2.0, 2.0, 0.0))
            .with_velocity(Vec3::new(-3.0, 0.0, 0.0)),
    );
    println!("Created two unit cubes at X=-2 and X=2, approaching at 3 m/s each");

    let jelly = world.register(
        SoftBody::cube(1.0, 0.2, 400.0, 1.0)?.with_offset(Vec3::new(0.0, 6.0, 3.0)),
    );
    println!("Created a soft cube at Y=6\n");

    let total_time = 2.0;
    let steps = (total_time / dt) as usize;
    println!("Simulating {} seconds ({} steps at {}Hz)...\n", total_time, steps, 1.0 / dt);

    for i in 0..steps {
        world.simulate()?;

        for collision in world.contacts() {
            println!(
                "t={:.2}s: contact {:?}/{:?}, depth={:.3}",
                world.time(),
                collision.first,
                collision.second,
                collision.contact.depth
            );
        }

        // Print state every 30 frames (0.5 seconds)
        if i % 30 == 0 {
            for (name, handle) in [("left", left), ("right", right)] {
                if let Some(cube) = world.rigid_body(handle) {
                    let p = cube.position();
                    let v = cube.velocity();
                    println!(
                        "t={:.2}s: {} position=({:.3}, {:.3}, {:.3})",
                        world.time(),
                        name,
                        p.x,
                        p.y,
                        p.z
                    );
                    println!(
                        "t={:.2}s: {} velocity=({:.3}, {:.3}, {:.3})",
                        world.time(),
                        name,
                        v.x,
                        v.y,
                        v.z
                    );
                }
            }
            if let Some(soft) = world.soft_body(jelly) {
                let c = soft.center_of_mass();
                println!(
                    "t={:.2}s: soft cube center=({:.3}, {:.3}, {:.3})",
                    world.time(),
                    c.x,
                    c.y,
                    c.z
                );
            }
        }
    }

    println!("\nTotal kinetic energy: {:.3} J", world.kinetic_energy());
    Ok(())
}
