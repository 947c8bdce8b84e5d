use atom_physics::*;

/// Builds a `width` x `height` block of atoms as one body.
fn add_block(
    world: &mut PhysicsWorld,
    origin: Vec2,
    width: usize,
    height: usize,
) -> Result<BodyId> {
    let body = world.create_body(true);
    for y in 0..height {
        for x in 0..width {
            let offset = Vec2::new(x as f32, y as f32) * 16.0;
            world.add_atom(body, origin + offset, 8.0, 1.0)?;
        }
    }
    Ok(body)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut world = PhysicsWorld::new(SimulationConfig::default())?;

    let ground = world.create_body(false);
    for i in 0..60 {
        world.add_atom(ground, Vec2::new(200.0 + i as f32 * 16.0, 800.0), 8.0, 1.0)?;
    }

    let mut blocks = Vec::new();
    for level in 0..4 {
        let origin = Vec2::new(520.0, 720.0 - level as f32 * 70.0);
        blocks.push(add_block(&mut world, origin, 4, 3)?);
    }

    for _ in 0..240 {
        world.update(1.0 / 60.0);
    }

    for (level, id) in blocks.iter().enumerate() {
        if let Some(body) = world.body(*id) {
            println!(
                "block {level}: com {:?} speed {:.2} atoms {}",
                body.center_of_mass(),
                body.velocity().length(),
                body.atom_count()
            );
        }
    }
    println!(
        "Simulated {} frames, {} bodies, {} live contacts",
        world.frame(),
        world.bodies().len(),
        world.contacts().len()
    );
    Ok(())
}
