use atom_physics::*;

fn main() -> Result<()> {
    env_logger::init();

    let config = SimulationConfig::default().with_grid(16.0, 40, 40);
    let mut world = PhysicsWorld::new(config)?;

    let target = world.create_body(false);
    for i in 0..5 {
        world.add_atom(target, Vec2::new(400.0, 200.0 + i as f32 * 16.0), 8.0, 1.0)?;
    }
    world.update(1.0 / 60.0);

    let hit = world.cast_ray_marked(Vec2::new(20.0, 230.0), Vec2::X, 600.0);
    match hit {
        Some(hit) => println!(
            "Ray hit cell {:?} at distance {:.1} (atom {:?})",
            hit.coords, hit.distance, hit.atom
        ),
        None => println!("Ray missed"),
    }

    world.render();
    let marked = world.snapshot().cells.iter().filter(|c| c.marked).count();
    println!("{marked} cells visited");
    Ok(())
}
