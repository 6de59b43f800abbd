//! Hollowmere - entry point
//!
//! Builds the world for the selected scenario, wires the terminal
//! renderer and the persistence hooks to the engine, and runs the frame
//! loop. A fault escaping the loop writes a crash report before exit.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hollowmere::agents::prowler::Prowler;
use hollowmere::agents::vendor::Vendor;
use hollowmere::agents::villager::Villager;
use hollowmere::agents::{Entity, EntityKind};
use hollowmere::core::config::SimulationConfig;
use hollowmere::core::types::Vec2;
use hollowmere::engine::Engine;
use hollowmere::persistence;
use hollowmere::render::TerminalRenderer;
use hollowmere::world::structures::StructureKind;
use hollowmere::world::terrain::ScenarioKind;
use hollowmere::world::WorldModel;
use hollowmere::Result;

const VILLAGER_NAMES: [&str; 15] = [
    "Juan", "Maria", "Pedro", "Lucia", "Diego", "Elena", "Mario", "Sofia", "Carlos", "Ana",
    "Luis", "Marta", "Ramon", "Ines", "Jose",
];

#[derive(Parser, Debug)]
#[command(name = "hollowmere", about = "Tick-driven village life simulation")]
struct Args {
    /// World generator to run
    #[arg(long, value_enum, default_value = "meadow")]
    scenario: ScenarioKind,

    /// RNG seed; defaults to the wall clock
    #[arg(long)]
    seed: Option<u64>,

    /// Number of villagers to spawn
    #[arg(long, default_value_t = 15)]
    population: usize,

    /// Target frames per second
    #[arg(long, default_value_t = 20)]
    fps: u32,

    /// Run without the terminal UI for this many frames, then print a
    /// summary and exit
    #[arg(long)]
    headless_frames: Option<u64>,

    /// Resume from a snapshot file instead of generating a fresh world
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("fatal: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "hollowmere=warn".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = SimulationConfig::default();
    cfg.fps = args.fps;
    cfg.validate()?;

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let world = match &args.load {
        Some(path) => {
            tracing::info!(path = %path.display(), "resuming from snapshot");
            WorldModel::restore(persistence::load_snapshot(path)?)?
        }
        None => build_world(args.scenario, seed, args.population, &cfg, &mut rng),
    };

    let mut engine = Engine::new(world, cfg, rng);
    engine.log_mut().push("The village wakes up.");

    if let Some(frames) = args.headless_frames {
        let dt = 1.0 / args.fps as f32;
        engine.run_for(frames, dt);
        print_summary(&engine);
        return Ok(());
    }

    let renderer = TerminalRenderer::new()?;
    engine.register_observer(Box::new(renderer));
    engine.set_save_hook(Box::new(|snapshot| {
        let path = persistence::save_snapshot(snapshot, Path::new(persistence::SAVE_DIR))?;
        Ok(format!("Game saved to {}.", path.display()))
    }));

    if let Err(err) = engine.run() {
        let context = format!(
            "tick {} with {} entities",
            engine.world().tick_count,
            engine.world().registry.len()
        );
        match persistence::write_crash_report(Path::new(persistence::SAVE_DIR), &context, &err) {
            Ok(path) => tracing::error!(path = %path.display(), "crash report written"),
            Err(report_err) => tracing::error!(%report_err, "could not write crash report"),
        }
        return Err(err);
    }
    Ok(())
}

/// Fresh world: the town hall at the origin, a vendor stall and a fence
/// line nearby, villagers scattered around home, two prowlers at the
/// fringes.
fn build_world(
    scenario: ScenarioKind,
    seed: u64,
    population: usize,
    cfg: &SimulationConfig,
    rng: &mut ChaCha8Rng,
) -> WorldModel {
    let mut world = WorldModel::new(scenario, seed, cfg);

    let building = world.map.add_building((0, 0));
    let home = Vec2::new(0.5, 0.5);
    world.spawn(Entity::new("Hearth Hall", home, EntityKind::Home { building }));
    world.spawn(Entity::new(
        "Stall",
        Vec2::new(6.5, 3.5),
        EntityKind::Vendor(Vendor::new()),
    ));

    // A bit of pre-built clutter so the overlay layer is exercised from
    // the first frame
    for x in -9..=-5 {
        world.map.add_structure((x, 6), StructureKind::Fence);
    }
    for y in -3..=0 {
        world.map.add_structure((-6, y), StructureKind::Road);
    }

    for i in 0..population {
        let base = VILLAGER_NAMES[i % VILLAGER_NAMES.len()];
        let name = if i < VILLAGER_NAMES.len() {
            base.to_string()
        } else {
            format!("{base} {}", i / VILLAGER_NAMES.len() + 1)
        };
        let pos = Vec2::new(rng.gen_range(-15.0..15.0), rng.gen_range(-15.0..15.0));
        let villager = Villager::new(home, building, cfg, rng);
        world.spawn(Entity::new(name, pos, EntityKind::Villager(villager)));
    }

    for i in 0..2 {
        let pos = Vec2::new(
            rng.gen_range(25.0..40.0) * if i == 0 { 1.0 } else { -1.0 },
            rng.gen_range(25.0..40.0),
        );
        world.spawn(Entity::new(
            format!("Prowler {}", i + 1),
            pos,
            EntityKind::Prowler(Prowler::new(pos)),
        ));
    }

    tracing::info!(
        scenario = ?scenario,
        seed,
        population,
        "world built"
    );
    world
}

fn print_summary(engine: &Engine) {
    let world = engine.world();
    println!(
        "--- headless run done: tick {}, {} entities ---",
        world.tick_count,
        world.registry.len()
    );
    for entity in world.registry.iter() {
        if let Some(v) = entity.as_villager() {
            println!(
                "  {:<10} {:?} energy {:>3.0} stress {:>3.0} wealth {:>3}G wood {}",
                entity.name, v.state, v.energy, v.stress, v.wealth, v.wood
            );
        }
    }
    if let Some(b) = world.map.buildings().first() {
        println!("  town hall: level {} (stock {})", b.level(), b.stock());
    }
    println!("  roads and fences: {}", world.map.overlay().len());
    println!("--- history ---");
    for entry in engine.log().iter() {
        println!("  {entry}");
    }
}
