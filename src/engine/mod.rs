//! Simulation scheduler
//!
//! Single-threaded cooperative frame loop: every frame updates movement
//! physics for each agent in registry insertion order, a coarser logic
//! pass runs decisions and interactions every `logic_interval` seconds
//! of accumulated wall time, and render observers are notified
//! synchronously at the end of each frame.
//!
//! A fault while updating one agent or resolving one effect is logged
//! with the offending entity and skipped; the rest of the tick proceeds.
//! Only an error escaping `run` is fatal.

use std::time::{Duration, Instant};

use rand_chacha::ChaCha8Rng;

use crate::agents::villager::{update_villager, WorldEffect};
use crate::agents::prowler::update_prowler;
use crate::agents::{Entity, EntityKind};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::log::EventLog;
use crate::core::types::{EntityId, Tick};
use crate::core::WorldClock;
use crate::interactions;
use crate::world::structures::StructureKind;
use crate::world::{EntityRegistry, WorldMap, WorldModel, WorldSnapshot};

/// Commands an observer may hand back to the loop. Camera motion, zoom
/// and overlays are the observer's own business and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Stop,
    Save,
    Descend,
    Ascend,
}

/// Read-only view of the world handed to observers once per frame
pub struct FrameView<'a> {
    pub map: &'a WorldMap,
    pub registry: &'a EntityRegistry,
    pub clock: &'a WorldClock,
    pub tick: Tick,
    pub log: &'a EventLog,
}

/// External rendering surface. Must return promptly: the loop blocks on
/// every observer each frame.
pub trait RenderObserver {
    fn frame(&mut self, view: FrameView<'_>) -> Result<Vec<EngineCommand>>;
}

/// Callback invoked when a Save command arrives; returns a message for
/// the event log. Persistence details stay outside the kernel.
pub type SaveHook = Box<dyn FnMut(&WorldSnapshot) -> Result<String>>;

pub struct Engine {
    world: WorldModel,
    cfg: SimulationConfig,
    rng: ChaCha8Rng,
    log: EventLog,
    observers: Vec<Box<dyn RenderObserver>>,
    save_hook: Option<SaveHook>,
    running: bool,
    /// Accumulated simulated wall time in seconds
    sim_time: f32,
    last_logic: f32,
    effects_scratch: Vec<WorldEffect>,
}

impl Engine {
    pub fn new(world: WorldModel, cfg: SimulationConfig, rng: ChaCha8Rng) -> Self {
        Self {
            world,
            cfg,
            rng,
            log: EventLog::default(),
            observers: Vec::new(),
            save_hook: None,
            running: false,
            sim_time: 0.0,
            last_logic: 0.0,
            effects_scratch: Vec::new(),
        }
    }

    pub fn register_observer(&mut self, observer: Box<dyn RenderObserver>) {
        self.observers.push(observer);
    }

    pub fn set_save_hook(&mut self, hook: SaveHook) {
        self.save_hook = Some(hook);
    }

    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldModel {
        &mut self.world
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Outer frame loop at the target frame rate. Returns when stopped;
    /// an error propagating out of here is fatal to the run.
    pub fn run(&mut self) -> Result<()> {
        self.running = true;
        let frame_budget = Duration::from_secs_f32(1.0 / self.cfg.fps as f32);
        let mut last = Instant::now();

        while self.running {
            let frame_start = Instant::now();
            let dt = frame_start
                .duration_since(last)
                .as_secs_f32()
                .min(self.cfg.max_frame_dt);
            last = frame_start;

            self.advance(dt);
            self.notify_observers();

            let spent = frame_start.elapsed();
            if spent < frame_budget {
                std::thread::sleep(frame_budget - spent);
            }
        }
        Ok(())
    }

    /// Drive the simulation without a renderer or frame pacing; used by
    /// headless mode and tests.
    pub fn run_for(&mut self, frames: u64, dt: f32) {
        for _ in 0..frames {
            self.advance(dt.min(self.cfg.max_frame_dt));
        }
    }

    /// One frame worth of simulation: clock, per-agent physics in stable
    /// insertion order, and the logic pass when its interval elapses.
    pub fn advance(&mut self, dt: f32) {
        self.world.clock.advance(dt);

        let ids: Vec<EntityId> = self.world.registry.ids().to_vec();
        for id in ids {
            self.update_entity(id, dt);
        }

        self.sim_time += dt;
        if self.sim_time - self.last_logic >= self.cfg.logic_interval {
            self.last_logic = self.sim_time;
            interactions::resolve(&mut self.world, &self.cfg, &mut self.rng, &mut self.log);
            self.world.tick_count += 1;
        }
    }

    /// Update one agent with the rest of the world immutable. The entity
    /// is lifted out of the registry for the duration of the update so
    /// no other entity can observe it half-updated.
    fn update_entity(&mut self, id: EntityId, dt: f32) {
        let Some(mut entity) = self.world.registry.take(id) else {
            return;
        };

        {
            let Entity {
                ref name,
                ref mut pos,
                ref mut kind,
                ..
            } = entity;
            match kind {
                EntityKind::Villager(v) => update_villager(
                    name,
                    pos,
                    v,
                    dt,
                    &self.world.map,
                    &self.cfg,
                    &mut self.rng,
                    &mut self.log,
                    &mut self.effects_scratch,
                ),
                EntityKind::Prowler(p) => update_prowler(
                    pos,
                    p,
                    dt,
                    &self.world.map,
                    &self.world.clock,
                    &self.cfg,
                    &mut self.rng,
                ),
                EntityKind::Home { .. } | EntityKind::Vendor(_) => {}
            }
        }

        self.world.registry.put_back(entity);

        // Deferred world mutations; a failing effect is logged against
        // the entity and dropped, the tick continues
        let effects: Vec<WorldEffect> = self.effects_scratch.drain(..).collect();
        for effect in effects {
            if let Err(err) = self.apply_effect(effect) {
                tracing::error!(entity = ?id, %err, "world effect failed; skipping");
            }
        }
    }

    fn apply_effect(&mut self, effect: WorldEffect) -> Result<()> {
        match effect {
            WorldEffect::Deposit { building, amount } => {
                self.world
                    .map
                    .deposit_resource(building, amount, &self.cfg, &mut self.log)
            }
            WorldEffect::LayRoad { cell } => {
                self.world.map.add_structure(cell, StructureKind::Road);
                Ok(())
            }
        }
    }

    /// Synchronous observer notification. A faulting observer is logged
    /// and skipped for this frame; rendering resumes next frame.
    fn notify_observers(&mut self) {
        let mut commands = Vec::new();
        for observer in &mut self.observers {
            let view = FrameView {
                map: &self.world.map,
                registry: &self.world.registry,
                clock: &self.world.clock,
                tick: self.world.tick_count,
                log: &self.log,
            };
            match observer.frame(view) {
                Ok(mut cmds) => commands.append(&mut cmds),
                Err(err) => tracing::error!(%err, "render observer failed this frame"),
            }
        }
        for command in commands {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Stop => self.running = false,
            EngineCommand::Save => {
                let snapshot = self.world.snapshot();
                if let Some(hook) = self.save_hook.as_mut() {
                    match hook(&snapshot) {
                        Ok(message) => self.log.push(message),
                        Err(err) => {
                            tracing::error!(%err, "save failed");
                            self.log.push("Saving failed; see diagnostics.");
                        }
                    }
                } else {
                    tracing::warn!("save requested but no save hook installed");
                }
            }
            EngineCommand::Descend => {
                // Only valid while someone actually stands on the portal
                let on_portal = self
                    .world
                    .registry
                    .iter()
                    .any(|e| e.updatable() && self.world.map.portal_at(e.pos.cell()));
                if on_portal {
                    self.world.descend(&mut self.log);
                } else {
                    self.log.push("Nothing happens; no one stands at the portal.");
                }
            }
            EngineCommand::Ascend => {
                self.world.ascend(&mut self.log);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::villager::{Villager, VillagerState};
    use crate::core::types::Vec2;
    use crate::world::structures::StructureKind;
    use crate::world::terrain::ScenarioKind;
    use rand::SeedableRng;

    fn paved_engine() -> (Engine, EntityId) {
        let cfg = SimulationConfig::default();
        let mut world = WorldModel::new(ScenarioKind::Meadow, 21, &cfg);
        for x in -30..=30 {
            for y in -30..=30 {
                world.map.add_structure((x, y), StructureKind::Bridge);
            }
        }
        let building = world.map.add_building((0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let v = Villager::new(Vec2::new(0.5, 0.5), building, &cfg, &mut rng);
        let id = world.spawn(Entity::new(
            "Juan",
            Vec2::new(10.5, 10.5),
            EntityKind::Villager(v),
        ));
        (Engine::new(world, cfg, rng), id)
    }

    #[test]
    fn test_logic_tick_cadence() {
        let (mut engine, _) = paved_engine();
        // 2.0s logic interval at 0.1s frames: no tick before ~2s of
        // accumulated time, exactly one shortly after
        engine.run_for(19, 0.1);
        assert_eq!(engine.world().tick_count, 0);
        engine.run_for(3, 0.1);
        assert_eq!(engine.world().tick_count, 1);
    }

    #[test]
    fn test_exhausted_villager_reaches_home_and_rests() {
        let (mut engine, id) = paved_engine();
        if let Some(v) = engine
            .world_mut()
            .registry
            .get_mut(id)
            .and_then(Entity::as_villager_mut)
        {
            v.energy = 15.0;
        }
        // Plenty of simulated time to walk ~20 cells home and fall asleep
        let mut resting_seen = false;
        for _ in 0..1200 {
            engine.advance(0.1);
            let state = engine
                .world()
                .registry
                .get(id)
                .and_then(Entity::as_villager)
                .map(|v| v.state);
            if state == Some(VillagerState::Resting) {
                resting_seen = true;
                break;
            }
        }
        assert!(resting_seen, "villager never made it home to rest");
        let pos = engine.world().registry.get(id).map(|e| e.pos).expect("entity");
        assert!(pos.distance(&Vec2::new(0.5, 0.5)) < 2.0);
    }

    #[test]
    fn test_deposit_effect_levels_building() {
        let (mut engine, id) = paved_engine();
        if let Some(v) = engine
            .world_mut()
            .registry
            .get_mut(id)
            .and_then(Entity::as_villager_mut)
        {
            v.state = VillagerState::GoingHome;
            v.wood = 50;
            v.home = Vec2::new(10.5, 10.5); // already standing at home
        }
        // One decision tick is enough to trigger the delivery
        engine.run_for(30, 0.1);
        let building = engine.world().map.building(crate::world::building::BuildingId(0));
        assert_eq!(building.map(|b| b.level()), Some(2));
    }

    #[test]
    fn test_descend_requires_portal() {
        let (mut engine, _) = paved_engine();
        engine.apply_command(EngineCommand::Descend);
        assert_eq!(engine.world().map.layer(), crate::world::Layer::Surface);
    }

    #[test]
    fn test_descend_and_ascend_roundtrip() {
        use crate::world::terrain::MEADOW_PORTAL;
        let (mut engine, id) = paved_engine();
        let surface_pos = Vec2::new(
            MEADOW_PORTAL.0 as f32 + 0.5,
            MEADOW_PORTAL.1 as f32 + 0.5,
        );
        if let Some(e) = engine.world_mut().registry.get_mut(id) {
            e.pos = surface_pos;
        }
        engine.apply_command(EngineCommand::Descend);
        assert_eq!(engine.world().map.layer(), crate::world::Layer::Underworld);
        let below = engine.world().registry.get(id).map(|e| e.pos).expect("entity");
        assert!(below.distance(&surface_pos) > 1.0);

        engine.apply_command(EngineCommand::Ascend);
        assert_eq!(engine.world().map.layer(), crate::world::Layer::Surface);
        let back = engine.world().registry.get(id).map(|e| e.pos).expect("entity");
        assert_eq!(back, surface_pos);
    }
}
