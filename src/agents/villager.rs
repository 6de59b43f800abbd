//! Villager state machine and movement physics
//!
//! Movement runs every frame for smooth motion; decisions run on the
//! agent's own coarser timer. Pathfinding is invoked lazily when a
//! navigation target changes or a cached path is exhausted or blocked,
//! and an unreachable goal arms a retry cooldown instead of erroring.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::log::EventLog;
use crate::core::types::{Cell, Vec2};
use crate::pathfinding::find_path;
use crate::world::biome::Biome;
use crate::world::building::BuildingId;
use crate::world::{Layer, WorldMap};

/// Notable personal moments retained per villager
const JOURNAL_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VillagerState {
    Idle,
    Searching,
    Gathering,
    GoingHome,
    Resting,
    Panicking,
    /// Stress froze all productive behavior until it decays
    Strike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperament {
    /// May shrug off a negative world event entirely
    Lucky,
    /// Doubles wealth gains, suffers extra stress on losses
    Greedy,
    /// Halves stress gains; immune to prowler panic
    Brave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ailment {
    SwampChill,
}

/// Deferred world mutations produced by an agent update, applied by the
/// scheduler once the agent borrow ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEffect {
    Deposit { building: BuildingId, amount: u32 },
    LayRoad { cell: Cell },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Villager {
    pub state: VillagerState,
    /// 0..=100
    pub energy: f32,
    /// >= 0, unbounded above
    pub stress: f32,
    pub wealth: u32,
    /// Wood currently carried
    pub wood: u32,
    pub base_speed: f32,
    pub home: Vec2,
    pub home_building: BuildingId,
    pub target: Vec2,
    pub traits: Vec<Temperament>,
    pub ailment: Option<Ailment>,
    /// Cached waypoints in reverse: the next cell to reach is `last()`
    pub path: Vec<Cell>,
    pub action_timer: f32,
    pub retry_cooldown: f32,
    pub social_cooldown: f32,
    pub journal: Vec<String>,
}

impl Villager {
    pub fn new(
        home: Vec2,
        home_building: BuildingId,
        cfg: &SimulationConfig,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut traits = Vec::new();
        for t in [Temperament::Lucky, Temperament::Greedy, Temperament::Brave] {
            if rng.gen_bool(0.25) {
                traits.push(t);
            }
        }
        Self {
            state: VillagerState::Idle,
            energy: 100.0,
            stress: 0.0,
            wealth: rng.gen_range(5..=20),
            wood: 0,
            base_speed: cfg.villager_speed,
            home,
            home_building,
            target: home,
            traits,
            ailment: None,
            path: Vec::new(),
            action_timer: 0.0,
            retry_cooldown: 0.0,
            social_cooldown: 0.0,
            journal: Vec::new(),
        }
    }

    pub fn has_trait(&self, t: Temperament) -> bool {
        self.traits.contains(&t)
    }

    pub fn add_journal_entry(&mut self, entry: impl Into<String>) {
        if self.journal.len() >= JOURNAL_CAP {
            self.journal.remove(0);
        }
        self.journal.push(entry.into());
    }

    /// Point the agent at a new destination; the path is recomputed on
    /// the next opportunity
    pub fn move_towards(&mut self, target: Vec2) {
        self.target = target;
        self.path.clear();
    }

    fn arrived(&self, pos: Vec2, cfg: &SimulationConfig) -> bool {
        pos.distance(&self.target) < cfg.arrival_radius
    }
}

/// Per-frame update: biome modifiers, movement along the cached path,
/// and the decision table when the agent's own timer fires.
#[allow(clippy::too_many_arguments)]
pub fn update_villager(
    name: &str,
    pos: &mut Vec2,
    v: &mut Villager,
    dt: f32,
    map: &WorldMap,
    cfg: &SimulationConfig,
    rng: &mut ChaCha8Rng,
    log: &mut EventLog,
    effects: &mut Vec<WorldEffect>,
) {
    v.retry_cooldown = (v.retry_cooldown - dt).max(0.0);
    v.social_cooldown = (v.social_cooldown - dt).max(0.0);

    // Continuous biome modifiers: multiplicative speed, additive
    // stress/energy per second
    let profile = map.biome_at(pos.x, pos.y).profile();
    v.stress = (v.stress + profile.stress_mod * dt).max(0.0);
    v.energy = (v.energy - profile.energy_drain * dt).clamp(0.0, 100.0);

    if !matches!(v.state, VillagerState::Resting | VillagerState::Strike) {
        let speed = v.base_speed * profile.speed_mult;
        step_along_path(pos, v, speed * dt, map, cfg);
    }

    v.action_timer += dt;
    if v.action_timer >= cfg.decision_interval {
        v.action_timer = 0.0;
        decide(name, *pos, v, map, cfg, rng, log, effects);
    }
}

/// Axis-aligned advance toward the next waypoint, larger offset first.
/// The step is checked against the composed walkability before being
/// committed; a blocked step invalidates the whole cached path.
fn step_along_path(pos: &mut Vec2, v: &mut Villager, step: f32, map: &WorldMap, cfg: &SimulationConfig) {
    let Some(&next) = v.path.last() else {
        return;
    };
    let waypoint = Vec2::new(next.0 as f32 + 0.5, next.1 as f32 + 0.5);
    let dx = waypoint.x - pos.x;
    let dy = waypoint.y - pos.y;

    let candidate = if dx.abs() >= dy.abs() {
        Vec2::new(pos.x + dx.clamp(-step, step), pos.y)
    } else {
        Vec2::new(pos.x, pos.y + dy.clamp(-step, step))
    };

    if !map.is_walkable(candidate.x, candidate.y) {
        v.path.clear();
        v.retry_cooldown = cfg.path_retry_cooldown;
        return;
    }
    *pos = candidate;

    if pos.distance(&waypoint) < 0.15 {
        v.path.pop();
    }
}

/// Recompute the cached path unless the retry cooldown is still armed.
/// An empty search result arms the cooldown: the goal is treated as
/// temporarily unreachable, not as an error.
fn request_path(pos: Vec2, v: &mut Villager, map: &WorldMap, cfg: &SimulationConfig) {
    if v.retry_cooldown > 0.0 {
        return;
    }
    let mut path = find_path(map, pos.cell(), v.target.cell(), cfg.max_expansions);
    if path.is_empty() {
        v.retry_cooldown = cfg.path_retry_cooldown;
    } else {
        path.reverse();
        v.path = path;
    }
}

#[allow(clippy::too_many_arguments)]
fn decide(
    name: &str,
    pos: Vec2,
    v: &mut Villager,
    map: &WorldMap,
    cfg: &SimulationConfig,
    rng: &mut ChaCha8Rng,
    log: &mut EventLog,
    effects: &mut Vec<WorldEffect>,
) {
    if v.state != VillagerState::Resting {
        v.energy = (v.energy - 1.0).max(0.0);
    }

    // Strike overrides everything until stress decays
    if v.state == VillagerState::Strike {
        v.stress = (v.stress - cfg.strike_decay).max(0.0);
        if v.stress <= cfg.strike_recover_stress {
            v.state = VillagerState::Idle;
            log.push(format!("{name} calmed down and is back to work."));
        }
        return;
    }
    if v.stress >= cfg.strike_stress && v.state != VillagerState::Panicking {
        v.state = VillagerState::Strike;
        v.path.clear();
        log.push(format!("CRISIS: {name} is overwhelmed and refuses to work."));
        return;
    }

    // Exhaustion sends anyone (except sleepers) home
    if v.energy < cfg.go_home_energy
        && !matches!(v.state, VillagerState::Resting | VillagerState::GoingHome)
    {
        v.state = VillagerState::GoingHome;
        let home = v.home;
        v.move_towards(home);
        request_path(pos, v, map, cfg);
        log.push(format!("{name} is exhausted and heads home."));
        return;
    }

    match v.state {
        VillagerState::Resting => {
            v.energy = (v.energy + cfg.rest_recovery).min(100.0);
            if v.energy >= 100.0 {
                v.state = VillagerState::Idle;
                log.push(format!("{name} woke up full of energy."));
            }
        }

        VillagerState::Panicking => {
            // The resolver clears panic once the danger is out of range;
            // reaching the flee target also counts as having escaped.
            if v.arrived(pos, cfg) {
                v.state = VillagerState::Idle;
            } else if v.path.is_empty() {
                request_path(pos, v, map, cfg);
            }
        }

        VillagerState::Idle => {
            if rng.gen_bool(cfg.explore_chance) {
                v.state = VillagerState::Searching;
                let r = cfg.explore_range;
                let target = Vec2::new(
                    v.home.x + rng.gen_range(-r..=r) as f32,
                    v.home.y + rng.gen_range(-r..=r) as f32,
                );
                v.move_towards(target);
                request_path(pos, v, map, cfg);
                log.push(format!("{name} went out looking for wood."));
            }
        }

        VillagerState::Searching => {
            let in_woods = map.biome_at(pos.x, pos.y) == Biome::Forest;
            if in_woods && rng.gen_bool(cfg.gather_chance) {
                v.state = VillagerState::Gathering;
                log.push(format!("{name} found a good stand of trees."));
            } else if v.arrived(pos, cfg) {
                // Nothing to gather here; wander on
                let r = cfg.explore_range;
                let target = Vec2::new(
                    pos.x + rng.gen_range(-r..=r) as f32,
                    pos.y + rng.gen_range(-r..=r) as f32,
                );
                v.move_towards(target);
                request_path(pos, v, map, cfg);
            } else if v.path.is_empty() {
                request_path(pos, v, map, cfg);
            }
        }

        VillagerState::Gathering => {
            v.wood += 1;
            if v.wood >= cfg.carry_capacity {
                v.state = VillagerState::GoingHome;
                let home = v.home;
                v.move_towards(home);
                request_path(pos, v, map, cfg);
                log.push(format!("{name} gathered wood and is hauling it home."));
            }
        }

        VillagerState::GoingHome => {
            if pos.distance(&v.home) < cfg.arrival_radius {
                if v.wood > 0 {
                    effects.push(WorldEffect::Deposit {
                        building: v.home_building,
                        amount: v.wood,
                    });
                    log.push(format!("{name} delivered {} wood.", v.wood));
                    v.wood = 0;
                }
                if v.energy < cfg.rest_below_energy {
                    v.state = VillagerState::Resting;
                    log.push(format!("{name} went to sleep."));
                } else {
                    v.state = VillagerState::Idle;
                }
            } else {
                // Haulers tread the same route over and over; paths wear
                // into roads
                if v.wood > 0
                    && map.layer() == Layer::Surface
                    && rng.gen_bool(cfg.road_lay_chance)
                {
                    let cell = pos.cell();
                    if map.structure_at(cell).is_none()
                        && map.building_tile(cell).is_none()
                        && map.biome_at(pos.x, pos.y) == Biome::Meadow
                    {
                        effects.push(WorldEffect::LayRoad { cell });
                    }
                }
                if v.path.is_empty() {
                    request_path(pos, v, map, cfg);
                }
            }
        }

        // Handled above
        VillagerState::Strike => {}
    }
}
