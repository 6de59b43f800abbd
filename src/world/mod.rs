//! Composed world model
//!
//! Three independent sources answer every spatial query through one
//! precedence order: building footprint > structure overlay > base
//! terrain. The pathfinder, the movement step and the renderer all go
//! through the same composition, so they can never disagree about what
//! a cell contains.

pub mod biome;
pub mod building;
pub mod noise;
pub mod structures;
pub mod terrain;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::agents::Entity;
use crate::core::config::SimulationConfig;
use crate::core::error::{HollowError, Result};
use crate::core::log::EventLog;
use crate::core::types::{Cell, EntityId, Tick, Vec2};
use crate::core::WorldClock;
use biome::Biome;
use building::{Building, BuildingId, FootprintTile};
use structures::{StructureKind, StructureOverlay};
use terrain::{CavernTerrain, ScenarioKind, TerrainSource};

/// Which terrain source is currently active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Surface,
    Underworld,
}

// ---------------------------------------------------------------------------
// Map: terrain + overlay + buildings

pub struct WorldMap {
    scenario: ScenarioKind,
    seed: u64,
    surface: Box<dyn TerrainSource>,
    underworld: Option<CavernTerrain>,
    layer: Layer,
    overlay: StructureOverlay,
    buildings: Vec<Building>,
}

impl WorldMap {
    pub fn new(scenario: ScenarioKind, seed: u64) -> Self {
        Self {
            scenario,
            seed,
            surface: scenario.build(seed),
            underworld: None,
            layer: Layer::Surface,
            overlay: StructureOverlay::new(),
            buildings: Vec::new(),
        }
    }

    pub fn scenario(&self) -> ScenarioKind {
        self.scenario
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    fn active_terrain(&self) -> &dyn TerrainSource {
        match self.layer {
            Layer::Surface => self.surface.as_ref(),
            Layer::Underworld => self
                .underworld
                .as_ref()
                .map(|c| c as &dyn TerrainSource)
                // Layer::Underworld is only ever set together with the
                // cavern being created; fall back to the surface rather
                // than panic if a snapshot lied.
                .unwrap_or(self.surface.as_ref()),
        }
    }

    pub fn terrain_name(&self) -> &'static str {
        self.active_terrain().name()
    }

    pub fn legend(&self) -> &'static [terrain::LegendEntry] {
        self.active_terrain().legend()
    }

    pub fn biome_at(&self, x: f32, y: f32) -> Biome {
        self.active_terrain().biome_at(x, y)
    }

    /// Footprint tile covering a cell, if any building covers it.
    /// Buildings exist on the surface only.
    pub fn building_tile(&self, cell: Cell) -> Option<FootprintTile> {
        if self.layer != Layer::Surface {
            return None;
        }
        self.buildings.iter().find_map(|b| b.tile_at(cell))
    }

    pub fn structure_at(&self, cell: Cell) -> Option<StructureKind> {
        if self.layer != Layer::Surface {
            return None;
        }
        self.overlay.get(cell)
    }

    pub fn overlay(&self) -> &StructureOverlay {
        &self.overlay
    }

    pub fn portal_at(&self, cell: Cell) -> bool {
        self.active_terrain().portal_at(cell)
    }

    /// Door punched into the base terrain (building doors are separate,
    /// see `building_tile`)
    pub fn door_at(&self, cell: Cell) -> bool {
        self.active_terrain().is_door(cell)
    }

    /// Walkability by the three-layer precedence. Doors and portals are
    /// always walkable regardless of the underlying terrain.
    pub fn is_walkable(&self, x: f32, y: f32) -> bool {
        let cell = Vec2::new(x, y).cell();
        if self.portal_at(cell) {
            return true;
        }
        if let Some(tile) = self.building_tile(cell) {
            return tile.walkable();
        }
        if let Some(kind) = self.structure_at(cell) {
            return !kind.solid();
        }
        if self.active_terrain().is_door(cell) {
            return true;
        }
        !self.biome_at(x, y).is_solid()
    }

    /// Display glyph for a cell, same precedence as `is_walkable`
    pub fn glyph_at(&self, cell: Cell) -> char {
        if self.portal_at(cell) {
            return match self.layer {
                Layer::Surface => 'O',
                Layer::Underworld => '0',
            };
        }
        if let Some(tile) = self.building_tile(cell) {
            return tile.glyph();
        }
        if let Some(kind) = self.structure_at(cell) {
            return kind.glyph();
        }
        if self.active_terrain().is_door(cell) {
            return '+';
        }
        self.biome_at(cell.0 as f32 + 0.5, cell.1 as f32 + 0.5).glyph()
    }

    /// Insert-or-overwrite a structure tile
    pub fn add_structure(&mut self, cell: Cell, kind: StructureKind) {
        self.overlay.insert(cell, kind);
    }

    pub fn add_building(&mut self, origin: Cell) -> BuildingId {
        let id = BuildingId(self.buildings.len() as u32);
        self.buildings.push(Building::new(id, origin));
        id
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.0 as usize)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Accumulate stock on a building and grow it across any thresholds
    /// crossed; every level reached emits an event.
    pub fn deposit_resource(
        &mut self,
        id: BuildingId,
        amount: u32,
        cfg: &SimulationConfig,
        log: &mut EventLog,
    ) -> Result<()> {
        let building = self
            .buildings
            .get_mut(id.0 as usize)
            .ok_or(HollowError::BuildingNotFound(id.0))?;
        for level in building.deposit(amount, cfg.stock_per_level, cfg.max_building_level) {
            log.push(format!("BUILD: the town hall grew to level {level}."));
        }
        Ok(())
    }

    fn enter_underworld(&mut self, depth: u32) {
        if self.underworld.as_ref().map(CavernTerrain::depth) != Some(depth) {
            self.underworld = Some(CavernTerrain::new(self.seed, depth));
        }
        self.layer = Layer::Underworld;
    }

    fn exit_underworld(&mut self) {
        self.layer = Layer::Surface;
    }

    pub fn underworld_depth(&self) -> u32 {
        self.underworld.as_ref().map_or(0, CavernTerrain::depth)
    }
}

// ---------------------------------------------------------------------------
// Entity registry

/// Owns every entity; iteration follows insertion order so per-frame
/// updates are stable and reproducible.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: AHashMap<EntityId, Entity>,
    order: Vec<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.order.push(id);
        self.entities.insert(id, entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Explicit removal; not exercised by the core loop
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.order.retain(|&e| e != id);
        self.entities.remove(&id)
    }

    /// Temporarily lift an entity out so it can be mutated alongside an
    /// immutable borrow of the rest of the world. Pair with `put_back`.
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn put_back(&mut self, entity: Entity) {
        self.entities.insert(entity.id, entity);
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Insertion-order iteration
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ---------------------------------------------------------------------------
// World model

pub struct WorldModel {
    pub map: WorldMap,
    pub registry: EntityRegistry,
    pub clock: WorldClock,
    pub tick_count: Tick,
    /// Surface positions of mobile agents while they are below ground
    surface_stash: AHashMap<EntityId, Vec2>,
}

impl WorldModel {
    pub fn new(scenario: ScenarioKind, seed: u64, cfg: &SimulationConfig) -> Self {
        Self {
            map: WorldMap::new(scenario, seed),
            registry: EntityRegistry::new(),
            clock: WorldClock::new(cfg.day_length),
            tick_count: 0,
            surface_stash: AHashMap::new(),
        }
    }

    /// Insert an entity, nudging it to the nearest walkable cell when the
    /// requested position is solid. The silent repair mirrors historical
    /// behavior; it is flagged for product review rather than removed.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        if !self.map.is_walkable(entity.pos.x, entity.pos.y) {
            if let Some(rescued) = nearest_walkable(&self.map, entity.pos) {
                tracing::debug!(
                    name = %entity.name,
                    from = ?entity.pos,
                    to = ?rescued,
                    "spawn position was solid; nudged to nearest walkable cell"
                );
                entity.pos = rescued;
            } else {
                tracing::warn!(
                    name = %entity.name,
                    pos = ?entity.pos,
                    "no walkable cell within rescue radius; spawning as requested"
                );
            }
        }
        self.registry.insert(entity)
    }

    /// Swap the active terrain to the cavern below, stashing surface
    /// positions of every mobile agent for the return trip.
    pub fn descend(&mut self, log: &mut EventLog) {
        if self.map.layer() == Layer::Underworld {
            return;
        }
        let depth = self.map.underworld_depth().max(1);
        self.map.enter_underworld(depth);

        let mobile: Vec<EntityId> = self
            .registry
            .iter()
            .filter(|e| e.updatable())
            .map(|e| e.id)
            .collect();
        for (i, id) in mobile.iter().enumerate() {
            if let Some(entity) = self.registry.get_mut(*id) {
                self.surface_stash.insert(*id, entity.pos);
                // The cavern entry shaft is a 3x3 always-walkable patch
                // around the origin; drop agents across it.
                let slot = i as i32;
                entity.pos = Vec2::new((slot % 3 - 1) as f32 + 0.5, (slot / 3 % 3 - 1) as f32 + 0.5);
                entity.halt();
            }
        }
        log.push("The party climbs down into the dark.");
    }

    /// Return to the surface, restoring stashed positions.
    pub fn ascend(&mut self, log: &mut EventLog) {
        if self.map.layer() == Layer::Surface {
            return;
        }
        self.map.exit_underworld();
        let stash = std::mem::take(&mut self.surface_stash);
        for (id, pos) in stash {
            if let Some(entity) = self.registry.get_mut(id) {
                entity.pos = pos;
                entity.halt();
            }
        }
        log.push("Daylight again: the party returns to the surface.");
    }

    /// Entire mutable state as one opaque snapshot value. The external
    /// persistence layer owns format, naming and compression.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            scenario: self.map.scenario(),
            seed: self.map.seed(),
            layer: self.map.layer(),
            depth: self.map.underworld_depth(),
            tick_count: self.tick_count,
            clock: self.clock.clone(),
            entities: self.registry.iter().cloned().collect(),
            overlay: self.map.overlay().iter().collect(),
            buildings: self
                .map
                .buildings()
                .iter()
                .map(|b| BuildingSnapshot {
                    origin: b.origin,
                    level: b.level(),
                    stock: b.stock(),
                })
                .collect(),
            surface_stash: self.surface_stash.iter().map(|(&id, &p)| (id, p)).collect(),
        }
    }

    /// Rebuild a world from a snapshot; terrain is regenerated from the
    /// recorded scenario and seed.
    pub fn restore(snapshot: WorldSnapshot) -> Result<Self> {
        let mut map = WorldMap::new(snapshot.scenario, snapshot.seed);
        for b in &snapshot.buildings {
            let id = BuildingId(map.buildings.len() as u32);
            map.buildings
                .push(Building::restore(id, b.origin, b.level, b.stock));
        }
        for (cell, kind) in &snapshot.overlay {
            map.add_structure(*cell, *kind);
        }
        if snapshot.layer == Layer::Underworld {
            if snapshot.depth == 0 {
                return Err(HollowError::Snapshot(
                    "underworld layer recorded without a depth".into(),
                ));
            }
            map.enter_underworld(snapshot.depth);
        }

        let mut registry = EntityRegistry::new();
        for entity in snapshot.entities {
            registry.insert(entity);
        }

        Ok(Self {
            map,
            registry,
            clock: snapshot.clock,
            tick_count: snapshot.tick_count,
            surface_stash: snapshot.surface_stash.into_iter().collect(),
        })
    }
}

/// Cardinal ring probe for the nearest walkable position, radius 1..=5.
/// Shared shape with the pathfinder's goal snapping.
pub fn nearest_walkable(map: &WorldMap, pos: Vec2) -> Option<Vec2> {
    for r in 1..=5i32 {
        for (dx, dy) in [(-r, 0), (r, 0), (0, -r), (0, r)] {
            let candidate = Vec2::new(pos.x + dx as f32, pos.y + dy as f32);
            if map.is_walkable(candidate.x, candidate.y) {
                return Some(candidate);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Snapshot types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: ScenarioKind,
    pub seed: u64,
    pub layer: Layer,
    pub depth: u32,
    pub tick_count: Tick,
    pub clock: WorldClock,
    pub entities: Vec<Entity>,
    pub overlay: Vec<(Cell, StructureKind)>,
    pub buildings: Vec<BuildingSnapshot>,
    pub surface_stash: Vec<(EntityId, Vec2)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub origin: Cell,
    pub level: u32,
    pub stock: u32,
}
