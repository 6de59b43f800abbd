//! Integration tests for the composed world model

use hollowmere::agents::{Entity, EntityKind};
use hollowmere::core::config::SimulationConfig;
use hollowmere::core::log::EventLog;
use hollowmere::core::types::Vec2;
use hollowmere::pathfinding::find_path;
use hollowmere::world::building::{BuildingId, FootprintTile};
use hollowmere::world::structures::StructureKind;
use hollowmere::world::terrain::ScenarioKind;
use hollowmere::world::{WorldMap, WorldModel};

#[test]
fn overlay_overrides_terrain_solidity() {
    let map_plain = WorldMap::new(ScenarioKind::Township, 1);
    // (12, 13) sits on the west wall of the home block
    assert!(!map_plain.is_walkable(12.5, 13.5));

    let mut map = WorldMap::new(ScenarioKind::Township, 1);
    map.add_structure((12, 13), StructureKind::Road);
    assert!(map.is_walkable(12.5, 13.5));

    // And the converse: a fence makes open ground solid
    let mut fenced = WorldMap::new(ScenarioKind::Township, 1);
    assert!(fenced.is_walkable(2.5, 2.5));
    fenced.add_structure((2, 2), StructureKind::Fence);
    assert!(!fenced.is_walkable(2.5, 2.5));
}

#[test]
fn building_footprint_overrides_overlay() {
    let mut map = WorldMap::new(ScenarioKind::Meadow, 1);
    map.add_building((20, 20));
    // Level 1 wall ring sits at offset 2
    let wall_cell = (22, 20);
    map.add_structure(wall_cell, StructureKind::Road);
    assert_eq!(map.building_tile(wall_cell), Some(FootprintTile::Wall));
    assert!(!map.is_walkable(22.5, 20.5));
}

#[test]
fn door_cells_are_always_walkable() {
    let map = WorldMap::new(ScenarioKind::Township, 3);
    // Terrain door in the south facade of every block
    assert!(map.is_walkable(24.5, 35.5));

    let mut with_building = WorldMap::new(ScenarioKind::Meadow, 3);
    with_building.add_building((0, 0));
    // Building door on the southern edge of the ring
    assert_eq!(
        with_building.building_tile((0, 2)),
        Some(FootprintTile::Door)
    );
    assert!(with_building.is_walkable(0.5, 2.5));
}

#[test]
fn pathfinder_enters_building_through_the_door() {
    let mut map = WorldMap::new(ScenarioKind::Meadow, 8);
    // Pave the approach so the test holds for any seed
    for x in -8..=8 {
        for y in -8..=8 {
            map.add_structure((x, y), StructureKind::Bridge);
        }
    }
    map.add_building((0, 0));

    // From south of the building into its interior centre
    let path = find_path(&map, (0, 6), (0, 0), 4000);
    assert!(!path.is_empty());
    assert!(path.contains(&(0, 2)), "path must pass the door, got {path:?}");
    assert_eq!(path.last(), Some(&(0, 0)));
    // Never through a wall
    for cell in &path {
        assert_ne!(map.building_tile(*cell), Some(FootprintTile::Wall));
    }
}

#[test]
fn spawn_rescues_from_solid_cells() {
    let cfg = SimulationConfig::default();
    let mut world = WorldModel::new(ScenarioKind::Township, 2, &cfg);
    // (12, 12) is a wall corner of the home block
    assert!(!world.map.is_walkable(12.5, 12.5));

    let id = world.spawn(Entity::new(
        "Trapped",
        Vec2::new(12.5, 12.5),
        EntityKind::Home {
            building: BuildingId(0),
        },
    ));
    let pos = world.registry.get(id).map(|e| e.pos).expect("spawned");
    assert!(world.map.is_walkable(pos.x, pos.y));
    assert_ne!(pos, Vec2::new(12.5, 12.5));
}

#[test]
fn deposits_grow_the_building_and_log_it() {
    let cfg = SimulationConfig::default();
    let mut map = WorldMap::new(ScenarioKind::Meadow, 4);
    let id = map.add_building((0, 0));
    let mut log = EventLog::default();

    map.deposit_resource(id, 49, &cfg, &mut log).expect("deposit");
    assert_eq!(map.building(id).map(|b| b.level()), Some(1));
    assert!(log.is_empty());

    map.deposit_resource(id, 1, &cfg, &mut log).expect("deposit");
    assert_eq!(map.building(id).map(|b| b.level()), Some(2));
    assert!(log.iter().any(|e| e.contains("level 2")));
}

#[test]
fn overlay_survives_snapshot_roundtrip() {
    let cfg = SimulationConfig::default();
    let mut world = WorldModel::new(ScenarioKind::Meadow, 6, &cfg);
    world.map.add_structure((3, 3), StructureKind::Road);
    world.map.add_structure((4, 3), StructureKind::Fence);
    world.map.add_structure((5, 3), StructureKind::Bridge);

    let json = serde_json::to_string(&world.snapshot()).expect("serialize");
    let snapshot = serde_json::from_str(&json).expect("deserialize");
    let restored = WorldModel::restore(snapshot).expect("restore");

    assert_eq!(restored.map.structure_at((3, 3)), Some(StructureKind::Road));
    assert_eq!(restored.map.structure_at((4, 3)), Some(StructureKind::Fence));
    assert_eq!(restored.map.structure_at((5, 3)), Some(StructureKind::Bridge));
    // Same composed answers after the roundtrip
    assert!(!restored.map.is_walkable(4.5, 3.5));
    assert!(restored.map.is_walkable(5.5, 3.5));
}
