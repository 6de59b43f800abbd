//! Proximity-triggered interactions
//!
//! Runs once per logic tick over all agents with a plain O(n²) scan;
//! agent counts are bounded, so a spatial index would be overhead here.
//! All mutation goes through the registry's public accessors: agents
//! never touch each other directly.

pub mod events;

use crate::agents::villager::VillagerState;
use crate::agents::EntityKind;
use crate::core::config::SimulationConfig;
use crate::core::log::EventLog;
use crate::core::types::{EntityId, Vec2};
use crate::world::biome::Biome;
use crate::world::building::FootprintTile;
use crate::world::{Layer, WorldMap, WorldModel};
use rand_chacha::ChaCha8Rng;

/// One logic-tick pass: danger, socializing, commerce, world events.
/// Resource delivery is not handled here; it rides on the villager's
/// own arrival transition as a deferred world effect.
pub fn resolve(world: &mut WorldModel, cfg: &SimulationConfig, rng: &mut ChaCha8Rng, log: &mut EventLog) {
    danger_pass(world, cfg, log);
    social_pass(world, cfg, log);
    commerce_pass(world, cfg, log);
    events::run_world_events(world, cfg, rng, log);
}

/// Interior cells shelter villagers from prowlers
fn is_protected(map: &WorldMap, pos: Vec2) -> bool {
    if map.building_tile(pos.cell()) == Some(FootprintTile::Interior) {
        return true;
    }
    map.biome_at(pos.x, pos.y) == Biome::Interior
}

fn danger_pass(world: &mut WorldModel, cfg: &SimulationConfig, log: &mut EventLog) {
    let prowlers: Vec<Vec2> = world
        .registry
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Prowler(_)))
        .map(|e| e.pos)
        .collect();
    if prowlers.is_empty() {
        return;
    }

    let villager_ids: Vec<EntityId> = world
        .registry
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Villager(_)))
        .map(|e| e.id)
        .collect();

    let map = &world.map;
    for id in villager_ids {
        let Some(entity) = world.registry.get_mut(id) else {
            continue;
        };
        let pos = entity.pos;
        let name = entity.name.clone();
        let Some(v) = entity.as_villager_mut() else {
            continue;
        };

        let Some((&threat, dist)) = prowlers
            .iter()
            .map(|p| (p, pos.distance(p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
        else {
            continue;
        };

        if dist <= cfg.danger_radius {
            if is_protected(map, pos) || v.has_trait(crate::agents::villager::Temperament::Brave) {
                continue;
            }
            if v.state != VillagerState::Panicking {
                v.state = VillagerState::Panicking;
                v.stress += cfg.panic_stress;
                let away = (pos - threat).normalize();
                v.move_towards(pos + away * cfg.flee_distance);
                log.push(format!("ALARM: {name} flees from a prowler!"));
            }
        } else if v.state == VillagerState::Panicking {
            // Danger has passed
            v.state = VillagerState::Idle;
        }
    }
}

fn social_pass(world: &mut WorldModel, cfg: &SimulationConfig, log: &mut EventLog) {
    // Read-only sweep first; mutations follow once the pairs are chosen
    let villagers: Vec<(EntityId, String, Vec2, f32)> = world
        .registry
        .iter()
        .filter_map(|e| {
            e.as_villager()
                .map(|v| (e.id, e.name.clone(), e.pos, v.social_cooldown))
        })
        .collect();

    let mut engaged: Vec<EntityId> = Vec::new();
    let mut pairs: Vec<(EntityId, EntityId, String, String)> = Vec::new();

    for i in 0..villagers.len() {
        for j in (i + 1)..villagers.len() {
            let (id_a, name_a, pos_a, cd_a) = &villagers[i];
            let (id_b, name_b, pos_b, cd_b) = &villagers[j];
            if *cd_a > 0.0 || *cd_b > 0.0 {
                continue;
            }
            if engaged.contains(id_a) || engaged.contains(id_b) {
                continue;
            }
            if pos_a.distance(pos_b) <= cfg.social_radius {
                engaged.push(*id_a);
                engaged.push(*id_b);
                pairs.push((*id_a, *id_b, name_a.clone(), name_b.clone()));
            }
        }
    }

    for (id_a, id_b, name_a, name_b) in pairs {
        for id in [id_a, id_b] {
            if let Some(v) = world.registry.get_mut(id).and_then(|e| e.as_villager_mut()) {
                v.stress = (v.stress - cfg.social_relief).max(0.0);
                v.social_cooldown = cfg.social_cooldown;
            }
        }
        log.push(format!("TALK: {name_a} and {name_b} chatted for a while."));
    }
}

fn commerce_pass(world: &mut WorldModel, cfg: &SimulationConfig, log: &mut EventLog) {
    // Vendors trade on the surface; their stalls do not follow anyone
    // below ground
    if world.map.layer() != Layer::Surface {
        return;
    }

    let vendor_ids: Vec<EntityId> = world
        .registry
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Vendor(_)))
        .map(|e| e.id)
        .collect();

    for vendor_id in vendor_ids {
        let Some(mut vendor_entity) = world.registry.take(vendor_id) else {
            continue;
        };
        let vendor_pos = vendor_entity.pos;
        if let EntityKind::Vendor(ref mut vendor) = vendor_entity.kind {
            let customer_ids: Vec<EntityId> = world
                .registry
                .iter()
                .filter(|e| {
                    matches!(e.kind, EntityKind::Villager(_))
                        && e.pos.distance(&vendor_pos) <= cfg.commerce_radius
                })
                .map(|e| e.id)
                .collect();

            for id in customer_ids {
                if let Some(entity) = world.registry.get_mut(id) {
                    let name = entity.name.clone();
                    if let Some(v) = entity.as_villager_mut() {
                        crate::agents::vendor::attend_customer(vendor, &name, v, log);
                    }
                }
            }
        }
        world.registry.put_back(vendor_entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::prowler::Prowler;
    use crate::agents::villager::{Temperament, Villager};
    use crate::agents::{Entity, EntityKind};
    use crate::world::building::BuildingId;
    use crate::world::structures::StructureKind;
    use crate::world::terrain::ScenarioKind;
    use rand::SeedableRng;

    fn paved_world() -> WorldModel {
        let cfg = SimulationConfig::default();
        let mut world = WorldModel::new(ScenarioKind::Meadow, 11, &cfg);
        for x in -20..=20 {
            for y in -20..=20 {
                world.map.add_structure((x, y), StructureKind::Bridge);
            }
        }
        world
    }

    fn spawn_villager(world: &mut WorldModel, name: &str, pos: Vec2, rng: &mut ChaCha8Rng) -> EntityId {
        let mut v = Villager::new(Vec2::default(), BuildingId(0), &SimulationConfig::default(), rng);
        v.traits.clear();
        world.spawn(Entity::new(name, pos, EntityKind::Villager(v)))
    }

    #[test]
    fn test_danger_panics_nearby_villager() {
        let mut world = paved_world();
        let cfg = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut log = EventLog::default();

        let vid = spawn_villager(&mut world, "Juan", Vec2::new(0.5, 0.5), &mut rng);
        world.spawn(Entity::new(
            "Wolf",
            Vec2::new(3.5, 0.5),
            EntityKind::Prowler(Prowler::new(Vec2::new(3.5, 0.5))),
        ));

        danger_pass(&mut world, &cfg, &mut log);
        let v = world.registry.get(vid).and_then(Entity::as_villager).expect("villager");
        assert_eq!(v.state, VillagerState::Panicking);
        assert!(v.stress >= cfg.panic_stress);
        // Flees away from the wolf, not toward it
        assert!(v.target.x < 0.5);
    }

    #[test]
    fn test_brave_villager_is_immune() {
        let mut world = paved_world();
        let cfg = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut log = EventLog::default();

        let vid = spawn_villager(&mut world, "Maria", Vec2::new(0.5, 0.5), &mut rng);
        if let Some(v) = world.registry.get_mut(vid).and_then(Entity::as_villager_mut) {
            v.traits.push(Temperament::Brave);
        }
        world.spawn(Entity::new(
            "Wolf",
            Vec2::new(2.5, 0.5),
            EntityKind::Prowler(Prowler::new(Vec2::new(2.5, 0.5))),
        ));

        danger_pass(&mut world, &cfg, &mut log);
        let v = world.registry.get(vid).and_then(Entity::as_villager).expect("villager");
        assert_eq!(v.state, VillagerState::Idle);
    }

    #[test]
    fn test_panic_clears_when_danger_leaves() {
        let mut world = paved_world();
        let cfg = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut log = EventLog::default();

        let vid = spawn_villager(&mut world, "Pedro", Vec2::new(0.5, 0.5), &mut rng);
        let wolf = world.spawn(Entity::new(
            "Wolf",
            Vec2::new(2.5, 0.5),
            EntityKind::Prowler(Prowler::new(Vec2::new(2.5, 0.5))),
        ));
        danger_pass(&mut world, &cfg, &mut log);
        if let Some(w) = world.registry.get_mut(wolf) {
            w.pos = Vec2::new(18.5, 18.5);
        }
        danger_pass(&mut world, &cfg, &mut log);
        let v = world.registry.get(vid).and_then(Entity::as_villager).expect("villager");
        assert_eq!(v.state, VillagerState::Idle);
    }

    #[test]
    fn test_social_interaction_respects_cooldown() {
        let mut world = paved_world();
        let cfg = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut log = EventLog::default();

        let a = spawn_villager(&mut world, "Ana", Vec2::new(0.5, 0.5), &mut rng);
        let b = spawn_villager(&mut world, "Luis", Vec2::new(1.2, 0.5), &mut rng);
        for id in [a, b] {
            if let Some(v) = world.registry.get_mut(id).and_then(Entity::as_villager_mut) {
                v.stress = 50.0;
            }
        }

        social_pass(&mut world, &cfg, &mut log);
        let stress_after_first = world
            .registry
            .get(a)
            .and_then(Entity::as_villager)
            .expect("villager")
            .stress;
        assert_eq!(stress_after_first, 50.0 - cfg.social_relief);

        // Second consecutive tick: still in range, but the cooldown gates it
        social_pass(&mut world, &cfg, &mut log);
        let stress_after_second = world
            .registry
            .get(a)
            .and_then(Entity::as_villager)
            .expect("villager")
            .stress;
        assert_eq!(stress_after_second, stress_after_first);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_commerce_cures_ailing_customer() {
        use crate::agents::vendor::Vendor;
        use crate::agents::villager::Ailment;

        let mut world = paved_world();
        let cfg = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut log = EventLog::default();

        let vid = spawn_villager(&mut world, "Marta", Vec2::new(0.5, 0.5), &mut rng);
        if let Some(v) = world.registry.get_mut(vid).and_then(Entity::as_villager_mut) {
            v.ailment = Some(Ailment::SwampChill);
            v.wealth = 20;
        }
        world.spawn(Entity::new(
            "Stall",
            Vec2::new(1.2, 0.5),
            EntityKind::Vendor(Vendor::new()),
        ));

        commerce_pass(&mut world, &cfg, &mut log);
        let v = world.registry.get(vid).and_then(Entity::as_villager).expect("villager");
        assert!(v.ailment.is_none());
        assert_eq!(v.wealth, 5);
    }
}
