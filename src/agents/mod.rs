//! Entities and per-agent behavior
//!
//! Entity kinds are a closed tagged enum dispatched by pattern match;
//! capability queries (`updatable`, `interactable`) replace scattered
//! "is this a villager" checks in the scheduler and resolver.

pub mod prowler;
pub mod vendor;
pub mod villager;

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Vec2};
use crate::world::building::BuildingId;
use prowler::Prowler;
use vendor::Vendor;
use villager::Villager;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Continuous position; the occupied grid cell is `pos.cell()`
    pub pos: Vec2,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    /// Delivery point; owns the town building
    Home { building: BuildingId },
    Villager(Villager),
    Prowler(Prowler),
    Vendor(Vendor),
}

impl Entity {
    pub fn new(name: impl Into<String>, pos: Vec2, kind: EntityKind) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            pos,
            kind,
        }
    }

    /// Receives a per-frame physics update
    pub fn updatable(&self) -> bool {
        matches!(self.kind, EntityKind::Villager(_) | EntityKind::Prowler(_))
    }

    /// Participates in proximity interactions
    pub fn interactable(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Villager(_) | EntityKind::Vendor(_) | EntityKind::Home { .. }
        )
    }

    pub fn glyph(&self) -> char {
        match &self.kind {
            EntityKind::Home { .. } => 'H',
            EntityKind::Villager(_) => self
                .name
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?'),
            EntityKind::Prowler(_) => 'W',
            EntityKind::Vendor(_) => '$',
        }
    }

    pub fn as_villager(&self) -> Option<&Villager> {
        match &self.kind {
            EntityKind::Villager(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_villager_mut(&mut self) -> Option<&mut Villager> {
        match &mut self.kind {
            EntityKind::Villager(v) => Some(v),
            _ => None,
        }
    }

    /// Drop any cached navigation state; used when the active terrain
    /// swaps and old paths stop meaning anything.
    pub fn halt(&mut self) {
        let pos = self.pos;
        match &mut self.kind {
            EntityKind::Villager(v) => {
                v.path.clear();
                v.target = pos;
            }
            EntityKind::Prowler(p) => {
                p.target = pos;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_by_kind() {
        let home = Entity::new(
            "Home",
            Vec2::default(),
            EntityKind::Home {
                building: BuildingId(0),
            },
        );
        assert!(!home.updatable());
        assert!(home.interactable());
        assert_eq!(home.glyph(), 'H');

        let prowler = Entity::new(
            "Wolf",
            Vec2::default(),
            EntityKind::Prowler(Prowler::new(Vec2::default())),
        );
        assert!(prowler.updatable());
        assert!(!prowler.interactable());
        assert_eq!(prowler.glyph(), 'W');
    }
}
