//! Agent-built structure overlay
//!
//! A sparse mapping from grid cell to structure tile, layered between
//! building footprints and base terrain in the walkability composition.
//! Entries are only ever overwritten, never removed: the overlay grows
//! monotonically during normal operation.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Road,
    Fence,
    /// Walkable over water; overrides terrain solidity
    Bridge,
}

impl StructureKind {
    pub fn glyph(self) -> char {
        match self {
            StructureKind::Road => ':',
            StructureKind::Fence => 'x',
            StructureKind::Bridge => '=',
        }
    }

    pub fn solid(self) -> bool {
        matches!(self, StructureKind::Fence)
    }
}

#[derive(Debug, Default)]
pub struct StructureOverlay {
    tiles: AHashMap<Cell, StructureKind>,
}

impl StructureOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-overwrite; idempotent for the same kind
    pub fn insert(&mut self, cell: Cell, kind: StructureKind) {
        self.tiles.insert(cell, kind);
    }

    pub fn get(&self, cell: Cell) -> Option<StructureKind> {
        self.tiles.get(&cell).copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, StructureKind)> + '_ {
        self.tiles.iter().map(|(&c, &k)| (c, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_entry() {
        let mut overlay = StructureOverlay::new();
        overlay.insert((3, 4), StructureKind::Road);
        overlay.insert((3, 4), StructureKind::Bridge);
        assert_eq!(overlay.get((3, 4)), Some(StructureKind::Bridge));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_fence_blocks_road_does_not() {
        assert!(StructureKind::Fence.solid());
        assert!(!StructureKind::Road.solid());
        assert!(!StructureKind::Bridge.solid());
    }
}
