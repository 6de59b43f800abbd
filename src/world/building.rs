//! Town buildings with leveled footprints
//!
//! A building holds a discrete level and a derived tile footprint. The
//! footprint is a square ring of walls centered on the building position
//! with exactly one door cell on the southern edge; it is recomputed
//! whenever the level changes and at no other time.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Cell;

/// Index into the world's building table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FootprintTile {
    Wall,
    Door,
    Interior,
}

impl FootprintTile {
    pub fn glyph(self) -> char {
        match self {
            FootprintTile::Wall => 'X',
            FootprintTile::Door => '+',
            FootprintTile::Interior => ' ',
        }
    }

    pub fn walkable(self) -> bool {
        !matches!(self, FootprintTile::Wall)
    }
}

#[derive(Debug, Clone)]
pub struct Building {
    pub id: BuildingId,
    /// Centre cell of the footprint
    pub origin: Cell,
    /// 1..=max; strictly non-decreasing
    level: u32,
    /// Resource units accumulated toward the next level
    stock: u32,
    /// Relative cell -> tile, recomputed on level change
    footprint: AHashMap<Cell, FootprintTile>,
}

impl Building {
    pub fn new(id: BuildingId, origin: Cell) -> Self {
        let mut b = Self {
            id,
            origin,
            level: 1,
            stock: 0,
            footprint: AHashMap::new(),
        };
        b.recompute_footprint();
        b
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Half-extent of the footprint square at the current level
    pub fn half_extent(&self) -> i32 {
        self.level as i32 + 1
    }

    /// Tile at an absolute world cell, if the cell is inside the footprint
    pub fn tile_at(&self, cell: Cell) -> Option<FootprintTile> {
        let rel = (cell.0 - self.origin.0, cell.1 - self.origin.1);
        self.footprint.get(&rel).copied()
    }

    /// Deposit resources; returns every level reached by this deposit.
    ///
    /// Crossing the `level * unit` threshold consumes it and increments
    /// the level once, up to `max_level`. A single large deposit may
    /// cross several thresholds.
    pub fn deposit(&mut self, amount: u32, unit: u32, max_level: u32) -> Vec<u32> {
        self.stock += amount;
        let mut reached = Vec::new();
        while self.level < max_level && self.stock >= self.level * unit {
            self.stock -= self.level * unit;
            self.level += 1;
            self.recompute_footprint();
            reached.push(self.level);
        }
        reached
    }

    /// Restore persisted level/stock, rebuilding the footprint
    pub fn restore(id: BuildingId, origin: Cell, level: u32, stock: u32) -> Self {
        let mut b = Self {
            id,
            origin,
            level: level.max(1),
            stock,
            footprint: AHashMap::new(),
        };
        b.recompute_footprint();
        b
    }

    fn recompute_footprint(&mut self) {
        self.footprint.clear();
        let half = self.half_extent();
        for dy in -half..=half {
            for dx in -half..=half {
                let on_ring = dx.abs() == half || dy.abs() == half;
                let tile = if on_ring {
                    // One door at the centre of the southern (+y) edge
                    if dx == 0 && dy == half {
                        FootprintTile::Door
                    } else {
                        FootprintTile::Wall
                    }
                } else {
                    FootprintTile::Interior
                };
                self.footprint.insert((dx, dy), tile);
            }
        }
    }

    pub fn footprint_iter(&self) -> impl Iterator<Item = (Cell, FootprintTile)> + '_ {
        self.footprint.iter().map(|(&c, &t)| (c, t))
    }
}
