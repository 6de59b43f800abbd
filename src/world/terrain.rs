//! Procedural terrain sources
//!
//! Terrain is a pure function of (x, y) -> biome, derived from seeded
//! value noise. Each scenario implements the same `TerrainSource` trait
//! so the world model composes walkability identically regardless of
//! which generator is active.

use serde::{Deserialize, Serialize};

use crate::core::types::Cell;
use crate::world::biome::Biome;
use crate::world::noise::ValueNoise;

/// A legend row: glyph, description
pub type LegendEntry = (&'static str, &'static str);

/// Swappable world generator strategy
pub trait TerrainSource {
    fn name(&self) -> &'static str;

    /// Biome at a continuous coordinate; deterministic for a fixed seed
    fn biome_at(&self, x: f32, y: f32) -> Biome;

    /// Door cells punched into otherwise solid terrain
    fn is_door(&self, _cell: Cell) -> bool {
        false
    }

    /// Portal cells that connect to the sub-world (or back)
    fn portal_at(&self, _cell: Cell) -> bool {
        false
    }

    fn legend(&self) -> &'static [LegendEntry];
}

/// Scenario selector, recorded in snapshots so a load can rebuild the
/// same terrain from the same seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ScenarioKind {
    /// Open wilds: meadow, forest, swamp, desert, lakes
    Meadow,
    /// City blocks with streets, sidewalks and walled interiors
    Township,
}

impl ScenarioKind {
    pub fn build(self, seed: u64) -> Box<dyn TerrainSource> {
        match self {
            ScenarioKind::Meadow => Box::new(MeadowTerrain::new(seed)),
            ScenarioKind::Township => Box::new(TownshipTerrain::new(seed)),
        }
    }
}

// ---------------------------------------------------------------------------
// Meadow

/// Cave mouth on the surface of the wilds
pub const MEADOW_PORTAL: Cell = (18, -12);

/// Quadrant biomes with noise-jittered borders and noise-carved lakes
pub struct MeadowTerrain {
    noise: ValueNoise,
}

impl MeadowTerrain {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: ValueNoise::new(seed),
        }
    }
}

impl TerrainSource for MeadowTerrain {
    fn name(&self) -> &'static str {
        "Meadow"
    }

    fn biome_at(&self, x: f32, y: f32) -> Biome {
        // Lakes first so they can cut through any quadrant; the home
        // clearing around the origin stays dry
        let in_clearing = x.abs() < 12.0 && y.abs() < 12.0;
        if !in_clearing && self.noise.sample(x * 0.08 + 100.0, y * 0.08) > 0.62 {
            return Biome::Water;
        }

        let jitter = self.noise.fbm(x * 0.05, y * 0.05, 2) * 12.0;
        if y + jitter > 40.0 {
            Biome::Forest
        } else if y + jitter < -40.0 {
            Biome::Swamp
        } else if x + jitter > 40.0 {
            Biome::Desert
        } else {
            Biome::Meadow
        }
    }

    fn portal_at(&self, cell: Cell) -> bool {
        cell == MEADOW_PORTAL
    }

    fn legend(&self) -> &'static [LegendEntry] {
        &[
            (".", "Meadow: relaxing"),
            ("'", "Forest: wood grows here"),
            ("=", "Swamp: slow, stressful"),
            ("~", "Desert: fast, draining"),
            ("~", "Water: impassable"),
            ("O", "Cave mouth"),
        ]
    }
}

// ---------------------------------------------------------------------------
// Township

/// Side of one city block in cells
const BLOCK: i32 = 40;

/// Street-corner manhole leading below
pub const TOWNSHIP_PORTAL: Cell = (4, 4);

/// Repeating city blocks: street ring, sidewalks, building shell with a
/// south-facade door
pub struct TownshipTerrain {
    noise: ValueNoise,
}

impl TownshipTerrain {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: ValueNoise::new(seed),
        }
    }

    fn block_coords(x: f32, y: f32) -> (i32, i32) {
        (
            (x.floor() as i32).rem_euclid(BLOCK),
            (y.floor() as i32).rem_euclid(BLOCK),
        )
    }
}

impl TerrainSource for TownshipTerrain {
    fn name(&self) -> &'static str {
        "Township"
    }

    fn biome_at(&self, x: f32, y: f32) -> Biome {
        let (bx, by) = Self::block_coords(x, y);

        // Asphalt ring, 8 cells wide
        if bx < 8 || by < 8 {
            return Biome::Street;
        }
        // Sidewalks flanking the street and the building shell
        if bx < 12 || bx >= 36 || by < 12 || by >= 36 {
            // A few sidewalk stretches are planted as pocket parks
            if self.noise.sample(x * 0.03, y * 0.03) > 0.55 {
                return Biome::Park;
            }
            return Biome::Sidewalk;
        }
        // Building shell from 12 to 35 inclusive
        if bx == 12 || bx == 35 || by == 12 || by == 35 {
            return Biome::Wall;
        }
        Biome::Interior
    }

    fn is_door(&self, cell: Cell) -> bool {
        let (bx, by) = (cell.0.rem_euclid(BLOCK), cell.1.rem_euclid(BLOCK));
        // Centre of the south facade of every block
        by == 35 && bx == 24
    }

    fn portal_at(&self, cell: Cell) -> bool {
        cell == TOWNSHIP_PORTAL
    }

    fn legend(&self) -> &'static [LegendEntry] {
        &[
            ("X", "Building wall"),
            ("+", "Entrance door"),
            ("#", "Street: fast, noisy"),
            (".", "Sidewalk"),
            (" ", "Interior: calm, safe"),
            ("v", "Park: relaxing"),
            ("O", "Manhole"),
        ]
    }
}

// ---------------------------------------------------------------------------
// Cavern (sub-world)

/// Noise-carved tunnels with lava pockets, crystal growths and gold veins
pub struct CavernTerrain {
    noise: ValueNoise,
    depth: u32,
}

impl CavernTerrain {
    pub fn new(seed: u64, depth: u32) -> Self {
        Self {
            noise: ValueNoise::new(seed.wrapping_add(depth as u64)),
            depth,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl TerrainSource for CavernTerrain {
    fn name(&self) -> &'static str {
        "Cavern"
    }

    fn biome_at(&self, x: f32, y: f32) -> Biome {
        let n = self.noise.sample(x * 0.1, y * 0.1);

        // Organic tunnels where the field crosses zero
        if n.abs() < 0.25 {
            let detail = self.noise.sample(x * 0.5, y * 0.5);
            if detail > 0.8 {
                return Biome::Lava;
            }
            if detail < -0.8 {
                return Biome::Crystal;
            }
            return Biome::CaveFloor;
        }
        if n.abs() > 0.85 {
            return Biome::GoldVein;
        }
        Biome::CaveWall
    }

    fn portal_at(&self, cell: Cell) -> bool {
        // The entry shaft back to the surface
        cell.0.abs() < 2 && cell.1.abs() < 2
    }

    fn legend(&self) -> &'static [LegendEntry] {
        &[
            (".", "Cave floor"),
            ("#", "Rock"),
            ("*", "Crystal growth"),
            ("~", "Lava: impassable"),
            ("$", "Gold vein"),
            ("0", "Shaft to the surface"),
        ]
    }
}
