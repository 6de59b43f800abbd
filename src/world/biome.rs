//! Biome catalog
//!
//! A biome is a named terrain category with fixed display and physical
//! attributes. Speed modifiers are multiplicative; stress and energy
//! deltas are additive per second of wall time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    // Surface wilds
    Meadow,
    Forest,
    Swamp,
    Desert,
    Water,
    // Township
    Street,
    Sidewalk,
    Wall,
    Interior,
    Park,
    // Underworld
    CaveFloor,
    CaveWall,
    Crystal,
    Lava,
    GoldVein,
}

/// Static attributes of a biome
#[derive(Debug, Clone, Copy)]
pub struct BiomeProfile {
    pub glyph: char,
    pub solid: bool,
    /// Multiplier on agent walking speed
    pub speed_mult: f32,
    /// Stress added per second spent in the biome (negative relaxes)
    pub stress_mod: f32,
    /// Energy drained per second spent in the biome
    pub energy_drain: f32,
}

impl Biome {
    pub fn profile(self) -> &'static BiomeProfile {
        match self {
            Biome::Meadow => &BiomeProfile {
                glyph: '.',
                solid: false,
                speed_mult: 1.0,
                stress_mod: -1.0,
                energy_drain: 0.0,
            },
            Biome::Forest => &BiomeProfile {
                glyph: '\'',
                solid: false,
                speed_mult: 1.0,
                stress_mod: 0.0,
                energy_drain: 0.0,
            },
            Biome::Swamp => &BiomeProfile {
                glyph: '=',
                solid: false,
                speed_mult: 0.5,
                stress_mod: 1.0,
                energy_drain: 0.0,
            },
            Biome::Desert => &BiomeProfile {
                glyph: '~',
                solid: false,
                speed_mult: 1.3,
                stress_mod: 0.0,
                energy_drain: 1.0,
            },
            Biome::Water => &BiomeProfile {
                glyph: '~',
                solid: true,
                speed_mult: 0.0,
                stress_mod: 0.0,
                energy_drain: 0.0,
            },
            Biome::Street => &BiomeProfile {
                glyph: '#',
                solid: false,
                speed_mult: 1.8,
                stress_mod: 1.0,
                energy_drain: 0.0,
            },
            Biome::Sidewalk => &BiomeProfile {
                glyph: '.',
                solid: false,
                speed_mult: 1.0,
                stress_mod: 0.0,
                energy_drain: 0.0,
            },
            Biome::Wall => &BiomeProfile {
                glyph: 'X',
                solid: true,
                speed_mult: 0.0,
                stress_mod: 0.0,
                energy_drain: 0.0,
            },
            Biome::Interior => &BiomeProfile {
                glyph: ' ',
                solid: false,
                speed_mult: 0.6,
                stress_mod: -2.0,
                energy_drain: 0.0,
            },
            Biome::Park => &BiomeProfile {
                glyph: 'v',
                solid: false,
                speed_mult: 1.0,
                stress_mod: -3.0,
                energy_drain: 0.0,
            },
            Biome::CaveFloor => &BiomeProfile {
                glyph: '.',
                solid: false,
                speed_mult: 0.9,
                stress_mod: 0.5,
                energy_drain: 0.0,
            },
            Biome::CaveWall => &BiomeProfile {
                glyph: '#',
                solid: true,
                speed_mult: 0.0,
                stress_mod: 0.0,
                energy_drain: 0.0,
            },
            Biome::Crystal => &BiomeProfile {
                glyph: '*',
                solid: false,
                speed_mult: 0.9,
                stress_mod: -2.0,
                energy_drain: 0.0,
            },
            Biome::Lava => &BiomeProfile {
                glyph: '~',
                solid: true,
                speed_mult: 0.0,
                stress_mod: 0.0,
                energy_drain: 0.0,
            },
            Biome::GoldVein => &BiomeProfile {
                glyph: '$',
                solid: true,
                speed_mult: 0.0,
                stress_mod: 0.0,
                energy_drain: 0.0,
            },
        }
    }

    pub fn is_solid(self) -> bool {
        self.profile().solid
    }

    pub fn glyph(self) -> char {
        self.profile().glyph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_biomes() {
        assert!(Biome::Wall.is_solid());
        assert!(Biome::Water.is_solid());
        assert!(Biome::Lava.is_solid());
        assert!(!Biome::Meadow.is_solid());
        assert!(!Biome::Interior.is_solid());
    }

    #[test]
    fn test_swamp_slows() {
        assert!(Biome::Swamp.profile().speed_mult < 1.0);
        assert!(Biome::Street.profile().speed_mult > 1.0);
    }
}
