//! Simulation configuration with documented constants
//!
//! All tuning values are collected here with explanations of their purpose
//! and how they interact with each other.

use crate::core::error::{HollowError, Result};

/// Configuration for the simulation systems
///
/// These values have been tuned to produce readable pacing at 20 FPS.
/// Changing them affects gameplay feel, not correctness.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // === SCHEDULING ===
    /// Target frames per second for the outer loop
    pub fps: u32,

    /// Upper bound on a single frame's delta time (seconds)
    ///
    /// Prevents a large catch-up jump after a stall: agents never move
    /// more than one clamped step no matter how long the process slept.
    pub max_frame_dt: f32,

    /// Seconds of accumulated wall time between logic/interaction passes
    ///
    /// Decisions and interactions are much more expensive than per-frame
    /// movement, so they run at this coarser cadence.
    pub logic_interval: f32,

    /// Seconds between an individual agent's decision evaluations
    ///
    /// Distinct from `logic_interval`: each agent carries its own timer,
    /// so decisions are staggered rather than synchronized.
    pub decision_interval: f32,

    /// Seconds of wall time per full in-world day
    pub day_length: f32,

    // === VILLAGER BEHAVIOR ===
    /// Base walking speed in cells per second
    pub villager_speed: f32,

    /// Energy below which an agent heads home to rest
    pub go_home_energy: f32,

    /// Energy below which an agent arriving home sleeps instead of idling
    pub rest_below_energy: f32,

    /// Energy restored per decision tick while resting
    pub rest_recovery: f32,

    /// Probability per decision tick that an idle agent goes exploring
    pub explore_chance: f64,

    /// Probability per decision tick that a searching agent starts
    /// gathering, provided it stands in the resource biome
    pub gather_chance: f64,

    /// Half-extent of the random exploration square around home
    pub explore_range: i32,

    /// Wood carried before the agent turns back home
    pub carry_capacity: u32,

    /// Distance at which a movement target counts as reached
    pub arrival_radius: f32,

    /// Seconds to wait before re-requesting a failed path
    ///
    /// An unreachable goal (across a lake, walled off) would otherwise
    /// trigger a full A* search every decision tick.
    pub path_retry_cooldown: f32,

    /// Chance per decision tick that a hauling villager lays a road tile
    pub road_lay_chance: f64,

    // === STRESS / PANIC ===
    /// Stress added when a hostile forces an agent into panic
    pub panic_stress: f32,

    /// Distance an agent flees from the danger source
    pub flee_distance: f32,

    /// Stress at which productive behavior freezes (strike)
    pub strike_stress: f32,

    /// Stress below which a striking agent resumes work
    pub strike_recover_stress: f32,

    /// Stress shed per decision tick while on strike
    pub strike_decay: f32,

    // === HOSTILES ===
    /// Prowler base speed in cells per second
    pub prowler_speed: f32,

    /// Speed multiplier applied to prowlers at night
    pub prowler_night_mult: f32,

    /// Seconds a prowler dwells at a reached target by day
    pub prowler_dwell_day: f32,

    /// Seconds a prowler dwells at a reached target by night
    pub prowler_dwell_night: f32,

    // === INTERACTIONS ===
    /// Radius within which a hostile frightens a villager
    pub danger_radius: f32,

    /// Radius within which two villagers socialize
    pub social_radius: f32,

    /// Stress relieved on each side of a social encounter
    pub social_relief: f32,

    /// Seconds before an agent can socialize again
    ///
    /// Without this, two agents standing together would trigger the
    /// interaction on every logic tick.
    pub social_cooldown: f32,

    /// Radius within which a villager trades with a vendor
    pub commerce_radius: f32,

    // === PATHFINDING ===
    /// Maximum open-set pops before a search gives up
    ///
    /// Bounds exploration on disconnected regions; an exhausted search
    /// returns an empty path, which callers treat as "retry later".
    pub max_expansions: usize,

    // === BUILDINGS ===
    /// Resource units needed per level: threshold to leave level L is L * this
    pub stock_per_level: u32,

    /// Level cap for the town building
    pub max_building_level: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fps: 20,
            max_frame_dt: 0.1,
            logic_interval: 2.0,
            decision_interval: 2.5,
            day_length: 120.0,

            villager_speed: 5.0,
            go_home_energy: 20.0,
            rest_below_energy: 50.0,
            rest_recovery: 15.0,
            explore_chance: 0.3,
            gather_chance: 0.2,
            explore_range: 15,
            carry_capacity: 3,
            arrival_radius: 0.5,
            path_retry_cooldown: 3.0,
            road_lay_chance: 0.15,

            panic_stress: 25.0,
            flee_distance: 12.0,
            strike_stress: 80.0,
            strike_recover_stress: 40.0,
            strike_decay: 5.0,

            prowler_speed: 3.0,
            prowler_night_mult: 2.5,
            prowler_dwell_day: 5.0,
            prowler_dwell_night: 2.0,

            danger_radius: 5.0,
            social_radius: 1.8,
            social_relief: 8.0,
            social_cooldown: 20.0,
            commerce_radius: 1.5,

            max_expansions: 2000,

            stock_per_level: 50,
            max_building_level: 5,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(HollowError::InvalidConfig("fps must be positive".into()));
        }
        if self.max_frame_dt <= 0.0 {
            return Err(HollowError::InvalidConfig(
                "max_frame_dt must be positive".into(),
            ));
        }
        if self.strike_recover_stress >= self.strike_stress {
            return Err(HollowError::InvalidConfig(format!(
                "strike_recover_stress ({}) should be < strike_stress ({})",
                self.strike_recover_stress, self.strike_stress
            )));
        }
        if self.go_home_energy >= self.rest_below_energy {
            return Err(HollowError::InvalidConfig(format!(
                "go_home_energy ({}) should be < rest_below_energy ({})",
                self.go_home_energy, self.rest_below_energy
            )));
        }
        if self.social_radius > self.danger_radius {
            return Err(HollowError::InvalidConfig(format!(
                "social_radius ({}) should be <= danger_radius ({})",
                self.social_radius, self.danger_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_strike_thresholds_rejected() {
        let mut cfg = SimulationConfig::default();
        cfg.strike_recover_stress = cfg.strike_stress + 1.0;
        assert!(cfg.validate().is_err());
    }
}
