//! Hostile patrol behavior
//!
//! A prowler wanders between random offsets, faster after dark. It has
//! no stress or energy model: pick a target, walk straight at it, pick
//! a new one on arrival or on collision.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Vec2;
use crate::core::WorldClock;
use crate::world::WorldMap;

/// Half-extent of the random retarget square
const ROAM_RANGE: f32 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prowler {
    pub target: Vec2,
    pub dwell_timer: f32,
}

impl Prowler {
    pub fn new(start: Vec2) -> Self {
        Self {
            target: start,
            dwell_timer: 0.0,
        }
    }
}

pub fn update_prowler(
    pos: &mut Vec2,
    p: &mut Prowler,
    dt: f32,
    map: &WorldMap,
    clock: &WorldClock,
    cfg: &SimulationConfig,
    rng: &mut ChaCha8Rng,
) {
    let night = clock.is_night();
    let speed = if night {
        cfg.prowler_speed * cfg.prowler_night_mult
    } else {
        cfg.prowler_speed
    };

    let delta = p.target - *pos;
    let dist = delta.length();

    if dist > 0.5 {
        let step = (speed * dt).min(dist);
        let next = *pos + delta.normalize() * step;
        if map.is_walkable(next.x, next.y) {
            *pos = next;
        } else {
            // Bounce off the obstacle toward somewhere new
            retarget(pos, p, rng);
        }
    } else {
        p.dwell_timer += dt;
        let dwell = if night {
            cfg.prowler_dwell_night
        } else {
            cfg.prowler_dwell_day
        };
        if p.dwell_timer > dwell {
            p.dwell_timer = 0.0;
            retarget(pos, p, rng);
        }
    }
}

fn retarget(pos: &Vec2, p: &mut Prowler, rng: &mut ChaCha8Rng) {
    p.target = Vec2::new(
        pos.x + rng.gen_range(-ROAM_RANGE..=ROAM_RANGE),
        pos.y + rng.gen_range(-ROAM_RANGE..=ROAM_RANGE),
    );
}
