//! In-world time of day
//!
//! The clock advances from wall-clock delta time; one full day takes
//! `day_length` real seconds. Night scales hostile speed and dims the
//! terminal view.

use serde::{Deserialize, Serialize};

/// Hour at which night ends
const DAWN_HOUR: f32 = 6.0;
/// Hour at which night begins
const DUSK_HOUR: f32 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldClock {
    /// Current time of day in hours, wraps within [0, 24)
    time_of_day: f32,
    /// Real seconds per in-world day
    day_length: f32,
}

impl WorldClock {
    pub fn new(day_length: f32) -> Self {
        Self {
            // Start mid-morning so the first minutes of a run are daylight
            time_of_day: 9.0,
            day_length,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.time_of_day = (self.time_of_day + dt * 24.0 / self.day_length) % 24.0;
    }

    pub fn hour(&self) -> u32 {
        self.time_of_day as u32
    }

    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    pub fn is_night(&self) -> bool {
        self.time_of_day < DAWN_HOUR || self.time_of_day >= DUSK_HOUR
    }

    #[cfg(test)]
    pub fn set_hour(&mut self, hour: f32) {
        self.time_of_day = hour % 24.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps() {
        let mut clock = WorldClock::new(120.0);
        clock.set_hour(23.5);
        // 5 real seconds = 1 in-world hour at day_length 120
        clock.advance(5.0);
        assert!(clock.time_of_day() < 1.0);
    }

    #[test]
    fn test_night_boundaries() {
        let mut clock = WorldClock::new(120.0);
        clock.set_hour(5.9);
        assert!(clock.is_night());
        clock.set_hour(6.0);
        assert!(!clock.is_night());
        clock.set_hour(19.9);
        assert!(!clock.is_night());
        clock.set_hour(20.0);
        assert!(clock.is_night());
    }
}
