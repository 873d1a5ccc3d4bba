//! Tick counter and derived game time: hour of day, day count, season.

use serde::{Deserialize, Serialize};

/// Four ticks per in-game hour.
pub const TICKS_PER_HOUR: u64 = 4;
/// A full day/night cycle.
pub const TICKS_PER_DAY: u64 = 24 * TICKS_PER_HOUR;
/// Season length in ticks (30 in-game days of 24 ticks in the
/// original pacing).
pub const SEASON_LENGTH: u64 = 24 * 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Seasonal multiplier on the rain chance.
    pub fn rain_factor(self) -> f32 {
        match self {
            Season::Spring => 1.2,
            Season::Summer => 0.6,
            Season::Autumn => 1.0,
            Season::Winter => 0.8,
        }
    }

    /// Seasonal multiplier on evaporation.
    pub fn evaporation_factor(self) -> f32 {
        match self {
            Season::Spring => 1.0,
            Season::Summer => 1.5,
            Season::Autumn => 1.0,
            Season::Winter => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    step_count: u64,
    game_time: f32,
    day_count: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            step_count: 0,
            game_time: 0.0,
            day_count: 1,
        }
    }

    /// Advance one tick and recompute the derived time fields.
    pub fn advance(&mut self) {
        self.step_count += 1;
        self.game_time = (self.step_count % TICKS_PER_DAY) as f32 / TICKS_PER_HOUR as f32;
        self.day_count = self.step_count / TICKS_PER_DAY + 1;
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Fractional hour of day in `[0, 24)`.
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    pub fn hour(&self) -> u32 {
        self.game_time as u32
    }

    pub fn day_count(&self) -> u64 {
        self.day_count
    }

    /// Daytime is the half-open hour interval [6, 18).
    pub fn is_daytime(&self) -> bool {
        (6..18).contains(&self.hour())
    }

    pub fn season(&self) -> Season {
        let index = (self.step_count % (SEASON_LENGTH * 4)) / SEASON_LENGTH;
        Season::ALL[index as usize]
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
