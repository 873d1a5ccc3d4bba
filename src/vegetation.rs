//! Grass regrowth: eaten tiles carry a tick deadline after which they
//! turn fresh again, with daylight and damp soil pulling the deadline
//! forward.

use crate::clock::Clock;
use crate::clouds::CloudField;
use crate::grid::{Grid, Tile};
use crate::rng::SimRng;
use crate::water::WaterLayers;

/// Energy an agent gains from grazing one fresh tile.
pub const FORAGE_ENERGY: f32 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Vegetation {
    timers: Grid<u64>,
}

impl Vegetation {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            timers: Grid::fill(width, height, 0),
        }
    }

    pub fn from_timers(timers: Grid<u64>) -> Self {
        Self { timers }
    }

    pub fn timers(&self) -> &Grid<u64> {
        &self.timers
    }

    pub fn timer_at(&self, x: i32, y: i32) -> u64 {
        self.timers.at(x, y)
    }

    /// Eat the grass at `(x, y)`. Only fresh grass is affected; the
    /// tile turns eaten and its regrowth deadline is scheduled
    /// `max(10, 60 - rate*5) + uniform_int(0, 19)` ticks out.
    pub fn forage(
        &mut self,
        tiles: &mut Grid<Tile>,
        x: i32,
        y: i32,
        step_count: u64,
        grass_growth_rate: f32,
        rng: &mut SimRng,
    ) -> bool {
        if tiles.at(x, y) != Tile::GrassFresh {
            return false;
        }
        tiles.set(x, y, Tile::GrassEaten);
        let base = (60.0 - grass_growth_rate * 5.0).max(10.0) as u64;
        let jitter = rng.below(20) as u64;
        self.timers.set(x, y, step_count + base + jitter);
        true
    }

    /// Revert eaten tiles whose deadline has come. Favorable light and
    /// soil moisture can fire regrowth a few ticks early: the bonus is
    /// `floor(day * light * (1 + soil*2))`, so a saturated, sunlit
    /// cell regrows up to three ticks ahead of schedule.
    pub fn step(
        &mut self,
        tiles: &mut Grid<Tile>,
        clouds: &CloudField,
        water: &WaterLayers,
        clock: &Clock,
    ) {
        let day_bonus: f32 = if clock.is_daytime() { 1.0 } else { 0.0 };
        let step_count = clock.step_count();
        for y in 0..tiles.height() as i32 {
            for x in 0..tiles.width() as i32 {
                if tiles.at(x, y) != Tile::GrassEaten || self.timers.at(x, y) == 0 {
                    continue;
                }
                let light_bonus = if clock.is_daytime() {
                    1.0 - clouds.shadow_at(x, y)
                } else {
                    0.2
                };
                let moisture_bonus = water.soil_at(x, y) * 2.0;
                let bonus = (day_bonus * light_bonus * (1.0 + moisture_bonus)).floor() as u64;
                if step_count >= self.timers.at(x, y).saturating_sub(bonus) {
                    tiles.set(x, y, Tile::GrassFresh);
                    self.timers.set(x, y, 0);
                }
            }
        }
    }
}
