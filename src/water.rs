//! Water cycle: precipitation, transpiration, evaporation, runoff and
//! soil moisture, plus the ground/water tile transitions they drive.
//!
//! The five phases run in a fixed order each tick and each completes
//! over the whole grid before the next begins.

use crate::clock::Clock;
use crate::clouds::CloudField;
use crate::grid::{Grid, Tile};
use crate::rng::SimRng;

/// Base evaporation per tick.
pub const EVAPORATION_RATE: f32 = 0.002;
/// Cloud density needed before rain can fall.
pub const RAIN_THRESHOLD: f32 = 0.6;
/// Water added by one rainfall event, before the random 1x-2x factor.
pub const RAIN_INTENSITY: f32 = 0.02;
/// Fraction of the elevation difference that flows per tick.
pub const RUNOFF_RATE: f32 = 0.1;
/// Surface water absorbed into soil per tick.
pub const SOIL_ABSORPTION: f32 = 0.001;
/// Base transpiration rate for tree tiles.
pub const TRANSPIRATION_RATE: f32 = 0.01;

/// Surface water level above which a cell floods into `Water`.
const FLOOD_LEVEL: f32 = 0.7;
/// Level below which a `Water` cell dries back to `Ground`.
const DRAIN_LEVEL: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct WaterLayers {
    levels: Grid<f32>,
    soil: Grid<f32>,
    elevation: Grid<f32>,
    precipitation: Grid<f32>,
    evaporation: Grid<f32>,
}

impl WaterLayers {
    /// Seed the layers from the terrain: water tiles start full,
    /// elevation is random and static, soil starts half-damp at most.
    pub fn generate(tiles: &Grid<Tile>, rng: &mut SimRng) -> Self {
        let (width, height) = (tiles.width(), tiles.height());
        let mut levels = Grid::fill(width, height, 0.0f32);
        let mut soil = Grid::fill(width, height, 0.0f32);
        let mut elevation = Grid::fill(width, height, 0.0f32);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if tiles.at(x, y) == Tile::Water {
                    levels.set(x, y, 1.0);
                }
                elevation.set(x, y, rng.uniform(0.0, 1.0));
                soil.set(x, y, rng.uniform(0.0, 0.5));
            }
        }
        Self {
            levels,
            soil,
            elevation,
            precipitation: Grid::fill(width, height, 0.0),
            evaporation: Grid::fill(width, height, 0.0),
        }
    }

    pub fn from_parts(levels: Grid<f32>, soil: Grid<f32>, elevation: Grid<f32>) -> Self {
        let (width, height) = (levels.width(), levels.height());
        Self {
            levels,
            soil,
            elevation,
            precipitation: Grid::fill(width, height, 0.0),
            evaporation: Grid::fill(width, height, 0.0),
        }
    }

    pub fn levels(&self) -> &Grid<f32> {
        &self.levels
    }

    pub fn soil(&self) -> &Grid<f32> {
        &self.soil
    }

    pub fn elevation(&self) -> &Grid<f32> {
        &self.elevation
    }

    pub fn level_at(&self, x: i32, y: i32) -> f32 {
        self.levels.at(x, y)
    }

    pub fn soil_at(&self, x: i32, y: i32) -> f32 {
        self.soil.at(x, y)
    }

    /// Combined drinkable-water signal agents can sense.
    pub fn availability_at(&self, x: i32, y: i32) -> f32 {
        self.levels.at(x, y).max(self.soil.at(x, y) * 0.5)
    }

    pub fn is_raining_at(&self, x: i32, y: i32) -> bool {
        self.precipitation.at(x, y) > 0.0
    }

    /// One full water-cycle tick.
    pub fn step(
        &mut self,
        tiles: &mut Grid<Tile>,
        clouds: &mut CloudField,
        clock: &Clock,
        rng: &mut SimRng,
    ) {
        self.precipitate(clouds, clock, rng);
        self.transpire(tiles, clouds, clock);
        self.evaporate(clouds, clock);
        self.runoff();
        self.update_soil(clock);
        self.reshape_tiles(tiles);
    }

    /// Phase 1: rain wherever the overhead cloud is dense enough.
    fn precipitate(&mut self, clouds: &CloudField, clock: &Clock, rng: &mut SimRng) {
        let seasonal = clock.season().rain_factor();
        for y in 0..self.levels.height() as i32 {
            for x in 0..self.levels.width() as i32 {
                self.precipitation.set(x, y, 0.0);
                let density = clouds.density_at(x, y);
                if density > RAIN_THRESHOLD {
                    let rain_chance = (density - RAIN_THRESHOLD) * seasonal;
                    if rng.chance(rain_chance) {
                        let fall = RAIN_INTENSITY * (1.0 + rng.uniform(0.0, 1.0));
                        self.precipitation.set(x, y, fall);
                        let level = (self.levels.at(x, y) + fall).min(1.0);
                        self.levels.set(x, y, level);
                    }
                }
            }
        }
    }

    /// Phase 2: trees pump soil moisture back into the cloud layer,
    /// harder in direct daylight.
    fn transpire(&mut self, tiles: &Grid<Tile>, clouds: &mut CloudField, clock: &Clock) {
        let is_day = clock.is_daytime();
        for y in 0..self.soil.height() as i32 {
            for x in 0..self.soil.width() as i32 {
                if tiles.at(x, y) != Tile::Tree || self.soil.at(x, y) <= 0.3 {
                    continue;
                }
                let shadow = clouds.shadow_at(x, y);
                let sunlight = if is_day { 1.5 - shadow * 0.7 } else { 0.7 };
                let rate = TRANSPIRATION_RATE * sunlight;
                let soil = (self.soil.at(x, y) - rate * 0.8).max(0.0);
                self.soil.set(x, y, soil);
                clouds.add_moisture(x, y, rate);
            }
        }
    }

    /// Phase 3: standing water evaporates into the cloud layer.
    fn evaporate(&mut self, clouds: &mut CloudField, clock: &Clock) {
        let is_day = clock.is_daytime();
        let base = if is_day {
            EVAPORATION_RATE * 2.0
        } else {
            EVAPORATION_RATE * 0.5
        };
        let seasonal = clock.season().evaporation_factor();
        for y in 0..self.levels.height() as i32 {
            for x in 0..self.levels.width() as i32 {
                if self.levels.at(x, y) <= 0.0 {
                    self.evaporation.set(x, y, 0.0);
                    continue;
                }
                let shadow = clouds.shadow_at(x, y);
                let sunlight = if is_day { 1.0 - shadow * 0.7 } else { 0.3 };
                let lost = base * sunlight * seasonal;
                self.evaporation.set(x, y, lost);
                let level = (self.levels.at(x, y) - lost).max(0.0);
                self.levels.set(x, y, level);
                if lost > 0.0 {
                    clouds.add_moisture(x, y, lost);
                }
            }
        }
    }

    /// Phase 4: lateral flow from higher to strictly lower neighbors.
    /// Each of the 8 neighbors is capped independently at 25% of the
    /// source cell's pre-phase water, so a steep cell can nominally
    /// shed more than it holds; the source is clamped at zero rather
    /// than normalized.
    fn runoff(&mut self) {
        let mut next = self.levels.clone();
        for y in 0..self.levels.height() as i32 {
            for x in 0..self.levels.width() as i32 {
                let current = self.levels.at(x, y);
                if current <= 0.1 {
                    continue;
                }
                let here = self.elevation.at(x, y);
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (x + dx, y + dy);
                        if !self.levels.in_bounds(nx, ny) {
                            continue;
                        }
                        let drop = here - self.elevation.at(nx, ny);
                        if drop <= 0.0 {
                            continue;
                        }
                        let flow = (current * RUNOFF_RATE * drop).min(current * 0.25);
                        if flow > 0.001 {
                            next.set(x, y, (next.at(x, y) - flow).max(0.0));
                            next.set(nx, ny, (next.at(nx, ny) + flow).min(1.0));
                        }
                    }
                }
            }
        }
        self.levels = next;
    }

    /// Phase 5a: soil absorbs surface water and fresh rain, then dries.
    fn update_soil(&mut self, clock: &Clock) {
        let drying = if clock.is_daytime() { 0.002 } else { 0.001 };
        for y in 0..self.soil.height() as i32 {
            for x in 0..self.soil.width() as i32 {
                let mut soil = self.soil.at(x, y);
                let level = self.levels.at(x, y);
                if level > 0.0 {
                    let absorbed = SOIL_ABSORPTION.min(level);
                    soil = (soil + absorbed).min(1.0);
                    self.levels.set(x, y, level - absorbed);
                }
                let rain = self.precipitation.at(x, y);
                if rain > 0.0 {
                    soil = (soil + rain * 0.3).min(1.0);
                }
                self.soil.set(x, y, (soil - drying).max(0.0));
            }
        }
    }

    /// Phase 5b: flood and drain tile transitions.
    fn reshape_tiles(&mut self, tiles: &mut Grid<Tile>) {
        for y in 0..tiles.height() as i32 {
            for x in 0..tiles.width() as i32 {
                let level = self.levels.at(x, y);
                let tile = tiles.at(x, y);
                if level > FLOOD_LEVEL && tile != Tile::Water && tile != Tile::Tree {
                    tiles.set(x, y, Tile::Water);
                } else if level < DRAIN_LEVEL && tile == Tile::Water {
                    tiles.set(x, y, Tile::Ground);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_world(width: usize, height: usize) -> (Grid<Tile>, WaterLayers, CloudField, Clock) {
        let tiles = Grid::fill(width, height, Tile::Ground);
        let layers = WaterLayers::from_parts(
            Grid::fill(width, height, 0.0),
            Grid::fill(width, height, 0.0),
            Grid::fill(width, height, 0.5),
        );
        let mut rng = SimRng::seeded(11);
        let clouds = CloudField::generate(width, height, 0.0, &mut rng);
        (tiles, layers, clouds, Clock::new())
    }

    fn daytime_clock() -> Clock {
        let mut clock = Clock::new();
        for _ in 0..(8 * crate::clock::TICKS_PER_HOUR) {
            clock.advance();
        }
        assert!(clock.is_daytime());
        clock
    }

    #[test]
    fn no_clouds_means_no_rain() {
        let (mut tiles, mut layers, mut clouds, clock) = dry_world(10, 10);
        let mut rng = SimRng::seeded(2);
        for _ in 0..50 {
            layers.step(&mut tiles, &mut clouds, &clock, &mut rng);
        }
        assert!(layers.levels().cells().iter().all(|&l| l == 0.0));
        assert!((0..10).all(|y| (0..10).all(|x| !layers.is_raining_at(x, y))));
    }

    #[test]
    fn dense_cloud_rains_and_raises_water() {
        let (_, mut layers, mut clouds, clock) = dry_world(5, 5);
        // Saturate the sky so the rain chance exceeds one.
        for y in 0..5 {
            for x in 0..5 {
                clouds.add_moisture(x, y, 5.0);
            }
        }
        let mut rng = SimRng::seeded(6);
        layers.precipitate(&clouds, &clock, &mut rng);
        // Each cell rains with probability (1.0 - 0.6) * 1.2; over a
        // 5x5 grid at least one event is all but certain.
        let rained: Vec<(i32, i32)> = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .filter(|&(x, y)| layers.is_raining_at(x, y))
            .collect();
        assert!(!rained.is_empty());
        for (x, y) in rained {
            let level = layers.level_at(x, y);
            assert!(level >= RAIN_INTENSITY && level <= 2.0 * RAIN_INTENSITY);
        }
    }

    #[test]
    fn evaporation_drains_water_into_clouds() {
        let (_, mut layers, mut clouds, _) = dry_world(5, 5);
        layers.levels.set(2, 2, 0.5);
        let clock = daytime_clock();
        let before_cloud = clouds.density_at(2, 2);
        layers.evaporate(&mut clouds, &clock);
        assert!(layers.level_at(2, 2) < 0.5);
        assert!(clouds.density_at(2, 2) > before_cloud);
        assert!(layers.evaporation.at(2, 2) > 0.0);
    }

    #[test]
    fn transpiration_moves_soil_moisture_to_clouds() {
        let (mut tiles, mut layers, mut clouds, _) = dry_world(5, 5);
        tiles.set(2, 2, Tile::Tree);
        layers.soil.set(2, 2, 0.8);
        let clock = daytime_clock();
        let before_cloud = clouds.density_at(2, 2);
        layers.transpire(&tiles, &mut clouds, &clock);
        assert!(layers.soil_at(2, 2) < 0.8);
        assert!(clouds.density_at(2, 2) > before_cloud);
        // Dry soil under a tree does not transpire.
        tiles.set(0, 0, Tile::Tree);
        layers.soil.set(0, 0, 0.2);
        let before = layers.soil_at(0, 0);
        layers.transpire(&tiles, &mut clouds, &clock);
        assert_eq!(layers.soil_at(0, 0), before);
    }

    #[test]
    fn runoff_flows_downhill_only() {
        let mut layers = WaterLayers::from_parts(
            Grid::fill(2, 1, 0.0),
            Grid::fill(2, 1, 0.0),
            Grid::from_fn(2, 1, |x, _| if x == 0 { 1.0 } else { 0.0 }),
        );
        layers.levels.set(0, 0, 0.4);
        layers.runoff();
        // Full elevation drop: flow = min(0.4*0.1*1.0, 0.4*0.25) = 0.04.
        assert!((layers.level_at(0, 0) - 0.36).abs() < 1e-6);
        assert!((layers.level_at(1, 0) - 0.04).abs() < 1e-6);
        // Nothing flows back uphill.
        layers.runoff();
        assert!(layers.level_at(0, 0) > layers.level_at(1, 0));
    }

    #[test]
    fn runoff_never_drives_a_cell_negative() {
        // A peak surrounded by 8 lower neighbors sheds up to 8 x 25%;
        // the source must clamp at zero instead of going negative.
        let mut elevation = Grid::fill(3, 3, 0.0);
        elevation.set(1, 1, 1.0);
        let mut layers = WaterLayers::from_parts(
            Grid::fill(3, 3, 0.0),
            Grid::fill(3, 3, 0.0),
            elevation,
        );
        layers.levels.set(1, 1, 1.0);
        layers.runoff();
        assert!(layers.level_at(1, 1) >= 0.0);
        for &level in layers.levels().cells() {
            assert!((0.0..=1.0).contains(&level));
        }
    }

    #[test]
    fn soil_absorbs_surface_water_and_rain() {
        let (_, mut layers, _, _) = dry_world(3, 3);
        layers.levels.set(1, 1, 0.2);
        layers.precipitation.set(1, 1, 0.1);
        layers.soil.set(1, 1, 0.1);
        let clock = Clock::new(); // night: drying 0.001
        layers.update_soil(&clock);
        let expected = 0.1 + SOIL_ABSORPTION + 0.1 * 0.3 - 0.001;
        assert!((layers.soil_at(1, 1) - expected).abs() < 1e-6);
        assert!((layers.level_at(1, 1) - (0.2 - SOIL_ABSORPTION)).abs() < 1e-6);
    }

    #[test]
    fn tiles_flood_and_drain_on_thresholds() {
        let (mut tiles, mut layers, _, _) = dry_world(3, 3);
        layers.levels.set(0, 0, 0.8);
        tiles.set(1, 1, Tile::Tree);
        layers.levels.set(1, 1, 0.9);
        layers.reshape_tiles(&mut tiles);
        assert_eq!(tiles.at(0, 0), Tile::Water);
        // Trees never flood.
        assert_eq!(tiles.at(1, 1), Tile::Tree);

        layers.levels.set(0, 0, 0.1);
        layers.reshape_tiles(&mut tiles);
        assert_eq!(tiles.at(0, 0), Tile::Ground);
    }
}
