//! The engine: owns the world, the deterministic random source and
//! the system scheduler, and exposes the full external surface
//! (ticking, reset, tunables, editing, state transfer).

use std::time::Instant;

use thiserror::Error;

use crate::agent::AgentId;
use crate::config::{ConfigError, Scenario, PARAM_MAX, PARAM_MIN};
use crate::grid::Tile;
use crate::rng::SimRng;
use crate::snapshot::{self, SnapshotError};
use crate::systems::{AgentSystem, ClockSystem, CloudSystem, VegetationSystem, WaterCycleSystem};
use crate::world::World;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("coordinates ({x}, {y}) are outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    #[error("invalid world dimensions {width}x{height}; both must be positive")]
    InvalidDimensions { width: usize, height: usize },
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{name}' value {value} outside {min}..={max}")]
    ParameterOutOfRange {
        name: String,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("tile ({x}, {y}) is not passable")]
    Blocked { x: i32, y: i32 },
    #[error("no open tile found for agent placement")]
    NoOpenTile,
    #[error("tile edits require the simulation to be paused")]
    NotPaused,
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A system is one phase of the tick; the scheduler runs them in
/// registration order, single-threaded, to completion.
pub trait System {
    fn name(&self) -> &'static str;
    fn update(&mut self, world: &mut World, rng: &mut SimRng);
}

#[derive(Default)]
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
}

impl Scheduler {
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    pub fn run(&mut self, world: &mut World, rng: &mut SimRng) -> Vec<SystemRunReport> {
        let mut reports = Vec::with_capacity(self.systems.len());
        for system in self.systems.iter_mut() {
            let start = Instant::now();
            system.update(world, rng);
            reports.push(SystemRunReport {
                name: system.name(),
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            });
        }
        reports
    }
}

#[derive(Clone, Debug)]
pub struct SystemRunReport {
    pub name: &'static str,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct TickSummary {
    pub tick: u64,
    pub system_reports: Vec<SystemRunReport>,
    pub agent_count: usize,
}

pub struct Engine {
    world: World,
    scheduler: Scheduler,
    rng: SimRng,
    running: bool,
}

impl Engine {
    /// Build a freshly generated world from a scenario.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, EngineError> {
        scenario.validate()?;
        let mut rng = SimRng::seeded(scenario.seed);
        let mut world = World::generate(scenario.width, scenario.height, scenario.params, &mut rng);
        world.seed_agents(scenario.initial_agents, &mut rng);
        Ok(Self::assemble(world, rng))
    }

    /// Wrap an already-built world, e.g. fixed terrain in tests or a
    /// restored snapshot.
    pub fn with_world(world: World, seed: u64) -> Self {
        Self::assemble(world, SimRng::seeded(seed))
    }

    fn assemble(world: World, rng: SimRng) -> Self {
        let mut scheduler = Scheduler::default();
        scheduler.add_system(Box::new(ClockSystem));
        scheduler.add_system(Box::new(CloudSystem));
        scheduler.add_system(Box::new(WaterCycleSystem));
        scheduler.add_system(Box::new(VegetationSystem));
        scheduler.add_system(Box::new(AgentSystem));
        Self {
            world,
            scheduler,
            rng,
            running: false,
        }
    }

    /// Advance exactly one tick. The caller drives pacing; ticks never
    /// overlap because this runs to completion synchronously.
    pub fn step(&mut self) -> TickSummary {
        let system_reports = self.scheduler.run(&mut self.world, &mut self.rng);
        TickSummary {
            tick: self.world.clock().step_count(),
            system_reports,
            agent_count: self.world.agent_count(),
        }
    }

    pub fn run(&mut self, ticks: u64) -> Option<TickSummary> {
        let mut last = None;
        for _ in 0..ticks {
            last = Some(self.step());
        }
        last
    }

    /// Discard the world and roll a new one. Without an explicit seed
    /// a fresh one is drawn from the current stream. Agents are
    /// cleared; use `place_agent` to repopulate.
    pub fn reset(
        &mut self,
        width: usize,
        height: usize,
        seed: Option<u64>,
    ) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        let seed = seed.unwrap_or_else(|| self.rng.next_seed());
        let params = self.world.params;
        let mut rng = SimRng::seeded(seed);
        self.world = World::generate(width, height, params, &mut rng);
        self.rng = rng;
        Ok(())
    }

    /// Adjust a live tunable. Changing `cloud_density` re-rolls the
    /// cloud deck, mirroring the original control panel.
    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), EngineError> {
        if !value.is_finite() || !(PARAM_MIN..=PARAM_MAX).contains(&value) {
            return Err(EngineError::ParameterOutOfRange {
                name: name.to_string(),
                value,
                min: PARAM_MIN,
                max: PARAM_MAX,
            });
        }
        match name {
            "grass_growth_rate" => self.world.params.grass_growth_rate = value,
            "cloud_speed" => self.world.params.cloud_speed = value,
            "cloud_density" => {
                self.world.params.cloud_density = value;
                self.world.regenerate_clouds(&mut self.rng);
            }
            other => return Err(EngineError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    /// Drop a new agent on a passable tile.
    pub fn place_agent(&mut self, x: i32, y: i32) -> Result<AgentId, EngineError> {
        if !self.world.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        if !self.world.is_passable(x, y) {
            return Err(EngineError::Blocked { x, y });
        }
        Ok(self.world.add_agent(x, y, &mut self.rng))
    }

    /// Drop a new agent somewhere passable, trying up to 100 spots.
    pub fn place_random_agent(&mut self) -> Result<AgentId, EngineError> {
        for _ in 0..100 {
            let x = self.rng.below(self.world.width() as u32) as i32;
            let y = self.rng.below(self.world.height() as u32) as i32;
            if self.world.is_passable(x, y) {
                return Ok(self.world.add_agent(x, y, &mut self.rng));
            }
        }
        Err(EngineError::NoOpenTile)
    }

    /// Manual terrain edit; only legal while the driver is paused.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> Result<(), EngineError> {
        if self.running {
            return Err(EngineError::NotPaused);
        }
        if !self.world.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.world.set_tile_unchecked(x, y, tile);
        Ok(())
    }

    /// The external driver flags whether it is actively ticking;
    /// terrain edits are refused while it is.
    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Full engine state as an opaque JSON blob.
    pub fn serialize_state(&self) -> Result<String, SnapshotError> {
        snapshot::to_json(&self.world)
    }

    /// Replace the world with a previously serialized state. The blob
    /// is validated in full before anything is touched; on error the
    /// current state is left exactly as it was.
    pub fn deserialize_state(&mut self, blob: &str) -> Result<(), SnapshotError> {
        let world = snapshot::from_json(blob)?;
        self.world = world;
        Ok(())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> EngineError {
        EngineError::OutOfBounds {
            x,
            y,
            width: self.world.width(),
            height: self.world.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_engine() -> Engine {
        let mut scenario = Scenario::meadow();
        scenario.width = 12;
        scenario.height = 12;
        Engine::from_scenario(&scenario).unwrap()
    }

    #[test]
    fn tick_summaries_count_up() {
        let mut engine = small_engine();
        let first = engine.step();
        let second = engine.step();
        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);
        assert_eq!(first.system_reports.len(), 5);
        let order: Vec<_> = first.system_reports.iter().map(|r| r.name).collect();
        assert_eq!(order, ["clock", "clouds", "water_cycle", "vegetation", "agents"]);
    }

    #[test]
    fn unknown_or_out_of_range_parameters_are_rejected() {
        let mut engine = small_engine();
        assert!(matches!(
            engine.set_parameter("wind_speed", 1.0),
            Err(EngineError::UnknownParameter(_))
        ));
        assert!(matches!(
            engine.set_parameter("cloud_speed", 11.0),
            Err(EngineError::ParameterOutOfRange { .. })
        ));
        assert!(matches!(
            engine.set_parameter("cloud_speed", f32::NAN),
            Err(EngineError::ParameterOutOfRange { .. })
        ));
        engine.set_parameter("cloud_speed", 0.0).unwrap();
        assert_eq!(engine.world().params().cloud_speed, 0.0);
    }

    #[test]
    fn cloud_density_change_rerolls_the_deck() {
        let mut engine = small_engine();
        let before = engine.world().clouds().clone();
        engine.set_parameter("cloud_density", 9.0).unwrap();
        assert_ne!(engine.world().clouds(), &before);
        assert_eq!(engine.world().params().cloud_density, 9.0);
    }

    #[test]
    fn tile_edits_require_pause() {
        let mut engine = small_engine();
        engine.resume();
        assert!(matches!(
            engine.set_tile(0, 0, Tile::Tree),
            Err(EngineError::NotPaused)
        ));
        engine.pause();
        engine.set_tile(0, 0, Tile::Tree).unwrap();
        assert_eq!(engine.world().tile(0, 0), Some(Tile::Tree));
        assert!(matches!(
            engine.set_tile(-1, 0, Tile::Tree),
            Err(EngineError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn placement_validates_bounds_and_passability() {
        let mut engine = small_engine();
        engine.set_tile(2, 2, Tile::Water).unwrap();
        assert!(matches!(
            engine.place_agent(2, 2),
            Err(EngineError::Blocked { .. })
        ));
        assert!(matches!(
            engine.place_agent(99, 0),
            Err(EngineError::OutOfBounds { .. })
        ));
        engine.set_tile(3, 3, Tile::Ground).unwrap();
        let id = engine.place_agent(3, 3).unwrap();
        let agent = engine
            .world()
            .agents()
            .iter()
            .find(|a| a.id == id)
            .expect("agent was placed");
        assert_eq!((agent.x, agent.y), (3, 3));
    }

    #[test]
    fn reset_rejects_zero_dimensions_and_clears_agents() {
        let mut engine = small_engine();
        assert!(matches!(
            engine.reset(0, 5, Some(1)),
            Err(EngineError::InvalidDimensions { .. })
        ));
        assert!(!engine.world().agents().is_empty());
        engine.reset(8, 8, Some(123)).unwrap();
        assert_eq!(engine.world().width(), 8);
        assert_eq!(engine.world().clock().step_count(), 0);
        assert!(engine.world().agents().is_empty());
    }
}
