//! State transfer: the full world as a typed, validated snapshot,
//! plus a periodic file writer for long runs.
//!
//! Restoration is all-or-nothing: the blob is parsed and validated
//! into a fresh `World` before the engine swaps it in, so a malformed
//! snapshot can never leave partial state behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::Agent;
use crate::clock::Clock;
use crate::clouds::CloudField;
use crate::config::{Params, PARAM_MAX, PARAM_MIN};
use crate::grid::{Grid, Tile};
use crate::vegetation::Vegetation;
use crate::water::WaterLayers;
use crate::world::World;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("grid '{name}' is internally inconsistent ({width}x{height} with {cells} cells)")]
    MalformedGrid {
        name: &'static str,
        width: usize,
        height: usize,
        cells: usize,
    },
    #[error("grid '{name}' is {width}x{height}, expected {expected_width}x{expected_height}")]
    GridSizeMismatch {
        name: &'static str,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },
    #[error("grid '{name}' holds value {value} outside [0, 1]")]
    CellOutOfRange { name: &'static str, value: f32 },
    #[error("parameter '{name}' value {value} outside the tunable range")]
    ParamOutOfRange { name: &'static str, value: f32 },
    #[error("agent {id}: {reason}")]
    InvalidAgent { id: u64, reason: String },
    #[error("duplicate agent id {0}")]
    DuplicateAgentId(u64),
    #[error("next_agent_id {next} does not exceed highest agent id {highest}")]
    StaleAgentId { next: u64, highest: u64 },
}

/// Everything needed to reconstruct a `World`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub params: Params,
    pub clock: Clock,
    pub tiles: Grid<Tile>,
    pub regrowth_timers: Grid<u64>,
    pub cloud_density: Grid<f32>,
    pub cloud_velocity_x: Grid<f32>,
    pub cloud_velocity_y: Grid<f32>,
    pub water_levels: Grid<f32>,
    pub soil_moisture: Grid<f32>,
    pub elevation: Grid<f32>,
    pub agents: Vec<Agent>,
    pub next_agent_id: u64,
}

impl StateSnapshot {
    pub fn capture(world: &World) -> Self {
        Self {
            params: *world.params(),
            clock: world.clock().clone(),
            tiles: world.tiles().clone(),
            regrowth_timers: world.vegetation().timers().clone(),
            cloud_density: world.clouds().density().clone(),
            cloud_velocity_x: world.clouds().velocity_x().clone(),
            cloud_velocity_y: world.clouds().velocity_y().clone(),
            water_levels: world.water().levels().clone(),
            soil_moisture: world.water().soil().clone(),
            elevation: world.water().elevation().clone(),
            agents: world.agents().to_vec(),
            next_agent_id: world.next_agent_id(),
        }
    }

    /// Validate every field and assemble a world. Consumes the
    /// snapshot; any error means nothing was built.
    pub fn restore(self) -> Result<World, SnapshotError> {
        let width = self.tiles.width();
        let height = self.tiles.height();

        check_consistent("tiles", &self.tiles)?;
        check_dims("regrowth_timers", &self.regrowth_timers, width, height)?;
        check_dims("cloud_density", &self.cloud_density, width, height)?;
        check_dims("cloud_velocity_x", &self.cloud_velocity_x, width, height)?;
        check_dims("cloud_velocity_y", &self.cloud_velocity_y, width, height)?;
        check_dims("water_levels", &self.water_levels, width, height)?;
        check_dims("soil_moisture", &self.soil_moisture, width, height)?;
        check_dims("elevation", &self.elevation, width, height)?;

        check_unit_range("cloud_density", &self.cloud_density)?;
        check_unit_range("water_levels", &self.water_levels)?;
        check_unit_range("soil_moisture", &self.soil_moisture)?;
        check_unit_range("elevation", &self.elevation)?;
        check_finite("cloud_velocity_x", &self.cloud_velocity_x)?;
        check_finite("cloud_velocity_y", &self.cloud_velocity_y)?;

        check_param("grass_growth_rate", self.params.grass_growth_rate)?;
        check_param("cloud_speed", self.params.cloud_speed)?;
        check_param("cloud_density", self.params.cloud_density)?;

        let mut seen = std::collections::HashSet::new();
        let mut highest = None;
        for agent in &self.agents {
            validate_agent(agent, width, height)?;
            if !seen.insert(agent.id.0) {
                return Err(SnapshotError::DuplicateAgentId(agent.id.0));
            }
            highest = Some(highest.map_or(agent.id.0, |h: u64| h.max(agent.id.0)));
        }
        if let Some(highest) = highest {
            if self.next_agent_id <= highest {
                return Err(SnapshotError::StaleAgentId {
                    next: self.next_agent_id,
                    highest,
                });
            }
        }

        Ok(World::from_parts(
            self.tiles,
            Vegetation::from_timers(self.regrowth_timers),
            CloudField::from_parts(
                self.cloud_density,
                self.cloud_velocity_x,
                self.cloud_velocity_y,
            ),
            WaterLayers::from_parts(self.water_levels, self.soil_moisture, self.elevation),
            self.clock,
            self.params,
            self.agents,
            self.next_agent_id,
        ))
    }
}

pub fn to_json(world: &World) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&StateSnapshot::capture(world))?)
}

pub fn from_json(blob: &str) -> Result<World, SnapshotError> {
    let snapshot: StateSnapshot = serde_json::from_str(blob)?;
    snapshot.restore()
}

fn check_consistent<T>(name: &'static str, grid: &Grid<T>) -> Result<(), SnapshotError> {
    if grid.cells_len() != grid.width() * grid.height() {
        return Err(SnapshotError::MalformedGrid {
            name,
            width: grid.width(),
            height: grid.height(),
            cells: grid.cells_len(),
        });
    }
    Ok(())
}

fn check_dims<T>(
    name: &'static str,
    grid: &Grid<T>,
    width: usize,
    height: usize,
) -> Result<(), SnapshotError> {
    check_consistent(name, grid)?;
    if grid.width() != width || grid.height() != height {
        return Err(SnapshotError::GridSizeMismatch {
            name,
            width: grid.width(),
            height: grid.height(),
            expected_width: width,
            expected_height: height,
        });
    }
    Ok(())
}

fn check_unit_range(name: &'static str, grid: &Grid<f32>) -> Result<(), SnapshotError> {
    for &value in grid.cells() {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(SnapshotError::CellOutOfRange { name, value });
        }
    }
    Ok(())
}

fn check_finite(name: &'static str, grid: &Grid<f32>) -> Result<(), SnapshotError> {
    for &value in grid.cells() {
        if !value.is_finite() {
            return Err(SnapshotError::CellOutOfRange { name, value });
        }
    }
    Ok(())
}

fn check_param(name: &'static str, value: f32) -> Result<(), SnapshotError> {
    if !value.is_finite() || !(PARAM_MIN..=PARAM_MAX).contains(&value) {
        return Err(SnapshotError::ParamOutOfRange { name, value });
    }
    Ok(())
}

fn validate_agent(agent: &Agent, width: usize, height: usize) -> Result<(), SnapshotError> {
    let fail = |reason: String| SnapshotError::InvalidAgent {
        id: agent.id.0,
        reason,
    };
    if agent.x < 0 || agent.y < 0 || agent.x as usize >= width || agent.y as usize >= height {
        return Err(fail(format!(
            "position ({}, {}) outside {width}x{height} grid",
            agent.x, agent.y
        )));
    }
    if !agent.max_energy.is_finite() || agent.max_energy <= 0.0 {
        return Err(fail(format!("max energy {} is invalid", agent.max_energy)));
    }
    if !agent.energy.is_finite() || agent.energy < 0.0 || agent.energy > agent.max_energy {
        return Err(fail(format!(
            "energy {} outside [0, {}]",
            agent.energy, agent.max_energy
        )));
    }
    for (name, value) in [
        ("versatility", agent.versatility),
        ("activation", agent.activation),
    ] {
        if !value.is_finite() || !(0.1..=0.9).contains(&value) {
            return Err(fail(format!("{name} {value} outside [0.1, 0.9]")));
        }
    }
    if !(1..=3).contains(&agent.exploration_radius) {
        return Err(fail(format!(
            "exploration radius {} outside 1..=3",
            agent.exploration_radius
        )));
    }
    Ok(())
}

/// Writes a snapshot file every `interval` ticks; interval 0 disables
/// it entirely.
pub struct SnapshotWriter {
    interval: u64,
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            interval,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn maybe_write(
        &self,
        tick: u64,
        scenario_name: &str,
        world: &World,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.interval == 0 || tick % self.interval != 0 {
            return Ok(None);
        }
        let dir = self.output_dir.join(scenario_name);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("tick_{tick:06}.json"));
        let json = serde_json::to_string_pretty(&StateSnapshot::capture(world))?;
        fs::write(&path, json)?;
        Ok(Some(path))
    }
}
