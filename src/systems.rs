//! The five simulation systems, run in fixed order each tick:
//! clock, clouds, water cycle, vegetation, agents.

use crate::agent;
use crate::engine::System;
use crate::rng::SimRng;
use crate::world::World;

/// Advances game time; always first.
#[derive(Default)]
pub struct ClockSystem;

impl System for ClockSystem {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn update(&mut self, world: &mut World, _rng: &mut SimRng) {
        world.clock.advance();
    }
}

/// Diffuses the cloud deck.
#[derive(Default)]
pub struct CloudSystem;

impl System for CloudSystem {
    fn name(&self) -> &'static str {
        "clouds"
    }

    fn update(&mut self, world: &mut World, rng: &mut SimRng) {
        let speed = world.params.cloud_speed;
        world.clouds.step(speed, rng);
    }
}

/// Runs the five ordered water-cycle phases, including the
/// flood/drain tile transitions.
#[derive(Default)]
pub struct WaterCycleSystem;

impl System for WaterCycleSystem {
    fn name(&self) -> &'static str {
        "water_cycle"
    }

    fn update(&mut self, world: &mut World, rng: &mut SimRng) {
        let World {
            tiles,
            clouds,
            water,
            clock,
            ..
        } = world;
        water.step(tiles, clouds, clock, rng);
    }
}

/// Regrows eaten grass whose deadline has come.
#[derive(Default)]
pub struct VegetationSystem;

impl System for VegetationSystem {
    fn name(&self) -> &'static str {
        "vegetation"
    }

    fn update(&mut self, world: &mut World, _rng: &mut SimRng) {
        let World {
            tiles,
            vegetation,
            clouds,
            water,
            clock,
            ..
        } = world;
        vegetation.step(tiles, clouds, water, clock);
    }
}

/// Updates every agent in collection order. Each agent is detached
/// from the collection for its turn so behavior functions can borrow
/// the world freely; offspring join the collection after the pass and
/// first act next tick.
#[derive(Default)]
pub struct AgentSystem;

impl System for AgentSystem {
    fn name(&self) -> &'static str {
        "agents"
    }

    fn update(&mut self, world: &mut World, rng: &mut SimRng) {
        let mut newborns = Vec::new();
        for index in 0..world.agents.len() {
            let mut current = world.agents[index].clone();
            if let Some(child) = agent::update(&mut current, world, rng) {
                newborns.push(child);
            }
            world.agents[index] = current;
        }
        world.agents.append(&mut newborns);
    }
}
