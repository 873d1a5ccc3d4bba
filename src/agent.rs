//! Agents: grazing organisms with heritable personality traits.
//!
//! An agent is plain data; its per-tick behavior lives in free
//! functions over `(Agent, World, SimRng)` so it can be exercised
//! without the full engine.

use serde::{Deserialize, Serialize};

use crate::rng::SimRng;
use crate::vegetation::FORAGE_ENERGY;
use crate::world::World;

/// Energy needed before a reproduction attempt is considered.
pub const REPRODUCTION_THRESHOLD: f32 = 80.0;
/// Energy charged to the parent on a successful reproduction.
pub const REPRODUCTION_COST: f32 = 40.0;
/// Ticks before the parent may attempt reproduction again.
pub const REPRODUCTION_COOLDOWN: u32 = 100;
/// Per-tick chance of attempting reproduction once eligible.
const REPRODUCTION_CHANCE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn offset(self, distance: i32) -> (i32, i32) {
        match self {
            Direction::North => (0, -distance),
            Direction::East => (distance, 0),
            Direction::South => (0, distance),
            Direction::West => (-distance, 0),
        }
    }

    pub fn random(rng: &mut SimRng) -> Self {
        Self::ALL[rng.below(4) as usize]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub x: i32,
    pub y: i32,
    pub energy: f32,
    pub max_energy: f32,
    pub direction: Direction,
    /// How readily the agent reconsiders its heading, in [0.1, 0.9].
    pub versatility: f32,
    /// How often the agent acts at all, in [0.1, 0.9].
    pub activation: f32,
    /// How far it scans for grass, in 1..=3.
    pub exploration_radius: i32,
    pub reproduction_cooldown: u32,
    pub last_moved: u64,
    pub idle_steps: u64,
}

impl Agent {
    /// A newborn agent with randomly drawn personality traits.
    pub fn spawn(id: AgentId, x: i32, y: i32, rng: &mut SimRng) -> Self {
        Self {
            id,
            x,
            y,
            energy: 100.0,
            max_energy: 100.0,
            direction: Direction::random(rng),
            versatility: rng.uniform(0.1, 0.9),
            activation: rng.uniform(0.1, 0.9),
            exploration_radius: 1 + rng.below(3) as i32,
            reproduction_cooldown: 0,
            last_moved: 0,
            idle_steps: 0,
        }
    }
}

/// Run one full behavior tick for `agent`, which is temporarily
/// detached from the world's collection. Returns a newborn when
/// reproduction succeeds.
pub fn update(agent: &mut Agent, world: &mut World, rng: &mut SimRng) -> Option<Agent> {
    let hunger_bonus = if agent.energy < 50.0 { 0.3 } else { 0.0 };
    let move_probability = (agent.activation * 0.6 + hunger_bonus).min(0.9);

    if rng.chance(move_probability) {
        if rng.chance(agent.versatility) {
            if agent.energy < 70.0 {
                seek_grass(agent, world, rng);
            } else {
                agent.direction = Direction::random(rng);
            }
        }
        step_forward(agent, world);
        agent.idle_steps = 0;
    } else {
        agent.idle_steps += 1;
    }

    graze(agent, world, rng);
    decay_energy(agent);
    tick_reproduction(agent, world, rng)
}

/// Scan expanding radii for fresh grass along the four cardinal rays.
/// The first radius with any hit wins; within it, the nearest
/// candidate in N/E/S/W scan order sets the heading. With no grass in
/// range the heading is re-rolled at random.
pub fn seek_grass(agent: &mut Agent, world: &World, rng: &mut SimRng) {
    for radius in 1..=agent.exploration_radius {
        let mut best: Option<(Direction, i32)> = None;
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset(radius);
            let (tx, ty) = (agent.x + dx, agent.y + dy);
            if world.tile(tx, ty) == Some(crate::grid::Tile::GrassFresh) {
                let distance = (tx - agent.x).abs() + (ty - agent.y).abs();
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((direction, distance));
                }
            }
        }
        if let Some((direction, _)) = best {
            agent.direction = direction;
            return;
        }
    }
    agent.direction = Direction::random(rng);
}

/// Advance one tile along the current heading when passable.
pub fn step_forward(agent: &mut Agent, world: &World) {
    let (dx, dy) = agent.direction.offset(1);
    let (nx, ny) = (agent.x + dx, agent.y + dy);
    if world.is_passable(nx, ny) {
        agent.x = nx;
        agent.y = ny;
        agent.last_moved = world.clock().step_count();
    }
}

/// Eat the grass underfoot, if any.
fn graze(agent: &mut Agent, world: &mut World, rng: &mut SimRng) {
    if world.forage(agent.x, agent.y, rng) {
        agent.energy = (agent.energy + FORAGE_ENERGY).min(agent.max_energy);
    }
}

/// Metabolic cost scales with how active the personality is.
fn decay_energy(agent: &mut Agent) {
    let cost = 0.3 + agent.activation * 0.4;
    agent.energy = (agent.energy - cost).clamp(0.0, agent.max_energy);
}

fn tick_reproduction(agent: &mut Agent, world: &mut World, rng: &mut SimRng) -> Option<Agent> {
    if agent.reproduction_cooldown > 0 {
        agent.reproduction_cooldown -= 1;
    }
    if agent.energy >= REPRODUCTION_THRESHOLD
        && agent.reproduction_cooldown == 0
        && rng.chance(REPRODUCTION_CHANCE)
    {
        return reproduce(agent, world, rng);
    }
    None
}

/// Place a mutated offspring on the first free cardinal neighbor.
/// The parent pays energy and cooldown only when a slot is found;
/// a boxed-in agent loses nothing.
pub fn reproduce(agent: &mut Agent, world: &mut World, rng: &mut SimRng) -> Option<Agent> {
    for direction in Direction::ALL {
        let (dx, dy) = direction.offset(1);
        let (nx, ny) = (agent.x + dx, agent.y + dy);
        if !world.is_passable(nx, ny) {
            continue;
        }
        let mut child = Agent::spawn(world.allocate_agent_id(), nx, ny, rng);
        child.versatility = mutate_trait(agent.versatility, rng);
        child.activation = mutate_trait(agent.activation, rng);
        child.exploration_radius = mutate_radius(agent.exploration_radius, rng);
        agent.energy -= REPRODUCTION_COST;
        agent.reproduction_cooldown = REPRODUCTION_COOLDOWN;
        return Some(child);
    }
    None
}

fn mutate_trait(value: f32, rng: &mut SimRng) -> f32 {
    (value + rng.uniform(-0.1, 0.1)).clamp(0.1, 0.9)
}

fn mutate_radius(radius: i32, rng: &mut SimRng) -> i32 {
    let shift = if rng.chance(0.2) {
        if rng.chance(0.5) {
            -1
        } else {
            1
        }
    } else {
        0
    };
    (radius + shift).clamp(1, 3)
}
