//! The world aggregate: terrain, vegetation timers, cloud and water
//! fields, the clock, and the agent population. All simulation state
//! lives here; systems borrow the pieces they need.

use crate::agent::{Agent, AgentId};
use crate::clock::Clock;
use crate::clouds::CloudField;
use crate::config::Params;
use crate::grid::{Grid, Tile};
use crate::rng::SimRng;
use crate::vegetation::Vegetation;
use crate::water::WaterLayers;

/// Share of cells seeded as fresh grass / water / trees.
const GRASS_SHARE: f32 = 0.4;
const WATER_SHARE: f32 = 0.1;
const TREE_SHARE: f32 = 0.1;

pub struct World {
    pub(crate) tiles: Grid<Tile>,
    pub(crate) vegetation: Vegetation,
    pub(crate) clouds: CloudField,
    pub(crate) water: WaterLayers,
    pub(crate) clock: Clock,
    pub(crate) params: Params,
    pub(crate) agents: Vec<Agent>,
    pub(crate) next_agent_id: u64,
}

impl World {
    /// Roll a fresh random world: scattered grass, ponds and trees,
    /// a seeded cloud deck and water table.
    pub fn generate(width: usize, height: usize, params: Params, rng: &mut SimRng) -> Self {
        let tiles = Grid::from_fn(width, height, |_, _| {
            let roll = rng.uniform(0.0, 1.0);
            if roll < GRASS_SHARE {
                Tile::GrassFresh
            } else if roll < GRASS_SHARE + WATER_SHARE {
                Tile::Water
            } else if roll < GRASS_SHARE + WATER_SHARE + TREE_SHARE {
                Tile::Tree
            } else {
                Tile::Ground
            }
        });
        let clouds = CloudField::generate(width, height, params.cloud_density, rng);
        let water = WaterLayers::generate(&tiles, rng);
        Self {
            vegetation: Vegetation::new(width, height),
            clouds,
            water,
            clock: Clock::new(),
            params,
            agents: Vec::new(),
            next_agent_id: 0,
            tiles,
        }
    }

    /// Build a world over fixed terrain; cloud and water layers are
    /// seeded from the given seed. Mostly useful for tests and tools.
    pub fn from_tiles(tiles: Grid<Tile>, params: Params, seed: u64) -> Self {
        let mut rng = SimRng::seeded(seed);
        let clouds = CloudField::generate(tiles.width(), tiles.height(), params.cloud_density, &mut rng);
        let water = WaterLayers::generate(&tiles, &mut rng);
        Self {
            vegetation: Vegetation::new(tiles.width(), tiles.height()),
            clouds,
            water,
            clock: Clock::new(),
            params,
            agents: Vec::new(),
            next_agent_id: 0,
            tiles,
        }
    }

    /// Reassemble a world from restored state. The caller is expected
    /// to have validated the pieces against each other.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        tiles: Grid<Tile>,
        vegetation: Vegetation,
        clouds: CloudField,
        water: WaterLayers,
        clock: Clock,
        params: Params,
        agents: Vec<Agent>,
        next_agent_id: u64,
    ) -> Self {
        Self {
            tiles,
            vegetation,
            clouds,
            water,
            clock,
            params,
            agents,
            next_agent_id,
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.tiles.in_bounds(x, y)
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<Tile> {
        self.tiles.get(x, y).copied()
    }

    pub fn tiles(&self) -> &Grid<Tile> {
        &self.tiles
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).map_or(false, Tile::is_passable)
    }

    pub fn cloud_shadow(&self, x: i32, y: i32) -> f32 {
        self.clouds.shadow_at(x, y)
    }

    pub fn clouds(&self) -> &CloudField {
        &self.clouds
    }

    pub fn water_level(&self, x: i32, y: i32) -> f32 {
        self.water.level_at(x, y)
    }

    pub fn soil_moisture(&self, x: i32, y: i32) -> f32 {
        self.water.soil_at(x, y)
    }

    /// Drinkable-water signal: surface water or half the soil value.
    pub fn water_availability(&self, x: i32, y: i32) -> f32 {
        self.water.availability_at(x, y)
    }

    pub fn is_raining(&self, x: i32, y: i32) -> bool {
        self.water.is_raining_at(x, y)
    }

    pub fn water(&self) -> &WaterLayers {
        &self.water
    }

    pub fn vegetation(&self) -> &Vegetation {
        &self.vegetation
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub(crate) fn allocate_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }

    pub(crate) fn next_agent_id(&self) -> u64 {
        self.next_agent_id
    }

    /// Eat the grass at `(x, y)` if fresh; scheduling uses the current
    /// tick and the grass growth tunable.
    pub(crate) fn forage(&mut self, x: i32, y: i32, rng: &mut SimRng) -> bool {
        self.vegetation.forage(
            &mut self.tiles,
            x,
            y,
            self.clock.step_count(),
            self.params.grass_growth_rate,
            rng,
        )
    }

    /// Unconditional tile write for generation, editing and tests;
    /// callers outside the crate go through `Engine::set_tile`.
    pub(crate) fn set_tile_unchecked(&mut self, x: i32, y: i32, tile: Tile) {
        self.tiles.set(x, y, tile);
    }

    /// Drop a newborn agent at a position the caller has validated.
    pub(crate) fn add_agent(&mut self, x: i32, y: i32, rng: &mut SimRng) -> AgentId {
        let id = self.allocate_agent_id();
        self.agents.push(Agent::spawn(id, x, y, rng));
        id
    }

    /// Scatter `count` agents over passable tiles, giving up on an
    /// individual after 100 placement attempts.
    pub(crate) fn seed_agents(&mut self, count: usize, rng: &mut SimRng) {
        for _ in 0..count {
            let mut attempts = 0;
            let (mut x, mut y);
            loop {
                x = rng.below(self.width() as u32) as i32;
                y = rng.below(self.height() as u32) as i32;
                attempts += 1;
                if self.is_passable(x, y) || attempts >= 100 {
                    break;
                }
            }
            if attempts < 100 {
                self.add_agent(x, y, rng);
            }
        }
    }

    /// Re-roll the cloud deck; invoked when the density tunable moves.
    pub(crate) fn regenerate_clouds(&mut self, rng: &mut SimRng) {
        self.clouds =
            CloudField::generate(self.width(), self.height(), self.params.cloud_density, rng);
    }
}
