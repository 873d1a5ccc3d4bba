pub mod agent;
pub mod clock;
pub mod clouds;
pub mod config;
pub mod engine;
pub mod grid;
pub mod rng;
pub mod snapshot;
pub mod systems;
pub mod vegetation;
pub mod water;
pub mod world;

pub use config::{Params, Scenario};
pub use engine::{Engine, EngineError, TickSummary};
pub use grid::Tile;
pub use world::World;
