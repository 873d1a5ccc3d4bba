//! Long-run range invariants: every per-cell field stays in [0, 1]
//! and every agent's energy stays in [0, max] no matter how long the
//! simulation runs.

use verdure::{Engine, Scenario};

fn assert_unit_range(name: &str, cells: &[f32]) {
    for &value in cells {
        assert!(
            (0.0..=1.0).contains(&value),
            "{name} value {value} escaped [0, 1]"
        );
    }
}

#[test]
fn fields_and_energies_stay_bounded() {
    let mut scenario = Scenario::meadow();
    scenario.width = 20;
    scenario.height = 20;
    scenario.initial_agents = 8;
    // Crank the sky so rain, evaporation and flooding all happen.
    scenario.params.cloud_density = 10.0;
    scenario.params.cloud_speed = 10.0;
    let mut engine = Engine::from_scenario(&scenario).unwrap();

    for _ in 0..300 {
        engine.step();
        let world = engine.world();
        assert_unit_range("cloud density", world.clouds().density().cells());
        assert_unit_range("water level", world.water().levels().cells());
        assert_unit_range("soil moisture", world.water().soil().cells());
        for agent in world.agents() {
            assert!(
                agent.energy >= 0.0 && agent.energy <= agent.max_energy,
                "agent {:?} energy {} escaped [0, {}]",
                agent.id,
                agent.energy,
                agent.max_energy
            );
            assert!(world.in_bounds(agent.x, agent.y));
        }
    }
}

#[test]
fn elevation_never_changes() {
    let mut scenario = Scenario::meadow();
    scenario.width = 16;
    scenario.height = 12;
    let mut engine = Engine::from_scenario(&scenario).unwrap();
    let before = engine.world().water().elevation().clone();
    engine.run(150);
    assert_eq!(engine.world().water().elevation(), &before);
}

#[test]
fn population_only_changes_through_reproduction_or_placement() {
    let mut scenario = Scenario::meadow();
    scenario.width = 20;
    scenario.height = 20;
    scenario.initial_agents = 6;
    let mut engine = Engine::from_scenario(&scenario).unwrap();
    let mut count = engine.world().agent_count();
    for _ in 0..300 {
        engine.step();
        let now = engine.world().agent_count();
        // Nothing kills agents; the count can only grow.
        assert!(now >= count, "agent count shrank from {count} to {now}");
        count = now;
    }
}
