use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use verdure::snapshot::SnapshotWriter;
use verdure::{Engine, Scenario};

#[derive(Debug, Parser)]
#[command(author, version, about = "verdure ecosystem simulation runner")]
struct Cli {
    /// Path to a scenario YAML file (built-in meadow when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write a state snapshot every N ticks (0 disables)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshot files
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Print a progress line every N ticks
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::from_yaml(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::meadow(),
    };
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }

    let ticks = scenario.ticks(cli.ticks);
    let interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let writer = SnapshotWriter::new(&cli.snapshot_dir, interval);

    let mut engine = Engine::from_scenario(&scenario)?;
    engine.resume();
    for _ in 0..ticks {
        let summary = engine.step();
        writer.maybe_write(summary.tick, &scenario.name, engine.world())?;
        if cli.report_every > 0 && summary.tick % cli.report_every == 0 {
            let world = engine.world();
            println!(
                "tick {:>6}  day {:>3} {:02}:00 {:?}  agents {:>3}",
                summary.tick,
                world.clock().day_count(),
                world.clock().hour(),
                world.clock().season(),
                summary.agent_count,
            );
        }
    }
    engine.pause();

    let world = engine.world();
    println!(
        "Scenario '{}' completed after {} ticks: day {}, {} agents alive.",
        scenario.name,
        ticks,
        world.clock().day_count(),
        world.agent_count(),
    );
    Ok(())
}
