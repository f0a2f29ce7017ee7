use std::path::PathBuf;

use anyhow::Context as _;
use hurdle_engine::{Agent, AgentId, SimSeed, World};
use hurdle_stats::descriptive::DescriptiveStats;

use crate::{model::run_report::RunReport, util};

const AGENT: AgentId = AgentId(0);

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Run report written by the train command
    report: PathBuf,
    /// Seed of the evaluation world; the run's seed when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Number of rounds to play
    #[arg(long, default_value_t = 5)]
    rounds: u32,
    /// Rounds are cut off after this many ticks
    #[arg(long, default_value_t = 54_000)]
    tick_limit: u64,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let report: RunReport = util::read_json_file("run report", &arg.report)?;
    let best = report
        .best
        .context("Run report does not contain a finished generation")?;
    let seed = arg.seed.map_or(report.seed, SimSeed::from_u64);
    let mut world = World::new(report.config.world.clone(), 1, seed)
        .context("Invalid world configuration in run report")?;

    eprintln!(
        "Evaluating {} policy from generation #{} (fitness {:.3})",
        best.policy.kind(),
        best.generation,
        best.fitness
    );

    let mut times = vec![];
    for round in 1..=arg.rounds {
        while world.agent(AGENT).is_some_and(Agent::is_alive) {
            world.tick(|_, sensed| best.policy.act(sensed));
            if world.clock().ticks() >= arg.tick_limit {
                world.retire_alive();
            }
        }
        let agent = world.agent(AGENT).context("Agent missing from world")?;
        #[expect(clippy::cast_possible_truncation)]
        let time_alive = agent.time_alive().unwrap_or(0.0) as f32;
        eprintln!(
            "  Round #{round}: {time_alive:.2}s, {} passed, {} keys",
            agent.score(),
            agent.key_score()
        );
        times.push(time_alive);
        world.reset();
    }

    if let Some(stats) = DescriptiveStats::new(times) {
        eprintln!("Time Alive:");
        eprintln!("  Min:    {:.2}s", stats.min);
        eprintln!("  Max:    {:.2}s", stats.max);
        eprintln!("  Mean:   {:.2}s", stats.mean);
        eprintln!("  Median: {:.2}s", stats.median);
    }

    Ok(())
}
