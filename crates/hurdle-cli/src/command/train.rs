use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use hurdle_engine::SimSeed;
use hurdle_policy::PolicyKind;
use hurdle_training::{
    config::Config,
    trainer::{GenerationStats, Trainer},
};
use rand::Rng as _;

use crate::{
    model::run_report::{BestPolicy, RunReport},
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Configuration file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible run; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Number of generations to run
    #[arg(long)]
    generations: Option<u32>,
    /// Policy kind to evolve (threshold or perceptron)
    #[arg(long)]
    policy: Option<PolicyKind>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_config(arg: &TrainArg) -> anyhow::Result<Config> {
    let mut config: Config = match &arg.config {
        Some(path) => util::read_json_file("configuration", path)?,
        None => Config::default(),
    };
    if let Some(generations) = arg.generations {
        config.evolution.max_generations = generations;
    }
    if let Some(policy) = arg.policy {
        config.evolution.policy = policy;
    }
    Ok(config)
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = load_config(arg)?;
    let seed = arg
        .seed
        .map_or_else(|| rand::rng().random(), SimSeed::from_u64);
    let mut trainer =
        Trainer::new(config.clone(), seed).context("Failed to start training")?;

    eprintln!(
        "Training {} policies, population {}, seed {seed}",
        config.evolution.policy, config.evolution.population_size
    );
    while let Some(stats) = trainer.run_generation() {
        print_stats(&stats);
    }

    let best = BestPolicy::from_log(trainer.log());
    let report = RunReport {
        name: config.evolution.policy.to_string(),
        trained_at: Utc::now(),
        seed,
        config,
        best,
        generations: trainer.log().clone(),
    };
    util::save_json(&report, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Run saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", report.name);
    eprintln!("  Trained at: {}", report.trained_at);
    eprintln!("  Generations: {}", report.generations.len());
    if let Some(best) = &report.best {
        eprintln!(
            "  Best: generation #{} fitness {:.3} time alive {:.2}s",
            best.generation, best.fitness, best.time_alive
        );
        eprintln!("  Genes: {:.3?}", best.policy.genes());
    }

    Ok(())
}

fn print_stats(stats: &GenerationStats) {
    eprintln!("Generation #{}:", stats.generation);
    eprintln!("  Time Alive:");
    eprintln!("    Best:     {:.2}s", stats.best_time_alive);
    if let Some(previous) = stats.previous_best_time {
        eprintln!("    Previous: {previous:.2}s");
    }
    eprintln!("    Overall:  {:.2}s", stats.overall_best_time);
    eprintln!(
        "  High Score: {} (overall {})",
        stats.high_score, stats.overall_high_score
    );
    if let Some(fitness) = &stats.fitness {
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:  {:.3}", fitness.min);
        eprintln!("    Max:  {:.3}", fitness.max);
        eprintln!("    Mean: {:.3}", fitness.mean);
        eprintln!("    Best overall: {:.3}", stats.overall_best_fitness);
    }
    if let Some(rate) = &stats.success_rate {
        eprintln!(
            "  Success Rate: {:.3} ± {:.3} [{:.3}, {:.3}]",
            rate.mean, rate.std_dev, rate.min, rate.max
        );
    }
    if let Some(rate) = &stats.recent_success_rate {
        eprintln!("  Recent Success Rate: {:.3} ± {:.3}", rate.mean, rate.std_dev);
    }
    eprintln!("  Highest Toughness: {}", stats.highest_toughness);
    if stats.stagnation_reset {
        eprintln!("  Stagnated: redrawing clone slots");
    }
}
