use chrono::{DateTime, Utc};
use hurdle_engine::SimSeed;
use hurdle_policy::Policy;
use hurdle_training::{config::Config, record::GenerationLog};
use serde::{Deserialize, Serialize};

/// Everything needed to inspect or reproduce a training run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunReport {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub seed: SimSeed,
    pub config: Config,
    pub best: Option<BestPolicy>,
    pub generations: GenerationLog,
}

/// The fittest policy of the whole run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BestPolicy {
    pub generation: u32,
    pub fitness: f32,
    pub time_alive: f32,
    pub policy: Policy,
}

impl BestPolicy {
    pub fn from_log(log: &GenerationLog) -> Option<Self> {
        log.best_overall().map(|record| Self {
            generation: record.generation,
            fitness: record.best_fitness,
            time_alive: record.best_time_alive,
            policy: record.best_policy.clone(),
        })
    }
}
