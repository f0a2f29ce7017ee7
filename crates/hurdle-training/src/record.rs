//! Append-only history of finished generations.

use hurdle_engine::AgentId;
use hurdle_policy::Policy;
use serde::{Deserialize, Serialize};

use crate::genetic::{Individual, Population};

/// Summary of one finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// 1-based generation index.
    pub generation: u32,
    pub best_id: AgentId,
    pub best_policy: Policy,
    pub best_fitness: f32,
    /// Time alive of the fittest individual.
    pub best_time_alive: f32,
    /// Highest pass score in the generation.
    pub high_score: u32,
    /// Per-slot values, in agent id order.
    pub fitness: Vec<f32>,
    pub time_alive: Vec<f32>,
    pub scores: Vec<u32>,
    pub toughness: Vec<u32>,
}

impl GenerationRecord {
    /// Summarizes an evaluated population.
    ///
    /// # Panics
    ///
    /// Panics if an individual has not been evaluated.
    #[must_use]
    pub fn new(generation: u32, population: &Population) -> Self {
        let best = population.best();
        let outcomes = population
            .individuals()
            .iter()
            .map(|ind| ind.outcome().expect("individual evaluated"))
            .collect::<Vec<_>>();
        Self {
            generation,
            best_id: best.id(),
            best_policy: best.policy().clone(),
            best_fitness: best.fitness(),
            best_time_alive: best.outcome().map_or(0.0, |o| o.time_alive),
            high_score: outcomes.iter().map(|o| o.score).max().unwrap_or(0),
            fitness: population
                .individuals()
                .iter()
                .map(Individual::fitness)
                .collect(),
            time_alive: outcomes.iter().map(|o| o.time_alive).collect(),
            scores: outcomes.iter().map(|o| o.score).collect(),
            toughness: population
                .individuals()
                .iter()
                .map(Individual::toughness)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationLog {
    records: Vec<GenerationRecord>,
}

impl GenerationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: GenerationRecord) {
        if let Some(last) = self.records.last() {
            assert!(
                record.generation > last.generation,
                "generation records must be appended in order"
            );
        }
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    /// The second to last record.
    #[must_use]
    pub fn previous(&self) -> Option<&GenerationRecord> {
        self.records.iter().rev().nth(1)
    }

    /// Record with the highest best fitness; the earliest wins ties.
    #[must_use]
    pub fn best_overall(&self) -> Option<&GenerationRecord> {
        self.records
            .iter()
            .rev()
            .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
    }

    #[must_use]
    pub fn best_time_overall(&self) -> Option<f32> {
        self.records
            .iter()
            .map(|r| r.best_time_alive)
            .max_by(f32::total_cmp)
    }

    #[must_use]
    pub fn high_score_overall(&self) -> u32 {
        self.records.iter().map(|r| r.high_score).max().unwrap_or(0)
    }

    /// Whether the run has stagnated as of the latest record.
    ///
    /// Only checked on generations that are multiples of `threshold`: the
    /// run is stagnant if the best time alive `threshold` records ago is
    /// strictly greater than the latest one.
    #[must_use]
    pub fn is_stagnant(&self, threshold: u32) -> bool {
        let Some(last) = self.records.last() else {
            return false;
        };
        if threshold == 0 || last.generation % threshold != 0 {
            return false;
        }
        let back = usize::try_from(threshold).ok();
        let Some(index) = back.and_then(|back| self.records.len().checked_sub(back)) else {
            return false;
        };
        self.records[index].best_time_alive > last.best_time_alive
    }
}
