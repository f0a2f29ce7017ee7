//! Evolution parameters and the combined run configuration.

use hurdle_engine::WorldConfig;
use hurdle_policy::{PolicyKind, PolicyShape};
use serde::{Deserialize, Serialize};

use crate::fitness::FitnessWeights;

/// An invalid evolution configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvolutionConfigError {
    #[display("population must not be empty")]
    EmptyPopulation,
    #[display("parent count must be between 1 and the population size {population}, got {parents}")]
    ParentCount { parents: usize, population: usize },
    #[display("{name} must lie in [0, 1], got {value}")]
    Fraction { name: &'static str, value: f32 },
    #[display(
        "crossover rate {crossover} and cross-generation rate {cross_generation} exceed 1 in total"
    )]
    FractionSum { crossover: f32, cross_generation: f32 },
    #[display("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[display("{name} must be at least 1")]
    Zero { name: &'static str },
}

/// Parameters of the generational loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// The run stops after this many generations.
    pub max_generations: u32,
    /// Probability of mutating each gene.
    pub mutation_chance: f32,
    pub mutation_size: f32,
    /// Number of top individuals crossover parents are drawn from.
    pub parent_count: usize,
    /// Share of the population produced by crossover among the parents.
    pub crossover_rate: f32,
    /// Share of the population produced by crossing the generation's best
    /// with the best of all generations.
    pub cross_generation_rate: f32,
    /// Stagnation is checked every this many generations.
    pub reset_threshold: u32,
    /// Perceptron output above which an agent jumps.
    pub decision_threshold: f32,
    pub loss_penalty: f32,
    /// Number of trailing generations for the recent success rate.
    pub success_window: usize,
    /// Rounds running longer than this are ended, surviving agents are
    /// retired.
    pub generation_tick_limit: Option<u64>,
    pub fitness: FitnessWeights,
    pub policy: PolicyKind,
    /// Threshold policies evolve their own jump force.
    pub evolve_jump_force: bool,
    pub hidden_units: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 5,
            max_generations: 100,
            mutation_chance: 0.5,
            mutation_size: 0.5,
            parent_count: 2,
            crossover_rate: 0.3,
            cross_generation_rate: 0.3,
            reset_threshold: 10,
            decision_threshold: 0.5,
            loss_penalty: 1.0,
            success_window: 5,
            generation_tick_limit: Some(90 * 60 * 10),
            fitness: FitnessWeights::default(),
            policy: PolicyKind::default(),
            evolve_jump_force: true,
            hidden_units: 3,
        }
    }
}

fn fraction(name: &'static str, value: f32) -> Result<(), EvolutionConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EvolutionConfigError::Fraction { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), EvolutionConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(EvolutionConfigError::Negative { name, value })
    }
}

fn at_least_one<T>(name: &'static str, value: T) -> Result<(), EvolutionConfigError>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        Err(EvolutionConfigError::Zero { name })
    } else {
        Ok(())
    }
}

impl EvolutionConfig {
    /// Checks every parameter; nothing is clamped.
    ///
    /// # Example
    ///
    /// ```
    /// use hurdle_training::config::{EvolutionConfig, EvolutionConfigError};
    ///
    /// let config = EvolutionConfig { parent_count: 6, ..EvolutionConfig::default() };
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(EvolutionConfigError::ParentCount { parents: 6, population: 5 })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        if self.population_size == 0 {
            return Err(EvolutionConfigError::EmptyPopulation);
        }
        if self.parent_count == 0 || self.parent_count > self.population_size {
            return Err(EvolutionConfigError::ParentCount {
                parents: self.parent_count,
                population: self.population_size,
            });
        }
        fraction("mutation_chance", self.mutation_chance)?;
        non_negative("mutation_size", self.mutation_size)?;
        fraction("crossover_rate", self.crossover_rate)?;
        fraction("cross_generation_rate", self.cross_generation_rate)?;
        if self.crossover_rate + self.cross_generation_rate > 1.0 {
            return Err(EvolutionConfigError::FractionSum {
                crossover: self.crossover_rate,
                cross_generation: self.cross_generation_rate,
            });
        }
        fraction("decision_threshold", self.decision_threshold)?;
        non_negative("loss_penalty", self.loss_penalty)?;
        at_least_one("max_generations", self.max_generations)?;
        at_least_one("reset_threshold", self.reset_threshold)?;
        at_least_one("success_window", self.success_window)?;
        at_least_one("hidden_units", self.hidden_units)?;
        if let Some(limit) = self.generation_tick_limit {
            at_least_one("generation_tick_limit", limit)?;
        }
        self.fitness.validate()?;
        Ok(())
    }

    /// Shape of freshly drawn policies in a world with or without keys.
    #[must_use]
    pub fn policy_shape(&self, keys_enabled: bool) -> PolicyShape {
        PolicyShape {
            kind: self.policy,
            evolve_jump_force: self.evolve_jump_force,
            keys_enabled,
            hidden: self.hidden_units,
        }
    }
}

/// An invalid run configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ConfigError {
    #[display("invalid world configuration: {_0}")]
    World(hurdle_engine::ConfigError),
    #[display("invalid evolution configuration: {_0}")]
    Evolution(EvolutionConfigError),
    #[display("invalid policy shape: {_0}")]
    Policy(hurdle_policy::PolicyError),
}

/// Everything a training run is configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub evolution: EvolutionConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.evolution.validate()?;
        Ok(())
    }
}
