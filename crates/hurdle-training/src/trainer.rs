//! The simulation and evolution loop.
//!
//! A [`Trainer`] owns the world, the population driving its agents and the
//! run's history. Every [`Trainer::step`] advances the world by one tick; once
//! every agent is terminal the generation is evaluated, recorded and replaced
//! by the next one before the following tick runs.

use hurdle_engine::{AgentId, SimSeed, World};
use hurdle_stats::descriptive::DescriptiveStats;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, ConfigError},
    genetic::{Population, PopulationEvolver},
    record::{GenerationLog, GenerationRecord},
    success::SuccessTracker,
};

/// Random stream used for initial policies and evolution; the hazard stream
/// uses stream 0.
const EVOLUTION_STREAM: u64 = 1;

/// Summary of a finished generation, for progress output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best_time_alive: f32,
    pub previous_best_time: Option<f32>,
    pub overall_best_time: f32,
    pub best_fitness: f32,
    pub overall_best_fitness: f32,
    pub high_score: u32,
    pub overall_high_score: u32,
    pub fitness: Option<DescriptiveStats>,
    /// Success rate over all generations.
    pub success_rate: Option<DescriptiveStats>,
    /// Success rate over the last `success_window` generations; `None` until
    /// that many generations have finished.
    pub recent_success_rate: Option<DescriptiveStats>,
    pub highest_toughness: u32,
    pub fps: f32,
    /// The next generation's clone slots were redrawn.
    pub stagnation_reset: bool,
}

#[derive(Debug)]
pub struct Trainer {
    config: Config,
    world: World,
    population: Population,
    evolver: PopulationEvolver,
    log: GenerationLog,
    success: SuccessTracker,
    generation: u32,
    deaths: Vec<AgentId>,
    rng: Pcg32,
}

impl Trainer {
    /// Validates the configuration and draws the first generation.
    pub fn new(config: Config, seed: SimSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let evolution = &config.evolution;
        let mut rng = seed.stream(EVOLUTION_STREAM);
        let population = Population::random(
            evolution.population_size,
            evolution.policy_shape(config.world.keys_enabled),
            evolution.decision_threshold,
            &mut rng,
        )?;
        let world = World::new(config.world.clone(), evolution.population_size, seed)?;
        Ok(Self {
            evolver: PopulationEvolver::from(evolution),
            config,
            world,
            population,
            log: GenerationLog::new(),
            success: SuccessTracker::new(),
            generation: 1,
            deaths: vec![],
            rng,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn log(&self) -> &GenerationLog {
        &self.log
    }

    #[must_use]
    pub fn success(&self) -> &SuccessTracker {
        &self.success
    }

    /// The generation currently running, starting at 1.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.world.run_state().is_finished()
    }

    pub fn toggle_pause(&mut self) {
        self.world.toggle_pause();
    }

    pub fn adjust_fps(&mut self, delta: f32) {
        self.world.adjust_fps(delta);
    }

    /// Stops the run after the current tick.
    pub fn stop(&mut self) {
        self.world.stop();
    }

    /// Advances the world by one tick.
    ///
    /// Returns the generation's statistics when this tick finished it. Does
    /// nothing while paused or finished.
    pub fn step(&mut self) -> Option<GenerationStats> {
        if !self.world.run_state().is_running() {
            return None;
        }

        let population = &self.population;
        let report = self
            .world
            .tick(|agent, sensed| population.policy(agent.id()).act(sensed));
        self.deaths.extend(report.deaths);

        let ticks = self.world.clock().ticks();
        if self
            .config
            .evolution
            .generation_tick_limit
            .is_some_and(|limit| ticks >= limit)
        {
            self.world.retire_alive();
        }

        self.world
            .all_terminal()
            .then(|| self.finish_generation())
    }

    /// Steps until the current generation finishes.
    ///
    /// Returns `None` if the run is paused or finished before that.
    pub fn run_generation(&mut self) -> Option<GenerationStats> {
        while self.world.run_state().is_running() {
            if let Some(stats) = self.step() {
                return Some(stats);
            }
        }
        None
    }

    fn finish_generation(&mut self) -> GenerationStats {
        let evolution = &self.config.evolution;
        self.population.evaluate(&self.world, &evolution.fitness);
        self.population.promote_parents(evolution.parent_count);
        self.log
            .push(GenerationRecord::new(self.generation, &self.population));
        let scores = self
            .population
            .individuals()
            .iter()
            .map(|ind| (ind.id(), ind.outcome().map_or(0, |o| o.score)));
        self.success.record_generation(scores, &self.deaths);
        self.deaths.clear();

        let last_generation = self.generation >= evolution.max_generations;
        let stagnant = !last_generation && self.log.is_stagnant(evolution.reset_threshold);
        let stats = self.generation_stats(stagnant);

        if last_generation {
            self.world.stop();
            return stats;
        }

        let best_overall = self.log.best_overall().map_or_else(
            || self.population.best().policy().clone(),
            |record| record.best_policy.clone(),
        );
        self.population =
            self.evolver
                .evolve(&self.population, &best_overall, stagnant, &mut self.rng);
        self.world.reset();
        self.generation += 1;
        stats
    }

    fn generation_stats(&self, stagnation_reset: bool) -> GenerationStats {
        let evolution = &self.config.evolution;
        let best = self.population.best();
        let high_score = self.log.last().map_or(0, |record| record.high_score);
        GenerationStats {
            generation: self.generation,
            best_time_alive: best.outcome().map_or(0.0, |o| o.time_alive),
            previous_best_time: self.log.previous().map(|record| record.best_time_alive),
            overall_best_time: self.log.best_time_overall().unwrap_or(0.0),
            best_fitness: best.fitness(),
            overall_best_fitness: self
                .log
                .best_overall()
                .map_or(best.fitness(), |record| record.best_fitness),
            high_score,
            overall_high_score: self.log.high_score_overall(),
            fitness: self.population.compute_fitness_stats(),
            success_rate: self.success.summary(None, evolution.loss_penalty),
            recent_success_rate: self
                .success
                .summary(Some(evolution.success_window), evolution.loss_penalty),
            highest_toughness: self.population.highest_toughness(),
            fps: self.world.clock().fps(),
            stagnation_reset,
        }
    }
}
