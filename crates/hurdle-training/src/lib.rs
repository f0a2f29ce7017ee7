//! Generational training of jump policies.
//!
//! This crate runs the evolution loop on top of the simulation in
//! `hurdle-engine`: a population of policies drives the agents of one world,
//! and when every agent has finished its round the population is scored and
//! replaced by the next generation.
//!
//! # How Training Works
//!
//! 1. **Population** - Draw random policies, one per agent
//! 2. **Simulation** - Tick the world until every agent is terminal, or retire
//!    the survivors once the round hits the tick limit
//! 3. **Fitness** - Weight time alive, pass score and key score
//!    ([`fitness`])
//! 4. **Record** - Append the generation to the [`record::GenerationLog`] and
//!    the per-agent [`success`] history
//! 5. **Reproduction** - Crossover, cross-generation crossover, clone or
//!    reset, then mutation ([`genetic`])
//! 6. **Repeat** - Until `max_generations` have finished
//!
//! # Architecture
//!
//! ```text
//! Trainer
//!     ↓ ticks
//! World (hurdle-engine) ← decisions from Policy (hurdle-policy)
//!     ↓ outcomes
//! Population::evaluate
//!     ↓ fitness
//! GenerationLog, SuccessTracker
//!     ↓ best policies
//! PopulationEvolver::evolve
//! ```
//!
//! # Example
//!
//! ```
//! use hurdle_engine::SimSeed;
//! use hurdle_training::{config::Config, trainer::Trainer};
//!
//! let mut config = Config::default();
//! config.evolution.max_generations = 2;
//! config.evolution.generation_tick_limit = Some(600);
//!
//! let mut trainer = Trainer::new(config, SimSeed::from_u64(7)).unwrap();
//! while let Some(stats) = trainer.run_generation() {
//!     assert!(stats.best_time_alive >= 0.0);
//! }
//! assert!(trainer.is_finished());
//! assert_eq!(trainer.log().len(), 2);
//! ```
//!
//! # Current Limitations
//!
//! - **Single hazard**: One obstacle is on screen at a time
//! - **Single-objective**: Time, passes and keys are folded into one scalar
//!   fitness with fixed weights
//! - **Sequential**: Agents share one world and are simulated on one thread

pub mod config;
pub mod fitness;
pub mod genes;
pub mod genetic;
pub mod record;
pub mod success;
pub mod trainer;
