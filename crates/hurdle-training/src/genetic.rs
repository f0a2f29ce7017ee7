//! Generational genetic algorithm over agent policies.
//!
//! One generation runs as follows:
//!
//! 1. **Evaluate** - [`Population::evaluate`] reads each agent's outcome from
//!    the finished world and computes its fitness
//! 2. **Promote** - [`Population::promote_parents`] bumps the toughness of the
//!    top `parent_count` individuals and clears everyone else's
//! 3. **Evolve** - [`PopulationEvolver::evolve`] fills the next generation's
//!    slots, worst rank first:
//!    - crossover of two distinct parents drawn from the top individuals
//!    - cross-generation crossover of the generation's best with the best
//!      policy of the whole run
//!    - the rest clone the generation's best, or draw a fresh policy when
//!      the run has stagnated
//!
//! Every child except a fresh draw is mutated. Slot `i` of the next
//! population takes the toughness of the individual ranked `i`-th from the
//! bottom, so the best slots carry the parents' toughness forward.
//!
//! # Example
//!
//! ```
//! use hurdle_engine::{SimSeed, World, WorldConfig};
//! use hurdle_policy::{PolicyKind, PolicyShape};
//! use hurdle_training::{fitness::FitnessWeights, genetic::{Population, PopulationEvolver}};
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
//! let shape = PolicyShape {
//!     kind: PolicyKind::Threshold,
//!     evolve_jump_force: false,
//!     keys_enabled: false,
//!     hidden: 3,
//! };
//! let mut population = Population::random(6, shape, 0.5, &mut rng).unwrap();
//!
//! let mut world = World::new(WorldConfig::default(), 6, SimSeed::from_u64(1)).unwrap();
//! for _ in 0..2_000 {
//!     world.tick(|agent, sensed| population.policy(agent.id()).act(sensed));
//! }
//! world.retire_alive();
//! population.evaluate(&world, &FitnessWeights::default());
//! population.promote_parents(2);
//!
//! let evolver = PopulationEvolver {
//!     parent_count: 2,
//!     crossover_rate: 0.3,
//!     cross_generation_rate: 0.3,
//!     mutation_chance: 0.5,
//!     mutation_size: 0.5,
//! };
//! let best = population.best().policy().clone();
//! let next = evolver.evolve(&population, &best, false, &mut rng);
//! assert_eq!(next.individuals().len(), 6);
//! ```

use hurdle_engine::{AgentId, World};
use hurdle_policy::{Policy, PolicyError, PolicyShape, ThresholdPolicy};
use hurdle_stats::descriptive::DescriptiveStats;
use rand::{Rng, seq::IndexedRandom};

use crate::{
    config::EvolutionConfig,
    fitness::{FitnessWeights, Outcome},
    genes,
};

/// Half width of the uniform perceptron mutation, per unit of mutation size.
const PERCEPTRON_MUTATION_SPREAD: f32 = 0.25;

/// One slot of the population: a policy and what it achieved.
#[derive(Debug, Clone)]
pub struct Individual {
    id: AgentId,
    policy: Policy,
    toughness: u32,
    outcome: Option<Outcome>,
    fitness: f32,
}

impl Individual {
    fn new(id: AgentId, policy: Policy, toughness: u32) -> Self {
        Self {
            id,
            policy,
            toughness,
            outcome: None,
            fitness: f32::MIN,
        }
    }

    /// Id of the agent this individual drives; equal to its slot index.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Consecutive generations this slot has been among the parents.
    #[must_use]
    pub fn toughness(&self) -> u32 {
        self.toughness
    }

    /// `None` until the individual has been evaluated.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// The individuals of one generation, in agent id order.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Draws `count` fresh policies of the given shape.
    pub fn random<R>(
        count: usize,
        shape: PolicyShape,
        decision_threshold: f32,
        rng: &mut R,
    ) -> Result<Self, PolicyError>
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..)
            .take(count)
            .map(|id| {
                let policy = Policy::random(shape, decision_threshold, rng)?;
                Ok(Individual::new(AgentId(id), policy, 0))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { individuals })
    }

    /// Wraps existing policies, slot `i` driving agent `i`.
    #[must_use]
    pub fn from_policies<I>(policies: I) -> Self
    where
        I: IntoIterator<Item = Policy>,
    {
        let individuals = (0..)
            .zip(policies)
            .map(|(id, policy)| Individual::new(AgentId(id), policy, 0))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Policy driving the agent `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a slot of this population.
    #[must_use]
    pub fn policy(&self, id: AgentId) -> &Policy {
        &self.individuals[id.0 as usize].policy
    }

    /// Reads every agent's outcome from a finished world and computes the
    /// fitness of each individual.
    ///
    /// # Panics
    ///
    /// Panics if the world does not hold exactly one agent per individual.
    #[expect(clippy::cast_possible_truncation)]
    pub fn evaluate(&mut self, world: &World, weights: &FitnessWeights) {
        assert_eq!(
            world.agents().len(),
            self.individuals.len(),
            "one agent per individual"
        );
        let crossing_time = world.config().crossing_time();
        for (ind, agent) in self.individuals.iter_mut().zip(world.agents()) {
            let outcome = Outcome {
                time_alive: agent.time_alive().unwrap_or(0.0) as f32,
                score: agent.score(),
                key_score: agent.key_score(),
            };
            ind.fitness = weights.fitness(&outcome, ind.toughness, crossing_time);
            ind.outcome = Some(outcome);
        }
    }

    /// Increments the toughness of the top `parent_count` individuals and
    /// resets everyone else's to zero.
    pub fn promote_parents(&mut self, parent_count: usize) {
        let parents = self.ranked().into_iter().take(parent_count).collect::<Vec<_>>();
        for (i, ind) in self.individuals.iter_mut().enumerate() {
            if parents.contains(&i) {
                ind.toughness += 1;
            } else {
                ind.toughness = 0;
            }
        }
    }

    /// Slot indices by fitness, best first; ties keep slot order.
    #[must_use]
    pub fn ranked(&self) -> Vec<usize> {
        let mut order = (0..self.individuals.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| {
            self.individuals[b]
                .fitness
                .total_cmp(&self.individuals[a].fitness)
        });
        order
    }

    /// The fittest individual; the lowest slot wins ties.
    ///
    /// # Panics
    ///
    /// Panics if the population is empty.
    #[must_use]
    pub fn best(&self) -> &Individual {
        &self.individuals[self.ranked()[0]]
    }

    /// Descriptive statistics of the population's fitness.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.individuals.iter().map(|ind| ind.fitness))
    }

    #[must_use]
    pub fn highest_toughness(&self) -> u32 {
        self.individuals
            .iter()
            .map(|ind| ind.toughness)
            .max()
            .unwrap_or(0)
    }
}

/// Controls how one generation produces the next.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of top individuals crossover parents are drawn from.
    pub parent_count: usize,
    pub crossover_rate: f32,
    pub cross_generation_rate: f32,
    /// Probability of mutating each gene.
    pub mutation_chance: f32,
    pub mutation_size: f32,
}

impl From<&EvolutionConfig> for PopulationEvolver {
    fn from(config: &EvolutionConfig) -> Self {
        Self {
            parent_count: config.parent_count,
            crossover_rate: config.crossover_rate,
            cross_generation_rate: config.cross_generation_rate,
            mutation_chance: config.mutation_chance,
            mutation_size: config.mutation_size,
        }
    }
}

/// How a slot of the next generation is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Breeding {
    Crossover,
    CrossGeneration,
    CloneOrReset,
}

impl PopulationEvolver {
    /// Number of crossover and cross-generation slots in a population of
    /// `size`; the remaining slots clone or reset.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn slot_counts(&self, size: usize) -> (usize, usize) {
        let size_f = size as f32;
        let crossover = ((size_f * self.crossover_rate) as usize).min(size);
        let until = ((size_f * (self.crossover_rate + self.cross_generation_rate)) as usize)
            .clamp(crossover, size);
        (crossover, until - crossover)
    }

    fn breeding(&self, slot: usize, size: usize) -> Breeding {
        let (crossover, cross_generation) = self.slot_counts(size);
        if slot < crossover {
            Breeding::Crossover
        } else if slot < crossover + cross_generation {
            Breeding::CrossGeneration
        } else {
            Breeding::CloneOrReset
        }
    }

    /// Produces the next generation from an evaluated population.
    ///
    /// `best_overall` is the best policy of the whole run so far. With
    /// `stagnant` set, the clone slots draw fresh policies instead.
    ///
    /// # Panics
    ///
    /// Panics if the population is empty or `parent_count` is zero.
    #[must_use]
    pub fn evolve<R>(
        &self,
        population: &Population,
        best_overall: &Policy,
        stagnant: bool,
        rng: &mut R,
    ) -> Population
    where
        R: Rng + ?Sized,
    {
        assert!(!population.is_empty(), "population must not be empty");
        assert!(self.parent_count > 0, "at least one parent is needed");

        let ranked = population.ranked();
        let parents = ranked
            .iter()
            .take(self.parent_count)
            .map(|&i| &population.individuals[i])
            .collect::<Vec<_>>();
        let best = parents[0];
        let size = population.len();

        let individuals = (0..)
            .zip(ranked.iter().rev())
            .enumerate()
            .map(|(slot, (id, &previous))| {
                let policy = match self.breeding(slot, size) {
                    Breeding::Crossover => {
                        let (p1, p2) = pick_pair(&parents, rng);
                        self.mutated(crossover(&p1.policy, &p2.policy), rng)
                    }
                    Breeding::CrossGeneration => {
                        self.mutated(crossover(&best.policy, best_overall), rng)
                    }
                    Breeding::CloneOrReset if stagnant => {
                        let mut policy = best.policy.clone();
                        policy.redraw(rng);
                        policy
                    }
                    Breeding::CloneOrReset => self.mutated(best.policy.clone(), rng),
                };
                let toughness = population.individuals[previous].toughness;
                Individual::new(AgentId(id), policy, toughness)
            })
            .collect();
        Population { individuals }
    }

    fn mutated<R>(&self, mut policy: Policy, rng: &mut R) -> Policy
    where
        R: Rng + ?Sized,
    {
        self.mutate(&mut policy, rng);
        policy
    }

    /// Mutates each gene with probability `mutation_chance`.
    ///
    /// Threshold distances and heights receive integer normal noise with
    /// standard deviation `2 * mutation_size`, the jump force with
    /// `mutation_size`. Perceptron weights receive
    /// `mutation_size * U(-0.25, 0.25)`.
    pub fn mutate<R>(&self, policy: &mut Policy, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let chance = self.mutation_chance;
        let size = self.mutation_size;
        match policy {
            Policy::Threshold(_) => {
                let (thresholds, force) = policy
                    .genes_mut()
                    .split_at_mut(ThresholdPolicy::JUMP_FORCE);
                genes::mutate_int_normal(thresholds, chance, 2.0 * size, rng);
                genes::mutate_int_normal(force, chance, size, rng);
            }
            Policy::Perceptron(_) => {
                let half_width = PERCEPTRON_MUTATION_SPREAD * size;
                genes::mutate_uniform(policy.genes_mut(), chance, half_width, rng);
            }
        }
    }
}

/// Two distinct parents, or the only parent twice.
fn pick_pair<'a, R>(parents: &[&'a Individual], rng: &mut R) -> (&'a Individual, &'a Individual)
where
    R: Rng + ?Sized,
{
    let mut picked = parents.choose_multiple(rng, 2);
    let first = *picked.next().unwrap();
    let second = picked.next().map_or(first, |p| *p);
    (first, second)
}

/// Gene-wise mean of two policies of the same shape.
fn crossover(p1: &Policy, p2: &Policy) -> Policy {
    let mut child = p1.clone();
    child
        .genes_mut()
        .copy_from_slice(&genes::mean(p1.genes(), p2.genes()));
    child
}
