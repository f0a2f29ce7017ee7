use hurdle_engine::{AgentId, Mount, Obstacle, SimSeed, World, WorldConfig};
use hurdle_policy::{Policy, PolicyKind, ThresholdPolicy};
use hurdle_training::{
    config::{Config, EvolutionConfig},
    trainer::Trainer,
};

fn config(population_size: usize, max_generations: u32) -> Config {
    Config {
        world: WorldConfig::default(),
        evolution: EvolutionConfig {
            population_size,
            max_generations,
            generation_tick_limit: Some(900),
            ..EvolutionConfig::default()
        },
    }
}

fn run(config: Config, seed: u64) -> Trainer {
    let mut trainer = Trainer::new(config, SimSeed::from_u64(seed)).unwrap();
    while trainer.run_generation().is_some() {}
    trainer
}

#[test]
fn test_threshold_policy_clears_low_obstacle() {
    let config = WorldConfig {
        obstacle_width: 50.0,
        jump_impulse: -14.0,
        ..WorldConfig::default()
    };
    let obstacle = Obstacle::new(&config, Mount::Floor, 80.0);
    let mut world = World::with_obstacle(config, 1, SimSeed::from_u64(0), obstacle).unwrap();
    let policy = Policy::from(ThresholdPolicy::new(60.0, 80.0));

    let mut first_jump = None;
    for tick in 1_u32.. {
        let report = world.tick(|_, sensed| policy.act(sensed));
        assert!(report.deaths.is_empty(), "died at tick {tick}");
        if report.jumps > 0 && first_jump.is_none() {
            first_jump = Some((tick, world.hazards().obstacle().x()));
        }
        if report.recycled {
            break;
        }
    }

    // first tick with obstacle.x - agent.x <= 60
    assert_eq!(first_jump, Some((214, 130.0)));
    let agent = world.agent(AgentId(0)).unwrap();
    assert!(agent.is_alive());
    assert_eq!(agent.score(), 1);
}

#[test]
fn test_population_size_is_constant() {
    let mut trainer = Trainer::new(config(7, 4), SimSeed::from_u64(1)).unwrap();
    while trainer.run_generation().is_some() {
        assert_eq!(trainer.population().len(), 7);
        assert_eq!(trainer.world().agents().len(), 7);
    }
    for record in trainer.log().records() {
        assert_eq!(record.fitness.len(), 7);
        assert_eq!(record.scores.len(), 7);
        assert_eq!(record.toughness.len(), 7);
    }
}

#[test]
fn test_stops_at_generation_cap() {
    let trainer = run(config(5, 6), 2);
    assert!(trainer.is_finished());
    assert_eq!(trainer.generation(), 6);
    let generations = trainer
        .log()
        .records()
        .iter()
        .map(|record| record.generation)
        .collect::<Vec<_>>();
    assert_eq!(generations, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(trainer.success().generations(), 6);
}

#[test]
fn test_same_seed_same_run() {
    let a = run(config(5, 4), 3);
    let b = run(config(5, 4), 3);
    assert_eq!(a.log(), b.log());
    assert_eq!(a.success(), b.success());
}

#[test]
fn test_perceptron_with_keys() {
    let mut config = config(4, 3);
    config.world.keys_enabled = true;
    config.evolution.policy = PolicyKind::Perceptron;
    config.evolution.hidden_units = 2;
    let trainer = run(config, 4);

    assert_eq!(trainer.log().len(), 3);
    for ind in trainer.population().individuals() {
        let Policy::Perceptron(net) = ind.policy() else {
            panic!("expected a perceptron");
        };
        assert_eq!((net.inputs(), net.hidden()), (7, 2));
    }
}

#[test]
fn test_best_overall_never_decreases() {
    let trainer = run(config(6, 8), 5);
    let mut best = f32::MIN;
    for record in trainer.log().records() {
        best = best.max(record.best_fitness);
    }
    let overall = trainer.log().best_overall().unwrap();
    assert_eq!(overall.best_fitness, best);
}
