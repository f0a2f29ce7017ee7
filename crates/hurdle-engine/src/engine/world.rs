use serde::{Deserialize, Serialize};

use crate::{
    config::{ConfigError, WorldConfig},
    core::geometry::Circle,
};

use super::{
    agent::{Action, Agent, AgentId, LifeState},
    clock::SimClock,
    hazard::{HazardStream, Mount, Obstacle},
    seed::SimSeed,
};

/// Whether the tick loop is making progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum RunState {
    Running,
    Paused,
    /// Stopped for good (generation cap reached or external stop signal).
    Finished,
}

/// Offset from an agent's centre to the key centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyOffset {
    pub dx: f32,
    pub dy: f32,
}

/// Everything an agent perceives about the current hazard.
///
/// Read before any agent moves in a tick, so every agent senses the same
/// hazard state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensedState {
    pub y: f32,
    pub vy: f32,
    /// `obstacle.x - agent.x`; negative once the agent's centre is past the
    /// obstacle's leading edge.
    pub dx: f32,
    pub obstacle_width: f32,
    /// How deep the agent's centre reaches into the obstacle's vertical
    /// extent: `y - edge` for floor obstacles, `edge - y` for ceiling
    /// obstacles. Positive once the centre is level with the obstacle.
    pub height_diff: f32,
    /// `opening.bottom - y`; positive while the centre is above the lower
    /// bound of the opening.
    pub gap_to_lower: f32,
    /// `y - opening.top`; positive while the centre is below the upper bound
    /// of the opening.
    pub gap_to_upper: f32,
    /// Offset to the key centre when keys are enabled. Zero once this agent
    /// holds the key.
    pub key: Option<KeyOffset>,
}

impl SensedState {
    fn new(config: &WorldConfig, hazards: &HazardStream, agent: &Agent) -> Self {
        let obstacle = hazards.obstacle();
        let opening = obstacle.opening();
        let y = agent.y();
        let key = config.keys_enabled.then(|| match hazards.key() {
            Some(key) if !agent.has_key() => {
                let (kx, ky) = key.center();
                KeyOffset {
                    dx: kx - agent.x(),
                    dy: ky - y,
                }
            }
            _ => KeyOffset { dx: 0.0, dy: 0.0 },
        });
        let height_diff = match obstacle.mount() {
            Mount::Floor => y - obstacle.edge_y(),
            Mount::Ceiling => obstacle.edge_y() - y,
        };
        Self {
            y,
            vy: agent.vy(),
            dx: obstacle.x() - agent.x(),
            obstacle_width: obstacle.width(),
            height_diff,
            gap_to_lower: opening.bottom - y,
            gap_to_upper: y - opening.top,
            key,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The obstacle left the world and was respawned.
    pub recycled: bool,
    pub jumps: u32,
    pub passes: u32,
    pub keys: u32,
    pub deaths: Vec<AgentId>,
}

/// The simulated world: one hazard stream and a fixed set of agents.
///
/// The world owns everything the tick loop mutates. Decision making is
/// injected per tick, so the world does not know how agents decide.
///
/// # Tick order
///
/// 1. advance the clock and the hazard stream
/// 2. for every agent: sense, decide, jump, integrate, score passes
/// 3. for every agent: key pickup and fatal collisions
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    clock: SimClock,
    hazards: HazardStream,
    agents: Vec<Agent>,
    run_state: RunState,
}

impl World {
    /// Creates a world with `agent_count` agents numbered from zero.
    ///
    /// # Example
    ///
    /// ```
    /// use hurdle_engine::{Action, SimSeed, World, WorldConfig};
    ///
    /// let mut world = World::new(WorldConfig::default(), 3, SimSeed::from_u64(1)).unwrap();
    /// while !world.all_terminal() {
    ///     world.tick(|_, _| Action::Idle);
    /// }
    /// assert!(world.agents().iter().all(|a| a.time_alive().is_some()));
    /// ```
    pub fn new(config: WorldConfig, agent_count: usize, seed: SimSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let hazards = HazardStream::new(&config, seed);
        Self::with_hazards(config, agent_count, hazards)
    }

    /// Like [`Self::new`], but starting with the given obstacle.
    pub fn with_obstacle(
        config: WorldConfig,
        agent_count: usize,
        seed: SimSeed,
        obstacle: Obstacle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let hazards = HazardStream::with_obstacle(&config, seed, obstacle);
        Self::with_hazards(config, agent_count, hazards)
    }

    fn with_hazards(
        config: WorldConfig,
        agent_count: usize,
        hazards: HazardStream,
    ) -> Result<Self, ConfigError> {
        if agent_count == 0 {
            return Err(ConfigError::NoAgents);
        }
        let clock = SimClock::new(config.game_fps);
        let agents = (0..)
            .take(agent_count)
            .map(|i| Agent::new(AgentId(i), &config, clock.now()))
            .collect();
        Ok(Self {
            config,
            clock,
            hazards,
            agents,
            run_state: RunState::Running,
        })
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[must_use]
    pub fn hazards(&self) -> &HazardStream {
        &self.hazards
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.is_alive()).count()
    }

    /// Whether every agent has finished its death animation.
    #[must_use]
    pub fn all_terminal(&self) -> bool {
        self.agents.iter().all(|agent| agent.life().is_terminal())
    }

    /// What agent `id` would sense right now.
    #[must_use]
    pub fn sense(&self, id: AgentId) -> Option<SensedState> {
        self.agent(id)
            .map(|agent| SensedState::new(&self.config, &self.hazards, agent))
    }

    /// Requests a jump for a single agent (manual control).
    ///
    /// Subject to the same cooldown as policy-driven jumps. Returns `true`
    /// when the jump happened.
    pub fn jump(&mut self, id: AgentId) -> bool {
        if !self.run_state.is_running() {
            return false;
        }
        let now = self.clock.now();
        let cooldown = self.config.jump_cooldown_at(self.clock.fps());
        let impulse = self.config.jump_impulse;
        self.agents
            .iter_mut()
            .find(|agent| agent.id() == id)
            .is_some_and(|agent| agent.jump(now, cooldown, impulse))
    }

    pub fn toggle_pause(&mut self) {
        self.run_state = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Finished => RunState::Finished,
        };
    }

    /// External stop signal; the world never runs again.
    pub fn stop(&mut self) {
        self.run_state = RunState::Finished;
    }

    pub fn adjust_fps(&mut self, delta: f32) {
        self.clock.adjust_fps(delta);
    }

    /// Starts a new round: clock, hazards, kinematics and scores are reset.
    pub fn reset(&mut self) {
        self.clock.restart();
        self.hazards.reset(&self.config);
        let now = self.clock.now();
        for agent in &mut self.agents {
            agent.reset(&self.config, now);
        }
    }

    /// Ends the round for every living agent as if it had died now.
    ///
    /// Retired agents play the death animation but are not reported as
    /// deaths. Returns the number of retired agents.
    pub fn retire_alive(&mut self) -> usize {
        let now = self.clock.now();
        let mut retired = 0;
        for agent in self.agents.iter_mut().filter(|agent| agent.is_alive()) {
            agent.kill(now, &self.config);
            retired += 1;
        }
        retired
    }

    /// Advances the world by one tick.
    ///
    /// `decide` is asked once per living agent. Does nothing unless the world
    /// is running.
    pub fn tick<F>(&mut self, mut decide: F) -> TickReport
    where
        F: FnMut(&Agent, &SensedState) -> Action,
    {
        let mut report = TickReport::default();
        if !self.run_state.is_running() {
            return report;
        }

        self.clock.advance();
        let now = self.clock.now();
        let cooldown = self.config.jump_cooldown_at(self.clock.fps());

        report.recycled = self.hazards.advance(&self.config);
        if report.recycled {
            for agent in &mut self.agents {
                agent.next_obstacle();
            }
        }

        let trailing_edge = self.hazards.obstacle().trailing_edge();
        for agent in &mut self.agents {
            match agent.life() {
                LifeState::Alive => {
                    let sensed = SensedState::new(&self.config, &self.hazards, agent);
                    if let Action::Jump { impulse } = decide(agent, &sensed) {
                        let impulse = impulse.unwrap_or(self.config.jump_impulse);
                        if agent.jump(now, cooldown, impulse) {
                            report.jumps += 1;
                        }
                    }
                    agent.integrate(&self.config);
                    if agent.try_pass(trailing_edge) {
                        report.passes += 1;
                    }
                }
                LifeState::Dying { .. } => agent.animate(&self.config),
                LifeState::Terminal => {}
            }
        }

        for agent in &mut self.agents {
            if !agent.is_alive() {
                continue;
            }
            let circle = agent.circle();
            if self.config.keys_enabled && !agent.has_key() && self.hazards.touches_key(&circle) {
                agent.pick_key();
                self.hazards.collect_key();
                report.keys += 1;
            }
            if !self.hazards.hit(&circle, agent.has_key()).is_clear()
                || touches_bounds(&self.config, &circle)
            {
                agent.kill(now, &self.config);
                report.deaths.push(agent.id());
            }
        }

        report
    }
}

/// Roof contact is fatal. The floor test is strict because a grounded agent
/// rests exactly on the ground surface.
fn touches_bounds(config: &WorldConfig, circle: &Circle) -> bool {
    circle.y - circle.radius <= config.roof_height()
        || circle.y + circle.radius > config.ground_height()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(config: WorldConfig, agents: usize, mount: Mount, height: f32) -> World {
        let obstacle = Obstacle::new(&config, mount, height);
        World::with_obstacle(config, agents, SimSeed::from_u64(11), obstacle).unwrap()
    }

    #[test]
    fn test_rejects_empty_world() {
        let result = World::new(WorldConfig::default(), 0, SimSeed::from_u64(0));
        assert_eq!(result.err(), Some(ConfigError::NoAgents));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = WorldConfig {
            obstacle_speed: -1.0,
            ..WorldConfig::default()
        };
        assert!(World::new(config, 1, SimSeed::from_u64(0)).is_err());
    }

    #[test]
    fn test_idle_agent_dies_at_floor_obstacle() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 1, Mount::Floor, 200.0);
        let mut death_tick = None;
        for _ in 0..400 {
            let report = world.tick(|_, _| Action::Idle);
            if !report.deaths.is_empty() {
                death_tick = Some(world.clock().ticks());
                break;
            }
        }
        // leading edge reaches x = 90 (agent x + radius) after 222 ticks,
        // strict overlap needs one more tick
        assert_eq!(death_tick, Some(223));
        let agent = &world.agents()[0];
        let expected = 223.0 / 90.0;
        assert!((agent.time_alive().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_idle_agent_passes_ceiling_obstacle() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 2, Mount::Ceiling, 300.0);
        let mut passes = 0;
        for _ in 0..260 {
            passes += world.tick(|_, _| Action::Idle).passes;
        }
        assert_eq!(passes, 2);
        assert!(world.agents().iter().all(|a| a.score() == 1 && a.is_alive()));
    }

    #[test]
    fn test_all_agents_read_same_hazard() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 4, Mount::Floor, 250.0);
        for _ in 0..50 {
            let mut seen = Vec::new();
            world.tick(|_, sensed| {
                seen.push(sensed.dx);
                Action::JUMP
            });
            assert!(seen.windows(2).all(|w| w[0] == w[1]));
        }
    }

    #[test]
    fn test_jump_to_roof_is_fatal() {
        let config = WorldConfig {
            jump_impulse: -40.0,
            ..WorldConfig::default()
        };
        let mut world = world_with(config, 1, Mount::Floor, 200.0);
        let mut died = false;
        for _ in 0..40 {
            if !world.tick(|_, _| Action::JUMP).deaths.is_empty() {
                died = true;
                break;
            }
        }
        assert!(died);
        assert!(world.agents()[0].y() - 20.0 <= 50.0);
    }

    #[test]
    fn test_policy_impulse_overrides_world_impulse() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 1, Mount::Floor, 200.0);
        world.tick(|_, _| Action::Jump {
            impulse: Some(-4.0),
        });
        assert_eq!(world.agents()[0].vy(), -3.5);
    }

    #[test]
    fn test_generation_ends_after_animation() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 3, Mount::Floor, 200.0);
        let mut ticks = 0;
        while !world.all_terminal() {
            world.tick(|_, _| Action::Idle);
            ticks += 1;
            assert!(ticks < 1000);
        }
        // 223 ticks alive, 18 ticks of animation
        assert_eq!(ticks, 223 + 18);
        assert_eq!(world.alive_count(), 0);
    }

    #[test]
    fn test_pause_and_stop() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 1, Mount::Floor, 200.0);
        world.toggle_pause();
        assert_eq!(world.tick(|_, _| Action::JUMP), TickReport::default());
        assert_eq!(world.clock().ticks(), 0);
        assert!(!world.jump(AgentId(0)));
        world.toggle_pause();
        assert!(world.jump(AgentId(0)));
        world.stop();
        world.toggle_pause();
        assert!(world.run_state().is_finished());
    }

    #[test]
    fn test_retire_freezes_survivors() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 2, Mount::Ceiling, 200.0);
        for _ in 0..90 {
            world.tick(|_, _| Action::Idle);
        }
        assert_eq!(world.retire_alive(), 2);
        assert_eq!(world.retire_alive(), 0);
        assert_eq!(world.alive_count(), 0);
        let time = world.agents()[0].time_alive().unwrap();
        assert!((time - 1.0).abs() < 1e-9);
        while !world.all_terminal() {
            assert!(world.tick(|_, _| Action::Idle).deaths.is_empty());
        }
    }

    #[test]
    fn test_reset_restores_generation_start() {
        let config = WorldConfig::default();
        let mut world = world_with(config, 2, Mount::Floor, 200.0);
        while !world.all_terminal() {
            world.tick(|_, _| Action::Idle);
        }
        world.reset();
        assert_eq!(world.clock().ticks(), 0);
        assert_eq!(world.alive_count(), 2);
        assert_eq!(world.hazards().obstacle().x(), 1200.0);
        assert_eq!(world.hazards().passed(), 0);
        let ids: Vec<_> = world.agents().iter().map(Agent::id).collect();
        assert_eq!(ids, vec![AgentId(0), AgentId(1)]);
    }

    #[test]
    fn test_sensed_state_geometry() {
        let config = WorldConfig::default();
        let world = world_with(config, 1, Mount::Floor, 200.0);
        let sensed = world.sense(AgentId(0)).unwrap();
        assert_eq!(sensed.dx, 1130.0);
        assert_eq!(sensed.obstacle_width, 100.0);
        assert_eq!(sensed.height_diff, 180.0);
        assert_eq!(sensed.gap_to_lower, -180.0);
        assert_eq!(sensed.gap_to_upper, 580.0);
        assert_eq!(sensed.key, None);
    }

    #[test]
    fn test_sensed_height_against_ceiling_obstacle() {
        let config = WorldConfig::default();
        let world = world_with(config, 1, Mount::Ceiling, 250.0);
        let sensed = world.sense(AgentId(0)).unwrap();
        // obstacle edge at y = 300, agent centre at y = 630
        assert_eq!(sensed.height_diff, -330.0);
        assert_eq!(sensed.gap_to_lower, 20.0);
        assert_eq!(sensed.gap_to_upper, 330.0);
    }

    mod keys {
        use super::*;

        fn keyed() -> WorldConfig {
            WorldConfig {
                keys_enabled: true,
                ..WorldConfig::default()
            }
        }

        #[test]
        fn test_sensed_key_offset() {
            let world = world_with(keyed(), 1, Mount::Floor, 200.0);
            let sensed = world.sense(AgentId(0)).unwrap();
            let key = world.hazards().key().unwrap();
            let (kx, ky) = key.center();
            assert_eq!(
                sensed.key,
                Some(KeyOffset {
                    dx: kx - 70.0,
                    dy: ky - 630.0
                })
            );
        }

        #[test]
        fn test_keyless_agent_hits_gate() {
            // a jumping agent flies over a low floor obstacle but the closed
            // gate fills the opening above it
            let config = WorldConfig {
                jump_impulse: -12.0,
                ..keyed()
            };
            let mut world = world_with(config, 1, Mount::Floor, 50.0);
            let mut deaths = 0;
            let mut keys = 0;
            for _ in 0..300 {
                let report = world.tick(|_, sensed| Action::from_jump(sensed.dx < 40.0));
                deaths += report.deaths.len();
                keys += report.keys;
            }
            assert_eq!(keys, 0);
            assert_eq!(deaths, 1);
            assert_eq!(world.agents()[0].score(), 0);
        }

        #[test]
        fn test_keyed_agent_passes_open_gate() {
            // the grounded agent stands in the opening below a ceiling
            // obstacle and picks up a key lying on the ground
            let mut world = world_with(keyed(), 1, Mount::Ceiling, 200.0);
            world.hazards.place_key(500.0, 600.0);

            let mut keys = 0;
            let mut passes = 0;
            for tick in 1..=260 {
                let report = world.tick(|_, _| Action::Idle);
                assert!(report.deaths.is_empty(), "died at tick {tick}");
                keys += report.keys;
                passes += report.passes;
                let agent = &world.agents()[0];
                match tick {
                    // key box edge reaches x = 90 after 82 ticks
                    ..=82 => assert!(!agent.has_key()),
                    83..=259 => {
                        assert!(agent.has_key());
                        assert!(world.hazards().gate().unwrap().is_open());
                    }
                    _ => {
                        assert!(report.recycled);
                        assert!(!agent.has_key());
                    }
                }
            }

            assert_eq!(keys, 1);
            assert_eq!(passes, 1);
            let agent = &world.agents()[0];
            assert!(agent.is_alive());
            assert_eq!(agent.score(), 1);
            assert_eq!(agent.key_score(), 1);
        }

        #[test]
        fn test_held_key_hides_key_offset() {
            let mut world = world_with(keyed(), 1, Mount::Ceiling, 200.0);
            world.hazards.place_key(80.0, 600.0);
            assert_eq!(world.tick(|_, _| Action::Idle).keys, 1);
            let sensed = world.sense(AgentId(0)).unwrap();
            assert_eq!(sensed.key, Some(KeyOffset { dx: 0.0, dy: 0.0 }));
        }
    }
}
