use crate::config::{ConfigError, WorldConfig};

use super::{
    agent::{Action, AgentId},
    seed::SimSeed,
    world::{TickReport, World},
};

const PLAYER: AgentId = AgentId(0);

/// A single human-controlled agent.
///
/// Jumps only happen on request. The round restarts as soon as the agent's
/// death animation has finished.
#[derive(Debug, Clone)]
pub struct ManualSession {
    world: World,
    attempts: u32,
    high_score: u32,
}

impl ManualSession {
    pub fn new(config: WorldConfig, seed: SimSeed) -> Result<Self, ConfigError> {
        Ok(Self {
            world: World::new(config, 1, seed)?,
            attempts: 1,
            high_score: 0,
        })
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of rounds started so far, including the current one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn jump(&mut self) -> bool {
        self.world.jump(PLAYER)
    }

    pub fn toggle_pause(&mut self) {
        self.world.toggle_pause();
    }

    pub fn adjust_fps(&mut self, delta: f32) {
        self.world.adjust_fps(delta);
    }

    pub fn tick(&mut self) -> TickReport {
        let report = self.world.tick(|_, _| Action::Idle);
        if let Some(agent) = self.world.agent(PLAYER) {
            self.high_score = self.high_score.max(agent.score());
        }
        if self.world.all_terminal() {
            self.world.reset();
            self.attempts += 1;
        }
        report
    }
}
