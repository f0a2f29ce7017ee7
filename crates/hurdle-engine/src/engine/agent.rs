use serde::{Deserialize, Serialize};

use crate::{
    config::WorldConfig,
    core::{geometry::Circle, kinematics::Body},
};

/// Stable identity of an agent slot.
///
/// Ids are assigned when a world is created and survive every reset, so they
/// can key per-agent histories across generations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("#{_0}")]
pub struct AgentId(pub u32);

/// Life cycle of an agent within one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum LifeState {
    Alive,
    /// Playing the death animation; `remaining_ticks` counts down to zero.
    Dying { remaining_ticks: u32 },
    /// Out of the simulation for the rest of the generation.
    Terminal,
}

/// What an agent wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum Action {
    Idle,
    /// Jump with the given impulse, or the world's impulse when `None`.
    Jump { impulse: Option<f32> },
}

impl Action {
    pub const JUMP: Self = Self::Jump { impulse: None };

    #[must_use]
    pub fn from_jump(jump: bool) -> Self {
        if jump { Self::JUMP } else { Self::Idle }
    }
}

/// One simulated competitor.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    x: f32,
    radius: f32,
    body: Body,
    life: LifeState,
    born_at: f64,
    time_alive: Option<f64>,
    score: u32,
    key_score: u32,
    has_key: bool,
    passed_current: bool,
}

impl Agent {
    #[must_use]
    pub fn new(id: AgentId, config: &WorldConfig, now: f64) -> Self {
        Self {
            id,
            x: config.player_start_x,
            radius: config.player_radius,
            body: Body::at_rest(config.ground_contact_y()),
            life: LifeState::Alive,
            born_at: now,
            time_alive: None,
            score: 0,
            key_score: 0,
            has_key: false,
            passed_current: false,
        }
    }

    /// Restores start-of-generation kinematics and scores; the id is kept.
    pub fn reset(&mut self, config: &WorldConfig, now: f64) {
        self.x = config.player_start_x;
        self.radius = config.player_radius;
        self.body = Body::at_rest(config.ground_contact_y());
        self.life = LifeState::Alive;
        self.born_at = now;
        self.time_alive = None;
        self.score = 0;
        self.key_score = 0;
        self.has_key = false;
        self.passed_current = false;
    }

    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.body.y()
    }

    #[must_use]
    pub fn vy(&self) -> f32 {
        self.body.vy()
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[must_use]
    pub fn life(&self) -> LifeState {
        self.life
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life.is_alive()
    }

    #[must_use]
    pub fn born_at(&self) -> f64 {
        self.born_at
    }

    /// Seconds survived; `None` while the agent is still alive.
    #[must_use]
    pub fn time_alive(&self) -> Option<f64> {
        self.time_alive
    }

    /// Number of obstacles passed.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of keys collected.
    #[must_use]
    pub fn key_score(&self) -> u32 {
        self.key_score
    }

    #[must_use]
    pub fn has_key(&self) -> bool {
        self.has_key
    }

    #[must_use]
    pub fn circle(&self) -> Circle {
        Circle::new(self.x, self.body.y(), self.radius)
    }

    pub(crate) fn jump(&mut self, now: f64, cooldown: f64, impulse: f32) -> bool {
        self.is_alive() && self.body.try_jump(now, cooldown, impulse)
    }

    pub(crate) fn integrate(&mut self, config: &WorldConfig) {
        debug_assert!(self.is_alive());
        self.body.step(config.gravity, config.ground_contact_y());
    }

    /// Awards the pass point for the current obstacle once its trailing edge
    /// is behind the agent's centre.
    ///
    /// The key is kept: the hitbox still reaches into the gated column until
    /// the obstacle has scrolled clear of it.
    pub(crate) fn try_pass(&mut self, trailing_edge: f32) -> bool {
        if self.passed_current || self.x <= trailing_edge {
            return false;
        }
        self.passed_current = true;
        self.score += 1;
        true
    }

    /// Forgets the pass flag and uses up the key when a new obstacle spawns.
    pub(crate) fn next_obstacle(&mut self) {
        self.passed_current = false;
        self.has_key = false;
    }

    pub(crate) fn pick_key(&mut self) {
        self.has_key = true;
        self.key_score += 1;
    }

    /// Alive → dying transition; freezes `time_alive`.
    pub(crate) fn kill(&mut self, now: f64, config: &WorldConfig) {
        assert!(self.is_alive(), "agent {} killed twice", self.id);
        self.time_alive = Some(now - self.born_at);
        let ticks = ((self.x + self.radius) / config.obstacle_speed).ceil();
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let remaining_ticks = ticks.max(1.0) as u32;
        self.life = LifeState::Dying { remaining_ticks };
    }

    /// Death animation: slide with the scroll and shrink.
    pub(crate) fn animate(&mut self, config: &WorldConfig) {
        let LifeState::Dying { remaining_ticks } = self.life else {
            return;
        };
        self.x -= config.obstacle_speed;
        self.radius = (self.radius - config.death_shrink).max(0.0);
        self.life = match remaining_ticks.saturating_sub(1) {
            0 => LifeState::Terminal,
            remaining_ticks => LifeState::Dying { remaining_ticks },
        };
    }
}
