use serde::{Deserialize, Serialize};

/// Tolerance for comparing accumulated clock time against cooldowns.
const TIME_EPSILON: f64 = 1e-9;

/// Vertical kinematic state of an agent.
///
/// The horizontal position of an agent never changes while it is alive, so
/// only `y` and `vy` are integrated. Screen coordinates are used: positive
/// velocity moves the body downwards, jump impulses are negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    y: f32,
    vy: f32,
    jumping: bool,
    last_jump_at: Option<f64>,
}

impl Body {
    /// Creates a body at rest at height `y`.
    #[must_use]
    pub const fn at_rest(y: f32) -> Self {
        Self {
            y,
            vy: 0.0,
            jumping: false,
            last_jump_at: None,
        }
    }

    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub const fn vy(&self) -> f32 {
        self.vy
    }

    #[must_use]
    pub const fn is_jumping(&self) -> bool {
        self.jumping
    }

    #[must_use]
    pub const fn last_jump_at(&self) -> Option<f64> {
        self.last_jump_at
    }

    /// Applies a jump impulse if the cooldown has elapsed since the last jump.
    ///
    /// The first jump of a body is never blocked. Returns `true` when the
    /// impulse was applied.
    pub fn try_jump(&mut self, now: f64, cooldown: f64, impulse: f32) -> bool {
        if self
            .last_jump_at
            .is_some_and(|last| now - last < cooldown - TIME_EPSILON)
        {
            return false;
        }
        self.vy = impulse;
        self.jumping = true;
        self.last_jump_at = Some(now);
        true
    }

    /// Advances the body by one tick.
    ///
    /// A body standing on (or below) `ground_y` without upward velocity is
    /// snapped to the ground and receives no gravity. Otherwise gravity is
    /// added before integrating. A falling body that would end up below the
    /// ground is clamped onto it within the same tick.
    ///
    /// # Example
    ///
    /// ```
    /// use hurdle_engine::Body;
    ///
    /// let mut body = Body::at_rest(100.0);
    /// assert!(body.try_jump(0.0, 0.25, -10.0));
    /// body.step(0.5, 100.0);
    /// assert_eq!(body.vy(), -9.5);
    /// assert_eq!(body.y(), 90.5);
    /// ```
    pub fn step(&mut self, gravity: f32, ground_y: f32) {
        if self.y >= ground_y && self.vy >= 0.0 {
            self.land(ground_y);
        } else {
            self.vy += gravity;
        }
        self.y += self.vy;
        if self.vy >= 0.0 && self.y > ground_y {
            self.land(ground_y);
        }
    }

    fn land(&mut self, ground_y: f32) {
        self.y = ground_y;
        self.vy = 0.0;
        self.jumping = false;
    }
}

/// Jump cooldown in seconds at the current tick rate.
///
/// The base cooldown is expressed for `reference_fps`; scaling it by
/// `reference_fps / current_fps` keeps the cooldown constant when measured in
/// ticks.
#[must_use]
pub fn scaled_cooldown(base: f32, reference_fps: f32, current_fps: f32) -> f64 {
    f64::from(base) * f64::from(reference_fps) / f64::from(current_fps)
}
