//! World and physics configuration.
//!
//! All values are per-tick quantities in pixels unless stated otherwise. A
//! [`WorldConfig`] is validated once, when a [`World`](crate::World) is
//! created; invalid values are rejected rather than clamped.

use serde::{Deserialize, Serialize};

use crate::core::kinematics;

/// An invalid world configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[display("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[display("empty range for {name}: {min}..={max}")]
    EmptyRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[display("ground (y = {ground}) must lie below the roof (y = {roof})")]
    GroundAboveRoof { ground: f32, roof: f32 },
    #[display("obstacles up to {max} px do not fit into a {playable} px tall playfield")]
    ObstacleTooTall { max: f32, playable: f32 },
    #[display("jump impulse must point upwards (be negative), got {impulse}")]
    DownwardJump { impulse: f32 },
    #[display("player at x = {x} with radius {radius} does not fit into the world")]
    PlayerOutOfBounds { x: f32, radius: f32 },
    #[display("a world needs at least one agent")]
    NoAgents,
}

/// Geometry, speeds and physics constants of the simulated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width; obstacles spawn at this x coordinate.
    pub width: f32,
    /// World height.
    pub height: f32,
    /// Thickness of both the ground slab and the roof slab.
    pub base_height: f32,
    pub obstacle_width: f32,
    pub obstacle_height_min: f32,
    pub obstacle_height_max: f32,
    /// Horizontal scroll speed (pixels per tick).
    pub obstacle_speed: f32,
    /// Spawn a gate and a key together with every obstacle.
    pub keys_enabled: bool,
    pub key_size: f32,
    /// Downward acceleration (pixels per tick²).
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative is upwards).
    pub jump_impulse: f32,
    pub player_start_x: f32,
    pub player_radius: f32,
    /// Jump cooldown in seconds, measured at `reference_fps`.
    pub jump_cooldown: f32,
    pub reference_fps: f32,
    /// Initial tick rate.
    pub game_fps: f32,
    /// Radius lost per tick during the death animation.
    pub death_shrink: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 700.0,
            base_height: 50.0,
            obstacle_width: 100.0,
            obstacle_height_min: 200.0,
            obstacle_height_max: 300.0,
            obstacle_speed: 5.0,
            keys_enabled: false,
            key_size: 50.0,
            gravity: 0.5,
            jump_impulse: -10.0,
            player_start_x: 70.0,
            player_radius: 20.0,
            jump_cooldown: 0.25,
            reference_fps: 60.0,
            game_fps: 90.0,
            death_shrink: 1.0,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    // written this way so that NaN is rejected as well
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

impl WorldConfig {
    /// Checks every value for physical plausibility.
    ///
    /// # Example
    ///
    /// ```
    /// use hurdle_engine::{ConfigError, WorldConfig};
    ///
    /// assert!(WorldConfig::default().validate().is_ok());
    ///
    /// let config = WorldConfig { player_radius: 0.0, ..WorldConfig::default() };
    /// assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("base_height", self.base_height)?;
        if self.ground_height() <= self.roof_height() {
            return Err(ConfigError::GroundAboveRoof {
                ground: self.ground_height(),
                roof: self.roof_height(),
            });
        }
        positive("obstacle_width", self.obstacle_width)?;
        positive("obstacle_height_min", self.obstacle_height_min)?;
        if self.obstacle_height_min > self.obstacle_height_max {
            return Err(ConfigError::EmptyRange {
                name: "obstacle_height",
                min: self.obstacle_height_min,
                max: self.obstacle_height_max,
            });
        }
        if self.obstacle_height_max >= self.playable_height() {
            return Err(ConfigError::ObstacleTooTall {
                max: self.obstacle_height_max,
                playable: self.playable_height(),
            });
        }
        positive("obstacle_speed", self.obstacle_speed)?;
        if self.keys_enabled {
            positive("key_size", self.key_size)?;
        }
        positive("gravity", self.gravity)?;
        if self.jump_impulse >= 0.0 || self.jump_impulse.is_nan() {
            return Err(ConfigError::DownwardJump {
                impulse: self.jump_impulse,
            });
        }
        positive("player_radius", self.player_radius)?;
        if self.player_start_x - self.player_radius < 0.0
            || self.player_start_x + self.player_radius > self.width
            || 2.0 * self.player_radius >= self.playable_height()
        {
            return Err(ConfigError::PlayerOutOfBounds {
                x: self.player_start_x,
                radius: self.player_radius,
            });
        }
        non_negative("jump_cooldown", self.jump_cooldown)?;
        positive("reference_fps", self.reference_fps)?;
        positive("game_fps", self.game_fps)?;
        non_negative("death_shrink", self.death_shrink)?;
        Ok(())
    }

    /// The y coordinate of the ground surface.
    #[must_use]
    pub fn ground_height(&self) -> f32 {
        self.height - self.base_height
    }

    /// The y coordinate of the roof surface.
    #[must_use]
    pub fn roof_height(&self) -> f32 {
        self.base_height
    }

    #[must_use]
    pub fn playable_height(&self) -> f32 {
        self.ground_height() - self.roof_height()
    }

    /// The y coordinate of an agent's centre while it stands on the ground.
    #[must_use]
    pub fn ground_contact_y(&self) -> f32 {
        self.ground_height() - self.player_radius
    }

    /// Jump cooldown in seconds at tick rate `fps`.
    #[must_use]
    pub fn jump_cooldown_at(&self, fps: f32) -> f64 {
        kinematics::scaled_cooldown(self.jump_cooldown, self.reference_fps, fps)
    }

    /// Time in seconds an obstacle needs to scroll across the whole world at
    /// the configured game tick rate.
    #[must_use]
    pub fn crossing_time(&self) -> f32 {
        self.width / self.obstacle_speed / self.game_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        WorldConfig::default().validate().unwrap();
    }

    #[test]
    fn test_derived_heights() {
        let config = WorldConfig::default();
        assert_eq!(config.ground_height(), 650.0);
        assert_eq!(config.roof_height(), 50.0);
        assert_eq!(config.ground_contact_y(), 630.0);
        assert!((config.crossing_time() - 240.0 / 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_degenerate_values() {
        let cases = [
            WorldConfig {
                obstacle_speed: 0.0,
                ..WorldConfig::default()
            },
            WorldConfig {
                player_radius: -1.0,
                ..WorldConfig::default()
            },
            WorldConfig {
                width: f32::NAN,
                ..WorldConfig::default()
            },
            WorldConfig {
                jump_cooldown: -0.1,
                ..WorldConfig::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        let config = WorldConfig {
            obstacle_height_min: 300.0,
            obstacle_height_max: 200.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRange { .. })
        ));

        let config = WorldConfig {
            base_height: 400.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GroundAboveRoof { .. })
        ));

        let config = WorldConfig {
            obstacle_height_max: 600.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ObstacleTooTall { .. })
        ));
    }

    #[test]
    fn test_rejects_downward_jump() {
        let config = WorldConfig {
            jump_impulse: 5.0,
            ..WorldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DownwardJump { impulse: 5.0 })
        );
    }

    #[test]
    fn test_error_message() {
        let err = ConfigError::NonPositive {
            name: "obstacle_speed",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "obstacle_speed must be positive, got 0");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: WorldConfig = serde_json::from_str(r#"{"obstacle_speed": 7.5}"#).unwrap();
        assert_eq!(config.obstacle_speed, 7.5);
        assert_eq!(config.width, 1200.0);
    }
}
