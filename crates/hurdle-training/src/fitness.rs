//! Fitness of an agent's round.
//!
//! ```text
//! fitness = w_time · t + w_score · score + w_key · keys
//! ```
//!
//! `t` is the time alive in seconds, optionally divided by the time an
//! obstacle needs to cross the world. With toughness decay enabled, `t` is
//! multiplied by `1 / toughness + 1` for individuals that survived as parents,
//! which fades as the individual keeps winning.

use serde::{Deserialize, Serialize};

use crate::config::EvolutionConfigError;

/// What an agent achieved in one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub time_alive: f32,
    pub score: u32,
    pub key_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub time_alive: f32,
    pub score: f32,
    pub key_score: f32,
    /// Measure time alive in world crossings instead of seconds.
    pub normalize_time: bool,
    pub toughness_decay: bool,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            time_alive: 1.0,
            score: 0.0,
            key_score: 1.0,
            normalize_time: false,
            toughness_decay: false,
        }
    }
}

impl FitnessWeights {
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        for (name, value) in [
            ("fitness.time_alive", self.time_alive),
            ("fitness.score", self.score),
            ("fitness.key_score", self.key_score),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(EvolutionConfigError::Negative { name, value });
            }
        }
        Ok(())
    }

    /// # Example
    ///
    /// ```
    /// use hurdle_training::fitness::{FitnessWeights, Outcome};
    ///
    /// let weights = FitnessWeights { toughness_decay: true, ..FitnessWeights::default() };
    /// let outcome = Outcome { time_alive: 10.0, score: 0, key_score: 0 };
    /// assert_eq!(weights.fitness(&outcome, 0, 1.0), 10.0);
    /// assert!((weights.fitness(&outcome, 3, 1.0) - 13.333).abs() < 1e-3);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fitness(&self, outcome: &Outcome, toughness: u32, crossing_time: f32) -> f32 {
        let mut time = outcome.time_alive;
        if self.normalize_time {
            time /= crossing_time;
        }
        if self.toughness_decay && toughness > 0 {
            time *= 1.0 / toughness as f32 + 1.0;
        }
        self.time_alive * time
            + self.score * outcome.score as f32
            + self.key_score * outcome.key_score as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(time_alive: f32, score: u32, key_score: u32) -> Outcome {
        Outcome {
            time_alive,
            score,
            key_score,
        }
    }

    #[test]
    fn test_default_is_time_plus_keys() {
        let weights = FitnessWeights::default();
        assert_eq!(weights.fitness(&outcome(4.5, 3, 2), 5, 2.0), 6.5);
    }

    #[test]
    fn test_toughness_decay() {
        let weights = FitnessWeights {
            toughness_decay: true,
            ..FitnessWeights::default()
        };
        let outcome = outcome(10.0, 0, 0);
        assert_eq!(weights.fitness(&outcome, 0, 1.0), 10.0);
        assert_eq!(weights.fitness(&outcome, 1, 1.0), 20.0);
        let decayed = weights.fitness(&outcome, 3, 1.0);
        assert!((decayed - 13.333_333).abs() < 1e-4, "{decayed}");
    }

    #[test]
    fn test_normalized_time() {
        let weights = FitnessWeights {
            normalize_time: true,
            key_score: 0.0,
            score: 0.5,
            ..FitnessWeights::default()
        };
        assert_eq!(weights.fitness(&outcome(8.0, 2, 1), 0, 4.0), 3.0);
    }

    #[test]
    fn test_rejects_negative_weights() {
        let weights = FitnessWeights {
            score: -1.0,
            ..FitnessWeights::default()
        };
        assert!(weights.validate().is_err());
    }
}
