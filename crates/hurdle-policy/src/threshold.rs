use hurdle_engine::SensedState;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::PolicyError;

/// Rule-based policy with two or three genes.
///
/// Genes, in order:
///
/// 0. distance threshold: jump once the obstacle is at most this far ahead
/// 1. height threshold: jump while at least this far below the obstacle edge
/// 2. jump force (optional): replaces the world jump impulse
///
/// # Example
///
/// ```
/// use hurdle_policy::ThresholdPolicy;
///
/// let policy = ThresholdPolicy::new(60.0, 80.0);
/// assert_eq!(policy.genes(), &[60.0, 80.0]);
/// assert_eq!(policy.jump_force(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct ThresholdPolicy {
    genes: Vec<f32>,
}

impl ThresholdPolicy {
    pub const DISTANCE: usize = 0;
    pub const HEIGHT: usize = 1;
    pub const JUMP_FORCE: usize = 2;

    #[must_use]
    pub fn new(distance: f32, height: f32) -> Self {
        Self {
            genes: vec![distance, height],
        }
    }

    #[must_use]
    pub fn with_jump_force(distance: f32, height: f32, jump_force: f32) -> Self {
        Self {
            genes: vec![distance, height, jump_force],
        }
    }

    pub fn from_genes(genes: Vec<f32>) -> Result<Self, PolicyError> {
        if !(2..=3).contains(&genes.len()) {
            return Err(PolicyError::ThresholdGeneCount { got: genes.len() });
        }
        Ok(Self { genes })
    }

    /// Draws integer distance and height thresholds in `[50, 100)` and, if
    /// requested, an integer jump force in `[-20, -5]`.
    pub fn random<R>(rng: &mut R, with_jump_force: bool) -> Self
    where
        R: Rng + ?Sized,
    {
        let distance = f32::from(rng.random_range(50_u8..100));
        let height = f32::from(rng.random_range(50_u8..100));
        if with_jump_force {
            let force = rng.random_range(-20.0_f32..-5.0).trunc();
            Self::with_jump_force(distance, height, force)
        } else {
            Self::new(distance, height)
        }
    }

    /// Redraws every gene, keeping the jump-force gene if there is one.
    pub fn redraw<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        *self = Self::random(rng, self.jump_force().is_some());
    }

    #[must_use]
    pub fn distance_threshold(&self) -> f32 {
        self.genes[Self::DISTANCE]
    }

    #[must_use]
    pub fn height_threshold(&self) -> f32 {
        self.genes[Self::HEIGHT]
    }

    #[must_use]
    pub fn jump_force(&self) -> Option<f32> {
        self.genes.get(Self::JUMP_FORCE).copied()
    }

    #[must_use]
    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut [f32] {
        &mut self.genes
    }

    /// Jumps while approaching an obstacle closely enough, or while far
    /// enough below its edge.
    ///
    /// The distance rule stops firing once the agent's centre is past the
    /// obstacle's trailing edge.
    #[must_use]
    pub fn decide(&self, sensed: &SensedState) -> bool {
        let approaching =
            sensed.dx + sensed.obstacle_width >= 0.0 && sensed.dx <= self.distance_threshold();
        approaching || sensed.height_diff >= self.height_threshold()
    }
}

impl TryFrom<Vec<f32>> for ThresholdPolicy {
    type Error = PolicyError;

    fn try_from(genes: Vec<f32>) -> Result<Self, Self::Error> {
        Self::from_genes(genes)
    }
}

impl From<ThresholdPolicy> for Vec<f32> {
    fn from(policy: ThresholdPolicy) -> Self {
        policy.genes
    }
}
