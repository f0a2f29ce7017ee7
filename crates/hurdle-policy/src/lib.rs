//! Decision policies mapping what an agent senses to a jump decision.
//!
//! Two variants are provided:
//!
//! - [`ThresholdPolicy`] - Distance and height thresholds, optionally with an
//!   evolved jump force
//! - [`Perceptron`] - A fixed-shape two-layer network over the
//!   [input vector](sensor::input_vector)
//!
//! Both are pure functions of [`SensedState`]. [`Policy`] is the sum type the
//! training loop evolves; its genes are exposed as one flat `f32` slice so
//! that crossover and mutation do not depend on the variant.

use hurdle_engine::{Action, SensedState};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use self::{perceptron::*, sensor::*, threshold::*};

mod perceptron;
pub mod sensor;
mod threshold;

/// An invalid policy shape.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PolicyError {
    #[display("threshold policy needs 2 or 3 genes, got {got}")]
    ThresholdGeneCount { got: usize },
    #[display("invalid network shape: {inputs} inputs, {hidden} hidden units")]
    NetworkShape { inputs: usize, hidden: usize },
    #[display("expected {expected} weights, got {got}")]
    WeightCount { expected: usize, got: usize },
}

#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    #[display("threshold")]
    Threshold,
    #[display("perceptron")]
    Perceptron,
}

/// Shape parameters for drawing fresh policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyShape {
    pub kind: PolicyKind,
    /// Threshold policies carry a jump-force gene.
    pub evolve_jump_force: bool,
    pub keys_enabled: bool,
    pub hidden: usize,
}

/// A decision policy.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From, derive_more::IsVariant,
)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum Policy {
    Threshold(ThresholdPolicy),
    Perceptron(Perceptron),
}

impl Policy {
    /// Draws a fresh random policy of the given shape.
    pub fn random<R>(
        shape: PolicyShape,
        decision_threshold: f32,
        rng: &mut R,
    ) -> Result<Self, PolicyError>
    where
        R: Rng + ?Sized,
    {
        let policy = match shape.kind {
            PolicyKind::Threshold => ThresholdPolicy::random(rng, shape.evolve_jump_force).into(),
            PolicyKind::Perceptron => Perceptron::random(
                rng,
                sensor::input_count(shape.keys_enabled),
                shape.hidden,
                decision_threshold,
            )?
            .into(),
        };
        Ok(policy)
    }

    /// Redraws the genes in place, keeping the kind and shape.
    pub fn redraw<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Threshold(policy) => policy.redraw(rng),
            Self::Perceptron(net) => net.redraw(rng),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Threshold(_) => PolicyKind::Threshold,
            Self::Perceptron(_) => PolicyKind::Perceptron,
        }
    }

    #[must_use]
    pub fn decide(&self, sensed: &SensedState) -> bool {
        match self {
            Self::Threshold(policy) => policy.decide(sensed),
            Self::Perceptron(net) => net.decide(sensed),
        }
    }

    /// The action for this tick, carrying the evolved jump force if any.
    #[must_use]
    pub fn act(&self, sensed: &SensedState) -> Action {
        if !self.decide(sensed) {
            return Action::Idle;
        }
        let impulse = match self {
            Self::Threshold(policy) => policy.jump_force(),
            Self::Perceptron(_) => None,
        };
        Action::Jump { impulse }
    }

    #[must_use]
    pub fn genes(&self) -> &[f32] {
        match self {
            Self::Threshold(policy) => policy.genes(),
            Self::Perceptron(net) => net.genes(),
        }
    }

    pub fn genes_mut(&mut self) -> &mut [f32] {
        match self {
            Self::Threshold(policy) => policy.genes_mut(),
            Self::Perceptron(net) => net.genes_mut(),
        }
    }
}
