use std::iter;

use hurdle_engine::SensedState;
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::{PolicyError, sensor};

/// Standard deviation of freshly drawn weights.
pub const INIT_STD_DEV: f32 = 0.1;

/// Two-layer perceptron without biases.
///
/// ```text
/// hidden = sigmoid(x · W_in)        W_in:  inputs × hidden
/// out    = sigmoid(hidden · W_out)  W_out: hidden × 1
/// ```
///
/// The agent jumps when `out` exceeds the decision threshold. All weights are
/// stored in one flat gene vector: `W_in` row by row, then `W_out`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPerceptron")]
pub struct Perceptron {
    inputs: usize,
    hidden: usize,
    decision_threshold: f32,
    weights: Vec<f32>,
}

#[derive(Deserialize)]
struct RawPerceptron {
    inputs: usize,
    hidden: usize,
    decision_threshold: f32,
    weights: Vec<f32>,
}

impl TryFrom<RawPerceptron> for Perceptron {
    type Error = PolicyError;

    fn try_from(raw: RawPerceptron) -> Result<Self, Self::Error> {
        Self::new(raw.inputs, raw.hidden, raw.weights, raw.decision_threshold)
    }
}

impl Perceptron {
    /// Number of genes of a network with the given shape.
    #[must_use]
    pub const fn gene_count(inputs: usize, hidden: usize) -> usize {
        inputs * hidden + hidden
    }

    pub fn new(
        inputs: usize,
        hidden: usize,
        weights: Vec<f32>,
        decision_threshold: f32,
    ) -> Result<Self, PolicyError> {
        if inputs == 0 || inputs > sensor::KEYED_INPUTS || hidden == 0 {
            return Err(PolicyError::NetworkShape { inputs, hidden });
        }
        let expected = Self::gene_count(inputs, hidden);
        if weights.len() != expected {
            return Err(PolicyError::WeightCount {
                expected,
                got: weights.len(),
            });
        }
        Ok(Self {
            inputs,
            hidden,
            decision_threshold,
            weights,
        })
    }

    /// Draws every weight from `N(0, 0.1)`.
    pub fn random<R>(
        rng: &mut R,
        inputs: usize,
        hidden: usize,
        decision_threshold: f32,
    ) -> Result<Self, PolicyError>
    where
        R: Rng + ?Sized,
    {
        let normal = Normal::new(0.0, INIT_STD_DEV).unwrap();
        let weights = iter::repeat_with(|| rng.sample(normal))
            .take(Self::gene_count(inputs, hidden))
            .collect();
        Self::new(inputs, hidden, weights, decision_threshold)
    }

    /// Redraws every weight from `N(0, 0.1)`, keeping the shape.
    pub fn redraw<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let normal = Normal::new(0.0, INIT_STD_DEV).unwrap();
        for weight in &mut self.weights {
            *weight = rng.sample(normal);
        }
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    #[must_use]
    pub fn decision_threshold(&self) -> f32 {
        self.decision_threshold
    }

    #[must_use]
    pub fn genes(&self) -> &[f32] {
        &self.weights
    }

    pub fn genes_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Weight from input `i` to hidden unit `h`.
    #[must_use]
    pub fn input_weight(&self, i: usize, h: usize) -> f32 {
        assert!(i < self.inputs && h < self.hidden);
        self.weights[i * self.hidden + h]
    }

    /// Weight from hidden unit `h` to the output.
    #[must_use]
    pub fn output_weight(&self, h: usize) -> f32 {
        assert!(h < self.hidden);
        self.weights[self.inputs * self.hidden + h]
    }

    /// Forward pass.
    ///
    /// Missing inputs are read as zero and surplus inputs are ignored. Returns
    /// NaN if any activation is not finite.
    #[must_use]
    pub fn output(&self, inputs: &[f32]) -> f32 {
        let x = || inputs.iter().copied().chain(iter::repeat(0.0)).take(self.inputs);
        let out = (0..self.hidden)
            .map(|h| {
                let activation = x()
                    .enumerate()
                    .map(|(i, xi)| xi * self.input_weight(i, h))
                    .sum::<f32>();
                sigmoid(activation) * self.output_weight(h)
            })
            .sum::<f32>();
        sigmoid(out)
    }

    #[must_use]
    pub fn decide(&self, sensed: &SensedState) -> bool {
        let out = self.output(&sensor::input_vector(sensed));
        out.is_finite() && out > self.decision_threshold
    }
}

fn sigmoid(x: f32) -> f32 {
    if x.is_finite() {
        1.0 / (1.0 + (-x).exp())
    } else {
        f32::NAN
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn sensed(dx: f32) -> SensedState {
        SensedState {
            y: 630.0,
            vy: 0.0,
            dx,
            obstacle_width: 100.0,
            height_diff: 180.0,
            gap_to_lower: -180.0,
            gap_to_upper: 580.0,
            key: None,
        }
    }

    /// One hidden unit watching `dx`.
    fn dx_watcher() -> Perceptron {
        let mut weights = vec![0.0; Perceptron::gene_count(5, 1)];
        weights[2] = -1.0;
        weights[5] = 10.0;
        Perceptron::new(5, 1, weights, 0.5).unwrap()
    }

    #[test]
    fn test_zero_weights_sit_on_threshold() {
        let net = Perceptron::new(5, 3, vec![0.0; 18], 0.5).unwrap();
        assert_eq!(net.output(&[1.0, 2.0, 3.0, 4.0, 5.0]), 0.5);
        assert!(!net.decide(&sensed(10.0)));
    }

    #[test]
    fn test_weight_layout() {
        let weights = (0..18).map(|i| i as f32).collect();
        let net = Perceptron::new(5, 3, weights, 0.5).unwrap();
        assert_eq!(net.input_weight(0, 2), 2.0);
        assert_eq!(net.input_weight(4, 0), 12.0);
        assert_eq!(net.output_weight(0), 15.0);
        assert_eq!(net.output_weight(2), 17.0);
    }

    #[test]
    fn test_reacts_to_nearby_obstacle() {
        let net = dx_watcher();
        assert!(!net.decide(&sensed(100.0)));
        assert!(net.decide(&sensed(-5.0)));
    }

    #[test]
    fn test_non_finite_output_never_jumps() {
        let net = dx_watcher();
        assert!(!net.decide(&sensed(f32::NAN)));
        assert!(!net.decide(&sensed(f32::NEG_INFINITY)));
        assert!(net.output(&[0.0, 0.0, f32::INFINITY]).is_nan());
    }

    #[test]
    fn test_missing_inputs_read_as_zero() {
        let mut weights = vec![0.0; Perceptron::gene_count(7, 1)];
        weights[5] = 1.0;
        weights[7] = 1.0;
        let net = Perceptron::new(7, 1, weights, 0.5).unwrap();
        // keys disabled: input 5 is missing
        assert_eq!(net.output(&[1.0; 5]), 1.0 / (1.0 + (-0.5_f32).exp()));
    }

    #[test]
    fn test_shape_is_checked() {
        assert!(matches!(
            Perceptron::new(5, 3, vec![0.0; 17], 0.5),
            Err(PolicyError::WeightCount {
                expected: 18,
                got: 17
            })
        ));
        assert!(Perceptron::new(0, 3, vec![0.0; 3], 0.5).is_err());
        assert!(Perceptron::new(8, 1, vec![0.0; 9], 0.5).is_err());
        assert!(Perceptron::new(5, 0, vec![], 0.5).is_err());
    }

    #[test]
    fn test_random_weights_are_small() {
        let mut rng = Pcg32::seed_from_u64(1);
        let net = Perceptron::random(&mut rng, 5, 3, 0.5).unwrap();
        assert_eq!(net.genes().len(), 18);
        assert!(net.genes().iter().all(|w| w.abs() < 1.0));
        assert!(net.genes().iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_redraw_keeps_shape() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut net = Perceptron::new(7, 2, vec![5.0; 16], 0.4).unwrap();
        net.redraw(&mut rng);
        assert_eq!((net.inputs(), net.hidden(), net.genes().len()), (7, 2, 16));
        assert!(net.genes().iter().all(|w| w.abs() < 1.0));
    }

    #[test]
    fn test_deserialize_validates_shape() {
        let json = r#"{"inputs":5,"hidden":3,"decision_threshold":0.5,"weights":[0.0]}"#;
        assert!(serde_json::from_str::<Perceptron>(json).is_err());
        let net = dx_watcher();
        let json = serde_json::to_string(&net).unwrap();
        assert_eq!(serde_json::from_str::<Perceptron>(&json).unwrap(), net);
    }
}
