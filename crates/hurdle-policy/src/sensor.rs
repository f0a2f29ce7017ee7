//! Flattening of the sensed state into a perceptron input vector.

use arrayvec::ArrayVec;
use hurdle_engine::SensedState;

/// Inputs available without keys: y, vy, dx, gap to lower bound, gap to upper bound.
pub const BASE_INPUTS: usize = 5;
/// Inputs available with keys: the base inputs plus the key offset.
pub const KEYED_INPUTS: usize = BASE_INPUTS + 2;

pub type InputVector = ArrayVec<f32, KEYED_INPUTS>;

/// Number of perceptron inputs for a world with or without keys.
#[must_use]
pub const fn input_count(keys_enabled: bool) -> usize {
    if keys_enabled { KEYED_INPUTS } else { BASE_INPUTS }
}

/// Builds the input vector in fixed order.
///
/// # Example
///
/// ```
/// use hurdle_engine::SensedState;
/// use hurdle_policy::input_vector;
///
/// let sensed = SensedState {
///     y: 630.0,
///     vy: 0.0,
///     dx: 100.0,
///     obstacle_width: 100.0,
///     height_diff: 180.0,
///     gap_to_lower: -180.0,
///     gap_to_upper: 580.0,
///     key: None,
/// };
/// assert_eq!(
///     input_vector(&sensed).as_slice(),
///     &[630.0, 0.0, 100.0, -180.0, 580.0]
/// );
/// ```
#[must_use]
pub fn input_vector(sensed: &SensedState) -> InputVector {
    let mut inputs = InputVector::new();
    inputs.extend([
        sensed.y,
        sensed.vy,
        sensed.dx,
        sensed.gap_to_lower,
        sensed.gap_to_upper,
    ]);
    if let Some(key) = sensed.key {
        inputs.extend([key.dx, key.dy]);
    }
    inputs
}
