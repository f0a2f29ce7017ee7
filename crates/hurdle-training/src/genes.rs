//! Gene vector operators used by [`PopulationEvolver`](crate::genetic::PopulationEvolver).
//!
//! - **Crossover**: [`mean`] averages two parents gene by gene
//! - **Mutation**: [`mutate_uniform`] for real-valued network weights,
//!   [`mutate_int_normal`] for integer-valued threshold genes
//!
//! Every mutation operator touches each gene independently with probability
//! `chance`.

use rand::Rng;
use rand_distr::Normal;

/// Creates a gene vector by applying a function to each index.
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Component-wise mean of two parents.
///
/// # Panics
///
/// Panics if the parents have different lengths.
///
/// # Example
///
/// ```
/// use hurdle_training::genes;
///
/// assert_eq!(genes::mean(&[10.0, 20.0], &[30.0, 40.0]), vec![20.0, 30.0]);
/// ```
#[must_use]
pub fn mean(p1: &[f32], p2: &[f32]) -> Vec<f32> {
    assert_eq!(p1.len(), p2.len(), "parents must have the same shape");
    from_fn(|i| f32::midpoint(p1[i], p2[i]), p1.len())
}

/// Adds `U(-half_width, half_width)` to each selected gene.
pub fn mutate_uniform<R>(genes: &mut [f32], chance: f32, half_width: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for gene in genes {
        if rng.random_bool(chance.into()) && half_width > 0.0 {
            *gene += rng.random_range(-half_width..=half_width);
        }
    }
}

/// Adds a normal sample truncated towards zero to each selected gene, so
/// integer genes stay integers.
pub fn mutate_int_normal<R>(genes: &mut [f32], chance: f32, sigma: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).unwrap();
    for gene in genes {
        if rng.random_bool(chance.into()) {
            *gene += rng.sample(normal).trunc();
        }
    }
}
