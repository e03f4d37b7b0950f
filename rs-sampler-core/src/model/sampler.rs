use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::error::{Result, SampleError};

/// Checks that `diversity` is a finite, strictly positive temperature.
pub(crate) fn check_diversity(diversity: f64) -> Result<()> {
	if !(diversity > 0.0) || !diversity.is_finite() {
		return Err(SampleError::InvalidParameter(format!(
			"diversity must be a finite value > 0, got {}",
			diversity
		)));
	}
	Ok(())
}

/// Reshapes a probability distribution with a temperature and renormalizes it.
///
/// Each entry becomes `exp(ln(p) / diversity)`, then the vector is divided by
/// its sum. Diversity below 1 sharpens toward the mode, above 1 flattens
/// toward uniform, 1 leaves the distribution unchanged (up to renormalization).
///
/// # Notes
/// - Zero entries stay at exactly zero (`ln(0) = -inf`).
/// - The largest scaled log-probability is subtracted before `exp`, which
///   cancels out in the renormalization and keeps small diversities from
///   underflowing every entry.
///
/// # Errors
/// - `InvalidParameter` if `diversity` is not a finite value > 0.
/// - `DegenerateDistribution` if the input is empty, holds a negative or
///   NaN entry, or has no positive entry.
pub fn scale(distribution: &[f32], diversity: f64) -> Result<Vec<f64>> {
	check_diversity(diversity)?;

	if distribution.is_empty() {
		return Err(SampleError::DegenerateDistribution("empty distribution".to_owned()));
	}

	let mut logits = Vec::with_capacity(distribution.len());
	for (index, p) in distribution.iter().enumerate() {
		let p = f64::from(*p);
		if !(p >= 0.0) || !p.is_finite() {
			return Err(SampleError::DegenerateDistribution(format!(
				"entry {} is {}, probabilities must be finite and non-negative",
				index, p
			)));
		}
		logits.push(p.ln() / diversity);
	}

	let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	if max == f64::NEG_INFINITY {
		return Err(SampleError::DegenerateDistribution("all entries are zero".to_owned()));
	}

	let mut scaled: Vec<f64> = logits
		.into_iter()
		.map(|l| if l == f64::NEG_INFINITY { 0.0 } else { (l - max).exp() })
		.collect();

	let sum: f64 = scaled.iter().sum();
	if !(sum > 0.0) || !sum.is_finite() {
		return Err(SampleError::DegenerateDistribution(format!("cannot normalize, sum is {}", sum)));
	}
	scaled.iter_mut().for_each(|p| *p /= sum);

	Ok(scaled)
}

/// Draws one index from `distribution` reshaped by `diversity`.
///
/// Equivalent to a single-trial multinomial draw over the output of
/// [`scale`]: exactly one index is selected, never one whose input
/// probability is zero.
///
/// # Parameters
/// - `distribution`: model output for one step, need not sum exactly to 1.
/// - `diversity`: temperature, must be > 0.
/// - `rng`: generator the draw is taken from; seed it for reproducible runs.
///
/// # Returns
/// An index in `[0, distribution.len())`.
pub fn sample<R: Rng + ?Sized>(distribution: &[f32], diversity: f64, rng: &mut R) -> Result<usize> {
	let probabilities = scale(distribution, diversity)?;
	let categorical = WeightedIndex::new(&probabilities)
		.map_err(|e| SampleError::DegenerateDistribution(e.to_string()))?;
	Ok(categorical.sample(rng))
}
