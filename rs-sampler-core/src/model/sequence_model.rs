use ndarray::{Array2, Array3};

use crate::error::{Result, SampleError};

/// A trained character-level model.
///
/// `predict` receives a one-hot encoded window of shape `(1, W, V)` and returns
/// one probability distribution per batch row, shape `(1, V)`. Calls are
/// synchronous and expected to be deterministic for a given input.
pub trait SequenceModel {
	fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>>;
}

impl<M: SequenceModel + ?Sized> SequenceModel for &M {
	fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>> {
		(**self).predict(input)
	}
}

impl<M: SequenceModel + ?Sized> SequenceModel for Box<M> {
	fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>> {
		(**self).predict(input)
	}
}

/// Model predicting the same probability for every symbol.
///
/// Useful as a baseline: generation then degrades to drawing symbols
/// uniformly at random, whatever the diversity.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformModel;

impl SequenceModel for UniformModel {
	fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>> {
		let (batch, _, vocabulary_size) = input.dim();
		if vocabulary_size == 0 {
			return Err(SampleError::Model("empty vocabulary".to_owned()));
		}
		Ok(Array2::from_elem((batch, vocabulary_size), 1.0 / vocabulary_size as f32))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_uniform_shape_and_mass() {
		let input = Array3::<f32>::zeros((1, 4, 8));
		let output = UniformModel.predict(&input).unwrap();
		assert_eq!(output.dim(), (1, 8));
		assert!((output.sum() - 1.0).abs() < 1e-6);
	}

	#[test]
	fn test_boxed_and_borrowed_models() {
		let input = Array3::<f32>::zeros((1, 2, 3));
		let boxed: Box<dyn SequenceModel> = Box::new(UniformModel);
		let borrowed = &UniformModel;
		assert_eq!(boxed.predict(&input).unwrap(), borrowed.predict(&input).unwrap());
	}

	#[test]
	fn test_uniform_rejects_empty_vocabulary() {
		let input = Array3::<f32>::zeros((1, 2, 0));
		assert!(matches!(UniformModel.predict(&input), Err(SampleError::Model(_))));
	}
}
