use super::sampler::check_diversity;
use crate::error::{Result, SampleError};

/// Parameters of one generation call.
///
/// # Invariants
/// - `diversity` is finite and > 0
/// - `window_size` is > 0
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationInput {
	/// Number of symbols to generate after the seed window.
	pub length: usize,

	/// Sampling temperature (< 1.0 = conservative, > 1.0 = adventurous).
	diversity: f64,

	/// Width of the context window fed to the model.
	window_size: usize,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self { length: 400, diversity: 1.0, window_size: 40 }
	}
}

impl GenerationInput {
	/// Creates a validated input.
	///
	/// # Errors
	/// `InvalidParameter` if `diversity` or `window_size` is out of range.
	pub fn new(length: usize, diversity: f64, window_size: usize) -> Result<Self> {
		let mut input = Self { length, ..Self::default() };
		input.set_diversity(diversity)?;
		input.set_window_size(window_size)?;
		Ok(input)
	}

	pub fn diversity(&self) -> f64 {
		self.diversity
	}

	pub fn window_size(&self) -> usize {
		self.window_size
	}

	/// Sets the diversity (must be finite and > 0).
	pub fn set_diversity(&mut self, diversity: f64) -> Result<()> {
		check_diversity(diversity)?;
		self.diversity = diversity;
		Ok(())
	}

	/// Sets the window size (must be > 0).
	pub fn set_window_size(&mut self, window_size: usize) -> Result<()> {
		if window_size == 0 {
			return Err(SampleError::InvalidParameter("window size must be > 0".to_owned()));
		}
		self.window_size = window_size;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let input = GenerationInput::default();
		assert_eq!(input.length, 400);
		assert_eq!(input.diversity(), 1.0);
		assert_eq!(input.window_size(), 40);
	}

	#[test]
	fn test_rejected_values_leave_input_untouched() {
		let mut input = GenerationInput::new(10, 0.5, 8).unwrap();
		assert!(input.set_diversity(0.0).is_err());
		assert!(input.set_diversity(-2.0).is_err());
		assert!(input.set_window_size(0).is_err());
		assert_eq!(input, GenerationInput::new(10, 0.5, 8).unwrap());
	}

	#[test]
	fn test_new_validates() {
		assert!(matches!(GenerationInput::new(5, 0.0, 4), Err(SampleError::InvalidParameter(_))));
		assert!(matches!(GenerationInput::new(5, 1.0, 0), Err(SampleError::InvalidParameter(_))));
	}
}
