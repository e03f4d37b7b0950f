use thiserror::Error;

/// Errors reported by the sampler, the generation loop and their collaborators.
///
/// Every failure aborts the operation that raised it; nothing is retried
/// internally and no partial output is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
	/// A caller-supplied parameter is out of range
	/// (non-positive diversity, empty window, window larger than the corpus...).
	#[error("invalid parameter: {0}")]
	InvalidParameter(String),

	/// The distribution cannot be renormalized (all zero, negative, NaN, empty).
	#[error("degenerate distribution: {0}")]
	DegenerateDistribution(String),

	/// A symbol is not part of the vocabulary.
	#[error("unknown symbol: {0:?}")]
	UnknownSymbol(char),

	/// The model collaborator failed or returned a badly shaped output.
	#[error("model error: {0}")]
	Model(String),

	/// An external deadline elapsed between two generation steps.
	#[error("deadline exceeded after {completed} of {requested} steps")]
	DeadlineExceeded { completed: usize, requested: usize },

	#[error("storage error: {0}")]
	Storage(String),

	#[error("serialization error: {0}")]
	Serialization(String),
}

impl From<std::io::Error> for SampleError {
	fn from(e: std::io::Error) -> Self {
		Self::Storage(e.to_string())
	}
}

impl From<postcard::Error> for SampleError {
	fn from(e: postcard::Error) -> Self {
		Self::Serialization(e.to_string())
	}
}

pub type Result<T> = std::result::Result<T, SampleError>;
