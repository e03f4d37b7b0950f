use ndarray::{Array3, ArrayView2};

use super::vocabulary::Vocabulary;
use crate::error::Result;

/// One-hot encodes a context window as a `(1, window.len(), V)` tensor.
///
/// Position `t` holds a single `1.0` at the index of `window[t]`,
/// every other entry is `0.0`. The tensor is built from zeros on each call,
/// so the same window always yields the same tensor.
///
/// # Errors
/// `UnknownSymbol` if a symbol of the window is missing from the vocabulary.
pub fn encode<'a, I, V>(window: I, vocabulary: &V) -> Result<Array3<f32>>
where
	I: IntoIterator<Item = &'a char>,
	I::IntoIter: ExactSizeIterator,
	V: Vocabulary + ?Sized,
{
	let window = window.into_iter();
	let mut encoded = Array3::<f32>::zeros((1, window.len(), vocabulary.len()));
	for (t, symbol) in window.enumerate() {
		encoded[[0, t, vocabulary.index_of(*symbol)?]] = 1.0;
	}
	Ok(encoded)
}

/// Recovers the symbol indices from one batch row of an encoded window
/// (shape `(W, V)`).
///
/// Returns `None` for a position holding no `1.0`.
pub fn decode_indices(row: ArrayView2<'_, f32>) -> Vec<Option<usize>> {
	row.outer_iter()
		.map(|position| position.iter().position(|v| *v == 1.0))
		.collect()
}

#[cfg(test)]
mod tests {
	use std::collections::VecDeque;

	use ndarray::Axis;

	use super::*;
	use crate::error::SampleError;
	use crate::model::vocabulary::CharVocabulary;

	#[test]
	fn test_one_hot_layout() {
		let vocabulary = CharVocabulary::from_text("abcd");
		let window: Vec<char> = "dab".chars().collect();
		let encoded = encode(&window, &vocabulary).unwrap();

		assert_eq!(encoded.dim(), (1, 3, 4));
		assert_eq!(encoded.sum(), 3.0);
		assert_eq!(encoded[[0, 0, 3]], 1.0);
		assert_eq!(encoded[[0, 1, 0]], 1.0);
		assert_eq!(encoded[[0, 2, 1]], 1.0);
	}

	#[test]
	fn test_encoding_is_idempotent() {
		let vocabulary = CharVocabulary::from_text("the quick brown fox");
		let window: VecDeque<char> = "quick".chars().collect();
		let first = encode(&window, &vocabulary).unwrap();
		let second = encode(&window, &vocabulary).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn test_unknown_symbol_rejected() {
		let vocabulary = CharVocabulary::from_text("abc");
		let window: Vec<char> = "abx".chars().collect();
		assert_eq!(encode(&window, &vocabulary), Err(SampleError::UnknownSymbol('x')));
	}

	#[test]
	fn test_decode_indices() {
		let vocabulary = CharVocabulary::from_text("abcd");
		let window: Vec<char> = "cab".chars().collect();
		let mut encoded = encode(&window, &vocabulary).unwrap();
		assert_eq!(decode_indices(encoded.index_axis(Axis(0), 0)), vec![Some(2), Some(0), Some(1)]);

		encoded[[0, 1, 0]] = 0.0;
		assert_eq!(decode_indices(encoded.index_axis(Axis(0), 0)), vec![Some(2), None, Some(1)]);
	}
}
