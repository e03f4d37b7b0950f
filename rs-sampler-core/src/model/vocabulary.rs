use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SampleError};

/// Bijection between symbols and the contiguous indices `[0, len)`.
///
/// Implementors are immutable once built; the generation loop only ever
/// looks symbols up.
pub trait Vocabulary {
	/// Number of symbols (`V`).
	fn len(&self) -> usize;

	/// Index of `symbol`, or `UnknownSymbol` if it is not part of the vocabulary.
	fn index_of(&self, symbol: char) -> Result<usize>;

	/// Symbol stored at `index`, total over `[0, len)`.
	fn symbol_of(&self, index: usize) -> Option<char>;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Character vocabulary: the sorted set of distinct characters of a text.
///
/// # Invariants
/// - `symbols` is sorted and free of duplicates
/// - `indices[symbols[i]] == i` for every `i`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CharVocabulary {
	/// Index → symbol
	symbols: Vec<char>,
	/// Symbol → index
	indices: HashMap<char, usize>,
}

impl CharVocabulary {
	/// Builds the vocabulary of every distinct character found in `text`.
	pub fn from_text(text: &str) -> Self {
		Self::from_symbols(text.chars())
	}

	/// Builds a vocabulary from arbitrary symbols (duplicates are ignored).
	pub fn from_symbols<I: IntoIterator<Item = char>>(symbols: I) -> Self {
		let symbols: Vec<char> = symbols.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
		let indices = symbols.iter().enumerate().map(|(i, c)| (*c, i)).collect();
		Self { symbols, indices }
	}

	/// Returns the symbols ordered by index.
	pub fn symbols(&self) -> &[char] {
		&self.symbols
	}

	/// Returns a new vocabulary holding the symbols of both.
	///
	/// Indices are recomputed: a symbol may not keep its index in the union.
	pub fn union(&self, other: &Self) -> Self {
		Self::from_symbols(self.symbols.iter().chain(other.symbols.iter()).copied())
	}

	/// Maps every character of `text` to its index.
	pub fn encode_str(&self, text: &str) -> Result<Vec<usize>> {
		text.chars().map(|c| self.index_of(c)).collect()
	}

	/// Maps indices back to a string, `None` if an index is out of range.
	pub fn decode(&self, indices: &[usize]) -> Option<String> {
		indices.iter().map(|i| self.symbol_of(*i)).collect()
	}
}

impl Vocabulary for CharVocabulary {
	fn len(&self) -> usize {
		self.symbols.len()
	}

	fn index_of(&self, symbol: char) -> Result<usize> {
		self.indices.get(&symbol).copied().ok_or(SampleError::UnknownSymbol(symbol))
	}

	fn symbol_of(&self, index: usize) -> Option<char> {
		self.symbols.get(index).copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_text_is_sorted_and_unique() {
		let vocabulary = CharVocabulary::from_text("hello world");
		assert_eq!(vocabulary.symbols(), &[' ', 'd', 'e', 'h', 'l', 'o', 'r', 'w']);
		assert_eq!(vocabulary.len(), 8);
	}

	#[test]
	fn test_lookups_are_inverse() {
		let vocabulary = CharVocabulary::from_text("abcdefghij");
		for index in 0..vocabulary.len() {
			let symbol = vocabulary.symbol_of(index).unwrap();
			assert_eq!(vocabulary.index_of(symbol).unwrap(), index);
		}
		assert_eq!(vocabulary.symbol_of(10), None);
	}

	#[test]
	fn test_unknown_symbol() {
		let vocabulary = CharVocabulary::from_text("abc");
		assert_eq!(vocabulary.index_of('z'), Err(SampleError::UnknownSymbol('z')));
		assert!(vocabulary.encode_str("abz").is_err());
	}

	#[test]
	fn test_union_reindexes() {
		let left = CharVocabulary::from_text("ac");
		let right = CharVocabulary::from_text("b");
		let union = left.union(&right);
		assert_eq!(union.symbols(), &['a', 'b', 'c']);
		assert_eq!(union.index_of('c').unwrap(), 2);
	}

	#[test]
	fn test_encode_decode() {
		let vocabulary = CharVocabulary::from_text("banana");
		let indices = vocabulary.encode_str("nab").unwrap();
		assert_eq!(indices, vec![2, 0, 1]);
		assert_eq!(vocabulary.decode(&indices).as_deref(), Some("nab"));
		assert_eq!(vocabulary.decode(&[7]), None);
	}
}
