use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::vocabulary::Vocabulary;

/// Represents a context in an n-gram table.
///
/// A `State` corresponds to a fixed prefix (`key`) and stores how often
/// each character was observed right after it.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct State {
	/// Identifier of the state (the prefix characters).
	key: String,
	/// Outgoing transitions indexed by the next character.
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: HashMap<char, usize>,
}

impl State {
	/// Creates a new empty state for the given prefix.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: HashMap::new(),
		}
	}

	/// Records an occurrence of a transition toward `next_char`.
	pub fn add_transition(&mut self, next_char: char) {
		*self.transitions.entry(next_char).or_insert(0) += 1;
	}

	/// Frequencies of the observed transitions laid out over `vocabulary`.
	///
	/// Entry `i` is the share of transitions toward `vocabulary.symbol_of(i)`.
	/// Characters unknown to the vocabulary are left out of the total.
	///
	/// Returns `None` if no transition lands inside the vocabulary.
	pub fn distribution<V: Vocabulary + ?Sized>(&self, vocabulary: &V) -> Option<Vec<f32>> {
		let mut counts = vec![0usize; vocabulary.len()];
		for (next_char, occurrence) in &self.transitions {
			if let Ok(index) = vocabulary.index_of(*next_char) {
				counts[index] += occurrence;
			}
		}

		let total: usize = counts.iter().sum();
		if total == 0 {
			return None;
		}
		Some(counts.into_iter().map(|c| c as f32 / total as f32).collect())
	}

	/// Merges another state into this one, summing occurrence counts.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err(format!("key mismatch: {:?} != {:?}", self.key, other.key));
		}

		for (next_char, occurrence) in &other.transitions {
			*self.transitions.entry(*next_char).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::vocabulary::CharVocabulary;

	#[test]
	fn test_distribution_follows_counts() {
		let mut state = State::new("th");
		for c in "eeea".chars() {
			state.add_transition(c);
		}
		let vocabulary = CharVocabulary::from_text("aet");
		assert_eq!(state.distribution(&vocabulary), Some(vec![0.25, 0.75, 0.0]));
	}

	#[test]
	fn test_distribution_outside_vocabulary() {
		let mut state = State::new("q");
		state.add_transition('u');
		assert_eq!(state.distribution(&CharVocabulary::from_text("ab")), None);
	}

	#[test]
	fn test_merge() {
		let mut left = State::new("a");
		left.add_transition('b');
		let mut right = State::new("a");
		right.add_transition('b');
		right.add_transition('c');
		right.add_transition('c');
		left.merge(&right).unwrap();
		assert_eq!(left.distribution(&CharVocabulary::from_text("bc")), Some(vec![0.5, 0.5]));
		assert_eq!(left.distribution(&CharVocabulary::from_text("b")), Some(vec![1.0]));

		assert!(left.merge(&State::new("z")).is_err());
	}
}
