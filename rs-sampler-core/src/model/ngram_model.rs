use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::State;
use super::vocabulary::Vocabulary;

/// Character n-gram frequency table with backoff.
///
/// Stores, for every prefix of 0 to `order` characters seen in the training
/// lines, the characters that followed it. Prediction looks up the longest
/// known suffix of the context and falls back to shorter ones, down to the
/// empty prefix (plain character frequencies).
///
/// # Invariants
/// - `order` is always >= 1
/// - Each key of `states` has at most `order` characters
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel {
	/// Longest prefix tracked (the `n - 1` of the largest n-gram)
	order: usize,

	/// Mapping from a prefix to its transitions
	states: HashMap<String, State>,
}

impl NGramModel {
	/// Creates an empty table tracking prefixes of up to `order` characters.
	///
	/// # Errors
	/// Returns an error if `order < 1`.
	pub fn new(order: usize) -> Result<Self, String> {
		if order < 1 {
			return Err("order must be >= 1".to_owned());
		}
		Ok(Self { order, states: HashMap::new() })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct prefixes stored.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Adds a line of text to the table.
	///
	/// Every character is recorded as a transition from each of its
	/// preceding prefixes (0 to `order` characters long).
	pub fn add_sentence(&mut self, sentence: &str) {
		let chars: Vec<char> = sentence.chars().collect();
		for (i, next_char) in chars.iter().enumerate() {
			for k in 0..=self.order.min(i) {
				let prefix: String = chars[i - k..i].iter().collect();
				let state = self.states.entry(prefix).or_insert_with_key(|key| State::new(key));
				state.add_transition(*next_char);
			}
		}
	}

	/// Predicts the next-character distribution over `vocabulary`.
	///
	/// Uses the last `order` characters of `context`, backing off to shorter
	/// suffixes until one with transitions inside the vocabulary is found.
	///
	/// Returns `None` if the table knows nothing usable, even for the empty prefix.
	pub fn predict<V: Vocabulary + ?Sized>(&self, context: &[char], vocabulary: &V) -> Option<Vec<f32>> {
		let longest = self.order.min(context.len());
		(0..=longest).rev().find_map(|k| {
			let key: String = context[context.len() - k..].iter().collect();
			self.states.get(&key)?.distribution(vocabulary)
		})
	}

	/// Merges another table into this one.
	///
	/// # Errors
	/// Returns an error if the orders do not match or a state merge fails.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.order != other.order {
			return Err(format!("order mismatch: {} != {}", self.order, other.order));
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}
}
