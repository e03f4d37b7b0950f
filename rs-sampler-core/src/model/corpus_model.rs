use std::path::Path;
use std::sync::mpsc;
use std::thread;

use ndarray::{Array2, Array3, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::encoding::decode_indices;
use super::generation_input::GenerationInput;
use super::generator::generate;
use super::ngram_model::NGramModel;
use super::sequence_model::SequenceModel;
use super::vocabulary::{CharVocabulary, Vocabulary};
use crate::error::{Result, SampleError};
use crate::io::{build_output_path, get_filename, read_file};

const LINE_SEPARATOR: char = '\n';

/// A corpus bundled with everything needed to generate from it.
///
/// This struct manages:
/// - `corpus`: the text seed windows are drawn from (lines joined by `\n`).
/// - `vocabulary`: every character of the corpus.
/// - `ngrams`: a frequency table standing in for a trained network.
/// - `corpus_names`: names of the corpus files loaded from disk.
///
/// It implements [`SequenceModel`], so it can drive the generation loop
/// directly, and it is cached on disk with `postcard` next to its source file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CorpusModel {
	corpus: Vec<char>,
	vocabulary: CharVocabulary,
	ngrams: NGramModel,
	corpus_names: Vec<String>,
}

impl CorpusModel {
	/// Loads a `CorpusModel` for a text file.
	///
	/// - If `<file>.bin` exists and was built with the same `order`, it is
	///   deserialized with `postcard`.
	/// - Otherwise the model is built from the text file (see `from_lines`) and
	///   the cache is (re)written.
	pub fn new<P: AsRef<Path>>(filepath: P, order: usize) -> Result<Self> {
		let binary_data_path = build_output_path(&filepath, "bin")?;

		if binary_data_path.exists() {
			let bytes = std::fs::read(&binary_data_path)?;
			let cached: Self = postcard::from_bytes(&bytes)?;
			if cached.ngrams.order() == order {
				log::debug!("loaded cached model {}", binary_data_path.display());
				return Ok(cached);
			}
			log::debug!(
				"cached model {} has order {}, rebuilding with order {}",
				binary_data_path.display(),
				cached.ngrams.order(),
				order
			);
		}

		let mut model = Self::from_lines(&read_file(&filepath)?, order)?;
		model.corpus_names.push(get_filename(&filepath)?);
		model.save(&binary_data_path)?;
		Ok(model)
	}

	/// Builds a model from corpus lines, counting n-grams in parallel.
	///
	/// # Behavior
	/// - The vocabulary is every character of the lines, plus `\n` when there
	///   is more than one line.
	/// - Lines are split into chunks (CPU cores * factor), each chunk is counted
	///   by its own thread and the partial tables are merged sequentially.
	///
	/// # Errors
	/// `InvalidParameter` if there is no text or `order` is 0.
	pub fn from_lines<S: AsRef<str> + Sync>(lines: &[S], order: usize) -> Result<Self> {
		let corpus: Vec<char> = lines
			.iter()
			.map(|line| line.as_ref())
			.collect::<Vec<&str>>()
			.join("\n")
			.chars()
			.collect();
		if corpus.is_empty() {
			return Err(SampleError::InvalidParameter("corpus is empty".to_owned()));
		}
		let vocabulary = CharVocabulary::from_symbols(corpus.iter().copied());

		let mut ngrams = NGramModel::new(order).map_err(SampleError::InvalidParameter)?;
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in lines.chunks(chunk_size) {
				let tx = tx.clone();
				let mut partial = ngrams.clone();
				scope.spawn(move || {
					for line in chunk {
						let mut line = line.as_ref().to_owned();
						line.push(LINE_SEPARATOR);
						partial.add_sentence(&line);
					}
					// The receiver outlives the scope
					let _ = tx.send(partial);
				});
			}
		});
		drop(tx);

		for partial in rx.iter() {
			ngrams.merge(&partial).map_err(SampleError::Model)?;
		}

		log::debug!(
			"built model: {} characters, vocabulary of {}, {} prefixes",
			corpus.len(),
			vocabulary.len(),
			ngrams.len()
		);
		Ok(Self { corpus, vocabulary, ngrams, corpus_names: Vec::new() })
	}

	/// Writes the model to `path` with `postcard`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	pub fn corpus(&self) -> &[char] {
		&self.corpus
	}

	pub fn vocabulary(&self) -> &CharVocabulary {
		&self.vocabulary
	}

	pub fn order(&self) -> usize {
		self.ngrams.order()
	}

	/// Names of the corpus files this model was loaded from.
	pub fn get_corpus_names(&self) -> &Vec<String> {
		&self.corpus_names
	}

	/// Generates text seeded from a random window of the corpus.
	///
	/// The model is its own vocabulary and predictor.
	pub fn generate<R: Rng + ?Sized>(&self, input: &GenerationInput, rng: &mut R) -> Result<String> {
		let generated = generate(
			&self.corpus,
			input.length,
			input.diversity(),
			self,
			input.window_size(),
			&self.vocabulary,
			rng,
		)?;
		Ok(generated.into_iter().collect())
	}

	/// Merges another `CorpusModel` into this one.
	///
	/// # Behavior
	/// - Corpora are concatenated with a `\n` in between.
	/// - The vocabulary becomes the union of both (indices are recomputed).
	/// - N-gram counts are summed.
	///
	/// # Errors
	/// `InvalidParameter` if the n-gram orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		self.ngrams.merge(&other.ngrams).map_err(SampleError::InvalidParameter)?;

		self.corpus.push(LINE_SEPARATOR);
		self.corpus.extend_from_slice(&other.corpus);
		self.vocabulary = self
			.vocabulary
			.union(&other.vocabulary)
			.union(&CharVocabulary::from_symbols([LINE_SEPARATOR]));
		self.corpus_names.extend(other.corpus_names.iter().cloned());

		Ok(())
	}
}

impl SequenceModel for CorpusModel {
	/// Decodes each batch row back to characters and looks up the n-gram table.
	fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>> {
		let (batch, _, vocabulary_size) = input.dim();
		if vocabulary_size != self.vocabulary.len() {
			return Err(SampleError::Model(format!(
				"input encodes {} symbols, vocabulary has {}",
				vocabulary_size,
				self.vocabulary.len()
			)));
		}

		let mut output = Array2::<f32>::zeros((batch, vocabulary_size));
		for (b, row) in input.axis_iter(Axis(0)).enumerate() {
			let context = decode_indices(row)
				.into_iter()
				.enumerate()
				.map(|(t, index)| {
					index
						.and_then(|i| self.vocabulary.symbol_of(i))
						.ok_or_else(|| SampleError::Model(format!("position {} is not one-hot", t)))
				})
				.collect::<Result<Vec<char>>>()?;

			let distribution = self
				.ngrams
				.predict(&context, &self.vocabulary)
				.ok_or_else(|| SampleError::Model("no prediction for context".to_owned()))?;
			output.row_mut(b).assign(&ndarray::ArrayView1::from(&distribution));
		}
		Ok(output)
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::model::encoding::encode;

	const TEXT: [&str; 3] = ["the cat sat on the mat", "the dog sat on the log", "a cat and a dog"];

	#[test]
	fn test_from_lines() {
		let model = CorpusModel::from_lines(&TEXT, 3).unwrap();
		assert_eq!(model.corpus().len(), TEXT.join("\n").chars().count());
		assert!(model.vocabulary().index_of('\n').is_ok());
		assert_eq!(model.order(), 3);
	}

	#[test]
	fn test_empty_corpus_rejected() {
		let lines: [&str; 0] = [];
		assert!(matches!(CorpusModel::from_lines(&lines, 2), Err(SampleError::InvalidParameter(_))));
		assert!(CorpusModel::from_lines(&["abc"], 0).is_err());
	}

	#[test]
	fn test_predict_is_a_distribution() {
		let model = CorpusModel::from_lines(&TEXT, 3).unwrap();
		let window: Vec<char> = "the ".chars().collect();
		let encoded = encode(&window, model.vocabulary()).unwrap();
		let output = model.predict(&encoded).unwrap();

		assert_eq!(output.dim(), (1, model.vocabulary().len()));
		assert!((output.sum() - 1.0).abs() < 1e-5);
		// "he " is only ever followed by 'c', 'd', 'l' or 'm'
		let c = model.vocabulary().index_of('c').unwrap();
		assert!(output[[0, c]] > 0.0);
		let t = model.vocabulary().index_of('t').unwrap();
		assert_eq!(output[[0, t]], 0.0);
	}

	#[test]
	fn test_predict_rejects_foreign_encoding() {
		let model = CorpusModel::from_lines(&TEXT, 2).unwrap();
		let input = Array3::<f32>::zeros((1, 4, model.vocabulary().len() + 1));
		assert!(matches!(model.predict(&input), Err(SampleError::Model(_))));

		let blank = Array3::<f32>::zeros((1, 4, model.vocabulary().len()));
		assert!(matches!(model.predict(&blank), Err(SampleError::Model(_))));
	}

	#[test]
	fn test_generate_stays_in_vocabulary() {
		let model = CorpusModel::from_lines(&TEXT, 4).unwrap();
		let input = GenerationInput::new(50, 0.5, 6).unwrap();
		let mut rng = StdRng::seed_from_u64(21);
		let text = model.generate(&input, &mut rng).unwrap();

		assert_eq!(text.chars().count(), 56);
		assert!(text.chars().all(|c| model.vocabulary().index_of(c).is_ok()));
	}

	#[test]
	fn test_merge() {
		let mut left = CorpusModel::from_lines(&["abc"], 2).unwrap();
		let right = CorpusModel::from_lines(&["xyz"], 2).unwrap();
		left.merge(&right).unwrap();

		assert_eq!(left.corpus().iter().collect::<String>(), "abc\nxyz");
		assert_eq!(left.vocabulary().symbols(), &['\n', 'a', 'b', 'c', 'x', 'y', 'z']);

		let other_order = CorpusModel::from_lines(&["abc"], 3).unwrap();
		assert!(left.merge(&other_order).is_err());
	}

	#[test]
	fn test_cache_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let source = dir.path().join("tiny.txt");
		std::fs::write(&source, "hello world\nhello there\n").unwrap();

		let built = CorpusModel::new(&source, 3).unwrap();
		assert!(dir.path().join("tiny.bin").exists());
		assert_eq!(built.get_corpus_names(), &vec!["tiny".to_owned()]);

		// Remove the source: the cache alone must be enough
		std::fs::remove_file(&source).unwrap();
		let cached = CorpusModel::new(&source, 3).unwrap();
		assert_eq!(cached.corpus(), built.corpus());
		assert_eq!(cached.vocabulary(), built.vocabulary());
		assert_eq!(cached.get_corpus_names(), built.get_corpus_names());
	}
}
