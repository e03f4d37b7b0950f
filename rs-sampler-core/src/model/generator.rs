use std::collections::VecDeque;
use std::time::Instant;

use rand::Rng;

use super::encoding::encode;
use super::generation_input::GenerationInput;
use super::sampler::{check_diversity, sample};
use super::sequence_model::SequenceModel;
use super::vocabulary::Vocabulary;
use crate::error::{Result, SampleError};

/// State of one generation call: the rolling context window and the output.
///
/// # Invariants
/// - `window` keeps the length it was seeded with
/// - `output` starts with the seed and only grows, one symbol per `step`
///
/// # Notes
/// Each `step` is atomic: it either appends one symbol or fails without
/// touching the window. Callers bounding latency check their deadline
/// between steps (see [`generate_until`]).
#[derive(Debug, Clone)]
pub struct GenerationSession {
	window: VecDeque<char>,
	output: Vec<char>,
	steps: usize,
}

impl GenerationSession {
	/// Seeds a session with a random `window_size` slice of `corpus`.
	///
	/// The start offset is uniform over `[0, corpus.len() - window_size]`,
	/// every position where a full window fits.
	///
	/// # Errors
	/// `InvalidParameter` if `window_size` is 0 or larger than the corpus.
	pub fn start<R: Rng + ?Sized>(corpus: &[char], window_size: usize, rng: &mut R) -> Result<Self> {
		if window_size == 0 {
			return Err(SampleError::InvalidParameter("window size must be > 0".to_owned()));
		}
		if window_size > corpus.len() {
			return Err(SampleError::InvalidParameter(format!(
				"window size {} exceeds corpus length {}",
				window_size,
				corpus.len()
			)));
		}

		let start = rng.random_range(0..=corpus.len() - window_size);
		Self::from_seed(&corpus[start..start + window_size])
	}

	/// Seeds a session with an explicit window.
	///
	/// # Errors
	/// `InvalidParameter` if `seed` is empty.
	pub fn from_seed(seed: &[char]) -> Result<Self> {
		if seed.is_empty() {
			return Err(SampleError::InvalidParameter("seed must not be empty".to_owned()));
		}
		Ok(Self { window: seed.iter().copied().collect(), output: seed.to_vec(), steps: 0 })
	}

	/// Checks every symbol of the window against `vocabulary`.
	///
	/// # Errors
	/// `UnknownSymbol` for the first symbol missing from the vocabulary.
	pub fn check_window<V: Vocabulary + ?Sized>(&self, vocabulary: &V) -> Result<()> {
		for symbol in &self.window {
			vocabulary.index_of(*symbol)?;
		}
		Ok(())
	}

	/// Current context window, oldest symbol first.
	pub fn window(&self) -> &VecDeque<char> {
		&self.window
	}

	/// Seed followed by every symbol generated so far.
	pub fn output(&self) -> &[char] {
		&self.output
	}

	/// Number of completed steps.
	pub fn steps(&self) -> usize {
		self.steps
	}

	/// Runs one iteration: encode, predict, sample, append and slide.
	///
	/// # Returns
	/// The symbol appended to the output.
	///
	/// # Errors
	/// - `UnknownSymbol` if the window holds a symbol outside the vocabulary.
	/// - `Model` if the model fails or its output is not `(1, V)`-shaped.
	/// - Any sampler error (`InvalidParameter`, `DegenerateDistribution`).
	pub fn step<M, V, R>(&mut self, model: &M, vocabulary: &V, diversity: f64, rng: &mut R) -> Result<char>
	where
		M: SequenceModel + ?Sized,
		V: Vocabulary + ?Sized,
		R: Rng + ?Sized,
	{
		let encoded = encode(&self.window, vocabulary)?;
		let prediction = model.predict(&encoded)?;

		let (rows, columns) = prediction.dim();
		if rows == 0 || columns != vocabulary.len() {
			return Err(SampleError::Model(format!(
				"expected a (1, {}) prediction, got ({}, {})",
				vocabulary.len(),
				rows,
				columns
			)));
		}

		let distribution = prediction.row(0).to_vec();
		let next_index = sample(&distribution, diversity, rng)?;
		let next_symbol = vocabulary
			.symbol_of(next_index)
			.ok_or_else(|| SampleError::Model(format!("index {} has no symbol", next_index)))?;

		self.output.push(next_symbol);
		self.window.pop_front();
		self.window.push_back(next_symbol);
		self.steps += 1;

		log::trace!("step {}: {:?} (index {})", self.steps, next_symbol, next_index);
		Ok(next_symbol)
	}

	/// Consumes the session, returning the generated output.
	pub fn finish(self) -> Vec<char> {
		self.output
	}
}

/// Draws the seed window and announces it once it is known to be encodable.
fn seed_session<V, R>(corpus: &[char], window_size: usize, vocabulary: &V, rng: &mut R) -> Result<GenerationSession>
where
	V: Vocabulary + ?Sized,
	R: Rng + ?Sized,
{
	let session = GenerationSession::start(corpus, window_size, rng)?;
	session.check_window(vocabulary)?;
	log::info!("Generating with seed: \"{}\"", session.window().iter().collect::<String>());
	Ok(session)
}

/// Generates `length` symbols continuing a random window of `corpus`.
///
/// # Parameters
/// - `corpus`: text the seed window is taken from.
/// - `length`: number of symbols to generate.
/// - `diversity`: sampling temperature, must be > 0.
/// - `model`: predicts the next-symbol distribution from an encoded window.
/// - `window_size`: context width expected by the model.
/// - `vocabulary`: symbol ↔ index mapping the model was trained with.
/// - `rng`: source of the seed offset and of every draw.
///
/// # Returns
/// The seed window followed by the `length` generated symbols
/// (`window_size + length` symbols).
///
/// # Errors
/// Fails on the first error of any step; no partial output is returned.
pub fn generate<M, V, R>(
	corpus: &[char],
	length: usize,
	diversity: f64,
	model: &M,
	window_size: usize,
	vocabulary: &V,
	rng: &mut R,
) -> Result<Vec<char>>
where
	M: SequenceModel + ?Sized,
	V: Vocabulary + ?Sized,
	R: Rng + ?Sized,
{
	check_diversity(diversity)?;
	let mut session = seed_session(corpus, window_size, vocabulary, rng)?;
	for _ in 0..length {
		session.step(model, vocabulary, diversity, rng)?;
	}
	Ok(session.finish())
}

/// `generate` over text, with parameters bundled in a [`GenerationInput`].
pub fn generate_text<M, V, R>(
	corpus: &str,
	input: &GenerationInput,
	model: &M,
	vocabulary: &V,
	rng: &mut R,
) -> Result<String>
where
	M: SequenceModel + ?Sized,
	V: Vocabulary + ?Sized,
	R: Rng + ?Sized,
{
	let corpus: Vec<char> = corpus.chars().collect();
	let generated = generate(&corpus, input.length, input.diversity(), model, input.window_size(), vocabulary, rng)?;
	Ok(generated.into_iter().collect())
}

/// `generate` with a hard deadline, checked before each step.
///
/// A step already running is never interrupted: the deadline can be
/// overshot by the duration of one model call.
///
/// # Errors
/// `DeadlineExceeded` if `deadline` passes before all steps are done.
/// The partial output is dropped.
pub fn generate_until<M, V, R>(
	corpus: &[char],
	input: &GenerationInput,
	model: &M,
	vocabulary: &V,
	rng: &mut R,
	deadline: Instant,
) -> Result<Vec<char>>
where
	M: SequenceModel + ?Sized,
	V: Vocabulary + ?Sized,
	R: Rng + ?Sized,
{
	let mut session = seed_session(corpus, input.window_size(), vocabulary, rng)?;
	while session.steps() < input.length {
		if Instant::now() >= deadline {
			log::debug!("deadline reached after {} of {} steps", session.steps(), input.length);
			return Err(SampleError::DeadlineExceeded { completed: session.steps(), requested: input.length });
		}
		session.step(model, vocabulary, input.diversity(), rng)?;
	}
	Ok(session.finish())
}
