use ndarray::{Array2, Array3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_sampler_core::model::corpus_model::CorpusModel;
use rs_sampler_core::model::encoding::encode;
use rs_sampler_core::{
	CharVocabulary, GenerationInput, Result, SampleError, SequenceModel, UniformModel, Vocabulary, generate,
};

const CORPUS: &str = "abcdefghij";

/// Favors the symbol following the last one of the window, alphabetically.
struct SuccessorModel;

impl SequenceModel for SuccessorModel {
	fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>> {
		let (_, window, vocabulary) = input.dim();
		let last = (0..vocabulary)
			.find(|i| input[[0, window - 1, *i]] == 1.0)
			.ok_or_else(|| SampleError::Model("empty position".to_owned()))?;

		let mut output = Array2::from_elem((1, vocabulary), 0.02);
		output[[0, (last + 1) % vocabulary]] = 0.8;
		Ok(output)
	}
}

fn corpus() -> Vec<char> {
	CORPUS.chars().collect()
}

#[test]
fn output_is_seed_plus_length() {
	let corpus = corpus();
	let vocabulary = CharVocabulary::from_text(CORPUS);
	let mut rng = StdRng::seed_from_u64(2024);

	let output = generate(&corpus, 5, 1.0, &UniformModel, 4, &vocabulary, &mut rng).unwrap();

	assert_eq!(output.len(), 9);
	let seed: String = output[..4].iter().collect();
	assert!(CORPUS.contains(&seed), "seed {:?} is not a substring of the corpus", seed);
	assert!(output.iter().all(|c| vocabulary.index_of(*c).is_ok()));
}

#[test]
fn window_larger_than_corpus_is_rejected() {
	let corpus = corpus();
	let vocabulary = CharVocabulary::from_text(CORPUS);
	let mut rng = StdRng::seed_from_u64(0);

	let result = generate(&corpus, 5, 1.0, &UniformModel, 11, &vocabulary, &mut rng);
	assert!(matches!(result, Err(SampleError::InvalidParameter(_))));
}

#[test]
fn non_positive_diversity_is_rejected() {
	let corpus = corpus();
	let vocabulary = CharVocabulary::from_text(CORPUS);
	let mut rng = StdRng::seed_from_u64(0);

	for diversity in [0.0, -0.5] {
		let result = generate(&corpus, 5, diversity, &UniformModel, 4, &vocabulary, &mut rng);
		assert!(matches!(result, Err(SampleError::InvalidParameter(_))));
	}
}

#[test]
fn same_seed_same_output() {
	let corpus = corpus();
	let vocabulary = CharVocabulary::from_text(CORPUS);

	let run = |seed: u64| {
		let mut rng = StdRng::seed_from_u64(seed);
		generate(&corpus, 50, 1.5, &SuccessorModel, 4, &vocabulary, &mut rng).unwrap()
	};

	assert_eq!(run(77), run(77));
	assert_ne!(run(77), run(78));
}

#[test]
fn low_diversity_follows_the_model() {
	let corpus = corpus();
	let vocabulary = CharVocabulary::from_text(CORPUS);
	let mut rng = StdRng::seed_from_u64(5);

	let output = generate(&corpus, 20, 0.01, &SuccessorModel, 3, &vocabulary, &mut rng).unwrap();
	for pair in output[2..].windows(2) {
		let expected = (pair[0] as u8 - b'a' + 1) % 10 + b'a';
		assert_eq!(pair[1], expected as char);
	}
}

#[test]
fn encoding_twice_is_bit_identical() {
	let vocabulary = CharVocabulary::from_text(CORPUS);
	let window: Vec<char> = "cafe".chars().collect();

	let first = encode(&window, &vocabulary).unwrap();
	let second = encode(&window, &vocabulary).unwrap();
	let bits = |a: &Array3<f32>| a.iter().map(|v| v.to_bits()).collect::<Vec<u32>>();
	assert_eq!(bits(&first), bits(&second));
}

#[test]
fn corpus_model_round_trip_through_generation() {
	let lines = ["it was the best of times", "it was the worst of times"];
	let model = CorpusModel::from_lines(&lines, 5).unwrap();
	let input = GenerationInput::new(80, 0.2, 10).unwrap();

	let mut first = StdRng::seed_from_u64(3);
	let mut second = StdRng::seed_from_u64(3);
	let text = model.generate(&input, &mut first).unwrap();

	assert_eq!(text.chars().count(), 90);
	assert_eq!(text, model.generate(&input, &mut second).unwrap());
}
