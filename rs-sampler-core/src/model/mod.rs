//! Temperature sampling and text generation over character-level models.
//!
//! This module provides:
//! - Temperature-scaled multinomial sampling (`sampler`)
//! - The sliding-window generation loop (`generator`)
//! - One-hot encoding of context windows (`encoding`)
//! - The model and vocabulary interfaces, with concrete implementations
//!   (`sequence_model`, `vocabulary`, `corpus_model`)

/// Temperature sampler: reshapes a distribution and draws one index from it.
pub mod sampler;

/// Generation loop feeding sampled symbols back into the model.
///
/// Exposes a one-shot `generate`, a deadline-bounded variant and a
/// step-by-step `GenerationSession`.
pub mod generator;

/// Parameters of a generation call (length, diversity, window size).
pub mod generation_input;

/// One-hot encoding of context windows.
pub mod encoding;

/// Symbol ↔ index mapping.
pub mod vocabulary;

/// The `SequenceModel` interface implemented by every predictor.
pub mod sequence_model;

/// Corpus, vocabulary and n-gram table bundled as a ready-to-use model.
///
/// Supports loading from disk with a binary cache, parallel construction
/// and merging.
pub mod corpus_model;

/// Character n-gram frequency table with backoff.
pub mod ngram_model;

/// Transition counts for a single n-gram prefix.
///
/// This module is not exposed publicly.
mod state;
