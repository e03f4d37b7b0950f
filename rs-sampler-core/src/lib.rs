//! Character-level text generation library.
//!
//! This crate turns the per-step output of a character-level sequence model
//! into generated text:
//! - Temperature ("diversity") scaled multinomial sampling
//! - A sliding-window generation loop feeding each sampled character back in
//! - Model and vocabulary interfaces, with an n-gram reference model
//! - Utilities for I/O and path handling
//!
//! Randomness is always supplied by the caller: seed a `rand::rngs::StdRng`
//! to get reproducible output.

/// Sampling, generation loop and model interfaces.
pub mod model;

/// Crate-wide error type.
pub mod error;

/// I/O utilities (corpus loading, path helpers).
pub mod io;

pub use error::{Result, SampleError};
pub use model::generation_input::GenerationInput;
pub use model::generator::{GenerationSession, generate, generate_text, generate_until};
pub use model::sampler::{sample, scale};
pub use model::sequence_model::{SequenceModel, UniformModel};
pub use model::vocabulary::{CharVocabulary, Vocabulary};
