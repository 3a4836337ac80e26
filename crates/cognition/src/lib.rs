//! Glyphh Cognition - encoding engine
//!
//! Components, leaves first:
//! - HypervectorGenerator: seeded token → bipolar vector, memoised
//! - Encoder: schema + concept → glyph
//! - SimilarityCalculator: glyph scoring
//! - TemporalEncoder: transitions as delta vectors
//! - BeamSearchPredictor: future states from edge history
//! - IntentEncoder: phrase → intent classification

pub mod beam;
pub mod encoder;
pub mod generator;
pub mod intent;
pub mod similarity;
pub mod temporal;

pub use beam::{BeamSearchPredictor, Prediction};
pub use encoder::{tokenize, EncodeReport, Encoder, EncodingWarning, SCHEMALESS_LAYER, SCHEMALESS_SEGMENT};
pub use generator::{generate, HypervectorGenerator};
pub use intent::{IntentEncoder, PHRASE_ROLE};
pub use similarity::{compute_vector_similarity, SimilarityCalculator, SimilarityScore};
pub use temporal::{apply_delta, compose_deltas, compute_temporal_delta, expected_delta, EdgeEndpoint, TemporalEncoder};
