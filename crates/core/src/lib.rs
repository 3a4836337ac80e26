//! Glyphh Core - data model
//!
//! Contains:
//! - Vector: dense hypervector algebra
//! - Value/Concept: attribute values and their canonical tokens
//! - EncoderConfig: layer/segment/role schema
//! - Glyph/TemporalEdge/IntentPattern: engine outputs
//! - Error taxonomy

mod config;
mod error;
mod glyph;
mod intent;
mod temporal;
mod value;
mod vector;

pub use config::*;
pub use error::*;
pub use glyph::*;
pub use intent::*;
pub use temporal::*;
pub use value::*;
pub use vector::*;
