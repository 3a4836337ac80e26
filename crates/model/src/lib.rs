//! Glyphh Model - concept index container
//!
//! - GlyphhModel: schema, ordered glyphs, intents, metadata
//! - Query/SearchFilters: similarity search inputs
//! - export/load: `.glyphh` artifacts

mod model;
mod payload;
mod query;


pub use model::{GlyphhModel, GlyphhModelBuilder, DEFAULT_MODEL_NAME, DEFAULT_MODEL_VERSION};
pub use query::{Query, SearchFilters};
