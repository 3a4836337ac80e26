//! Similarity Calculator - glyph scoring
//!
//! Cosine similarity in [-1, 1]. Zero vectors score 0. `edge_type` picks the
//! compared surface: "neural_cortex"/"global" or a layer name. Unknown names
//! fall back to the global cortex unless strict mode is on.

use glyphh_core::{Glyph, GlyphhError, QueryError, Result, Vector, NEURAL_CORTEX};
use serde::Serialize;
use tracing::warn;

/// Score between two glyphs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityScore {
    pub score: f64,

    /// Edge type as requested
    pub edge_type: String,

    /// Surface actually compared
    pub resolved: String,
}

/// Glyph similarity scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityCalculator {
    strict: bool,
}

impl SimilarityCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown edge types become errors
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Score two glyphs on the surface named by `edge_type`
    pub fn compute_similarity(&self, a: &Glyph, b: &Glyph, edge_type: &str) -> Result<SimilarityScore> {
        let (left, right, resolved) = match (a.surface(edge_type), b.surface(edge_type)) {
            (Some(left), Some(right)) => (left, right, edge_type),
            _ if self.strict => {
                return Err(GlyphhError::Query(QueryError::UnknownEdgeType(
                    edge_type.to_string(),
                )));
            }
            _ => {
                warn!(
                    "Unknown edge type '{}' for '{}'/'{}', using global cortex",
                    edge_type, a.name, b.name
                );
                (&a.global_cortex, &b.global_cortex, NEURAL_CORTEX)
            }
        };

        Ok(SimilarityScore {
            score: compute_vector_similarity(left, right)?,
            edge_type: edge_type.to_string(),
            resolved: resolved.to_string(),
        })
    }
}

/// Cosine similarity of raw vectors
pub fn compute_vector_similarity(a: &Vector, b: &Vector) -> Result<f64> {
    Ok(a.cosine(b)?)
}
