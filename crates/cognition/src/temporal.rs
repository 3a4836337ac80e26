//! Temporal Encoder - ordered transitions as delta vectors
//!
//! An edge binds the bipolar snapshot of the source cortex to the target
//! snapshot shifted one step forward:
//!   delta = bipolar(from) ⊙ permute(bipolar(to), 1)
//! Because bipolar binding is self-inverse, a delta applied to its source
//! state recovers the target exactly, and two chained deltas compose into the
//! two-step delta:
//!   delta(a→b) ⊙ permute(delta(b→c), 1) = bipolar(a) ⊙ permute(bipolar(c), 2)
//!
//! History is append-only; repeated transitions are all kept.

use glyphh_core::{Concept, EdgeState, EncoderConfig, Glyph, Result, TemporalEdge, Vector};
use tracing::debug;

use crate::encoder::Encoder;

/// Edge endpoint: a concept to encode or an already encoded glyph
#[derive(Debug, Clone, Copy)]
pub enum EdgeEndpoint<'a> {
    Concept(&'a Concept),
    Glyph(&'a Glyph),
}

impl<'a> From<&'a Concept> for EdgeEndpoint<'a> {
    fn from(concept: &'a Concept) -> Self {
        EdgeEndpoint::Concept(concept)
    }
}

impl<'a> From<&'a Glyph> for EdgeEndpoint<'a> {
    fn from(glyph: &'a Glyph) -> Self {
        EdgeEndpoint::Glyph(glyph)
    }
}

/// Builds and accumulates temporal edges
#[derive(Debug, Clone)]
pub struct TemporalEncoder {
    encoder: Encoder,
    edges: Vec<TemporalEdge>,
}

impl TemporalEncoder {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        Ok(Self::with_encoder(Encoder::new(config)?))
    }

    /// Reuse an encoder (and its vector cache)
    pub fn with_encoder(encoder: Encoder) -> Self {
        Self {
            encoder,
            edges: Vec::new(),
        }
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Record the transition `from → to`
    pub fn create_edge<'a, 'b>(
        &mut self,
        from: impl Into<EdgeEndpoint<'a>>,
        to: impl Into<EdgeEndpoint<'b>>,
        edge_type: &str,
    ) -> Result<TemporalEdge> {
        let from = self.snapshot(from.into())?;
        let to = self.snapshot(to.into())?;
        let delta = from.state.bind(&to.state.permute(1))?;

        debug!("Edge {} -> {} ({})", from.concept, to.concept, edge_type);

        let edge = TemporalEdge {
            from,
            to,
            delta,
            edge_type: edge_type.to_string(),
        };
        self.edges.push(edge.clone());
        Ok(edge)
    }

    fn snapshot(&self, endpoint: EdgeEndpoint<'_>) -> Result<EdgeState> {
        let (concept, cortex) = match endpoint {
            EdgeEndpoint::Glyph(glyph) => (glyph.name.clone(), glyph.global_cortex.to_bipolar()),
            EdgeEndpoint::Concept(concept) => {
                let glyph = self.encoder.encode(concept)?;
                (glyph.name, glyph.global_cortex.to_bipolar())
            }
        };
        Ok(EdgeState {
            concept,
            state: cortex,
        })
    }

    /// Raw delta primitive on arbitrary vectors (no snapping)
    pub fn compute_temporal_delta(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        compute_temporal_delta(a, b)
    }

    pub fn edges(&self) -> &[TemporalEdge] {
        &self.edges
    }

    pub fn edges_of_type<'s>(&'s self, edge_type: &'s str) -> impl Iterator<Item = &'s TemporalEdge> + 's {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Drain the accumulated history
    pub fn take_edges(&mut self) -> Vec<TemporalEdge> {
        std::mem::take(&mut self.edges)
    }
}

impl Default for TemporalEncoder {
    fn default() -> Self {
        Self::with_encoder(Encoder::default())
    }
}

/// `a ⊙ permute(b, 1)`
pub fn compute_temporal_delta(a: &Vector, b: &Vector) -> Result<Vector> {
    Ok(a.bind(&b.permute(1))?)
}

/// Step `state` forward through `delta`: `permute(delta ⊙ state, -1)`
pub fn apply_delta(state: &Vector, delta: &Vector) -> Result<Vector> {
    Ok(delta.bind(state)?.permute(-1))
}

/// Chain `first` then `second` into a two-step delta
pub fn compose_deltas(first: &Vector, second: &Vector) -> Result<Vector> {
    Ok(first.bind(&second.permute(1))?)
}

/// Delta expected between two glyphs `steps` transitions apart
pub fn expected_delta(from: &Glyph, to: &Glyph, steps: i64) -> Result<Vector> {
    Ok(from
        .global_cortex
        .to_bipolar()
        .bind(&to.global_cortex.to_bipolar().permute(steps))?)
}
