//! Temporal edge types

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// One side of an observed transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeState {
    /// Concept name
    pub concept: String,

    /// Bipolar snapshot of the concept's global cortex
    pub state: Vector,
}

/// Observed transition `from → to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalEdge {
    pub from: EdgeState,
    pub to: EdgeState,

    /// `from ⊙ permute(to, 1)`
    pub delta: Vector,

    pub edge_type: String,
}

impl TemporalEdge {
    pub fn dimension(&self) -> usize {
        self.delta.len()
    }
}
