//! Glyph - the encoded form of a concept

use serde::{Deserialize, Serialize};

use crate::value::{Attributes, Value};
use crate::vector::Vector;

/// Edge type naming the global cortex
pub const NEURAL_CORTEX: &str = "neural_cortex";

/// Alias accepted for the global cortex
pub const GLOBAL: &str = "global";

/// Per-layer vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerVector {
    pub name: String,
    pub vector: Vector,
}

/// Encoded concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Source concept name
    pub name: String,

    /// Bundle of every layer vector
    pub global_cortex: Vector,

    /// Layer vectors in schema order
    pub layers: Vec<LayerVector>,

    /// Verbatim source attributes, used for filtering
    pub attributes: Attributes,
}

impl Glyph {
    pub fn dimension(&self) -> usize {
        self.global_cortex.len()
    }

    pub fn layer(&self, name: &str) -> Option<&Vector> {
        self.layers.iter().find(|l| l.name == name).map(|l| &l.vector)
    }

    /// Vector compared for `edge_type`, `None` when the name is unknown
    pub fn surface(&self, edge_type: &str) -> Option<&Vector> {
        if edge_type == NEURAL_CORTEX || edge_type == GLOBAL {
            return Some(&self.global_cortex);
        }
        self.layer(edge_type)
    }

    /// True when no role contributed to the glyph
    pub fn is_degenerate(&self) -> bool {
        self.global_cortex.is_zero()
    }

    /// Exact-match predicate over stored attributes (all filters must hold)
    pub fn matches<'a, I>(&self, filters: I) -> bool
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        filters
            .into_iter()
            .all(|(key, expected)| self.attributes.get(key) == Some(expected))
    }
}

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    /// Concept name of the matching glyph
    pub concept: String,
    pub score: f64,
    pub attributes: Attributes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn glyph() -> Glyph {
        let mut attributes = Attributes::new();
        attributes.insert("type".to_string(), Value::from("technique"));
        attributes.insert("year".to_string(), Value::from(2012));
        Glyph {
            name: "deep learning".to_string(),
            global_cortex: Vector::from_vec(vec![1.0, -1.0]),
            layers: vec![LayerVector {
                name: "semantic".to_string(),
                vector: Vector::from_vec(vec![0.5, 0.5]),
            }],
            attributes,
        }
    }

    #[test]
    fn test_surface_resolution() {
        let g = glyph();
        assert_eq!(g.surface(NEURAL_CORTEX), Some(&g.global_cortex));
        assert_eq!(g.surface(GLOBAL), Some(&g.global_cortex));
        assert_eq!(g.surface("semantic"), g.layer("semantic"));
        assert!(g.surface("missing").is_none());
    }

    #[test]
    fn test_matches_filters() {
        let g = glyph();
        let mut filters = BTreeMap::new();
        filters.insert("type".to_string(), Value::from("technique"));
        assert!(g.matches(&filters));

        filters.insert("year".to_string(), Value::from(2013));
        assert!(!g.matches(&filters));

        let empty: BTreeMap<String, Value> = BTreeMap::new();
        assert!(g.matches(&empty));
    }

    #[test]
    fn test_missing_filter_key_does_not_match() {
        let g = glyph();
        let mut filters = BTreeMap::new();
        filters.insert("domain".to_string(), Value::from("ai"));
        assert!(!g.matches(&filters));
    }
}
