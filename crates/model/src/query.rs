//! Search inputs

use glyphh_core::{Attributes, Concept, Glyph, Value, Vector};
use serde::{Deserialize, Serialize};

/// What to search with
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Free text, assigned to every role key before encoding
    Text(String),
    Concept(Concept),
    Glyph(Glyph),
    /// Raw vector compared against global cortices
    Vector(Vector),
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Text(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Text(text)
    }
}

impl From<Concept> for Query {
    fn from(concept: Concept) -> Self {
        Query::Concept(concept)
    }
}

impl From<Glyph> for Query {
    fn from(glyph: Glyph) -> Self {
        Query::Glyph(glyph)
    }
}

impl From<Vector> for Query {
    fn from(vector: Vector) -> Self {
        Query::Vector(vector)
    }
}

/// Exact-match attribute filters, all must hold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters(Attributes);

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn matches(&self, glyph: &Glyph) -> bool {
        glyph.matches(&self.0)
    }
}

impl From<Attributes> for SearchFilters {
    fn from(attributes: Attributes) -> Self {
        Self(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from() {
        assert_eq!(Query::from("deep learning"), Query::Text("deep learning".to_string()));
        assert!(matches!(Query::from(Concept::new("c")), Query::Concept(_)));
        assert!(matches!(Query::from(Vector::zeros(4)), Query::Vector(_)));
    }

    #[test]
    fn test_filters_builder() {
        let filters = SearchFilters::new().with("type", "technique").with("year", 2012);
        assert_eq!(filters.len(), 2);
        assert!(!filters.is_empty());
        assert!(SearchFilters::default().is_empty());
    }
}
