//! Intent pattern and match types

use serde::{Deserialize, Serialize};

/// Named set of example phrases with the query they stand for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPattern {
    pub intent_type: String,
    pub example_phrases: Vec<String>,

    /// Opaque structured payload handed back on a match
    pub query_template: serde_json::Value,
}

impl IntentPattern {
    pub fn new<I, S>(intent_type: impl Into<String>, phrases: I, query_template: serde_json::Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            intent_type: intent_type.into(),
            example_phrases: phrases.into_iter().map(Into::into).collect(),
            query_template,
        }
    }
}

/// Nearest-prototype classification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMatch {
    /// `None` when nothing is registered or nothing scored above zero
    pub intent_type: Option<String>,

    /// Cosine similarity to the winning prototype
    pub confidence: f64,

    /// The winning pattern's query template
    pub structured_query: serde_json::Value,
}

impl IntentMatch {
    /// Zero-confidence match
    pub fn none() -> Self {
        Self {
            intent_type: None,
            confidence: 0.0,
            structured_query: serde_json::Value::Null,
        }
    }

    pub fn is_match(&self) -> bool {
        self.intent_type.is_some()
    }

    /// Threshold is chosen by the caller
    pub fn is_high_confidence(&self, threshold: f64) -> bool {
        self.is_match() && self.confidence >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_none_match() {
        let m = IntentMatch::none();
        assert!(!m.is_match());
        assert_eq!(m.confidence, 0.0);
        assert!(!m.is_high_confidence(0.0));
    }

    #[test]
    fn test_high_confidence_threshold() {
        let m = IntentMatch {
            intent_type: Some("emergency".to_string()),
            confidence: 0.62,
            structured_query: json!({"operation": "escalate"}),
        };
        assert!(m.is_high_confidence(0.5));
        assert!(!m.is_high_confidence(0.75));
    }

    #[test]
    fn test_pattern_new() {
        let p = IntentPattern::new("explain", ["what is", "describe"], json!({"operation": "fact_tree"}));
        assert_eq!(p.example_phrases, vec!["what is".to_string(), "describe".to_string()]);
    }
}
