//! Artifact payload layout
//!
//! Query templates are arbitrary JSON, which bincode cannot decode without a
//! schema, so they travel as JSON text.

use glyphh_core::{EncoderConfig, Glyph, IntentPattern, Result, SerializationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ModelPayload {
    pub name: String,
    pub version: String,
    pub config: EncoderConfig,
    pub glyphs: Vec<Glyph>,
    pub metadata: BTreeMap<String, String>,
    pub intents: Option<IntentSection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IntentSection {
    pub config: EncoderConfig,
    pub patterns: Vec<StoredPattern>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredPattern {
    pub intent_type: String,
    pub example_phrases: Vec<String>,
    pub query_template: String,
}

impl StoredPattern {
    pub fn from_pattern(pattern: &IntentPattern) -> Result<Self> {
        Ok(Self {
            intent_type: pattern.intent_type.clone(),
            example_phrases: pattern.example_phrases.clone(),
            query_template: serde_json::to_string(&pattern.query_template)
                .map_err(|e| SerializationError::Codec(e.to_string()))?,
        })
    }

    pub fn into_pattern(self) -> Result<IntentPattern> {
        let query_template = serde_json::from_str(&self.query_template)
            .map_err(|e| SerializationError::Codec(e.to_string()))?;
        Ok(IntentPattern {
            intent_type: self.intent_type,
            example_phrases: self.example_phrases,
            query_template,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_pattern_keeps_template() {
        let pattern = IntentPattern::new(
            "find_technique",
            ["find technique for"],
            json!({"operation": "similarity_search", "filters": {"type": "technique"}, "top_k": 5}),
        );
        let stored = StoredPattern::from_pattern(&pattern).unwrap();
        assert_eq!(stored.into_pattern().unwrap(), pattern);
    }

    #[test]
    fn test_bad_template_is_codec_error() {
        let stored = StoredPattern {
            intent_type: "x".to_string(),
            example_phrases: vec![],
            query_template: "{not json".to_string(),
        };
        assert!(stored.into_pattern().is_err());
    }
}
