//! Intent Encoder - nearest-prototype phrase classification
//!
//! Every example phrase is encoded as one pseudo-attribute (the bag of its
//! word tokens bound to the `intent:phrase` role), normalised, and summed
//! into a prototype per pattern. A query is encoded the same way and matched
//! to the prototype with the highest cosine.

use glyphh_core::{EncoderConfig, IntentMatch, IntentPattern, Result, Vector};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::encoder::Encoder;

/// Role key phrases and queries are bound to
pub const PHRASE_ROLE: &str = "intent:phrase";

#[derive(Debug, Clone)]
struct Entry {
    pattern: IntentPattern,
    prototype: Vector,
}

/// Registered patterns and their prototypes
#[derive(Debug, Clone)]
pub struct IntentEncoder {
    encoder: Encoder,
    entries: Vec<Entry>,
}

impl IntentEncoder {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        Ok(Self::with_encoder(Encoder::new(config)?))
    }

    pub fn with_encoder(encoder: Encoder) -> Self {
        Self {
            encoder,
            entries: Vec::new(),
        }
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Register a pattern; an existing `intent_type` is replaced in place
    pub fn add_pattern(&mut self, pattern: IntentPattern) -> Result<()> {
        let prototype = self.prototype(&pattern)?;
        let entry = Entry { pattern, prototype };

        match self
            .entries
            .iter_mut()
            .find(|e| e.pattern.intent_type == entry.pattern.intent_type)
        {
            Some(existing) => {
                warn!("Replacing intent pattern '{}'", entry.pattern.intent_type);
                *existing = entry;
            }
            None => {
                debug!(
                    "Added intent pattern '{}' ({} phrases)",
                    entry.pattern.intent_type,
                    entry.pattern.example_phrases.len()
                );
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    /// Seed the built-in query intents
    pub fn add_defaults(&mut self) -> Result<()> {
        for pattern in default_patterns() {
            self.add_pattern(pattern)?;
        }
        info!("Loaded {} default intent patterns", self.entries.len());
        Ok(())
    }

    /// Patterns in registration order
    pub fn get_patterns(&self) -> Vec<&IntentPattern> {
        self.entries.iter().map(|e| &e.pattern).collect()
    }

    pub fn remove_pattern(&mut self, intent_type: &str) -> Option<IntentPattern> {
        let index = self
            .entries
            .iter()
            .position(|e| e.pattern.intent_type == intent_type)?;
        Some(self.entries.remove(index).pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arg-max over the registered prototypes; a null match only when none are registered
    pub fn match_intent(&self, query: &str) -> Result<IntentMatch> {
        Ok(self
            .rank_intents(query, 1)?
            .into_iter()
            .next()
            .unwrap_or_else(IntentMatch::none))
    }

    /// Top `k` patterns, best first; ties keep registration order
    pub fn rank_intents(&self, query: &str, k: usize) -> Result<Vec<IntentMatch>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let encoded = self.encoder.encode_text(PHRASE_ROLE, query)?;
        if encoded.is_zero() {
            // every prototype scores 0.0, the first registered pattern wins
            debug!("Query '{}' has no usable tokens", query);
        }

        let mut matches = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            matches.push(IntentMatch {
                intent_type: Some(entry.pattern.intent_type.clone()),
                confidence: encoded.cosine(&entry.prototype)?,
                structured_query: entry.pattern.query_template.clone(),
            });
        }
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matches.truncate(k);
        Ok(matches)
    }

    fn prototype(&self, pattern: &IntentPattern) -> Result<Vector> {
        let mut prototype = Vector::zeros(self.encoder.dimension());
        for phrase in &pattern.example_phrases {
            let encoded = self.encoder.encode_text(PHRASE_ROLE, phrase)?;
            if !encoded.is_zero() {
                prototype.add_scaled(&encoded.normalized(), 1.0)?;
            }
        }
        if prototype.is_zero() {
            warn!(
                "Intent pattern '{}' has no usable phrases and will never match",
                pattern.intent_type
            );
        }
        Ok(prototype)
    }
}

impl Default for IntentEncoder {
    fn default() -> Self {
        Self::with_encoder(Encoder::default())
    }
}

fn default_patterns() -> Vec<IntentPattern> {
    vec![
        IntentPattern::new(
            "find_similar",
            [
                "find similar to",
                "what is similar to",
                "show me things like",
                "related to",
                "similar concepts",
            ],
            json!({"operation": "similarity_search", "top_k": 5}),
        ),
        IntentPattern::new(
            "predict_next",
            [
                "predict what comes after",
                "what happens next",
                "next state",
                "forecast",
                "what will follow",
            ],
            json!({"operation": "predict", "steps": 1}),
        ),
        IntentPattern::new(
            "count_concepts",
            [
                "how many concepts",
                "count the concepts",
                "number of concepts",
                "how many are there",
            ],
            json!({"operation": "count"}),
        ),
        IntentPattern::new(
            "list_concepts",
            [
                "list all concepts",
                "show all concepts",
                "what concepts exist",
                "list everything",
            ],
            json!({"operation": "list"}),
        ),
        IntentPattern::new(
            "compare_concepts",
            [
                "compare",
                "difference between",
                "how does differ from",
                "versus",
            ],
            json!({"operation": "compare"}),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> IntentEncoder {
        IntentEncoder::new(EncoderConfig::schemaless(10_000, 42).unwrap()).unwrap()
    }

    fn ticket_patterns(intents: &mut IntentEncoder) {
        intents
            .add_pattern(IntentPattern::new(
                "billing_issue",
                ["charged twice", "wrong amount", "refund request", "invoice problem"],
                json!({"operation": "route", "team": "Finance Support"}),
            ))
            .unwrap();
        intents
            .add_pattern(IntentPattern::new(
                "access_issue",
                ["can't log in", "password not working", "account locked", "reset password"],
                json!({"operation": "route", "team": "Account Services"}),
            ))
            .unwrap();
    }

    #[test]
    fn test_no_patterns_zero_confidence() {
        let intents = encoder();
        let m = intents.match_intent("anything at all").unwrap();
        assert!(!m.is_match());
        assert_eq!(m.confidence, 0.0);
    }

    #[test]
    fn test_matches_nearest_prototype() {
        let mut intents = encoder();
        ticket_patterns(&mut intents);

        let m = intents.match_intent("I was charged twice for my invoice").unwrap();
        assert_eq!(m.intent_type.as_deref(), Some("billing_issue"));
        assert_eq!(m.structured_query["team"], "Finance Support");
        assert!(m.confidence > 0.0 && m.confidence <= 1.0);

        let m = intents.match_intent("my account is locked, reset password").unwrap();
        assert_eq!(m.intent_type.as_deref(), Some("access_issue"));
    }

    #[test]
    fn test_unrelated_query_does_not_match() {
        let mut intents = encoder();
        ticket_patterns(&mut intents);
        let m = intents.match_intent("zebra giraffe").unwrap();
        assert!(!m.is_high_confidence(0.5));
    }

    #[test]
    fn test_registered_patterns_always_yield_arg_max() {
        let mut intents = encoder();
        ticket_patterns(&mut intents);

        // no usable tokens: every prototype ties at zero
        let m = intents.match_intent("!!! ???").unwrap();
        assert_eq!(m.intent_type.as_deref(), Some("billing_issue"));
        assert_eq!(m.confidence, 0.0);
        assert!(!m.is_high_confidence(0.5));

        let ranked = intents.rank_intents("zebra giraffe", 5).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        assert_eq!(intents.match_intent("zebra giraffe").unwrap(), ranked[0]);
    }

    #[test]
    fn test_replacing_pattern_keeps_position() {
        let mut intents = encoder();
        ticket_patterns(&mut intents);
        intents
            .add_pattern(IntentPattern::new(
                "billing_issue",
                ["payment failed"],
                json!({"operation": "route"}),
            ))
            .unwrap();

        let patterns = intents.get_patterns();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].intent_type, "billing_issue");
        assert_eq!(patterns[0].example_phrases, vec!["payment failed".to_string()]);
    }

    #[test]
    fn test_defaults() {
        let mut intents = encoder();
        intents.add_defaults().unwrap();
        let names: Vec<_> = intents
            .get_patterns()
            .iter()
            .map(|p| p.intent_type.clone())
            .collect();
        assert_eq!(
            names,
            vec!["find_similar", "predict_next", "count_concepts", "list_concepts", "compare_concepts"]
        );

        let m = intents.match_intent("find similar to machine learning").unwrap();
        assert_eq!(m.intent_type.as_deref(), Some("find_similar"));
        let m = intents.match_intent("how many concepts are there").unwrap();
        assert_eq!(m.intent_type.as_deref(), Some("count_concepts"));
    }

    #[test]
    fn test_rank_intents_sorted() {
        let mut intents = encoder();
        intents.add_defaults().unwrap();
        let ranked = intents.rank_intents("list all concepts and compare", 3).unwrap();
        assert!(!ranked.is_empty() && ranked.len() <= 3);
        assert!(ranked.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_remove_pattern() {
        let mut intents = encoder();
        ticket_patterns(&mut intents);
        assert!(intents.remove_pattern("billing_issue").is_some());
        assert!(intents.remove_pattern("billing_issue").is_none());
        assert_eq!(intents.len(), 1);
    }

    #[test]
    fn test_deterministic_across_instances() {
        let mut a = encoder();
        let mut b = encoder();
        ticket_patterns(&mut a);
        ticket_patterns(&mut b);
        let query = "refund for wrong amount";
        assert_eq!(a.match_intent(query).unwrap(), b.match_intent(query).unwrap());
    }
}
