//! GlyphhModel - glyph index with search and artifact export
//!
//! Glyphs are kept in insertion order and keyed by concept name; re-encoding
//! an existing name replaces the glyph in place. Search ranks by cosine on
//! the global cortex, ties keeping insertion order.

use glyphh_cognition::{Encoder, IntentEncoder, SimilarityCalculator, SimilarityScore};
use glyphh_core::{
    Concept, ConfigurationError, EncoderConfig, Glyph, GlyphhError, IntentMatch, Result,
    SerializationError, SimilarityResult, Vector,
};
use glyphh_persistence::{self as persistence, ModelStore, FLAG_INTENTS};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::payload::{IntentSection, ModelPayload, StoredPattern};
use crate::query::{Query, SearchFilters};

pub const DEFAULT_MODEL_NAME: &str = "glyphh_model";
pub const DEFAULT_MODEL_VERSION: &str = "1.0.0";

/// Encoded concept collection
#[derive(Debug, Clone)]
pub struct GlyphhModel {
    name: String,
    version: String,
    encoder: Encoder,
    glyphs: Vec<Glyph>,
    index: HashMap<String, usize>,
    metadata: BTreeMap<String, String>,
    intent_encoder: Option<IntentEncoder>,
}

impl GlyphhModel {
    /// Empty model for `config`
    pub fn new(config: EncoderConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> GlyphhModelBuilder {
        GlyphhModelBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config(&self) -> &EncoderConfig {
        self.encoder.config()
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Encode `concept` and upsert its glyph
    pub fn encode(&mut self, concept: &Concept) -> Result<&Glyph> {
        let glyph = self.encoder.encode(concept)?;
        let position = self.upsert(glyph);
        Ok(&self.glyphs[position])
    }

    /// Upsert a pre-encoded glyph
    pub fn insert_glyph(&mut self, glyph: Glyph) -> Result<()> {
        self.check_dimension(glyph.dimension())?;
        self.upsert(glyph);
        Ok(())
    }

    fn upsert(&mut self, glyph: Glyph) -> usize {
        match self.index.get(&glyph.name) {
            Some(&position) => {
                debug!("Replacing glyph '{}'", glyph.name);
                self.glyphs[position] = glyph;
                position
            }
            None => {
                let position = self.glyphs.len();
                self.index.insert(glyph.name.clone(), position);
                self.glyphs.push(glyph);
                position
            }
        }
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        let expected = self.config().dimension;
        if actual != expected {
            return Err(ConfigurationError::DimensionMismatch { expected, actual }.into());
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Glyph> {
        self.index.get(name).map(|&i| &self.glyphs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Glyph> {
        let position = self.index.remove(name)?;
        let glyph = self.glyphs.remove(position);
        for index in self.index.values_mut() {
            if *index > position {
                *index -= 1;
            }
        }
        Some(glyph)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyphs in insertion order
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn intent_encoder(&self) -> Option<&IntentEncoder> {
        self.intent_encoder.as_ref()
    }

    pub fn intent_encoder_mut(&mut self) -> Option<&mut IntentEncoder> {
        self.intent_encoder.as_mut()
    }

    pub fn set_intent_encoder(&mut self, intent_encoder: IntentEncoder) {
        self.intent_encoder = Some(intent_encoder);
    }

    /// Classify `query`; a zero-confidence match when no intents are attached
    pub fn match_intent(&self, query: &str) -> Result<IntentMatch> {
        match &self.intent_encoder {
            Some(intents) => intents.match_intent(query),
            None => Ok(IntentMatch::none()),
        }
    }

    /// Score two stored glyphs; `None` if either name is unknown
    pub fn compare(&self, a: &str, b: &str, edge_type: &str) -> Result<Option<SimilarityScore>> {
        let (Some(a), Some(b)) = (self.get(a), self.get(b)) else {
            return Ok(None);
        };
        SimilarityCalculator::new()
            .compute_similarity(a, b, edge_type)
            .map(Some)
    }

    /// Top `top_k` glyphs passing `filters`, best first
    ///
    /// `top_k == 0` and an empty model give an empty list.
    pub fn similarity_search(
        &self,
        query: impl Into<Query>,
        top_k: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<SimilarityResult>> {
        if top_k == 0 || self.glyphs.is_empty() {
            debug!("Search skipped (top_k {}, {} glyphs)", top_k, self.glyphs.len());
            return Ok(Vec::new());
        }

        let probe = self.probe(query.into())?;
        self.check_dimension(probe.len())?;

        let candidates: Vec<&Glyph> = self.glyphs.iter().filter(|g| filters.matches(g)).collect();

        #[cfg(feature = "parallel")]
        let mut scored = candidates
            .par_iter()
            .map(|g| Ok((*g, probe.cosine(&g.global_cortex)?)))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let mut scored = candidates
            .iter()
            .map(|g| Ok((*g, probe.cosine(&g.global_cortex)?)))
            .collect::<Result<Vec<_>>>()?;

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        debug!(
            "Search over {} of {} glyphs returned {}",
            candidates.len(),
            self.glyphs.len(),
            scored.len()
        );

        Ok(scored
            .into_iter()
            .map(|(glyph, score)| SimilarityResult {
                concept: glyph.name.clone(),
                score,
                attributes: glyph.attributes.clone(),
            })
            .collect())
    }

    fn probe(&self, query: Query) -> Result<Vector> {
        match query {
            Query::Text(text) => Ok(self.encoder.encode(&self.text_concept(&text))?.global_cortex),
            Query::Concept(concept) => Ok(self.encoder.encode(&concept)?.global_cortex),
            Query::Glyph(glyph) => Ok(glyph.global_cortex),
            Query::Vector(vector) => Ok(vector),
        }
    }

    /// Pseudo-concept with `text` under every role key
    fn text_concept(&self, text: &str) -> Concept {
        let keys: Vec<String> = if self.config().is_schemaless() {
            self.glyphs
                .iter()
                .flat_map(|g| g.attributes.keys().cloned())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        } else {
            self.config().role_names().into_iter().map(str::to_string).collect()
        };

        let mut concept = Concept::new(text);
        for key in keys {
            concept.set(key, text);
        }
        concept
    }

    pub(crate) fn to_payload(&self) -> Result<ModelPayload> {
        let intents = match &self.intent_encoder {
            Some(intents) => Some(IntentSection {
                config: intents.encoder().config().clone(),
                patterns: intents
                    .get_patterns()
                    .into_iter()
                    .map(StoredPattern::from_pattern)
                    .collect::<Result<Vec<_>>>()?,
            }),
            None => None,
        };

        Ok(ModelPayload {
            name: self.name.clone(),
            version: self.version.clone(),
            config: self.config().clone(),
            glyphs: self.glyphs.clone(),
            metadata: self.metadata.clone(),
            intents,
        })
    }

    fn from_payload(payload: ModelPayload) -> Result<Self> {
        let intent_encoder = match payload.intents {
            Some(section) => {
                let mut intents = IntentEncoder::new(section.config)?;
                for pattern in section.patterns {
                    intents.add_pattern(pattern.into_pattern()?)?;
                }
                Some(intents)
            }
            None => None,
        };

        let mut builder = Self::builder()
            .name(payload.name)
            .version(payload.version)
            .config(payload.config)
            .glyphs(payload.glyphs);
        builder.metadata = payload.metadata;
        builder.intent_encoder = intent_encoder;
        builder.build()
    }

    /// Serialize the full model into one artifact
    pub fn export(&self) -> Result<Vec<u8>> {
        let flags = if self.intent_encoder.is_some() { FLAG_INTENTS } else { 0 };
        let bytes = persistence::encode(&self.to_payload()?, flags, self.glyphs.len() as u64)?;
        info!(
            "Exported model '{}' ({} glyphs, {} bytes)",
            self.name,
            self.glyphs.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Rebuild a model from [`export`](Self::export) output
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let (header, payload): (_, ModelPayload) = persistence::decode(bytes)?;
        let model = Self::from_payload(payload).map_err(|e| match e {
            GlyphhError::Serialization(e) => GlyphhError::Serialization(e),
            other => SerializationError::InvalidContent(other.to_string()).into(),
        })?;
        info!(
            "Loaded model '{}' v{} ({} glyphs, format {})",
            model.name, model.version, model.glyphs.len(), header.format_version
        );
        Ok(model)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(persistence::write_atomic(path, &self.export()?)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&persistence::read_file(path)?)
    }

    pub async fn to_file_async(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.export()?;
        Ok(persistence::write_atomic_async(path, &bytes).await?)
    }

    pub async fn from_file_async(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&persistence::read_file_async(path).await?)
    }

    /// Save under the model's name
    pub async fn save_to<S: ModelStore + ?Sized>(&self, store: &S) -> Result<()> {
        let bytes = self.export()?;
        Ok(store.save(&self.name, &bytes).await?)
    }

    pub async fn load_from<S: ModelStore + ?Sized>(store: &S, name: &str) -> Result<Self> {
        Self::load(&store.load(name).await?)
    }
}

/// Keyword-style constructor
#[derive(Debug, Default)]
pub struct GlyphhModelBuilder {
    name: Option<String>,
    version: Option<String>,
    config: Option<EncoderConfig>,
    glyphs: Vec<Glyph>,
    metadata: BTreeMap<String, String>,
    intent_encoder: Option<IntentEncoder>,
}

impl GlyphhModelBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn config(mut self, config: EncoderConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn glyphs(mut self, glyphs: impl IntoIterator<Item = Glyph>) -> Self {
        self.glyphs.extend(glyphs);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn intent_encoder(mut self, intent_encoder: IntentEncoder) -> Self {
        self.intent_encoder = Some(intent_encoder);
        self
    }

    /// Validate the config and index the glyphs (later duplicates win, first position kept)
    pub fn build(self) -> Result<GlyphhModel> {
        let encoder = match self.config {
            Some(config) => Encoder::new(config)?,
            None => Encoder::default(),
        };

        let mut model = GlyphhModel {
            name: self.name.unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            version: self.version.unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
            encoder,
            glyphs: Vec::with_capacity(self.glyphs.len()),
            index: HashMap::with_capacity(self.glyphs.len()),
            metadata: self.metadata,
            intent_encoder: self.intent_encoder,
        };
        for glyph in self.glyphs {
            model.insert_glyph(glyph)?;
        }
        if model.name.is_empty() {
            return Err(GlyphhError::Configuration(ConfigurationError::EmptyName("model")));
        }
        Ok(model)
    }
}
