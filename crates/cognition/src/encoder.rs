//! Encoder - schema + concept → glyph
//!
//! For each role whose name matches an attribute key:
//!   bound = role("role:{layer}:{segment}:{role}") ⊙ filler("value:{canonical}")
//! weighted by the role weight and summed per segment; segments sum into a
//! layer vector scaled by the layer weight; layers sum into the global cortex.
//!
//! Attributes without a matching role stay on the glyph for filtering only.
//! A value without a canonical token (NaN, ±inf) is skipped with a warning.

use glyphh_core::{
    Concept, EncoderConfig, EncodingError, Glyph, GlyphhError, LayerVector, Result, Value, Vector,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::generator::HypervectorGenerator;

/// Implicit layer used when the schema declares none
pub const SCHEMALESS_LAYER: &str = "default";

/// Implicit segment used when the schema declares none
pub const SCHEMALESS_SEGMENT: &str = "attributes";

/// Attribute skipped during encoding
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingWarning {
    pub attribute: String,
    pub error: EncodingError,
}

/// What an encode call did with each attribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeReport {
    /// `layer/segment/role` paths that contributed
    pub matched_roles: Vec<String>,

    /// Attribute keys with no schema role
    pub unmatched_attributes: Vec<String>,

    pub warnings: Vec<EncodingWarning>,
}

/// Schema compiler; owns its generator cache
#[derive(Debug, Clone)]
pub struct Encoder {
    config: Arc<EncoderConfig>,
    generator: Arc<HypervectorGenerator>,
}

impl Encoder {
    /// Validate `config` and create a fresh generator for it
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let generator = Arc::new(HypervectorGenerator::new(config.dimension, config.seed));
        Ok(Self {
            config: Arc::new(config),
            generator,
        })
    }

    /// Share an existing generator (same dimension and seed required)
    pub fn with_generator(config: EncoderConfig, generator: Arc<HypervectorGenerator>) -> Result<Self> {
        config.validate()?;
        if generator.dimension() != config.dimension || generator.seed() != config.seed {
            return Err(GlyphhError::Configuration(
                glyphh_core::ConfigurationError::Invalid(format!(
                    "generator ({}, seed {}) does not match config ({}, seed {})",
                    generator.dimension(),
                    generator.seed(),
                    config.dimension,
                    config.seed
                )),
            ));
        }
        Ok(Self {
            config: Arc::new(config),
            generator,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn generator(&self) -> &Arc<HypervectorGenerator> {
        &self.generator
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Encode a concept into a glyph
    pub fn encode(&self, concept: &Concept) -> Result<Glyph> {
        self.encode_with_report(concept).map(|(glyph, _)| glyph)
    }

    /// Encode and report matched / unmatched / skipped attributes
    pub fn encode_with_report(&self, concept: &Concept) -> Result<(Glyph, EncodeReport)> {
        let mut report = EncodeReport::default();

        // Canonicalise each attribute once
        let mut tokens: BTreeMap<&str, String> = BTreeMap::new();
        for (key, value) in &concept.attributes {
            match value.canonical() {
                Ok(token) => {
                    tokens.insert(key.as_str(), token);
                }
                Err(error) => {
                    warn!(
                        "Skipping attribute '{}' of concept '{}': {}",
                        key, concept.name, error
                    );
                    report.warnings.push(EncodingWarning {
                        attribute: key.clone(),
                        error,
                    });
                }
            }
        }

        let dimension = self.dimension();
        let mut global_cortex = Vector::zeros(dimension);
        let mut layers = Vec::new();

        if self.config.is_schemaless() {
            let mut segment = Vector::zeros(dimension);
            for (key, token) in &tokens {
                let bound = self.bind_role(SCHEMALESS_LAYER, SCHEMALESS_SEGMENT, key, token)?;
                segment.add_scaled(&bound, 1.0)?;
                report
                    .matched_roles
                    .push(format!("{SCHEMALESS_LAYER}/{SCHEMALESS_SEGMENT}/{key}"));
            }
            global_cortex.add_scaled(&segment, 1.0)?;
            layers.push(LayerVector {
                name: SCHEMALESS_LAYER.to_string(),
                vector: segment,
            });
        } else {
            let mut role_names = HashSet::new();
            for layer in &self.config.layers {
                let mut layer_vector = Vector::zeros(dimension);
                for segment in &layer.segments {
                    let mut segment_vector = Vector::zeros(dimension);
                    for role in &segment.roles {
                        role_names.insert(role.name.as_str());
                        let Some(token) = tokens.get(role.name.as_str()) else {
                            continue;
                        };
                        let bound = self.bind_role(&layer.name, &segment.name, &role.name, token)?;
                        segment_vector.add_scaled(&bound, role.similarity_weight as f32)?;
                        report
                            .matched_roles
                            .push(format!("{}/{}/{}", layer.name, segment.name, role.name));
                    }
                    layer_vector.add_scaled(&segment_vector, 1.0)?;
                }
                layer_vector.scale(layer.similarity_weight as f32);
                global_cortex.add_scaled(&layer_vector, 1.0)?;
                layers.push(LayerVector {
                    name: layer.name.clone(),
                    vector: layer_vector,
                });
            }

            report.unmatched_attributes = concept
                .attributes
                .keys()
                .filter(|key| !role_names.contains(key.as_str()))
                .cloned()
                .collect();
        }

        if report.matched_roles.is_empty() {
            debug!("Concept '{}' matched no roles; glyph is the zero vector", concept.name);
        } else {
            debug!(
                "Encoded '{}' ({} roles, {} unmatched)",
                concept.name,
                report.matched_roles.len(),
                report.unmatched_attributes.len()
            );
        }

        let glyph = Glyph {
            name: concept.name.clone(),
            global_cortex,
            layers,
            attributes: concept.attributes.clone(),
        };
        Ok((glyph, report))
    }

    /// `role ⊙ filler` for one attribute
    fn bind_role(&self, layer: &str, segment: &str, role: &str, token: &str) -> Result<Vector> {
        let role_vector = self.role_vector(layer, segment, role);
        let filler = self.generator.vector_for(&format!("value:{token}"));
        Ok(role_vector.bind(&filler)?)
    }

    pub fn role_vector(&self, layer: &str, segment: &str, role: &str) -> Arc<Vector> {
        self.generator
            .vector_for(&format!("role:{layer}:{segment}:{role}"))
    }

    /// Filler vector for a value
    pub fn filler(&self, value: &Value) -> std::result::Result<Arc<Vector>, EncodingError> {
        let token = value.canonical()?;
        Ok(self.generator.vector_for(&format!("value:{token}")))
    }

    /// Free text as one pseudo-attribute: `role:{role_key}` bound to the bag of its word tokens
    pub fn encode_text(&self, role_key: &str, text: &str) -> Result<Vector> {
        let dimension = self.dimension();
        let mut filler = Vector::zeros(dimension);
        for token in tokenize(text) {
            let token_vector = self.generator.vector_for(&format!("token:{token}"));
            filler.add_scaled(&token_vector, 1.0)?;
        }
        let role = self.generator.vector_for(&format!("role:{role_key}"));
        Ok(role.bind(&filler)?)
    }
}

impl Default for Encoder {
    /// Encoder for `EncoderConfig::default()`, which always validates
    fn default() -> Self {
        let config = EncoderConfig::default();
        let generator = Arc::new(HypervectorGenerator::new(config.dimension, config.seed));
        Self {
            config: Arc::new(config),
            generator,
        }
    }
}

/// Lower-cased alphanumeric words longer than one character
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() > 1)
        .map(str::to_string)
        .collect()
}
