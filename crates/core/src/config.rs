//! Encoder schema configuration
//!
//! Layer → Segment → Role tree plus the vector width and seed. Loaded from
//! YAML or built in code; always validated before an encoder accepts it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ConfigurationError, GlyphhError, Result};

/// Environment variable overriding the configured dimension
pub const ENV_DIMENSION: &str = "GLYPHH_DIMENSION";

/// Environment variable overriding the configured seed
pub const ENV_SEED: &str = "GLYPHH_SEED";

fn default_dimension() -> usize {
    10_000
}

fn default_seed() -> u64 {
    42
}

fn default_weight() -> f64 {
    1.0
}

/// Encoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Vector width
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Seed for the hypervector generator
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Ordered layers; empty means schemaless encoding
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            seed: default_seed(),
            layers: Vec::new(),
        }
    }
}

impl EncoderConfig {
    /// Build and validate a configuration
    pub fn new(dimension: usize, seed: u64, layers: Vec<LayerConfig>) -> Result<Self> {
        let config = Self {
            dimension,
            seed,
            layers,
        };
        config.validate()?;
        Ok(config)
    }

    /// Schemaless configuration (no declared layers)
    pub fn schemaless(dimension: usize, seed: u64) -> Result<Self> {
        Self::new(dimension, seed, Vec::new())
    }

    /// Parse from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: EncoderConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GlyphhError::Io)?;
        Self::from_yaml_str(&content)
    }

    /// Apply `GLYPHH_DIMENSION` / `GLYPHH_SEED` overrides
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(ENV_DIMENSION) {
            self.dimension = raw.trim().parse().map_err(|_| {
                ConfigurationError::Invalid(format!("{ENV_DIMENSION}={raw} is not an integer"))
            })?;
        }
        if let Ok(raw) = std::env::var(ENV_SEED) {
            self.seed = raw.trim().parse().map_err(|_| {
                ConfigurationError::Invalid(format!("{ENV_SEED}={raw} is not an integer"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check dimension, names and weights
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.dimension == 0 {
            return Err(ConfigurationError::InvalidDimension(self.dimension));
        }

        let mut layer_names = HashSet::new();
        for layer in &self.layers {
            if layer.name.is_empty() {
                return Err(ConfigurationError::EmptyName("layer"));
            }
            if !layer_names.insert(layer.name.as_str()) {
                return Err(ConfigurationError::DuplicateLayer(layer.name.clone()));
            }
            check_weight(&layer.name, layer.similarity_weight)?;

            let mut segment_names = HashSet::new();
            for segment in &layer.segments {
                if segment.name.is_empty() {
                    return Err(ConfigurationError::EmptyName("segment"));
                }
                if !segment_names.insert(segment.name.as_str()) {
                    return Err(ConfigurationError::DuplicateSegment {
                        layer: layer.name.clone(),
                        segment: segment.name.clone(),
                    });
                }

                let mut role_names = HashSet::new();
                for role in &segment.roles {
                    if role.name.is_empty() {
                        return Err(ConfigurationError::EmptyName("role"));
                    }
                    if !role_names.insert(role.name.as_str()) {
                        return Err(ConfigurationError::DuplicateRole {
                            layer: layer.name.clone(),
                            segment: segment.name.clone(),
                            role: role.name.clone(),
                        });
                    }
                    let path = format!("{}/{}/{}", layer.name, segment.name, role.name);
                    check_weight(&path, role.similarity_weight)?;
                }
            }
        }

        Ok(())
    }

    pub fn is_schemaless(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Distinct role names in schema order
    pub fn role_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.layers
            .iter()
            .flat_map(|l| l.segments.iter())
            .flat_map(|s| s.roles.iter())
            .map(|r| r.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

fn check_weight(path: &str, weight: f64) -> std::result::Result<(), ConfigurationError> {
    if !weight.is_finite() {
        return Err(ConfigurationError::NonFiniteWeight(path.to_string()));
    }
    if weight < 0.0 {
        return Err(ConfigurationError::NegativeWeight {
            path: path.to_string(),
            weight,
        });
    }
    Ok(())
}

/// One layer of the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,

    #[serde(default = "default_weight")]
    pub similarity_weight: f64,

    #[serde(default)]
    pub segments: Vec<SegmentConfig>,
}

impl LayerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            similarity_weight: default_weight(),
            segments: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.similarity_weight = weight;
        self
    }

    pub fn with_segment(mut self, segment: SegmentConfig) -> Self {
        self.segments.push(segment);
        self
    }
}

/// Ordered group of roles inside a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub name: String,

    #[serde(default)]
    pub roles: Vec<Role>,
}

impl SegmentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }
}

/// Attribute slot; matched against concept attribute keys by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,

    #[serde(default = "default_weight")]
    pub similarity_weight: f64,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self::weighted(name, default_weight())
    }

    pub fn weighted(name: impl Into<String>, similarity_weight: f64) -> Self {
        Self {
            name: name.into(),
            similarity_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit_layer() -> LayerConfig {
        LayerConfig::new("audit").with_segment(
            SegmentConfig::new("event")
                .with_role(Role::weighted("action", 1.0))
                .with_role(Role::weighted("actor", 0.8)),
        )
    }

    #[test]
    fn test_default_config() {
        let config = EncoderConfig::default();
        assert_eq!(config.dimension, 10_000);
        assert_eq!(config.seed, 42);
        assert!(config.is_schemaless());
    }

    #[test]
    fn test_rejects_zero_dimension() {
        let err = EncoderConfig::new(0, 42, vec![]).unwrap_err();
        assert!(matches!(
            err,
            GlyphhError::Configuration(ConfigurationError::InvalidDimension(0))
        ));
    }

    #[test]
    fn test_rejects_duplicate_role() {
        let layer = LayerConfig::new("audit").with_segment(
            SegmentConfig::new("event")
                .with_role(Role::new("action"))
                .with_role(Role::new("action")),
        );
        let err = EncoderConfig::new(64, 1, vec![layer]).unwrap_err();
        assert!(matches!(
            err,
            GlyphhError::Configuration(ConfigurationError::DuplicateRole { .. })
        ));
    }

    #[test]
    fn test_same_role_in_two_segments_is_allowed() {
        let layer = LayerConfig::new("audit")
            .with_segment(SegmentConfig::new("a").with_role(Role::new("actor")))
            .with_segment(SegmentConfig::new("b").with_role(Role::new("actor")));
        let config = EncoderConfig::new(64, 1, vec![layer]).unwrap();
        assert_eq!(config.role_names(), vec!["actor"]);
    }

    #[test]
    fn test_rejects_negative_weight() {
        let layer = LayerConfig::new("audit")
            .with_segment(SegmentConfig::new("event").with_role(Role::weighted("x", -0.1)));
        let err = EncoderConfig::new(64, 1, vec![layer]).unwrap_err();
        assert!(matches!(
            err,
            GlyphhError::Configuration(ConfigurationError::NegativeWeight { .. })
        ));

        let err = EncoderConfig::new(64, 1, vec![audit_layer().with_weight(f64::NAN)]).unwrap_err();
        assert!(matches!(
            err,
            GlyphhError::Configuration(ConfigurationError::NonFiniteWeight(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_layer() {
        let err = EncoderConfig::new(64, 1, vec![audit_layer(), audit_layer()]).unwrap_err();
        assert!(matches!(
            err,
            GlyphhError::Configuration(ConfigurationError::DuplicateLayer(_))
        ));
    }

    #[test]
    fn test_from_yaml_applies_defaults() {
        let yaml = r#"
dimension: 2048
seed: 7
layers:
  - name: audit
    segments:
      - name: event
        roles:
          - name: action
          - name: actor
            similarity_weight: 0.8
"#;
        let config = EncoderConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.dimension, 2048);
        assert_eq!(config.seed, 7);
        let layer = config.layer("audit").unwrap();
        assert_eq!(layer.similarity_weight, 1.0);
        assert_eq!(layer.segments[0].roles[0].similarity_weight, 1.0);
        assert_eq!(layer.segments[0].roles[1].similarity_weight, 0.8);
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        std::fs::write(&path, "seed: 9\n").unwrap();
        let config = EncoderConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.dimension, 10_000);
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(EncoderConfig::from_yaml_str("dimension: 0").is_err());
        assert!(EncoderConfig::from_yaml_str("dimension: [").is_err());
    }
}
