//! Dense hypervector algebra
//!
//! Bipolar multiplicative algebra:
//! - bind: element-wise product (self-inverse on ±1 components)
//! - bundle: weighted sum
//! - permute: cyclic shift, the "one step forward" marker for sequences
//! - similarity: cosine, in [-1, 1]

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Fixed-width numeric vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(Vec<f32>);

impl Vector {
    /// All-zero vector of the given width
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    pub fn from_vec(components: Vec<f32>) -> Self {
        Self(components)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// True when every component is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| *c == 0.0)
    }

    fn check_len(&self, other: &Vector) -> Result<(), ConfigurationError> {
        if self.len() != other.len() {
            return Err(ConfigurationError::DimensionMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// Element-wise product
    pub fn bind(&self, other: &Vector) -> Result<Vector, ConfigurationError> {
        self.check_len(other)?;
        Ok(Vector(
            self.0.iter().zip(&other.0).map(|(a, b)| a * b).collect(),
        ))
    }

    /// `self += other * weight`
    pub fn add_scaled(&mut self, other: &Vector, weight: f32) -> Result<(), ConfigurationError> {
        self.check_len(other)?;
        for (acc, c) in self.0.iter_mut().zip(&other.0) {
            *acc += c * weight;
        }
        Ok(())
    }

    pub fn scale(&mut self, factor: f32) {
        for c in &mut self.0 {
            *c *= factor;
        }
    }

    pub fn dot(&self, other: &Vector) -> Result<f64, ConfigurationError> {
        self.check_len(other)?;
        Ok(self
            .0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| f64::from(*a) * f64::from(*b))
            .sum())
    }

    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|c| f64::from(*c) * f64::from(*c))
            .sum::<f64>()
            .sqrt()
    }

    /// Unit-length copy; the zero vector stays zero
    pub fn normalized(&self) -> Vector {
        let norm = self.norm();
        if norm == 0.0 {
            return self.clone();
        }
        let inv = (1.0 / norm) as f32;
        Vector(self.0.iter().map(|c| c * inv).collect())
    }

    /// Cyclic shift right by `positions` (negative shifts left)
    pub fn permute(&self, positions: i64) -> Vector {
        let len = self.len();
        if len == 0 {
            return self.clone();
        }
        let shift = positions.rem_euclid(len as i64) as usize;
        let mut out = self.0.clone();
        out.rotate_right(shift);
        Vector(out)
    }

    /// Snap every component to ±1 (zero maps to +1)
    pub fn to_bipolar(&self) -> Vector {
        Vector(
            self.0
                .iter()
                .map(|c| if *c < 0.0 { -1.0 } else { 1.0 })
                .collect(),
        )
    }

    /// Cosine similarity in [-1, 1]; 0.0 when either side is the zero vector
    pub fn cosine(&self, other: &Vector) -> Result<f64, ConfigurationError> {
        let dot = self.dot(other)?;
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok((dot / denom).clamp(-1.0, 1.0))
    }
}

impl From<Vec<f32>> for Vector {
    fn from(components: Vec<f32>) -> Self {
        Self(components)
    }
}

/// Weighted sum of equally sized vectors
pub fn bundle<'a, I>(dimension: usize, items: I) -> Result<Vector, ConfigurationError>
where
    I: IntoIterator<Item = (&'a Vector, f32)>,
{
    let mut acc = Vector::zeros(dimension);
    for (vector, weight) in items {
        acc.add_scaled(vector, weight)?;
    }
    Ok(acc)
}
