//! Hypervector Generator - seeded token → vector mapping
//!
//! Procedure (reproducible from any language with SHA-256):
//! - digest = SHA-256("{seed}:{key}")
//! - block_i = SHA-256(digest || i as u32 little-endian), i = 0, 1, ...
//! - component j = +1 if bit (j mod 256) of block (j / 256) is set, else -1
//!   (bits read LSB-first within each byte)
//!
//! Vectors are memoised per generator. The cache tolerates concurrent
//! population: a racing duplicate computation yields the same vector and the
//! first insert wins.

use dashmap::DashMap;
use glyphh_core::Vector;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Bits produced by one SHA-256 block
const BLOCK_BITS: usize = 256;

/// Seeded hypervector source owning its own cache
pub struct HypervectorGenerator {
    dimension: usize,
    seed: u64,
    cache: DashMap<String, Arc<Vector>>,
}

impl HypervectorGenerator {
    pub fn new(dimension: usize, seed: u64) -> Self {
        Self {
            dimension,
            seed,
            cache: DashMap::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Bipolar vector for `key`, memoised
    pub fn vector_for(&self, key: &str) -> Arc<Vector> {
        if let Some(cached) = self.cache.get(key) {
            return Arc::clone(cached.value());
        }

        let vector = Arc::new(generate(self.dimension, self.seed, key));
        let entry = self.cache.entry(key.to_string()).or_insert(vector);
        Arc::clone(entry.value())
    }

    /// Number of memoised keys
    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl std::fmt::Debug for HypervectorGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HypervectorGenerator")
            .field("dimension", &self.dimension)
            .field("seed", &self.seed)
            .field("cached_keys", &self.cache.len())
            .finish()
    }
}

/// Uncached generation, a pure function of (dimension, seed, key)
pub fn generate(dimension: usize, seed: u64, key: &str) -> Vector {
    let digest = Sha256::digest(format!("{seed}:{key}").as_bytes());

    let mut components = Vec::with_capacity(dimension);
    let blocks = dimension.div_ceil(BLOCK_BITS);
    for counter in 0..blocks as u32 {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(counter.to_le_bytes());
        let block = hasher.finalize();

        for byte in block.iter() {
            for bit in 0..8 {
                if components.len() == dimension {
                    break;
                }
                components.push(if (byte >> bit) & 1 == 1 { 1.0 } else { -1.0 });
            }
        }
    }

    Vector::from_vec(components)
}
