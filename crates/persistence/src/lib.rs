//! Glyphh Persistence - artifact storage
//!
//! - Artifact codec: magic + header + bincode payload, checksummed
//! - Atomic writes (temp file, then rename), sync and async
//! - ModelStore: named artifacts under a directory

pub mod artifact;
pub mod store;

pub use artifact::{
    decode, encode, read_file, read_file_async, read_header, write_atomic, write_atomic_async,
    ArtifactHeader, FLAG_INTENTS, FORMAT_VERSION, MAGIC,
};
pub use store::{FileModelStore, ModelStore, Result, StoreError, ARTIFACT_EXTENSION};
