//! `.glyphh` artifact codec
//!
//! Layout:
//! - 4 bytes magic `GLYH`
//! - bincode `ArtifactHeader` (version, flags, glyph count, creation time, SHA-256 of the payload)
//! - bincode payload
//!
//! Files are written to `<path>.tmp` and renamed into place, so a reader
//! never observes a partially written artifact.

use bincode::Options;
use chrono::{DateTime, Utc};
use glyphh_core::SerializationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Magic bytes for format identification
pub const MAGIC: [u8; 4] = *b"GLYH";

/// Current format version
pub const FORMAT_VERSION: u32 = 1;

/// Payload carries intent patterns
pub const FLAG_INTENTS: u32 = 1;

/// Upper bound on the encoded header size
pub const MAX_HEADER_BYTES: u64 = 1024;

type Result<T> = std::result::Result<T, SerializationError>;

/// `bincode::serialize` wire format, bounded by `limit` bytes
fn bounded(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}

/// Artifact header, readable without decoding the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub flags: u32,
    pub glyph_count: u64,
    pub created_at: DateTime<Utc>,

    /// SHA-256 over the payload bytes
    pub checksum: [u8; 32],
}

impl ArtifactHeader {
    pub fn new(flags: u32, glyph_count: u64, payload: &[u8]) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            flags,
            glyph_count,
            created_at: Utc::now(),
            checksum: Sha256::digest(payload).into(),
        }
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(SerializationError::UnsupportedVersion(self.format_version));
        }
        Ok(())
    }

    fn verify(&self, payload: &[u8]) -> Result<()> {
        let actual: [u8; 32] = Sha256::digest(payload).into();
        if actual != self.checksum {
            return Err(SerializationError::ChecksumMismatch);
        }
        Ok(())
    }
}

fn codec_error(error: bincode::Error) -> SerializationError {
    match *error {
        bincode::ErrorKind::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            SerializationError::Truncated
        }
        other => SerializationError::Codec(other.to_string()),
    }
}

/// Serialize `payload` into a complete artifact
pub fn encode<T: Serialize>(payload: &T, flags: u32, glyph_count: u64) -> Result<Vec<u8>> {
    let body = bincode::serialize(payload).map_err(codec_error)?;
    let header = ArtifactHeader::new(flags, glyph_count, &body);
    let header_bytes = bincode::serialize(&header).map_err(codec_error)?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + header_bytes.len() + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&header_bytes);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Split an artifact into its validated header and the payload bytes
fn split(bytes: &[u8]) -> Result<(ArtifactHeader, &[u8])> {
    if bytes.len() < MAGIC.len() {
        return Err(SerializationError::Truncated);
    }
    if bytes[..MAGIC.len()] != MAGIC {
        return Err(SerializationError::InvalidMagic);
    }

    let mut rest = &bytes[MAGIC.len()..];
    let header: ArtifactHeader = bounded(MAX_HEADER_BYTES)
        .deserialize_from(&mut rest)
        .map_err(codec_error)?;
    header.validate()?;
    Ok((header, rest))
}

/// Header only, without checksum verification
pub fn read_header(bytes: &[u8]) -> Result<ArtifactHeader> {
    split(bytes).map(|(header, _)| header)
}

/// Validate and decode a complete artifact
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<(ArtifactHeader, T)> {
    let (header, body) = split(bytes)?;
    header.verify(body)?;
    let payload = bounded(body.len() as u64)
        .deserialize(body)
        .map_err(codec_error)?;
    debug!(
        "Decoded artifact v{} ({} glyphs, {} bytes)",
        header.format_version,
        header.glyph_count,
        bytes.len()
    );
    Ok((header, payload))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `bytes` to `path` atomically
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let temp = temp_path(path);

    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&temp, path)
    })();

    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Async twin of [`write_atomic`]
pub async fn write_atomic_async(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let temp = temp_path(path);

    let written: std::io::Result<()> = async {
        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        tokio::fs::rename(&temp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

pub async fn read_file_async(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(tokio::fs::read(path).await?)
}
