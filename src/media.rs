//! Media byte-loading primitive.
//!
//! [`MediaLoader`] is the seam between the reference-loading pipeline and the
//! filesystem: it reads a file's bytes, sniffs a content type, and classifies
//! the result as audio, video, image, or other. The default implementation is
//! [`FsMediaLoader`]; tests substitute their own implementations to inject
//! failures and classifications without touching disk.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncReadExt;

/// Errors from the byte-loading primitive.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("media file is empty: {0}")]
    Empty(String),
}

/// Coarse classification of loaded media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    Other,
}

impl MediaKind {
    /// Classify from a MIME type string.
    pub fn from_mime(mime: &str) -> Self {
        let lower = mime.to_lowercase();
        if lower.starts_with("audio/") {
            MediaKind::Audio
        } else if lower.starts_with("video/") {
            MediaKind::Video
        } else if lower.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Other
        }
    }
}

/// Result of a byte load: the raw buffer plus best-effort typing.
#[derive(Debug, Clone)]
pub struct LoadedMedia {
    /// Classification derived from the sniffed or inferred content type.
    pub kind: MediaKind,
    /// Sniffed content type, when one could be determined.
    pub content_type: Option<String>,
    /// The file's bytes, truncated at the byte cap when one was given.
    pub buffer: Vec<u8>,
}

/// Byte-loading seam consumed by the reference loader.
#[async_trait]
pub trait MediaLoader: Send + Sync {
    /// Read the file at `path`, bounding the read at `max_bytes` when given.
    async fn load(&self, path: &Path, max_bytes: Option<u64>) -> Result<LoadedMedia, MediaError>;
}

/// Filesystem-backed [`MediaLoader`].
///
/// Content type is determined by magic-byte sniffing first, then by an
/// extension table; files matching neither are classified [`MediaKind::Other`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMediaLoader;

#[async_trait]
impl MediaLoader for FsMediaLoader {
    async fn load(&self, path: &Path, max_bytes: Option<u64>) -> Result<LoadedMedia, MediaError> {
        let io_err = |source| MediaError::Io {
            path: path.display().to_string(),
            source,
        };

        let file = tokio::fs::File::open(path).await.map_err(io_err)?;
        let mut buffer = Vec::new();
        match max_bytes {
            // The cap bounds read size, not an error threshold: oversized
            // files are truncated, not rejected.
            Some(cap) => {
                file.take(cap).read_to_end(&mut buffer).await.map_err(io_err)?;
            }
            None => {
                let mut file = file;
                file.read_to_end(&mut buffer).await.map_err(io_err)?;
            }
        }

        if buffer.is_empty() {
            return Err(MediaError::Empty(path.display().to_string()));
        }

        let content_type = sniff_content_type(&buffer).or_else(|| extension_content_type(path));
        let kind = content_type
            .as_deref()
            .map(MediaKind::from_mime)
            .unwrap_or(MediaKind::Other);

        Ok(LoadedMedia {
            kind,
            content_type,
            buffer,
        })
    }
}

/// Sniff a content type from leading magic bytes.
fn sniff_content_type(buffer: &[u8]) -> Option<String> {
    let mime = if buffer.starts_with(b"ID3") {
        "audio/mpeg"
    } else if buffer.len() >= 2 && buffer[0] == 0xFF && (buffer[1] & 0xE0) == 0xE0 {
        // Bare MPEG audio frame sync.
        "audio/mpeg"
    } else if buffer.starts_with(b"RIFF") && buffer.get(8..12) == Some(b"WAVE".as_slice()) {
        "audio/wav"
    } else if buffer.starts_with(b"OggS") {
        "audio/ogg"
    } else if buffer.starts_with(b"fLaC") {
        "audio/flac"
    } else if buffer.get(4..8) == Some(b"ftyp".as_slice()) {
        match buffer.get(8..12) {
            Some(b"M4A ") | Some(b"M4B ") => "audio/mp4",
            _ => "video/mp4",
        }
    } else if buffer.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        "video/webm"
    } else if buffer.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if buffer.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        return None;
    };
    Some(mime.to_string())
}

/// Map a file extension to a content type when sniffing fails.
fn extension_content_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "mp3" | "mpga" => "audio/mpeg",
        "wav" => "audio/wav",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "mpeg" => "video/mpeg",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(mime.to_string())
}
