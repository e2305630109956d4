//! Sandboxed loading of a single detected reference.
//!
//! Validation strictly precedes I/O: when a sandbox root is set, the path
//! that gets read is the canonicalized result of the containment check,
//! never the caller-influenced input. Every failure
//! mode collapses to `None` with a `debug!` diagnostic; nothing propagates
//! past this boundary, so one bad reference can never abort a batch.

use std::path::{Path, PathBuf};

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect::{DetectedReference, RefKind};
use crate::media::{MediaKind, MediaLoader};
use crate::sandbox::assert_in_sandbox;

/// Content type reported when the byte loader cannot determine one.
pub const FALLBACK_AUDIO_MIME: &str = "audio/mpeg";

/// An audio content block ready for a model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedContent {
    /// Fixed discriminator; always `"audio"`.
    #[serde(rename = "type")]
    pub content_type: String,
    /// The loaded bytes, base64-encoded.
    pub data: String,
    /// Best available content type, falling back to a generic audio type.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl LoadedContent {
    /// Package raw bytes as an audio content block.
    pub fn audio(buffer: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            content_type: "audio".to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(buffer),
            mime_type: mime_type.into(),
        }
    }
}

/// Per-load policy shared across a batch.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Bound on bytes read per file. Bounds read size only, not wall clock.
    pub max_bytes: Option<u64>,
    /// When set, every resolved path must canonicalize inside this root.
    pub sandbox_root: Option<PathBuf>,
}

/// Resolve, validate, and load one reference.
///
/// Returns `None` on any failure: remote reference, escape from the
/// sandbox, missing file, unreadable bytes, or a non-audio/video
/// classification. Failures are logged at debug level and surface upward
/// only as a skip count.
pub async fn load_audio_from_ref(
    reference: &DetectedReference,
    workspace_dir: &Path,
    options: &LoadOptions,
    loader: &dyn MediaLoader,
) -> Option<LoadedContent> {
    if reference.kind == RefKind::Url {
        debug!(raw = %reference.raw, "skipping remote reference, local files only");
        return None;
    }

    let mut path = PathBuf::from(&reference.resolved);
    if !path.is_absolute() {
        let base = options.sandbox_root.as_deref().unwrap_or(workspace_dir);
        path = base.join(path);
    }

    if let Some(root) = &options.sandbox_root {
        match assert_in_sandbox(&path, root, root).await {
            // The canonical result is authoritative from here on.
            Ok(checked) => path = checked.resolved,
            Err(err) => {
                debug!(raw = %reference.raw, error = %err, "skipping reference outside sandbox");
                return None;
            }
        }
    }

    if let Err(err) = tokio::fs::metadata(&path).await {
        debug!(path = %path.display(), error = %err, "skipping reference, stat failed");
        return None;
    }

    let media = match loader.load(&path, options.max_bytes).await {
        Ok(media) => media,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping reference, load failed");
            return None;
        }
    };

    // Video containers are accepted: they may carry the audio track the
    // analysis is after. Everything else is out.
    if !matches!(media.kind, MediaKind::Audio | MediaKind::Video) {
        debug!(path = %path.display(), kind = ?media.kind, "skipping non-audio media");
        return None;
    }

    let mime_type = media
        .content_type
        .unwrap_or_else(|| FALLBACK_AUDIO_MIME.to_string());
    Some(LoadedContent::audio(&media.buffer, mime_type))
}
