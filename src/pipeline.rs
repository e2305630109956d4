//! Batch orchestration: capability gate, detect, load, count.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect::{detect_audio_references, Detector};
use crate::load::{load_audio_from_ref, LoadOptions, LoadedContent};
use crate::media::MediaLoader;

/// Model descriptor consulted by the capability gate.
///
/// Mirrors the catalog shape upstream model registries publish: an optional
/// list of accepted input modalities (`"text"`, `"image"`, `"audio"`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<String>>,
}

/// Returns `true` when the model's declared inputs include audio.
///
/// A declared `image` modality is treated as a proxy for general multimodal
/// capability and also qualifies. That is an approximation inherited from
/// upstream catalogs, not a guarantee the model accepts audio blocks.
pub fn model_supports_audio(model: &ModelInfo) -> bool {
    model
        .input
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|m| m.eq_ignore_ascii_case("audio") || m.eq_ignore_ascii_case("image"))
}

/// Parameters for [`detect_and_load_prompt_audio`].
#[derive(Debug, Clone, Default)]
pub struct DetectAndLoadParams {
    /// The prompt text to scan. Conversation history is not scanned.
    pub text: String,
    /// Descriptor of the model the content is destined for.
    pub model: ModelInfo,
    /// Base for resolving relative references when no sandbox root is set.
    pub workspace_dir: PathBuf,
    /// Content carried over from prior turns, placed first in the result.
    pub existing_audio: Vec<LoadedContent>,
    /// Per-file read cap, shared across the batch.
    pub max_bytes: Option<u64>,
    /// Containment boundary, shared across the batch.
    pub sandbox_root: Option<PathBuf>,
}

/// Accumulated result of one detect-and-load pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioBatch {
    /// Carried-over content first, then newly loaded items in detection order.
    pub audio: Vec<LoadedContent>,
    /// References that produced a content block.
    pub loaded_count: usize,
    /// References that were skipped; with `loaded_count`, partitions the
    /// detected set exactly.
    pub skipped_count: usize,
}

/// Detect audio references in prompt text and load each through the sandbox.
///
/// Gates on model capability before doing any detection work. When nothing
/// is detected the carried-over content passes through untouched with zero
/// counts, distinguishing "nothing to do" from "everything failed". One
/// failed reference never affects its siblings.
pub async fn detect_and_load_prompt_audio(
    params: DetectAndLoadParams,
    loader: &dyn MediaLoader,
) -> AudioBatch {
    detect_and_load_with(params, loader, None).await
}

/// Same as [`detect_and_load_prompt_audio`] with an injected detector.
pub async fn detect_and_load_with(
    params: DetectAndLoadParams,
    loader: &dyn MediaLoader,
    detector: Option<&Detector>,
) -> AudioBatch {
    if !model_supports_audio(&params.model) {
        debug!("model does not accept audio input, skipping detection");
        return AudioBatch::default();
    }

    let references = match detector {
        Some(detector) => detector.detect(&params.text),
        None => detect_audio_references(&params.text),
    };
    if references.is_empty() {
        return AudioBatch {
            audio: params.existing_audio,
            loaded_count: 0,
            skipped_count: 0,
        };
    }

    let options = LoadOptions {
        max_bytes: params.max_bytes,
        sandbox_root: params.sandbox_root,
    };

    let mut batch = AudioBatch {
        audio: params.existing_audio,
        loaded_count: 0,
        skipped_count: 0,
    };
    for reference in &references {
        match load_audio_from_ref(reference, &params.workspace_dir, &options, loader).await {
            Some(content) => {
                batch.audio.push(content);
                batch.loaded_count += 1;
            }
            None => batch.skipped_count += 1,
        }
    }

    debug!(
        detected = references.len(),
        loaded = batch.loaded_count,
        skipped = batch.skipped_count,
        "prompt audio batch complete"
    );
    batch
}
