//! promptaudio
//!
//! Detects references to audio files embedded in free-form prompt text
//! (bare paths, home-relative paths, `file://` URLs, and structured
//! `[media attached: ...]` markers), then resolves, sandbox-validates, and
//! loads each one into a base64 content block a multimodal model call can
//! consume. Malformed, remote, unsupported, or out-of-sandbox references
//! are skipped without aborting the batch.
//!
//! # Example
//!
//! ```ignore
//! use promptaudio::{detect_and_load_prompt_audio, DetectAndLoadParams, FsMediaLoader, ModelInfo};
//!
//! let params = DetectAndLoadParams {
//!     text: "transcribe ~/recordings/meeting.mp3".to_string(),
//!     model: ModelInfo { input: Some(vec!["text".into(), "audio".into()]) },
//!     workspace_dir: std::env::current_dir()?,
//!     ..Default::default()
//! };
//! let batch = detect_and_load_prompt_audio(params, &FsMediaLoader).await;
//! println!("loaded {} / skipped {}", batch.loaded_count, batch.skipped_count);
//! ```

pub mod config;
pub mod detect;
pub mod load;
pub mod logging;
pub mod media;
pub mod paths;
pub mod pipeline;
pub mod sandbox;

// Re-export the library surface.
pub use config::{ExtensionSet, DEFAULT_AUDIO_EXTENSIONS};
pub use detect::{detect_audio_references, DetectedReference, Detector, RefKind};
pub use load::{load_audio_from_ref, LoadOptions, LoadedContent, FALLBACK_AUDIO_MIME};
pub use media::{FsMediaLoader, LoadedMedia, MediaError, MediaKind, MediaLoader};
pub use pipeline::{
    detect_and_load_prompt_audio, detect_and_load_with, model_supports_audio, AudioBatch,
    DetectAndLoadParams, ModelInfo,
};
pub use sandbox::{assert_in_sandbox, SandboxError, SandboxedPath};
