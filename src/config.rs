//! Recognized-extension configuration.
//!
//! Every detected candidate is gated by an [`ExtensionSet`] before it is
//! emitted. The set is an immutable value injected at detector construction
//! rather than a process-wide global, so deployments can override the
//! recognized list in configuration without touching detection logic.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The default set of recognized audio-bearing extensions.
///
/// `mp4` and `webm` are included even though they are containers that may
/// hold video: an audio-only payload inside either is common, and downstream
/// classification still decides what was actually loaded.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "aac", "flac", "ogg", "opus", "m4a", "mp4", "mpeg", "mpga", "webm",
];

/// Immutable, case-insensitive set of recognized file extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExtensionSet {
    extensions: HashSet<String>,
}

impl ExtensionSet {
    /// Build a set from arbitrary extension strings.
    ///
    /// Entries are lowercased and stripped of any leading dot, so
    /// `"MP3"`, `".mp3"` and `"mp3"` all produce the same entry.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// Returns `true` if `ext` (without a dot) is recognized.
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(&ext.to_lowercase())
    }

    /// Returns `true` if the path-like token ends in a recognized extension.
    pub fn matches_path(&self, token: &str) -> bool {
        Path::new(token)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.contains(e))
    }

    /// Number of recognized extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns `true` if the set is empty (nothing will ever be detected).
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIO_EXTENSIONS.iter().copied())
    }
}

impl From<Vec<String>> for ExtensionSet {
    fn from(extensions: Vec<String>) -> Self {
        Self::new(extensions)
    }
}

impl From<ExtensionSet> for Vec<String> {
    fn from(set: ExtensionSet) -> Self {
        let mut out: Vec<String> = set.extensions.into_iter().collect();
        out.sort();
        out
    }
}
