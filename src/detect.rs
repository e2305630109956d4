//! Audio reference detection in free-form prompt text.
//!
//! Scans text with a fixed sequence of typed matchers, in precedence order:
//!
//! 1. **Structured marker** — `[media attached: <path>]` annotations written
//!    by an upstream attachment-rendering step. Most reliable, wins first.
//! 2. **`file://` URL** — converted to a plain filesystem path; malformed
//!    URLs drop that single match.
//! 3. **Bare path** — tokens starting with `./`, `../`, `~`, or `/`.
//!
//! Every candidate is gated by a recognized-extension set, duplicates are
//! collapsed case-insensitively on the matched text (first match wins), and
//! `http(s)` candidates are never emitted. Detection is pure: no I/O, no
//! failures, and malformed input just yields fewer matches.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ExtensionSet;
use crate::paths::expand_tilde;

/// Whether a reference names a local file or a remote resource.
///
/// The detector only ever emits [`RefKind::Path`]: remote `http(s)` tokens
/// are excluded at scan time, and `file://` matches are converted to plain
/// paths. [`RefKind::Url`] exists so callers that construct references from
/// other sources can mark them remote, which the loader refuses outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Path,
    Url,
}

/// A candidate audio reference found in text, not yet verified to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedReference {
    /// The exact substring matched in the source text, trimmed.
    pub raw: String,
    /// Local-path vs. remote classification.
    pub kind: RefKind,
    /// Best-effort resolved form: home expansion applied for `~` paths,
    /// `file://` URLs converted to plain paths, everything else unchanged.
    /// Full resolution happens in the loader, which knows the workspace.
    pub resolved: String,
    /// Index into a history-message sequence for references found outside
    /// the primary text. Currently always `None`; primary text only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_index: Option<usize>,
}

// ---------------------------------------------------------------------------
// Scan patterns (compiled once via LazyLock)
// ---------------------------------------------------------------------------

/// `[media attached: <content>]`, optionally with an `N/M` counter.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[media attached(?:\s+\d+\s*/\s*\d+)?\s*:\s*([^\]]*)\]").unwrap()
});

/// Marker bodies that only say how many files exist carry no path.
static FILES_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+\s+files?$").unwrap());

/// `file://` followed by non-whitespace, non-quote, non-bracket characters.
/// The extension gate is applied to the matched token afterwards.
static FILE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)file://[^\s"'()\[\]<>]+"#).unwrap());

/// Tokens starting with `./`, `../`, `~`, or `/`. A leading separator or
/// quote/paren character is matched but not captured into the token.
static BARE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s"'(\[<])((?:\.\.?/|~|/)[^\s"'()\[\]<>]*)"#).unwrap()
});

/// Detector with an injected recognized-extension set.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    extensions: ExtensionSet,
}

impl Detector {
    /// Create a detector gated by `extensions`.
    pub fn new(extensions: ExtensionSet) -> Self {
        Self { extensions }
    }

    /// Scan `text` and return the ordered, de-duplicated reference list.
    ///
    /// Deterministic and infallible; identical input yields identical output.
    pub fn detect(&self, text: &str) -> Vec<DetectedReference> {
        let mut refs = Vec::new();
        let mut seen = HashSet::new();

        // Pass 1: structured markers.
        for cap in MARKER_RE.captures_iter(text) {
            let content = cap[1].trim();
            if content.is_empty() || FILES_PLACEHOLDER_RE.is_match(content) {
                continue;
            }
            let Some(token) = marker_path_token(content) else {
                continue;
            };
            if is_remote(token) {
                continue;
            }
            if !self.extensions.matches_path(token) {
                continue;
            }
            if token.to_ascii_lowercase().starts_with("file://") {
                if let Some(path) = file_url_to_path(token) {
                    push_unique(&mut refs, &mut seen, token, path);
                }
            } else {
                push_unique(&mut refs, &mut seen, token, resolve_home(token));
            }
        }

        // Pass 2: file:// URLs anywhere in the text.
        for m in FILE_URL_RE.find_iter(text) {
            let token = m.as_str();
            if !self.extensions.matches_path(token) {
                continue;
            }
            // A malformed URL drops this single match, never the batch.
            if let Some(path) = file_url_to_path(token) {
                push_unique(&mut refs, &mut seen, token, path);
            }
        }

        // Pass 3: bare filesystem paths.
        for cap in BARE_PATH_RE.captures_iter(text) {
            let token = &cap[1];
            if !self.extensions.matches_path(token) {
                continue;
            }
            push_unique(&mut refs, &mut seen, token, resolve_home(token));
        }

        refs
    }
}

/// Detect audio references using the default extension set.
pub fn detect_audio_references(text: &str) -> Vec<DetectedReference> {
    static DEFAULT: LazyLock<Detector> = LazyLock::new(Detector::default);
    DEFAULT.detect(text)
}

/// Extract the leading path token from marker content: everything up to an
/// opening parenthesis, a pipe, or the end of the content.
fn marker_path_token(content: &str) -> Option<&str> {
    let token = match content.find(['(', '|']) {
        Some(idx) => &content[..idx],
        None => content,
    };
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn is_remote(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Convert a `file://` URL to a plain filesystem path.
fn file_url_to_path(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let path = url.to_file_path().ok()?;
    Some(path.to_string_lossy().into_owned())
}

/// Home expansion at detection time; other paths pass through unresolved.
fn resolve_home(raw: &str) -> String {
    if raw.starts_with('~') {
        expand_tilde(raw).to_string_lossy().into_owned()
    } else {
        raw.to_string()
    }
}

/// Append a reference unless its lowercase raw form was already emitted.
fn push_unique(
    refs: &mut Vec<DetectedReference>,
    seen: &mut HashSet<String>,
    raw: &str,
    resolved: String,
) {
    if seen.insert(raw.to_lowercase()) {
        refs.push(DetectedReference {
            raw: raw.to_string(),
            kind: RefKind::Path,
            resolved,
            origin_index: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== structured marker tests ====================

    #[test]
    fn test_marker_with_home_path() {
        let refs = detect_audio_references("check out [media attached: ~/Music/song.mp3]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "~/Music/song.mp3");
        assert_eq!(refs[0].kind, RefKind::Path);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                refs[0].resolved,
                home.join("Music/song.mp3").to_string_lossy()
            );
        }
    }

    #[test]
    fn test_marker_with_counter() {
        let refs = detect_audio_references("[media attached 1/2: /tmp/a.wav]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/tmp/a.wav");
    }

    #[test]
    fn test_marker_files_placeholder_skipped() {
        assert!(detect_audio_references("[media attached: 3 files]").is_empty());
        assert!(detect_audio_references("[media attached: 1 file]").is_empty());
    }

    #[test]
    fn test_marker_token_cut_at_paren() {
        let refs = detect_audio_references("[media attached: /tmp/a.mp3 (2.4 MB)]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/tmp/a.mp3");
    }

    #[test]
    fn test_marker_token_cut_at_pipe() {
        let refs = detect_audio_references("[media attached: /tmp/a.mp3 | transcribe me]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/tmp/a.mp3");
    }

    #[test]
    fn test_marker_unrecognized_extension_skipped() {
        assert!(detect_audio_references("[media attached: /tmp/photo.png]").is_empty());
    }

    #[test]
    fn test_marker_remote_url_skipped() {
        assert!(detect_audio_references("[media attached: https://x.com/a.mp3]").is_empty());
        assert!(detect_audio_references("[media attached: http://x.com/a.mp3]").is_empty());
    }

    #[test]
    fn test_marker_file_url_converted() {
        let refs = detect_audio_references("[media attached: file:///tmp/a.flac]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "file:///tmp/a.flac");
        assert_eq!(refs[0].resolved, "/tmp/a.flac");
    }

    // ==================== file:// URL tests ====================

    #[test]
    fn test_file_url_detected_and_converted() {
        let refs = detect_audio_references("play file:///tmp/a.wav now");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "file:///tmp/a.wav");
        assert_eq!(refs[0].resolved, "/tmp/a.wav");
    }

    #[test]
    fn test_file_url_percent_encoding_decoded() {
        let refs = detect_audio_references("file:///tmp/my%20song.mp3");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].resolved, "/tmp/my song.mp3");
    }

    #[test]
    fn test_file_url_duplicates_collapsed() {
        let refs = detect_audio_references("file:///tmp/a.wav and file:///tmp/a.wav");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].resolved, "/tmp/a.wav");
    }

    #[test]
    fn test_file_url_unrecognized_extension_skipped() {
        assert!(detect_audio_references("file:///tmp/a.txt").is_empty());
    }

    #[test]
    fn test_file_url_with_remote_host_dropped() {
        // to_file_path refuses a foreign host; the single match is dropped.
        assert!(detect_audio_references("file://evil.example/share/a.mp3").is_empty());
    }

    // ==================== bare path tests ====================

    #[test]
    fn test_bare_absolute_path() {
        let refs = detect_audio_references("listen to /home/me/audio/note.ogg please");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/home/me/audio/note.ogg");
        assert_eq!(refs[0].resolved, "/home/me/audio/note.ogg");
    }

    #[test]
    fn test_bare_relative_paths() {
        let refs = detect_audio_references("compare ./a.mp3 with ../b.opus");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].raw, "./a.mp3");
        assert_eq!(refs[1].raw, "../b.opus");
    }

    #[test]
    fn test_bare_path_in_quotes_and_parens() {
        let refs = detect_audio_references(r#"try "(/tmp/q.m4a)" or '/tmp/r.aac'"#);
        let raws: Vec<&str> = refs.iter().map(|r| r.raw.as_str()).collect();
        assert_eq!(raws, vec!["/tmp/q.m4a", "/tmp/r.aac"]);
    }

    #[test]
    fn test_bare_path_at_start_of_text() {
        let refs = detect_audio_references("/tmp/first.mp3 is the one");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/tmp/first.mp3");
    }

    #[test]
    fn test_bare_path_unrecognized_extension_skipped() {
        assert!(detect_audio_references("open /tmp/readme.txt").is_empty());
        assert!(detect_audio_references("open /tmp/song").is_empty());
    }

    #[test]
    fn test_plain_words_not_detected() {
        assert!(detect_audio_references("no references here at all").is_empty());
        assert!(detect_audio_references("").is_empty());
    }

    #[test]
    fn test_https_url_never_detected() {
        assert!(detect_audio_references("get https://cdn.example.com/track.mp3").is_empty());
    }

    // ==================== precedence and de-dup tests ====================

    #[test]
    fn test_marker_wins_over_bare_match_of_same_path() {
        // The bare-path pattern would also match the token inside the
        // marker; only one reference comes out, from the marker pass.
        let refs = detect_audio_references("[media attached: /tmp/a.mp3] and also /tmp/a.mp3");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/tmp/a.mp3");
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let refs = detect_audio_references("/tmp/Song.MP3 then /tmp/song.mp3");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/tmp/Song.MP3");
    }

    #[test]
    fn test_detection_order_is_marker_then_url_then_bare() {
        let text = "/tmp/bare.mp3 file:///tmp/url.mp3 [media attached: /tmp/marked.mp3]";
        let refs = detect_audio_references(text);
        let raws: Vec<&str> = refs.iter().map(|r| r.raw.as_str()).collect();
        assert_eq!(
            raws,
            vec!["/tmp/marked.mp3", "file:///tmp/url.mp3", "/tmp/bare.mp3"]
        );
    }

    #[test]
    fn test_detection_is_idempotent() {
        let text = "[media attached: ~/a.mp3] /tmp/b.wav file:///tmp/c.ogg";
        let first = detect_audio_references(text);
        let second = detect_audio_references(text);
        assert_eq!(first, second);
    }

    // ==================== injected extension set tests ====================

    #[test]
    fn test_custom_extension_set() {
        let detector = Detector::new(crate::config::ExtensionSet::new(["xyz"]));
        let refs = detector.detect("/tmp/a.xyz and /tmp/b.mp3");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/tmp/a.xyz");
    }

    #[test]
    fn test_origin_index_reserved() {
        let refs = detect_audio_references("/tmp/a.mp3");
        assert_eq!(refs[0].origin_index, None);
    }
}
