//! Filesystem containment assertion.
//!
//! Canonicalizes a candidate path and verifies it stays inside a sandbox
//! root. The check runs on the fully resolved path (symlinks followed,
//! `.`/`..` eliminated), so traversal and symlink escapes are rejected, and
//! the canonical result is returned for callers to use for all subsequent
//! I/O in place of the caller-influenced input path.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from the containment check.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("path does not exist: {0}")]
    NotFound(String),

    #[error("path escapes sandbox root {root}: {path}")]
    OutsideRoot { path: String, root: String },

    #[error("failed to canonicalize {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A path that passed the containment check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxedPath {
    /// The canonical absolute path. This is the authoritative handle: I/O
    /// must go through it, never through the pre-validation input.
    pub resolved: PathBuf,
}

/// Canonicalize `file_path` and require it to live inside `root`.
///
/// Relative input is resolved against `cwd` first. Both the candidate and
/// the root are canonicalized before the containment comparison, which is
/// component-wise rather than a string prefix check.
pub async fn assert_in_sandbox(
    file_path: &Path,
    cwd: &Path,
    root: &Path,
) -> Result<SandboxedPath, SandboxError> {
    let absolute = if file_path.is_absolute() {
        file_path.to_path_buf()
    } else {
        cwd.join(file_path)
    };

    let resolved = canonicalize(&absolute).await?;
    let canonical_root = canonicalize(root).await?;

    if !resolved.starts_with(&canonical_root) {
        return Err(SandboxError::OutsideRoot {
            path: resolved.display().to_string(),
            root: canonical_root.display().to_string(),
        });
    }

    Ok(SandboxedPath { resolved })
}

async fn canonicalize(path: &Path) -> Result<PathBuf, SandboxError> {
    tokio::fs::canonicalize(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SandboxError::NotFound(path.display().to_string())
        } else {
            SandboxError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })
}
