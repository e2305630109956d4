//! Home-directory path expansion.

use std::path::PathBuf;

/// Expand a leading `~` to the user's home directory.
///
/// `~` and `~/...` expand; `~user/...` forms pass through unchanged, as does
/// any path without a home marker. When no home directory can be determined
/// the input is returned as-is.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_slash() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~/Music/song.mp3"), home.join("Music/song.mp3"));
    }

    #[test]
    fn test_expand_bare_tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~"), home);
    }

    #[test]
    fn test_no_expansion_for_plain_paths() {
        assert_eq!(expand_tilde("/tmp/a.wav"), PathBuf::from("/tmp/a.wav"));
        assert_eq!(expand_tilde("./a.wav"), PathBuf::from("./a.wav"));
    }

    #[test]
    fn test_no_expansion_for_named_user() {
        assert_eq!(
            expand_tilde("~alice/a.wav"),
            PathBuf::from("~alice/a.wav")
        );
    }
}
