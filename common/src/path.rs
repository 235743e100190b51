//! Slash-separated path helpers.

use std::path::{Path, PathBuf};

/// Resolve a sequence of segments into a single cleaned path.
///
/// Segments are processed left to right; an absolute segment (leading `/`)
/// discards everything before it. Empty segments are ignored and the joined
/// result is lexically cleaned. No non-empty segment yields `""`.
///
/// ```
/// use svc_common::path::resolve;
///
/// assert_eq!(resolve(&["rel/foo", "/abs/b", "c/./d", "e/f/.."]), "/abs/b/c/d/e");
/// ```
#[must_use]
pub fn resolve<S: AsRef<str>>(segments: &[S]) -> String {
    let mut kept: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        if segment.starts_with('/') {
            kept.clear();
        }
        kept.push(segment);
    }

    if kept.is_empty() {
        return String::new();
    }
    clean(&kept.join("/"))
}

/// Lexically clean a slash-separated path.
///
/// Collapses repeated slashes, drops `.` elements and resolves `..` against
/// the preceding element. A rooted path never climbs above `/`; an empty
/// result becomes `.`.
#[must_use]
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Walk up from `start` until a directory containing `Cargo.toml` is found.
///
/// Returns `None` when the filesystem root is reached without a match.
#[must_use]
pub fn seek_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("Cargo.toml").is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty() {
        let none: [&str; 0] = [];
        assert_eq!(resolve(&none), "");
        assert_eq!(resolve(&["", "", ""]), "");
    }

    #[test]
    fn test_resolve_relative_segments() {
        let segments = [
            "a/b", "./c/d", "e/./../f", "g", "", "../h/i", "j/..", "k/l/m/", "n",
        ];
        assert_eq!(resolve(&segments), "a/b/c/d/f/h/i/k/l/m/n");
    }

    #[test]
    fn test_resolve_keeps_whitespace() {
        assert_eq!(resolve(&[" a / b ", " c", " ", "d "]), " a / b / c/ /d ");
    }

    #[test]
    fn test_resolve_absolute_restarts() {
        assert_eq!(resolve(&["/abs/a", "b/c", "d"]), "/abs/a/b/c/d");
        assert_eq!(
            resolve(&["rel1/foo", "/abs1/a", "/abs2/b", "c/./d", "e/f/.."]),
            "/abs2/b/c/d/e"
        );
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("/../a"), "/a");
        assert_eq!(clean("../a/.."), "..");
        assert_eq!(clean("a/.."), ".");
        assert_eq!(clean("//x//y/"), "/x/y");
        assert_eq!(clean("/"), "/");
    }

    #[test]
    fn test_seek_project_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();
        let nested = dir.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(seek_project_root(&nested).as_deref(), Some(dir.path()));
    }
}
