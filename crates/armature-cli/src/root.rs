use std::path::{Path, PathBuf};

/// Resolve the armature root directory.
///
/// Priority:
/// 1. `--root` flag / `ARMATURE_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing `.armature/`
/// 3. Nearest ancestor of `cwd` containing `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    for marker in [".armature", ".git"] {
        if let Some(found) = nearest_ancestor_with(&cwd, marker) {
            return found;
        }
    }
    cwd
}

fn nearest_ancestor_with(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn ancestor_search_finds_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".armature")).unwrap();
        let deep = dir.path().join("src/deep");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(
            nearest_ancestor_with(&deep, ".armature"),
            Some(dir.path().to_path_buf())
        );
    }

    #[test]
    fn ancestor_search_misses_cleanly() {
        let dir = TempDir::new().unwrap();
        assert_eq!(nearest_ancestor_with(dir.path(), ".armature"), None);
    }
}
