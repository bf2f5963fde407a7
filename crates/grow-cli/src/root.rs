use std::path::{Path, PathBuf};

/// Resolve the grow project root.
///
/// Priority:
/// 1. `--root` flag / `GROW_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.grow/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_project(&cwd).unwrap_or(cwd)
}

fn find_project(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(grow_core::paths::GROW_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_grow_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".grow")).unwrap();
        let deep = dir.path().join("site/pages/deep");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_project(&deep).unwrap(), dir.path());
    }

    #[test]
    fn no_project_above() {
        let dir = TempDir::new().unwrap();
        assert!(find_project(dir.path()).is_none());
    }
}
