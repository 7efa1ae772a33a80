use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::with_root(discover_project_root())
    }

    pub fn with_root(project_root: PathBuf) -> Self {
        let log_dir = project_root.join("logs");
        let _ = fs::create_dir_all(&log_dir);

        AppPaths {
            project_root,
            log_dir,
        }
    }

    /// Resolves a configured path against the project root.
    pub fn resolve(&self, raw: &Path) -> PathBuf {
        if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.project_root.join(raw)
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("SURVEY_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    env::current_dir().unwrap_or(manifest_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_keeps_absolute_and_joins_relative() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_root(tmp.path().to_path_buf());

        assert_eq!(
            paths.resolve(Path::new("data/ques.txt")),
            tmp.path().join("data/ques.txt")
        );
        let absolute = tmp.path().join("elsewhere");
        assert_eq!(paths.resolve(&absolute), absolute);
        assert!(paths.log_dir.exists());
    }
}
