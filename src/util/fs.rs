//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Files in `dir` matching a glob `pattern` (e.g. `*.h`), sorted.
///
/// A missing directory yields no files.
pub fn glob_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full = format!("{}/{}", escaped, pattern);

    let mut files: Vec<PathBuf> = glob::glob(&full)
        .with_context(|| format!("invalid glob pattern: {}", full))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("semaphore.h"), "").unwrap();
        fs::write(tmp.path().join("multiprocess.h"), "").unwrap();
        fs::write(tmp.path().join("multiprocess.c"), "").unwrap();

        let headers = glob_files(tmp.path(), "*.h").unwrap();
        let names: Vec<_> = headers
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["multiprocess.h", "semaphore.h"]);
    }

    #[test]
    fn test_glob_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(glob_files(&tmp.path().join("absent"), "*.h").unwrap().is_empty());
    }

    #[test]
    fn test_ensure_dir_nested() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("build/temp");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
