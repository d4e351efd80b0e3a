/*!
 * Containment checks for names resolved below a root directory
 */

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BrowserError, Result};

/// Resolves relative names to files that are guaranteed to live under a root
#[derive(Debug, Clone)]
pub struct PathGuard {
    /// Canonical root directory
    root: PathBuf,
}

impl PathGuard {
    /// Create a guard for `root`, which must exist
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` to an existing path inside the root
    ///
    /// Symlinks and `..` are resolved before the containment check, so a
    /// name that only escapes through a link is rejected as well. Every
    /// failure is reported as the same `NotFound`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let name = name.replace('\\', "/");
        let candidate = self.root.join(name.trim_start_matches('/'));

        let resolved = fs::canonicalize(&candidate).map_err(|_| BrowserError::asset_not_found())?;
        if !resolved.starts_with(&self.root) {
            return Err(BrowserError::asset_not_found());
        }

        Ok(resolved)
    }

    /// Resolve `name` to a regular file inside the root
    pub fn resolve_file(&self, name: &str) -> Result<PathBuf> {
        let resolved = self.resolve(name)?;
        if !resolved.is_file() {
            return Err(BrowserError::asset_not_found());
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{self, Write};

    use tempfile::{tempdir, TempDir};

    // root/ with assets/ inside and secret.txt next to it
    fn setup() -> io::Result<(TempDir, PathGuard)> {
        let temp_dir = tempdir()?;
        let assets = temp_dir.path().join("assets");
        fs::create_dir_all(assets.join("css"))?;

        let mut css = File::create(assets.join("css").join("site.css"))?;
        writeln!(css, "body {{}}")?;
        let mut secret = File::create(temp_dir.path().join("secret.txt"))?;
        writeln!(secret, "top secret")?;

        let guard = PathGuard::new(&assets).map_err(io::Error::from)?;
        Ok((temp_dir, guard))
    }

    #[test]
    fn test_resolves_nested_file() -> io::Result<()> {
        let (_dir, guard) = setup()?;
        let path = guard.resolve_file("css/site.css").map_err(io::Error::from)?;
        assert!(path.starts_with(guard.root()));
        Ok(())
    }

    #[test]
    fn test_rejects_traversal() -> io::Result<()> {
        let (_dir, guard) = setup()?;
        for name in [
            "../secret.txt",
            "css/../../secret.txt",
            "..\\secret.txt",
            "/../secret.txt",
            "../../etc/passwd",
        ] {
            let err = guard.resolve_file(name).unwrap_err();
            assert!(err.is_not_found(), "{} should be rejected", name);
        }
        Ok(())
    }

    #[test]
    fn test_missing_and_escaping_look_the_same() -> io::Result<()> {
        let (_dir, guard) = setup()?;
        let missing = guard.resolve_file("nope.css").unwrap_err().to_string();
        let escaping = guard.resolve_file("../secret.txt").unwrap_err().to_string();
        assert_eq!(missing, escaping);
        assert!(!missing.contains("secret"));
        Ok(())
    }

    #[test]
    fn test_directory_is_not_a_file() -> io::Result<()> {
        let (_dir, guard) = setup()?;
        assert!(guard.resolve("css").is_ok());
        assert!(guard.resolve_file("css").is_err());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_escape() -> io::Result<()> {
        let (dir, guard) = setup()?;
        std::os::unix::fs::symlink(
            dir.path().join("secret.txt"),
            guard.root().join("innocent.css"),
        )?;
        std::os::unix::fs::symlink(dir.path(), guard.root().join("up"))?;

        assert!(guard.resolve_file("innocent.css").is_err());
        assert!(guard.resolve_file("up/secret.txt").is_err());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_allows_symlink_inside_root() -> io::Result<()> {
        let (_dir, guard) = setup()?;
        std::os::unix::fs::symlink(
            guard.root().join("css").join("site.css"),
            guard.root().join("alias.css"),
        )?;
        assert!(guard.resolve_file("alias.css").is_ok());
        Ok(())
    }
}
