//! Project-root containment for file and command tools

use std::io;
use std::path::{Component, Path, PathBuf};

/// A canonical directory that tools may not leave
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRoot {
    root: PathBuf,
}

impl ScopedRoot {
    /// Canonicalize `root`. The directory must exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a path relative to the root.
    ///
    /// Returns `None` for absolute paths, for `..` climbing above the root,
    /// and for paths whose nearest existing ancestor resolves outside the
    /// root through a symlink.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let mut normalized = PathBuf::new();

        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return None;
                    }
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        let candidate = self.root.join(&normalized);
        let existing = candidate.ancestors().find(|p| p.exists())?;
        let canonical = existing.canonicalize().ok()?;

        canonical.starts_with(&self.root).then_some(candidate)
    }
}
