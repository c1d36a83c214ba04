//! Path resolution and workspace containment.
//!
//! Every client-supplied path goes through [`PathResolver::resolve`] before
//! it touches the filesystem. Resolution follows `..` and symbolic links
//! first and only then checks the result against the root, so neither a
//! `../` sequence nor a planted symlink can leave the workspace.

use crate::error::SecurityError;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Name of the directory under the workspace root that holds sessions.
pub const SESSIONS_DIR: &str = ".sessions";

/// Resolves raw paths against a fixed, canonical root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for an existing directory.
    ///
    /// The root is canonicalized once here; it must exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    /// The canonical containment root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `raw` to a canonical absolute path inside the root.
    ///
    /// Relative input is joined to the root; absolute input is taken as
    /// given. Neither the target nor its parents are created.
    pub fn resolve(&self, raw: impl AsRef<Path>) -> Result<PathBuf, SecurityError> {
        let raw = raw.as_ref();
        let joined = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.root.join(raw)
        };

        let resolved = canonicalize_lenient(&joined)?;
        if !resolved.starts_with(&self.root) {
            return Err(SecurityError::path_violation(raw, &self.root));
        }
        Ok(resolved)
    }

    /// A resolver rooted at `dir`, which must itself resolve inside this root.
    pub fn scoped(&self, dir: impl AsRef<Path>) -> Result<Self, SecurityError> {
        let root = self.resolve(dir)?;
        Ok(Self { root })
    }

    /// Render `path` relative to the root, for listings.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|relative| relative.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string())
    }
}

/// Canonicalize the existing prefix of `path` and append the remainder.
///
/// Each component that exists on disk is canonicalized as soon as it is
/// appended, so symlinks are followed before any later `..` is applied.
/// Once a component is missing, the rest cannot be symlinks and is joined
/// lexically.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf, SecurityError> {
    let unresolvable = |source| SecurityError::Unresolvable {
        path: path.to_path_buf(),
        source,
    };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => {
                out.push(name);
                match std::fs::symlink_metadata(&out) {
                    Ok(_) => out = std::fs::canonicalize(&out).map_err(unresolvable)?,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(unresolvable(e)),
                }
            }
        }
    }
    Ok(out)
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
