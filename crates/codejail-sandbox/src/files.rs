//! Workspace file operations.
//!
//! Every operation resolves its path through the workspace [`PathResolver`]
//! first; nothing here touches a path the resolver has not accepted.

use crate::error::SandboxError;
use crate::Result;
use base64::Engine;
use codejail_core::PathResolver;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use walkdir::WalkDir;

/// One directory-listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name.
    pub name: String,

    /// Path relative to the workspace root.
    pub path: String,

    /// Whether the entry is a directory.
    pub is_dir: bool,

    /// Size in bytes.
    pub size: u64,

    /// Last modification time, Unix seconds.
    pub modified_at: i64,
}

/// Encoding of `content` in a write request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentEncoding {
    #[default]
    Utf8,
    Base64,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Base64 => "base64",
        }
    }

    /// Turn request content into the bytes to store.
    pub fn decode(&self, content: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(content.as_bytes().to_vec()),
            Self::Base64 => base64::engine::general_purpose::STANDARD
                .decode(content.trim())
                .map_err(|e| SandboxError::Encoding {
                    encoding: self.as_str().to_string(),
                    message: e.to_string(),
                }),
        }
    }
}

impl FromStr for ContentEncoding {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "base64" => Ok(Self::Base64),
            other => Err(SandboxError::invalid_request(format!(
                "unsupported encoding '{}', expected utf-8 or base64",
                other
            ))),
        }
    }
}

/// File operations confined to the workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceFiles {
    resolver: PathResolver,
}

impl WorkspaceFiles {
    /// Create file operations over the given resolver.
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// The workspace resolver.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// List the immediate children of a directory, sorted by name.
    ///
    /// `None` or an empty path lists the workspace root.
    pub async fn list(&self, raw: Option<&str>) -> Result<Vec<FileEntry>> {
        let dir = self.resolver.resolve(raw.unwrap_or(""))?;
        let metadata = match tokio::fs::metadata(&dir).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SandboxError::NotFound(dir))
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(SandboxError::NotADirectory(dir));
        }

        let mut items = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // Follow links for size and type, fall back to the link itself when dangling
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(m) => m,
                Err(_) => entry.metadata().await?,
            };
            let modified_at = metadata
                .modified()
                .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp())
                .unwrap_or_default();

            items.push(FileEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: self.resolver.relative(&path),
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified_at,
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));

        debug!("Listed {} entries in {}", items.len(), dir.display());
        Ok(items)
    }

    /// Read a regular file.
    ///
    /// A missing path and a directory are both [`SandboxError::NotFound`].
    pub async fn read(&self, raw: &str) -> Result<Vec<u8>> {
        let path = self.resolver.resolve(raw)?;
        match tokio::fs::metadata(&path).await {
            Ok(m) if m.is_file() => {}
            Ok(_) => return Err(SandboxError::NotFound(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SandboxError::NotFound(path))
            }
            Err(e) => return Err(e.into()),
        }
        Ok(tokio::fs::read(&path).await?)
    }

    /// Write a file, creating parent directories. Returns the absolute path.
    pub async fn write(&self, raw: &str, content: &str, encoding: ContentEncoding) -> Result<PathBuf> {
        let path = self.resolver.resolve(raw)?;
        if path == self.resolver.root() {
            return Err(SandboxError::invalid_request("cannot write to the workspace root"));
        }
        let bytes = encoding.decode(content)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Delete a file, or a directory recursively. Returns the absolute path.
    ///
    /// A missing path is a no-op; the workspace root itself cannot be deleted.
    pub async fn delete(&self, raw: &str) -> Result<PathBuf> {
        let path = self.resolver.resolve(raw)?;
        if path == self.resolver.root() {
            return Err(SandboxError::invalid_request("cannot delete the workspace root"));
        }

        let target = path.clone();
        tokio::task::spawn_blocking(move || remove_tree(&target))
            .await
            .map_err(|e| SandboxError::Io(std::io::Error::other(e)))??;

        info!("Deleted {}", path.display());
        Ok(path)
    }
}

/// Remove a file, symlink or directory tree.
///
/// Directory trees go in three passes: every non-directory entry, then
/// directories deepest first, then `path` itself. Symlinks are unlinked,
/// never followed. A missing `path` is not an error.
pub fn remove_tree(path: &Path) -> std::io::Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if !metadata.is_dir() {
        return std::fs::remove_file(path);
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).follow_links(false) {
        let entry = entry.map_err(std::io::Error::other)?;
        if entry.file_type().is_dir() {
            dirs.push((entry.depth(), entry.into_path()));
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }

    dirs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, dir) in dirs {
        std::fs::remove_dir(&dir)?;
    }
    std::fs::remove_dir(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codejail_core::SecurityError;
    use tempfile::TempDir;

    fn files() -> (TempDir, WorkspaceFiles) {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path()).unwrap();
        (dir, WorkspaceFiles::new(resolver))
    }

    #[tokio::test]
    async fn test_write_then_read_utf8() {
        let (_dir, files) = files();
        let content = "héllo\nwörld\n";
        let path = files.write("notes/a.txt", content, ContentEncoding::Utf8).await.unwrap();

        assert_eq!(path, files.resolver().root().join("notes/a.txt"));
        let bytes = files.read("notes/a.txt").await.unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), content);
    }

    #[tokio::test]
    async fn test_write_then_read_base64_is_byte_exact() {
        let (_dir, files) = files();
        let raw: Vec<u8> = (0u8..=255).collect();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&raw);

        files.write("bin/blob", &encoded, ContentEncoding::Base64).await.unwrap();
        assert_eq!(files.read("bin/blob").await.unwrap(), raw);
    }

    #[tokio::test]
    async fn test_invalid_base64_rejected() {
        let (_dir, files) = files();
        let err = files.write("x", "not base64!!", ContentEncoding::Base64).await.unwrap_err();
        assert!(matches!(err, SandboxError::Encoding { .. }));
        assert!(!files.resolver().root().join("x").exists());
    }

    #[tokio::test]
    async fn test_write_outside_root_rejected() {
        let (_dir, files) = files();
        let err = files
            .write("../../etc/passwd", "x", ContentEncoding::Utf8)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SandboxError::Security(SecurityError::PathViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_missing_and_directory_are_not_found() {
        let (_dir, files) = files();
        std::fs::create_dir(files.resolver().root().join("d")).unwrap();

        assert!(matches!(files.read("nope").await, Err(SandboxError::NotFound(_))));
        assert!(matches!(files.read("d").await, Err(SandboxError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_root_sorted() {
        let (_dir, files) = files();
        files.write("b.txt", "bb", ContentEncoding::Utf8).await.unwrap();
        files.write("a.txt", "a", ContentEncoding::Utf8).await.unwrap();
        files.write("sub/c.txt", "c", ContentEncoding::Utf8).await.unwrap();

        let items = files.list(None).await.unwrap();
        let names: Vec<_> = items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);

        assert_eq!(items[1].size, 2);
        assert!(!items[1].is_dir);
        assert!(items[2].is_dir);
        assert!(items[0].modified_at > 0);
    }

    #[tokio::test]
    async fn test_list_paths_are_workspace_relative() {
        let (_dir, files) = files();
        files.write("sub/c.txt", "c", ContentEncoding::Utf8).await.unwrap();

        let items = files.list(Some("sub")).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "sub/c.txt");
    }

    #[tokio::test]
    async fn test_list_errors() {
        let (_dir, files) = files();
        files.write("f.txt", "x", ContentEncoding::Utf8).await.unwrap();

        assert!(matches!(files.list(Some("missing")).await, Err(SandboxError::NotFound(_))));
        assert!(matches!(files.list(Some("f.txt")).await, Err(SandboxError::NotADirectory(_))));
        assert!(matches!(files.list(Some("..")).await, Err(SandboxError::Security(_))));
    }

    #[tokio::test]
    async fn test_delete_file_and_tree() {
        let (_dir, files) = files();
        files.write("f.txt", "x", ContentEncoding::Utf8).await.unwrap();
        files.write("t/a/b/c.txt", "x", ContentEncoding::Utf8).await.unwrap();
        files.write("t/top.txt", "x", ContentEncoding::Utf8).await.unwrap();

        files.delete("f.txt").await.unwrap();
        files.delete("t").await.unwrap();

        assert!(!files.resolver().root().join("f.txt").exists());
        assert!(!files.resolver().root().join("t").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let (_dir, files) = files();
        let path = files.delete("ghost").await.unwrap();
        assert_eq!(path, files.resolver().root().join("ghost"));
    }

    #[tokio::test]
    async fn test_delete_root_rejected() {
        let (_dir, files) = files();
        for raw in ["", ".", "a/.."] {
            let err = files.delete(raw).await.unwrap_err();
            assert!(matches!(err, SandboxError::InvalidRequest(_)), "{raw}");
        }
        assert!(files.resolver().root().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_tree_unlinks_symlinks_without_following() {
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("keep.txt"), "keep").unwrap();

        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("tree");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::os::unix::fs::symlink(outside.path(), tree.join("nested/link")).unwrap();

        remove_tree(&tree).unwrap();
        assert!(!tree.exists());
        assert!(outside.path().join("keep.txt").exists());
    }

    #[test]
    fn test_content_encoding_parse() {
        assert_eq!("utf-8".parse::<ContentEncoding>().unwrap(), ContentEncoding::Utf8);
        assert_eq!("UTF8".parse::<ContentEncoding>().unwrap(), ContentEncoding::Utf8);
        assert_eq!("base64".parse::<ContentEncoding>().unwrap(), ContentEncoding::Base64);
        assert!("latin-1".parse::<ContentEncoding>().is_err());
    }
}
