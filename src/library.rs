//! The courses root directory and resolution of request paths below it.

use std::{
    path::{Component, Path, PathBuf, MAIN_SEPARATOR},
    sync::Arc,
};

use tokio::sync::RwLock;

use crate::error::{validation::validate_path, AppError, AppResult};
use crate::indexer::decode_name;
use crate::middleware::validation::sanitize_for_logging;

/// Runtime-switchable courses root.
///
/// Handlers take a snapshot with [`LibraryRoot::current`] once per request; a switch via
/// [`LibraryRoot::set`] does not affect requests that already took their snapshot.
#[derive(Clone, Debug)]
pub struct LibraryRoot {
    current: Arc<RwLock<PathBuf>>,
}

impl LibraryRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { current: Arc::new(RwLock::new(path.into())) }
    }

    pub async fn current(&self) -> PathBuf {
        self.current.read().await.clone()
    }

    /// Validates `raw` as an existing directory and makes it the new root.
    ///
    /// On failure the previous root stays in effect.
    pub async fn set(&self, raw: &str) -> AppResult<PathBuf> {
        validate_path(raw)?;
        let candidate = PathBuf::from(raw.trim());

        match tokio::fs::metadata(&candidate).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(AppError::InvalidInput(format!(
                    "courses path is not a directory: {}",
                    candidate.display()
                )));
            }
            Err(e) => {
                tracing::warn!("Courses path not accessible: {} ({})", sanitize_for_logging(raw), e);
                return Err(AppError::NotFound(format!("courses path not found: {}", candidate.display())));
            }
        }

        let mut guard = self.current.write().await;
        *guard = candidate.clone();
        drop(guard);
        tracing::info!("Courses root switched to {}", candidate.display());
        Ok(candidate)
    }
}

/// Root as reported to clients: always terminated by a path separator.
pub fn display_root(root: &Path) -> String {
    let mut s = root.to_string_lossy().into_owned();
    if !s.ends_with('/') && !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}

/// A regular file below the courses root.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Resolves a (already URL-decoded) relative request path to a file below `root`.
///
/// Absolute paths and `..` components are rejected so the result cannot leave the root.
/// Names on disk may themselves be percent-encoded; if the path as given does not exist,
/// a second decoding pass is tried.
///
/// Unless `follow_symlinks` is set, the canonical file path must also lie below the
/// canonical root, so symlinks pointing out of the library are refused.
pub async fn resolve_file(root: &Path, requested: &str, follow_symlinks: bool) -> AppResult<ResolvedFile> {
    let first = checked_join(root, requested)?;
    let found = match tokio::fs::metadata(&first).await {
        Ok(meta) => Some((first, meta)),
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
        Err(_) => {
            let decoded = decode_name(requested);
            if decoded != requested {
                let second = checked_join(root, &decoded)?;
                tokio::fs::metadata(&second).await.ok().map(|meta| (second, meta))
            } else {
                None
            }
        }
    };

    let Some((path, meta)) = found else {
        return Err(AppError::NotFound(format!("file not found: {}", requested)));
    };
    if !follow_symlinks {
        ensure_inside(root, &path, requested).await?;
    }
    into_resolved(path, meta)
}

async fn ensure_inside(root: &Path, path: &Path, requested: &str) -> AppResult<()> {
    let canonical_root = tokio::fs::canonicalize(root).await?;
    let canonical = tokio::fs::canonicalize(path).await?;
    if !canonical.starts_with(&canonical_root) {
        tracing::warn!("Rejected path resolving outside courses root: {}", sanitize_for_logging(requested));
        return Err(AppError::BadRequest("path must stay inside the courses directory".into()));
    }
    Ok(())
}

fn checked_join(root: &Path, rel: &str) -> AppResult<PathBuf> {
    if rel.contains('\0') {
        return Err(AppError::BadRequest("path contains null characters".into()));
    }
    let rel_path = Path::new(rel);
    for c in rel_path.components() {
        match c {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                tracing::warn!("Rejected path outside courses root: {}", sanitize_for_logging(rel));
                return Err(AppError::BadRequest("path must stay inside the courses directory".into()));
            }
        }
    }
    Ok(root.join(rel_path))
}

fn into_resolved(path: PathBuf, meta: std::fs::Metadata) -> AppResult<ResolvedFile> {
    if !meta.is_file() {
        return Err(AppError::NotFound(format!("not a file: {}", path.display())));
    }
    Ok(ResolvedFile { size: meta.len(), path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_rejects_missing_path_and_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let root = LibraryRoot::new(dir.path());
        let err = root.set("/definitely/not/here/kursbrowser").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(root.current().await, dir.path());
    }

    #[tokio::test]
    async fn set_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp4");
        std::fs::write(&file, b"x").unwrap();
        let root = LibraryRoot::new(dir.path());
        let err = root.set(file.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn set_accepts_directory() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let root = LibraryRoot::new(a.path());
        root.set(b.path().to_str().unwrap()).await.unwrap();
        assert_eq!(root.current().await, b.path());
    }

    #[test]
    fn display_root_appends_separator_once() {
        let shown = display_root(Path::new("/srv/courses"));
        assert!(shown.ends_with(MAIN_SEPARATOR));
        assert_eq!(display_root(Path::new("/srv/courses/")), "/srv/courses/");
    }

    #[tokio::test]
    async fn resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_file(dir.path(), "../etc/passwd", false).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = resolve_file(dir.path(), "/etc/passwd", false).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = resolve_file(dir.path(), "course/%2e%2e/%2e%2e/secret", false).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn resolve_tries_second_decoding() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Curso")).unwrap();
        std::fs::write(dir.path().join("Curso/Aula 1.mp4"), b"abc").unwrap();
        std::fs::write(dir.path().join("Curso/50%25.pdf"), b"abcd").unwrap();

        let f = resolve_file(dir.path(), "Curso/Aula%201.mp4", false).await.unwrap();
        assert_eq!(f.size, 3);
        // literal percent-encoded name on disk is found as-is first
        let f = resolve_file(dir.path(), "Curso/50%25.pdf", false).await.unwrap();
        assert_eq!(f.size, 4);
    }

    #[tokio::test]
    async fn resolve_missing_and_directory_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Curso")).unwrap();
        assert!(matches!(resolve_file(dir.path(), "Curso/none.mp4", false).await, Err(AppError::NotFound(_))));
        assert!(matches!(resolve_file(dir.path(), "Curso", false).await, Err(AppError::NotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn resolve_refuses_symlink_out_of_root_unless_following() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.mp4"), b"secret").unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Curso")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.mp4"), dir.path().join("Curso/link.mp4")).unwrap();

        let err = resolve_file(dir.path(), "Curso/link.mp4", false).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let f = resolve_file(dir.path(), "Curso/link.mp4", true).await.unwrap();
        assert_eq!(f.size, 6);
    }
}
