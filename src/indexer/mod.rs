//! Builds the course catalog from the courses root.
//!
//! Every immediate subdirectory of the root is a course. Inside a course the tree is
//! walked depth-first: directories become modules (only when something below them is a
//! lesson), recognized files become lessons. The result is never cached; each catalog
//! request walks the filesystem again.

pub mod natural;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::anyhow;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;

use crate::config::LibraryConfig;
use crate::error::{AppError, AppResult};
use crate::types::{ContentNode, Course};

pub use natural::compare_titles;

/// File extensions (lowercase) that make a file a lesson.
pub const LESSON_EXTENSIONS: &[&str] = &["mp4", "webm", "ts", "m3u8", "pdf", "html"];

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub excludes: GlobSet,
    pub follow_symlinks: bool,
    pub max_depth: Option<u32>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { excludes: GlobSet::empty(), follow_symlinks: false, max_depth: None }
    }
}

impl IndexOptions {
    pub fn from_config(cfg: &LibraryConfig) -> AppResult<Self> {
        Ok(Self {
            excludes: build_globset(&cfg.excludes)?,
            follow_symlinks: cfg.follow_symlinks,
            max_depth: cfg.max_depth,
        })
    }

    fn is_excluded(&self, rel_path: &str, name: &str) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        self.excludes.is_match(rel_path) || self.excludes.is_match(name)
    }
}

pub fn build_globset(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        if p.trim().is_empty() {
            continue;
        }
        // Backslashes zu Slashes, Pfade im Katalog sind immer '/'-getrennt.
        let norm = p.trim().replace('\\', "/");
        b.add(Glob::new(&norm)?);
    }
    b.build()
}

/// Whether a file name carries one of the lesson extensions (case-insensitive).
pub fn is_lesson_file(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            LESSON_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Best-effort percent-decoding of a file or directory name; falls back to the raw name
/// when an escape is malformed or the result is not UTF-8.
pub fn decode_name(raw: &str) -> String {
    if !has_valid_escapes(raw) {
        return raw.to_string();
    }
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

// Jedes '%' muss von zwei Hex-Ziffern gefolgt sein.
fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Indexes all courses below `root`.
///
/// Fails with `NotFound` if the root is missing or not a directory. Failures inside a
/// course never fail the whole catalog; unreadable subtrees are logged and skipped.
pub async fn index_library(
    root: PathBuf,
    options: Arc<IndexOptions>,
    concurrency: usize,
) -> AppResult<Vec<Course>> {
    match tokio::fs::metadata(&root).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(AppError::NotFound(format!("courses directory not found: {}", root.display())));
        }
    }

    let list_opts = options.clone();
    let list_root = root.clone();
    let course_dirs = spawn_blocking(move || list_course_dirs(&list_root, &list_opts))
        .await
        .map_err(|e| AppError::Internal(anyhow!("course listing task join error: {}", e)))??;
    tracing::debug!("Found {} course directories in {}", course_dirs.len(), root.display());

    let sem = Arc::new(Semaphore::new(concurrency.max(1)));
    let tasks = course_dirs.into_iter().map(|(name, path)| {
        let sem = sem.clone();
        let opts = options.clone();
        async move {
            let _permit = sem
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(anyhow!("indexer semaphore closed: {}", e)))?;
            let content = spawn_blocking(move || index_course(&path, &opts))
                .await
                .map_err(|e| AppError::Internal(anyhow!("course index task join error: {}", e)))?;
            let title = decode_name(&name);
            Ok::<Course, AppError>(Course { description: format!("Course: {}", title), title, content })
        }
    });

    let mut courses = futures::future::try_join_all(tasks).await?;
    courses.sort_by(|a, b| compare_titles(&a.title, &b.title));
    Ok(courses)
}

/// Immediate subdirectories of the root as `(raw name, full path)`.
fn list_course_dirs(root: &Path, options: &IndexOptions) -> AppResult<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if options.is_excluded(&name, &name) {
            continue;
        }
        if entry_is_dir(&entry, options) {
            dirs.push((name, entry.path()));
        }
    }
    Ok(dirs)
}

/// Indexes one course directory. Paths in the result are relative to `course_dir`.
pub fn index_course(course_dir: &Path, options: &IndexOptions) -> Vec<ContentNode> {
    index_dir(course_dir, "", 0, options)
}

fn index_dir(dir: &Path, rel: &str, depth: u32, options: &IndexOptions) -> Vec<ContentNode> {
    let rd = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut content = Vec::new();
    for entry in rd {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let raw = entry.file_name().to_string_lossy().into_owned();
        let rel_path = if rel.is_empty() { raw.clone() } else { format!("{}/{}", rel, raw) };
        if options.is_excluded(&rel_path, &raw) {
            continue;
        }

        if entry_is_dir(&entry, options) {
            if options.max_depth.is_some_and(|max| depth >= max) {
                tracing::debug!("max_depth reached, not descending into {}", entry.path().display());
                continue;
            }
            let children = index_dir(&entry.path(), &rel_path, depth + 1, options);
            if !children.is_empty() {
                content.push(ContentNode::Module { title: decode_name(&raw), path: rel_path, children });
            }
        } else if is_lesson_file(&raw) {
            content.push(ContentNode::Lesson { title: decode_name(&raw), path: rel_path });
        }
    }

    sort_nodes(&mut content);
    content
}

// Symlinks are classified by their own type unless following is enabled.
fn entry_is_dir(entry: &fs::DirEntry, options: &IndexOptions) -> bool {
    match entry.file_type() {
        Ok(ft) if ft.is_symlink() => {
            options.follow_symlinks && fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false)
        }
        Ok(ft) => ft.is_dir(),
        Err(e) => {
            tracing::warn!("Failed to stat {}: {}", entry.path().display(), e);
            false
        }
    }
}

fn sort_nodes(nodes: &mut [ContentNode]) {
    nodes.sort_by(|a, b| compare_titles(a.title(), b.title()).then_with(|| a.path().cmp(b.path())));
}
