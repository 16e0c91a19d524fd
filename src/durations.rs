//! Persisted cache of measured video durations (lesson path -> seconds).
//!
//! The table lives in a single pretty-printed JSON file. Writes go to a temp file in the
//! same directory that is then renamed over the target, so readers never see a partial
//! file. Load-modify-store cycles are serialized by a per-process mutex.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::Mutex;
use tokio::task::spawn_blocking;

use crate::types::DurationMap;

#[derive(Debug, thiserror::Error)]
pub enum DurationStoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duration cache task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, DurationStoreError>;

#[derive(Clone)]
pub struct DurationCache {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl DurationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Arc::new(path.into()), write_lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole table. A missing file is a fresh installation and yields an empty map.
    pub async fn load_all(&self) -> StoreResult<DurationMap> {
        let path = self.path.clone();
        spawn_blocking(move || read_map(&path)).await?
    }

    /// Replaces the whole table.
    pub async fn save_all(&self, map: DurationMap) -> StoreResult<usize> {
        let guard = self.write_lock.clone().lock_owned().await;
        let count = map.len();
        let path = self.path.clone();
        spawn_blocking(move || {
            let _guard = guard;
            write_map(&path, &map)
        })
        .await??;
        Ok(count)
    }

    /// Sets one entry, keeping all others.
    ///
    /// The lock travels into the blocking task: if the caller is dropped mid-write, the
    /// next writer still waits for this cycle to finish.
    pub async fn upsert(&self, key: String, duration: f64) -> StoreResult<()> {
        let guard = self.write_lock.clone().lock_owned().await;
        let path = self.path.clone();
        spawn_blocking(move || {
            let _guard = guard;
            let mut map = read_map(&path)?;
            map.insert(key, duration);
            write_map(&path, &map)
        })
        .await?
    }
}

fn read_map(path: &Path) -> StoreResult<DurationMap> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DurationMap::new()),
        Err(e) => return Err(DurationStoreError::Read { path: path.to_path_buf(), source: e }),
    };
    if raw.trim().is_empty() {
        return Ok(DurationMap::new());
    }
    serde_json::from_str(&raw).map_err(|e| DurationStoreError::Parse { path: path.to_path_buf(), source: e })
}

fn write_map(path: &Path, map: &DurationMap) -> StoreResult<()> {
    let write_err = |e: std::io::Error| DurationStoreError::Write { path: path.to_path_buf(), source: e };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let json = serde_json::to_string_pretty(map)
        .map_err(|e| DurationStoreError::Parse { path: path.to_path_buf(), source: e })?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
