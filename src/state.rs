use std::sync::Arc;

use crate::config::AppConfig;
use crate::durations::DurationCache;
use crate::error::AppResult;
use crate::indexer::IndexOptions;
use crate::library::LibraryRoot;
use crate::metrics::Metrics;

/// The shared application state.
///
/// Cloned into every handler by Axum; all members are cheap handles to shared data.
#[derive(Clone)]
pub struct AppState {
    /// The courses root, switchable at runtime.
    pub library: LibraryRoot,
    /// Persisted lesson durations.
    pub durations: DurationCache,
    /// Indexer options derived from `[library]`.
    pub index_options: Arc<IndexOptions>,
    /// Number of courses indexed in parallel.
    pub index_concurrency: usize,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Request counters.
    pub metrics: Metrics,
}

impl AppState {
    /// Creates the state from a validated configuration.
    ///
    /// The initial root is taken as configured; it does not have to exist yet
    /// (`/api/courses` answers 404 until it does).
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let index_options = IndexOptions::from_config(&config.library)?;
        let index_concurrency = config.library.concurrency.unwrap_or_else(num_cpus::get).max(1);

        Ok(Self {
            library: LibraryRoot::new(config.library.root.trim()),
            durations: DurationCache::new(&config.cache.durations_file),
            index_options: Arc::new(index_options),
            index_concurrency,
            config: Arc::new(config),
            metrics: Metrics::new(),
        })
    }
}
