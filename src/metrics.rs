use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Request counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub catalog_requests: Arc<AtomicUsize>,
    pub courses_indexed: Arc<AtomicU64>,
    pub lessons_indexed: Arc<AtomicU64>,
    pub files_served: Arc<AtomicU64>,
    pub partial_responses: Arc<AtomicU64>,
    pub bytes_served: Arc<AtomicU64>,
    pub duration_updates: Arc<AtomicUsize>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            catalog_requests: Arc::new(AtomicUsize::new(0)),
            courses_indexed: Arc::new(AtomicU64::new(0)),
            lessons_indexed: Arc::new(AtomicU64::new(0)),
            files_served: Arc::new(AtomicU64::new(0)),
            partial_responses: Arc::new(AtomicU64::new(0)),
            bytes_served: Arc::new(AtomicU64::new(0)),
            duration_updates: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_catalog_requests(&self) {
        self.catalog_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_indexed(&self, courses: u64, lessons: u64) {
        self.courses_indexed.fetch_add(courses, Ordering::Relaxed);
        self.lessons_indexed.fetch_add(lessons, Ordering::Relaxed);
    }

    pub fn record_served(&self, partial: bool, bytes: u64) {
        self.files_served.fetch_add(1, Ordering::Relaxed);
        if partial {
            self.partial_responses.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_served.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_duration_updates(&self, count: usize) {
        self.duration_updates.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            catalog_requests: self.catalog_requests.load(Ordering::Relaxed),
            courses_indexed: self.courses_indexed.load(Ordering::Relaxed),
            lessons_indexed: self.lessons_indexed.load(Ordering::Relaxed),
            files_served: self.files_served.load(Ordering::Relaxed),
            partial_responses: self.partial_responses.load(Ordering::Relaxed),
            bytes_served: self.bytes_served.load(Ordering::Relaxed),
            duration_updates: self.duration_updates.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub catalog_requests: usize,
    pub courses_indexed: u64,
    pub lessons_indexed: u64,
    pub files_served: u64,
    pub partial_responses: u64,
    /// Bytes announced in Content-Length of served files (not necessarily delivered).
    pub bytes_served: u64,
    pub duration_updates: usize,
    pub uptime_seconds: u64,
}
