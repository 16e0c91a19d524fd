//! HTTP route handlers for the Kursbrowser API.
//!
//! - `courses`: the course catalog built from the courses root
//! - `durations`: the persisted video duration cache
//! - `files`: range-aware delivery of lesson files
//! - `health`: health, readiness, metrics and version endpoints
//! - `settings`: reading and switching the courses root at runtime

pub mod courses;
pub mod durations;
pub mod files;
pub mod health;
pub mod settings;
