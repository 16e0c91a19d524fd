use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node of a course tree: either a directory with lessons below it, or a lesson file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentNode {
    Module {
        title: String,
        path: String,
        children: Vec<ContentNode>,
    },
    Lesson {
        title: String,
        path: String,
    },
}

impl ContentNode {
    pub fn title(&self) -> &str {
        match self {
            ContentNode::Module { title, .. } | ContentNode::Lesson { title, .. } => title,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ContentNode::Module { path, .. } | ContentNode::Lesson { path, .. } => path,
        }
    }

    /// Number of lessons in this node's subtree (1 for a lesson).
    pub fn lesson_count(&self) -> usize {
        match self {
            ContentNode::Lesson { .. } => 1,
            ContentNode::Module { children, .. } => children.iter().map(ContentNode::lesson_count).sum(),
        }
    }
}

/// Top-level entry of the catalog, one per immediate subdirectory of the courses root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub description: String,
    pub content: Vec<ContentNode>,
}

/// Lesson path (relative to its course) -> duration in seconds.
pub type DurationMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Deserialize)]
pub struct DurationUpdate {
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDurationsResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertDurationResponse {
    pub success: bool,
    pub path: String,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursesPathResponse {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCoursesPathResponse {
    pub success: bool,
    pub path: String,
}
