use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::Course;

// ============================================================================
// Course Value Objects
// ============================================================================

/// Fields supplied when a course is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub teacher_uuid: String,
    pub teacher_name: String,
    pub capacity: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// A course document together with the store version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedCourse {
    pub course: Course,
    pub version: i64,
}
