// ============================================================================
// Course Document Store
// ============================================================================
//
// A course and its embedded modules are stored as one document. Each stored
// document carries a version owned by the store:
// 1. insert_course writes version 1
// 2. replace_course succeeds only when the stored version equals the
//    version the caller read, and bumps it by one
// 3. a mismatch is reported as StoreError::Conflict, nothing is written
//
// ============================================================================

mod memory;
mod scylla_store;

pub use memory::InMemoryCourseStore;
pub use scylla_store::ScyllaCourseStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::course::{Course, VersionedCourse};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Concurrency conflict on course {course_id}: expected version {expected}, but current is {actual}")]
    Conflict {
        course_id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("Course already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Course not stored: {0}")]
    Missing(Uuid),

    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Store a new course document. Returns its first version.
    async fn insert_course(&self, course: &Course) -> Result<i64, StoreError>;

    async fn load_course(&self, course_id: Uuid) -> Result<Option<VersionedCourse>, StoreError>;

    /// Replace the whole document if it is still at `expected_version`.
    /// Returns the new version.
    async fn replace_course(&self, course: &Course, expected_version: i64) -> Result<i64, StoreError>;

    /// Find the course that currently embeds `module_id`.
    async fn find_course_by_module(&self, module_id: Uuid) -> Result<Option<VersionedCourse>, StoreError>;

    /// Readiness of the backend, reported by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
