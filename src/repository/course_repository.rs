use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::course::{Course, NewCourse, VersionedCourse};
use crate::store::CourseStore;
use super::errors::{parse_id, RepoResult, RepositoryError};

// ============================================================================
// Course Repository
// ============================================================================
//
// Aggregate access for the module layer: create, load (by course or by an
// embedded module) and versioned save. Course field CRUD lives elsewhere.
//
// ============================================================================

#[derive(Clone)]
pub struct CourseRepository {
    store: Arc<dyn CourseStore>,
}

impl CourseRepository {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    pub async fn create_course(&self, input: NewCourse) -> RepoResult<Course> {
        let course = Course::new(input, Utc::now());
        self.store.insert_course(&course).await?;

        tracing::info!(course_id = %course.id, title = %course.title, "Course created");
        Ok(course)
    }

    pub async fn get_course(&self, course_id: &str) -> RepoResult<VersionedCourse> {
        self.load(parse_id(course_id)?).await
    }

    pub async fn load(&self, course_id: Uuid) -> RepoResult<VersionedCourse> {
        self.store
            .load_course(course_id)
            .await?
            .ok_or(RepositoryError::CourseNotFound(course_id))
    }

    pub async fn load_by_module(&self, module_id: Uuid) -> RepoResult<VersionedCourse> {
        self.store
            .find_course_by_module(module_id)
            .await?
            .ok_or_else(|| RepositoryError::ModuleNotFound(module_id.to_string()))
    }

    /// Persist the whole aggregate if nobody wrote it since it was loaded.
    pub async fn save(&self, versioned: &VersionedCourse) -> RepoResult<i64> {
        let version = self
            .store
            .replace_course(&versioned.course, versioned.version)
            .await?;
        Ok(version)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
