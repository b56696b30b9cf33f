use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::course::{Course, VersionedCourse};
use super::{CourseStore, StoreError};

// ============================================================================
// In-Memory Course Store
// ============================================================================
//
// Documents are kept serialized, so a read never aliases a previous write.
// The module -> course index lives under the same lock as the documents and
// changes together with them.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryCourseStore {
    inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    courses: HashMap<Uuid, StoredDocument>,
    module_index: HashMap<Uuid, Uuid>,
}

struct StoredDocument {
    version: i64,
    json: String,
}

impl StoredDocument {
    fn decode(&self) -> Result<VersionedCourse, StoreError> {
        Ok(VersionedCourse {
            course: serde_json::from_str(&self.json)?,
            version: self.version,
        })
    }
}

impl Collections {
    fn reindex(&mut self, previous: Option<&Course>, course: &Course) {
        if let Some(previous) = previous {
            for module in &previous.modules {
                self.module_index.remove(&module.id);
            }
        }
        for module in &course.modules {
            self.module_index.insert(module.id, course.id);
        }
    }
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn insert_course(&self, course: &Course) -> Result<i64, StoreError> {
        let json = serde_json::to_string(course)?;
        let mut inner = self.inner.write().await;

        if inner.courses.contains_key(&course.id) {
            return Err(StoreError::AlreadyExists(course.id));
        }

        inner.courses.insert(course.id, StoredDocument { version: 1, json });
        inner.reindex(None, course);

        tracing::debug!(course_id = %course.id, "Inserted course document");
        Ok(1)
    }

    async fn load_course(&self, course_id: Uuid) -> Result<Option<VersionedCourse>, StoreError> {
        let inner = self.inner.read().await;
        inner.courses.get(&course_id).map(StoredDocument::decode).transpose()
    }

    async fn replace_course(&self, course: &Course, expected_version: i64) -> Result<i64, StoreError> {
        let json = serde_json::to_string(course)?;
        let mut inner = self.inner.write().await;

        let (current_version, previous) = match inner.courses.get(&course.id) {
            Some(stored) => (stored.version, stored.decode()?.course),
            None => return Err(StoreError::Missing(course.id)),
        };

        if current_version != expected_version {
            return Err(StoreError::Conflict {
                course_id: course.id,
                expected: expected_version,
                actual: current_version,
            });
        }

        let new_version = current_version + 1;
        inner.courses.insert(course.id, StoredDocument { version: new_version, json });
        inner.reindex(Some(&previous), course);

        tracing::debug!(
            course_id = %course.id,
            new_version = new_version,
            module_count = course.modules.len(),
            "Replaced course document"
        );
        Ok(new_version)
    }

    async fn find_course_by_module(&self, module_id: Uuid) -> Result<Option<VersionedCourse>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .module_index
            .get(&module_id)
            .and_then(|course_id| inner.courses.get(course_id))
            .map(StoredDocument::decode)
            .transpose()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::NewCourse;
    use crate::domain::module::Module;
    use chrono::Utc;

    fn course() -> Course {
        let now = Utc::now();
        Course::new(
            NewCourse {
                title: "Databases".to_string(),
                description: "Storage engines".to_string(),
                teacher_uuid: "teacher-1".to_string(),
                teacher_name: "Ada".to_string(),
                capacity: 10,
                start_date: now,
                end_date: now,
            },
            now,
        )
    }

    fn with_module(mut course: Course, title: &str) -> (Course, Uuid) {
        let mut module = Module::draft(title, "");
        module.id = Uuid::new_v4();
        module.order = course.modules.len() as i32 + 1;
        let id = module.id;
        course.modules.push(module);
        (course, id)
    }

    #[tokio::test]
    async fn test_insert_then_load() {
        let store = InMemoryCourseStore::new();
        let course = course();

        assert_eq!(store.insert_course(&course).await.unwrap(), 1);
        let loaded = store.load_course(course.id).await.unwrap().unwrap();

        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.course, course);
        assert_eq!(store.inner.read().await.courses.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_twice_is_rejected() {
        let store = InMemoryCourseStore::new();
        let course = course();
        store.insert_course(&course).await.unwrap();

        assert!(matches!(
            store.insert_course(&course).await,
            Err(StoreError::AlreadyExists(id)) if id == course.id
        ));
    }

    #[tokio::test]
    async fn test_load_unknown_course_is_none() {
        let store = InMemoryCourseStore::new();
        assert!(store.load_course(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_bumps_version() {
        let store = InMemoryCourseStore::new();
        let mut course = course();
        store.insert_course(&course).await.unwrap();

        course.title = "Databases II".to_string();
        assert_eq!(store.replace_course(&course, 1).await.unwrap(), 2);

        let loaded = store.load_course(course.id).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.course.title, "Databases II");
    }

    #[tokio::test]
    async fn test_stale_replace_is_a_conflict() {
        let store = InMemoryCourseStore::new();
        let course = course();
        store.insert_course(&course).await.unwrap();
        store.replace_course(&course, 1).await.unwrap();

        let mut stale = course.clone();
        stale.title = "lost update".to_string();
        let result = store.replace_course(&stale, 1).await;

        assert!(matches!(
            result,
            Err(StoreError::Conflict { expected: 1, actual: 2, .. })
        ));
        let loaded = store.load_course(course.id).await.unwrap().unwrap();
        assert_eq!(loaded.course.title, "Databases");
    }

    #[tokio::test]
    async fn test_replace_missing_course() {
        let store = InMemoryCourseStore::new();
        assert!(matches!(
            store.replace_course(&course(), 1).await,
            Err(StoreError::Missing(_))
        ));
    }

    #[tokio::test]
    async fn test_module_index_follows_replacements() {
        let store = InMemoryCourseStore::new();
        let (course, first) = with_module(course(), "first");
        store.insert_course(&course).await.unwrap();

        let found = store.find_course_by_module(first).await.unwrap().unwrap();
        assert_eq!(found.course.id, course.id);

        let (mut course, second) = with_module(course, "second");
        store.replace_course(&course, 1).await.unwrap();
        assert!(store.find_course_by_module(second).await.unwrap().is_some());

        course.modules.retain(|m| m.id != first);
        store.replace_course(&course, 2).await.unwrap();
        assert!(store.find_course_by_module(first).await.unwrap().is_none());
        assert!(store.find_course_by_module(second).await.unwrap().is_some());
    }
}
