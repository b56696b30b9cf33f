use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use courses_service::domain::course::{Course, NewCourse, VersionedCourse};
use courses_service::domain::module::{Module, ModuleChanges};
use courses_service::repository::{CourseRepository, ModuleRepository};
use courses_service::service::{CreateModuleRequest, ModuleService, ServiceError, ServiceResult};
use courses_service::store::{CourseStore, InMemoryCourseStore, StoreError};
use courses_service::utils::RetryConfig;

// ============================================================================
// Title uniqueness under concurrent writers
// ============================================================================

/// Holds every load long enough for two requests to read the same version.
struct SlowLoadStore {
    inner: InMemoryCourseStore,
    delay: Duration,
}

#[async_trait]
impl CourseStore for SlowLoadStore {
    async fn insert_course(&self, course: &Course) -> Result<i64, StoreError> {
        self.inner.insert_course(course).await
    }

    async fn load_course(&self, course_id: Uuid) -> Result<Option<VersionedCourse>, StoreError> {
        let loaded = self.inner.load_course(course_id).await;
        tokio::time::sleep(self.delay).await;
        loaded
    }

    async fn replace_course(&self, course: &Course, expected_version: i64) -> Result<i64, StoreError> {
        self.inner.replace_course(course, expected_version).await
    }

    async fn find_course_by_module(&self, module_id: Uuid) -> Result<Option<VersionedCourse>, StoreError> {
        let found = self.inner.find_course_by_module(module_id).await;
        tokio::time::sleep(self.delay).await;
        found
    }
}

async fn setup() -> (ModuleService, String) {
    let store = Arc::new(SlowLoadStore {
        inner: InMemoryCourseStore::new(),
        delay: Duration::from_millis(5),
    });
    let courses = CourseRepository::new(store);
    let now = Utc::now();
    let course = courses
        .create_course(NewCourse {
            title: "Networks".to_string(),
            description: "Packets".to_string(),
            teacher_uuid: "teacher-1".to_string(),
            teacher_name: "Test Teacher".to_string(),
            capacity: 40,
            start_date: now,
            end_date: now + chrono::Duration::days(30),
        })
        .await
        .unwrap();

    let retry = RetryConfig {
        max_attempts: 10,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(20),
        multiplier: 2.0,
    };
    let modules = ModuleRepository::new(courses).with_retry(retry);
    (ModuleService::new(modules), course.id.to_string())
}

fn request(course_id: &str, title: &str) -> CreateModuleRequest {
    CreateModuleRequest {
        course_id: course_id.to_string(),
        title: title.to_string(),
        description: "description".to_string(),
    }
}

fn split_outcomes(results: Vec<ServiceResult<Module>>) -> (Vec<Module>, usize) {
    let mut created = Vec::new();
    let mut duplicates = 0;
    for result in results {
        match result {
            Ok(module) => created.push(module),
            Err(ServiceError::DuplicateTitle { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    (created, duplicates)
}

#[tokio::test]
async fn test_concurrent_creates_with_same_title_store_one_module() {
    let (service, course_id) = setup().await;

    let (first, second) = tokio::join!(
        service.create_module(request(&course_id, "Intro")),
        service.create_module(request(&course_id, "Intro")),
    );

    let (created, duplicates) = split_outcomes(vec![first, second]);
    assert_eq!(created.len(), 1);
    assert_eq!(duplicates, 1);

    let stored = service.get_modules_by_course_id(&course_id).await.unwrap();
    assert_eq!(stored.iter().filter(|m| m.title == "Intro").count(), 1);
    assert_eq!(stored[0].id, created[0].id);
    assert_eq!(stored[0].order, 1);
}

#[tokio::test]
async fn test_concurrent_renames_to_same_title_keep_one() {
    let (service, course_id) = setup().await;
    let a = service.create_module(request(&course_id, "Switching")).await.unwrap();
    let b = service.create_module(request(&course_id, "Routing")).await.unwrap();
    let (a_id, b_id) = (a.id.to_string(), b.id.to_string());

    let (first, second) = tokio::join!(
        service.update_module(&a_id, ModuleChanges::default().title("Transport")),
        service.update_module(&b_id, ModuleChanges::default().title("Transport")),
    );

    let (renamed, duplicates) = split_outcomes(vec![first, second]);
    assert_eq!(renamed.len(), 1);
    assert_eq!(duplicates, 1);

    let stored = service.get_modules_by_course_id(&course_id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.iter().filter(|m| m.title == "Transport").count(), 1);
}

#[tokio::test]
async fn test_title_freed_by_delete_can_be_reused() {
    let (service, course_id) = setup().await;
    let intro = service.create_module(request(&course_id, "Intro")).await.unwrap();

    service.delete_module(&intro.id.to_string()).await.unwrap();
    let again = service.create_module(request(&course_id, "Intro")).await.unwrap();

    assert_ne!(again.id, intro.id);
    assert_eq!(again.order, 1);
}
