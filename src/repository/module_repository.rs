use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::course::Course;
use crate::domain::module::{Module, ModuleChanges, ModuleCommand};
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, RetryConfig};
use super::course_repository::CourseRepository;
use super::errors::{parse_id, RepoResult, RepositoryError};

// ============================================================================
// Module Repository
// ============================================================================
//
// Every mutation follows the same cycle:
//   load course (with version) → ordering engine → replace whole document
//                                                  IF version unchanged
//
// A version mismatch means another writer got there first; the cycle is
// replayed from a fresh load with exponential backoff. The module list is
// never written piecemeal.
//
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Owner {
    Course(Uuid),
    OfModule(Uuid),
}

#[derive(Clone)]
pub struct ModuleRepository {
    courses: CourseRepository,
    retry: RetryConfig,
    metrics: Option<Arc<Metrics>>,
}

impl ModuleRepository {
    pub fn new(courses: CourseRepository) -> Self {
        Self {
            courses,
            retry: RetryConfig::default(),
            metrics: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn get_next_module_order(&self, course_id: &str) -> RepoResult<i32> {
        self.instrumented("get_next_module_order", async {
            let versioned = self.courses.load(parse_id(course_id)?).await?;
            Ok(versioned.course.next_module_order())
        })
        .await
    }

    /// Append `module` to the course. Id, order and timestamps are assigned
    /// here; any order carried by the input is ignored.
    pub async fn create_module(&self, course_id: &str, module: Module) -> RepoResult<Module> {
        self.instrumented("create_module", async {
            let course_id = parse_id(course_id)?;

            let now = Utc::now();
            let module = Module {
                id: Uuid::new_v4(),
                order: 0,
                created_at: now,
                updated_at: now,
                ..module
            };
            let module_id = module.id;

            let course = self
                .run_command("create_module", Owner::Course(course_id), &ModuleCommand::Append { module })
                .await?;
            let created = stored_module(&course, module_id)?;

            tracing::info!(
                course_id = %course_id,
                module_id = %module_id,
                order = created.order,
                "Module created"
            );
            Ok(created)
        })
        .await
    }

    pub async fn get_module_by_id(&self, module_id: &str) -> RepoResult<Module> {
        self.instrumented("get_module_by_id", async {
            let module_id = parse_id(module_id)?;
            let versioned = self.courses.load_by_module(module_id).await?;
            stored_module(&versioned.course, module_id)
        })
        .await
    }

    pub async fn get_module_by_name(&self, course_id: &str, title: &str) -> RepoResult<Module> {
        self.instrumented("get_module_by_name", async {
            let course_id = parse_id(course_id)?;
            let versioned = self.courses.load(course_id).await?;
            versioned
                .course
                .module_by_title(title)
                .cloned()
                .ok_or_else(|| {
                    RepositoryError::ModuleNotFound(format!("title '{}' in course {}", title, course_id))
                })
        })
        .await
    }

    /// All modules of a course, ascending by order. A course without modules
    /// yields an empty list.
    pub async fn get_modules_by_course_id(&self, course_id: &str) -> RepoResult<Vec<Module>> {
        self.instrumented("get_modules_by_course_id", async {
            let versioned = self.courses.load(parse_id(course_id)?).await?;
            Ok(versioned.course.modules_in_order())
        })
        .await
    }

    pub async fn get_module_by_order(&self, course_id: &str, order: i32) -> RepoResult<Module> {
        self.instrumented("get_module_by_order", async {
            let course_id = parse_id(course_id)?;
            let versioned = self.courses.load(course_id).await?;
            versioned
                .course
                .module_by_order(order)
                .cloned()
                .ok_or_else(|| {
                    RepositoryError::ModuleNotFound(format!("order {} in course {}", order, course_id))
                })
        })
        .await
    }

    /// Apply content changes and, if `changes.order` differs from the current
    /// rank, move the module. An order outside 1..=N is rejected.
    pub async fn update_module(&self, module_id: &str, changes: ModuleChanges) -> RepoResult<Module> {
        self.instrumented("update_module", async {
            let module_id = parse_id(module_id)?;
            let command = ModuleCommand::Revise {
                module_id,
                changes,
                revised_at: Utc::now(),
            };

            let course = self
                .run_command("update_module", Owner::OfModule(module_id), &command)
                .await?;
            let updated = stored_module(&course, module_id)?;

            tracing::info!(
                course_id = %course.id,
                module_id = %module_id,
                order = updated.order,
                "Module updated"
            );
            Ok(updated)
        })
        .await
    }

    pub async fn delete_module(&self, module_id: &str) -> RepoResult<()> {
        self.instrumented("delete_module", async {
            let module_id = parse_id(module_id)?;

            let course = self
                .run_command("delete_module", Owner::OfModule(module_id), &ModuleCommand::Remove { module_id })
                .await?;

            tracing::info!(
                course_id = %course.id,
                module_id = %module_id,
                remaining = course.modules.len(),
                "Module deleted"
            );
            Ok(())
        })
        .await
    }

    /// Renumber a course whose stored ranks are no longer contiguous.
    pub async fn repair_module_order(&self, course_id: &str) -> RepoResult<Vec<Module>> {
        self.instrumented("repair_module_order", async {
            let course_id = parse_id(course_id)?;
            let course = self
                .run_command("repair_module_order", Owner::Course(course_id), &ModuleCommand::Renumber)
                .await?;

            tracing::warn!(course_id = %course_id, modules = course.modules.len(), "Module order repaired");
            Ok(course.modules)
        })
        .await
    }

    async fn run_command(
        &self,
        operation: &'static str,
        owner: Owner,
        command: &ModuleCommand,
    ) -> RepoResult<Course> {
        retry_on_transient(&self.retry, move |attempt| {
            if attempt > 1 {
                if let Some(metrics) = &self.metrics {
                    metrics.record_retry_attempt(operation, attempt);
                }
            }
            self.try_command(operation, owner, command)
        })
        .await
        .into_result()
    }

    /// One load → compute → conditional replace cycle.
    async fn try_command(
        &self,
        operation: &'static str,
        owner: Owner,
        command: &ModuleCommand,
    ) -> RepoResult<Course> {
        let mut versioned = match owner {
            Owner::Course(course_id) => self.courses.load(course_id).await?,
            Owner::OfModule(module_id) => self.courses.load_by_module(module_id).await?,
        };

        versioned.course.apply_module_command(command, Utc::now())?;

        match self.courses.save(&versioned).await {
            Ok(version) => {
                tracing::debug!(
                    course_id = %versioned.course.id,
                    command = command.name(),
                    version = version,
                    "Course modules persisted"
                );
                Ok(versioned.course)
            }
            Err(error @ RepositoryError::OptimisticConflict { .. }) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_conflict(operation);
                }
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    async fn instrumented<T>(
        &self,
        operation: &'static str,
        work: impl Future<Output = RepoResult<T>>,
    ) -> RepoResult<T> {
        let started = Instant::now();
        let result = work.await;
        self.observe(operation, started, &result);
        result
    }

    fn observe<T>(&self, operation: &str, started: Instant, result: &RepoResult<T>) {
        if let Err(error) = result {
            tracing::debug!(operation = operation, error = %error, "Module operation failed");
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_operation(operation, started.elapsed().as_secs_f64(), result.is_ok());
        }
    }
}

fn stored_module(course: &Course, module_id: Uuid) -> RepoResult<Module> {
    course
        .module(module_id)
        .cloned()
        .ok_or_else(|| RepositoryError::ModuleNotFound(module_id.to_string()))
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Operation-level behaviour against the in-memory store. Multi-step
// scenarios and concurrent writers are covered in tests/module_repository.rs.
//
// ============================================================================
