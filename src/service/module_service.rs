use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::module::{Module, ModuleChanges, OrderingError};
use crate::repository::{ModuleRepository, RepositoryError};

// ============================================================================
// Module Service
// ============================================================================
//
// Request validation in front of the module repository:
// - required identifiers and titles must be non-empty
// - module titles are unique within a course
//
// Title uniqueness is decided by the ordering engine inside each versioned
// write, so concurrent requests for the same title cannot both succeed.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModuleRequest {
    pub course_id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Module title '{title}' is already used by module {held_by}")]
    DuplicateTitle { title: String, held_by: Uuid },

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(OrderingError::DuplicateTitle { title, held_by }) => {
                ServiceError::DuplicateTitle { title, held_by }
            }
            other => ServiceError::Repository(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

fn require(value: &str, field: &'static str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::MissingField(field));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ModuleService {
    modules: ModuleRepository,
}

impl ModuleService {
    pub fn new(modules: ModuleRepository) -> Self {
        Self { modules }
    }

    pub async fn create_module(&self, request: CreateModuleRequest) -> ServiceResult<Module> {
        require(&request.course_id, "course_id")?;
        require(&request.title, "title")?;

        let draft = Module::draft(request.title, request.description);
        Ok(self.modules.create_module(&request.course_id, draft).await?)
    }

    pub async fn get_modules_by_course_id(&self, course_id: &str) -> ServiceResult<Vec<Module>> {
        tracing::debug!(course_id = course_id, "Getting modules by course id");
        require(course_id, "course_id")?;
        Ok(self.modules.get_modules_by_course_id(course_id).await?)
    }

    pub async fn get_module_by_id(&self, module_id: &str) -> ServiceResult<Module> {
        tracing::debug!(module_id = module_id, "Getting module by id");
        require(module_id, "module_id")?;
        Ok(self.modules.get_module_by_id(module_id).await?)
    }

    pub async fn get_module_by_order(&self, course_id: &str, order: i32) -> ServiceResult<Module> {
        tracing::debug!(course_id = course_id, order = order, "Getting module by order");
        require(course_id, "course_id")?;
        Ok(self.modules.get_module_by_order(course_id, order).await?)
    }

    /// A changed title must not collide with another module of the same
    /// course.
    pub async fn update_module(&self, module_id: &str, changes: ModuleChanges) -> ServiceResult<Module> {
        require(module_id, "module_id")?;
        Ok(self.modules.update_module(module_id, changes).await?)
    }

    pub async fn delete_module(&self, module_id: &str) -> ServiceResult<()> {
        tracing::debug!(module_id = module_id, "Deleting module");
        require(module_id, "module_id")?;
        Ok(self.modules.delete_module(module_id).await?)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
