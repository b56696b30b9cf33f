use uuid::Uuid;

use crate::domain::module::OrderingError;
use crate::store::StoreError;
use crate::utils::IsTransient;

// ============================================================================
// Repository Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Invalid module sequence change: {0}")]
    Validation(OrderingError),

    #[error("Course {course_id} was modified concurrently")]
    OptimisticConflict { course_id: Uuid },

    #[error(transparent)]
    Store(StoreError),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepositoryError>;

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { course_id, .. } => RepositoryError::OptimisticConflict { course_id },
            StoreError::Missing(course_id) => RepositoryError::CourseNotFound(course_id),
            other => RepositoryError::Store(other),
        }
    }
}

impl From<OrderingError> for RepositoryError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::ModuleNotFound(id) => RepositoryError::ModuleNotFound(id.to_string()),
            other => RepositoryError::Validation(other),
        }
    }
}

impl IsTransient for RepositoryError {
    fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::OptimisticConflict { .. })
    }
}

/// Parse a caller-supplied identifier.
pub fn parse_id(raw: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| RepositoryError::InvalidIdentifier(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("invalid-id"), Err(RepositoryError::InvalidIdentifier(raw)) if raw == "invalid-id"));
        assert!(matches!(parse_id(""), Err(RepositoryError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_only_conflicts_are_transient() {
        let conflict: RepositoryError = StoreError::Conflict {
            course_id: Uuid::new_v4(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(conflict.is_transient());

        let backend: RepositoryError = StoreError::Backend("timeout".to_string()).into();
        assert!(!backend.is_transient());
        assert!(!RepositoryError::CourseNotFound(Uuid::new_v4()).is_transient());
    }

    #[test]
    fn test_ordering_errors_map_to_taxonomy() {
        let id = Uuid::new_v4();
        assert!(matches!(
            RepositoryError::from(OrderingError::ModuleNotFound(id)),
            RepositoryError::ModuleNotFound(_)
        ));
        assert!(matches!(
            RepositoryError::from(OrderingError::OrderOutOfRange { requested: 9, max: 3 }),
            RepositoryError::Validation(OrderingError::OrderOutOfRange { requested: 9, max: 3 })
        ));
    }
}
