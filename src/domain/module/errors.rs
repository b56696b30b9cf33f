use uuid::Uuid;

// ============================================================================
// Module Ordering Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderingError {
    #[error("Module not found in course: {0}")]
    ModuleNotFound(Uuid),

    #[error("Requested order {requested} is outside 1..={max}")]
    OrderOutOfRange { requested: i32, max: i32 },

    #[error("Order {0} is held by more than one module")]
    DuplicateOrder(i32),

    #[error("Module sequence has a gap: expected order {expected}, found {found}")]
    OrderGap { expected: i32, found: i32 },

    #[error("Module id appears more than once: {0}")]
    DuplicateModuleId(Uuid),

    #[error("Title '{title}' is already used by module {held_by}")]
    DuplicateTitle { title: String, held_by: Uuid },
}
