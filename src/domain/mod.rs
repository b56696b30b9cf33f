// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Course is the aggregate root; modules live only inside a course and their
// ranks are maintained by the ordering engine in `module::ordering`.
//
// This layer has no knowledge of storage.
//
// ============================================================================

pub mod course;
pub mod module;
