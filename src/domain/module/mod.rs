// ============================================================================
// Module Domain - Ordered modules embedded in a course
// ============================================================================
//
// - Value objects (Module, ModuleData, ModuleDataResource, ModuleChanges)
// - Commands (append / revise / remove)
// - Errors (OrderingError)
// - Ordering engine (pure sequence maintenance over a module slice)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod ordering;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
