use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::{Module, ModuleChanges};

// ============================================================================
// Module Commands - Mutations of a course's module sequence
// ============================================================================

#[derive(Debug, Clone)]
pub enum ModuleCommand {
    Append {
        module: Module,
    },
    Revise {
        module_id: Uuid,
        changes: ModuleChanges,
        revised_at: DateTime<Utc>,
    },
    Remove {
        module_id: Uuid,
    },
    /// Rebuild a contiguous sequence from a damaged one
    Renumber,
}

impl ModuleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ModuleCommand::Append { .. } => "append",
            ModuleCommand::Revise { .. } => "revise",
            ModuleCommand::Remove { .. } => "remove",
            ModuleCommand::Renumber => "renumber",
        }
    }
}
