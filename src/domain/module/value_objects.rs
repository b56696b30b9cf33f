use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Module Value Objects
// ============================================================================

/// A module embedded in a course. `order` is its 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub data: Vec<ModuleData>,
}

impl Module {
    /// Draft module as supplied by a caller. Id, order and timestamps are
    /// assigned when the module is stored.
    pub fn draft(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            title: title.into(),
            description: description.into(),
            order: 0,
            created_at: now,
            updated_at: now,
            data: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: Vec<ModuleData>) -> Self {
        self.data = data;
        self
    }
}

/// Opaque content block of a module. Carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleData {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub resources: Vec<ModuleDataResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDataResource {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Partial update of a module. `None` keeps the current value; empty
/// title/description strings are treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub data: Option<Vec<ModuleData>>,
}

impl ModuleChanges {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn data(mut self, data: Vec<ModuleData>) -> Self {
        self.data = Some(data);
        self
    }

    /// Title that would actually replace the current one.
    pub fn effective_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn effective_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
