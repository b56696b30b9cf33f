use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::module::ordering;
use crate::domain::module::{Module, ModuleCommand, OrderingError};
use super::value_objects::NewCourse;

// ============================================================================
// Course Aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    // Identity
    pub id: Uuid,

    // Course fields
    pub title: String,
    pub description: String,
    pub teacher_uuid: String,
    pub teacher_name: String,
    pub capacity: i32,
    pub students_amount: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Owned modules, sorted by order after every mutation
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Course {
    pub fn new(input: NewCourse, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            teacher_uuid: input.teacher_uuid,
            teacher_name: input.teacher_name,
            capacity: input.capacity,
            students_amount: 0,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
            modules: Vec::new(),
        }
    }

    pub fn module(&self, module_id: Uuid) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub fn module_by_title(&self, title: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.title == title)
    }

    pub fn module_by_order(&self, order: i32) -> Option<&Module> {
        self.modules.iter().find(|m| m.order == order)
    }

    pub fn next_module_order(&self) -> i32 {
        ordering::next_order(&self.modules)
    }

    /// Modules ascending by order, whatever the stored sequence looks like.
    pub fn modules_in_order(&self) -> Vec<Module> {
        let mut modules = self.modules.clone();
        modules.sort_by_key(|m| m.order);
        modules
    }

    /// Run a module command through the ordering engine and replace the
    /// module list with its output. On error the course is left unchanged.
    pub fn apply_module_command(
        &mut self,
        command: &ModuleCommand,
        now: DateTime<Utc>,
    ) -> Result<(), OrderingError> {
        let next = ordering::apply(&self.modules, command)?;
        self.modules = next;
        self.updated_at = now;
        Ok(())
    }

    /// Rewrite the module ranks as 1..N, keeping their relative order.
    pub fn repair_module_order(&mut self, now: DateTime<Utc>) {
        self.modules = ordering::renumber(&self.modules);
        self.updated_at = now;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::module::ModuleChanges;

    fn new_course() -> Course {
        let now = Utc::now();
        Course::new(
            NewCourse {
                title: "Rust 101".to_string(),
                description: "Ownership and borrowing".to_string(),
                teacher_uuid: "teacher-123".to_string(),
                teacher_name: "Test Teacher".to_string(),
                capacity: 30,
                start_date: now,
                end_date: now + chrono::Duration::days(30),
            },
            now,
        )
    }

    fn append(course: &mut Course, title: &str) -> Uuid {
        let mut module = Module::draft(title, "");
        module.id = Uuid::new_v4();
        let id = module.id;
        course
            .apply_module_command(&ModuleCommand::Append { module }, Utc::now())
            .unwrap();
        id
    }

    #[test]
    fn test_new_course_has_no_modules() {
        let course = new_course();
        assert!(course.modules.is_empty());
        assert_eq!(course.students_amount, 0);
        assert_eq!(course.next_module_order(), 1);
    }

    #[test]
    fn test_lookup_helpers() {
        let mut course = new_course();
        let first = append(&mut course, "First");
        let second = append(&mut course, "Second");

        assert_eq!(course.module(first).unwrap().order, 1);
        assert_eq!(course.module_by_title("Second").unwrap().id, second);
        assert_eq!(course.module_by_order(2).unwrap().id, second);
        assert!(course.module_by_order(3).is_none());
        assert!(course.module(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_failed_command_leaves_course_untouched() {
        let mut course = new_course();
        let id = append(&mut course, "Only");
        let before = course.clone();

        let command = ModuleCommand::Revise {
            module_id: id,
            changes: ModuleChanges::default().order(3),
            revised_at: Utc::now(),
        };
        assert!(course.apply_module_command(&command, Utc::now()).is_err());
        assert_eq!(course, before);
    }

    #[test]
    fn test_modules_in_order_sorts_storage_order() {
        let mut course = new_course();
        append(&mut course, "a");
        append(&mut course, "b");
        append(&mut course, "c");
        course.modules.reverse();

        let titles: Vec<String> = course.modules_in_order().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_repair_module_order() {
        let mut course = new_course();
        let a = append(&mut course, "a");
        let b = append(&mut course, "b");
        let c = append(&mut course, "c");
        course.modules[0].order = 4;
        course.modules[1].order = 9;
        course.modules[2].order = 4;
        course.modules[2].created_at = course.modules[0].created_at + chrono::Duration::seconds(1);

        let repaired_at = Utc::now() + chrono::Duration::seconds(5);
        course.repair_module_order(repaired_at);

        assert_eq!(course.module(a).unwrap().order, 1);
        assert_eq!(course.module(c).unwrap().order, 2);
        assert_eq!(course.module(b).unwrap().order, 3);
        assert_eq!(course.updated_at, repaired_at);
    }

    #[test]
    fn test_renumber_command_repairs_sequence() {
        let mut course = new_course();
        append(&mut course, "a");
        append(&mut course, "b");
        course.modules[1].order = 9;

        course
            .apply_module_command(&ModuleCommand::Renumber, Utc::now())
            .unwrap();
        let orders: Vec<i32> = course.modules.iter().map(|m| m.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }
}
