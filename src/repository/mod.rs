//! Repository Module
//!
//! Course aggregate access and the module operation surface on top of a
//! `CourseStore`.

pub mod course_repository;
pub mod errors;
pub mod module_repository;

pub use course_repository::CourseRepository;
pub use errors::{parse_id, RepoResult, RepositoryError};
pub use module_repository::ModuleRepository;
