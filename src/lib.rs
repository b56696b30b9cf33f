//! Course and module storage with a contiguous module ordering.
//!
//! Courses are aggregates that embed an ordered list of modules. Module ranks
//! always form `1..N`; the ordering engine in [`domain::module::ordering`]
//! computes every insert, move and delete, and [`repository::ModuleRepository`]
//! persists the result as one versioned document write.

pub mod config;
pub mod domain;
pub mod metrics;
pub mod repository;
pub mod service;
pub mod store;
pub mod utils;
